use crate::symbols::Symbol;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid game count {0}: expected 1..=3")]
    InvalidGameCount(i64),
    #[error("invalid weight {weight} for {symbol:?}: weights must be positive")]
    InvalidWeightConfiguration { symbol: Symbol, weight: i64 },
    #[error("invalid thresholds for {games} game(s): double ({double}) must be below lose ({lose})")]
    InvalidThresholds { games: u8, lose: u32, double: u32 },
    #[error("weighted sampling unavailable: {0}")]
    Sampling(String),
}

pub type GameResult<T> = Result<T, GameError>;
