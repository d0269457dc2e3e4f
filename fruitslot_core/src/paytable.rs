use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::DrawTally;
use crate::error::{GameError, GameResult};
use crate::symbols::WeightTable;

pub const MAX_GAMES: u8 = 3;

/// Number of board lines in a round, and the factor the wager is scaled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct GameCount(u8);

impl GameCount {
    pub const ONE: GameCount = GameCount(1);
    pub const TWO: GameCount = GameCount(2);
    pub const THREE: GameCount = GameCount(3);

    pub fn new(games: i64) -> GameResult<Self> {
        match games {
            1..=3 => Ok(GameCount(games as u8)),
            _ => Err(GameError::InvalidGameCount(games)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn offset(self) -> usize {
        usize::from(self.0 - 1)
    }

    pub fn all() -> [GameCount; MAX_GAMES as usize] {
        [GameCount::ONE, GameCount::TWO, GameCount::THREE]
    }
}

impl TryFrom<i64> for GameCount {
    type Error = GameError;

    fn try_from(games: i64) -> GameResult<Self> {
        GameCount::new(games)
    }
}

impl From<GameCount> for u8 {
    fn from(games: GameCount) -> u8 {
        games.0
    }
}

impl fmt::Display for GameCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point cutoffs for one game count: `>= lose` loses, `<= double` pays x2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub lose: u32,
    pub double: u32,
}

impl ThresholdPair {
    pub const fn new(lose: u32, double: u32) -> Self {
        Self { lose, double }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplier {
    Lose,
    Even,
    Double,
}

impl Multiplier {
    pub fn factor(self) -> u32 {
        match self {
            Multiplier::Lose => 0,
            Multiplier::Even => 1,
            Multiplier::Double => 2,
        }
    }

    pub fn is_win(self) -> bool {
        self.factor() > 0
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.factor())
    }
}

/// One threshold pair per game count, indexed by `games - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[ThresholdPair; 3]", into = "[ThresholdPair; 3]")]
pub struct Paytable([ThresholdPair; MAX_GAMES as usize]);

impl Paytable {
    pub fn new(pairs: [ThresholdPair; MAX_GAMES as usize]) -> GameResult<Self> {
        for (games, pair) in GameCount::all().into_iter().zip(pairs.iter()) {
            if pair.double >= pair.lose {
                return Err(GameError::InvalidThresholds {
                    games: games.get(),
                    lose: pair.lose,
                    double: pair.double,
                });
            }
        }
        Ok(Self(pairs))
    }

    pub fn standard() -> Self {
        Self([
            ThresholdPair::new(31, 25),
            ThresholdPair::new(43, 32),
            ThresholdPair::new(44, 35),
        ])
    }

    pub fn thresholds(&self, games: GameCount) -> ThresholdPair {
        self.0[games.offset()]
    }

    /// Lose is checked first, so an inverted pair can never pay x2 on a
    /// losing score.
    pub fn resolve_multiplier(&self, total_points: u32, games: GameCount) -> (Multiplier, ThresholdPair) {
        let pair = self.thresholds(games);
        let multiplier = if total_points >= pair.lose {
            Multiplier::Lose
        } else if total_points <= pair.double {
            Multiplier::Double
        } else {
            Multiplier::Even
        };
        (multiplier, pair)
    }
}

impl Default for Paytable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<[ThresholdPair; 3]> for Paytable {
    type Error = GameError;

    fn try_from(pairs: [ThresholdPair; 3]) -> GameResult<Self> {
        Paytable::new(pairs)
    }
}

impl From<Paytable> for [ThresholdPair; 3] {
    fn from(table: Paytable) -> Self {
        table.0
    }
}

/// Each distinct symbol on the board scores its points once, however many
/// times it was drawn.
pub fn total_points(table: &WeightTable, tally: &DrawTally) -> u32 {
    tally.iter().map(|(symbol, _)| table.points_of(symbol)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Symbol;

    #[test]
    fn one_game_boundaries() {
        let table = Paytable::standard();
        let at = |p| table.resolve_multiplier(p, GameCount::ONE).0;
        assert_eq!(at(31), Multiplier::Lose);
        assert_eq!(at(45), Multiplier::Lose);
        assert_eq!(at(25), Multiplier::Double);
        assert_eq!(at(0), Multiplier::Double);
        assert_eq!(at(28), Multiplier::Even);
        assert_eq!(at(26), Multiplier::Even);
        assert_eq!(at(30), Multiplier::Even);
    }

    #[test]
    fn thresholds_are_reported() {
        let table = Paytable::standard();
        assert_eq!(
            table.resolve_multiplier(40, GameCount::TWO),
            (Multiplier::Even, ThresholdPair::new(43, 32))
        );
        assert_eq!(
            table.resolve_multiplier(44, GameCount::THREE),
            (Multiplier::Lose, ThresholdPair::new(44, 35))
        );
    }

    #[test]
    fn lose_wins_over_double_on_inverted_pair() {
        let table = Paytable([
            ThresholdPair::new(20, 30),
            ThresholdPair::new(43, 32),
            ThresholdPair::new(44, 35),
        ]);
        assert_eq!(table.resolve_multiplier(25, GameCount::ONE).0, Multiplier::Lose);
        assert_eq!(table.resolve_multiplier(19, GameCount::ONE).0, Multiplier::Double);
    }

    #[test]
    fn inverted_pair_is_rejected() {
        let err = Paytable::new([
            ThresholdPair::new(31, 25),
            ThresholdPair::new(30, 30),
            ThresholdPair::new(44, 35),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            GameError::InvalidThresholds {
                games: 2,
                lose: 30,
                double: 30
            }
        );
    }

    #[test]
    fn paytable_json_is_validated() {
        let ok: Paytable = serde_json::from_str(
            r#"[{"lose":31,"double":25},{"lose":43,"double":32},{"lose":44,"double":35}]"#,
        )
        .unwrap();
        assert_eq!(ok, Paytable::standard());
        let bad = serde_json::from_str::<Paytable>(
            r#"[{"lose":20,"double":25},{"lose":43,"double":32},{"lose":44,"double":35}]"#,
        );
        assert!(bad.is_err());
        assert_eq!(serde_json::to_string(&GameCount::TWO).unwrap(), "2");
        assert!(serde_json::from_str::<GameCount>("4").is_err());
    }

    #[test]
    fn game_count_range() {
        assert!(GameCount::new(0).is_err());
        assert!(GameCount::new(4).is_err());
        assert!(GameCount::new(-1).is_err());
        assert_eq!(GameCount::new(2).unwrap(), GameCount::TWO);
    }

    #[test]
    fn points_ignore_duplicate_draws() {
        let table = WeightTable::standard().unwrap();
        let once: DrawTally = [(Symbol::Cherries, 1)].into_iter().collect();
        let five: DrawTally = [(Symbol::Cherries, 5)].into_iter().collect();
        assert_eq!(total_points(table, &once), total_points(table, &five));

        let mixed: DrawTally = [(Symbol::Grapes, 4), (Symbol::Kiwi, 1), (Symbol::Peach, 0)]
            .into_iter()
            .collect();
        assert_eq!(total_points(table, &mixed), 9 + 4);
    }
}
