use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    board::{BoardGenerator, BoardLayout, DrawTally},
    error::GameResult,
    paytable::{total_points, GameCount, Multiplier, Paytable, ThresholdPair},
    rng::RoundSeeds,
    symbols::WeightTable,
};

#[derive(Debug, Clone)]
pub struct Engine {
    pub table: WeightTable,
    pub paytable: Paytable,
    pub layout: BoardLayout,
}

/// Everything a front end needs to show one finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub board: Vec<String>,
    pub multiplier: Multiplier,
    pub tally: DrawTally,
    pub total_points: u32,
    pub thresholds: ThresholdPair,
    pub games: GameCount,
}

impl Engine {
    pub fn new(table: WeightTable, paytable: Paytable, layout: BoardLayout) -> Self {
        Self {
            table,
            paytable,
            layout,
        }
    }

    /// Default weights, thresholds and layout.
    pub fn standard() -> GameResult<Self> {
        Ok(Self::new(
            WeightTable::standard()?.clone(),
            Paytable::standard(),
            BoardLayout::default(),
        ))
    }

    pub fn with_layout(self, layout: BoardLayout) -> Self {
        Self { layout, ..self }
    }

    pub fn with_paytable(self, paytable: Paytable) -> Self {
        Self { paytable, ..self }
    }

    /// Generates the whole board before scoring; the tally is final by the
    /// time it reaches the resolver.
    pub fn play_round<R: Rng + ?Sized>(&self, games: GameCount, rng: &mut R) -> GameOutcome {
        let mut generator = BoardGenerator::new(&self.table, &self.layout, rng);
        let board: Vec<String> = generator.generate_board(games).collect();
        let tally = generator.into_tally();
        self.resolve(tally, games, board)
    }

    pub fn play_with_rng<R: Rng + ?Sized>(&self, games: i64, rng: &mut R) -> GameResult<GameOutcome> {
        let games = GameCount::new(games)?;
        Ok(self.play_round(games, rng))
    }

    pub fn play_with_seeds(&self, fair: &RoundSeeds, games: GameCount) -> GameOutcome {
        let mut rng = fair.draw_rng();
        self.play_round(games, &mut rng)
    }

    pub fn resolve(&self, tally: DrawTally, games: GameCount, board: Vec<String>) -> GameOutcome {
        let total_points = total_points(&self.table, &tally);
        let (multiplier, thresholds) = self.paytable.resolve_multiplier(total_points, games);
        debug!(
            games = games.get(),
            total_points,
            lose = thresholds.lose,
            double = thresholds.double,
            %multiplier,
            "round resolved"
        );
        GameOutcome {
            board,
            multiplier,
            tally,
            total_points,
            thresholds,
            games,
        }
    }

    /// Check that `expected_board` is exactly what these seeds produce.
    pub fn verify_board(
        &self,
        fair: &RoundSeeds,
        games: GameCount,
        expected_board: &[String],
    ) -> bool {
        self.play_with_seeds(fair, games).board == expected_board
    }
}

/// Plays one round with thread-local OS-seeded randomness and the default
/// tables.
pub fn play(games: i64) -> GameResult<GameOutcome> {
    let games = GameCount::new(games)?;
    let engine = Engine::standard()?;
    Ok(engine.play_round(games, &mut rand::thread_rng()))
}

/// Convenience: replay a seeded round with the default tables.
pub fn play_with_seeds(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    games: i64,
) -> GameResult<GameOutcome> {
    let games = GameCount::new(games)?;
    let fair = RoundSeeds::new(server_seed, client_seed, nonce);
    Ok(Engine::standard()?.play_with_seeds(&fair, games))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    #[test]
    fn test_play_deterministic() {
        let engine = Engine::standard().unwrap();
        let fair = RoundSeeds::new("server", "client", 1);
        let out1 = engine.play_with_seeds(&fair, GameCount::TWO);
        let out2 = engine.play_with_seeds(&fair, GameCount::TWO);
        assert_eq!(out1, out2);
        assert!(engine.verify_board(&fair, GameCount::TWO, &out1.board));
        assert!(!engine.verify_board(&fair.next_round(), GameCount::TWO, &out1.board));
    }

    #[test]
    fn resolve_packages_inputs() {
        let engine = Engine::standard().unwrap();
        let tally: DrawTally = [
            (crate::Symbol::Grapes, 3),
            (crate::Symbol::Strawberry, 3),
            (crate::Symbol::Watermelon, 3),
        ]
        .into_iter()
        .collect();
        let out = engine.resolve(tally.clone(), GameCount::ONE, vec!["line".into()]);
        assert_eq!(out.total_points, 9 + 8 + 7);
        assert_eq!(out.multiplier, Multiplier::Double);
        assert_eq!(out.thresholds, ThresholdPair::new(31, 25));
        assert_eq!(out.tally, tally);
        assert_eq!(out.board, vec!["line".to_string()]);
    }

    #[test]
    fn invalid_counts_fail_fast() {
        assert_eq!(play(0).unwrap_err(), GameError::InvalidGameCount(0));
        assert_eq!(play(4).unwrap_err(), GameError::InvalidGameCount(4));
    }
}
