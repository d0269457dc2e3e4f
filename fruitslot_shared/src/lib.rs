use std::collections::BTreeMap;

use fruitslot_core::{GameCount, GameError, GameOutcome, Multiplier, ThresholdPair, WeightTable};
use serde::{Deserialize, Serialize};

pub const BAD_BET_MESSAGE: &str = "Specify the correct bet you want to play!";
pub const BAD_GAMES_MESSAGE: &str = "You cannot play more than three games and less than one!";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlayRequest {
    pub bet: Option<i64>,
    #[serde(default = "default_games")]
    pub games: i64,
}

fn default_games() -> i64 {
    1
}

/// A request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidPlay {
    pub bet: u64,
    pub games: GameCount,
}

impl PlayRequest {
    pub fn new(bet: Option<i64>, games: i64) -> Self {
        Self { bet, games }
    }

    /// Bet first, then game count, the order a player sees the complaints.
    pub fn validate(&self) -> ApiResult<ValidPlay> {
        let bet = match self.bet {
            Some(bet) if bet > 0 => bet as u64,
            _ => return Err(ApiError::Invalid(BAD_BET_MESSAGE.into())),
        };
        let games =
            GameCount::new(self.games).map_err(|_| ApiError::Invalid(BAD_GAMES_MESSAGE.into()))?;
        Ok(ValidPlay { bet, games })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "result", content = "coins", rename_all = "lowercase")]
pub enum Settlement {
    Won(u64),
    Lost(u64),
}

impl Settlement {
    /// Win pays `bet * multiplier * games`; a loss costs `bet * games`.
    pub fn from_outcome(bet: u64, outcome: &GameOutcome) -> ApiResult<Self> {
        let games = u64::from(outcome.games.get());
        let overflow = || ApiError::Invalid(format!("bet {bet} is too large"));
        if outcome.multiplier.is_win() {
            let coins = bet
                .checked_mul(u64::from(outcome.multiplier.factor()))
                .and_then(|v| v.checked_mul(games))
                .ok_or_else(overflow)?;
            Ok(Settlement::Won(coins))
        } else {
            let coins = bet.checked_mul(games).ok_or_else(overflow)?;
            Ok(Settlement::Lost(coins))
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, Settlement::Won(_))
    }

    pub fn coins(&self) -> u64 {
        match *self {
            Settlement::Won(c) | Settlement::Lost(c) => c,
        }
    }

    /// Net change to the player's balance.
    pub fn net(&self, bet: u64, games: GameCount) -> i128 {
        match *self {
            Settlement::Won(c) => i128::from(c) - i128::from(bet) * i128::from(games.get()),
            Settlement::Lost(c) => -i128::from(c),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StatsRow {
    pub symbol: String,
    pub glyph: String,
    pub count: u32,
    pub points: u32,
}

/// One row per symbol drawn this round, in declaration order. The chat bot
/// listed symbols in the order they were first drawn; this keeps the table
/// stable across rounds instead.
pub fn stats_rows(outcome: &GameOutcome, table: &WeightTable) -> Vec<StatsRow> {
    outcome
        .tally
        .iter()
        .map(|(symbol, count)| StatsRow {
            symbol: symbol.name().to_string(),
            glyph: symbol.emoji().to_string(),
            count,
            points: table.points_of(symbol),
        })
        .collect()
}

pub fn stats_table(outcome: &GameOutcome, table: &WeightTable) -> String {
    let mut out = String::from("Emoji\tCount\tPoints\n");
    for row in stats_rows(outcome, table) {
        out.push_str(&format!("{}\t\t:\t{}\t:\t{}\n", row.glyph, row.count, row.points));
    }
    out
}

pub fn headline(outcome: &GameOutcome, settlement: &Settlement) -> String {
    match settlement {
        Settlement::Won(c) => format!(
            "Total points: {}. You have won `{}` coins.",
            outcome.total_points, c
        ),
        Settlement::Lost(c) => format!(
            "Total points: {}. You have lose `{}` coins.",
            outcome.total_points, c
        ),
    }
}

pub fn cutoff_hint(thresholds: &ThresholdPair) -> String {
    format!(
        "For x2 odds you had to score `<= {}` points, and for lose `>= {}`.",
        thresholds.double, thresholds.lose
    )
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FairnessProof {
    pub server_seed_hash: String,
    pub client_seed: String,
    pub nonce: u64,
}

/// Serializable summary of one settled round.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutcomeReport {
    pub board: Vec<String>,
    pub games: u8,
    pub bet: u64,
    pub multiplier: Multiplier,
    pub total_points: u32,
    pub thresholds: ThresholdPair,
    pub tally: BTreeMap<String, u32>,
    pub settlement: Settlement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fairness: Option<FairnessProof>,
}

impl OutcomeReport {
    pub fn new(
        play: ValidPlay,
        outcome: &GameOutcome,
        fairness: Option<FairnessProof>,
    ) -> ApiResult<Self> {
        let settlement = Settlement::from_outcome(play.bet, outcome)?;
        Ok(Self {
            board: outcome.board.clone(),
            games: outcome.games.get(),
            bet: play.bet,
            multiplier: outcome.multiplier,
            total_points: outcome.total_points,
            thresholds: outcome.thresholds,
            tally: outcome
                .tally
                .iter()
                .map(|(s, n)| (s.name().to_string(), n))
                .collect(),
            settlement,
            fairness,
        })
    }

    pub fn to_json(&self) -> ApiResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ApiError::Invalid(e.to_string()))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error(transparent)]
    Core(#[from] GameError),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use fruitslot_core::{DrawTally, Engine, Symbol};

    fn outcome(multiplier: Multiplier, games: GameCount) -> GameOutcome {
        GameOutcome {
            board: vec![" | a | ".into()],
            multiplier,
            tally: [(Symbol::Kiwi, 2), (Symbol::Grapes, 1)].into_iter().collect::<DrawTally>(),
            total_points: 13,
            thresholds: ThresholdPair::new(31, 25),
            games,
        }
    }

    #[test]
    fn bet_is_checked_before_games() {
        let err = PlayRequest::new(None, 9).validate().unwrap_err();
        assert_eq!(err.to_string(), format!("invalid request: {BAD_BET_MESSAGE}"));
        assert!(PlayRequest::new(Some(0), 1).validate().is_err());
        assert!(PlayRequest::new(Some(-5), 1).validate().is_err());
    }

    #[test]
    fn games_out_of_range() {
        for games in [0, 4, -1] {
            let err = PlayRequest::new(Some(10), games).validate().unwrap_err();
            assert_eq!(err.to_string(), format!("invalid request: {BAD_GAMES_MESSAGE}"));
        }
        let ok = PlayRequest::new(Some(10), 3).validate().unwrap();
        assert_eq!(ok, ValidPlay { bet: 10, games: GameCount::THREE });
    }

    #[test]
    fn request_defaults_to_one_game() {
        let req: PlayRequest = serde_json::from_str(r#"{"bet": 5}"#).unwrap();
        assert_eq!(req.games, 1);
    }

    #[test]
    fn settlement_math() {
        let double = Settlement::from_outcome(10, &outcome(Multiplier::Double, GameCount::THREE)).unwrap();
        assert_eq!(double, Settlement::Won(60));
        assert_eq!(double.net(10, GameCount::THREE), 30);

        let even = Settlement::from_outcome(10, &outcome(Multiplier::Even, GameCount::TWO)).unwrap();
        assert_eq!(even, Settlement::Won(20));
        assert_eq!(even.net(10, GameCount::TWO), 0);

        let lose = Settlement::from_outcome(10, &outcome(Multiplier::Lose, GameCount::TWO)).unwrap();
        assert_eq!(lose, Settlement::Lost(20));
        assert_eq!(lose.net(10, GameCount::TWO), -20);
    }

    #[test]
    fn settlement_overflow_is_reported() {
        let res = Settlement::from_outcome(u64::MAX, &outcome(Multiplier::Double, GameCount::ONE));
        assert!(matches!(res, Err(ApiError::Invalid(_))));
    }

    #[test]
    fn stats_use_half_weights() {
        let engine = Engine::standard().unwrap();
        let rows = stats_rows(&outcome(Multiplier::Even, GameCount::ONE), &engine.table);
        assert_eq!(
            rows.iter().map(|r| (r.symbol.as_str(), r.count, r.points)).collect::<Vec<_>>(),
            vec![("kiwi", 2, 4), ("grapes", 1, 9)]
        );
        let table = stats_table(&outcome(Multiplier::Even, GameCount::ONE), &engine.table);
        assert!(table.starts_with("Emoji\tCount\tPoints\n"));
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn stats_follow_declaration_order_not_draw_order() {
        let engine = Engine::standard().unwrap();
        let mut out = outcome(Multiplier::Even, GameCount::ONE);
        let mut tally = DrawTally::new();
        tally.record(Symbol::Grapes);
        tally.record(Symbol::Cherries);
        tally.record(Symbol::Grapes);
        out.tally = tally;
        assert_eq!(
            stats_table(&out, &engine.table),
            "Emoji\tCount\tPoints\n🍒\t\t:\t1\t:\t1\n🍇\t\t:\t2\t:\t9\n"
        );
    }

    #[test]
    fn report_serializes_settlement() {
        let play = ValidPlay { bet: 4, games: GameCount::ONE };
        let report = OutcomeReport::new(play, &outcome(Multiplier::Double, GameCount::ONE), None).unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["settlement"]["result"], "won");
        assert_eq!(json["settlement"]["coins"], 8);
        assert_eq!(json["multiplier"], "double");
        assert_eq!(json["tally"]["kiwi"], 2);
        assert!(json.get("fairness").is_none());
    }

    #[test]
    fn headline_wording() {
        let out = outcome(Multiplier::Lose, GameCount::ONE);
        assert_eq!(
            headline(&out, &Settlement::Lost(5)),
            "Total points: 13. You have lose `5` coins."
        );
        assert_eq!(
            cutoff_hint(&out.thresholds),
            "For x2 odds you had to score `<= 25` points, and for lose `>= 31`."
        );
    }
}
