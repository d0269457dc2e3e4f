pub mod board;
pub mod engine;
pub mod error;
pub mod paytable;
pub mod rng;
pub mod symbols;

pub use crate::board::{BoardGenerator, BoardLayout, BoardLines, DrawTally, Slot};
pub use crate::engine::{play, play_with_seeds, Engine, GameOutcome};
pub use crate::error::{GameError, GameResult};
pub use crate::paytable::{total_points, GameCount, Multiplier, Paytable, ThresholdPair};
pub use crate::rng::{seed_commitment, RoundSeeds};
pub use crate::symbols::{position_weight, GlyphStyle, Symbol, WeightTable, ORDERED_SYMBOLS};
