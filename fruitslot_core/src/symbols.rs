use std::sync::OnceLock;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

pub const SYMBOL_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Cherries,
    Peach,
    Coconut,
    Kiwi,
    Banana,
    Avocado,
    Watermelon,
    Strawberry,
    Grapes,
}

/// Declaration order. A symbol's weight is derived from its position here,
/// so entries must never be reordered without retuning the odds.
pub const ORDERED_SYMBOLS: [(Symbol, usize); SYMBOL_COUNT] = [
    (Symbol::Cherries, 0),
    (Symbol::Peach, 1),
    (Symbol::Coconut, 2),
    (Symbol::Kiwi, 3),
    (Symbol::Banana, 4),
    (Symbol::Avocado, 5),
    (Symbol::Watermelon, 6),
    (Symbol::Strawberry, 7),
    (Symbol::Grapes, 8),
];

impl Symbol {
    pub fn from_index(i: usize) -> Option<Self> {
        ORDERED_SYMBOLS.get(i).map(|&(symbol, _)| symbol)
    }

    pub fn to_index(self) -> usize {
        match self {
            Symbol::Cherries => 0,
            Symbol::Peach => 1,
            Symbol::Coconut => 2,
            Symbol::Kiwi => 3,
            Symbol::Banana => 4,
            Symbol::Avocado => 5,
            Symbol::Watermelon => 6,
            Symbol::Strawberry => 7,
            Symbol::Grapes => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Cherries => "cherries",
            Symbol::Peach => "peach",
            Symbol::Coconut => "coconut",
            Symbol::Kiwi => "kiwi",
            Symbol::Banana => "banana",
            Symbol::Avocado => "avocado",
            Symbol::Watermelon => "watermelon",
            Symbol::Strawberry => "strawberry",
            Symbol::Grapes => "grapes",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Symbol::Cherries => "\u{1f352}",
            Symbol::Peach => "\u{1f351}",
            Symbol::Coconut => "\u{1f965}",
            Symbol::Kiwi => "\u{1f95d}",
            Symbol::Banana => "\u{1f34c}",
            Symbol::Avocado => "\u{1f951}",
            Symbol::Watermelon => "\u{1f349}",
            Symbol::Strawberry => "\u{1f353}",
            Symbol::Grapes => "\u{1f347}",
        }
    }

    /// Chat-style shortcode, e.g. `:cherries:`.
    pub fn shortcode(self) -> String {
        format!(":{}:", self.name())
    }

    pub fn glyph(self, style: GlyphStyle) -> String {
        match style {
            GlyphStyle::Emoji => self.emoji().to_string(),
            GlyphStyle::Shortcode => self.shortcode(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GlyphStyle {
    #[default]
    Emoji,
    Shortcode,
}

/// Default odds knob: `ceil(((index + 1) << 2) / 1.9)`, computed in integers.
pub fn position_weight(index: usize) -> i64 {
    ((index as i64 + 1) * 40 + 18) / 19
}

/// Static per-symbol weights plus the sampling distribution built from them.
#[derive(Debug, Clone)]
pub struct WeightTable {
    weights: [u32; SYMBOL_COUNT],
    total: u32,
    dist: WeightedIndex<u32>,
}

impl WeightTable {
    /// Builds a table from a position-derived formula. Every weight must be
    /// strictly positive.
    pub fn from_formula(formula: impl Fn(usize) -> i64) -> GameResult<Self> {
        let mut weights = [0u32; SYMBOL_COUNT];
        for &(symbol, index) in ORDERED_SYMBOLS.iter() {
            let weight = formula(index);
            if weight <= 0 || weight > i64::from(u32::MAX) {
                return Err(GameError::InvalidWeightConfiguration { symbol, weight });
            }
            weights[index] = weight as u32;
        }
        let total = weights
            .iter()
            .try_fold(0u32, |acc, w| acc.checked_add(*w))
            .ok_or_else(|| GameError::Sampling("total weight overflows u32".into()))?;
        let dist =
            WeightedIndex::new(weights.iter()).map_err(|e| GameError::Sampling(e.to_string()))?;
        Ok(Self {
            weights,
            total,
            dist,
        })
    }

    /// The process-wide table built from [`position_weight`].
    pub fn standard() -> GameResult<&'static WeightTable> {
        static STANDARD: OnceLock<GameResult<WeightTable>> = OnceLock::new();
        STANDARD
            .get_or_init(|| WeightTable::from_formula(position_weight))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn weight_of(&self, symbol: Symbol) -> u32 {
        self.weights[symbol.to_index()]
    }

    pub fn points_of(&self, symbol: Symbol) -> u32 {
        self.weight_of(symbol) / 2
    }

    pub fn total_weight(&self) -> u32 {
        self.total
    }

    pub fn probability(&self, symbol: Symbol) -> f64 {
        f64::from(self.weight_of(symbol)) / f64::from(self.total)
    }

    pub fn all_symbols_ordered(&self) -> impl Iterator<Item = Symbol> + '_ {
        ORDERED_SYMBOLS.iter().map(|&(symbol, _)| symbol)
    }

    /// One weighted draw, with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Symbol {
        let (symbol, _) = ORDERED_SYMBOLS[self.dist.sample(rng)];
        symbol
    }
}
