use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::paytable::GameCount;
use crate::symbols::{GlyphStyle, Symbol, WeightTable};

pub const SLOTS_PER_LINE: usize = 3;
pub const SYMBOLS_PER_SLOT: usize = 3;

/// How a board is turned into text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BoardLayout {
    /// Between two symbols of one slot.
    pub separator: String,
    /// Before every slot, and once more at the end of each line.
    pub delimiter: String,
    pub glyphs: GlyphStyle,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            separator: " ".to_string(),
            delimiter: " | ".to_string(),
            glyphs: GlyphStyle::Emoji,
        }
    }
}

/// Per-round count of how often each symbol was drawn. Iterates in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawTally(BTreeMap<Symbol, u32>);

impl DrawTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, symbol: Symbol) {
        *self.0.entry(symbol).or_insert(0) += 1;
    }

    pub fn count(&self, symbol: Symbol) -> u32 {
        self.0.get(&symbol).copied().unwrap_or(0)
    }

    /// Symbols drawn at least once, with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u32)> + '_ {
        self.0.iter().filter(|(_, n)| **n > 0).map(|(s, n)| (*s, *n))
    }

    pub fn distinct(&self) -> usize {
        self.iter().count()
    }

    pub fn total_draws(&self) -> u32 {
        self.0.values().sum()
    }
}

impl FromIterator<(Symbol, u32)> for DrawTally {
    fn from_iter<I: IntoIterator<Item = (Symbol, u32)>>(iter: I) -> Self {
        let mut tally = DrawTally::new();
        for (symbol, count) in iter {
            *tally.0.entry(symbol).or_insert(0) += count;
        }
        tally
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub rendered: String,
    pub symbols: [Symbol; SYMBOLS_PER_SLOT],
}

/// Draws one board. Owns the tally for exactly one round; hand it back with
/// [`BoardGenerator::into_tally`] once the board has been fully generated.
pub struct BoardGenerator<'a, R: Rng + ?Sized> {
    table: &'a WeightTable,
    layout: &'a BoardLayout,
    rng: &'a mut R,
    tally: DrawTally,
}

impl<'a, R: Rng + ?Sized> BoardGenerator<'a, R> {
    pub fn new(table: &'a WeightTable, layout: &'a BoardLayout, rng: &'a mut R) -> Self {
        Self {
            table,
            layout,
            rng,
            tally: DrawTally::new(),
        }
    }

    pub fn generate_slot(&mut self) -> Slot {
        let mut symbols = [Symbol::Cherries; SYMBOLS_PER_SLOT];
        for slot in symbols.iter_mut() {
            let symbol = self.table.sample(&mut *self.rng);
            self.tally.record(symbol);
            *slot = symbol;
        }
        let rendered = symbols
            .iter()
            .map(|s| s.glyph(self.layout.glyphs))
            .collect::<Vec<_>>()
            .join(&self.layout.separator);
        Slot { rendered, symbols }
    }

    pub fn generate_line(&mut self) -> String {
        let mut line = String::new();
        for _ in 0..SLOTS_PER_LINE {
            let slot = self.generate_slot();
            line.push_str(&self.layout.delimiter);
            line.push_str(&slot.rendered);
        }
        line
    }

    /// Lazily yields `games` lines. Each line is drawn when it is pulled, so
    /// the tally only reflects what has been consumed.
    pub fn generate_board(&mut self, games: GameCount) -> BoardLines<'_, 'a, R> {
        BoardLines {
            generator: self,
            remaining: games.get(),
        }
    }

    pub fn tally(&self) -> &DrawTally {
        &self.tally
    }

    pub fn into_tally(self) -> DrawTally {
        self.tally
    }
}

pub struct BoardLines<'g, 'a, R: Rng + ?Sized> {
    generator: &'g mut BoardGenerator<'a, R>,
    remaining: u8,
}

impl<R: Rng + ?Sized> Iterator for BoardLines<'_, '_, R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let mut line = self.generator.generate_line();
        line.push_str(&self.generator.layout.delimiter);
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::from(self.remaining);
        (n, Some(n))
    }
}

impl<R: Rng + ?Sized> ExactSizeIterator for BoardLines<'_, '_, R> {}
