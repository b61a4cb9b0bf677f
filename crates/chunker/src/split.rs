use crate::ChunkBudget;

/// How far past `max_chars` a full stop may sit and still be used as the cut
pub const OVERFLOW_TOLERANCE: usize = 50;

/// Which rule produced a cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutStrategy {
    /// The remaining text already fit the budget
    Remainder,
    /// First full stop inside `[min_chars, max_chars]`
    Preferred,
    /// Nearest full stop before `min_chars`
    EarlierPeriod,
    /// First full stop after `max_chars`, within the overflow tolerance
    LaterPeriod,
    /// Last whitespace at or before `max_chars`
    Whitespace,
    /// No usable boundary, cut after exactly `max_chars` code units
    HardBreak,
}

/// A single emitted chunk along with the rule that ended it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cut<'a> {
    pub text: &'a str,
    pub strategy: CutStrategy,
}

/// A character of the search window, located in the text
#[derive(Debug, Clone, Copy)]
struct Position {
    /// Byte offset into the remaining text
    offset: usize,
    /// Index of the character's first UTF-16 code unit
    unit: usize,
    ch: char,
}

impl Position {
    const fn end_unit(&self) -> usize {
        self.unit + self.ch.len_utf16()
    }
}

/// Lazy iterator over the chunks of a text
///
/// Every item is a trimmed, non-empty slice of the input. Whitespace between
/// chunks is dropped. Lengths and cut indices are measured in UTF-16 code
/// units, but cuts only ever land on character boundaries.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    budget: ChunkBudget,
}

impl<'a> Chunks<'a> {
    pub fn new(text: &'a str, budget: ChunkBudget) -> Self {
        Self {
            rest: text.trim(),
            budget,
        }
    }

    /// Advance by one chunk, reporting which strategy chose the cut
    pub fn next_cut(&mut self) -> Option<Cut<'a>> {
        if self.rest.is_empty() {
            return None;
        }

        let max = self.budget.max_chars();

        // Anything starting at or past `max + OVERFLOW_TOLERANCE` can never influence the cut
        let mut window = Vec::new();
        let mut unit = 0;
        for (offset, ch) in self.rest.char_indices() {
            if unit >= max + OVERFLOW_TOLERANCE {
                break;
            }
            window.push(Position { offset, unit, ch });
            unit += ch.len_utf16();
        }

        // A truncated window always ends at or past `max + OVERFLOW_TOLERANCE`
        if unit <= max {
            let text = self.rest;
            self.rest = "";
            return Some(Cut {
                text,
                strategy: CutStrategy::Remainder,
            });
        }

        let (index, strategy) = self.find_cut(&window);
        let cut = window[index];
        let end = cut.offset + cut.ch.len_utf8();

        let text = self.rest[..end].trim();
        self.rest = self.rest[end..].trim();

        Some(Cut { text, strategy })
    }

    /// Pick the index into `window` of the last character of the chunk
    ///
    /// `window` covers more than `max_chars` code units.
    fn find_cut(&self, window: &[Position]) -> (usize, CutStrategy) {
        let min = self.budget.min_chars();
        let max = self.budget.max_chars();

        if let Some(i) = window.iter().position(|p| p.ch == '.' && (min..=max).contains(&p.unit)) {
            return (i, CutStrategy::Preferred);
        }

        if let Some(i) = window.iter().rposition(|p| p.ch == '.' && p.unit < min) {
            return (i, CutStrategy::EarlierPeriod);
        }

        if let Some(i) = window.iter().position(|p| p.ch == '.' && p.unit >= max) {
            return (i, CutStrategy::LaterPeriod);
        }

        if let Some(i) = window.iter().rposition(|p| p.ch.is_whitespace() && p.unit <= max) {
            return (i, CutStrategy::Whitespace);
        }

        (hard_break(window, max), CutStrategy::HardBreak)
    }
}

/// Last character ending within `max` code units
///
/// A surrogate pair straddling the limit is left for the next chunk. A chunk
/// always takes at least one character.
fn hard_break(window: &[Position], max: usize) -> usize {
    window
        .iter()
        .rposition(|position| position.end_unit() <= max)
        .unwrap_or(0)
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_cut().map(|cut| cut.text)
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}
