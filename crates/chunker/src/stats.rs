/// Average narration speed used for duration estimates
pub const WORDS_PER_MINUTE: usize = 150;

/// Rough size and narration length of a script
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStats {
    /// Length in UTF-16 code units, the same unit as the chunk budget
    pub chars: usize,
    pub words: usize,
    pub estimated_minutes: f64,
}

impl TextStats {
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate(text: &str) -> Self {
        let chars = text.encode_utf16().count();
        let words = text.split_whitespace().count();

        Self {
            chars,
            words,
            estimated_minutes: words as f64 / WORDS_PER_MINUTE as f64,
        }
    }
}
