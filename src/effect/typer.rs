/// Keypress-gated typing: every key advances the output by a fixed
/// number of characters, so any amount of mashing produces flawless
/// movie-hacker code.

pub struct Typer {
    chars: Vec<char>,
    cursor: usize,
    step: usize,
}

impl Typer {
    /// `step` is clamped to at least one character per keypress.
    pub fn new(text: &str, step: usize) -> Self {
        Typer {
            chars: text.chars().collect(),
            cursor: 0,
            step: step.max(1),
        }
    }

    /// The characters the next keypress should type. Empty once the
    /// text is exhausted.
    pub fn next_chunk(&mut self) -> &[char] {
        let start = self.cursor;
        let end = (start + self.step).min(self.chars.len());
        self.cursor = end;
        &self.chars[start..end]
    }

    pub fn done(&self) -> bool {
        self.cursor >= self.chars.len()
    }
}
