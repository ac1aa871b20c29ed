/// Per-character decode state and the sequence the phases run over.

use super::charset;
use super::rng::RandomSource;

/// Decode timers are whole seconds drawn uniformly from 0..=MAX.
const MAX_DECODE_SECS: u64 = 5;

/// Timers at or below this count as expired. The reveal loop subtracts a
/// binary float each frame, so a timer that is an exact multiple of the
/// frame interval would otherwise keep a dust-sized positive residue and
/// steal one extra frame.
pub const TIME_EPS: f64 = 1e-6;

/// One character of the input with its scramble state.
///
/// `mask` is fixed at build time and is what the type-in phase shows.
/// `remaining` is the decode countdown in seconds; whitespace skips the
/// whole game and is always drawn as-is.
#[derive(Clone, Debug)]
pub struct CipherChar {
    pub source: char,
    pub mask: char,
    pub remaining: f64,
    pub is_space: bool,
}

impl CipherChar {
    fn masked(source: char, rng: &mut RandomSource) -> Self {
        CipherChar {
            source,
            mask: charset::random_glyph(rng),
            remaining: rng.between(0, MAX_DECODE_SECS) as f64,
            is_space: false,
        }
    }

    fn space(source: char) -> Self {
        CipherChar { source, mask: source, remaining: 0.0, is_space: true }
    }

    /// Still counting down?
    pub fn is_masked(&self) -> bool {
        !self.is_space && self.remaining > TIME_EPS
    }
}

/// The ordered sequence built once per run. The reveal phase decrements
/// timers in place; the sequence is never reordered or resized.
#[derive(Clone, Debug, Default)]
pub struct CipherText {
    chars: Vec<CipherChar>,
}

impl CipherText {
    /// Assign every non-whitespace character a mask glyph and a timer.
    /// Draw order follows text order, so a seeded source reproduces the
    /// same scramble.
    pub fn scramble(text: &str, rng: &mut RandomSource) -> Self {
        let chars = text
            .chars()
            .map(|ch| {
                if ch.is_whitespace() {
                    CipherChar::space(ch)
                } else {
                    CipherChar::masked(ch, rng)
                }
            })
            .collect();
        CipherText { chars }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CipherChar> {
        self.chars.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, CipherChar> {
        self.chars.iter_mut()
    }

    /// True once no character is still counting down.
    pub fn fully_revealed(&self) -> bool {
        self.chars.iter().all(|c| !c.is_masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scramble_keeps_order_and_length() {
        let mut rng = RandomSource::seeded(11);
        let seq = CipherText::scramble("Hi Bob", &mut rng);
        assert_eq!(seq.len(), 6);
        let sources: String = seq.iter().map(|c| c.source).collect();
        assert_eq!(sources, "Hi Bob");
    }

    #[test]
    fn whitespace_is_passthrough() {
        let mut rng = RandomSource::seeded(11);
        let seq = CipherText::scramble("a b\tc\nd", &mut rng);
        for c in seq.iter() {
            if c.source.is_whitespace() {
                assert!(c.is_space);
                assert_eq!(c.mask, c.source);
                assert!(!c.is_masked());
            } else {
                assert!(!c.is_space);
            }
        }
    }

    #[test]
    fn masks_come_from_the_table_with_whole_second_timers() {
        let mut rng = RandomSource::seeded(5);
        let seq = CipherText::scramble("Setec Astronomy", &mut rng);
        for c in seq.iter().filter(|c| !c.is_space) {
            assert!(charset::is_mask_glyph(c.mask));
            assert!((0.0..=5.0).contains(&c.remaining));
            assert_eq!(c.remaining.fract(), 0.0); // whole seconds only
        }
    }

    #[test]
    fn seeded_scramble_is_reproducible() {
        let mut a = RandomSource::seeded(99);
        let mut b = RandomSource::seeded(99);
        let sa = CipherText::scramble("too many secrets", &mut a);
        let sb = CipherText::scramble("too many secrets", &mut b);
        for (x, y) in sa.iter().zip(sb.iter()) {
            assert_eq!(x.mask, y.mask);
            assert_eq!(x.remaining, y.remaining);
        }
    }

    #[test]
    fn empty_text_is_immediately_revealed() {
        let mut rng = RandomSource::seeded(1);
        let seq = CipherText::scramble("", &mut rng);
        assert!(seq.is_empty());
        assert!(seq.fully_revealed());
    }

    #[test]
    fn residue_below_eps_counts_as_revealed() {
        let mut rng = RandomSource::seeded(1);
        let mut seq = CipherText::scramble("x", &mut rng);
        let c = seq.iter_mut().next().unwrap();
        c.remaining = 0.2;
        for _ in 0..4 {
            c.remaining -= 0.05;
        }
        // 0.2 - 4*0.05 leaves ~2.8e-17, not 0.0
        assert!(!c.is_masked());
    }
}
