/// The three-phase decryption choreography.
///
/// Phase order:
///   1. Type-in: masks appear left to right as if the ciphertext were
///      being typed, then a keypress gate.
///   2. Jumble: a fixed number of full-frame rescrambles.
///   3. Reveal: per-character countdown with flicker until everything
///      has decoded, then the final keypress gate.
///
/// Every animation frame is a full clear-and-rewrite. Pacing comes from
/// `Clock` sleeps between frames, never from the terminal itself.

use std::io;
use std::time::Duration;

use anyhow::{ensure, Result};

use crate::ui::clock::Clock;
use crate::ui::screen::{KeyPress, Screen};

use super::charset;
use super::cipher::{CipherText, TIME_EPS};
use super::rng::RandomSource;

/// Timers below this flicker on the faster 1-in-3 schedule.
const FLICKER_WINDOW_SECS: f64 = 0.5;

/// Cap for every speed flag, in seconds. Keeps validated values well
/// inside `Duration::from_secs_f64`'s domain.
const MAX_SPEED_SECS: f64 = 3600.0;

// ── Speeds ──

/// Frame intervals and durations for one run, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Speeds {
    /// Pause after each typed mask glyph.
    pub type_effect: f64,
    /// Total length of the jumble phase.
    pub jumble_seconds: f64,
    /// Pause between jumble frames.
    pub jumble_loop: f64,
    /// Pause between reveal frames, and the per-frame timer decrement.
    pub reveal_loop: f64,
}

impl Speeds {
    pub const DEFAULT: Speeds = Speeds {
        type_effect: 0.004,
        jumble_seconds: 2.0,
        jumble_loop: 0.035,
        reveal_loop: 0.050,
    };

    // Accepts exactly +0.0..=MAX_SPEED_SECS. The pacer's float-to-
    // Duration conversion refuses anything sign-negative, non-finite,
    // or out of range, so validated pauses can never panic it.
    fn pause_in_range(v: f64) -> bool {
        v.is_sign_positive() && v <= MAX_SPEED_SECS
    }

    /// Reject values that would panic the pacer or stall the reveal
    /// loop forever. Zero pauses are allowed; a zero decrement is not;
    /// everything is capped at `MAX_SPEED_SECS`.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            Self::pause_in_range(self.type_effect),
            "type effect speed must be between 0 and {MAX_SPEED_SECS} seconds"
        );
        ensure!(
            self.jumble_seconds.is_finite() && self.jumble_seconds <= MAX_SPEED_SECS,
            "jumble seconds must be a finite number of seconds, at most {MAX_SPEED_SECS}"
        );
        ensure!(
            Self::pause_in_range(self.jumble_loop),
            "jumble loop speed must be between 0 and {MAX_SPEED_SECS} seconds"
        );
        ensure!(
            Self::pause_in_range(self.reveal_loop) && self.reveal_loop > 0.0,
            "reveal loop speed must be positive, at most {MAX_SPEED_SECS} seconds"
        );
        Ok(())
    }

    /// Jumble frame count: whole loop intervals in the phase duration.
    /// Degenerate settings (zero interval, non-positive duration) give
    /// zero frames and the phase is skipped.
    pub fn jumble_frames(&self) -> u32 {
        if self.jumble_loop <= 0.0 {
            return 0;
        }
        (self.jumble_seconds / self.jumble_loop).floor().max(0.0) as u32
    }
}

impl Default for Speeds {
    fn default() -> Self {
        Speeds::DEFAULT
    }
}

/// How a run ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    /// Ran through the final keypress gate.
    Completed,
    /// The user hit an interrupt key part-way.
    Interrupted,
}

// ── Engine ──

/// Drives the three phases over one scrambled text.
///
/// Generic over the screen and clock so tests swap in `CaptureScreen`
/// and `InstantClock` and inspect every frame the run produced.
pub struct Decryptor<S, C> {
    pub screen: S,
    pub clock: C,
    rng: RandomSource,
    speeds: Speeds,
}

impl<S: Screen, C: Clock> Decryptor<S, C> {
    pub fn new(screen: S, clock: C, rng: RandomSource, speeds: Speeds) -> Self {
        Decryptor { screen, clock, rng, speeds }
    }

    /// Run the full choreography over `text`.
    pub fn run(&mut self, text: &str) -> io::Result<Outcome> {
        let mut seq = CipherText::scramble(text, &mut self.rng);

        self.screen.clear()?;
        self.screen.flush()?;

        if !self.type_in(&seq)? {
            return Ok(Outcome::Interrupted);
        }
        if !self.jumble(&seq)? {
            return Ok(Outcome::Interrupted);
        }
        if !self.reveal(&mut seq)? {
            return Ok(Outcome::Interrupted);
        }
        Ok(Outcome::Completed)
    }

    // Each phase returns Ok(true) to continue, Ok(false) on interrupt.

    /// Phase 1: the fixed masks appear one by one. Whitespace prints
    /// instantly; every mask glyph waits `type_effect`. Ends at the
    /// first keypress gate.
    fn type_in(&mut self, seq: &CipherText) -> io::Result<bool> {
        let pace = Duration::from_secs_f64(self.speeds.type_effect);
        for c in seq.iter() {
            if self.screen.pending_interrupt()? {
                return Ok(false);
            }
            if c.is_space {
                self.screen.put(c.source)?;
                self.screen.flush()?;
            } else {
                self.screen.put(c.mask)?;
                self.screen.flush()?;
                self.clock.sleep(pace);
            }
        }
        Ok(self.screen.wait_key()? != KeyPress::Interrupt)
    }

    /// Phase 2: full-frame rescrambles. The draws are transient; the
    /// stored masks stay untouched for the reveal (hence `&CipherText`).
    fn jumble(&mut self, seq: &CipherText) -> io::Result<bool> {
        let pace = Duration::from_secs_f64(self.speeds.jumble_loop);
        for _ in 0..self.speeds.jumble_frames() {
            if self.screen.pending_interrupt()? {
                return Ok(false);
            }
            self.screen.clear()?;
            for c in seq.iter() {
                if c.is_space {
                    self.screen.put(c.source)?;
                } else {
                    self.screen.put(charset::random_glyph(&mut self.rng))?;
                }
            }
            self.screen.flush()?;
            self.clock.sleep(pace);
        }
        Ok(true)
    }

    /// Phase 3: the countdown. Every still-masked character loses
    /// `reveal_loop` from its timer each frame no matter what the
    /// flicker draw decided, so the frame count is bounded by the
    /// longest timer. One extra frame confirms the full decode, then
    /// the final keypress gate.
    fn reveal(&mut self, seq: &mut CipherText) -> io::Result<bool> {
        let pace = Duration::from_secs_f64(self.speeds.reveal_loop);
        loop {
            if self.screen.pending_interrupt()? {
                return Ok(false);
            }
            self.screen.clear()?;

            let mut revealed = true;
            for c in seq.iter_mut() {
                if c.is_space {
                    self.screen.put(c.source)?;
                    continue;
                }
                if c.remaining > TIME_EPS {
                    // Flicker rule: (timer nearly done AND 1-in-3) OR
                    // 1-in-10, short-circuit left to right.
                    if c.remaining < FLICKER_WINDOW_SECS && self.rng.below(3) == 0
                        || self.rng.below(10) == 0
                    {
                        self.screen.put(charset::random_glyph(&mut self.rng))?;
                    } else {
                        self.screen.put(c.mask)?;
                    }
                    c.remaining -= self.speeds.reveal_loop;
                    revealed = false;
                } else {
                    self.screen.put_decoded(c.source)?;
                }
            }

            self.screen.flush()?;
            self.clock.sleep(pace);
            if revealed {
                break;
            }
        }
        Ok(self.screen.wait_key()? != KeyPress::Interrupt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::clock::InstantClock;
    use crate::ui::screen::CaptureScreen;

    fn driver(speeds: Speeds) -> Decryptor<CaptureScreen, InstantClock> {
        Decryptor::new(
            CaptureScreen::new(),
            InstantClock::default(),
            RandomSource::seeded(1234),
            speeds,
        )
    }

    fn quick() -> Speeds {
        // two jumble frames, 50ms reveal steps
        Speeds {
            type_effect: 0.004,
            jumble_seconds: 0.07,
            jumble_loop: 0.035,
            reveal_loop: 0.050,
        }
    }

    #[test]
    fn jumble_frame_count_is_floor_of_quotient() {
        assert_eq!(Speeds::DEFAULT.jumble_frames(), 57); // 2.0 / 0.035
        assert_eq!(quick().jumble_frames(), 2);
        let none = Speeds { jumble_seconds: 0.02, jumble_loop: 0.035, ..quick() };
        assert_eq!(none.jumble_frames(), 0);
        let skipped = Speeds { jumble_seconds: -1.0, ..quick() };
        assert_eq!(skipped.jumble_frames(), 0);
        let zero_loop = Speeds { jumble_loop: 0.0, ..quick() };
        assert_eq!(zero_loop.jumble_frames(), 0);
    }

    #[test]
    fn validate_rejects_degenerate_speeds() {
        assert!(Speeds::DEFAULT.validate().is_ok());
        assert!(Speeds { reveal_loop: 0.0, ..quick() }.validate().is_err());
        assert!(Speeds { reveal_loop: -0.05, ..quick() }.validate().is_err());
        assert!(Speeds { type_effect: f64::NAN, ..quick() }.validate().is_err());
        assert!(Speeds { type_effect: -0.1, ..quick() }.validate().is_err());
        assert!(Speeds { jumble_loop: f64::INFINITY, ..quick() }.validate().is_err());
        assert!(Speeds { jumble_loop: -1.0, ..quick() }.validate().is_err());
        assert!(Speeds { jumble_seconds: f64::NAN, ..quick() }.validate().is_err());
        // zero pauses are fine as long as the decrement stays positive
        assert!(Speeds { type_effect: 0.0, jumble_loop: 0.0, ..quick() }.validate().is_ok());
        // beyond the cap the pacer's Duration conversion would panic
        assert!(Speeds { type_effect: 1e30, ..quick() }.validate().is_err());
        assert!(Speeds { jumble_seconds: 1e30, ..quick() }.validate().is_err());
        assert!(Speeds { jumble_loop: 1e30, ..quick() }.validate().is_err());
        assert!(Speeds { reveal_loop: 1e30, ..quick() }.validate().is_err());
        // negative zero carries a sign bit the conversion rejects
        assert!(Speeds { type_effect: -0.0, ..quick() }.validate().is_err());
    }

    #[test]
    fn pacer_accepts_every_validated_speed_up_to_the_cap() {
        let speeds = Speeds {
            type_effect: 3600.0,
            jumble_seconds: 0.0,
            jumble_loop: 3600.0,
            reveal_loop: 3600.0,
        };
        assert!(speeds.validate().is_ok());

        // the boundary value must survive Duration::from_secs_f64
        let mut d = driver(speeds);
        assert_eq!(d.run("hi").unwrap(), Outcome::Completed);
        assert!(!d.clock.slept.is_empty());
        assert!(d.clock.slept.iter().all(|p| *p == Duration::from_secs_f64(3600.0)));
    }

    #[test]
    fn type_in_shows_masks_and_paces_only_glyphs() {
        let mut d = driver(quick());
        let seq = CipherText::scramble("Hi Bob", &mut RandomSource::seeded(8));
        assert!(d.type_in(&seq).unwrap());

        // 5 mask glyphs paced, the space free
        assert_eq!(d.clock.slept.len(), 5);
        assert!(d.clock.slept.iter().all(|p| *p == Duration::from_secs_f64(0.004)));
        assert_eq!(d.screen.wait_count, 1);

        let frame = &d.screen.frames[0];
        assert_eq!(frame.chars().count(), 6);
        assert_eq!(frame.chars().nth(2), Some(' '));
        for (ch, c) in frame.chars().zip(seq.iter()) {
            if !c.is_space {
                assert_eq!(ch, c.mask);
                assert!(charset::is_mask_glyph(ch));
            }
        }
    }

    #[test]
    fn jumble_runs_fixed_frames_and_keeps_masks() {
        let mut d = driver(quick());
        let seq = CipherText::scramble("abc", &mut RandomSource::seeded(8));
        let before: Vec<char> = seq.iter().map(|c| c.mask).collect();

        assert!(d.jumble(&seq).unwrap());

        assert_eq!(d.screen.frames.len(), 2);
        for frame in &d.screen.frames {
            assert_eq!(frame.chars().count(), 3);
            assert!(frame.chars().all(charset::is_mask_glyph));
        }
        let after: Vec<char> = seq.iter().map(|c| c.mask).collect();
        assert_eq!(before, after);
        assert_eq!(d.screen.wait_count, 0); // no gate after jumble
    }

    #[test]
    fn reveal_takes_timer_over_interval_frames_plus_confirmation() {
        let mut d = driver(quick());
        let mut seq = CipherText::scramble("Hi Bob", &mut RandomSource::seeded(8));
        for c in seq.iter_mut().filter(|c| !c.is_space) {
            c.remaining = 0.2;
        }

        assert!(d.reveal(&mut seq).unwrap());

        // 0.2 / 0.05: four decrementing frames, one confirming frame
        assert_eq!(d.screen.frames.len(), 5);
        assert_eq!(d.screen.frames[4], "Hi Bob");
        assert_eq!(d.screen.decoded, 5); // all glyphs decode in the last frame only
        assert!(seq.fully_revealed());
        assert_eq!(d.screen.wait_count, 1);
    }

    #[test]
    fn reveal_frame_count_is_bounded_by_longest_timer() {
        let mut d = driver(Speeds { reveal_loop: 1.0, ..quick() });
        let mut seq = CipherText::scramble("abc", &mut RandomSource::seeded(8));
        let timers = [0.0, 1.0, 2.5];
        for (c, t) in seq.iter_mut().zip(timers) {
            c.remaining = t;
        }

        assert!(d.reveal(&mut seq).unwrap());

        // ceil(2.5 / 1.0) = 3 decrementing frames, one confirming frame
        assert_eq!(d.screen.frames.len(), 4);
        assert_eq!(d.screen.frames[3], "abc");
        // the zero-timer char decodes from frame 1 onward
        for frame in &d.screen.frames {
            assert_eq!(frame.chars().next(), Some('a'));
        }
    }

    #[test]
    fn reveal_of_all_zero_timers_is_a_single_frame() {
        let mut d = driver(quick());
        let mut seq = CipherText::scramble("ok", &mut RandomSource::seeded(8));
        for c in seq.iter_mut() {
            c.remaining = 0.0;
        }
        assert!(d.reveal(&mut seq).unwrap());
        assert_eq!(d.screen.frames.len(), 1);
        assert_eq!(d.screen.frames[0], "ok");
    }

    #[test]
    fn reveal_flicker_follows_the_grouped_short_circuit_rolls() {
        let seed = 15;
        let mut d = Decryptor::new(
            CaptureScreen::new(),
            InstantClock::default(),
            RandomSource::seeded(seed),
            Speeds { reveal_loop: 0.25, ..quick() },
        );
        let mut seq = CipherText::scramble("abc", &mut RandomSource::seeded(8));
        for c in seq.iter_mut() {
            c.remaining = 0.6; // first frame above the window, the rest below
        }
        let sources: Vec<char> = "abc".chars().collect();
        let masks: Vec<char> = seq.iter().map(|c| c.mask).collect();

        assert!(d.reveal(&mut seq).unwrap());

        // Replay the draw stream by hand: under the half-second window
        // the 1-in-3 roll comes first and a hit skips the 1-in-10 roll;
        // at or above the window only the 1-in-10 roll is drawn.
        let mut rng = RandomSource::seeded(seed);
        let mut remaining = [0.6f64; 3];
        let mut expect: Vec<String> = Vec::new();
        let (mut skips, mut fallthroughs, mut far_hits) = (0, 0, 0);
        loop {
            let mut frame = String::new();
            let mut revealed = true;
            for (i, &mask) in masks.iter().enumerate() {
                if remaining[i] > TIME_EPS {
                    let flicker = if remaining[i] < FLICKER_WINDOW_SECS && rng.below(3) == 0 {
                        skips += 1;
                        true
                    } else if rng.below(10) == 0 {
                        if remaining[i] < FLICKER_WINDOW_SECS {
                            fallthroughs += 1;
                        } else {
                            far_hits += 1;
                        }
                        true
                    } else {
                        false
                    };
                    frame.push(if flicker { charset::random_glyph(&mut rng) } else { mask });
                    remaining[i] -= 0.25;
                    revealed = false;
                } else {
                    frame.push(sources[i]);
                }
            }
            expect.push(frame);
            if revealed {
                break;
            }
        }

        assert_eq!(d.screen.frames, expect);
        // this seed exercises all three paths of the rule
        assert!(skips > 0 && fallthroughs > 0 && far_hits > 0);
    }

    #[test]
    fn full_run_frame_content_stays_in_alphabet_or_source() {
        let mut d = driver(quick());
        let text = "a b\nc";
        assert_eq!(d.run(text).unwrap(), Outcome::Completed);

        assert_eq!(d.screen.wait_count, 2);
        for frame in &d.screen.frames {
            for (ch, src) in frame.chars().zip(text.chars()) {
                if src.is_whitespace() {
                    assert_eq!(ch, src); // whitespace is never masked
                } else {
                    assert!(charset::is_mask_glyph(ch) || ch == src);
                }
            }
        }
        let last = d.screen.frames.last().unwrap();
        assert_eq!(last.as_str(), text);
    }

    #[test]
    fn full_run_is_deterministic_for_a_seed() {
        let run = || {
            let mut d = driver(quick());
            d.run("No more secrets").unwrap();
            d.screen.frames
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn empty_text_completes_without_drawing() {
        let mut d = driver(quick());
        assert_eq!(d.run("").unwrap(), Outcome::Completed);
        // initial clear + 2 jumble frames + 1 confirming reveal frame
        assert_eq!(d.screen.frames.len(), 4);
        assert!(d.screen.frames.iter().all(|f| f.is_empty()));
        assert_eq!(d.screen.wait_count, 2);
    }

    #[test]
    fn interrupt_key_at_the_gate_stops_the_run() {
        let mut d = driver(quick());
        d.screen.keys.push_back(KeyPress::Interrupt);
        assert_eq!(d.run("abc").unwrap(), Outcome::Interrupted);
        // type-in frame only, jumble never started
        assert_eq!(d.screen.frames.len(), 1);
        assert_eq!(d.screen.wait_count, 1);
    }

    #[test]
    fn pending_interrupt_stops_mid_phase() {
        let mut d = driver(quick());
        d.screen.interrupts.push_back(true);
        assert_eq!(d.run("abc").unwrap(), Outcome::Interrupted);
        // aborted before the first glyph ever appeared
        assert_eq!(d.screen.frames.concat(), "");
        assert_eq!(d.screen.wait_count, 0);
    }
}
