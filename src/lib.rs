//! sneakers: movie-style terminal text effects
//!
//! Two binaries share this crate:
//!
//! - **sneakers** types the text in masked, scrambles it for a while,
//!   then decodes it character by character with a flicker, the way the
//!   film's decryption scene plays out.
//! - **hackertyper** types a loaded text a few characters per keypress,
//!   so any amount of keyboard mashing produces flawless code.
//!
//! The animation engine draws through the [`ui::screen::Screen`] trait
//! and paces itself through [`ui::clock::Clock`], so the whole
//! choreography also runs headless against the capture implementations
//! in tests.

pub mod config;
pub mod effect;
pub mod source;
pub mod ui;

pub use effect::phases::{Decryptor, Outcome, Speeds};
pub use effect::rng::RandomSource;
