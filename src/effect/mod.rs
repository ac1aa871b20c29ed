/// The effect core: glyph alphabet, randomness, per-character scramble
/// state, and the engines that animate them.

pub mod charset;
pub mod cipher;
pub mod phases;
pub mod rng;
pub mod typer;
