/// Device-facing layer: the terminal surface and frame pacing.

pub mod clock;
pub mod screen;
