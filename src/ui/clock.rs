/// Pacing for animation frames.
///
/// The engine never sleeps directly; it asks a `Clock`. The real one
/// blocks the thread, the test one just records, so the whole animation
/// runs in microseconds under `cargo test`.

use std::time::Duration;

pub trait Clock {
    fn sleep(&mut self, pause: Duration);
}

/// Real pacing: blocks the thread for the full pause.
pub struct WallClock;

impl Clock for WallClock {
    fn sleep(&mut self, pause: Duration) {
        std::thread::sleep(pause);
    }
}

/// Records every requested pause instead of waiting.
#[derive(Default)]
pub struct InstantClock {
    pub slept: Vec<Duration>,
}

impl Clock for InstantClock {
    fn sleep(&mut self, pause: Duration) {
        self.slept.push(pause);
    }
}
