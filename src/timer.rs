//! Frame-loop profiling.

use std::{
    cell::Cell,
    fmt,
    time::{Duration, Instant},
};

use itertools::Itertools;

/// Measures how long an operation takes, averaged over all runs since it was last displayed.
///
/// Displaying the timer with `{}` prints the average and resets it.
pub struct Timer {
    name: &'static str,
    total: Cell<Duration>,
    runs: Cell<u32>,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            total: Cell::new(Duration::ZERO),
            runs: Cell::new(0),
        }
    }

    /// Runs `f` and records how long it took.
    pub fn time<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        f()
    }

    /// Starts timing; the measurement is recorded when the returned guard is dropped.
    pub fn start(&mut self) -> TimerGuard<'_> {
        TimerGuard {
            start: Instant::now(),
            timer: self,
        }
    }

    fn record(&self, elapsed: Duration) {
        self.total.set(self.total.get() + elapsed);
        self.runs.set(self.runs.get() + 1);
    }

    /// Returns the number of runs recorded since the last reset.
    pub fn runs(&self) -> u32 {
        self.runs.get()
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let runs = self.runs.replace(0);
        let total = self.total.replace(Duration::ZERO);
        if runs == 0 {
            return write!(f, "{}: -", self.name);
        }
        let avg_ms = total.as_secs_f32() * 1000.0 / runs as f32;
        write!(f, "{}: {runs}x{avg_ms:.01}ms", self.name)
    }
}

/// Guard returned by [`Timer::start`].
pub struct TimerGuard<'a> {
    start: Instant,
    timer: &'a mut Timer,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.record(self.start.elapsed());
    }
}

/// Counts frames and logs the frame rate once per second.
pub struct FpsCounter {
    name: String,
    frames: u32,
    start: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            start: Instant::now(),
        }
    }

    pub fn tick(&mut self) {
        self.tick_with(std::iter::empty::<&Timer>());
    }

    /// Counts a frame; once a second has passed, logs the FPS followed by `extra` (typically
    /// [`Timer`]s, which are reset by being displayed).
    pub fn tick_with<D: fmt::Display, I: IntoIterator<Item = D>>(&mut self, extra: I) {
        self.frames += 1;
        if self.start.elapsed() < Duration::from_secs(1) {
            return;
        }

        let extra = extra.into_iter().join(", ");
        if extra.is_empty() {
            log::debug!("{}: {} FPS", self.name, self.frames);
        } else {
            log::debug!("{}: {} FPS ({extra})", self.name, self.frames);
        }

        self.frames = 0;
        self.start = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_resets_timer() {
        let mut timer = Timer::new("op");
        timer.time(|| ());
        timer.time(|| ());
        assert_eq!(timer.runs(), 2);

        let shown = timer.to_string();
        assert!(shown.starts_with("op: 2x"), "{shown}");
        assert_eq!(timer.runs(), 0);
        assert_eq!(timer.to_string(), "op: -");
    }
}
