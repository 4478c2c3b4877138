//! Frame timing.
//!
//! [`Timer`] is a plain stopwatch. [`StepTimer`] drives the per-frame
//! update either at a fixed rate or once per rendered frame, and keeps a
//! frames-per-second counter.

use std::time::{Duration, Instant};

/// Canonical tick resolution used by [`StepTimer`] (100ns ticks).
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Deltas larger than this are clamped (e.g. after sitting in a debugger).
const MAX_DELTA: Duration = Duration::from_millis(100);

/// High-resolution stopwatch.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    last_tick: Instant,
}

impl Timer {
    /// Create a new timer, starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Get the total elapsed time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get the elapsed time in seconds since the timer was created.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Get the time elapsed since the last call to `tick()`.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        delta
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed or variable step timer.
///
/// In fixed mode each call to [`tick`](Self::tick) runs the update callback
/// zero or more times, once per whole target interval that has elapsed.
/// Deltas within a quarter millisecond of the target are snapped to it so a
/// 60 Hz update on a 59.94 Hz display does not slowly drift into a dropped
/// frame. In variable mode the callback runs exactly once per tick.
#[derive(Debug)]
pub struct StepTimer {
    last_time: Instant,

    elapsed_ticks: u64,
    total_ticks: u64,
    left_over_ticks: u64,

    frame_count: u32,
    frames_per_second: u32,
    frames_this_second: u32,
    second_counter: Duration,

    fixed_time_step: bool,
    target_elapsed_ticks: u64,
}

impl StepTimer {
    /// Creates a step timer targeting `target_fps` updates per second.
    ///
    /// # Panics
    ///
    /// Panics if `target_fps` is zero.
    pub fn new(target_fps: u32, fixed_time_step: bool) -> Self {
        assert!(target_fps > 0, "target_fps must be non-zero");
        Self {
            last_time: Instant::now(),
            elapsed_ticks: 0,
            total_ticks: 0,
            left_over_ticks: 0,
            frame_count: 0,
            frames_per_second: 0,
            frames_this_second: 0,
            second_counter: Duration::ZERO,
            fixed_time_step,
            target_elapsed_ticks: TICKS_PER_SECOND / u64::from(target_fps),
        }
    }

    /// Reads the clock and runs `update` for the time that has passed.
    pub fn tick<F: FnMut(&StepTimer)>(&mut self, update: F) {
        let now = Instant::now();
        let delta = now - self.last_time;
        self.last_time = now;
        self.advance(delta, update);
    }

    /// Accounts for `delta` of wall-clock time without reading the clock.
    pub fn advance<F: FnMut(&StepTimer)>(&mut self, delta: Duration, mut update: F) {
        self.second_counter += delta;

        let mut ticks = duration_to_ticks(delta.min(MAX_DELTA));
        let last_frame_count = self.frame_count;

        if self.fixed_time_step {
            if ticks.abs_diff(self.target_elapsed_ticks) < TICKS_PER_SECOND / 4000 {
                ticks = self.target_elapsed_ticks;
            }

            self.left_over_ticks += ticks;

            while self.left_over_ticks >= self.target_elapsed_ticks {
                self.elapsed_ticks = self.target_elapsed_ticks;
                self.total_ticks += self.target_elapsed_ticks;
                self.left_over_ticks -= self.target_elapsed_ticks;
                self.frame_count += 1;

                update(self);
            }
        } else {
            self.elapsed_ticks = ticks;
            self.total_ticks += ticks;
            self.left_over_ticks = 0;
            self.frame_count += 1;

            update(self);
        }

        if self.frame_count != last_frame_count {
            self.frames_this_second += 1;
        }

        if self.second_counter >= Duration::from_secs(1) {
            self.frames_per_second = self.frames_this_second;
            self.frames_this_second = 0;
            let rem = self.second_counter.as_nanos() % 1_000_000_000;
            self.second_counter = Duration::from_nanos(rem as u64);
        }
    }

    /// Discards accumulated time, e.g. after a long blocking operation.
    pub fn reset_elapsed_time(&mut self) {
        self.last_time = Instant::now();
        self.left_over_ticks = 0;
        self.frames_per_second = 0;
        self.frames_this_second = 0;
        self.second_counter = Duration::ZERO;
    }

    /// Seconds covered by the most recent update step.
    pub fn elapsed_seconds(&self) -> f32 {
        ticks_to_seconds(self.elapsed_ticks)
    }

    /// Seconds accumulated by all update steps so far.
    pub fn total_seconds(&self) -> f64 {
        self.total_ticks as f64 / TICKS_PER_SECOND as f64
    }

    /// Number of update steps run so far.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Frames counted during the last complete wall-clock second.
    pub fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }

    /// Whether updates run at the target rate rather than once per tick.
    pub fn is_fixed_time_step(&self) -> bool {
        self.fixed_time_step
    }
}

fn duration_to_ticks(duration: Duration) -> u64 {
    (duration.as_nanos() / (1_000_000_000 / u128::from(TICKS_PER_SECOND))) as u64
}

fn ticks_to_seconds(ticks: u64) -> f32 {
    (ticks as f64 / TICKS_PER_SECOND as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_60hz() -> Duration {
        Duration::from_nanos(1_000_000_000 / 60)
    }

    #[test]
    fn test_fixed_step_runs_once_per_target_interval() {
        let mut timer = StepTimer::new(60, true);
        let mut updates = 0;
        timer.advance(frame_60hz(), |_| updates += 1);
        assert_eq!(updates, 1);
        assert_eq!(timer.frame_count(), 1);
    }

    #[test]
    fn test_fixed_step_snaps_small_deviation() {
        let mut timer = StepTimer::new(60, true);
        let mut steps = Vec::new();
        // 59.94 Hz frame: 16.683ms, within 0.25ms of the 60 Hz target
        timer.advance(Duration::from_micros(16_683), |t| {
            steps.push(t.elapsed_seconds())
        });
        assert_eq!(steps.len(), 1);
        assert!((steps[0] - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_fixed_step_catches_up_multiple_steps() {
        let mut timer = StepTimer::new(60, true);
        let mut updates = 0;
        timer.advance(Duration::from_millis(50), |_| updates += 1);
        assert_eq!(updates, 3);
    }

    #[test]
    fn test_fixed_step_accumulates_leftover() {
        let mut timer = StepTimer::new(60, true);
        let mut updates = 0;
        timer.advance(Duration::from_millis(10), |_| updates += 1);
        assert_eq!(updates, 0);
        timer.advance(Duration::from_millis(10), |_| updates += 1);
        assert_eq!(updates, 1);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut timer = StepTimer::new(60, true);
        let mut updates = 0;
        timer.advance(Duration::from_secs(5), |_| updates += 1);
        // 100ms worth of 60 Hz steps
        assert_eq!(updates, 6);
    }

    #[test]
    fn test_variable_step_reports_raw_delta() {
        let mut timer = StepTimer::new(60, false);
        let mut seen = Vec::new();
        timer.advance(Duration::from_millis(25), |t| seen.push(t.elapsed_seconds()));
        assert_eq!(seen.len(), 1);
        assert!((seen[0] - 0.025).abs() < 1e-6);
        assert!((timer.total_seconds() - 0.025).abs() < 1e-9);
    }

    #[test]
    fn test_frames_per_second_counter() {
        let mut timer = StepTimer::new(60, false);
        for _ in 0..50 {
            timer.advance(Duration::from_millis(20), |_| {});
        }
        assert_eq!(timer.frames_per_second(), 50);
    }

    #[test]
    fn test_reset_elapsed_time_drops_leftover() {
        let mut timer = StepTimer::new(60, true);
        timer.advance(Duration::from_millis(10), |_| {});
        timer.reset_elapsed_time();
        let mut updates = 0;
        timer.advance(Duration::from_millis(10), |_| updates += 1);
        assert_eq!(updates, 0);
        assert_eq!(timer.frames_per_second(), 0);
    }

    #[test]
    fn test_timer_tick_is_monotonic() {
        let mut timer = Timer::new();
        let first = timer.tick();
        let second = timer.tick();
        assert!(first <= timer.elapsed());
        assert!(second <= timer.elapsed());
    }

    #[test]
    fn test_step_mode_is_reported() {
        assert!(StepTimer::new(60, true).is_fixed_time_step());
        assert!(!StepTimer::new(60, false).is_fixed_time_step());
    }
}
