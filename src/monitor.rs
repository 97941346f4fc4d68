//! Movement accumulation and lock decision.
//!
//! Two axes are diffed against their previous reading every poll. The
//! absolute deltas are summed until either sum crosses its threshold (a
//! trigger) or the window elapses, at which point the sums are committed
//! back to zero. Triggers only spawn the lock action when enough time has
//! passed since the previous spawn.

use std::time::{Duration, Instant};
use tracing::debug;

/// One of the two tracked axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// A pair of raw samples taken in the same poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub x: i64,
    pub y: i64,
}

impl Reading {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// A zero on either axis means the sensor had no data.
    pub fn is_valid(&self) -> bool {
        self.x != 0 && self.y != 0
    }

    fn get(&self, axis: Axis) -> i64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

/// Per-axis accumulation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisState {
    /// Value recorded at the last commit.
    pub baseline: Option<i64>,
    /// Most recent accepted reading.
    pub current: Option<i64>,
    /// Sum of absolute deltas since the last commit.
    pub accumulated: u64,
}

/// Commit and trigger times on the monotonic clock. `None` means never.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowState {
    pub last_commit: Option<Instant>,
    pub last_trigger: Option<Instant>,
}

/// Immutable decision parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thresholds {
    pub x: u64,
    pub y: u64,
    /// Accumulation is reset at least this often.
    pub window: Duration,
    /// A spawn requires strictly more than this since the previous one.
    pub trigger_spacing: Duration,
}

impl Thresholds {
    fn for_axis(&self, axis: Axis) -> u64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            x: 20,
            y: 10,
            window: Duration::from_secs(1),
            trigger_spacing: Duration::from_secs(3),
        }
    }
}

/// What a single call to [`MotionMonitor::observe`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Reading carried a zero; nothing changed.
    Skipped,
    /// First valid reading; only the current values were recorded.
    Initialized,
    /// Deltas were added but no commit happened.
    Accumulated,
    /// The window elapsed without a trigger; accumulation was reset.
    WindowReset,
    /// A threshold was crossed; accumulation was reset. `spawn` is false
    /// when the previous spawn is too recent.
    Triggered { spawn: bool },
}

impl Outcome {
    pub fn should_spawn(&self) -> bool {
        matches!(self, Outcome::Triggered { spawn: true })
    }
}

/// Owns all loop state of the movement monitor.
#[derive(Debug, Clone)]
pub struct MotionMonitor {
    thresholds: Thresholds,
    axes: [AxisState; 2],
    window: WindowState,
}

impl MotionMonitor {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            axes: Default::default(),
            window: WindowState::default(),
        }
    }

    #[cfg(test)]
    pub fn axis(&self, axis: Axis) -> &AxisState {
        &self.axes[axis.index()]
    }

    #[cfg(test)]
    pub fn window(&self) -> &WindowState {
        &self.window
    }

    /// Feed one poll's reading taken at `now`.
    pub fn observe(&mut self, reading: Reading, now: Instant) -> Outcome {
        if !reading.is_valid() {
            return Outcome::Skipped;
        }

        if self.axes[0].current.is_none() {
            for axis in [Axis::X, Axis::Y] {
                let state = &mut self.axes[axis.index()];
                state.baseline = Some(reading.get(axis));
                state.current = Some(reading.get(axis));
            }
            return Outcome::Initialized;
        }

        for axis in [Axis::X, Axis::Y] {
            let state = &mut self.axes[axis.index()];
            let previous = state.current.unwrap_or(reading.get(axis));
            state.accumulated = state
                .accumulated
                .saturating_add(reading.get(axis).abs_diff(previous));
        }

        let triggered = [Axis::X, Axis::Y]
            .into_iter()
            .any(|axis| self.axes[axis.index()].accumulated > self.thresholds.for_axis(axis));
        let expired = !triggered
            && elapsed(now, self.window.last_commit)
                .map_or(true, |e| e >= self.thresholds.window);

        let outcome = if triggered || expired {
            debug!(
                "commit: x={} [{}] since {:?}, y={} [{}] since {:?}",
                reading.x,
                self.axes[0].accumulated,
                self.axes[0].baseline,
                reading.y,
                self.axes[1].accumulated,
                self.axes[1].baseline
            );
            self.commit(now);

            if triggered {
                let spawn = elapsed(now, self.window.last_trigger)
                    .map_or(true, |e| e > self.thresholds.trigger_spacing);
                if spawn {
                    self.window.last_trigger = Some(now);
                } else {
                    debug!("trigger suppressed, last spawn too recent");
                }
                Outcome::Triggered { spawn }
            } else {
                Outcome::WindowReset
            }
        } else {
            Outcome::Accumulated
        };

        // The baseline taken by commit() is the value before this reading.
        for axis in [Axis::X, Axis::Y] {
            self.axes[axis.index()].current = Some(reading.get(axis));
        }

        outcome
    }

    fn commit(&mut self, now: Instant) {
        self.window.last_commit = Some(now);
        for state in &mut self.axes {
            state.baseline = state.current;
            state.accumulated = 0;
        }
    }
}

/// Time since `then`, or `None` if `then` never happened. A `now` earlier
/// than `then` reads as zero elapsed.
fn elapsed(now: Instant, then: Option<Instant>) -> Option<Duration> {
    then.map(|t| now.saturating_duration_since(t))
}
