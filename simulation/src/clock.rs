//! Fixed-interval timers driving the battle tick, the phase countdown and mana.

use std::time::Duration;

use tower_conquest_core::Phase;

const PHASE_INTERVAL: Duration = Duration::from_secs(1);

/// Accumulates elapsed time and reports how many intervals completed.
#[derive(Clone, Copy, Debug)]
struct Timer {
    interval: Duration,
    accumulator: Duration,
}

impl Timer {
    const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Adds `dt` when `active`, otherwise discards any partial interval.
    fn accumulate(&mut self, dt: Duration, active: bool) {
        if active {
            self.accumulator = self.accumulator.saturating_add(dt);
        } else {
            self.accumulator = Duration::ZERO;
        }
    }

    fn fire(&mut self) -> bool {
        if self.interval.is_zero() || self.accumulator < self.interval {
            return false;
        }
        self.accumulator -= self.interval;
        true
    }
}

/// Timers that became due during one slice of elapsed time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Due {
    /// The one-second phase countdown fired.
    pub(crate) second: bool,
    /// The mana regeneration pulse fired.
    pub(crate) mana: bool,
    /// A battle tick is due.
    pub(crate) frame: bool,
}

/// The three independent periodic triggers of a match.
///
/// The phase timer runs during prep and battle; the frame and mana timers only
/// during battle. Pausing is handled by the caller never feeding time in.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Clock {
    frame: Timer,
    phase: Timer,
    mana: Timer,
}

impl Clock {
    pub(crate) const fn new(frame_interval: Duration, mana_interval: Duration) -> Self {
        Self {
            frame: Timer::new(frame_interval),
            phase: Timer::new(PHASE_INTERVAL),
            mana: Timer::new(mana_interval),
        }
    }

    /// Largest slice [`Clock::advance`] accepts so that each timer fires at most once.
    ///
    /// Bounded by the shortest interval so no timer falls behind.
    pub(crate) fn max_slice(&self) -> Duration {
        self.frame
            .interval
            .min(self.mana.interval)
            .min(self.phase.interval)
    }

    /// Feeds `dt` into the timers active in `phase` and reports which fired.
    pub(crate) fn advance(&mut self, dt: Duration, phase: Phase) -> Due {
        let counting = matches!(phase, Phase::Prep | Phase::Battle);
        let battle = phase == Phase::Battle;
        self.phase.accumulate(dt, counting);
        self.mana.accumulate(dt, battle);
        self.frame.accumulate(dt, battle);

        Due {
            second: self.phase.fire(),
            mana: self.mana.fire(),
            frame: self.frame.fire(),
        }
    }

    /// Discards every partial interval.
    pub(crate) fn reset(&mut self) {
        self.frame.accumulator = Duration::ZERO;
        self.phase.accumulator = Duration::ZERO;
        self.mana.accumulator = Duration::ZERO;
    }
}
