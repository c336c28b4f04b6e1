//! Time sources used by the task store.

use std::cell::Cell;

use time::OffsetDateTime;

/// Source of the current instant.
pub trait Clock {
    /// Current time in UTC.
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Manually driven clock for deterministic tests and replays.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<OffsetDateTime>,
}

impl FixedClock {
    /// Create a clock frozen at `now`.
    #[must_use]
    pub const fn new(now: OffsetDateTime) -> Self {
        Self { now: Cell::new(now) }
    }

    /// Move the clock to an arbitrary instant (backwards is allowed).
    pub fn set(&self, now: OffsetDateTime) {
        self.now.set(now);
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: time::Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> OffsetDateTime {
        (**self).now()
    }
}
