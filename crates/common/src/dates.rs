//! Time source abstraction
//!
//! Services read the current time through `TimeSource` so tests can pin it.

use chrono::{DateTime, Utc};

/// Anything that can tell the current UTC time.
pub trait TimeSource: Send + Sync {
    fn utcnow(&self) -> DateTime<Utc>;
}

/// Wall clock backed by `chrono::Utc::now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn utcnow(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clocks for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Clock that always returns the instant it was last set to.
    #[derive(Debug)]
    pub struct FixedClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl FixedClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self { now: Mutex::new(now) }
        }

        pub fn set(&self, now: DateTime<Utc>) {
            *self.now.lock().unwrap() = now;
        }

        pub fn advance(&self, by: chrono::Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl TimeSource for FixedClock {
        fn utcnow(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}
