//! Clock sources used for every duration calculation.
//!
//! The engine never reads the wall clock directly; it asks a [`Clock`] so tests
//! can pin or script the timeline.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Server wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Returns the same instant until moved with [`FixedClock::set`] or [`FixedClock::advance`].
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(at),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        let mut guard = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.current.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Plays back `first` followed by `then`, one instant per call. Once the script
/// is exhausted the last instant repeats.
#[derive(Debug)]
pub struct ScriptedClock {
    script: Mutex<(VecDeque<DateTime<Utc>>, DateTime<Utc>)>,
}

impl ScriptedClock {
    pub fn new<I>(first: DateTime<Utc>, then: I) -> Self
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut queue: VecDeque<_> = then.into_iter().collect();
        queue.push_front(first);
        Self {
            script: Mutex::new((queue, first)),
        }
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> DateTime<Utc> {
        let mut guard = match self.script.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let (queue, last) = &mut *guard;
        if let Some(next) = queue.pop_front() {
            *last = next;
        }
        *last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn fixed_clock_holds_until_moved() {
        let clock = FixedClock::new(t0());
        assert_eq!(clock.now(), t0());
        assert_eq!(clock.now(), t0());

        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), t0() + Duration::minutes(5));

        clock.set(t0());
        assert_eq!(clock.now(), t0());
    }

    #[test]
    fn scripted_clock_replays_then_repeats_last() {
        let clock = ScriptedClock::new(t0(), [t0() + Duration::seconds(1)]);
        assert_eq!(clock.now(), t0());
        assert_eq!(clock.now(), t0() + Duration::seconds(1));
        assert_eq!(clock.now(), t0() + Duration::seconds(1));
    }

    #[test]
    fn scripted_clock_with_single_instant_never_reads_wall_clock() {
        let clock = ScriptedClock::new(t0(), Vec::new());
        assert_eq!(clock.now(), t0());
        assert_eq!(clock.now(), t0());
    }

    #[test]
    fn shared_clock_delegates() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(t0()));
        assert_eq!(clock.now(), t0());
    }
}
