//! Test utilities for the storefront crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests or
//! with the `test-support` feature.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// Build a UTC instant, panicking on impossible dates.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    match Utc
        .with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
    {
        Some(instant) => instant,
        None => panic!("invalid instant {year}-{month}-{day} {hour}:{minute}:{second}"),
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl FixtureClock {
    pub const fn new(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Clock that returns a scripted sequence of instants, one per reading.
///
/// Once the script is exhausted the last instant is repeated. Readings may
/// move backwards, which lets tests exercise clock skew.
#[derive(Debug)]
pub struct SteppingClock {
    state: Mutex<SteppingState>,
}

#[derive(Debug)]
struct SteppingState {
    pending: VecDeque<DateTime<Utc>>,
    last: DateTime<Utc>,
}

impl SteppingClock {
    /// Clock reading `first`, then each of `rest` in turn.
    pub fn new(first: DateTime<Utc>, rest: impl IntoIterator<Item = DateTime<Utc>>) -> Self {
        let mut pending: VecDeque<_> = rest.into_iter().collect();
        pending.push_front(first);
        Self {
            state: Mutex::new(SteppingState {
                pending,
                last: first,
            }),
        }
    }

    /// Append another reading to the script.
    pub fn push(&self, instant: DateTime<Utc>) {
        self.lock_state().pending.push_back(instant);
    }

    fn lock_state(&self) -> MutexGuard<'_, SteppingState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("stepping clock mutex"),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut state = self.lock_state();
        if let Some(next) = state.pending.pop_front() {
            state.last = next;
        }
        state.last
    }
}
