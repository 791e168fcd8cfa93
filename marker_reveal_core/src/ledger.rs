// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Epoch-scoped delayed actions.
//!
//! The [`TimerLedger`] owns every pending delayed action for one marker
//! session. A session is identified by an [`Epoch`] token. At most one epoch
//! is live at a time; [`cancel_all`](TimerLedger::cancel_all) ends it and
//! drops its pending actions synchronously, so nothing scheduled during a
//! cancelled session can ever fire, even if it was already due.
//!
//! Actions are plain data (`A`), not callbacks. The owner pulls due actions
//! with [`pop_due`](TimerLedger::pop_due) and interprets them, which keeps
//! ordering deterministic: actions fire in due-time order, and actions with
//! the same due time fire in the order they were scheduled.
//!
//! The ledger holds no clock of its own. Callers pass the time explicitly,
//! and a firing action should schedule its follow-ups relative to its own
//! due time rather than the (possibly late) time it was pumped at.

use alloc::vec::Vec;
use core::fmt;

use crate::time::{Duration, HostTime};

/// Lifetime token of one marker-acquired session.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Epoch(u64);

impl Epoch {
    /// Returns the raw serial number (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn serial(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Epoch({})", self.0)
    }
}

/// Errors returned by [`TimerLedger::begin_epoch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerError {
    /// An epoch is still live; it must be cancelled first.
    EpochStillActive(Epoch),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EpochStillActive(epoch) => {
                write!(f, "{epoch:?} is still active; cancel it before starting another")
            }
        }
    }
}

impl core::error::Error for LedgerError {}

/// A due action handed back by [`TimerLedger::pop_due`].
#[derive(Clone, Debug, PartialEq)]
pub struct Due<A> {
    /// Epoch the action was scheduled under.
    pub epoch: Epoch,
    /// When the action was due (not when it was popped).
    pub at: HostTime,
    /// The action itself.
    pub action: A,
}

#[derive(Clone, Debug)]
struct Pending<A> {
    at: HostTime,
    action: A,
}

/// Pending delayed actions for the live epoch.
#[derive(Debug)]
pub struct TimerLedger<A> {
    active: Option<Epoch>,
    next_epoch: u64,
    /// Kept sorted by due time, FIFO among equal due times.
    pending: Vec<Pending<A>>,
}

impl<A> Default for TimerLedger<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TimerLedger<A> {
    /// Creates an empty ledger with no live epoch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: None,
            next_epoch: 1,
            pending: Vec::new(),
        }
    }

    /// Starts a new epoch.
    ///
    /// Fails if the previous epoch has not been cancelled.
    pub fn begin_epoch(&mut self) -> Result<Epoch, LedgerError> {
        if let Some(active) = self.active {
            return Err(LedgerError::EpochStillActive(active));
        }
        let epoch = Epoch(self.next_epoch);
        self.next_epoch += 1;
        self.active = Some(epoch);
        Ok(epoch)
    }

    /// Returns the live epoch, if any.
    #[must_use]
    pub const fn active(&self) -> Option<Epoch> {
        self.active
    }

    /// Returns `true` if `epoch` is the live epoch.
    #[must_use]
    pub fn is_active(&self, epoch: Epoch) -> bool {
        self.active == Some(epoch)
    }

    /// Schedules `action` to fire at `now + delay` under `epoch`.
    ///
    /// Scheduling against a stale epoch is a no-op and returns `false`.
    pub fn schedule(&mut self, epoch: Epoch, now: HostTime, delay: Duration, action: A) -> bool {
        if !self.is_active(epoch) {
            return false;
        }
        let at = now.saturating_add(delay);
        // Insert after every entry due at or before `at`, keeping FIFO order
        // among equal due times.
        let pos = self.pending.partition_point(|p| p.at <= at);
        self.pending.insert(pos, Pending { at, action });
        true
    }

    /// Ends `epoch` and drops all of its pending actions.
    ///
    /// Returns how many actions were dropped. Cancelling a stale epoch is a
    /// no-op returning 0.
    pub fn cancel_all(&mut self, epoch: Epoch) -> usize {
        if !self.is_active(epoch) {
            return 0;
        }
        self.active = None;
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Drops the live epoch's pending actions that match `predicate`.
    ///
    /// Used to abandon one in-flight choreography (e.g. a superseded page
    /// transition) without ending the session. Returns how many were dropped.
    pub fn cancel_matching(&mut self, epoch: Epoch, mut predicate: impl FnMut(&A) -> bool) -> usize {
        if !self.is_active(epoch) {
            return 0;
        }
        let before = self.pending.len();
        self.pending.retain(|p| !predicate(&p.action));
        before - self.pending.len()
    }

    /// Removes and returns the earliest action due at or before `now`.
    pub fn pop_due(&mut self, now: HostTime) -> Option<Due<A>> {
        let epoch = self.active?;
        match self.pending.first() {
            Some(first) if first.at <= now => {}
            _ => return None,
        }
        let p = self.pending.remove(0);
        Some(Due {
            epoch,
            at: p.at,
            action: p.action,
        })
    }

    /// Returns when the next pending action is due.
    #[must_use]
    pub fn next_due(&self) -> Option<HostTime> {
        self.pending.first().map(|p| p.at)
    }

    /// Returns the number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Iterates over pending actions in firing order.
    pub fn pending(&self) -> impl Iterator<Item = (HostTime, &A)> + '_ {
        self.pending.iter().map(|p| (p.at, &p.action))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn drain(ledger: &mut TimerLedger<&'static str>, now: HostTime) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(due) = ledger.pop_due(now) {
            fired.push(due.action);
        }
        fired
    }

    #[test]
    fn only_one_epoch_at_a_time() {
        let mut ledger = TimerLedger::<()>::new();
        let first = ledger.begin_epoch().unwrap();
        assert_eq!(
            ledger.begin_epoch(),
            Err(LedgerError::EpochStillActive(first))
        );
        ledger.cancel_all(first);
        let second = ledger.begin_epoch().unwrap();
        assert_ne!(first, second);
        assert!(ledger.is_active(second));
        assert!(!ledger.is_active(first));
    }

    #[test]
    fn fires_in_due_order_then_schedule_order() {
        let mut ledger = TimerLedger::new();
        let epoch = ledger.begin_epoch().unwrap();
        let t0 = HostTime(0);
        ledger.schedule(epoch, t0, Duration(500), "late");
        ledger.schedule(epoch, t0, Duration(100), "early-a");
        ledger.schedule(epoch, t0, Duration(100), "early-b");
        ledger.schedule(epoch, t0, Duration::ZERO, "now");

        assert_eq!(drain(&mut ledger, HostTime(99)), vec!["now"]);
        assert_eq!(drain(&mut ledger, HostTime(100)), vec!["early-a", "early-b"]);
        assert_eq!(drain(&mut ledger, HostTime(10_000)), vec!["late"]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn equal_due_times_keep_schedule_order() {
        let mut ledger = TimerLedger::new();
        let epoch = ledger.begin_epoch().unwrap();
        for name in ["a", "b", "c"] {
            ledger.schedule(epoch, HostTime(10), Duration(5), name);
        }
        ledger.schedule(epoch, HostTime(0), Duration(15), "d");
        assert_eq!(drain(&mut ledger, HostTime(15)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn cancel_all_voids_due_actions() {
        let mut ledger = TimerLedger::new();
        let epoch = ledger.begin_epoch().unwrap();
        ledger.schedule(epoch, HostTime(0), Duration(10), "due");
        ledger.schedule(epoch, HostTime(0), Duration(10_000), "later");

        assert_eq!(ledger.cancel_all(epoch), 2);
        assert_eq!(ledger.pop_due(HostTime(1_000_000)), None);
        assert_eq!(ledger.active(), None);
    }

    #[test]
    fn stale_epoch_is_inert() {
        let mut ledger = TimerLedger::new();
        let stale = ledger.begin_epoch().unwrap();
        ledger.cancel_all(stale);
        let live = ledger.begin_epoch().unwrap();
        ledger.schedule(live, HostTime(0), Duration(10), "live");

        assert!(!ledger.schedule(stale, HostTime(0), Duration(1), "stale"));
        assert_eq!(ledger.cancel_all(stale), 0, "stale cancel must not touch live epoch");
        assert_eq!(ledger.cancel_matching(stale, |_| true), 0);
        assert_eq!(drain(&mut ledger, HostTime(10)), vec!["live"]);
    }

    #[test]
    fn cancel_matching_keeps_the_rest() {
        let mut ledger = TimerLedger::new();
        let epoch = ledger.begin_epoch().unwrap();
        ledger.schedule(epoch, HostTime(0), Duration(10), "page:1");
        ledger.schedule(epoch, HostTime(0), Duration(20), "reveal");
        ledger.schedule(epoch, HostTime(0), Duration(30), "page:1");

        assert_eq!(ledger.cancel_matching(epoch, |a| a.starts_with("page")), 2);
        assert_eq!(drain(&mut ledger, HostTime(100)), vec!["reveal"]);
        assert!(ledger.is_active(epoch));
    }

    #[test]
    fn pop_due_reports_scheduled_time() {
        let mut ledger = TimerLedger::new();
        let epoch = ledger.begin_epoch().unwrap();
        ledger.schedule(epoch, HostTime(1_000), Duration(6_000), "reveal");
        let due = ledger.pop_due(HostTime(9_999)).unwrap();
        assert_eq!(due.at, HostTime(7_000));
        assert_eq!(due.epoch, epoch);
        assert_eq!(ledger.next_due(), None);
    }
}
