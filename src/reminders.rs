//! Reminders and the polling scheduler
//!
//! Due reminders are found by polling wall-clock time on a fixed
//! interval rather than arming one timer per reminder. Polling tolerates
//! clock drift and missed ticks (a reminder that came due while the
//! process was suspended fires on the next tick after resume) at the
//! cost of up to one interval of latency.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;

/// Poll interval for due reminders, in seconds
pub const POLL_INTERVAL_SECS: u64 = 5;

/// A scheduled notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Unique id, generated at creation
    pub id: Uuid,

    /// Free-text task description
    pub task: String,

    /// Absolute wall-clock deadline, epoch milliseconds
    pub due_at_ms: i64,

    /// The utterance that created this reminder
    pub source_command: String,

    /// Set true exactly once, when the notification is delivered
    pub fired: bool,
}

impl Reminder {
    /// Create an unfired reminder with a fresh id
    #[must_use]
    pub fn new(task: impl Into<String>, due_at_ms: i64, source_command: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: task.into(),
            due_at_ms,
            source_command: source_command.into(),
            fired: false,
        }
    }
}

/// Reminders keyed by id
///
/// Entries are never deleted in-session; fired reminders are retained
/// for history until the session resets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReminderSet {
    reminders: BTreeMap<Uuid, Reminder>,
}

impl ReminderSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reminder, returning its id
    pub fn insert(&mut self, reminder: Reminder) -> Uuid {
        let id = reminder.id;
        self.reminders.insert(id, reminder);
        id
    }

    /// Look up a reminder by id
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Reminder> {
        self.reminders.get(&id)
    }

    /// Number of reminders, fired or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    /// Iterate reminders in id order
    pub fn iter(&self) -> impl Iterator<Item = &Reminder> {
        self.reminders.values()
    }

    /// Snapshot of reminders due at `now_ms` that have not fired
    #[must_use]
    pub fn due_unfired(&self, now_ms: i64) -> Vec<Reminder> {
        self.reminders
            .values()
            .filter(|r| !r.fired && now_ms >= r.due_at_ms)
            .cloned()
            .collect()
    }

    /// Flip `fired` for the given ids
    ///
    /// Rebuilds the whole collection in one step so an overlapping due
    /// check never observes a half-updated entry.
    pub fn mark_fired(&mut self, ids: &[Uuid]) {
        let updated: BTreeMap<Uuid, Reminder> = self
            .reminders
            .iter()
            .map(|(id, reminder)| {
                let mut reminder = reminder.clone();
                if ids.contains(id) {
                    reminder.fired = true;
                }
                (*id, reminder)
            })
            .collect();
        self.reminders = updated;
    }

    /// Take every due, unfired reminder, marking each fired first
    ///
    /// The flag flips before the caller can deliver any notification, so
    /// a second check — even one that runs immediately after — sees the
    /// reminders as already fired. At-most-once delivery follows.
    pub fn take_due(&mut self, now_ms: i64) -> Vec<Reminder> {
        let due = self.due_unfired(now_ms);
        if !due.is_empty() {
            let ids: Vec<Uuid> = due.iter().map(|r| r.id).collect();
            self.mark_fired(&ids);
        }
        due
    }
}

/// Polls a reminder set against an injected clock
#[derive(Debug)]
pub struct ReminderScheduler<C: Clock> {
    clock: C,
}

impl<C: Clock> ReminderScheduler<C> {
    /// Create a scheduler reading time from `clock`
    pub const fn new(clock: C) -> Self {
        Self { clock }
    }

    /// One poll tick: returns reminders to deliver now, already marked
    /// fired
    pub fn poll(&self, reminders: &mut ReminderSet) -> Vec<Reminder> {
        let due = reminders.take_due(self.clock.now_ms());
        for reminder in &due {
            tracing::info!(
                id = %reminder.id,
                task = %reminder.task,
                due_at_ms = reminder.due_at_ms,
                "reminder due"
            );
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reminder_is_unfired() {
        let r = Reminder::new("call mom", 1_000, "set reminder to call mom");
        assert!(!r.fired);
        assert_eq!(r.task, "call mom");
    }

    #[test]
    fn test_due_unfired_filters_by_time_and_flag() {
        let mut set = ReminderSet::new();
        set.insert(Reminder::new("early", 1_000, "x"));
        set.insert(Reminder::new("late", 9_000, "y"));

        let due = set.due_unfired(5_000);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].task, "early");

        // Exactly at the deadline counts as due
        assert_eq!(set.due_unfired(9_000).len(), 2);
    }

    #[test]
    fn test_take_due_fires_at_most_once() {
        let mut set = ReminderSet::new();
        let id = set.insert(Reminder::new("water plants", 1_000, "x"));

        let first = set.take_due(2_000);
        assert_eq!(first.len(), 1);

        // Repeated ticks, including one at the same instant, deliver
        // nothing further
        assert!(set.take_due(2_000).is_empty());
        assert!(set.take_due(3_000).is_empty());

        // Retained for history, flagged fired
        assert_eq!(set.len(), 1);
        assert!(set.get(id).unwrap().fired);
    }

    #[test]
    fn test_mark_fired_leaves_others_untouched() {
        let mut set = ReminderSet::new();
        let a = set.insert(Reminder::new("a", 1_000, "x"));
        let b = set.insert(Reminder::new("b", 1_000, "y"));

        set.mark_fired(&[a]);
        assert!(set.get(a).unwrap().fired);
        assert!(!set.get(b).unwrap().fired);
    }
}
