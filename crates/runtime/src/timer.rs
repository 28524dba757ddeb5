//! Schedule callbacks in the future.
use crate::core::time::{Duration, Instant};

use std::fmt;

/// The identifier of a scheduled timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(u64);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timeout#{}", self.0)
    }
}

/// What a timeout callback wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// The timeout is done.
    Never,
    /// Run again this long after the previous deadline.
    After(Duration),
}

/// A timeout that is due, taken out of the queue while it runs.
#[derive(Debug)]
pub struct Due<C> {
    /// The id of the timeout.
    pub id: Id,
    /// The deadline it was scheduled for.
    pub deadline: Instant,
    /// The callback.
    pub callback: C,
}

#[derive(Debug)]
struct Entry<C> {
    id: Id,
    deadline: Instant,
    callback: C,
}

/// A queue of timeouts ordered by deadline.
///
/// Timeouts with the same deadline run in the order they were added.
#[derive(Debug)]
pub struct Timeouts<C> {
    next_id: u64,
    entries: Vec<Entry<C>>,
    running: Vec<Id>,
    cancelled: Vec<Id>,
}

impl<C> Default for Timeouts<C> {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
            running: Vec::new(),
            cancelled: Vec::new(),
        }
    }
}

impl<C> Timeouts<C> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `callback` to run `delay` after `now`.
    pub fn add(&mut self, now: Instant, delay: Duration, callback: C) -> Id {
        let id = Id(self.next_id);
        self.next_id += 1;

        let deadline = now.checked_add(delay).unwrap_or(far_future(now));
        self.insert(id, deadline, callback);

        id
    }

    /// Cancels a timeout, returning true if it was pending or running.
    pub fn remove(&mut self, id: Id) -> bool {
        if let Some(index) = self.entries.iter().position(|entry| entry.id == id) {
            let _ = self.entries.remove(index);
            return true;
        }

        if self.running.contains(&id) && !self.cancelled.contains(&id) {
            self.cancelled.push(id);
            return true;
        }

        false
    }

    /// Returns true if the timeout is waiting for its deadline.
    pub fn contains(&self, id: Id) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Returns the number of pending timeouts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no timeout is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the earliest deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.first().map(|entry| entry.deadline)
    }

    /// Clamps `timeout` so it does not pass the next deadline.
    ///
    /// `None` means "no limit".
    pub fn time_to_wait(&self, now: Instant, timeout: Option<Duration>) -> Option<Duration> {
        let Some(deadline) = self.next_deadline() else {
            return timeout;
        };

        let until = deadline.saturating_duration_since(now);

        Some(timeout.map_or(until, |timeout| timeout.min(until)))
    }

    /// Takes every timeout whose deadline is not after `now`.
    ///
    /// Each of them must be handed back through [`Timeouts::finish`].
    pub fn take_due(&mut self, now: Instant) -> Vec<Due<C>> {
        let count = self
            .entries
            .iter()
            .take_while(|entry| entry.deadline <= now)
            .count();

        self.entries
            .drain(..count)
            .map(|entry| {
                self.running.push(entry.id);

                Due {
                    id: entry.id,
                    deadline: entry.deadline,
                    callback: entry.callback,
                }
            })
            .collect()
    }

    /// Hands a due timeout back after its callback ran.
    ///
    /// A repeated timeout keeps its [`Id`] and is scheduled relative to its
    /// previous deadline, so it does not drift. A repeat whose next deadline
    /// is already behind `now` is scheduled from `now` instead, so missed
    /// periods are dropped rather than run back to back.
    pub fn finish(&mut self, due: Due<C>, repeat: Repeat, now: Instant) {
        self.running.retain(|id| *id != due.id);

        if let Some(index) = self.cancelled.iter().position(|id| *id == due.id) {
            let _ = self.cancelled.swap_remove(index);
            return;
        }

        if let Repeat::After(delay) = repeat {
            let mut deadline = due
                .deadline
                .checked_add(delay)
                .unwrap_or(far_future(due.deadline));

            if deadline < now {
                log::trace!("{} missed its deadline by {:?}", due.id, now - deadline);
                deadline = now.checked_add(delay).unwrap_or(far_future(now));
            }

            self.insert(due.id, deadline, due.callback);
        }
    }

    fn insert(&mut self, id: Id, deadline: Instant, callback: C) {
        let index = self
            .entries
            .partition_point(|entry| entry.deadline <= deadline);

        self.entries.insert(
            index,
            Entry {
                id,
                deadline,
                callback,
            },
        );
    }
}

fn far_future(now: Instant) -> Instant {
    const CENTURY: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

    now.checked_add(CENTURY).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn due_timeouts_come_out_in_deadline_order() {
        let now = Instant::now();
        let mut timeouts = Timeouts::new();

        let _ = timeouts.add(now, ms(30), "third");
        let _ = timeouts.add(now, ms(10), "first");
        let _ = timeouts.add(now, ms(10), "second");

        let due: Vec<_> = timeouts
            .take_due(now + ms(20))
            .into_iter()
            .map(|due| due.callback)
            .collect();

        assert_eq!(due, vec!["first", "second"]);
        assert_eq!(timeouts.len(), 1);
    }

    #[test]
    fn time_to_wait_is_clamped_to_the_next_deadline() {
        let now = Instant::now();
        let mut timeouts = Timeouts::new();

        assert_eq!(timeouts.time_to_wait(now, None), None);
        assert_eq!(timeouts.time_to_wait(now, Some(ms(5))), Some(ms(5)));

        let _ = timeouts.add(now, ms(40), ());

        assert_eq!(timeouts.time_to_wait(now, None), Some(ms(40)));
        assert_eq!(timeouts.time_to_wait(now, Some(ms(100))), Some(ms(40)));
        assert_eq!(timeouts.time_to_wait(now, Some(ms(10))), Some(ms(10)));
        assert_eq!(timeouts.time_to_wait(now + ms(50), None), Some(Duration::ZERO));
    }

    #[test]
    fn repeats_are_relative_to_the_previous_deadline() {
        let now = Instant::now();
        let mut timeouts = Timeouts::new();
        let id = timeouts.add(now, ms(10), ());

        let mut due = timeouts.take_due(now + ms(15));
        let first = due.remove(0);
        timeouts.finish(first, Repeat::After(ms(10)), now + ms(15));

        assert!(timeouts.contains(id));
        assert_eq!(timeouts.next_deadline(), Some(now + ms(20)));
    }

    #[test]
    fn late_repeats_restart_from_now() {
        let now = Instant::now();
        let mut timeouts = Timeouts::new();
        let _ = timeouts.add(now, ms(10), ());

        let late = now + ms(1000);
        let mut due = timeouts.take_due(late);
        timeouts.finish(due.remove(0), Repeat::After(ms(10)), late);

        assert_eq!(timeouts.next_deadline(), Some(late + ms(10)));
        assert!(timeouts.take_due(late).is_empty());
    }

    #[test]
    fn removing_a_running_timeout_cancels_its_repeat() {
        let now = Instant::now();
        let mut timeouts = Timeouts::new();
        let id = timeouts.add(now, Duration::ZERO, ());

        let mut due = timeouts.take_due(now);
        assert!(!timeouts.contains(id));
        assert!(timeouts.remove(id));

        timeouts.finish(due.remove(0), Repeat::After(ms(1)), now);

        assert!(!timeouts.contains(id));
        assert!(timeouts.is_empty());
        assert!(!timeouts.remove(id));
    }
}
