use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::PumpLocation;

/// Forecourt events.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    /// A new vehicle pulls into the forecourt.
    Arrival,
    /// The waiting queue is swept: overdue vehicles leave, the rest try to get a pump.
    Sweep,
    /// Fuelling at the pump at the given location has finished.
    ServiceCompleted(PumpLocation),
}

/// Entry type stored in the scheduler, including the event and the time when it is supposed to
/// occur. Entries scheduled for the same time are ordered by their sequence number, i.e., the
/// order in which they were scheduled.
#[derive(Debug)]
pub struct EventEntry {
    time: Reverse<Duration>,
    seq: Reverse<u64>,
    event: Event,
}

impl EventEntry {
    /// The time of the simulation at which the event occurs.
    #[must_use]
    pub fn time(&self) -> Duration {
        self.time.0
    }

    /// The scheduled event.
    #[must_use]
    pub fn event(&self) -> Event {
        self.event
    }
}

impl PartialEq for EventEntry {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for EventEntry {}

impl PartialOrd for EventEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.time, self.seq).cmp(&(other.time, other.seq))
    }
}

/// Scheduler is used to keep the current time and information about the upcoming events.
#[derive(Debug, Default)]
pub struct Scheduler {
    events: BinaryHeap<EventEntry>,
    time: Duration,
    next_seq: u64,
}

impl Scheduler {
    /// Schedules `event` to be executed at `self.time() + delay`.
    pub fn schedule(&mut self, delay: Duration, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(EventEntry {
            time: Reverse(self.time + delay),
            seq: Reverse(seq),
            event,
        });
    }

    /// Schedules `event` to be executed at `self.time()`, after any other events already
    /// scheduled for that time.
    pub fn schedule_immediately(&mut self, event: Event) {
        self.schedule(Duration::default(), event);
    }

    /// Returns the current simulation time.
    #[must_use]
    pub fn time(&self) -> Duration {
        self.time
    }

    /// Returns the next scheduled event without removing it, or `None` if none are left.
    #[must_use]
    pub fn peek(&self) -> Option<&EventEntry> {
        self.events.peek()
    }

    /// Returns the time of the next scheduled event, or `None` if none are left.
    #[must_use]
    pub fn peek_time(&self) -> Option<Duration> {
        self.peek().map(EventEntry::time)
    }

    /// Removes and returns the next scheduled event or `None` if none are left.
    /// The clock advances to the time of the returned event.
    pub fn pop(&mut self) -> Option<EventEntry> {
        self.events.pop().map(|entry| {
            self.time = entry.time();
            entry
        })
    }

    /// Cancels all pending events and returns how many there were.
    /// The clock advances to `time` unless it is already past it.
    pub fn cancel_all(&mut self, time: Duration) -> usize {
        let cancelled = self.events.len();
        self.events.clear();
        self.time = std::cmp::max(self.time, time);
        cancelled
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Checks if there are no pending events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(secs: u64, seq: u64) -> EventEntry {
        EventEntry {
            time: Reverse(Duration::from_secs(secs)),
            seq: Reverse(seq),
            event: Event::Sweep,
        }
    }

    #[test]
    fn test_event_entry_cmp() {
        assert_eq!(entry(1, 0), entry(1, 0));
        assert_eq!(entry(0, 0).cmp(&entry(1, 0)), Ordering::Greater);
        assert_eq!(entry(2, 0).cmp(&entry(1, 0)), Ordering::Less);
        assert_eq!(entry(1, 0).cmp(&entry(1, 1)), Ordering::Greater);
    }

    #[test]
    fn test_scheduler() {
        let mut scheduler = Scheduler::default();
        assert_eq!(scheduler.time(), Duration::new(0, 0));
        assert!(scheduler.is_empty());

        let location = PumpLocation::new(0, 2);
        scheduler.schedule(Duration::from_secs(1), Event::Arrival);
        scheduler.schedule(Duration::from_secs(0), Event::Sweep);
        scheduler.schedule(Duration::from_secs(2), Event::ServiceCompleted(location));

        assert_eq!(scheduler.time(), Duration::from_secs(0));
        assert_eq!(scheduler.len(), 3);
        assert_eq!(scheduler.peek_time(), Some(Duration::from_secs(0)));
        assert_eq!(scheduler.peek().map(EventEntry::event), Some(Event::Sweep));

        let entry = scheduler.pop().unwrap();
        assert_eq!(entry.event(), Event::Sweep);
        assert_eq!(entry.time(), Duration::from_secs(0));
        assert_eq!(scheduler.time(), Duration::from_secs(0));

        let entry = scheduler.pop().unwrap();
        assert_eq!(entry.event(), Event::Arrival);
        assert_eq!(entry.time(), Duration::from_secs(1));
        assert_eq!(scheduler.time(), Duration::from_secs(1));

        scheduler.schedule(Duration::from_millis(500), Event::Sweep);

        let entry = scheduler.pop().unwrap();
        assert_eq!(entry.event(), Event::Sweep);
        assert_eq!(entry.time(), Duration::from_millis(1500));

        let entry = scheduler.pop().unwrap();
        assert_eq!(entry.event(), Event::ServiceCompleted(location));
        assert_eq!(entry.time(), Duration::from_secs(2));
        assert_eq!(scheduler.time(), Duration::from_secs(2));

        assert!(scheduler.pop().is_none());
        assert_eq!(scheduler.peek_time(), None);
    }

    #[test]
    fn test_same_time_in_scheduling_order() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(Duration::from_secs(1), Event::Sweep);
        scheduler.schedule(Duration::from_secs(1), Event::Arrival);
        scheduler.schedule_immediately(Event::ServiceCompleted(PumpLocation::new(1, 1)));
        let events: Vec<_> = std::iter::from_fn(|| scheduler.pop())
            .map(|e| e.event())
            .collect();
        assert_eq!(
            events,
            vec![
                Event::ServiceCompleted(PumpLocation::new(1, 1)),
                Event::Sweep,
                Event::Arrival
            ]
        );
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(Duration::from_secs(1), Event::Arrival);
        scheduler.schedule(Duration::from_secs(5), Event::Sweep);
        assert!(scheduler.pop().is_some());
        assert_eq!(scheduler.cancel_all(Duration::from_secs(3)), 1);
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.time(), Duration::from_secs(3));
        assert_eq!(scheduler.cancel_all(Duration::from_secs(2)), 0);
        assert_eq!(scheduler.time(), Duration::from_secs(3));
    }
}
