//! Scheduled event types
//!
//! A scheduled event is an immutable `(time, kind, patient)` triple. Events
//! are totally ordered:
//!
//! 1. time ascending
//! 2. kind, with `Departure < Reneging < Arrival`
//! 3. patient id, lexicographic
//!
//! The kind order is explicit rather than derived from label strings.
//! Releasing capacity first means a departure at time `t` can serve a
//! patient whose reneging deadline is also `t`, and an arrival at `t` sees
//! the queue only after every same-instant release and abandonment.

use std::cmp::Ordering;

/// Kind of pending event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Arrival,
    Departure,
    Reneging,
}

impl EventKind {
    /// Position in the same-timestamp processing order
    pub fn tie_break_rank(self) -> u8 {
        match self {
            EventKind::Departure => 0,
            EventKind::Reneging => 1,
            EventKind::Arrival => 2,
        }
    }
}

impl PartialOrd for EventKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tie_break_rank().cmp(&other.tie_break_rank())
    }
}

/// A pending event in the scheduler
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub time: f64,
    pub kind: EventKind,
    pub patient_id: String,
}

impl ScheduledEvent {
    pub fn new(time: f64, kind: EventKind, patient_id: impl Into<String>) -> Self {
        Self {
            time,
            kind,
            patient_id: patient_id.into(),
        }
    }

    pub fn arrival(time: f64, patient_id: impl Into<String>) -> Self {
        Self::new(time, EventKind::Arrival, patient_id)
    }

    pub fn departure(time: f64, patient_id: impl Into<String>) -> Self {
        Self::new(time, EventKind::Departure, patient_id)
    }

    pub fn reneging(time: f64, patient_id: impl Into<String>) -> Self {
        Self::new(time, EventKind::Reneging, patient_id)
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.patient_id.cmp(&other.patient_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_dominates() {
        let early = ScheduledEvent::arrival(1.0, "p9");
        let late = ScheduledEvent::departure(2.0, "p1");
        assert!(early < late);
    }

    #[test]
    fn test_kind_order_at_same_time() {
        let dep = ScheduledEvent::departure(5.0, "p3");
        let ren = ScheduledEvent::reneging(5.0, "p2");
        let arr = ScheduledEvent::arrival(5.0, "p1");
        assert!(dep < ren);
        assert!(ren < arr);
    }

    #[test]
    fn test_patient_id_breaks_remaining_ties() {
        let a = ScheduledEvent::arrival(5.0, "p1");
        let b = ScheduledEvent::arrival(5.0, "p2");
        assert!(a < b);
        assert_eq!(a, ScheduledEvent::arrival(5.0, "p1"));
    }
}
