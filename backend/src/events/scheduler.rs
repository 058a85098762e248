//! Event scheduler
//!
//! Min-priority queue of pending events backed by a `BinaryHeap`.
//! Events are never mutated or removed once scheduled; cancellation is lazy
//! and handled by the orchestrator when the event is popped.

use crate::events::types::ScheduledEvent;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use thiserror::Error;

/// Errors raised by the scheduler
#[derive(Debug, Error, PartialEq)]
pub enum SchedulerError {
    #[error("No events remain in the scheduler")]
    Empty,

    #[error("Event time must be finite, got {0}")]
    NonFiniteTime(f64),
}

/// Time-ordered queue of pending events
///
/// # Example
/// ```
/// use clinic_simulator_core_rs::events::{EventScheduler, ScheduledEvent, EventKind};
///
/// let mut scheduler = EventScheduler::new();
/// scheduler.schedule(ScheduledEvent::arrival(10.0, "p2")).unwrap();
/// scheduler.schedule(ScheduledEvent::departure(10.0, "p1")).unwrap();
///
/// let first = scheduler.pop_earliest().unwrap();
/// assert_eq!(first.kind, EventKind::Departure);
/// ```
#[derive(Debug, Default)]
pub struct EventScheduler {
    heap: BinaryHeap<Reverse<ScheduledEvent>>,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event: O(log n)
    pub fn schedule(&mut self, event: ScheduledEvent) -> Result<(), SchedulerError> {
        if !event.time.is_finite() {
            return Err(SchedulerError::NonFiniteTime(event.time));
        }
        self.heap.push(Reverse(event));
        Ok(())
    }

    /// Remove and return the minimum event
    pub fn pop_earliest(&mut self) -> Result<ScheduledEvent, SchedulerError> {
        self.heap
            .pop()
            .map(|Reverse(event)| event)
            .ok_or(SchedulerError::Empty)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scheduler_fails() {
        let mut scheduler = EventScheduler::new();
        assert_eq!(scheduler.pop_earliest(), Err(SchedulerError::Empty));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_rejects_non_finite_time() {
        let mut scheduler = EventScheduler::new();
        assert_eq!(
            scheduler.schedule(ScheduledEvent::reneging(f64::INFINITY, "p1")),
            Err(SchedulerError::NonFiniteTime(f64::INFINITY))
        );
        assert!(scheduler.is_empty());
    }
}
