//! Waiting queue
//!
//! Holds patients who arrived while no doctor of their specialty was free.
//!
//! # Selection rule
//!
//! When a doctor frees up, the queue is scanned in full and the entry with
//! matching specialty and the smallest `(priority rank, arrival time)` pair
//! is removed. Priority dominates; earlier arrival breaks ties; exact ties
//! fall to the entry enqueued first.
//!
//! This is O(n) per dispatch. A plain global heap cannot express the
//! specialty filter; per-specialty heaps would be a valid optimization as
//! long as they return exactly the same entry.

use crate::models::patient::TriagePriority;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A queued patient
///
/// Exists if and only if the referenced patient is `Waiting`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub priority: TriagePriority,
    pub arrival_time: f64,
    pub patient_id: String,
    pub specialty: String,
}

impl QueueEntry {
    pub fn new(
        priority: TriagePriority,
        arrival_time: f64,
        patient_id: impl Into<String>,
        specialty: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            arrival_time,
            patient_id: patient_id.into(),
            specialty: specialty.into(),
        }
    }

    /// Lexicographic `(rank, arrival time)` comparison
    fn dispatch_order(&self, other: &Self) -> Ordering {
        self.priority
            .rank()
            .cmp(&other.priority.rank())
            .then_with(|| self.arrival_time.total_cmp(&other.arrival_time))
    }
}

/// Patients awaiting a specialty-matched doctor
///
/// # Example
/// ```
/// use clinic_simulator_core_rs::{QueueEntry, TriagePriority, WaitingQueue};
///
/// let mut queue = WaitingQueue::new();
/// queue.enqueue(QueueEntry::new(TriagePriority::Standard, 1.0, "p1", "neurology"));
/// queue.enqueue(QueueEntry::new(TriagePriority::Urgent, 4.0, "p2", "neurology"));
///
/// let next = queue.dequeue_best_match("neurology").unwrap();
/// assert_eq!(next.patient_id, "p2");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaitingQueue {
    entries: Vec<QueueEntry>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn enqueue(&mut self, entry: QueueEntry) {
        self.entries.push(entry);
    }

    /// Remove and return the best entry for `specialty`, if any
    pub fn dequeue_best_match(&mut self, specialty: &str) -> Option<QueueEntry> {
        let mut best: Option<usize> = None;

        for (i, entry) in self.entries.iter().enumerate() {
            if entry.specialty != specialty {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => entry.dispatch_order(&self.entries[b]) == Ordering::Less,
            };
            if better {
                best = Some(i);
            }
        }

        best.map(|i| self.entries.remove(i))
    }

    /// Remove the entry of `patient_id`; `None` if it is no longer queued
    pub fn remove_if_present(&mut self, patient_id: &str) -> Option<QueueEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.patient_id == patient_id)?;
        Some(self.entries.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Patient ids in queue (insertion) order
    pub fn patient_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.patient_id.clone()).collect()
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }
}
