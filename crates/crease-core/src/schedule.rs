//! Deterministic timer queue for the tick loop.
//!
//! Delayed continuations (swing window ends, delivery resets, the result
//! display delay) are queued here with a due time in simulation milliseconds
//! and the generation ("epoch") they were scheduled under. The owner drains
//! due tasks at the start of each tick and discards any whose epoch no longer
//! matches its current state.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Generation number carried by a scheduled task.
pub type Epoch = u64;

/// A task waiting for its due time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled<T> {
    pub due_ms: u64,
    pub epoch: Epoch,
    pub task: T,
    /// Insertion order, breaks ties between equal due times.
    seq: u64,
}

impl<T: Eq> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Eq> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due_ms
            .cmp(&other.due_ms)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-queue of tasks ordered by due time, FIFO among equal due times.
#[derive(Debug)]
pub struct Scheduler<T: Eq> {
    pending: BinaryHeap<Reverse<Scheduled<T>>>,
    next_seq: u64,
}

impl<T: Eq> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            pending: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, due_ms: u64, epoch: Epoch, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Reverse(Scheduled {
            due_ms,
            epoch,
            task,
            seq,
        }));
    }

    /// Remove and return every task due at or before `now_ms`, earliest first.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<Scheduled<T>> {
        let mut due = Vec::new();
        while let Some(Reverse(next)) = self.pending.peek() {
            if next.due_ms > now_ms {
                break;
            }
            if let Some(Reverse(task)) = self.pending.pop() {
                due.push(task);
            }
        }
        due
    }
}
