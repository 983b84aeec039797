//! Cooperative, tick-driven scheduling of delayed work.
//!
//! Nothing here runs on its own: the owner advances its clock every frame
//! and drains whatever became due. A suspended task is plain data, so
//! cancelling it is just dropping it from the queue.

use std::{cmp::Reverse, collections::BinaryHeap};

use instant::Duration;

#[derive(Debug)]
struct Entry<T> {
    due: Duration,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        (self.due, self.seq) == (other.due, other.seq)
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Queue of tasks ordered by due time. Tasks due at the same time come out
/// in the order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Reverse<Entry<T>>>,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule_at(&mut self, due: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry { due, seq, task }));
    }

    /// Removes and returns every task with `due <= now`, earliest first.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let mut due = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|Reverse(entry)| entry.due <= now)
        {
            if let Some(Reverse(entry)) = self.queue.pop() {
                due.push(entry.task);
            }
        }
        due
    }

    /// Keeps only the tasks for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.queue.retain(|Reverse(entry)| keep(&entry.task));
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
