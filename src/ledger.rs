//! Driver-side bookkeeping of assignment progress.
//!
//! The ledger lives for the driver process lifetime and is mutated only
//! under the service lock, so every check-then-assign sequence is one
//! atomic transaction per request.

use itertools::Itertools;

/// What the assignment state machine resolved for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Map(u32),
    Reduce(u32),
    Done,
}

/// Tracks how many map and reduce tasks have been handed out, which reduce
/// buckets are known to exist, and the next task number to issue.
///
/// The reduce bucket set is not derived from the configured count up front.
/// It is learned lazily from whichever worker first reports the buckets its
/// map phase populated; only that first report is kept.
#[derive(Debug)]
pub struct TaskLedger {
    n_map: u32,
    n_reduce: u32,
    map_assigned: u32,
    reduce_assigned: u32,
    next_task: u32,
    available_buckets: Vec<u32>,
    buckets_reported: bool,
}

impl TaskLedger {
    pub fn new(n_map: u32, n_reduce: u32) -> Self {
        Self {
            n_map,
            n_reduce,
            map_assigned: 0,
            reduce_assigned: 0,
            next_task: 0,
            available_buckets: Vec::new(),
            buckets_reported: false,
        }
    }

    /// Record the reduce buckets a worker's map phase populated.
    ///
    /// First writer wins: the flag locks after one non-empty report and
    /// later reports are silent no-ops, as are ids that do not name a real
    /// bucket and duplicates. Returns whether the report was accepted.
    pub fn record_buckets(&mut self, ids: &[String]) -> bool {
        if self.buckets_reported || ids.is_empty() {
            return false;
        }
        self.available_buckets = ids
            .iter()
            .filter_map(|id| id.parse::<u32>().ok())
            .filter(|&bucket| bucket < self.n_reduce)
            .unique()
            .collect();
        self.buckets_reported = true;
        true
    }

    /// One transition of the assignment state machine: map task 0 first,
    /// then sequential map tasks, then reduce tasks popped from the reported
    /// buckets last-to-first, then `Done` forever.
    ///
    /// A number handed out here is never re-issued. There is no lease or
    /// timeout, so a worker that never comes back takes its task with it.
    /// If every map task is assigned before any worker reports buckets,
    /// this resolves `Done` with reduce work still outstanding; that race
    /// is kept from the original driver (see `DESIGN.md`).
    pub fn assign(&mut self) -> Assignment {
        if self.map_assigned == 0 {
            self.map_assigned = 1;
            self.next_task = 0;
            Assignment::Map(0)
        } else if self.map_assigned < self.n_map {
            self.map_assigned += 1;
            self.next_task += 1;
            Assignment::Map(self.next_task)
        } else if let Some(bucket) = self.available_buckets.pop() {
            self.reduce_assigned += 1;
            self.next_task = bucket;
            Assignment::Reduce(bucket)
        } else {
            Assignment::Done
        }
    }

    /// The assignment `assign` would resolve right now, without consuming it.
    pub fn peek(&self) -> Assignment {
        if self.map_assigned == 0 {
            Assignment::Map(0)
        } else if self.map_assigned < self.n_map {
            Assignment::Map(self.next_task + 1)
        } else if let Some(&bucket) = self.available_buckets.last() {
            Assignment::Reduce(bucket)
        } else {
            Assignment::Done
        }
    }

    pub fn remaining_map(&self) -> u32 {
        self.n_map - self.map_assigned
    }

    pub fn remaining_reduce(&self) -> u32 {
        self.n_reduce - self.reduce_assigned
    }
}
