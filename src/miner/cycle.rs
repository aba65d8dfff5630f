// src/miner/cycle.rs
//! Loop state for the timed reporting cycle
//!
//! Tracks how many work units finished since the last flush and when
//! the next flush is due. Callers pass the current instant in, so the
//! state machine runs the same under a real or a paused clock.

use std::time::Duration;
use tokio::time::Instant;

/// Where the loop stands relative to the flush deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The deadline has passed; the count must be written before more work
    AwaitingFlush,
    /// The deadline is in the future; the next step is a work unit
    AwaitingWork,
}

/// Counter and deadline owned by the work loop
#[derive(Debug, Clone)]
pub struct LoopState {
    loops_done: u64,
    /// `None` until the first flush, which makes the first pass flush
    deadline: Option<Instant>,
    interval: Duration,
}

impl LoopState {
    /// Creates a state that flushes on its first pass
    pub fn new(interval: Duration) -> Self {
        LoopState {
            loops_done: 0,
            deadline: None,
            interval,
        }
    }

    /// Phase at `now`; a deadline equal to `now` is due
    pub fn phase(&self, now: Instant) -> Phase {
        match self.deadline {
            Some(deadline) if now < deadline => Phase::AwaitingWork,
            _ => Phase::AwaitingFlush,
        }
    }

    /// Work units completed since the last flush
    pub fn pending(&self) -> u64 {
        self.loops_done
    }

    /// Next flush deadline, if one has been set
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Records one completed work unit
    pub fn record_work(&mut self) {
        self.loops_done += 1;
    }

    /// Marks the pending count as written at `now`
    ///
    /// Resets the counter and moves the deadline to `now + interval`.
    pub fn mark_flushed(&mut self, now: Instant) {
        self.loops_done = 0;
        self.deadline = Some(now + self.interval);
    }
}
