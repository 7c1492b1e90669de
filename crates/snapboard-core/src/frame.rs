//! Coalescing of high-frequency pointer moves into one update per frame.

use kurbo::{Point, Size};

/// A pointer move waiting for the next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingMove {
    pub pointer: Point,
    pub container: Size,
}

/// Holds the most recent pointer move not yet applied.
///
/// Moves queued within one frame collapse to the last one; nothing is ever
/// reordered, and `take` hands the pending move out exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveCoalescer {
    pending: Option<PendingMove>,
    coalesced: u64,
}

impl MoveCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a move, replacing any pending one.
    pub fn queue(&mut self, pointer: Point, container: Size) {
        if self.pending.replace(PendingMove { pointer, container }).is_some() {
            self.coalesced += 1;
        }
    }

    /// Take the pending move, if any.
    pub fn take(&mut self) -> Option<PendingMove> {
        self.pending.take()
    }

    /// Drop the pending move without applying it.
    pub fn discard(&mut self) {
        self.pending = None;
    }

    /// How many queued moves were superseded before being applied.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}
