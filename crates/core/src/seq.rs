// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sequence gap detection for gateway event streams.
//!
//! Each connection numbers its events consecutively. The tracker only
//! *detects* discontinuities; it never reorders or asks for retransmission.

use crate::protocol::GapInfo;

/// Tracks the last accepted sequence number of one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeqTracker {
    last: Option<u64>,
}

impl SeqTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last sequence number seen, if any.
    pub fn last(&self) -> Option<u64> {
        self.last
    }

    /// Records an incoming sequence number.
    ///
    /// Returns the gap when `seq` skips ahead of `last + 1`. Events without a
    /// sequence number and duplicates of `last` leave the tracker untouched.
    ///
    /// Frames arrive in delivery order, so a `seq` below `last` means the
    /// gateway renumbered its stream. The tracker restarts from that value
    /// without reporting a gap.
    pub fn observe(&mut self, seq: Option<u64>) -> Option<GapInfo> {
        let seq = seq?;
        match self.last {
            None => {
                self.last = Some(seq);
                None
            }
            Some(last) if seq > last => {
                self.last = Some(seq);
                let expected = last.saturating_add(1);
                (seq > expected).then_some(GapInfo::new(expected, seq))
            }
            Some(last) if seq < last => {
                self.reset();
                self.observe(Some(seq))
            }
            Some(_) => None,
        }
    }

    /// Forgets all history, e.g. when a fresh connection starts numbering.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
#[path = "seq_tests.rs"]
mod tests;
