// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection generations.
//!
//! Every call to `connect` opens a new generation. Anything a transport (or a
//! loader started on its behalf) reports is stamped with the generation it was
//! created for, and only notices of the current generation reach the host
//! state. Old transports are never drained or awaited; their residual
//! callbacks simply stop matching.

use std::fmt;

use gw_core::{CloseInfo, EventFrame, GapInfo, HelloOk};
use serde_json::Value;

use super::loaders::LoaderError;

/// Identifies one connection attempt. Strictly increasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Generation before any connection attempt.
    pub const INITIAL: Generation = Generation(0);

    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Generation(self.0.saturating_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a transport or loader reported.
#[derive(Debug, Clone, PartialEq)]
pub enum NoticeKind {
    Hello(HelloOk),
    Close(CloseInfo),
    Gap(GapInfo),
    Event(EventFrame),
    /// A snapshot loader finished.
    Loaded {
        loader: String,
        outcome: Result<Value, LoaderError>,
    },
}

/// A report stamped with the generation it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub generation: Generation,
    pub kind: NoticeKind,
}

/// Issues generations and filters notices of superseded ones.
#[derive(Debug, Default)]
pub struct GenerationGuard {
    current: Generation,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live generation.
    pub fn current(&self) -> Generation {
        self.current
    }

    /// Opens a new generation, invalidating every earlier one.
    pub fn advance(&mut self) -> Generation {
        self.current = self.current.next();
        self.current
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.current
    }

    /// Returns the notice payload if it belongs to the live generation.
    pub fn admit(&self, notice: Notice) -> Option<NoticeKind> {
        self.is_current(notice.generation).then_some(notice.kind)
    }
}
