// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Opaque, stable sentence identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a sentence, stable across restarts and stage
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SentenceId(Uuid);

impl SentenceId {
    /// Generates a new random identifier for a freshly ingested sentence.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing identifier, e.g. one loaded from the store.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SentenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SentenceId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_ids_are_not_equal() {
        assert_ne!(SentenceId::new(), SentenceId::new());
    }

    #[test]
    fn round_trips_through_uuid() {
        let id = SentenceId::new();
        assert_eq!(SentenceId::from_uuid(id.as_uuid()), id);
    }
}
