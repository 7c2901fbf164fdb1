// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Human-readable session identifier, one per orchestrator run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one invocation of the orchestrator's `process()`, spanning all
/// stages. A timestamp-derived string is sufficient per the design notes; it
/// need not be cryptographically unique, only unique enough to group
/// performance and error records for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a new session id from the current time, formatted so it
    /// sorts lexicographically in creation order.
    pub fn generate() -> Self {
        Self::from_timestamp(Utc::now())
    }

    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        Self(format!("session_{}", ts.format("%Y%m%d_%H%M%S%.3f")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_the_session_prefix() {
        let id = SessionId::generate();
        assert!(id.as_str().starts_with("session_"));
    }
}
