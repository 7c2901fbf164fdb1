// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A single entry in the error circuit's persisted log (§4.5, §7).

use crate::value_objects::{ErrorCategory, ErrorSeverity, SessionId};
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// One classified error, whether or not it contributed to a cooldown trip.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub error_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub session_id: Option<SessionId>,
    pub stage_name: Option<String>,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub message: String,
    pub context: Option<Value>,
    pub retry_count: u32,
    pub resolved: bool,
    pub resolution_notes: Option<String>,
}

impl ErrorRecord {
    pub fn new(session_id: Option<SessionId>, stage_name: Option<String>, category: ErrorCategory, message: impl Into<String>) -> Self {
        let severity = ErrorSeverity::for_category(category);
        Self {
            error_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            session_id,
            stage_name,
            category,
            severity,
            message: message.into(),
            context: None,
            retry_count: 0,
            resolved: false,
            resolution_notes: None,
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn mark_resolved(&mut self, notes: impl Into<String>) {
        self.resolved = true;
        self.resolution_notes = Some(notes.into());
    }
}
