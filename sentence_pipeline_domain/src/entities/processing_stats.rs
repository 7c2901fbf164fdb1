// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Session-level statistics returned by the orchestrator (§4.8 step 8).

use crate::value_objects::{ProcessingStage, SessionId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// Per-stage counters accumulated during one session.
#[derive(Debug, Clone, Default)]
pub struct StageStats {
    pub processed: usize,
    pub approved: usize,
    pub rejected: usize,
    pub errored: usize,
    pub duration: Duration,
}

/// The record returned at the end of a `process()` call.
#[derive(Debug, Clone)]
pub struct ProcessingStats {
    pub session_id: SessionId,
    pub total_sentences: usize,
    pub processed_sentences: usize,
    pub filtered_sentences: usize,
    pub approved_sentences: usize,
    pub error_count: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub stage_stats: HashMap<ProcessingStage, StageStats>,
}

impl ProcessingStats {
    pub fn new(session_id: SessionId, total_sentences: usize) -> Self {
        Self {
            session_id,
            total_sentences,
            processed_sentences: 0,
            filtered_sentences: 0,
            approved_sentences: 0,
            error_count: 0,
            start_time: Utc::now(),
            end_time: None,
            stage_stats: HashMap::new(),
        }
    }

    /// A terminal record representing a no-op run, e.g. an idempotent
    /// restart or an empty working set (§4.8 idempotency, §8 boundary
    /// behaviors).
    pub fn empty(session_id: SessionId) -> Self {
        let mut stats = Self::new(session_id, 0);
        stats.end_time = Some(stats.start_time);
        stats
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Utc::now());
    }
}
