// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! One row of performance data, recorded per API or batch call (§4.6).

use crate::value_objects::SessionId;
use chrono::{DateTime, Utc};

/// Metrics for a single API call or deterministic-stage batch. Mirrors the
/// `APIMetrics` record the pipeline this crate descends from logs for every
/// Gemini call and pipeline session.
#[derive(Debug, Clone)]
pub struct PerformanceRecord {
    pub stage_name: String,
    pub call_type: String,
    pub response_time_ms: Option<u64>,
    pub success: bool,
    pub error_message: Option<String>,
    pub cost_estimate: Option<f64>,
    pub batch_size: Option<usize>,
    pub sentences_processed: Option<usize>,
    pub model_used: Option<String>,
    pub session_id: Option<SessionId>,
    pub recorded_at: DateTime<Utc>,
}

impl PerformanceRecord {
    pub fn new(stage_name: impl Into<String>, call_type: impl Into<String>, success: bool) -> Self {
        Self {
            stage_name: stage_name.into(),
            call_type: call_type.into(),
            response_time_ms: None,
            success,
            error_message: None,
            cost_estimate: None,
            batch_size: None,
            sentences_processed: None,
            model_used: None,
            session_id: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_batch(mut self, batch_size: usize, sentences_processed: usize) -> Self {
        self.batch_size = Some(batch_size);
        self.sentences_processed = Some(sentences_processed);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_used = Some(model.into());
        self
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }
}
