// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Error Log Repository Interface
//!
//! Durable storage for [`crate::entities::ErrorRecord`]s produced by the
//! error circuit (C5). Persistence here is for audit/diagnostics; the
//! circuit's own state machine (consecutive-error counter, cooldown clock)
//! lives in memory and does not depend on this store being available.

use crate::entities::ErrorRecord;
use crate::PipelineError;
use async_trait::async_trait;

#[async_trait]
pub trait ErrorLogRepository: Send + Sync {
    async fn record(&self, error: &ErrorRecord) -> Result<(), PipelineError>;

    /// Recent errors, most recent first, for operator troubleshooting.
    async fn recent(&self, limit: usize) -> Result<Vec<ErrorRecord>, PipelineError>;
}
