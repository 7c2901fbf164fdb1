// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Performance Recorder Interface (C6)
//!
//! Records one row per API or batch call. Aggregation is a read-only
//! convenience on top of the same data; it is not specified here because
//! the domain has no dashboard consumer. Recorder failures must never
//! affect the pipeline — implementations are expected to swallow their own
//! I/O errors rather than propagate them (§4.6), so this trait's methods
//! return `()` rather than `Result`.

use crate::entities::PerformanceRecord;
use async_trait::async_trait;

#[async_trait]
pub trait PerformanceRecorder: Send + Sync {
    /// Logs one call's metrics. Implementations must not let a logging
    /// failure propagate to the caller.
    async fn record(&self, metrics: PerformanceRecord);
}
