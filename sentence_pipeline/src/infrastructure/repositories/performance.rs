// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Postgres implementation of [`PerformanceRecorder`] (C6). Per the port's
//! contract, a write failure here is logged and swallowed — it must never
//! surface into the orchestrator's own error handling.

use async_trait::async_trait;
use sentence_pipeline_domain::entities::PerformanceRecord;
use sentence_pipeline_domain::repositories::PerformanceRecorder;
use sqlx::PgPool;
use tracing::warn;

pub struct PostgresPerformanceRecorder {
    pool: PgPool,
}

impl PostgresPerformanceRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PerformanceRecorder for PostgresPerformanceRecorder {
    async fn record(&self, metrics: PerformanceRecord) {
        let result = sqlx::query(
            "INSERT INTO performance_log (stage_name, call_type, response_time_ms, success, error_message, \
             cost_estimate, batch_size, sentences_processed, model_used, session_id, recorded_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&metrics.stage_name)
        .bind(&metrics.call_type)
        .bind(metrics.response_time_ms.map(|ms| ms as i64))
        .bind(metrics.success)
        .bind(&metrics.error_message)
        .bind(metrics.cost_estimate)
        .bind(metrics.batch_size.map(|n| n as i32))
        .bind(metrics.sentences_processed.map(|n| n as i32))
        .bind(&metrics.model_used)
        .bind(metrics.session_id.as_ref().map(|s| s.as_str().to_string()))
        .bind(metrics.recorded_at)
        .execute(&self.pool)
        .await;

        if let Err(err) = result {
            warn!(error = %err, stage = %metrics.stage_name, "failed to persist performance record");
        }
    }
}
