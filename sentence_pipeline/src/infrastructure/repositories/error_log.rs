// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Postgres implementation of [`ErrorLogRepository`] (C5's persistence
//! side).

use async_trait::async_trait;
use sentence_pipeline_domain::entities::ErrorRecord;
use sentence_pipeline_domain::repositories::ErrorLogRepository;
use sentence_pipeline_domain::value_objects::{ErrorCategory, ErrorSeverity, SessionId};
use sentence_pipeline_domain::PipelineError;
use sqlx::{PgPool, Row};

pub struct PostgresErrorLogRepository {
    pool: PgPool,
}

impl PostgresErrorLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_err(err: sqlx::Error) -> PipelineError {
    PipelineError::store_error(err.to_string())
}

fn category_to_sql(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Api => "api",
        ErrorCategory::Database => "database",
        ErrorCategory::Network => "network",
        ErrorCategory::Validation => "validation",
        ErrorCategory::Processing => "processing",
        ErrorCategory::Resource => "resource",
        ErrorCategory::System => "system",
    }
}

fn sql_to_category(value: &str) -> ErrorCategory {
    match value {
        "api" => ErrorCategory::Api,
        "database" => ErrorCategory::Database,
        "network" => ErrorCategory::Network,
        "validation" => ErrorCategory::Validation,
        "resource" => ErrorCategory::Resource,
        "system" => ErrorCategory::System,
        _ => ErrorCategory::Processing,
    }
}

fn severity_to_sql(severity: ErrorSeverity) -> &'static str {
    match severity {
        ErrorSeverity::Low => "low",
        ErrorSeverity::Medium => "medium",
        ErrorSeverity::High => "high",
        ErrorSeverity::Critical => "critical",
    }
}

fn sql_to_severity(value: &str) -> ErrorSeverity {
    match value {
        "medium" => ErrorSeverity::Medium,
        "high" => ErrorSeverity::High,
        "critical" => ErrorSeverity::Critical,
        _ => ErrorSeverity::Low,
    }
}

#[async_trait]
impl ErrorLogRepository for PostgresErrorLogRepository {
    async fn record(&self, error: &ErrorRecord) -> Result<(), PipelineError> {
        sqlx::query(
            "INSERT INTO error_log (error_id, timestamp, session_id, stage_name, category, severity, message, \
             context, retry_count, resolved, resolution_notes) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(error.error_id)
        .bind(error.timestamp)
        .bind(error.session_id.as_ref().map(|s| s.as_str().to_string()))
        .bind(&error.stage_name)
        .bind(category_to_sql(error.category))
        .bind(severity_to_sql(error.severity))
        .bind(&error.message)
        .bind(&error.context)
        .bind(error.retry_count as i32)
        .bind(error.resolved)
        .bind(&error.resolution_notes)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ErrorRecord>, PipelineError> {
        let rows = sqlx::query("SELECT * FROM error_log ORDER BY timestamp DESC LIMIT $1")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        rows.iter()
            .map(|row| {
                let category: String = row.try_get("category").map_err(store_err)?;
                let severity: String = row.try_get("severity").map_err(store_err)?;
                let session_id: Option<String> = row.try_get("session_id").map_err(store_err)?;
                let retry_count: i32 = row.try_get("retry_count").map_err(store_err)?;

                Ok(ErrorRecord {
                    error_id: row.try_get("error_id").map_err(store_err)?,
                    timestamp: row.try_get("timestamp").map_err(store_err)?,
                    session_id: session_id.map(SessionId::from),
                    stage_name: row.try_get("stage_name").map_err(store_err)?,
                    category: sql_to_category(&category),
                    severity: sql_to_severity(&severity),
                    message: row.try_get("message").map_err(store_err)?,
                    context: row.try_get("context").map_err(store_err)?,
                    retry_count: retry_count as u32,
                    resolved: row.try_get("resolved").map_err(store_err)?,
                    resolution_notes: row.try_get("resolution_notes").map_err(store_err)?,
                })
            })
            .collect()
    }
}
