// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Presentation Layer
//!
//! Thin, unauthenticated-by-default request/response types and wrapper
//! functions for the HTTP surface named in §6. A full server (axum/actix
//! wiring, auth middleware) is out of scope; these types exist so the
//! contract between the orchestrator/scheduler and an eventual HTTP layer
//! is type-checked even before that layer is written.

use crate::application::{Orchestrator, ProcessingMode, Scheduler, StatusSnapshot};
use sentence_pipeline_domain::value_objects::{ProcessingStage, SentenceId, SentenceTable};
use sentence_pipeline_domain::PipelineError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `POST /process` and `POST /process/{stage}` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRequest {
    pub table: Option<SentenceTable>,
    pub ids: Option<Vec<SentenceId>>,
    pub restart_from: Option<ProcessingStage>,
}

/// `POST /process` response body — a thin re-projection of
/// [`sentence_pipeline_domain::entities::ProcessingStats`].
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub session_id: String,
    pub total_sentences: usize,
    pub processed_sentences: usize,
    pub filtered_sentences: usize,
    pub approved_sentences: usize,
    pub error_count: usize,
}

/// `GET /status` response body.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub mode: &'static str,
    pub session_in_flight: bool,
    pub circuit_state: &'static str,
    pub circuit_reason: String,
}

/// `GET /scheduler/status` response body.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatusResponse {
    pub running: bool,
    pub task_count: usize,
    pub enabled_count: usize,
}

/// `GET /gemini/usage` response body; populated from the performance log,
/// not wired up here since it requires a read-only query method this port
/// set doesn't expose beyond `status_snapshot()`.
#[derive(Debug, Clone, Serialize)]
pub struct UsageResponse {
    pub total_calls: u64,
    pub total_errors: u64,
}

/// `GET /health` response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
}

/// `POST /process` — runs one evaluation session.
pub async fn process(orchestrator: &Orchestrator, request: ProcessRequest) -> Result<ProcessResponse, PipelineError> {
    let stats = orchestrator.process(request.table, request.ids.as_deref(), request.restart_from).await?;
    Ok(ProcessResponse {
        session_id: stats.session_id.as_str().to_string(),
        total_sentences: stats.total_sentences,
        processed_sentences: stats.processed_sentences,
        filtered_sentences: stats.filtered_sentences,
        approved_sentences: stats.approved_sentences,
        error_count: stats.error_count,
    })
}

/// `GET /status`.
pub async fn status(orchestrator: &Orchestrator) -> Result<StatusResponse, PipelineError> {
    let snapshot: StatusSnapshot = orchestrator.status_snapshot().await?;
    Ok(StatusResponse {
        mode: match snapshot.mode {
            ProcessingMode::Testing => "testing",
            ProcessingMode::Production => "production",
        },
        session_in_flight: snapshot.session_in_flight,
        circuit_state: match snapshot.circuit_state {
            sentence_pipeline_domain::services::CircuitState::Ok => "ok",
            sentence_pipeline_domain::services::CircuitState::Cooldown => "cooldown",
        },
        circuit_reason: snapshot.circuit_reason,
    })
}

/// `GET /scheduler/status`.
pub fn scheduler_status(scheduler: &Scheduler) -> SchedulerStatusResponse {
    let status = scheduler.status();
    SchedulerStatusResponse { running: status.running, task_count: status.task_count, enabled_count: status.enabled_count }
}

/// `POST /scheduler/start`.
pub fn scheduler_start(scheduler: &Arc<Scheduler>) {
    scheduler.start();
}

/// `POST /scheduler/stop`.
pub fn scheduler_stop(scheduler: &Scheduler) {
    scheduler.stop();
}

/// `POST /scheduler/tasks/{id}/enable` and `.../disable`.
pub fn scheduler_set_enabled(scheduler: &Scheduler, task_id: &str, enabled: bool) -> bool {
    scheduler.set_enabled(task_id, enabled)
}

/// `POST /scheduler/tasks/{id}/run`.
pub async fn scheduler_force_run(scheduler: &Scheduler, task_id: &str) -> bool {
    scheduler.force_run_task(task_id).await
}

/// `GET /health`.
pub fn health() -> HealthResponse {
    HealthResponse { healthy: true }
}
