// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A hierarchical error system for the sentence evaluation pipeline. Errors
//! are categorized so that the error circuit ([`crate::services::error_circuit`])
//! and the orchestrator can react to failures without inspecting message text.
//!
//! ## Error Categories
//!
//! - **Validation**: unsupported template variables, malformed sentence data
//! - **RuleLoad**: a rule corpus (keywords, spelling pairs, atomic truths) failed to load
//! - **LlmFailure**: the LLM client exhausted retries and model fallback
//! - **ParseFailure**: the LLM returned invalid JSON or an incomplete per-sentence record
//! - **Store**: the sentence store failed to read or write
//! - **Processing**: catch-all for uncategorized batch failures
//! - **CooldownActive**: `process()` was refused because the error circuit is tripped

use thiserror::Error;

/// Domain-specific errors for the sentence evaluation pipeline.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Rule corpus load failed: {0}")]
    RuleLoadError(String),

    #[error("LLM request failed: {0}")]
    LlmFailure(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseFailure(String),

    #[error("Sentence store error: {0}")]
    StoreError(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),

    #[error("Cooldown active: {0}")]
    CooldownActive(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn rule_load(msg: impl Into<String>) -> Self {
        Self::RuleLoadError(msg.into())
    }

    pub fn llm_failure(msg: impl Into<String>) -> Self {
        Self::LlmFailure(msg.into())
    }

    pub fn parse_failure(msg: impl Into<String>) -> Self {
        Self::ParseFailure(msg.into())
    }

    pub fn store_error(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn processing_error(msg: impl Into<String>) -> Self {
        Self::ProcessingError(msg.into())
    }

    pub fn cooldown_active(msg: impl Into<String>) -> Self {
        Self::CooldownActive(msg.into())
    }

    /// Whether a retry of the same operation is likely to succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::TimeoutError(_) | PipelineError::LlmFailure(_) | PipelineError::StoreError(_)
        )
    }

    /// Maps a variant to the error-circuit classification taxonomy from ErrorCategory.
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::ValidationError(_) => "validation",
            PipelineError::RuleLoadError(_) => "processing",
            PipelineError::LlmFailure(_) => "api",
            PipelineError::ParseFailure(_) => "processing",
            PipelineError::StoreError(_) => "database",
            PipelineError::ProcessingError(_) => "processing",
            PipelineError::CooldownActive(_) => "system",
            PipelineError::InvalidConfiguration(_) => "system",
            PipelineError::SerializationError(_) => "processing",
            PipelineError::TimeoutError(_) => "network",
            PipelineError::InternalError(_) => "system",
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}
