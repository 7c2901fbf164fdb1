// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # LLM Client Interface (C3)
//!
//! Contract: `request(prompt, model) -> parsed JSON object`. The concrete
//! adapter (infrastructure layer) owns retries, rate-limit backoff, model
//! fallback, and the per-call timeout described in §4.3; this trait only
//! exposes the *result* of that policy to callers so stage processors stay
//! free of HTTP and tokio concerns beyond `async fn`.

use crate::PipelineError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// A primary/fallback model pair. On a single HTTP 4xx from `primary`, the
/// client performs exactly one retry against `fallback`; further 4xx
/// propagate (§4.3).
#[derive(Debug, Clone)]
pub struct LlmModelPair {
    pub primary: String,
    pub fallback: String,
}

impl LlmModelPair {
    pub fn new(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self { primary: primary.into(), fallback: fallback.into() }
    }
}

/// Per-call tuning, distinct from the client's own construction-time
/// defaults so a processor can, e.g., request a larger timeout for a larger
/// batch.
#[derive(Debug, Clone)]
pub struct LlmRequestOptions {
    pub models: LlmModelPair,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub timeout: Duration,
    /// `generationConfig.temperature`; §6 bounds deterministic stages to
    /// `[0.1, 0.3]`.
    pub temperature: f32,
}

impl LlmRequestOptions {
    pub fn deterministic(models: LlmModelPair) -> Self {
        Self {
            models,
            max_retries: 3,
            initial_backoff: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
            temperature: 0.1,
        }
    }
}

/// JSON-mode request/response contract for the pipeline's three LLM-backed
/// stages.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends `prompt` to `options.models.primary`, enforcing JSON-object
    /// response mode. Retries up to `options.max_retries` attempts with
    /// exponential backoff on transient HTTP 429 or socket timeout; on a
    /// single HTTP 4xx from the primary model, retries exactly once against
    /// `options.models.fallback`. Returns [`PipelineError::LlmFailure`] once
    /// retries and fallback are exhausted.
    async fn request(&self, prompt: &str, options: &LlmRequestOptions) -> Result<Value, PipelineError>;
}
