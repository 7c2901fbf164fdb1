// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Gemini-backed implementation of [`LlmClient`] (C3). Owns the retry,
//! backoff, and model-fallback policy described in §4.3 — stage processors
//! only ever see the parsed JSON result or a [`PipelineError::LlmFailure`].

use async_trait::async_trait;
use reqwest::StatusCode;
use sentence_pipeline_domain::services::{LlmClient, LlmRequestOptions};
use sentence_pipeline_domain::PipelineError;
use serde_json::Value;
use tracing::{debug, warn};

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), api_key: api_key.into(), base_url: base_url.into() }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent?key={}", self.base_url, self.api_key)
    }

    async fn call_model(&self, model: &str, prompt: &str, options: &LlmRequestOptions) -> Result<Value, ModelCallError> {
        let body = serde_json::json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": options.temperature,
                "responseMimeType": "application/json",
            },
        });

        let response = self
            .http
            .post(self.endpoint(model))
            .timeout(options.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| if err.is_timeout() { ModelCallError::Transient(err.to_string()) } else { ModelCallError::Fatal(err.to_string()) })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ModelCallError::Transient(format!("rate limited ({status})")));
        }
        if status.is_client_error() {
            let text = response.text().await.unwrap_or_default();
            return Err(ModelCallError::ClientError(format!("{status}: {text}")));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ModelCallError::Transient(format!("{status}: {text}")));
        }

        let envelope: Value = response.json().await.map_err(|err| ModelCallError::Fatal(err.to_string()))?;
        let text = envelope
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| ModelCallError::Fatal("response had no candidate text".to_string()))?;

        debug!(model, response_len = text.len(), "gemini response received");
        serde_json::from_str(text).map_err(|err| ModelCallError::Fatal(format!("invalid JSON in model output: {err}")))
    }

    async fn call_with_retries(&self, model: &str, prompt: &str, options: &LlmRequestOptions) -> Result<Value, ModelCallError> {
        let mut backoff = options.initial_backoff;
        let mut attempt: u32 = 0;
        loop {
            match self.call_model(model, prompt, options).await {
                Ok(value) => return Ok(value),
                Err(ModelCallError::Transient(reason)) if attempt + 1 < options.max_retries => {
                    warn!(model, attempt, %reason, "transient LLM failure, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

enum ModelCallError {
    /// A 429 or socket timeout — worth retrying the same model.
    Transient(String),
    /// A non-429 4xx — retry once against the fallback model instead.
    ClientError(String),
    /// Anything else: malformed response, non-JSON body, 5xx after retries.
    Fatal(String),
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn request(&self, prompt: &str, options: &LlmRequestOptions) -> Result<Value, PipelineError> {
        match self.call_with_retries(&options.models.primary, prompt, options).await {
            Ok(value) => Ok(value),
            Err(ModelCallError::ClientError(reason)) => {
                warn!(primary = %options.models.primary, fallback = %options.models.fallback, %reason, "falling back to secondary model");
                self.call_with_retries(&options.models.fallback, prompt, options)
                    .await
                    .map_err(|err| PipelineError::llm_failure(describe(err)))
            }
            Err(err) => Err(PipelineError::llm_failure(describe(err))),
        }
    }
}

fn describe(err: ModelCallError) -> String {
    match err {
        ModelCallError::Transient(reason) | ModelCallError::ClientError(reason) | ModelCallError::Fatal(reason) => reason,
    }
}
