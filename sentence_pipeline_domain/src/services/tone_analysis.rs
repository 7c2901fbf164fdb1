// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Tone Analysis (C4.4)
//!
//! LLM-backed, batch size 5. Classifies each sentence against the fixed
//! nine-label tone taxonomy. Status is always `approved` once parsing
//! succeeds — tone analysis never rejects a sentence, only annotates it
//! (§4.4.4).

use crate::entities::{Sentence, Verdict};
use crate::services::llm_client::{LlmClient, LlmModelPair, LlmRequestOptions};
use crate::services::prompt_security::{generate_security_token, wrap_with_checkpoint};
use crate::value_objects::{ProcessingStage, SessionId, StageStatus, ToneCategory};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

const STAGE: ProcessingStage = ProcessingStage::ToneAnalysis;
const SUB_BATCH_SIZE: usize = 5;

pub struct ToneAnalysisProcessor {
    llm: Arc<dyn LlmClient>,
    models: LlmModelPair,
}

impl ToneAnalysisProcessor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm, models: LlmModelPair::new("gemini-2.5-pro", "gemini-2.5-flash") }
    }

    fn build_prompt(&self, batch: &[Sentence]) -> String {
        let categories = ToneCategory::all()
            .iter()
            .map(|c| format!("- {}: {}", c.name(), c.description()))
            .collect::<Vec<_>>()
            .join("\n");

        let enumerated = batch
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. [id={}] {}", i, s.id, s.content_text))
            .collect::<Vec<_>>()
            .join("\n");

        let token = generate_security_token();
        let body = format!(
            "Classify the dominant tone of each sentence using exactly these categories:\n{categories}\n\n\
             Sentences to evaluate:\n{enumerated}\n\n\
             Respond with a single JSON object of the form:\n\
             {{\"tone_analysis_results\": [{{\"sentence_id\": string, \"index\": integer, \
             \"primary_tone\": string, \"secondary_tone\": string, \"confidence_score\": number, \
             \"tone_strength\": string, \"reasoning\": string, \"tone_indicators\": [string], \
             \"professional_impact\": string}}], \"batch_summary\": {{}}}}"
        );
        wrap_with_checkpoint(&token, &body)
    }

    fn default_verdict(&self, sentence: &Sentence) -> Verdict {
        Verdict::error(sentence.id, sentence.table, STAGE, "tone_parse_failed").with_payload(json!({
            "primary_tone": ToneCategory::fallback().name(),
            "secondary_tone": Value::Null,
            "confidence_score": 0.0,
            "tone_strength": "Unknown",
        }))
    }

    /// A sentence id absent from an otherwise-successfully-parsed response
    /// array is not a batch failure — the batch came back, this one
    /// sentence just has no record in it. Approved with a neutral payload,
    /// not an error verdict.
    fn missing_record_verdict(&self, sentence: &Sentence) -> Verdict {
        Verdict::approved(sentence.id, sentence.table, STAGE).with_payload(json!({
            "primary_tone": "Analytical",
            "secondary_tone": Value::Null,
            "confidence_score": 0.3,
            "tone_strength": "Subtle",
            "reasoning": "No analysis result returned",
            "tone_indicators": [],
            "professional_impact": "Analysis unavailable",
        }))
    }

    fn verdict_from_result(&self, sentence: &Sentence, result: &Value) -> Verdict {
        let mut warning = None;
        let primary_tone = result
            .get("primary_tone")
            .and_then(Value::as_str)
            .and_then(|s| ToneCategory::from_str(s).ok())
            .unwrap_or_else(|| {
                warning = Some("invalid primary_tone defaulted to Analytical".to_string());
                ToneCategory::fallback()
            });

        let secondary_tone =
            result.get("secondary_tone").and_then(Value::as_str).and_then(|s| ToneCategory::from_str(s).ok());

        let confidence = result
            .get("confidence_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);

        let mut payload = json!({
            "primary_tone": primary_tone.name(),
            "secondary_tone": secondary_tone.map(|t| t.name()),
            "confidence_score": confidence,
            "tone_strength": result.get("tone_strength").and_then(Value::as_str).unwrap_or("Moderate"),
            "reasoning": result.get("reasoning").and_then(Value::as_str).unwrap_or_default(),
            "tone_indicators": result.get("tone_indicators").cloned().unwrap_or_else(|| json!([])),
            "professional_impact": result.get("professional_impact").and_then(Value::as_str).unwrap_or_default(),
        });
        if let Some(warning) = &warning {
            payload["warning"] = json!(warning);
        }

        Verdict::approved(sentence.id, sentence.table, STAGE)
            .with_model(self.models.primary.clone())
            .with_payload(payload)
    }

    async fn process_sub_batch(&self, batch: &[Sentence]) -> Vec<Verdict> {
        let prompt = self.build_prompt(batch);
        let options = LlmRequestOptions::deterministic(self.models.clone());

        let response = match self.llm.request(&prompt, &options).await {
            Ok(response) => response,
            Err(_) => return batch.iter().map(|s| self.default_verdict(s)).collect(),
        };

        let results_by_id: HashMap<String, &Value> = response
            .get("tone_analysis_results")
            .and_then(Value::as_array)
            .map(|results| {
                results
                    .iter()
                    .filter_map(|r| r.get("sentence_id").and_then(Value::as_str).map(|id| (id.to_string(), r)))
                    .collect()
            })
            .unwrap_or_default();

        batch
            .iter()
            .map(|sentence| match results_by_id.get(&sentence.id.to_string()) {
                Some(result) => self.verdict_from_result(sentence, result),
                None => self.missing_record_verdict(sentence),
            })
            .collect()
    }
}

#[async_trait]
impl crate::services::StageProcessor for ToneAnalysisProcessor {
    async fn process_batch(&self, sentences: &[Sentence], _session_id: &SessionId) -> Vec<Verdict> {
        let mut verdicts = Vec::with_capacity(sentences.len());
        for sub_batch in sentences.chunks(SUB_BATCH_SIZE) {
            verdicts.extend(self.process_sub_batch(sub_batch).await);
        }
        verdicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StageProcessor;
    use crate::value_objects::SentenceTable;
    use crate::PipelineError;

    struct StubLlmClient;

    #[async_trait]
    impl LlmClient for StubLlmClient {
        async fn request(&self, prompt: &str, _options: &LlmRequestOptions) -> Result<Value, PipelineError> {
            let ids: Vec<&str> = prompt.split("[id=").skip(1).filter_map(|c| c.split(']').next()).collect();
            let results: Vec<Value> = ids
                .iter()
                .map(|id| json!({"sentence_id": id, "primary_tone": "NotARealTone", "confidence_score": 5.0}))
                .collect();
            Ok(json!({"tone_analysis_results": results}))
        }
    }

    /// Responds successfully but omits every sentence id from the results
    /// array, to exercise the missing-individual-record path distinctly
    /// from a whole-batch `Err`.
    struct OmitsAllRecordsLlmClient;

    #[async_trait]
    impl LlmClient for OmitsAllRecordsLlmClient {
        async fn request(&self, _prompt: &str, _options: &LlmRequestOptions) -> Result<Value, PipelineError> {
            Ok(json!({"tone_analysis_results": []}))
        }
    }

    #[test]
    fn invalid_primary_tone_defaults_to_analytical_and_clamps_confidence() {
        futures::executor::block_on(async {
            let processor = ToneAnalysisProcessor::new(Arc::new(StubLlmClient));
            let sentence = Sentence::new(SentenceTable::Resume, "I led the team boldly.");
            let verdicts = processor.process_batch(&[sentence], &SessionId::generate()).await;
            assert_eq!(verdicts[0].status, StageStatus::Approved);
            let payload = verdicts[0].payload.as_ref().unwrap();
            assert_eq!(payload["primary_tone"], "Analytical");
            assert_eq!(payload["confidence_score"], 1.0);
        });
    }

    #[test]
    fn sentence_missing_from_an_otherwise_successful_batch_is_approved_not_errored() {
        futures::executor::block_on(async {
            let processor = ToneAnalysisProcessor::new(Arc::new(OmitsAllRecordsLlmClient));
            let sentence = Sentence::new(SentenceTable::Resume, "I led the team boldly.");
            let verdicts = processor.process_batch(&[sentence], &SessionId::generate()).await;
            assert_eq!(verdicts[0].status, StageStatus::Approved);
            let payload = verdicts[0].payload.as_ref().unwrap();
            assert_eq!(payload["primary_tone"], "Analytical");
            assert_eq!(payload["confidence_score"], 0.3);
            assert_eq!(payload["tone_strength"], "Subtle");
            assert_eq!(payload["reasoning"], "No analysis result returned");
        });
    }
}
