// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Skill Analysis (C4.5)
//!
//! LLM-backed, batch size 5. Produces exactly one free-form `primary_skill`
//! label per sentence — there is no fixed enumeration, unlike tone analysis
//! (§4.4.5).

use crate::entities::{Sentence, Verdict};
use crate::services::llm_client::{LlmClient, LlmModelPair, LlmRequestOptions};
use crate::services::prompt_security::{generate_security_token, wrap_with_checkpoint};
use crate::value_objects::{ProcessingStage, SessionId};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

const STAGE: ProcessingStage = ProcessingStage::SkillAnalysis;
const SUB_BATCH_SIZE: usize = 5;
const DEFAULT_SKILL: &str = "General Professional Skills";

pub struct SkillAnalysisProcessor {
    llm: Arc<dyn LlmClient>,
    models: LlmModelPair,
}

impl SkillAnalysisProcessor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm, models: LlmModelPair::new("gemini-2.5-flash", "gemini-1.5-flash") }
    }

    fn build_prompt(&self, batch: &[Sentence]) -> String {
        let enumerated = batch
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. [id={}] {}", i, s.id, s.content_text))
            .collect::<Vec<_>>()
            .join("\n");

        let token = generate_security_token();
        let body = format!(
            "Identify the single most prominent professional skill each sentence demonstrates.\n\
             Respond with a short professional-skill phrase per sentence, not a category label.\n\n\
             Sentences to evaluate:\n{enumerated}\n\n\
             Respond with a single JSON object of the form:\n\
             {{\"skill_analysis_results\": [{{\"sentence_id\": string, \"index\": integer, \
             \"primary_skill\": string, \"reasoning\": string}}], \"batch_summary\": {{}}}}"
        );
        wrap_with_checkpoint(&token, &body)
    }

    fn default_verdict(&self, sentence: &Sentence) -> Verdict {
        Verdict::error(sentence.id, sentence.table, STAGE, "skill_parse_failed")
            .with_payload(json!({ "primary_skill": DEFAULT_SKILL }))
    }

    /// A sentence id absent from an otherwise-successfully-parsed response
    /// array is not a batch failure — the batch came back, this one
    /// sentence just has no record in it. Approved with the default skill,
    /// not an error verdict.
    fn missing_record_verdict(&self, sentence: &Sentence) -> Verdict {
        Verdict::approved(sentence.id, sentence.table, STAGE).with_payload(json!({ "primary_skill": DEFAULT_SKILL }))
    }

    fn verdict_from_result(&self, sentence: &Sentence, result: &Value) -> Verdict {
        let skill = result
            .get("primary_skill")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SKILL);

        Verdict::approved(sentence.id, sentence.table, STAGE)
            .with_model(self.models.primary.clone())
            .with_payload(json!({
                "primary_skill": skill,
                "reasoning": result.get("reasoning").and_then(Value::as_str).unwrap_or_default(),
            }))
    }

    async fn process_sub_batch(&self, batch: &[Sentence]) -> Vec<Verdict> {
        let prompt = self.build_prompt(batch);
        let options = LlmRequestOptions::deterministic(self.models.clone());

        let response = match self.llm.request(&prompt, &options).await {
            Ok(response) => response,
            Err(_) => return batch.iter().map(|s| self.default_verdict(s)).collect(),
        };

        let results_by_id: HashMap<String, &Value> = response
            .get("skill_analysis_results")
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
impl crate::services::StageProcessor for SkillAnalysisProcessor {
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

    struct FailingLlmClient;

    #[async_trait]
    impl LlmClient for FailingLlmClient {
        async fn request(&self, _prompt: &str, _options: &LlmRequestOptions) -> Result<Value, PipelineError> {
            Err(PipelineError::llm_failure("exhausted retries"))
        }
    }

    /// Responds successfully but omits every sentence id from the results
    /// array, to exercise the missing-individual-record path distinctly
    /// from a whole-batch `Err`.
    struct OmitsAllRecordsLlmClient;

    #[async_trait]
    impl LlmClient for OmitsAllRecordsLlmClient {
        async fn request(&self, _prompt: &str, _options: &LlmRequestOptions) -> Result<Value, PipelineError> {
            Ok(json!({"skill_analysis_results": []}))
        }
    }

    #[test]
    fn llm_failure_falls_back_to_default_skill_with_error_status() {
        futures::executor::block_on(async {
            let processor = SkillAnalysisProcessor::new(Arc::new(FailingLlmClient));
            let sentence = Sentence::new(SentenceTable::Resume, "Led a cross-functional rollout.");
            let verdicts = processor.process_batch(&[sentence], &SessionId::generate()).await;
            assert_eq!(verdicts[0].status, crate::value_objects::StageStatus::Error);
            assert_eq!(verdicts[0].payload.as_ref().unwrap()["primary_skill"], DEFAULT_SKILL);
        });
    }

    #[test]
    fn sentence_missing_from_an_otherwise_successful_batch_is_approved_not_errored() {
        futures::executor::block_on(async {
            let processor = SkillAnalysisProcessor::new(Arc::new(OmitsAllRecordsLlmClient));
            let sentence = Sentence::new(SentenceTable::Resume, "Led a cross-functional rollout.");
            let verdicts = processor.process_batch(&[sentence], &SessionId::generate()).await;
            assert_eq!(verdicts[0].status, crate::value_objects::StageStatus::Approved);
            assert_eq!(verdicts[0].payload.as_ref().unwrap()["primary_skill"], DEFAULT_SKILL);
        });
    }
}
