// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Truthfulness Evaluator (C4.2)
//!
//! LLM-backed, batch size 5. Splits larger inputs into sub-batches of
//! exactly five, merging verdicts by id; the last sub-batch may be smaller
//! (§4.4.2, §8 scenario 5).

use crate::entities::{Sentence, Verdict};
use crate::services::llm_client::{LlmClient, LlmModelPair, LlmRequestOptions};
use crate::services::prompt_security::{generate_security_token, wrap_with_checkpoint};
use crate::value_objects::{ProcessingStage, SentenceId, SessionId, StageStatus};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

const STAGE: ProcessingStage = ProcessingStage::Truthfulness;
const SUB_BATCH_SIZE: usize = 5;
const APPROVAL_THRESHOLD: f64 = 0.7;

pub struct TruthfulnessProcessor {
    llm: Arc<dyn LlmClient>,
    atomic_truths: Vec<String>,
    models: LlmModelPair,
}

impl TruthfulnessProcessor {
    pub fn new(llm: Arc<dyn LlmClient>, atomic_truths: Vec<String>) -> Self {
        Self { llm, atomic_truths, models: LlmModelPair::new("gemini-2.5-flash", "gemini-1.5-flash") }
    }

    fn build_prompt(&self, batch: &[Sentence]) -> String {
        let evidence = self.atomic_truths.iter().enumerate().map(|(i, t)| format!("{}. {t}", i + 1)).collect::<Vec<_>>().join("\n");

        let enumerated = batch
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. [id={}] {}", i, s.id, s.content_text))
            .collect::<Vec<_>>()
            .join("\n");

        let token = generate_security_token();
        let body = format!(
            "You are verifying the factual truthfulness of candidate statements against known facts.\n\n\
             Known facts about the candidate:\n{evidence}\n\n\
             Sentences to evaluate:\n{enumerated}\n\n\
             Respond with a single JSON object of the form:\n\
             {{\"evaluation_results\": [{{\"sentence_id\": string, \"index\": integer, \
             \"truthfulness_score\": number, \"status\": string, \"confidence_level\": number, \
             \"issues_detected\": [string], \"reasoning\": string, \"recommendations\": string}}], \
             \"batch_summary\": {{}}}}"
        );
        wrap_with_checkpoint(&token, &body)
    }

    fn default_verdict(&self, sentence: &Sentence) -> Verdict {
        Verdict::error(sentence.id, sentence.table, STAGE, "evaluation_missing")
    }

    fn verdict_from_result(&self, sentence: &Sentence, result: &Value) -> Verdict {
        let score = result.get("truthfulness_score").and_then(Value::as_f64);
        let Some(score) = score else {
            return self.default_verdict(sentence);
        };

        let status = if score >= APPROVAL_THRESHOLD { StageStatus::Approved } else { StageStatus::Rejected };
        let reason = if status == StageStatus::Rejected {
            let issues = result.get("issues_detected").and_then(Value::as_array);
            match issues {
                Some(issues) if !issues.is_empty() => {
                    Some(issues.iter().filter_map(Value::as_str).collect::<Vec<_>>().join("; "))
                }
                _ => result
                    .get("reasoning")
                    .and_then(Value::as_str)
                    .map(|r| r.chars().take(200).collect::<String>()),
            }
        } else {
            None
        };

        let mut verdict = Verdict::new(sentence.id, sentence.table, STAGE, status)
            .with_model(self.models.primary.clone())
            .with_payload(result.clone());
        if let Some(reason) = reason {
            verdict = verdict.with_reason(reason);
        }
        verdict
    }

    async fn process_sub_batch(&self, batch: &[Sentence], _session_id: &SessionId) -> Vec<Verdict> {
        let prompt = self.build_prompt(batch);
        let options = LlmRequestOptions::deterministic(self.models.clone());

        let response = match self.llm.request(&prompt, &options).await {
            Ok(response) => response,
            Err(_) => return batch.iter().map(|s| self.default_verdict(s)).collect(),
        };

        let results_by_id: HashMap<String, &Value> = response
            .get("evaluation_results")
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
                None => self.default_verdict(sentence),
            })
            .collect()
    }
}

#[async_trait]
impl crate::services::StageProcessor for TruthfulnessProcessor {
    async fn process_batch(&self, sentences: &[Sentence], session_id: &SessionId) -> Vec<Verdict> {
        let mut verdicts = Vec::with_capacity(sentences.len());
        for sub_batch in sentences.chunks(SUB_BATCH_SIZE) {
            verdicts.extend(self.process_sub_batch(sub_batch, session_id).await);
        }
        verdicts
    }
}

/// Re-sorts verdicts produced out of request order back into the original
/// sentence order, by id. Exposed for processors/tests that need to verify
/// id-keyed correspondence without relying on response ordering.
pub fn reorder_by_ids(verdicts: Vec<Verdict>, ids: &[SentenceId]) -> Vec<Verdict> {
    let mut by_id: HashMap<SentenceId, Verdict> = verdicts.into_iter().map(|v| (v.id, v)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StageProcessor;
    use crate::value_objects::SentenceTable;
    use crate::PipelineError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubLlmClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for StubLlmClient {
        async fn request(&self, prompt: &str, _options: &LlmRequestOptions) -> Result<Value, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Pull every "[id=...]" out of the prompt and approve all of them.
            let ids: Vec<&str> = prompt
                .split("[id=")
                .skip(1)
                .filter_map(|chunk| chunk.split(']').next())
                .collect();
            let results: Vec<Value> = ids
                .iter()
                .enumerate()
                .map(|(i, id)| json!({"sentence_id": id, "index": i, "truthfulness_score": 0.9, "status": "approved", "confidence_level": 0.9, "issues_detected": [], "reasoning": "ok", "recommendations": ""}))
                .collect();
            Ok(json!({"evaluation_results": results, "batch_summary": {}}))
        }
    }

    #[test]
    fn splits_seven_sentences_into_five_and_two() {
        futures::executor::block_on(async {
            let llm = Arc::new(StubLlmClient { calls: AtomicUsize::new(0) });
            let processor = TruthfulnessProcessor::new(llm.clone(), vec!["Fact one.".to_string()]);
            let sentences: Vec<Sentence> =
                (0..7).map(|i| Sentence::new(SentenceTable::Resume, format!("Statement {i}"))).collect();

            let verdicts = processor.process_batch(&sentences, &SessionId::generate()).await;

            assert_eq!(verdicts.len(), 7);
            assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
            for v in &verdicts {
                assert_eq!(v.status, StageStatus::Approved);
            }
        });
    }

    #[test]
    fn missing_result_produces_error_verdict() {
        futures::executor::block_on(async {
            struct EmptyLlmClient;
            #[async_trait]
            impl LlmClient for EmptyLlmClient {
                async fn request(&self, _prompt: &str, _options: &LlmRequestOptions) -> Result<Value, PipelineError> {
                    Ok(json!({"evaluation_results": [], "batch_summary": {}}))
                }
            }

            let processor = TruthfulnessProcessor::new(Arc::new(EmptyLlmClient), vec![]);
            let sentence = Sentence::new(SentenceTable::Resume, "A statement.");
            let verdicts = processor.process_batch(&[sentence], &SessionId::generate()).await;
            assert_eq!(verdicts[0].status, StageStatus::Error);
            assert_eq!(verdicts[0].reason.as_deref(), Some("evaluation_missing"));
        });
    }
}
