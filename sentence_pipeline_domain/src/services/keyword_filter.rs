// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Keyword Filter (C4.1)
//!
//! Deterministic, single-sentence granularity (batch size policy = 1).
//! Lowercases each sentence's content and checks for the presence of any
//! active keyword using whole-word boundaries, so `"meticulous"` does not
//! match inside `"unmeticulous"` (§4.4.1).

use crate::entities::{Sentence, Verdict};
use crate::value_objects::{ProcessingStage, SessionId, StageStatus};
use crate::PipelineError;
use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

const STAGE: ProcessingStage = ProcessingStage::KeywordFilter;

/// Holds the active keyword set for one `process_batch` call. Callers
/// (typically the orchestrator) refresh this from the rule store according
/// to its own TTL policy and construct a new processor, or reuse one across
/// calls within the cache's lifetime.
pub struct KeywordFilterProcessor {
    keywords: Vec<String>,
}

impl KeywordFilterProcessor {
    pub fn new(active_keywords: Vec<String>) -> Self {
        Self { keywords: active_keywords.into_iter().map(|k| k.to_lowercase()).collect() }
    }

    fn matched_keywords(&self, content_lower: &str) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|keyword| word_boundary_match(content_lower, keyword))
            .cloned()
            .collect()
    }

    fn verdict_for(&self, sentence: &Sentence) -> Verdict {
        let content = sentence.content_text.trim();
        if content.is_empty() {
            return Verdict::rejected(sentence.id, sentence.table, STAGE, "empty_content");
        }

        if self.keywords.is_empty() {
            return Verdict::rejected(sentence.id, sentence.table, STAGE, "no_active_keywords");
        }

        let content_lower = content.to_lowercase();
        let matched = self.matched_keywords(&content_lower);
        if matched.is_empty() {
            Verdict::rejected(sentence.id, sentence.table, STAGE, "no_brand_keywords")
        } else {
            Verdict::approved(sentence.id, sentence.table, STAGE)
                .with_payload(json!({ "matched_keywords": matched }))
        }
    }
}

/// Whole-word match for `keyword` within `content`, both assumed already
/// lowercase. Escapes the keyword so punctuation in a keyword can't be
/// misread as regex metacharacters.
fn word_boundary_match(content: &str, keyword: &str) -> bool {
    let pattern = format!(r"\b{}\b", regex::escape(keyword));
    Regex::new(&pattern).map(|re| re.is_match(content)).unwrap_or(false)
}

#[async_trait]
impl crate::services::StageProcessor for KeywordFilterProcessor {
    async fn process_batch(&self, sentences: &[Sentence], _session_id: &SessionId) -> Vec<Verdict> {
        if self.keywords.is_empty() {
            // Edge case (§4.4.1): warn-worthy, but must never crash — every
            // sentence is rejected with a distinct reason.
            return sentences.iter().map(|s| self.verdict_for(s)).collect();
        }
        sentences.iter().map(|s| self.verdict_for(s)).collect()
    }
}

/// Classifies the keyword filter's failure-to-load-corpus case for the
/// error circuit, used by callers constructing the processor from a
/// possibly-failed rule-store read.
pub fn rule_load_error(source: impl std::fmt::Display) -> PipelineError {
    PipelineError::rule_load(format!("keyword corpus unavailable: {source}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StageProcessor;
    use crate::value_objects::SentenceTable;

    fn sentence(text: &str) -> Sentence {
        Sentence::new(SentenceTable::Resume, text)
    }

    #[test]
    fn approves_on_whole_word_match_only() {
        futures::executor::block_on(async {
            let processor = KeywordFilterProcessor::new(vec!["excited".to_string()]);
            let session = SessionId::generate();

            let approved = sentence("I am excited to apply.");
            let rejected = sentence("Unexcitedly proceeding.");

            let verdicts = processor.process_batch(&[approved.clone(), rejected.clone()], &session).await;
            let approved_verdict = verdicts.iter().find(|v| v.id == approved.id).unwrap();
            let rejected_verdict = verdicts.iter().find(|v| v.id == rejected.id).unwrap();

            assert_eq!(approved_verdict.status, StageStatus::Approved);
            assert_eq!(rejected_verdict.status, StageStatus::Rejected);
            assert_eq!(rejected_verdict.reason.as_deref(), Some("no_brand_keywords"));
        });
    }

    #[test]
    fn empty_content_is_rejected_with_distinct_reason() {
        futures::executor::block_on(async {
            let processor = KeywordFilterProcessor::new(vec!["excited".to_string()]);
            let session = SessionId::generate();
            let verdicts = processor.process_batch(&[sentence("   ")], &session).await;
            assert_eq!(verdicts[0].reason.as_deref(), Some("empty_content"));
        });
    }

    #[test]
    fn no_active_keywords_rejects_everything_without_crashing() {
        futures::executor::block_on(async {
            let processor = KeywordFilterProcessor::new(vec![]);
            let session = SessionId::generate();
            let verdicts = processor.process_batch(&[sentence("anything at all")], &session).await;
            assert_eq!(verdicts[0].status, StageStatus::Rejected);
            assert_eq!(verdicts[0].reason.as_deref(), Some("no_active_keywords"));
        });
    }

    proptest::proptest! {
        /// §8 round-trip law: the filter is a pure function of
        /// `(content_text, active_keyword_set)` — identical inputs yield
        /// identical verdicts and matched-keyword lists.
        #[test]
        fn verdict_is_deterministic(content in ".{0,60}", keywords in proptest::collection::vec(
            proptest::sample::select(vec!["excited", "driven", "collaborative"]),
            0..3,
        )) {
            let processor = KeywordFilterProcessor::new(keywords.into_iter().map(String::from).collect());
            let s = sentence(&content);
            let first = processor.verdict_for(&s);
            let second = processor.verdict_for(&s);
            proptest::prop_assert_eq!(first.status, second.status);
            proptest::prop_assert_eq!(first.reason, second.reason);
            proptest::prop_assert_eq!(first.payload, second.payload);
        }
    }
}
