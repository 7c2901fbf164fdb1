// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Locale Spelling (C4.3)
//!
//! Deterministic, per-sentence, no LLM call. Applies substitutions in
//! longest-source-first order, using whole-word boundaries, in three case
//! variants per pair: exact case, title case, and uppercase (only when the
//! source is longer than two characters, to avoid false-positive acronym
//! rewrites) (§4.4.3).
//!
//! `content_text` itself is never mutated (§3 invariant 6) — the corrected
//! text and its change list live in the verdict payload.

use crate::entities::{Sentence, Verdict};
use crate::repositories::rule_store::SpellingPair;
use crate::value_objects::{ProcessingStage, SessionId, StageStatus};
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use serde_json::json;

const STAGE: ProcessingStage = ProcessingStage::CanadianSpelling;

/// One recorded substitution.
#[derive(Debug, Clone, Serialize)]
pub struct SpellingChange {
    pub original: String,
    pub replacement: String,
    pub position: usize,
    pub match_type: &'static str,
}

struct CompiledVariant {
    pattern: Regex,
    replacement: String,
    match_type: &'static str,
}

struct CompiledPair {
    variants: Vec<CompiledVariant>,
}

pub struct LocaleSpellingProcessor {
    pairs: Vec<CompiledPair>,
}

impl LocaleSpellingProcessor {
    pub fn new(mut pairs: Vec<SpellingPair>) -> Self {
        // Longest source first, so "organizations" is substituted before
        // "organization" ever gets a chance to match a prefix of it.
        pairs.sort_by(|a, b| b.source.len().cmp(&a.source.len()));

        let compiled = pairs
            .into_iter()
            .filter_map(|pair| compile_pair(&pair))
            .collect();

        Self { pairs: compiled }
    }

    /// Applies every configured pair to `content`, returning the corrected
    /// text and the ordered list of changes. Applying the result again is a
    /// fixpoint: every variant pattern only matches the American spelling,
    /// which no longer appears in the output.
    pub fn apply(&self, content: &str) -> (String, Vec<SpellingChange>) {
        let mut corrected = content.to_string();
        let mut changes = Vec::new();

        for pair in &self.pairs {
            for variant in &pair.variants {
                // Re-scan after each substitution so `position` refers to
                // offsets in the text as of that step.
                let mut result = String::with_capacity(corrected.len());
                let mut last_end = 0;
                for mat in variant.pattern.find_iter(&corrected) {
                    result.push_str(&corrected[last_end..mat.start()]);
                    result.push_str(&variant.replacement);
                    changes.push(SpellingChange {
                        original: mat.as_str().to_string(),
                        replacement: variant.replacement.clone(),
                        position: mat.start(),
                        match_type: variant.match_type,
                    });
                    last_end = mat.end();
                }
                result.push_str(&corrected[last_end..]);
                corrected = result;
            }
        }

        (corrected, changes)
    }

    fn verdict_for(&self, sentence: &Sentence) -> Verdict {
        let content = sentence.content_text.trim();
        if content.is_empty() {
            return Verdict::approved(sentence.id, sentence.table, STAGE)
                .with_payload(json!({ "corrected_text": "", "changes": [], "changes_count": 0 }));
        }

        let (corrected, changes) = self.apply(&sentence.content_text);
        Verdict::approved(sentence.id, sentence.table, STAGE).with_payload(json!({
            "corrected_text": corrected,
            "changes": changes,
            "changes_count": changes.len(),
        }))
    }
}

fn compile_pair(pair: &SpellingPair) -> Option<CompiledPair> {
    if pair.source.is_empty() {
        return None;
    }

    let mut variants = Vec::with_capacity(3);

    // Exact case.
    variants.push(CompiledVariant {
        pattern: boundary_pattern(&pair.source)?,
        replacement: pair.target.clone(),
        match_type: "exact",
    });

    // Title case, only when it differs from the exact-case source (i.e. the
    // source isn't already capitalized).
    let title_source = capitalize(&pair.source);
    if title_source != pair.source {
        variants.push(CompiledVariant {
            pattern: boundary_pattern(&title_source)?,
            replacement: capitalize(&pair.target),
            match_type: "title_case",
        });
    }

    // Uppercase, only for sources longer than two characters — short
    // all-caps tokens are too likely to be unrelated acronyms.
    if pair.source.len() > 2 {
        let upper_source = pair.source.to_uppercase();
        variants.push(CompiledVariant {
            pattern: boundary_pattern(&upper_source)?,
            replacement: pair.target.to_uppercase(),
            match_type: "uppercase",
        });
    }

    Some(CompiledPair { variants })
}

fn boundary_pattern(word: &str) -> Option<Regex> {
    Regex::new(&format!(r"\b{}\b", regex::escape(word))).ok()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[async_trait]
impl crate::services::StageProcessor for LocaleSpellingProcessor {
    async fn process_batch(&self, sentences: &[Sentence], _session_id: &SessionId) -> Vec<Verdict> {
        sentences.iter().map(|s| self.verdict_for(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StageProcessor;
    use crate::value_objects::SentenceTable;

    fn pair(source: &str, target: &str) -> SpellingPair {
        SpellingPair { source: source.to_string(), target: target.to_string() }
    }

    #[test]
    fn applies_longest_source_first() {
        let processor = LocaleSpellingProcessor::new(vec![
            pair("organization", "organisation"),
            pair("organizations", "organisations"),
        ]);
        let (corrected, changes) = processor.apply("Our organizations and this organization.");
        assert_eq!(corrected, "Our organisations and this organisation.");
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn empty_content_is_approved_with_zero_changes() {
        futures::executor::block_on(async {
            let processor = LocaleSpellingProcessor::new(vec![pair("color", "colour")]);
            let sentence = Sentence::new(SentenceTable::Resume, "   ");
            let verdicts = processor.process_batch(&[sentence], &SessionId::generate()).await;
            assert_eq!(verdicts[0].status, StageStatus::Approved);
            assert_eq!(verdicts[0].payload.as_ref().unwrap()["changes_count"], 0);
        });
    }

    #[test]
    fn applying_twice_is_a_fixpoint() {
        let processor = LocaleSpellingProcessor::new(vec![pair("color", "colour")]);
        let (once, _) = processor.apply("I love color and Color and COLOR.");
        let (twice, _) = processor.apply(&once);
        assert_eq!(once, twice);
    }

    proptest::proptest! {
        /// §8 round-trip law: applying the spelling stage twice yields the
        /// same text as applying it once, for any content built from a fixed
        /// vocabulary of American/Canadian pairs.
        #[test]
        fn apply_is_idempotent(words in proptest::collection::vec(
            proptest::sample::select(vec!["color", "organization", "favorite", "plain", "word"]),
            0..12,
        )) {
            let processor = LocaleSpellingProcessor::new(vec![
                pair("color", "colour"),
                pair("organization", "organisation"),
                pair("favorite", "favourite"),
            ]);
            let content = words.join(" ");
            let (once, _) = processor.apply(&content);
            let (twice, _) = processor.apply(&once);
            proptest::prop_assert_eq!(once, twice);
        }

        /// §8 round-trip law: the stage is a pure function of its inputs —
        /// running it twice on the same content produces the same output.
        #[test]
        fn apply_is_deterministic(content in ".{0,80}") {
            let processor = LocaleSpellingProcessor::new(vec![pair("color", "colour")]);
            let (first, first_changes) = processor.apply(&content);
            let (second, second_changes) = processor.apply(&content);
            proptest::prop_assert_eq!(first, second);
            proptest::prop_assert_eq!(first_changes.len(), second_changes.len());
        }
    }
}
