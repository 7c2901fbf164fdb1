// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Rule Stores (C2)
//!
//! Read-mostly corpora consulted by the stage processors: the active
//! keyword list, locale-spelling conversion pairs, and the atomic-truth
//! corpus embedded in the truthfulness prompt. Keyword and spelling data are
//! cached in-process with a configured TTL; an explicit `refresh` call
//! invalidates the cache (§4.2, §9 "Caches with TTL").

use crate::PipelineError;
use async_trait::async_trait;

/// An ordered source→target spelling substitution pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellingPair {
    pub source: String,
    pub target: String,
}

/// Interface to the rule corpora. Implementations own their own TTL cache;
/// callers just ask for the current value.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// The set of active, lowercase keyword tokens used by the keyword
    /// filter (§4.4.1). An empty set is a valid (if degenerate) response —
    /// callers must handle it per the "no active keywords" edge case.
    async fn active_keywords(&self) -> Result<Vec<String>, PipelineError>;

    /// Spelling conversion pairs, already sorted longest-source-first so
    /// callers can apply them directly (§4.4.3).
    async fn spelling_pairs(&self) -> Result<Vec<SpellingPair>, PipelineError>;

    /// The atomic-truth corpus: factual statements about the candidate used
    /// as evidence in the truthfulness prompt (§4.4.2).
    async fn atomic_truths(&self) -> Result<Vec<String>, PipelineError>;

    /// Invalidates any cached corpora so the next read re-fetches from the
    /// backing store.
    async fn refresh(&self) -> Result<(), PipelineError>;
}
