// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Processor Contract (C4)
//!
//! All five stages implement the same contract. A processor is a pure
//! batch function from sentences to verdicts: it never mutates the
//! sentence store, never partially returns (every input produces exactly
//! one verdict, even on internal failure), and is stateless across calls
//! except for whatever read-only rule cache it holds.
//!
//! The orchestrator's `processors: map<stage, Arc<dyn StageProcessor>>`
//! field is populated lazily on first use (§9, "Lazy processor loading").

use crate::entities::{Sentence, Verdict};
use crate::value_objects::SessionId;
use async_trait::async_trait;

#[async_trait]
pub trait StageProcessor: Send + Sync {
    /// Processes a batch of sentences and returns exactly one verdict per
    /// input, matched by `id`. The orchestrator is the authority on
    /// chunking (§4.4.6); a conforming implementation must still tolerate
    /// any input size by sub-chunking internally when it calls out to an
    /// LLM (§8, "oversize batch").
    async fn process_batch(&self, sentences: &[Sentence], session_id: &SessionId) -> Vec<Verdict>;
}
