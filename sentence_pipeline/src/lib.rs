// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Sentence Pipeline
//!
//! A five-stage content evaluation pipeline for resume and cover-letter
//! sentences: keyword filter, truthfulness, locale spelling, tone
//! classification, and skill assignment.
//!
//! This crate holds everything `sentence_pipeline_domain`'s ports need to
//! become a runnable process:
//!
//! - [`application`] — the orchestrator (C8) and scheduler (C7), built from
//!   `Arc<dyn Trait>` domain ports with no I/O of their own.
//! - [`infrastructure`] — concrete adapters: a Postgres-backed sentence
//!   store and rule store, a Gemini-backed LLM client, configuration
//!   loading, and logging initialization.
//! - [`presentation`] — thin request/response types and wrapper functions
//!   for the HTTP surface named in §6; no server is wired up here.
//!
//! The binary entry point lives in `src/main.rs` and is the composition
//! root: it loads [`infrastructure::PipelineConfig`], builds the concrete
//! adapters, and injects them into an [`application::Orchestrator`].

pub mod application;
pub mod infrastructure;
pub mod presentation;

// Tests are organized as:
// - Unit tests: #[cfg(test)] modules within each source file
// - Integration tests: separate files in tests/ directory

pub use sentence_pipeline_domain::PipelineError;
