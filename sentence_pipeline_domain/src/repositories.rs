// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Repositories
//!
//! This module contains repository interfaces that define the contracts for
//! data persistence within the sentence evaluation pipeline domain.
//!
//! ## Overview
//!
//! - **Sentence Store** (`SentenceRepository`): selection, verdict
//!   application, and bulk rejection for the two parallel sentence tables.
//! - **Rule Stores** (`RuleStore`): cached read access to keyword lists,
//!   locale-spelling pairs, and the atomic-truth corpus.
//! - **Performance Recorder** (`PerformanceRecorder`): append-only call
//!   metrics.
//! - **Error Log** (`ErrorLogRepository`): persisted error-circuit records.
//!
//! ## Implementation Strategy
//!
//! ### Domain Layer (This Module)
//! - Defines repository interfaces
//! - Specifies contracts and behavior
//! - Remains technology-agnostic
//!
//! ### Infrastructure Layer
//! - Provides concrete implementations (e.g. a `sqlx`-backed sentence store)
//! - Handles connection pooling and query optimization
//!
//! ## Best Practices
//!
//! - Keep interfaces focused and cohesive
//! - Use async methods for I/O operations
//! - Return `PipelineError` for all failure modes
//! - Design for batch operations where the orchestrator needs them

pub mod error_log_repository;
pub mod performance_recorder;
pub mod rule_store;
pub mod sentence_repository;

pub use error_log_repository::ErrorLogRepository;
pub use performance_recorder::PerformanceRecorder;
pub use rule_store::RuleStore;
pub use sentence_repository::SentenceRepository;
