// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Postgres-backed implementations of the domain crate's repository ports
//! (C1, C2, C5, C6).

pub mod error_log;
pub mod performance;
pub mod rule_store;
pub mod schema;
pub mod sentence_repository;

pub use error_log::PostgresErrorLogRepository;
pub use performance::PostgresPerformanceRecorder;
pub use rule_store::PostgresRuleStore;
pub use sentence_repository::PostgresSentenceRepository;
