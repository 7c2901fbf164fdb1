// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure layer: concrete adapters behind the domain crate's port
//! traits, plus the process-level config and logging setup the composition
//! root needs before any adapter can be built.

pub mod config;
pub mod llm;
pub mod logging;
pub mod repositories;

pub use config::PipelineConfig;
pub use llm::GeminiClient;
pub use repositories::{
    PostgresErrorLogRepository, PostgresPerformanceRecorder, PostgresRuleStore, PostgresSentenceRepository,
};
