// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Classification vocabulary used by the error circuit (C5).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The error-circuit classification taxonomy from §4.5 / §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Api,
    Database,
    Network,
    Validation,
    Processing,
    Resource,
    System,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCategory::Api => "api",
            ErrorCategory::Database => "database",
            ErrorCategory::Network => "network",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Processing => "processing",
            ErrorCategory::Resource => "resource",
            ErrorCategory::System => "system",
        };
        write!(f, "{s}")
    }
}

impl ErrorCategory {
    /// Best-effort classification from a `PipelineError`'s own category tag,
    /// falling back to keyword matching on the message the way the system
    /// this pipeline descends from classified opaque exception text.
    pub fn classify(category_hint: &str, message: &str) -> ErrorCategory {
        match category_hint {
            "api" => return ErrorCategory::Api,
            "database" => return ErrorCategory::Database,
            "network" => return ErrorCategory::Network,
            "validation" => return ErrorCategory::Validation,
            "resource" => return ErrorCategory::Resource,
            "system" => return ErrorCategory::System,
            _ => {}
        }
        let lower = message.to_ascii_lowercase();
        if lower.contains("timeout") || lower.contains("connection") {
            ErrorCategory::Network
        } else if lower.contains("database") || lower.contains("sql") {
            ErrorCategory::Database
        } else if lower.contains("api") || lower.contains("gemini") || lower.contains("llm") {
            ErrorCategory::Api
        } else if lower.contains("invalid") || lower.contains("validation") {
            ErrorCategory::Validation
        } else if lower.contains("memory") || lower.contains("resource") {
            ErrorCategory::Resource
        } else {
            ErrorCategory::Processing
        }
    }
}

/// Severity influences logging only, never state transitions (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorSeverity::Low => "low",
            ErrorSeverity::Medium => "medium",
            ErrorSeverity::High => "high",
            ErrorSeverity::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

impl ErrorSeverity {
    pub fn for_category(category: ErrorCategory) -> ErrorSeverity {
        match category {
            ErrorCategory::Api | ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Database | ErrorCategory::Resource => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
            ErrorCategory::Validation | ErrorCategory::Processing => ErrorSeverity::Low,
        }
    }
}
