// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Code Management
//!
//! Standardized Unix exit codes following BSD `sysexits.h` conventions, plus
//! a fast path from [`PipelineError`] that takes priority over the generic
//! message-sniffing classifier: a tripped error circuit is a temporary,
//! retry-later condition (`TempFail`, 75), not a generic failure.

use sentence_pipeline_domain::PipelineError;
use std::fmt;

/// Exit codes following Unix conventions (BSD sysexits.h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    #[default]
    Success = 0,
    Error = 1,
    UsageError = 64,
    DataError = 65,
    NoInput = 66,
    NoUser = 67,
    NoHost = 68,
    Unavailable = 69,
    Software = 70,
    OsError = 71,
    OsFile = 72,
    CantCreate = 73,
    IoError = 74,
    TempFail = 75,
    Protocol = 76,
    NoPerm = 77,
    Config = 78,
    Interrupted = 130,
    Terminated = 143,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a generic error by sniffing its `Display` text. Used for errors
    /// that never cross a `PipelineError` boundary (CLI parsing, I/O).
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        let text = error.to_string().to_lowercase();

        if text.contains("permission") || text.contains("access denied") {
            ExitCode::NoPerm
        } else if text.contains("not found") || text.contains("no such") {
            ExitCode::NoInput
        } else if text.contains("invalid") || text.contains("argument") {
            ExitCode::UsageError
        } else if text.contains("parse") || text.contains("format") {
            ExitCode::DataError
        } else if text.contains("io") || text.contains("read") || text.contains("write") {
            ExitCode::IoError
        } else if text.contains("config") {
            ExitCode::Config
        } else if text.contains("unavailable") || text.contains("not available") {
            ExitCode::Unavailable
        } else {
            ExitCode::Error
        }
    }

    /// Maps a [`PipelineError`] to an exit code. `CooldownActive` always
    /// wins as `TempFail` regardless of what its message happens to
    /// contain; every other variant falls back to `category()`-driven
    /// buckets, then to the generic message classifier.
    pub fn from_pipeline_error(err: &PipelineError) -> Self {
        if matches!(err, PipelineError::CooldownActive(_)) {
            return ExitCode::TempFail;
        }
        match err.category() {
            "validation" => ExitCode::DataError,
            "system" => ExitCode::Config,
            "network" => ExitCode::Unavailable,
            "database" => ExitCode::IoError,
            "api" => ExitCode::Protocol,
            _ => ExitCode::from_error(err),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::Error => "General error",
            ExitCode::UsageError => "Command line usage error",
            ExitCode::DataError => "Data format error",
            ExitCode::NoInput => "Cannot open input",
            ExitCode::NoUser => "User does not exist",
            ExitCode::NoHost => "Host name unknown",
            ExitCode::Unavailable => "Service unavailable",
            ExitCode::Software => "Internal software error",
            ExitCode::OsError => "System error",
            ExitCode::OsFile => "Critical OS file missing",
            ExitCode::CantCreate => "Cannot create output file",
            ExitCode::IoError => "I/O error",
            ExitCode::TempFail => "Temporary failure, retry",
            ExitCode::Protocol => "Remote error in protocol",
            ExitCode::NoPerm => "Permission denied",
            ExitCode::Config => "Configuration error",
            ExitCode::Interrupted => "Interrupted by signal (SIGINT)",
            ExitCode::Terminated => "Terminated by signal (SIGTERM)",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn is_error(self) -> bool {
        !self.is_success()
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code.as_i32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_values_match_sysexits() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::Config.as_i32(), 78);
        assert_eq!(ExitCode::TempFail.as_i32(), 75);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
    }

    #[test]
    fn cooldown_active_always_maps_to_temp_fail() {
        let err = PipelineError::cooldown_active("circuit tripped until 2026-01-01T00:00:00Z");
        assert_eq!(ExitCode::from_pipeline_error(&err), ExitCode::TempFail);
    }

    #[test]
    fn validation_error_maps_to_data_error() {
        let err = PipelineError::validation("unsupported variable {foo}");
        assert_eq!(ExitCode::from_pipeline_error(&err), ExitCode::DataError);
    }

    #[test]
    fn llm_failure_maps_to_protocol() {
        let err = PipelineError::llm_failure("gemini returned 503 after retries");
        assert_eq!(ExitCode::from_pipeline_error(&err), ExitCode::Protocol);
    }

    #[test]
    fn generic_io_error_is_sniffed_from_message() {
        use std::io;
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        assert_eq!(ExitCode::from_error(&err), ExitCode::NoPerm);
    }

    #[test]
    fn display_includes_description_and_code() {
        let display = format!("{}", ExitCode::Config);
        assert!(display.contains("Configuration error"));
        assert!(display.contains("78"));
    }
}
