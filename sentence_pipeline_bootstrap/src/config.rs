// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Configuration
//!
//! Process-level settings resolved before any domain logic runs: log level,
//! an optional config-file path handed to
//! `sentence_pipeline::infrastructure::config::PipelineConfig`, an optional
//! processing-mode override, and whether the scheduler should start
//! automatically. Immutable once built, via the same builder pattern the
//! teacher's `AppConfig` uses.

use std::path::PathBuf;

/// Bootstrap-phase log level, independent of the `RUST_LOG` env filter the
/// infrastructure layer also honors — this one governs the default when
/// no filter is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Processing-mode override from the CLI or config file; `None` leaves the
/// application crate's own default (production) in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeOverride {
    Testing,
    Production,
}

/// Immutable bootstrap configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    log_level: LogLevel,
    config_path: Option<PathBuf>,
    mode_override: Option<ModeOverride>,
    scheduler_enabled: bool,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub fn mode_override(&self) -> Option<ModeOverride> {
        self.mode_override
    }

    pub fn scheduler_enabled(&self) -> bool {
        self.scheduler_enabled
    }
}

/// Builder for [`AppConfig`].
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    log_level: Option<LogLevel>,
    config_path: Option<PathBuf>,
    mode_override: Option<ModeOverride>,
    scheduler_enabled: Option<bool>,
}

impl AppConfigBuilder {
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn mode_override(mut self, mode: ModeOverride) -> Self {
        self.mode_override = Some(mode);
        self
    }

    pub fn scheduler_enabled(mut self, enabled: bool) -> Self {
        self.scheduler_enabled = Some(enabled);
        self
    }

    pub fn build(self) -> AppConfig {
        AppConfig {
            log_level: self.log_level.unwrap_or_default(),
            config_path: self.config_path,
            mode_override: self.mode_override,
            scheduler_enabled: self.scheduler_enabled.unwrap_or(true),
        }
    }
}
