// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Process-wide `tracing` initialization (§4.9). Called once from the
//! composition root before any orchestrator session runs.

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global `tracing` subscriber. `default_level` governs
/// output when `RUST_LOG` is unset; JSON formatting is used unconditionally
/// so log aggregators never have to guess at the line format.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt().with_env_filter(filter).json().with_target(true).with_current_span(true).init();
}
