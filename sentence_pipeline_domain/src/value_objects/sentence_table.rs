// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The two parallel sentence stores: resumes and cover letters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two parallel sentence tables a sentence belongs to. Both
/// tables share an identical schema; the distinction only affects which
/// optional grouping column (`body_section` vs. `position_label`) is
/// meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceTable {
    Resume,
    CoverLetter,
}

impl SentenceTable {
    /// The backing table name, matching §6's persisted-state layout.
    pub fn table_name(&self) -> &'static str {
        match self {
            SentenceTable::Resume => "sentence_bank_resume",
            SentenceTable::CoverLetter => "sentence_bank_cover_letter",
        }
    }
}

impl fmt::Display for SentenceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentenceTable::Resume => write!(f, "resume"),
            SentenceTable::CoverLetter => write!(f, "cover_letter"),
        }
    }
}
