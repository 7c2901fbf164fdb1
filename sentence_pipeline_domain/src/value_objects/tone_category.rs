// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The fixed nine-label tone taxonomy used by the tone-analysis stage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the nine normative tone labels. Names are fixed by the
/// specification; invalid model output never produces a tenth label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToneCategory {
    Confident,
    Warm,
    Analytical,
    Insightful,
    Storytelling,
    Curious,
    Bold,
    Rebellious,
    Quirky,
}

/// The complete set, in the order presented to the LLM prompt.
pub const ALL_TONE_CATEGORIES: [ToneCategory; 9] = [
    ToneCategory::Confident,
    ToneCategory::Warm,
    ToneCategory::Analytical,
    ToneCategory::Insightful,
    ToneCategory::Storytelling,
    ToneCategory::Curious,
    ToneCategory::Bold,
    ToneCategory::Rebellious,
    ToneCategory::Quirky,
];

impl ToneCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ToneCategory::Confident => "Confident",
            ToneCategory::Warm => "Warm",
            ToneCategory::Analytical => "Analytical",
            ToneCategory::Insightful => "Insightful",
            ToneCategory::Storytelling => "Storytelling",
            ToneCategory::Curious => "Curious",
            ToneCategory::Bold => "Bold",
            ToneCategory::Rebellious => "Rebellious",
            ToneCategory::Quirky => "Quirky",
        }
    }

    /// One-sentence definition surfaced in the tone-analysis prompt.
    pub fn description(&self) -> &'static str {
        match self {
            ToneCategory::Confident => "Assured, direct language that conveys competence without arrogance.",
            ToneCategory::Warm => "Personable, approachable language that conveys genuine care.",
            ToneCategory::Analytical => "Precise, logical language that emphasizes data and reasoning.",
            ToneCategory::Insightful => "Language that demonstrates deep understanding and perspective.",
            ToneCategory::Storytelling => "Narrative language that frames experience as a journey.",
            ToneCategory::Curious => "Inquisitive language that conveys a desire to learn and explore.",
            ToneCategory::Bold => "Assertive, attention-grabbing language that takes a clear stance.",
            ToneCategory::Rebellious => "Language that challenges convention or the status quo.",
            ToneCategory::Quirky => "Playful, distinctive language with an unconventional flair.",
        }
    }

    /// The default label used when an LLM response names a primary tone
    /// outside the nine, per §4.4.4.
    pub fn fallback() -> ToneCategory {
        ToneCategory::Analytical
    }

    pub fn all() -> &'static [ToneCategory; 9] {
        &ALL_TONE_CATEGORIES
    }
}

impl fmt::Display for ToneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ToneCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_TONE_CATEGORIES.iter().find(|c| c.name().eq_ignore_ascii_case(s)).copied().ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_nine_categories() {
        assert_eq!(ALL_TONE_CATEGORIES.len(), 9);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("confident".parse::<ToneCategory>(), Ok(ToneCategory::Confident));
        assert_eq!("Quirky".parse::<ToneCategory>(), Ok(ToneCategory::Quirky));
        assert!("Mysterious".parse::<ToneCategory>().is_err());
    }
}
