// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Variable Gate
//!
//! Scans `content_text` for `{identifier}` occurrences before a fresh run
//! ever reaches a stage processor. The downstream document-generation
//! consumer only understands `{job_title}` and `{company_name}` (§6); any
//! other identifier would be substituted into nothing and shipped to a
//! candidate verbatim, so the gate bulk-rejects those sentences atomically
//! across all five stages (§3 invariant 5, §4.8 step 4).
//!
//! Per the design notes, the gate only ever runs on fresh runs — a restart
//! trusts the verdicts (including the gate's) already recorded for earlier
//! stages.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// The exact supported identifier set. Anything else in a `{...}` template
/// slot is unsupported.
pub const SUPPORTED_VARIABLES: &[&str] = &["job_title", "company_name"];

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("variable gate pattern is valid"));

/// Stateless scanner; it has no configuration beyond the fixed supported
/// set, so it is a zero-sized type.
#[derive(Debug, Default, Clone, Copy)]
pub struct VariableGate;

impl VariableGate {
    pub fn new() -> Self {
        Self
    }

    /// Returns the unsupported identifiers found in `content_text`, in
    /// first-seen order with duplicates removed. An empty result means the
    /// sentence passes the gate.
    pub fn unsupported_variables(&self, content_text: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut unsupported = Vec::new();
        for captures in VARIABLE_PATTERN.captures_iter(content_text) {
            let name = &captures[1];
            if SUPPORTED_VARIABLES.contains(&name) {
                continue;
            }
            if seen.insert(name.to_string()) {
                unsupported.push(name.to_string());
            }
        }
        unsupported
    }

    /// Builds the rejection reason text the store records when bulk
    /// rejecting, e.g. `"Unsupported variables: years_experience"`.
    pub fn rejection_reason(&self, unsupported: &[String]) -> String {
        format!("Unsupported variables: {}", unsupported.join(", "))
    }

    pub fn passes(&self, content_text: &str) -> bool {
        self.unsupported_variables(content_text).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_variables_pass() {
        let gate = VariableGate::new();
        assert!(gate.passes("I'm applying to {company_name} for the {job_title} role."));
    }

    #[test]
    fn unsupported_variable_is_flagged() {
        let gate = VariableGate::new();
        let unsupported = gate.unsupported_variables("I have {years_experience} years.");
        assert_eq!(unsupported, vec!["years_experience".to_string()]);
    }

    #[test]
    fn rejection_reason_mentions_the_identifier() {
        let gate = VariableGate::new();
        let reason = gate.rejection_reason(&["years_experience".to_string()]);
        assert_eq!(reason, "Unsupported variables: years_experience");
    }

    #[test]
    fn mixed_supported_and_unsupported_only_flags_unsupported() {
        let gate = VariableGate::new();
        let unsupported = gate.unsupported_variables("At {company_name}, I bring {skill_count} skills.");
        assert_eq!(unsupported, vec!["skill_count".to_string()]);
    }
}
