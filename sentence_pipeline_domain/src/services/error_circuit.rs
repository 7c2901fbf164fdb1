// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Error Circuit (C5)
//!
//! A consecutive-error counter with a cooldown clock. The scheduler and
//! the stage loop hold a shared reference to one `ErrorCircuit` owned by
//! the orchestrator rather than a global singleton (§9).
//!
//! State machine:
//! - `Ok` while `consecutive_errors < limit`.
//! - `Cooldown` once an error record pushes the counter to `limit`; lasts
//!   `cooldown_duration` from the moment it was entered.
//! - A successful batch resets the counter to zero and transitions back to
//!   `Ok` only once `cooldown_until` has elapsed, or on an explicit reset
//!   (e.g. a mode switch) (§4.5).

use crate::entities::ErrorRecord;
use crate::value_objects::{ErrorCategory, SessionId};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;

/// Effectively unbounded: testing mode disables the limit rather than
/// raising it to a literal `usize::MAX`, which would make overflow checks
/// awkward elsewhere.
const TESTING_MODE_LIMIT: u32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Ok,
    Cooldown,
}

/// Tunable limits. Defaults match the reference system's defaults of 15
/// consecutive errors and a 23-hour cooldown.
#[derive(Debug, Clone, Copy)]
pub struct ErrorCircuitConfig {
    pub max_consecutive_errors: u32,
    pub cooldown: ChronoDuration,
}

impl ErrorCircuitConfig {
    pub fn production() -> Self {
        Self { max_consecutive_errors: 15, cooldown: ChronoDuration::hours(23) }
    }

    pub fn testing() -> Self {
        Self { max_consecutive_errors: TESTING_MODE_LIMIT, cooldown: ChronoDuration::zero() }
    }
}

#[derive(Debug, Default)]
struct CircuitInner {
    consecutive_errors: u32,
    cooldown_until: Option<DateTime<Utc>>,
}

/// Thread-safe error circuit. Cheap to clone behind an `Arc` since all
/// mutable state lives behind a `parking_lot::Mutex`.
pub struct ErrorCircuit {
    config: Mutex<ErrorCircuitConfig>,
    inner: Mutex<CircuitInner>,
}

impl ErrorCircuit {
    pub fn new(config: ErrorCircuitConfig) -> Self {
        Self { config: Mutex::new(config), inner: Mutex::new(CircuitInner::default()) }
    }

    /// Reconfigures the circuit's limits and resets its counters, mirroring
    /// the orchestrator's `switch_mode` (§4.8) and any explicit recovery
    /// action.
    pub fn reconfigure(&self, config: ErrorCircuitConfig) {
        *self.config.lock() = config;
        self.reset();
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_errors = 0;
        inner.cooldown_until = None;
    }

    /// Records one classified error. Returns the resulting `ErrorRecord`
    /// (the caller is responsible for persisting it via an
    /// `ErrorLogRepository`, since that is an infrastructure concern).
    /// Severity only affects the returned record's `severity` field, never
    /// circuit state (§4.5).
    pub fn record_error(
        &self,
        session_id: Option<SessionId>,
        stage_name: Option<String>,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> ErrorRecord {
        let mut inner = self.inner.lock();
        inner.consecutive_errors += 1;

        let config = *self.config.lock();
        if inner.consecutive_errors >= config.max_consecutive_errors && inner.cooldown_until.is_none() {
            inner.cooldown_until = Some(Utc::now() + config.cooldown);
        }

        ErrorRecord::new(session_id, stage_name, category, message)
    }

    /// Resets the consecutive-error counter on a successful batch. Per
    /// §4.5, this does not itself clear an already-entered cooldown; the
    /// cooldown only lifts once `cooldown_until` elapses or an explicit
    /// reset occurs.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_errors = 0;
        if let Some(until) = inner.cooldown_until {
            if Utc::now() >= until {
                inner.cooldown_until = None;
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        let mut inner = self.inner.lock();
        if let Some(until) = inner.cooldown_until {
            if Utc::now() >= until {
                inner.cooldown_until = None;
                return CircuitState::Ok;
            }
            return CircuitState::Cooldown;
        }
        CircuitState::Ok
    }

    /// `(can_process, reason)`, the orchestrator's session-entry gate
    /// (§4.8 step 2).
    pub fn can_process(&self) -> (bool, String) {
        match self.state() {
            CircuitState::Ok => (true, "Ready for processing".to_string()),
            CircuitState::Cooldown => {
                let remaining = self.time_until_cooldown_end();
                (false, format!("In cooldown for {} more seconds", remaining.num_seconds().max(0)))
            }
        }
    }

    pub fn time_until_cooldown_end(&self) -> ChronoDuration {
        let inner = self.inner.lock();
        match inner.cooldown_until {
            Some(until) => (until - Utc::now()).max(ChronoDuration::zero()),
            None => ChronoDuration::zero(),
        }
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.inner.lock().consecutive_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_to_cooldown_after_limit_consecutive_errors() {
        let circuit = ErrorCircuit::new(ErrorCircuitConfig { max_consecutive_errors: 3, cooldown: ChronoDuration::hours(1) });
        for _ in 0..3 {
            circuit.record_error(None, None, ErrorCategory::Api, "boom");
        }
        let (can_process, reason) = circuit.can_process();
        assert!(!can_process);
        assert!(reason.to_lowercase().contains("cooldown"));
    }

    #[test]
    fn explicit_reset_clears_cooldown() {
        let circuit = ErrorCircuit::new(ErrorCircuitConfig { max_consecutive_errors: 1, cooldown: ChronoDuration::hours(1) });
        circuit.record_error(None, None, ErrorCategory::Api, "boom");
        assert!(!circuit.can_process().0);
        circuit.reset();
        let (can_process, reason) = circuit.can_process();
        assert!(can_process);
        assert_eq!(reason, "Ready for processing");
    }

    #[test]
    fn testing_mode_never_trips() {
        let circuit = ErrorCircuit::new(ErrorCircuitConfig::testing());
        for _ in 0..10_000 {
            circuit.record_error(None, None, ErrorCategory::Processing, "minor");
        }
        assert!(circuit.can_process().0);
    }

    #[test]
    fn successful_batch_resets_consecutive_counter() {
        let circuit = ErrorCircuit::new(ErrorCircuitConfig { max_consecutive_errors: 5, cooldown: ChronoDuration::hours(1) });
        circuit.record_error(None, None, ErrorCategory::Api, "boom");
        circuit.record_error(None, None, ErrorCategory::Api, "boom");
        assert_eq!(circuit.consecutive_errors(), 2);
        circuit.record_success();
        assert_eq!(circuit.consecutive_errors(), 0);
    }
}
