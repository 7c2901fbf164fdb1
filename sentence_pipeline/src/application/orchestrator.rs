// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Orchestrator (C8)
//!
//! Drives one end-to-end evaluation run: session-id generation, the error
//! circuit's entry gate, working-set selection, the variable gate, and the
//! fixed five-stage loop. Stage processors (C4) are built lazily from the
//! rule store and LLM client ports and cached by stage for the lifetime of
//! the orchestrator, per the "lazy processor loading" design note.
//!
//! The orchestrator does not own the scheduler. Mode switches reconfigure
//! this orchestrator's error circuit only; starting or stopping the
//! scheduler in lockstep is the composition root's responsibility, since the
//! scheduler and orchestrator are siblings, not one owning the other.

use parking_lot::Mutex;
use sentence_pipeline_domain::entities::{PerformanceRecord, ProcessingStats, Sentence, StageStats, Verdict};
use sentence_pipeline_domain::repositories::{ErrorLogRepository, PerformanceRecorder, RuleStore, SentenceRepository};
use sentence_pipeline_domain::services::{
    CircuitState, ErrorCircuit, ErrorCircuitConfig, KeywordFilterProcessor, LlmClient, LocaleSpellingProcessor,
    SkillAnalysisProcessor, StageProcessor, ToneAnalysisProcessor, TruthfulnessProcessor, VariableGate,
};
use sentence_pipeline_domain::value_objects::{
    ErrorCategory, ProcessingStage, SentenceId, SentenceTable, SessionId, StageStatus, ALL_STAGES,
};
use sentence_pipeline_domain::PipelineError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// The two operating modes named in §4.5 / §4.8. Testing disables the error
/// circuit's limit and runs immediately; production enforces the cooldown
/// and defers to the scheduler's cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    Testing,
    Production,
}

impl ProcessingMode {
    fn circuit_config(self) -> ErrorCircuitConfig {
        match self {
            ProcessingMode::Testing => ErrorCircuitConfig::testing(),
            ProcessingMode::Production => ErrorCircuitConfig::production(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub initial_mode: ProcessingMode,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { initial_mode: ProcessingMode::Production }
    }
}

/// Snapshot returned by `status_snapshot`, the read-only operation this
/// domain's `pipeline_processor.py` analogue calls `get_processing_status`.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub mode: ProcessingMode,
    pub session_in_flight: bool,
    pub circuit_state: CircuitState,
    pub circuit_reason: String,
    pub last_session: Option<ProcessingStats>,
    pub fully_approved_counts: HashMap<SentenceTable, usize>,
}

/// Marks a session in flight on construction and clears the flag on drop, so
/// every `process()` return path (success, early error, `?`) releases it.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Orchestrator {
    sentence_repo: Arc<dyn SentenceRepository>,
    rule_store: Arc<dyn RuleStore>,
    error_log: Arc<dyn ErrorLogRepository>,
    performance: Arc<dyn PerformanceRecorder>,
    llm: Arc<dyn LlmClient>,
    circuit: Arc<ErrorCircuit>,
    mode: Mutex<ProcessingMode>,
    processors: Mutex<HashMap<ProcessingStage, Arc<dyn StageProcessor>>>,
    last_session: Mutex<Option<ProcessingStats>>,
    in_flight: AtomicBool,
    gate: VariableGate,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        sentence_repo: Arc<dyn SentenceRepository>,
        rule_store: Arc<dyn RuleStore>,
        error_log: Arc<dyn ErrorLogRepository>,
        performance: Arc<dyn PerformanceRecorder>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        let circuit = Arc::new(ErrorCircuit::new(config.initial_mode.circuit_config()));
        Self {
            sentence_repo,
            rule_store,
            error_log,
            performance,
            llm,
            circuit,
            mode: Mutex::new(config.initial_mode),
            processors: Mutex::new(HashMap::new()),
            last_session: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            gate: VariableGate::new(),
        }
    }

    pub fn mode(&self) -> ProcessingMode {
        *self.mode.lock()
    }

    pub fn circuit(&self) -> &Arc<ErrorCircuit> {
        &self.circuit
    }

    /// Switches mode. A no-op if `new_mode` matches the current mode (§4.8).
    /// Resets and reconfigures the error circuit on an actual change. Does
    /// not touch any in-flight session; the new mode applies starting with
    /// the next `process()` call.
    pub fn switch_mode(&self, new_mode: ProcessingMode) -> bool {
        let mut mode = self.mode.lock();
        if *mode == new_mode {
            return false;
        }
        *mode = new_mode;
        self.circuit.reconfigure(new_mode.circuit_config());
        true
    }

    /// Runs one evaluation session over `table` (or both tables when
    /// `None`), optionally restricted to `ids`, optionally resuming from
    /// `restart_from`. See §4.8 for the full step sequence.
    pub async fn process(
        &self,
        table: Option<SentenceTable>,
        ids: Option<&[SentenceId]>,
        restart_from: Option<ProcessingStage>,
    ) -> Result<ProcessingStats, PipelineError> {
        let session_id = SessionId::generate();
        let _guard = InFlightGuard::enter(&self.in_flight);

        let (can_process, reason) = self.circuit.can_process();
        if !can_process {
            return Err(PipelineError::cooldown_active(reason));
        }

        let tables = match table {
            Some(t) => vec![t],
            None => vec![SentenceTable::Resume, SentenceTable::CoverLetter],
        };

        let mut working_set = Vec::new();
        for t in &tables {
            let selected = self.sentence_repo.select_for_processing(*t, ids, restart_from).await?;
            working_set.extend(selected);
        }

        if restart_from.is_none() {
            working_set = self.apply_variable_gate(working_set).await?;
        }

        if working_set.is_empty() {
            let mut stats = ProcessingStats::empty(session_id);
            stats.finish();
            *self.last_session.lock() = Some(stats.clone());
            return Ok(stats);
        }

        let stages: Vec<ProcessingStage> = match restart_from {
            Some(from) => ALL_STAGES.iter().skip(from.index()).copied().collect(),
            None => ALL_STAGES.to_vec(),
        };

        let mut stats = ProcessingStats::new(session_id.clone(), working_set.len());

        for stage in stages {
            let started_at = Instant::now();
            let stage_stats = self.run_stage(stage, &mut working_set, &session_id).await?;
            let mut recorded = stage_stats;
            recorded.duration = started_at.elapsed();
            stats.stage_stats.insert(stage, recorded);
            stats.processed_sentences += stats.stage_stats[&stage].processed;
            stats.error_count += stats.stage_stats[&stage].errored;

            if stage == ProcessingStage::KeywordFilter {
                let before = working_set.len();
                working_set.retain(|s| s.stage_status(ProcessingStage::KeywordFilter) != StageStatus::Rejected);
                stats.filtered_sentences += before - working_set.len();
            }

            if self.circuit.state() == CircuitState::Cooldown && *self.mode.lock() == ProcessingMode::Production {
                break;
            }
        }

        stats.approved_sentences = working_set.iter().filter(|s| s.is_fully_approved()).count();
        stats.finish();
        *self.last_session.lock() = Some(stats.clone());
        Ok(stats)
    }

    /// Scans every sentence for `{identifier}` occurrences outside
    /// `SUPPORTED_VARIABLES` and atomically rejects the offenders (§4.8 step
    /// 4). Returns the survivors, which continue into the stage loop.
    async fn apply_variable_gate(&self, sentences: Vec<Sentence>) -> Result<Vec<Sentence>, PipelineError> {
        let mut survivors = Vec::with_capacity(sentences.len());
        for sentence in sentences {
            let unsupported = self.gate.unsupported_variables(&sentence.content_text);
            if unsupported.is_empty() {
                survivors.push(sentence);
                continue;
            }
            let reason = self.gate.rejection_reason(&unsupported);
            self.sentence_repo.bulk_reject(sentence.table, &[sentence.id], &reason).await?;
        }
        Ok(survivors)
    }

    /// Runs a single stage over the sentences currently eligible for it,
    /// applies the resulting verdicts to the store, and mutates `working_set`
    /// in place so the next stage's filter sees up-to-date statuses — the
    /// "load-bearing invariant" of §4.8 step 6.
    async fn run_stage(
        &self,
        stage: ProcessingStage,
        working_set: &mut [Sentence],
        session_id: &SessionId,
    ) -> Result<StageStats, PipelineError> {
        let mut stage_stats = StageStats::default();

        let eligible_ids: Vec<SentenceId> =
            working_set.iter().filter(|s| s.is_selectable_for(stage)).map(|s| s.id).collect();
        if eligible_ids.is_empty() {
            return Ok(stage_stats);
        }

        let processor = self.get_processor(stage).await?;
        let batch_size = stage.batch_size();

        let mut all_verdicts: Vec<Verdict> = Vec::with_capacity(eligible_ids.len());
        for chunk_ids in eligible_ids.chunks(batch_size) {
            let chunk: Vec<Sentence> = working_set
                .iter()
                .filter(|s| chunk_ids.contains(&s.id))
                .cloned()
                .collect();

            let call_started = Instant::now();
            let verdicts = processor.process_batch(&chunk, session_id).await;
            let elapsed_ms = call_started.elapsed().as_millis() as u64;

            let apply_result = self.sentence_repo.apply_verdicts(stage, &verdicts).await;
            self.record_performance(stage, &chunk, elapsed_ms, apply_result.is_ok(), session_id).await;

            match apply_result {
                Ok(()) => {
                    self.circuit.record_success();
                    all_verdicts.extend(verdicts);
                }
                Err(err) => {
                    let category = ErrorCategory::classify(err.category(), &err.to_string());
                    let record = self.circuit.record_error(
                        Some(session_id.clone()),
                        Some(stage.column_prefix().to_string()),
                        category,
                        err.to_string(),
                    );
                    let _ = self.error_log.record(&record).await;

                    if self.circuit.state() == CircuitState::Cooldown && *self.mode.lock() == ProcessingMode::Production {
                        break;
                    }
                    continue;
                }
            }
        }

        for verdict in &all_verdicts {
            if let Some(sentence) = working_set.iter_mut().find(|s| s.id == verdict.id) {
                sentence.record_stage_result(
                    verdict.stage,
                    verdict.status,
                    verdict.reason.clone(),
                    verdict.model.clone(),
                    verdict.payload.clone(),
                );
            }
            stage_stats.processed += 1;
            match verdict.status {
                StageStatus::Approved => stage_stats.approved += 1,
                StageStatus::Rejected => stage_stats.rejected += 1,
                StageStatus::Error => stage_stats.errored += 1,
                _ => {}
            }
        }

        Ok(stage_stats)
    }

    async fn record_performance(
        &self,
        stage: ProcessingStage,
        batch: &[Sentence],
        response_time_ms: u64,
        success: bool,
        session_id: &SessionId,
    ) {
        let call_type = if stage.is_llm_backed() { "llm_batch" } else { "local_batch" };
        let record = PerformanceRecord::new(stage.column_prefix(), call_type, success)
            .with_response_time(response_time_ms)
            .with_batch(batch.len(), batch.len())
            .with_session(session_id.clone());
        self.performance.record(record).await;
    }

    /// Builds (once) and caches the processor for `stage`, pulling whatever
    /// rule-store data that processor's constructor needs. A subsequent
    /// `rule_store.refresh()` is only reflected once the cache is cleared,
    /// e.g. by a future mode switch that calls `clear_processor_cache`.
    async fn get_processor(&self, stage: ProcessingStage) -> Result<Arc<dyn StageProcessor>, PipelineError> {
        if let Some(processor) = self.processors.lock().get(&stage).cloned() {
            return Ok(processor);
        }

        let processor: Arc<dyn StageProcessor> = match stage {
            ProcessingStage::KeywordFilter => {
                let keywords = self.rule_store.active_keywords().await?;
                Arc::new(KeywordFilterProcessor::new(keywords))
            }
            ProcessingStage::Truthfulness => {
                let truths = self.rule_store.atomic_truths().await?;
                Arc::new(TruthfulnessProcessor::new(self.llm.clone(), truths))
            }
            ProcessingStage::CanadianSpelling => {
                let pairs = self.rule_store.spelling_pairs().await?;
                Arc::new(LocaleSpellingProcessor::new(pairs))
            }
            ProcessingStage::ToneAnalysis => Arc::new(ToneAnalysisProcessor::new(self.llm.clone())),
            ProcessingStage::SkillAnalysis => Arc::new(SkillAnalysisProcessor::new(self.llm.clone())),
        };

        self.processors.lock().insert(stage, processor.clone());
        Ok(processor)
    }

    /// Drops every cached processor so the next `get_processor` call rebuilds
    /// from a fresh rule-store read. Called after `rule_store.refresh()`
    /// when the caller wants the new corpus to take effect immediately
    /// rather than waiting for the next natural cache miss.
    pub fn clear_processor_cache(&self) {
        self.processors.lock().clear();
    }

    pub async fn status_snapshot(&self) -> Result<StatusSnapshot, PipelineError> {
        let (_, circuit_reason) = self.circuit.can_process();
        let mut fully_approved_counts = HashMap::new();
        for table in [SentenceTable::Resume, SentenceTable::CoverLetter] {
            fully_approved_counts.insert(table, self.sentence_repo.count_fully_approved(table).await?);
        }

        Ok(StatusSnapshot {
            mode: *self.mode.lock(),
            session_in_flight: self.in_flight.load(Ordering::SeqCst),
            circuit_state: self.circuit.state(),
            circuit_reason,
            last_session: self.last_session.lock().clone(),
            fully_approved_counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sentence_pipeline_domain::entities::{ErrorRecord, Sentence};
    use sentence_pipeline_domain::repositories::rule_store::SpellingPair;
    use sentence_pipeline_domain::services::{LlmRequestOptions};
    use sentence_pipeline_domain::value_objects::StageStatus;
    use serde_json::Value;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeStore {
        sentences: StdMutex<Vec<Sentence>>,
    }

    #[async_trait]
    impl SentenceRepository for FakeStore {
        async fn select_for_processing(
            &self,
            table: SentenceTable,
            _ids: Option<&[SentenceId]>,
            restart_from: Option<ProcessingStage>,
        ) -> Result<Vec<Sentence>, PipelineError> {
            Ok(self
                .sentences
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.table == table)
                .filter(|s| match restart_from {
                    Some(from) => s.is_selectable_for(from),
                    None => true,
                })
                .cloned()
                .collect())
        }

        async fn apply_verdicts(&self, stage: ProcessingStage, verdicts: &[Verdict]) -> Result<(), PipelineError> {
            let mut sentences = self.sentences.lock().unwrap();
            for verdict in verdicts {
                if let Some(sentence) = sentences.iter_mut().find(|s| s.id == verdict.id) {
                    sentence.record_stage_result(stage, verdict.status, verdict.reason.clone(), verdict.model.clone(), verdict.payload.clone());
                }
            }
            Ok(())
        }

        async fn bulk_reject(&self, table: SentenceTable, ids: &[SentenceId], reason: &str) -> Result<(), PipelineError> {
            let mut sentences = self.sentences.lock().unwrap();
            for sentence in sentences.iter_mut().filter(|s| s.table == table && ids.contains(&s.id)) {
                sentence.reject_all_stages(reason);
            }
            Ok(())
        }

        async fn insert(&self, sentence: &Sentence) -> Result<(), PipelineError> {
            self.sentences.lock().unwrap().push(sentence.clone());
            Ok(())
        }

        async fn find_by_id(&self, table: SentenceTable, id: SentenceId) -> Result<Option<Sentence>, PipelineError> {
            Ok(self.sentences.lock().unwrap().iter().find(|s| s.table == table && s.id == id).cloned())
        }

        async fn count_fully_approved(&self, table: SentenceTable) -> Result<usize, PipelineError> {
            Ok(self.sentences.lock().unwrap().iter().filter(|s| s.table == table && s.is_fully_approved()).count())
        }
    }

    struct FakeRules;

    #[async_trait]
    impl RuleStore for FakeRules {
        async fn active_keywords(&self) -> Result<Vec<String>, PipelineError> {
            Ok(vec!["excited".to_string()])
        }
        async fn spelling_pairs(&self) -> Result<Vec<SpellingPair>, PipelineError> {
            Ok(vec![])
        }
        async fn atomic_truths(&self) -> Result<Vec<String>, PipelineError> {
            Ok(vec![])
        }
        async fn refresh(&self) -> Result<(), PipelineError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeErrorLog {
        records: StdMutex<Vec<ErrorRecord>>,
    }

    #[async_trait]
    impl ErrorLogRepository for FakeErrorLog {
        async fn record(&self, error: &ErrorRecord) -> Result<(), PipelineError> {
            self.records.lock().unwrap().push(error.clone());
            Ok(())
        }
        async fn recent(&self, limit: usize) -> Result<Vec<ErrorRecord>, PipelineError> {
            Ok(self.records.lock().unwrap().iter().rev().take(limit).cloned().collect())
        }
    }

    struct FakeRecorder;

    #[async_trait]
    impl PerformanceRecorder for FakeRecorder {
        async fn record(&self, _metrics: sentence_pipeline_domain::entities::PerformanceRecord) {}
    }

    struct StubLlm;

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn request(&self, prompt: &str, _options: &LlmRequestOptions) -> Result<Value, PipelineError> {
            let ids: Vec<&str> = prompt.split("[id=").skip(1).filter_map(|c| c.split(']').next()).collect();
            let truthfulness: Vec<Value> = ids.iter().map(|id| serde_json::json!({"sentence_id": id, "truthfulness_score": 0.9})).collect();
            let tone: Vec<Value> = ids.iter().map(|id| serde_json::json!({"sentence_id": id, "primary_tone": "Confident", "confidence_score": 0.8})).collect();
            let skill: Vec<Value> = ids.iter().map(|id| serde_json::json!({"sentence_id": id, "primary_skill": "Leadership"})).collect();
            Ok(serde_json::json!({
                "evaluation_results": truthfulness,
                "tone_analysis_results": tone,
                "skill_analysis_results": skill,
            }))
        }
    }

    fn test_orchestrator(store: Arc<FakeStore>) -> Orchestrator {
        Orchestrator::new(
            OrchestratorConfig { initial_mode: ProcessingMode::Testing },
            store,
            Arc::new(FakeRules),
            Arc::new(FakeErrorLog::default()),
            Arc::new(FakeRecorder),
            Arc::new(StubLlm),
        )
    }

    #[tokio::test]
    async fn unsupported_variable_is_rejected_across_all_stages() {
        let store = Arc::new(FakeStore::default());
        let sentence = Sentence::new(SentenceTable::Resume, "I have {years_experience} years.");
        let id = sentence.id;
        store.sentences.lock().unwrap().push(sentence);

        let orchestrator = test_orchestrator(store.clone());
        orchestrator.process(Some(SentenceTable::Resume), None, None).await.unwrap();

        let stored = store.find_by_id(SentenceTable::Resume, id).await.unwrap().unwrap();
        for stage in ALL_STAGES {
            assert_eq!(stored.stage_status(stage), StageStatus::Rejected);
        }
    }

    #[tokio::test]
    async fn empty_working_set_is_a_zero_count_noop() {
        let store = Arc::new(FakeStore::default());
        let orchestrator = test_orchestrator(store);
        let stats = orchestrator.process(Some(SentenceTable::Resume), None, None).await.unwrap();
        assert_eq!(stats.total_sentences, 0);
        assert_eq!(stats.processed_sentences, 0);
    }

    #[tokio::test]
    async fn full_run_approves_a_well_formed_sentence() {
        let store = Arc::new(FakeStore::default());
        let sentence = Sentence::new(SentenceTable::Resume, "I am excited to lead at {company_name}.");
        let id = sentence.id;
        store.sentences.lock().unwrap().push(sentence);

        let orchestrator = test_orchestrator(store.clone());
        let stats = orchestrator.process(Some(SentenceTable::Resume), None, None).await.unwrap();
        assert_eq!(stats.approved_sentences, 1);

        let stored = store.find_by_id(SentenceTable::Resume, id).await.unwrap().unwrap();
        assert!(stored.is_fully_approved());
    }

    #[test]
    fn switch_mode_is_a_noop_when_unchanged() {
        let store = Arc::new(FakeStore::default());
        let orchestrator = test_orchestrator(store);
        assert!(!orchestrator.switch_mode(ProcessingMode::Testing));
        assert!(orchestrator.switch_mode(ProcessingMode::Production));
        assert_eq!(orchestrator.mode(), ProcessingMode::Production);
    }
}
