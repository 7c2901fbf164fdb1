// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Integration tests for `Scheduler` wired to a real `Orchestrator` running
//! over in-memory fakes — the scheduled-task path the composition root uses
//! in production, exercised end to end instead of against a bare closure.

use async_trait::async_trait;
use chrono::Weekday;
use sentence_pipeline::application::{
    Orchestrator, OrchestratorConfig, ProcessingMode, ScheduleKind, Scheduler, ScheduledTask,
};
use sentence_pipeline_domain::entities::{ErrorRecord, PerformanceRecord, Sentence, Verdict};
use sentence_pipeline_domain::repositories::rule_store::SpellingPair;
use sentence_pipeline_domain::repositories::{ErrorLogRepository, PerformanceRecorder, RuleStore, SentenceRepository};
use sentence_pipeline_domain::services::{LlmClient, LlmRequestOptions};
use sentence_pipeline_domain::value_objects::{ProcessingStage, SentenceId, SentenceTable};
use sentence_pipeline_domain::PipelineError;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeStore {
    sentences: Mutex<Vec<Sentence>>,
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
    records: Mutex<Vec<ErrorRecord>>,
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

#[derive(Default)]
struct FakeRecorder;

#[async_trait]
impl PerformanceRecorder for FakeRecorder {
    async fn record(&self, _metrics: PerformanceRecord) {}
}

struct ApprovingLlm;

#[async_trait]
impl LlmClient for ApprovingLlm {
    async fn request(&self, prompt: &str, _options: &LlmRequestOptions) -> Result<Value, PipelineError> {
        let ids: Vec<&str> = prompt.split("[id=").skip(1).filter_map(|c| c.split(']').next()).collect();
        let evaluation: Vec<Value> = ids.iter().map(|id| json!({"sentence_id": id, "truthfulness_score": 0.95, "issues_detected": []})).collect();
        let tone: Vec<Value> = ids.iter().map(|id| json!({"sentence_id": id, "primary_tone": "Confident", "confidence_score": 0.9})).collect();
        let skill: Vec<Value> = ids.iter().map(|id| json!({"sentence_id": id, "primary_skill": "Leadership"})).collect();
        Ok(json!({
            "evaluation_results": evaluation,
            "tone_analysis_results": tone,
            "skill_analysis_results": skill,
        }))
    }
}

fn test_orchestrator(store: Arc<FakeStore>) -> Arc<Orchestrator> {
    Arc::new(Orchestrator::new(
        OrchestratorConfig { initial_mode: ProcessingMode::Testing },
        store,
        Arc::new(FakeRules),
        Arc::new(FakeErrorLog::default()),
        Arc::new(FakeRecorder::default()),
        Arc::new(ApprovingLlm),
    ))
}

#[tokio::test]
async fn force_run_drives_a_real_orchestrator_session() {
    let store = Arc::new(FakeStore::default());
    let sentence = Sentence::new(SentenceTable::Resume, "I am excited to apply at {company_name}.");
    let id = sentence.id;
    store.sentences.lock().unwrap().push(sentence);

    let orchestrator = test_orchestrator(store.clone());
    let scheduler = Scheduler::new();

    let task_orchestrator = orchestrator.clone();
    scheduler.register(ScheduledTask {
        id: "process-pending".to_string(),
        schedule: ScheduleKind::Daily { hour: 2, minute: 0 },
        run: Arc::new(move || {
            let orchestrator = task_orchestrator.clone();
            Box::pin(async move {
                orchestrator.process(Some(SentenceTable::Resume), None, None).await?;
                Ok(())
            })
        }),
        max_retries: 3,
    });

    assert!(scheduler.force_run_task("process-pending").await);

    let status = scheduler.task_status("process-pending").unwrap();
    assert_eq!(status.run_count, 1);
    assert_eq!(status.error_count, 0);

    let stored = store.find_by_id(SentenceTable::Resume, id).await.unwrap().unwrap();
    assert!(stored.is_fully_approved());
}

#[tokio::test]
async fn a_failing_session_is_recorded_and_retried_via_the_scheduled_task() {
    let store = Arc::new(FakeStore::default());
    // No sentences means `process()` still succeeds (empty working set is a
    // no-op), so instead make the task itself report failure directly —
    // exercising the scheduler's retry bookkeeping independent of the
    // orchestrator's own error paths, which are covered in
    // `orchestrator_test.rs`.
    let orchestrator = test_orchestrator(store);
    let scheduler = Scheduler::new();

    scheduler.register(ScheduledTask {
        id: "process-pending".to_string(),
        schedule: ScheduleKind::Weekly { weekday: Weekday::Mon, hour: 2, minute: 0 },
        run: Arc::new(move || {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                orchestrator.process(Some(SentenceTable::Resume), None, None).await?;
                Err(PipelineError::processing_error("downstream document generation unavailable"))
            })
        }),
        max_retries: 1,
    });

    scheduler.force_run_task("process-pending").await;
    let after_first = scheduler.task_status("process-pending").unwrap();
    assert_eq!(after_first.error_count, 1);
    assert!(after_first.last_error.as_deref().unwrap().contains("document generation"));

    scheduler.force_run_task("process-pending").await;
    let after_second = scheduler.task_status("process-pending").unwrap();
    assert_eq!(after_second.error_count, 2);
}

#[tokio::test]
async fn disabling_a_task_is_reflected_in_scheduler_status() {
    let store = Arc::new(FakeStore::default());
    let orchestrator = test_orchestrator(store);
    let scheduler = Scheduler::new();

    scheduler.register(ScheduledTask {
        id: "process-pending".to_string(),
        schedule: ScheduleKind::Daily { hour: 2, minute: 0 },
        run: Arc::new(move || {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                orchestrator.process(None, None, None).await?;
                Ok(())
            })
        }),
        max_retries: 0,
    });

    assert_eq!(scheduler.status().enabled_count, 1);
    assert!(scheduler.set_enabled("process-pending", false));
    assert_eq!(scheduler.status().enabled_count, 0);
    assert!(!scheduler.set_enabled("no-such-task", false));
}

#[tokio::test]
async fn start_and_stop_toggle_the_background_loop() {
    let scheduler = Arc::new(Scheduler::new());
    assert!(!scheduler.is_running());
    scheduler.start();
    assert!(scheduler.is_running());
    // Starting again while already running is a no-op (no double-spawn).
    scheduler.start();
    assert!(scheduler.is_running());
    scheduler.stop();
    assert!(!scheduler.is_running());
}
