// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Entry Point / Composition Root
//!
//! Wires the bootstrap layer's CLI and configuration onto the domain crate's
//! ports and the infrastructure crate's concrete adapters, builds an
//! [`application::Orchestrator`] and [`application::Scheduler`], and
//! dispatches the parsed command: parse CLI, init logging, open the
//! database, build services, match on the command.

use sentence_pipeline::application::{
    Orchestrator, OrchestratorConfig, ProcessingMode, ScheduleKind, Scheduler, ScheduledTask,
};
use sentence_pipeline::infrastructure::repositories::schema::initialize_database;
use sentence_pipeline::infrastructure::{
    GeminiClient, PipelineConfig, PostgresErrorLogRepository, PostgresPerformanceRecorder, PostgresRuleStore,
    PostgresSentenceRepository,
};
use sentence_pipeline::infrastructure::logging;
use sentence_pipeline::presentation;
use sentence_pipeline_bootstrap::config::{AppConfig, ModeOverride};
use sentence_pipeline_bootstrap::shutdown::ShutdownCoordinator;
use sentence_pipeline_bootstrap::signals::create_signal_handler;
use sentence_pipeline_bootstrap::{bootstrap_cli, Commands, ExitCode, SchedulerAction, StageArg, TableArg};
use sentence_pipeline_domain::value_objects::{ProcessingStage, SentenceId, SentenceTable};
use sentence_pipeline_domain::PipelineError;
use std::sync::Arc;
use std::time::Duration;

const TASK_ID: &str = "process-pending";

fn table_from_arg(arg: TableArg) -> SentenceTable {
    match arg {
        TableArg::Resume => SentenceTable::Resume,
        TableArg::CoverLetter => SentenceTable::CoverLetter,
    }
}

fn stage_from_arg(arg: StageArg) -> ProcessingStage {
    match arg {
        StageArg::KeywordFilter => ProcessingStage::KeywordFilter,
        StageArg::Truthfulness => ProcessingStage::Truthfulness,
        StageArg::CanadianSpelling => ProcessingStage::CanadianSpelling,
        StageArg::ToneAnalysis => ProcessingStage::ToneAnalysis,
        StageArg::SkillAnalysis => ProcessingStage::SkillAnalysis,
    }
}

fn parse_ids(ids: &[String]) -> Vec<SentenceId> {
    ids.iter()
        .filter_map(|raw| uuid::Uuid::parse_str(raw).ok())
        .map(SentenceId::from_uuid)
        .collect()
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let validated = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("CLI error: {err}");
            return std::process::ExitCode::from(ExitCode::from_error(&err).as_i32() as u8);
        }
    };

    let app_config = AppConfig::builder()
        .log_level(if validated.verbose {
            sentence_pipeline_bootstrap::config::LogLevel::Debug
        } else {
            sentence_pipeline_bootstrap::config::LogLevel::Info
        })
        .build();

    logging::init(app_config.log_level().as_str());

    match run(validated).await {
        Ok(()) => std::process::ExitCode::from(ExitCode::Success.as_i32() as u8),
        Err(err) => {
            tracing::error!(error = %err, "sentence pipeline exited with an error");
            std::process::ExitCode::from(ExitCode::from_pipeline_error(&err).as_i32() as u8)
        }
    }
}

async fn run(validated: sentence_pipeline_bootstrap::ValidatedCli) -> Result<(), PipelineError> {
    let config = PipelineConfig::load(validated.config.as_deref())?;

    let pool = initialize_database(&config.database.connection_url())
        .await
        .map_err(|err| PipelineError::store_error(err.to_string()))?;

    let sentence_repo = Arc::new(PostgresSentenceRepository::new(pool.clone()));
    let rule_store = Arc::new(PostgresRuleStore::new(pool.clone(), config.rule_cache_ttl()));
    let error_log = Arc::new(PostgresErrorLogRepository::new(pool.clone()));
    let performance = Arc::new(PostgresPerformanceRecorder::new(pool.clone()));
    let llm = Arc::new(GeminiClient::new(config.llm.api_key.clone(), config.llm.base_url.clone()));

    let initial_mode = match app_config.mode_override() {
        Some(ModeOverride::Testing) => ProcessingMode::Testing,
        Some(ModeOverride::Production) | None => ProcessingMode::Production,
    };

    let orchestrator =
        Arc::new(Orchestrator::new(OrchestratorConfig { initial_mode }, sentence_repo, rule_store, error_log, performance, llm));

    let scheduler = Arc::new(Scheduler::new());
    if app_config.scheduler_enabled() {
        register_default_task(&scheduler, Arc::clone(&orchestrator));
    }

    let shutdown = ShutdownCoordinator::new(Duration::from_secs(5));
    let signal_handler = create_signal_handler();
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        signal_handler
            .wait_for_signal(Box::new(move || {
                shutdown_for_signal.initiate_shutdown();
            }))
            .await;
    });

    dispatch(&validated.command, &orchestrator, &scheduler, &shutdown).await
}

fn register_default_task(scheduler: &Arc<Scheduler>, orchestrator: Arc<Orchestrator>) {
    let run = move || -> sentence_pipeline::application::scheduler::TaskFuture {
        let orchestrator = Arc::clone(&orchestrator);
        Box::pin(async move {
            orchestrator.process(None, None, None).await?;
            Ok(())
        })
    };

    scheduler.register(ScheduledTask {
        id: TASK_ID.to_string(),
        schedule: ScheduleKind::Daily { hour: 2, minute: 0 },
        run: Arc::new(run),
        max_retries: 3,
    });
}

async fn dispatch(
    command: &Commands,
    orchestrator: &Arc<Orchestrator>,
    scheduler: &Arc<Scheduler>,
    shutdown: &ShutdownCoordinator,
) -> Result<(), PipelineError> {
    match command {
        Commands::Process { table, ids, restart_from } => {
            let table = table.map(|arg| table_from_arg(*arg));
            let parsed_ids = ids.as_ref().map(|raw| parse_ids(raw));
            let stage = restart_from.map(|arg| stage_from_arg(*arg));

            let response = presentation::process(
                orchestrator,
                presentation::ProcessRequest { table, ids: parsed_ids, restart_from: stage },
            )
            .await?;

            println!(
                "session {}: {} total, {} processed, {} filtered, {} approved, {} errors",
                response.session_id,
                response.total_sentences,
                response.processed_sentences,
                response.filtered_sentences,
                response.approved_sentences,
                response.error_count
            );
            Ok(())
        }
        Commands::Status => {
            let status = presentation::status(orchestrator).await?;
            println!(
                "mode={} session_in_flight={} circuit={} reason=\"{}\"",
                status.mode, status.session_in_flight, status.circuit_state, status.circuit_reason
            );
            Ok(())
        }
        Commands::Scheduler { action } => {
            dispatch_scheduler(action, scheduler, shutdown).await;
            Ok(())
        }
        Commands::Health => {
            let health = presentation::health();
            println!("healthy={}", health.healthy);
            Ok(())
        }
    }
}

async fn dispatch_scheduler(action: &SchedulerAction, scheduler: &Arc<Scheduler>, shutdown: &ShutdownCoordinator) {
    match action {
        SchedulerAction::Status => {
            let status = presentation::scheduler_status(scheduler);
            println!("running={} tasks={} enabled={}", status.running, status.task_count, status.enabled_count);
        }
        SchedulerAction::Start => {
            presentation::scheduler_start(scheduler);
            println!("scheduler started, press Ctrl+C to stop");
            shutdown.token().cancelled().await;
            presentation::scheduler_stop(scheduler);
            shutdown.complete_shutdown();
            println!("scheduler stopped");
        }
        SchedulerAction::Stop => {
            presentation::scheduler_stop(scheduler);
            println!("scheduler stopped");
        }
        SchedulerAction::Enable { task_id } => {
            let found = presentation::scheduler_set_enabled(scheduler, task_id, true);
            println!("{}", if found { "enabled" } else { "no such task" });
        }
        SchedulerAction::Disable { task_id } => {
            let found = presentation::scheduler_set_enabled(scheduler, task_id, false);
            println!("{}", if found { "disabled" } else { "no such task" });
        }
        SchedulerAction::Run { task_id } => {
            let found = presentation::scheduler_force_run(scheduler, task_id).await;
            println!("{}", if found { "ran" } else { "no such task" });
        }
    }
}
