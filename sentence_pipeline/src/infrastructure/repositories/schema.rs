// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Postgres schema helpers shared by repository implementations.
//!
//! Both sentence tables (§6) share an identical shape: one status/date/
//! reason/model/payload quintet of columns per evaluation stage, keyed by
//! `ProcessingStage::column_prefix()`.

use sqlx::PgPool;
use tracing::{debug, info};

const STAGE_PREFIXES: [&str; 5] =
    ["keyword_filter", "truthfulness", "canadian_spelling", "tone_analysis", "skill_analysis"];

fn sentence_table_ddl(table: &str) -> String {
    let stage_columns: String = STAGE_PREFIXES
        .iter()
        .map(|prefix| {
            format!(
                ", {p}_status TEXT NOT NULL DEFAULT 'pending', {p}_date TIMESTAMPTZ, \
                 {p}_reason TEXT, {p}_model TEXT, {p}_payload JSONB",
                p = prefix
            )
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
             id UUID PRIMARY KEY, \
             content_text TEXT NOT NULL, \
             tone TEXT, \
             body_section TEXT, \
             position_label TEXT, \
             created_at TIMESTAMPTZ NOT NULL DEFAULT now(){stage_columns}\
         )"
    )
}

const ERROR_LOG_DDL: &str = "CREATE TABLE IF NOT EXISTS error_log (\
    error_id UUID PRIMARY KEY, \
    timestamp TIMESTAMPTZ NOT NULL, \
    session_id TEXT, \
    stage_name TEXT, \
    category TEXT NOT NULL, \
    severity TEXT NOT NULL, \
    message TEXT NOT NULL, \
    context JSONB, \
    retry_count INTEGER NOT NULL DEFAULT 0, \
    resolved BOOLEAN NOT NULL DEFAULT false, \
    resolution_notes TEXT\
)";

const PERFORMANCE_LOG_DDL: &str = "CREATE TABLE IF NOT EXISTS performance_log (\
    id BIGSERIAL PRIMARY KEY, \
    stage_name TEXT NOT NULL, \
    call_type TEXT NOT NULL, \
    response_time_ms BIGINT, \
    success BOOLEAN NOT NULL, \
    error_message TEXT, \
    cost_estimate DOUBLE PRECISION, \
    batch_size INTEGER, \
    sentences_processed INTEGER, \
    model_used TEXT, \
    session_id TEXT, \
    recorded_at TIMESTAMPTZ NOT NULL\
)";

const RULE_KEYWORDS_DDL: &str =
    "CREATE TABLE IF NOT EXISTS active_keywords (keyword TEXT PRIMARY KEY, active BOOLEAN NOT NULL DEFAULT true)";

const SPELLING_PAIRS_DDL: &str =
    "CREATE TABLE IF NOT EXISTS spelling_pairs (source TEXT PRIMARY KEY, target TEXT NOT NULL)";

const ATOMIC_TRUTHS_DDL: &str = "CREATE TABLE IF NOT EXISTS atomic_truths (id BIGSERIAL PRIMARY KEY, truth TEXT NOT NULL)";

/// Creates every table this crate's adapters depend on if they do not
/// already exist. Idempotent, safe to call on every process start.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    debug!("Ensuring database schema is up to date");

    sqlx::query(&sentence_table_ddl("sentence_bank_resume")).execute(pool).await?;
    sqlx::query(&sentence_table_ddl("sentence_bank_cover_letter")).execute(pool).await?;
    sqlx::query(ERROR_LOG_DDL).execute(pool).await?;
    sqlx::query(PERFORMANCE_LOG_DDL).execute(pool).await?;
    sqlx::query(RULE_KEYWORDS_DDL).execute(pool).await?;
    sqlx::query(SPELLING_PAIRS_DDL).execute(pool).await?;
    sqlx::query(ATOMIC_TRUTHS_DDL).execute(pool).await?;

    info!("Database schema is up to date");
    Ok(())
}

/// Connects to `database_url` and ensures the schema exists, in one call —
/// the composition root's entry point for database setup.
pub async fn initialize_database(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}
