// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Postgres implementation of [`SentenceRepository`] (C1).

use async_trait::async_trait;
use sentence_pipeline_domain::entities::{Sentence, StageRecord, Verdict};
use sentence_pipeline_domain::repositories::sentence_repository::SELECTION_LIMIT;
use sentence_pipeline_domain::repositories::SentenceRepository;
use sentence_pipeline_domain::value_objects::{ProcessingStage, SentenceId, SentenceTable, StageStatus, ALL_STAGES};
use sentence_pipeline_domain::PipelineError;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PostgresSentenceRepository {
    pool: PgPool,
}

impl PostgresSentenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn stage_status_to_sql(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Pending => "pending",
        StageStatus::Approved => "approved",
        StageStatus::Rejected => "rejected",
        StageStatus::Error => "error",
        StageStatus::Testing => "testing",
    }
}

fn sql_to_stage_status(value: &str) -> StageStatus {
    match value {
        "approved" => StageStatus::Approved,
        "rejected" => StageStatus::Rejected,
        "error" => StageStatus::Error,
        "testing" => StageStatus::Testing,
        _ => StageStatus::Pending,
    }
}

fn row_to_sentence(table: SentenceTable, row: &PgRow) -> Result<Sentence, PipelineError> {
    let id: uuid::Uuid = row.try_get("id").map_err(store_err)?;
    let content_text: String = row.try_get("content_text").map_err(store_err)?;
    let tone: Option<String> = row.try_get("tone").map_err(store_err)?;
    let body_section: Option<String> = row.try_get("body_section").map_err(store_err)?;
    let position_label: Option<String> = row.try_get("position_label").map_err(store_err)?;
    let created_at = row.try_get("created_at").map_err(store_err)?;

    let mut stages: [StageRecord; 5] = Default::default();
    for stage in ALL_STAGES {
        let prefix = stage.column_prefix();
        let status: String = row.try_get(format!("{prefix}_status").as_str()).map_err(store_err)?;
        let stage_date = row.try_get(format!("{prefix}_date").as_str()).map_err(store_err)?;
        let reason: Option<String> = row.try_get(format!("{prefix}_reason").as_str()).map_err(store_err)?;
        let model: Option<String> = row.try_get(format!("{prefix}_model").as_str()).map_err(store_err)?;
        let payload: Option<serde_json::Value> = row.try_get(format!("{prefix}_payload").as_str()).map_err(store_err)?;
        stages[stage.index()] = StageRecord { status: sql_to_stage_status(&status), stage_date, reason, model, payload };
    }

    Ok(Sentence::from_parts(
        SentenceId::from_uuid(id),
        table,
        content_text,
        tone,
        body_section,
        position_label,
        stages,
        created_at,
    ))
}

fn store_err(err: sqlx::Error) -> PipelineError {
    PipelineError::store_error(err.to_string())
}

#[async_trait]
impl SentenceRepository for PostgresSentenceRepository {
    async fn select_for_processing(
        &self,
        table: SentenceTable,
        ids: Option<&[SentenceId]>,
        restart_from: Option<ProcessingStage>,
    ) -> Result<Vec<Sentence>, PipelineError> {
        let stage = restart_from.unwrap_or(ProcessingStage::KeywordFilter);
        let prefix = stage.column_prefix();
        let uuids: Option<Vec<uuid::Uuid>> = ids.map(|ids| ids.iter().map(|id| id.as_uuid()).collect());

        let query = format!(
            "SELECT * FROM {table_name} WHERE {prefix}_status IN ('pending', 'error', 'testing') \
             AND ($1::uuid[] IS NULL OR id = ANY($1)) ORDER BY created_at LIMIT {limit}",
            table_name = table.table_name(),
            limit = SELECTION_LIMIT
        );

        let rows = sqlx::query(&query).bind(uuids).fetch_all(&self.pool).await.map_err(store_err)?;
        rows.iter().map(|row| row_to_sentence(table, row)).collect()
    }

    async fn apply_verdicts(&self, stage: ProcessingStage, verdicts: &[Verdict]) -> Result<(), PipelineError> {
        if verdicts.is_empty() {
            return Ok(());
        }
        let prefix = stage.column_prefix();

        let mut tx = self.pool.begin().await.map_err(store_err)?;
        for verdict in verdicts {
            let query = format!(
                "UPDATE {table} SET {p}_status = $1, {p}_date = now(), {p}_reason = $2, {p}_model = $3, \
                 {p}_payload = $4 WHERE id = $5",
                table = verdict.table.table_name(),
                p = prefix
            );
            sqlx::query(&query)
                .bind(stage_status_to_sql(verdict.status))
                .bind(&verdict.reason)
                .bind(&verdict.model)
                .bind(&verdict.payload)
                .bind(verdict.id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(store_err)?;
        }
        tx.commit().await.map_err(store_err)
    }

    async fn bulk_reject(&self, table: SentenceTable, ids: &[SentenceId], reason: &str) -> Result<(), PipelineError> {
        if ids.is_empty() {
            return Ok(());
        }
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.as_uuid()).collect();

        let set_clause: String = ALL_STAGES
            .iter()
            .map(|stage| {
                let p = stage.column_prefix();
                format!("{p}_status = 'rejected', {p}_date = now(), {p}_reason = $1")
            })
            .collect::<Vec<_>>()
            .join(", ");

        let query = format!("UPDATE {table_name} SET {set_clause} WHERE id = ANY($2)", table_name = table.table_name());
        sqlx::query(&query).bind(reason).bind(uuids).execute(&self.pool).await.map_err(store_err)?;
        Ok(())
    }

    async fn insert(&self, sentence: &Sentence) -> Result<(), PipelineError> {
        let query = format!(
            "INSERT INTO {table} (id, content_text, tone, body_section, position_label, created_at, \
             keyword_filter_status, truthfulness_status, canadian_spelling_status, tone_analysis_status, \
             skill_analysis_status) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            table = sentence.table.table_name()
        );

        sqlx::query(&query)
            .bind(sentence.id.as_uuid())
            .bind(&sentence.content_text)
            .bind(&sentence.tone)
            .bind(&sentence.body_section)
            .bind(&sentence.position_label)
            .bind(sentence.created_at)
            .bind(stage_status_to_sql(sentence.stage_status(ProcessingStage::KeywordFilter)))
            .bind(stage_status_to_sql(sentence.stage_status(ProcessingStage::Truthfulness)))
            .bind(stage_status_to_sql(sentence.stage_status(ProcessingStage::CanadianSpelling)))
            .bind(stage_status_to_sql(sentence.stage_status(ProcessingStage::ToneAnalysis)))
            .bind(stage_status_to_sql(sentence.stage_status(ProcessingStage::SkillAnalysis)))
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn find_by_id(&self, table: SentenceTable, id: SentenceId) -> Result<Option<Sentence>, PipelineError> {
        let query = format!("SELECT * FROM {table_name} WHERE id = $1", table_name = table.table_name());
        let row = sqlx::query(&query).bind(id.as_uuid()).fetch_optional(&self.pool).await.map_err(store_err)?;
        row.as_ref().map(|row| row_to_sentence(table, row)).transpose()
    }

    async fn count_fully_approved(&self, table: SentenceTable) -> Result<usize, PipelineError> {
        let where_clause: String = ALL_STAGES
            .iter()
            .map(|stage| format!("{}_status = 'approved'", stage.column_prefix()))
            .collect::<Vec<_>>()
            .join(" AND ");

        let query = format!("SELECT COUNT(*) AS count FROM {table_name} WHERE {where_clause}", table_name = table.table_name());
        let row = sqlx::query(&query).fetch_one(&self.pool).await.map_err(store_err)?;
        let count: i64 = row.try_get("count").map_err(store_err)?;
        Ok(count as usize)
    }
}
