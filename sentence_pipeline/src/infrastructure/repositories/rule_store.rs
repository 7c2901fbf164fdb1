// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Postgres-backed [`RuleStore`] (C2) with an in-process TTL cache, so the
//! keyword filter and locale-spelling stages don't round-trip to the
//! database on every batch (§4.2, §9).

use async_trait::async_trait;
use parking_lot::Mutex;
use sentence_pipeline_domain::repositories::rule_store::SpellingPair;
use sentence_pipeline_domain::repositories::RuleStore;
use sentence_pipeline_domain::PipelineError;
use sqlx::{PgPool, Row};
use std::time::{Duration, Instant};

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

struct Cache {
    keywords: Option<Cached<Vec<String>>>,
    spelling_pairs: Option<Cached<Vec<SpellingPair>>>,
    atomic_truths: Option<Cached<Vec<String>>>,
}

impl Cache {
    fn empty() -> Self {
        Self { keywords: None, spelling_pairs: None, atomic_truths: None }
    }
}

pub struct PostgresRuleStore {
    pool: PgPool,
    ttl: Duration,
    cache: Mutex<Cache>,
}

impl PostgresRuleStore {
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        Self { pool, ttl, cache: Mutex::new(Cache::empty()) }
    }
}

fn store_err(err: sqlx::Error) -> PipelineError {
    PipelineError::rule_load(err.to_string())
}

#[async_trait]
impl RuleStore for PostgresRuleStore {
    async fn active_keywords(&self) -> Result<Vec<String>, PipelineError> {
        if let Some(cached) = &self.cache.lock().keywords {
            if cached.fetched_at.elapsed() < self.ttl {
                return Ok(cached.value.clone());
            }
        }

        let rows = sqlx::query("SELECT keyword FROM active_keywords WHERE active = true")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        let keywords: Vec<String> =
            rows.iter().map(|row| row.try_get::<String, _>("keyword")).collect::<Result<_, _>>().map_err(store_err)?;

        self.cache.lock().keywords = Some(Cached { value: keywords.clone(), fetched_at: Instant::now() });
        Ok(keywords)
    }

    async fn spelling_pairs(&self) -> Result<Vec<SpellingPair>, PipelineError> {
        if let Some(cached) = &self.cache.lock().spelling_pairs {
            if cached.fetched_at.elapsed() < self.ttl {
                return Ok(cached.value.clone());
            }
        }

        let rows =
            sqlx::query("SELECT source, target FROM spelling_pairs").fetch_all(&self.pool).await.map_err(store_err)?;
        let mut pairs: Vec<SpellingPair> = rows
            .iter()
            .map(|row| {
                Ok(SpellingPair {
                    source: row.try_get::<String, _>("source")?,
                    target: row.try_get::<String, _>("target")?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(store_err)?;
        pairs.sort_by(|a, b| b.source.len().cmp(&a.source.len()));

        self.cache.lock().spelling_pairs = Some(Cached { value: pairs.clone(), fetched_at: Instant::now() });
        Ok(pairs)
    }

    async fn atomic_truths(&self) -> Result<Vec<String>, PipelineError> {
        if let Some(cached) = &self.cache.lock().atomic_truths {
            if cached.fetched_at.elapsed() < self.ttl {
                return Ok(cached.value.clone());
            }
        }

        let rows = sqlx::query("SELECT truth FROM atomic_truths").fetch_all(&self.pool).await.map_err(store_err)?;
        let truths: Vec<String> =
            rows.iter().map(|row| row.try_get::<String, _>("truth")).collect::<Result<_, _>>().map_err(store_err)?;

        self.cache.lock().atomic_truths = Some(Cached { value: truths.clone(), fetched_at: Instant::now() });
        Ok(truths)
    }

    async fn refresh(&self) -> Result<(), PipelineError> {
        *self.cache.lock() = Cache::empty();
        Ok(())
    }
}
