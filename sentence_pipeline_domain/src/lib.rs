// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sentence Pipeline Domain
//!
//! Pure business logic for the five-stage sentence evaluation pipeline:
//! keyword filtering, truthfulness evaluation, locale spelling correction,
//! tone analysis, and skill assignment.
//!
//! This crate depends only on `async-trait`/`futures` for the shape of its
//! I/O ports (repositories, LLM client); no `tokio` runtime, no `tracing`,
//! no `anyhow`. Infrastructure concerns — database access, HTTP calls,
//! scheduling, logging — live in the application crate, which implements
//! the traits this crate defines.

pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use error::PipelineError;
