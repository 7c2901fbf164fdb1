// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Scheduler (C7)
//!
//! A named-task clock that wakes once a minute, runs whatever tasks are due,
//! and reschedules them. Every cadence — `daily`, `weekly`, and
//! `twice_weekly` — is computed by the same "next occurrence on a scheduled
//! weekday at the scheduled hour/minute, strictly in the future" algorithm;
//! `daily` is represented as every weekday enabled, `weekly` as exactly one.
//! This generalizes `twice_weekly`'s correct behavior uniformly rather than
//! reproducing the hour/minute-ignoring behavior the `daily`/`weekly` source
//! cadences had (§9's open question, resolved in the grounding ledger).
//!
//! A task's callable is an `Arc<dyn Fn() -> BoxFuture<'static, Result<(),
//! PipelineError>> + Send + Sync>` so the scheduler can hold a heterogeneous
//! set of async closures without generics leaking into its own API.

use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveTime, Timelike, Utc, Weekday};
use parking_lot::Mutex;
use sentence_pipeline_domain::PipelineError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration as TokioDuration};

pub type TaskFuture = Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send>>;
pub type TaskFn = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

/// The three cadences named in §4.7, all implemented through the same
/// weekday-set algorithm.
#[derive(Debug, Clone)]
pub enum ScheduleKind {
    /// Runs on every weekday at `hour:minute`.
    Daily { hour: u32, minute: u32 },
    /// Runs on exactly one weekday at `hour:minute`.
    Weekly { weekday: Weekday, hour: u32, minute: u32 },
    /// Runs on an arbitrary configured weekday set at `hour:minute`.
    TwiceWeekly { weekdays: Vec<Weekday>, hour: u32, minute: u32 },
}

impl ScheduleKind {
    fn weekdays(&self) -> Vec<Weekday> {
        match self {
            ScheduleKind::Daily { .. } => {
                vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat, Weekday::Sun]
            }
            ScheduleKind::Weekly { weekday, .. } => vec![*weekday],
            ScheduleKind::TwiceWeekly { weekdays, .. } => weekdays.clone(),
        }
    }

    fn time(&self) -> (u32, u32) {
        match self {
            ScheduleKind::Daily { hour, minute } => (*hour, *minute),
            ScheduleKind::Weekly { hour, minute, .. } => (*hour, *minute),
            ScheduleKind::TwiceWeekly { hour, minute, .. } => (*hour, *minute),
        }
    }

    /// Next occurrence on any configured weekday at `hour:minute`, strictly
    /// after `from`. Uniform across all three cadences (§4.7, §9).
    fn next_after(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let weekdays = self.weekdays();
        if weekdays.is_empty() {
            return None;
        }
        let (hour, minute) = self.time();
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;

        (1..=7)
            .map(|offset| from.date_naive() + ChronoDuration::days(offset))
            .filter(|date| weekdays.contains(&date.weekday()))
            .map(|date| DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(time), Utc))
            .chain(
                // Today is also eligible if the scheduled time hasn't passed yet.
                weekdays
                    .contains(&from.weekday())
                    .then(|| DateTime::<Utc>::from_naive_utc_and_offset(from.date_naive().and_time(time), Utc))
                    .filter(|candidate| *candidate > from),
            )
            .min()
    }
}

#[derive(Debug, Clone)]
pub struct TaskStatus {
    pub enabled: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub run_count: u64,
    pub error_count: u64,
    pub last_error: Option<String>,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self { enabled: true, last_run: None, next_run: None, run_count: 0, error_count: 0, last_error: None }
    }
}

struct ScheduledTaskInner {
    schedule: ScheduleKind,
    run: TaskFn,
    max_retries: u32,
    retry_count: u32,
    status: TaskStatus,
}

/// A named task definition. Constructed once at startup and registered with
/// the scheduler; the scheduler owns all subsequent mutable state.
pub struct ScheduledTask {
    pub id: String,
    pub schedule: ScheduleKind,
    pub run: TaskFn,
    pub max_retries: u32,
}

pub struct Scheduler {
    tasks: Mutex<HashMap<String, ScheduledTaskInner>>,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { tasks: Mutex::new(HashMap::new()), running: Arc::new(AtomicBool::new(false)), handle: Mutex::new(None) }
    }

    /// Registers a task and computes its first `next_run`. Re-registering an
    /// id replaces the prior definition and resets its status.
    pub fn register(&self, task: ScheduledTask) {
        let mut status = TaskStatus::default();
        status.next_run = task.schedule.next_after(Utc::now());
        self.tasks.lock().insert(
            task.id,
            ScheduledTaskInner { schedule: task.schedule, run: task.run, max_retries: task.max_retries, retry_count: 0, status },
        );
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts the one-minute background loop. A no-op if already running.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let scheduler = self.clone();
        let running = self.running.clone();
        let handle = tokio::task::spawn(async move {
            let mut ticker = interval(TokioDuration::from_secs(60));
            while running.load(Ordering::SeqCst) {
                ticker.tick().await;
                scheduler.run_due_tasks().await;
            }
        });
        *self.handle.lock() = Some(handle);
    }

    /// Stops the background loop. The in-flight tick (if any) completes
    /// before the loop observes `running == false` and exits.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }

    async fn run_due_tasks(&self) {
        let now = Utc::now();
        let due_ids: Vec<String> = self
            .tasks
            .lock()
            .iter()
            .filter(|(_, task)| task.status.enabled)
            .filter(|(_, task)| task.status.next_run.map(|next| next <= now).unwrap_or(false))
            .map(|(id, _)| id.clone())
            .collect();

        // One task at a time, in registration-iteration order (§5: the
        // scheduler never runs two instances of the same task concurrently,
        // and here it never overlaps any two tasks either).
        for id in due_ids {
            self.run_task(&id).await;
        }
    }

    /// Executes `id` immediately regardless of `next_run`, then recomputes
    /// it. Used both by the minute loop and by `force_run_task`.
    async fn run_task(&self, id: &str) {
        let (run, schedule, max_retries) = {
            let tasks = self.tasks.lock();
            let Some(task) = tasks.get(id) else { return };
            (task.run.clone(), task.schedule.clone(), task.max_retries)
        };

        let now = Utc::now();
        let result = (run)().await;

        let mut tasks = self.tasks.lock();
        let Some(task) = tasks.get_mut(id) else { return };
        task.status.last_run = Some(now);
        task.status.run_count += 1;

        match result {
            Ok(()) => {
                task.retry_count = 0;
                task.status.last_error = None;
                task.status.next_run = schedule.next_after(now);
            }
            Err(err) => {
                task.status.error_count += 1;
                task.status.last_error = Some(err.to_string());
                if task.retry_count < max_retries {
                    task.retry_count += 1;
                    task.status.next_run = Some(now + ChronoDuration::hours(1));
                } else {
                    task.retry_count = 0;
                    task.status.next_run = schedule.next_after(now);
                }
            }
        }
    }

    pub async fn force_run_task(&self, id: &str) -> bool {
        if !self.tasks.lock().contains_key(id) {
            return false;
        }
        self.run_task(id).await;
        true
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        match self.tasks.lock().get_mut(id) {
            Some(task) => {
                task.status.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn task_status(&self, id: &str) -> Option<TaskStatus> {
        self.tasks.lock().get(id).map(|task| task.status.clone())
    }

    pub fn status(&self) -> SchedulerStatus {
        let tasks = self.tasks.lock();
        let enabled_count = tasks.values().filter(|t| t.status.enabled).count();
        SchedulerStatus {
            running: self.is_running(),
            task_count: tasks.len(),
            enabled_count,
            per_task: tasks.iter().map(|(id, task)| (id.clone(), task.status.clone())).collect(),
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    pub running: bool,
    pub task_count: usize,
    pub enabled_count: usize,
    pub per_task: HashMap<String, TaskStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::AtomicU32;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn daily_next_after_respects_configured_time() {
        let schedule = ScheduleKind::Daily { hour: 9, minute: 0 };
        // Wednesday 2024-01-03 at 10:00 — past today's 9:00, so the next run
        // is tomorrow at 9:00, not "now + 1 day" at the same minute.
        let from = utc(2024, 1, 3, 10, 0);
        let next = schedule.next_after(from).unwrap();
        assert_eq!(next, utc(2024, 1, 4, 9, 0));
    }

    #[test]
    fn weekly_next_after_lands_on_the_configured_weekday() {
        let schedule = ScheduleKind::Weekly { weekday: Weekday::Mon, hour: 8, minute: 30 };
        let from = utc(2024, 1, 3, 0, 0); // a Wednesday
        let next = schedule.next_after(from).unwrap();
        assert_eq!(next.weekday(), Weekday::Mon);
        assert_eq!((next.hour(), next.minute()), (8, 30));
    }

    #[test]
    fn twice_weekly_picks_the_nearer_of_two_configured_days() {
        let schedule = ScheduleKind::TwiceWeekly { weekdays: vec![Weekday::Mon, Weekday::Thu], hour: 7, minute: 0 };
        let from = utc(2024, 1, 3, 12, 0); // Wednesday afternoon
        let next = schedule.next_after(from).unwrap();
        assert_eq!(next, utc(2024, 1, 4, 7, 0)); // Thursday, one day away
    }

    #[tokio::test]
    async fn force_run_task_recomputes_next_run_on_success() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        scheduler.register(ScheduledTask {
            id: "refresh_rules".to_string(),
            schedule: ScheduleKind::Daily { hour: 3, minute: 0 },
            run: Arc::new(move || {
                let counter = counter_clone.clone();
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            }),
            max_retries: 2,
        });

        assert!(scheduler.force_run_task("refresh_rules").await);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        let status = scheduler.task_status("refresh_rules").unwrap();
        assert_eq!(status.run_count, 1);
        assert!(status.next_run.is_some());
    }

    #[tokio::test]
    async fn failing_task_retries_before_falling_back_to_cadence() {
        let scheduler = Scheduler::new();
        scheduler.register(ScheduledTask {
            id: "flaky".to_string(),
            schedule: ScheduleKind::Daily { hour: 3, minute: 0 },
            run: Arc::new(|| Box::pin(async { Err(PipelineError::processing_error("boom")) })),
            max_retries: 1,
        });

        scheduler.force_run_task("flaky").await;
        let after_first = scheduler.task_status("flaky").unwrap();
        assert_eq!(after_first.error_count, 1);
        let retry_next_run = after_first.next_run.unwrap();

        scheduler.force_run_task("flaky").await;
        let after_second = scheduler.task_status("flaky").unwrap();
        assert_eq!(after_second.error_count, 2);
        // After exhausting retries, next_run falls back to the daily cadence
        // rather than another one-hour retry delay.
        assert_ne!(after_second.next_run.unwrap(), retry_next_run + ChronoDuration::hours(1));
    }

    #[test]
    fn disabling_a_task_excludes_it_from_enabled_count() {
        let scheduler = Scheduler::new();
        scheduler.register(ScheduledTask {
            id: "t1".to_string(),
            schedule: ScheduleKind::Daily { hour: 0, minute: 0 },
            run: Arc::new(|| Box::pin(async { Ok(()) })),
            max_retries: 0,
        });
        assert!(scheduler.set_enabled("t1", false));
        assert_eq!(scheduler.status().enabled_count, 0);
    }
}
