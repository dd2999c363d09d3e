//! Recompute trigger
//!
//! `RecomputeTrigger` is the pure `Stale -> Computing -> Fresh` state machine
//! with a request sequence number. `MetricsEngine` drives it for one active
//! `(user, period)` context on top of a `DataSource`: overlapping reads share
//! one in-flight computation and results computed for an outdated sequence
//! are discarded.

use crate::config::EngineConfig;
use crate::error::ComputeError;
use crate::period::{Period, PeriodSpec};
use crate::pipeline::MetricsPipeline;
use crate::source::{ChangeNotifier, DataSource};
use crate::types::MetricsResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info, warn};

/// Freshness of the published metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    Stale,
    Computing,
    Fresh,
}

/// Sequence-guarded recompute state machine
#[derive(Debug, Clone)]
pub struct RecomputeTrigger {
    state: TriggerState,
    sequence: u64,
}

impl Default for RecomputeTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl RecomputeTrigger {
    pub fn new() -> Self {
        Self {
            state: TriggerState::Stale,
            sequence: 0,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Latest requested sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Record a data, period or user change
    pub fn invalidate(&mut self) -> u64 {
        self.sequence += 1;
        self.state = TriggerState::Stale;
        self.sequence
    }

    /// Start a computation if one is needed; returns its ticket
    pub fn begin(&mut self) -> Option<u64> {
        if self.state == TriggerState::Stale {
            self.state = TriggerState::Computing;
            Some(self.sequence)
        } else {
            None
        }
    }

    /// Finish a computation. Returns false when the ticket is outdated and
    /// the result must be dropped.
    pub fn complete(&mut self, ticket: u64) -> bool {
        if ticket != self.sequence {
            return false;
        }
        self.state = TriggerState::Fresh;
        true
    }

    /// A failed computation leaves the trigger stale so the next read retries
    pub fn fail(&mut self, ticket: u64) {
        if ticket == self.sequence {
            self.state = TriggerState::Stale;
        }
    }
}

/// Metrics computed for one user and resolved period
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMetrics {
    pub user_id: String,
    pub period: PeriodSpec,
    pub metrics: MetricsResult,
}

struct Context {
    trigger: RecomputeTrigger,
    user_id: String,
    period: Period,
    published: Option<PublishedMetrics>,
}

struct Shared {
    context: Mutex<Context>,
    settled: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Context> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Metrics for one active user and period, recomputed on demand
pub struct MetricsEngine<S: DataSource> {
    source: S,
    pipeline: MetricsPipeline,
    max_attempts: u32,
    shared: Arc<Shared>,
}

impl<S: DataSource> MetricsEngine<S> {
    /// Create an engine and subscribe it to the source's change signal
    pub fn new(
        source: S,
        config: &EngineConfig,
        user_id: impl Into<String>,
        period: Period,
    ) -> Result<Self, ComputeError> {
        let pipeline = MetricsPipeline::new(config)?;
        let shared = Arc::new(Shared {
            context: Mutex::new(Context {
                trigger: RecomputeTrigger::new(),
                user_id: user_id.into(),
                period,
                published: None,
            }),
            settled: Condvar::new(),
        });

        let engine = Self {
            source,
            pipeline,
            max_attempts: config.max_recompute_attempts.max(1),
            shared,
        };
        engine.source.subscribe(engine.notifier());
        Ok(engine)
    }

    /// Handle that marks the engine stale; safe to call from any thread
    pub fn notifier(&self) -> ChangeNotifier {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        ChangeNotifier::new(move || {
            if let Some(shared) = shared.upgrade() {
                let sequence = shared.lock().trigger.invalidate();
                debug!(sequence, "external data change");
            }
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> TriggerState {
        self.shared.lock().trigger.state()
    }

    pub fn sequence(&self) -> u64 {
        self.shared.lock().trigger.sequence()
    }

    pub fn user_id(&self) -> String {
        self.shared.lock().user_id.clone()
    }

    pub fn period(&self) -> Period {
        self.shared.lock().period
    }

    /// Mark the metrics stale
    pub fn invalidate(&self) -> u64 {
        self.shared.lock().trigger.invalidate()
    }

    /// Switch the requested period; an in-flight result for the old one is discarded
    pub fn set_period(&self, period: Period) {
        let mut context = self.shared.lock();
        if context.period != period {
            context.period = period;
            context.published = None;
            context.trigger.invalidate();
        }
    }

    /// Switch the active user; an in-flight result for the old one is discarded
    pub fn set_user(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        let mut context = self.shared.lock();
        if context.user_id != user_id {
            context.user_id = user_id;
            context.published = None;
            context.trigger.invalidate();
        }
    }

    /// Current metrics, recomputing when stale.
    ///
    /// Concurrent callers wait for an in-flight computation instead of
    /// starting their own. A fetch failure is returned as `DataFetchFailed`
    /// and leaves the engine stale.
    pub fn metrics(&self, now: DateTime<Utc>) -> Result<PublishedMetrics, ComputeError> {
        let mut discarded = 0u32;

        loop {
            let mut context = self.shared.lock();

            loop {
                match context.trigger.state() {
                    TriggerState::Fresh => {
                        let spec = self
                            .pipeline
                            .resolver()
                            .resolve_period(context.period, now)?;
                        if let Some(published) =
                            context.published.as_ref().filter(|p| p.period == spec)
                        {
                            return Ok(published.clone());
                        }
                        // Day rolled over since the last computation
                        context.trigger.invalidate();
                    }
                    TriggerState::Computing => {
                        context = self
                            .shared
                            .settled
                            .wait(context)
                            .unwrap_or_else(PoisonError::into_inner);
                    }
                    TriggerState::Stale => break,
                }
            }

            let Some(ticket) = context.trigger.begin() else {
                continue;
            };
            let user_id = context.user_id.clone();
            let period = context.period;
            drop(context);

            debug!(ticket, user_id = %user_id, period = %period, "recomputing metrics");
            let outcome = self.recompute(&user_id, period, now);

            let mut context = self.shared.lock();
            match outcome {
                Err(err) => {
                    context.trigger.fail(ticket);
                    self.shared.settled.notify_all();
                    warn!(ticket, error = %err, "recompute failed");
                    return Err(err);
                }
                Ok(computed) => {
                    if context.trigger.complete(ticket) {
                        context.published = Some(computed.clone());
                        self.shared.settled.notify_all();
                        info!(
                            ticket,
                            user_id = %user_id,
                            period = %period,
                            consistency = computed.metrics.consistency_percent,
                            "published fresh metrics"
                        );
                        return Ok(computed);
                    }

                    let latest = context.trigger.sequence();
                    self.shared.settled.notify_all();
                    discarded += 1;
                    warn!(ticket, latest, "discarded outdated metrics");
                    if discarded >= self.max_attempts {
                        return Err(ComputeError::Superseded {
                            requested: ticket,
                            latest,
                        });
                    }
                }
            }
        }
    }

    fn recompute(
        &self,
        user_id: &str,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<PublishedMetrics, ComputeError> {
        let spec = self.pipeline.resolver().resolve_period(period, now)?;

        let tasks = self.source.fetch_tasks(user_id, &spec)?;
        let routines = self.source.fetch_routines(user_id)?;
        // The weekly evaluation may reach back before the period start
        let journal_span = self.pipeline.journal_span(&spec, now);
        let journal = self.source.fetch_journal_entries(user_id, &journal_span)?;

        let metrics = self.pipeline.compute(&tasks, &routines, &journal, &spec, now);
        Ok(PublishedMetrics {
            user_id: user_id.to_string(),
            period: spec,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataSnapshot, JournalRecord, RoutineRecord, TaskRecord, TaskStatus};
    use crate::source::{FetchError, MemoryStore};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use crate::types::Mood;
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
    use std::sync::Barrier;

    fn ts(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    fn config() -> EngineConfig {
        EngineConfig::with_timezone("UTC")
    }

    fn task(id: &str, day: u32) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            status: TaskStatus::Completed,
            created_at: ts(day, 8),
            completed_at: Some(ts(day, 10)),
        }
    }

    /// Store wrapper that invalidates the engine during a fetch
    struct RacingSource {
        inner: MemoryStore,
        notifier: Mutex<Option<ChangeNotifier>>,
        races_left: AtomicU32,
        fetches: AtomicUsize,
    }

    impl RacingSource {
        fn new(races: u32) -> Self {
            let inner = MemoryStore::new();
            inner.insert_snapshot("u", DataSnapshot::new("u"));
            Self {
                inner,
                notifier: Mutex::new(None),
                races_left: AtomicU32::new(races),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl DataSource for RacingSource {
        fn fetch_tasks(&self, user_id: &str, period: &PeriodSpec) -> Result<Vec<TaskRecord>, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.races_left.load(Ordering::SeqCst) > 0 {
                self.races_left.fetch_sub(1, Ordering::SeqCst);
                if let Some(notifier) = self.notifier.lock().unwrap().as_ref() {
                    notifier.notify();
                }
            }
            self.inner.fetch_tasks(user_id, period)
        }

        fn fetch_routines(&self, user_id: &str) -> Result<Vec<RoutineRecord>, FetchError> {
            self.inner.fetch_routines(user_id)
        }

        fn fetch_journal_entries(
            &self,
            user_id: &str,
            period: &PeriodSpec,
        ) -> Result<Vec<JournalRecord>, FetchError> {
            self.inner.fetch_journal_entries(user_id, period)
        }

        fn subscribe(&self, notifier: ChangeNotifier) {
            *self.notifier.lock().unwrap() = Some(notifier);
        }
    }

    /// Store wrapper that parks the first task fetch until the test releases it
    struct PausingSource {
        inner: MemoryStore,
        armed: AtomicBool,
        gate: Barrier,
        fetched_users: Mutex<Vec<String>>,
    }

    impl PausingSource {
        fn new() -> Self {
            let inner = MemoryStore::new();
            inner.add_task("u", task("a", 6));
            inner.add_task("v", task("x", 5));
            inner.add_task("v", task("y", 6));
            Self {
                inner,
                armed: AtomicBool::new(true),
                gate: Barrier::new(2),
                fetched_users: Mutex::new(Vec::new()),
            }
        }
    }

    impl DataSource for PausingSource {
        fn fetch_tasks(&self, user_id: &str, period: &PeriodSpec) -> Result<Vec<TaskRecord>, FetchError> {
            self.fetched_users.lock().unwrap().push(user_id.to_string());
            if self.armed.swap(false, Ordering::SeqCst) {
                // fetch started
                self.gate.wait();
                // context switched
                self.gate.wait();
            }
            self.inner.fetch_tasks(user_id, period)
        }

        fn fetch_routines(&self, user_id: &str) -> Result<Vec<RoutineRecord>, FetchError> {
            self.inner.fetch_routines(user_id)
        }

        fn fetch_journal_entries(
            &self,
            user_id: &str,
            period: &PeriodSpec,
        ) -> Result<Vec<JournalRecord>, FetchError> {
            self.inner.fetch_journal_entries(user_id, period)
        }
    }

    #[test]
    fn test_trigger_transitions() {
        let mut trigger = RecomputeTrigger::new();
        assert_eq!(trigger.state(), TriggerState::Stale);

        let ticket = trigger.begin().unwrap();
        assert_eq!(trigger.state(), TriggerState::Computing);
        assert_eq!(trigger.begin(), None);

        assert!(trigger.complete(ticket));
        assert_eq!(trigger.state(), TriggerState::Fresh);
        assert_eq!(trigger.begin(), None);
    }

    #[test]
    fn test_trigger_discards_outdated_ticket() {
        let mut trigger = RecomputeTrigger::new();
        let old = trigger.begin().unwrap();
        trigger.invalidate();

        assert!(!trigger.complete(old));
        assert_eq!(trigger.state(), TriggerState::Stale);

        let new = trigger.begin().unwrap();
        assert!(new > old);
        assert!(trigger.complete(new));
    }

    #[test]
    fn test_trigger_failure_returns_to_stale() {
        let mut trigger = RecomputeTrigger::new();
        let ticket = trigger.begin().unwrap();
        trigger.fail(ticket);
        assert_eq!(trigger.state(), TriggerState::Stale);
        assert_eq!(trigger.begin(), Some(ticket));
    }

    #[test]
    fn test_fresh_result_is_reused() {
        let store = MemoryStore::new();
        store.add_task("u", task("a", 6));
        let engine = MetricsEngine::new(store, &config(), "u", Period::Today).unwrap();

        let first = engine.metrics(ts(6, 12)).unwrap();
        assert_eq!(engine.state(), TriggerState::Fresh);
        let sequence = engine.sequence();

        let second = engine.metrics(ts(6, 13)).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.sequence(), sequence);
    }

    #[test]
    fn test_mutation_invalidates() {
        let store = MemoryStore::new();
        store.add_task("u", task("a", 6));
        let engine = MetricsEngine::new(store, &config(), "u", Period::Today).unwrap();
        assert_eq!(engine.metrics(ts(6, 12)).unwrap().metrics.completed_units, 1);

        engine.source().add_task("u", task("b", 6));
        assert_eq!(engine.state(), TriggerState::Stale);
        assert_eq!(engine.metrics(ts(6, 12)).unwrap().metrics.completed_units, 2);
    }

    #[test]
    fn test_period_and_user_changes_invalidate() {
        let store = MemoryStore::new();
        store.add_task("u", task("a", 6));
        store.add_task("v", task("x", 5));
        let engine = MetricsEngine::new(store, &config(), "u", Period::Today).unwrap();
        engine.metrics(ts(6, 12)).unwrap();

        engine.set_period(Period::Week);
        assert_eq!(engine.state(), TriggerState::Stale);
        let published = engine.metrics(ts(6, 12)).unwrap();
        assert_eq!(published.period.day_count, 7);
        assert_eq!(published.user_id, "u");

        engine.set_user("v");
        assert_eq!(engine.state(), TriggerState::Stale);
        let published = engine.metrics(ts(6, 12)).unwrap();
        assert_eq!(published.user_id, "v");
        assert_eq!(published.metrics.completed_units, 1);
        assert_eq!(published.metrics.weekly_series[1].value, 10);

        // Setting the same values again is not a change
        let sequence = engine.sequence();
        engine.set_user("v");
        engine.set_period(Period::Week);
        assert_eq!(engine.sequence(), sequence);
    }

    #[test]
    fn test_day_rollover_recomputes() {
        let store = MemoryStore::new();
        store.add_task("u", task("a", 6));
        let engine = MetricsEngine::new(store, &config(), "u", Period::Today).unwrap();

        assert_eq!(engine.metrics(ts(6, 23)).unwrap().metrics.completed_units, 1);
        assert_eq!(engine.metrics(ts(7, 1)).unwrap().metrics.completed_units, 0);
    }

    #[test]
    fn test_fetch_failure_leaves_stale() {
        let store = MemoryStore::new();
        store.add_task("u", task("a", 6));
        let engine = MetricsEngine::new(store, &config(), "u", Period::Today).unwrap();

        engine
            .source()
            .set_failure(Some(FetchError::Storage("disk".to_string())));
        let err = engine.metrics(ts(6, 12)).unwrap_err();
        assert!(err.is_fetch_failure());
        assert_eq!(engine.state(), TriggerState::Stale);

        engine.source().set_failure(None);
        assert!(engine.metrics(ts(6, 12)).is_ok());
        assert_eq!(engine.state(), TriggerState::Fresh);
    }

    #[test]
    fn test_outdated_result_is_retried() {
        let engine = MetricsEngine::new(RacingSource::new(1), &config(), "u", Period::Today).unwrap();

        assert!(engine.metrics(ts(6, 12)).is_ok());
        assert_eq!(engine.state(), TriggerState::Fresh);
        assert_eq!(engine.source().fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_superseded_after_max_attempts() {
        let engine = MetricsEngine::new(RacingSource::new(10), &config(), "u", Period::Today).unwrap();

        let err = engine.metrics(ts(6, 12)).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::Superseded { requested: 2, latest: 3 }
        ));
        assert_eq!(engine.source().fetches.load(Ordering::SeqCst), 3);
        assert_eq!(engine.state(), TriggerState::Stale);
    }

    #[test]
    fn test_concurrent_reads_share_one_computation() {
        let source = RacingSource::new(0);
        source.inner.add_task("u", task("a", 6));
        let engine = MetricsEngine::new(source, &config(), "u", Period::Week).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| engine.metrics(ts(6, 12)).unwrap());
            }
        });
        assert_eq!(engine.source().fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_user_switch_mid_computation_discards_old_result() {
        let engine = MetricsEngine::new(PausingSource::new(), &config(), "u", Period::Week).unwrap();

        let published = std::thread::scope(|scope| {
            let reader = scope.spawn(|| engine.metrics(ts(6, 12)).unwrap());
            engine.source().gate.wait();
            engine.set_user("v");
            engine.source().gate.wait();
            reader.join().unwrap()
        });

        assert_eq!(published.user_id, "v");
        assert_eq!(published.metrics.completed_units, 2);
        assert_eq!(*engine.source().fetched_users.lock().unwrap(), vec!["u", "v"]);

        // Only the new user's result was published
        assert_eq!(engine.state(), TriggerState::Fresh);
        let again = engine.metrics(ts(6, 12)).unwrap();
        assert_eq!(again, published);
        assert_eq!(engine.source().fetched_users.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_period_switch_mid_computation_discards_old_result() {
        let engine = MetricsEngine::new(PausingSource::new(), &config(), "u", Period::Week).unwrap();

        let published = std::thread::scope(|scope| {
            let reader = scope.spawn(|| engine.metrics(ts(6, 12)).unwrap());
            engine.source().gate.wait();
            engine.set_period(Period::Yesterday);
            engine.source().gate.wait();
            reader.join().unwrap()
        });

        assert_eq!(published.user_id, "u");
        assert_eq!(published.period.period, Period::Yesterday);
        assert_eq!(published.metrics.completed_units, 0);
        assert_eq!(engine.source().fetched_users.lock().unwrap().len(), 2);
        assert_eq!(engine.metrics(ts(6, 12)).unwrap(), published);
    }

    #[test]
    fn test_weekly_evaluation_fetches_trailing_week() {
        let store = MemoryStore::new();
        for (id, day) in [("j1", 4), ("j2", 5)] {
            store.add_journal_entry(
                "u",
                JournalRecord {
                    id: id.to_string(),
                    date: ts(day, 21),
                    mood: Mood::Bad,
                    reasons: vec!["Cansaço".to_string()],
                    tags: vec![],
                },
            );
        }
        let engine = MetricsEngine::new(store, &config(), "u", Period::Today).unwrap();

        let metrics = engine.metrics(ts(6, 12)).unwrap().metrics;
        assert!(metrics.mood_stats.is_none());
        let eval = metrics.weekly_evaluation.unwrap();
        assert_eq!(eval.bad_days, 2);
        assert_eq!(eval.top_reason.as_deref(), Some("Cansaço"));
    }
}
