//! Data-access collaborator boundary
//!
//! The engine never reads storage itself. A `DataSource` fetches a user's
//! tasks, routines and journal entries and pushes a change signal through a
//! `ChangeNotifier` after every write.

use crate::period::PeriodSpec;
use crate::schema::{DataSnapshot, JournalRecord, RoutineRecord, TaskRecord};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Failure reported by the data collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("user not found: {0}")]
    UserNotFound(String),
}

/// Handle the collaborator calls when a user's data changed
#[derive(Clone)]
pub struct ChangeNotifier {
    callback: Arc<dyn Fn() + Send + Sync>,
}

impl ChangeNotifier {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    pub fn notify(&self) {
        (self.callback)()
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier").finish_non_exhaustive()
    }
}

/// Read access to one user's records
pub trait DataSource {
    /// Tasks relevant to the period
    fn fetch_tasks(&self, user_id: &str, period: &PeriodSpec) -> Result<Vec<TaskRecord>, FetchError>;

    /// All routines; not period-filtered
    fn fetch_routines(&self, user_id: &str) -> Result<Vec<RoutineRecord>, FetchError>;

    /// Journal entries dated inside the period
    fn fetch_journal_entries(
        &self,
        user_id: &str,
        period: &PeriodSpec,
    ) -> Result<Vec<JournalRecord>, FetchError>;

    /// Register the invalidation callback. Sources without change tracking
    /// ignore it.
    fn subscribe(&self, _notifier: ChangeNotifier) {}
}

/// In-memory `DataSource` keyed by user id.
///
/// Every mutation notifies all subscribers after the store lock is released.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, DataSnapshot>>,
    subscribers: Mutex<Vec<ChangeNotifier>>,
    failure: Mutex<Option<FetchError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all records of the snapshot's user
    pub fn insert_snapshot(&self, user_id: &str, snapshot: DataSnapshot) {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string(), snapshot);
        self.notify_all();
    }

    pub fn add_task(&self, user_id: &str, task: TaskRecord) {
        self.mutate(user_id, |snapshot| snapshot.tasks.push(task));
    }

    /// Insert a routine or replace the one with the same id
    pub fn upsert_routine(&self, user_id: &str, routine: RoutineRecord) {
        self.mutate(user_id, |snapshot| {
            match snapshot.routines.iter_mut().find(|r| r.id == routine.id) {
                Some(existing) => *existing = routine,
                None => snapshot.routines.push(routine),
            }
        });
    }

    pub fn add_journal_entry(&self, user_id: &str, entry: JournalRecord) {
        self.mutate(user_id, |snapshot| snapshot.journal_entries.push(entry));
    }

    /// Make every fetch fail until cleared with `None`
    pub fn set_failure(&self, failure: Option<FetchError>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = failure;
    }

    fn mutate<F>(&self, user_id: &str, apply: F)
    where
        F: FnOnce(&mut DataSnapshot),
    {
        {
            let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
            let snapshot = users
                .entry(user_id.to_string())
                .or_insert_with(|| DataSnapshot::new(user_id));
            apply(snapshot);
        }
        self.notify_all();
    }

    fn notify_all(&self) {
        let subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for notifier in subscribers {
            notifier.notify();
        }
    }

    fn read<T, F>(&self, user_id: &str, select: F) -> Result<T, FetchError>
    where
        F: FnOnce(&DataSnapshot) -> T,
    {
        if let Some(failure) = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(failure);
        }

        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        users
            .get(user_id)
            .map(select)
            .ok_or_else(|| FetchError::UserNotFound(user_id.to_string()))
    }
}

impl DataSource for MemoryStore {
    fn fetch_tasks(&self, user_id: &str, period: &PeriodSpec) -> Result<Vec<TaskRecord>, FetchError> {
        self.read(user_id, |snapshot| {
            snapshot
                .tasks
                .iter()
                .filter(|t| {
                    period.contains(t.created_at)
                        || t.completion_time().is_some_and(|c| period.contains(c))
                })
                .cloned()
                .collect()
        })
    }

    fn fetch_routines(&self, user_id: &str) -> Result<Vec<RoutineRecord>, FetchError> {
        self.read(user_id, |snapshot| snapshot.routines.clone())
    }

    fn fetch_journal_entries(
        &self,
        user_id: &str,
        period: &PeriodSpec,
    ) -> Result<Vec<JournalRecord>, FetchError> {
        self.read(user_id, |snapshot| {
            snapshot
                .journal_entries
                .iter()
                .filter(|j| period.contains(j.date))
                .cloned()
                .collect()
        })
    }

    fn subscribe(&self, notifier: ChangeNotifier) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notifier);
    }
}
