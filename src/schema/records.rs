//! focuspro.snapshot.v1 record definitions
//!
//! The shapes returned by the data-access collaborator: tasks, routines with
//! their steps, and mood-journal entries. A `DataSnapshot` bundles all three
//! for one user and is the input format of the CLI and the FFI.

use crate::types::{Mood, RoutineCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current snapshot schema version
pub const SCHEMA_VERSION: &str = "focuspro.snapshot.v1";

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Paused,
    Blocked,
    Canceled,
    Deferred,
}

impl TaskStatus {
    /// Only `completed` counts as a finished micro-unit
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

/// A task as stored by the data layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    /// When the task reached `completed`; older rows only have `updated_at`
    #[serde(default, alias = "updated_at", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Instant the task counts as completed at, if it is completed
    pub fn completion_time(&self) -> Option<DateTime<Utc>> {
        if self.status.is_completed() {
            Some(self.completed_at.unwrap_or(self.created_at))
        } else {
            None
        }
    }
}

/// A single checklist step of a routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineStepRecord {
    pub id: String,
    #[serde(default)]
    pub completed: bool,
    /// When the step was toggled to completed, if the data layer tracks it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A routine with its current step snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Free-form category label (morning, afternoon, night, health, ...)
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub steps: Vec<RoutineStepRecord>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RoutineRecord {
    pub fn category(&self) -> RoutineCategory {
        RoutineCategory::from_label(&self.category)
    }

    /// Possible micro-units: one per step, or one for a step-less routine
    pub fn slot_count(&self) -> u32 {
        (self.steps.len() as u32).max(1)
    }

    /// Completed micro-units under the same slot rule
    pub fn completed_slots(&self) -> u32 {
        if self.steps.is_empty() {
            u32::from(self.completed)
        } else {
            self.steps.iter().filter(|s| s.completed).count() as u32
        }
    }
}

/// A mood-journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub mood: Mood,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// All records of one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub routines: Vec<RoutineRecord>,
    #[serde(default)]
    pub journal_entries: Vec<JournalRecord>,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl DataSnapshot {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn record_count(&self) -> usize {
        self.tasks.len() + self.routines.len() + self.journal_entries.len()
    }

    /// Validate the snapshot and every record in it
    pub fn validate(&self) -> Vec<RecordIssue> {
        let mut issues = Vec::new();

        if self.schema_version != SCHEMA_VERSION {
            issues.push(RecordIssue {
                collection: "snapshot",
                index: 0,
                id: None,
                error: ValidationError::InvalidSchemaVersion {
                    expected: SCHEMA_VERSION.to_string(),
                    actual: self.schema_version.clone(),
                },
            });
        }

        for (index, task) in self.tasks.iter().enumerate() {
            if let Err(error) = task.validate() {
                issues.push(RecordIssue::new("tasks", index, &task.id, error));
            }
        }
        for (index, routine) in self.routines.iter().enumerate() {
            if let Err(error) = routine.validate() {
                issues.push(RecordIssue::new("routines", index, &routine.id, error));
            }
        }
        for (index, entry) in self.journal_entries.iter().enumerate() {
            if let Err(error) = entry.validate() {
                issues.push(RecordIssue::new("journal_entries", index, &entry.id, error));
            }
        }

        issues
    }
}

impl TaskRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(&self.id)?;
        if let Some(done) = self.completed_at {
            if done < self.created_at {
                return Err(ValidationError::CompletedBeforeCreated {
                    created_at: self.created_at,
                    completed_at: done,
                });
            }
        }
        Ok(())
    }
}

impl RoutineRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(&self.id)?;
        for step in &self.steps {
            require_id(&step.id)?;
            if step.completed_at.is_some() && !step.completed {
                return Err(ValidationError::StepTimestampWithoutCompletion(step.id.clone()));
            }
        }
        Ok(())
    }
}

impl JournalRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(&self.id)?;
        if self.reasons.iter().chain(self.tags.iter()).any(|l| l.trim().is_empty()) {
            return Err(ValidationError::BlankLabel(self.id.clone()));
        }
        Ok(())
    }
}

fn require_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        Err(ValidationError::MissingId)
    } else {
        Ok(())
    }
}

/// Validation errors for snapshot records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Record id is missing or blank")]
    MissingId,

    #[error("Task completed at {completed_at} before it was created at {created_at}")]
    CompletedBeforeCreated {
        created_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },

    #[error("Routine step {0} has a completion time but is not completed")]
    StepTimestampWithoutCompletion(String),

    #[error("Journal entry {0} has a blank reason or tag")]
    BlankLabel(String),
}

/// A validation failure located within a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct RecordIssue {
    pub collection: &'static str,
    pub index: usize,
    pub id: Option<String>,
    pub error: ValidationError,
}

impl RecordIssue {
    fn new(collection: &'static str, index: usize, id: &str, error: ValidationError) -> Self {
        Self {
            collection,
            index,
            id: if id.is_empty() { None } else { Some(id.to_string()) },
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_deserialize_snapshot() {
        let json = r#"{
            "user_id": "user-1",
            "tasks": [
                { "id": "t1", "status": "completed", "created_at": "2024-03-04T09:00:00Z", "updated_at": "2024-03-05T10:00:00Z" },
                { "id": "t2", "status": "in_progress", "created_at": "2024-03-04T09:00:00Z" }
            ],
            "routines": [
                { "id": "r1", "title": "Rotina Matinal", "category": "morning",
                  "steps": [ { "id": "s1", "completed": true }, { "id": "s2", "completed": false } ] }
            ],
            "journal_entries": [
                { "id": "j1", "date": "2024-03-04T20:00:00Z", "mood": "good", "reasons": ["Dormi bem"], "tags": ["Sono"] }
            ]
        }"#;

        let snapshot: DataSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.schema_version, SCHEMA_VERSION);
        assert_eq!(snapshot.record_count(), 4);
        assert_eq!(snapshot.tasks[0].completed_at, Some(ts(5, 10)));
        assert_eq!(snapshot.tasks[1].status, TaskStatus::InProgress);
        assert_eq!(snapshot.routines[0].category(), RoutineCategory::Morning);
        assert_eq!(snapshot.journal_entries[0].mood, Mood::Good);
        assert!(snapshot.validate().is_empty());
    }

    #[test]
    fn test_task_completion_time() {
        let mut task = TaskRecord {
            id: "t1".to_string(),
            status: TaskStatus::Completed,
            created_at: ts(4, 9),
            completed_at: None,
        };
        assert_eq!(task.completion_time(), Some(ts(4, 9)));

        task.completed_at = Some(ts(6, 18));
        assert_eq!(task.completion_time(), Some(ts(6, 18)));

        task.status = TaskStatus::Canceled;
        assert_eq!(task.completion_time(), None);
    }

    #[test]
    fn test_routine_slots() {
        let empty = RoutineRecord {
            id: "r1".to_string(),
            title: String::new(),
            category: "night".to_string(),
            steps: vec![],
            completed: true,
            updated_at: None,
        };
        assert_eq!(empty.slot_count(), 1);
        assert_eq!(empty.completed_slots(), 1);

        let stepped = RoutineRecord {
            steps: vec![
                RoutineStepRecord { id: "a".to_string(), completed: true, completed_at: None },
                RoutineStepRecord { id: "b".to_string(), completed: false, completed_at: None },
                RoutineStepRecord { id: "c".to_string(), completed: true, completed_at: None },
            ],
            completed: false,
            ..empty
        };
        assert_eq!(stepped.slot_count(), 3);
        assert_eq!(stepped.completed_slots(), 2);
    }

    #[test]
    fn test_validation_issues() {
        let mut snapshot = DataSnapshot::new("user-1");
        snapshot.tasks.push(TaskRecord {
            id: "t1".to_string(),
            status: TaskStatus::Completed,
            created_at: ts(5, 9),
            completed_at: Some(ts(4, 9)),
        });
        snapshot.journal_entries.push(JournalRecord {
            id: "".to_string(),
            date: ts(5, 20),
            mood: Mood::Bad,
            reasons: vec![],
            tags: vec![],
        });

        let issues = snapshot.validate();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].collection, "tasks");
        assert!(matches!(issues[0].error, ValidationError::CompletedBeforeCreated { .. }));
        assert_eq!(issues[1].collection, "journal_entries");
        assert_eq!(issues[1].id, None);
        assert_eq!(issues[1].error, ValidationError::MissingId);
    }
}
