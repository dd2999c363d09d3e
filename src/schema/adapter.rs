//! Adapter for converting snapshot records into normalized `RawEvent`s
//!
//! Tasks, routine steps and journal entries are flattened into one tagged
//! event stream so the rest of the pipeline runs a single aggregation pass
//! instead of one loop per entity type.

use crate::error::ComputeError;
use crate::schema::records::*;
use crate::types::RawEvent;
use chrono::{DateTime, Utc};

/// Adapter for converting records to raw events
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON snapshot document
    pub fn parse_snapshot(json: &str) -> Result<DataSnapshot, ComputeError> {
        serde_json::from_str(json)
            .map_err(|e| ComputeError::ParseError(format!("Failed to parse snapshot: {}", e)))
    }

    /// Parse NDJSON where every line is a complete snapshot (one per user)
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<DataSnapshot>, ComputeError> {
        let mut snapshots = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<DataSnapshot>(trimmed) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(snapshots)
    }

    /// Reject a snapshot with any invalid record
    pub fn ensure_valid(snapshot: &DataSnapshot) -> Result<(), ComputeError> {
        match snapshot.validate().into_iter().next() {
            None => Ok(()),
            Some(issue) => Err(ComputeError::InvalidRecord(format!(
                "{}[{}]: {}",
                issue.collection, issue.index, issue.error
            ))),
        }
    }

    /// Normalize every record into raw events.
    ///
    /// `now` stands in for routine steps that carry no activity timestamp:
    /// the routine's current snapshot is taken as today's activity.
    pub fn to_events(
        tasks: &[TaskRecord],
        routines: &[RoutineRecord],
        journal: &[JournalRecord],
        now: DateTime<Utc>,
    ) -> Vec<RawEvent> {
        let mut events = Vec::with_capacity(tasks.len() + routines.len() + journal.len());

        events.extend(tasks.iter().filter_map(task_event));
        for routine in routines {
            events.extend(routine_events(routine, now));
        }
        events.extend(journal.iter().map(journal_event));

        events
    }

    /// Normalize only the journal entries, in chronological order
    pub fn journal_events(journal: &[JournalRecord]) -> Vec<RawEvent> {
        let mut events: Vec<RawEvent> = journal.iter().map(journal_event).collect();
        events.sort_by_key(|e| e.timestamp());
        events
    }
}

fn task_event(task: &TaskRecord) -> Option<RawEvent> {
    task.completion_time()
        .map(|timestamp| RawEvent::Task { timestamp })
}

fn routine_events(routine: &RoutineRecord, now: DateTime<Utc>) -> Vec<RawEvent> {
    let category = routine.category();
    let fallback = routine.updated_at.unwrap_or(now);

    if routine.steps.is_empty() {
        return if routine.completed {
            vec![RawEvent::RoutineStep {
                timestamp: fallback,
                category,
            }]
        } else {
            Vec::new()
        };
    }

    routine
        .steps
        .iter()
        .filter(|step| step.completed)
        .map(|step| RawEvent::RoutineStep {
            timestamp: step.completed_at.unwrap_or(fallback),
            category,
        })
        .collect()
}

fn journal_event(entry: &JournalRecord) -> RawEvent {
    RawEvent::JournalEntry {
        timestamp: entry.date,
        mood: entry.mood,
        reasons: entry.reasons.clone(),
        tags: entry.tags.clone(),
    }
}
