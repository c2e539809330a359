//! Revision lists backing history and as-of reads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored state. `state` is `None` for a deletion tombstone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision<T> {
    pub recorded_at: DateTime<Utc>,
    pub state: Option<T>,
}

/// Every revision of one item, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    revisions: Vec<Revision<T>>,
}

impl<T> Versioned<T> {
    pub fn new(initial: T, recorded_at: DateTime<Utc>) -> Self {
        Self {
            revisions: vec![Revision {
                recorded_at,
                state: Some(initial),
            }],
        }
    }

    /// Revision timestamps never go backwards, even if the clock does
    pub fn record(&mut self, state: Option<T>, recorded_at: DateTime<Utc>) {
        let recorded_at = match self.revisions.last() {
            Some(last) if last.recorded_at > recorded_at => last.recorded_at,
            _ => recorded_at,
        };
        self.revisions.push(Revision { recorded_at, state });
    }

    pub fn current(&self) -> Option<&T> {
        self.revisions.last().and_then(|r| r.state.as_ref())
    }

    /// State as of `time`: the latest revision recorded at or before it
    pub fn as_of(&self, time: DateTime<Utc>) -> Option<&T> {
        self.revisions
            .iter()
            .rev()
            .find(|r| r.recorded_at <= time)
            .and_then(|r| r.state.as_ref())
    }

    /// Current state, or the state at `as_of_time` when one is given
    pub fn at(&self, as_of_time: Option<DateTime<Utc>>) -> Option<&T> {
        match as_of_time {
            Some(time) => self.as_of(time),
            None => self.current(),
        }
    }

    pub fn revisions(&self) -> &[Revision<T>] {
        &self.revisions
    }

    pub fn is_deleted(&self) -> bool {
        self.current().is_none()
    }
}
