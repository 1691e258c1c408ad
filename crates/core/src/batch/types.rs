//! Types for the batch module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::ObjectLocation;

/// One remote object to convert and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Identifier echoed back in the result (task ID or object key).
    pub id: String,
    pub source: ObjectLocation,
    pub destination: ObjectLocation,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, source: ObjectLocation, destination: ObjectLocation) -> Self {
        Self {
            id: id.into(),
            source,
            destination,
        }
    }
}

/// Outcome classification reported per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    Succeeded,
    /// Worth retrying (network, throttling, local disk).
    TemporaryFailure,
    /// Retrying will not help (bad input, engine rejection).
    PermanentFailure,
}

impl ResultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "Succeeded",
            Self::TemporaryFailure => "TemporaryFailure",
            Self::PermanentFailure => "PermanentFailure",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    pub code: ResultCode,
    pub message: String,
}

impl ResultRecord {
    pub fn succeeded(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: ResultCode::Succeeded,
            message: message.into(),
        }
    }

    pub fn failed(id: impl Into<String>, code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code,
            message: message.into(),
        }
    }
}

/// Totals for a listing-driven run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Items attempted (folder markers are not counted).
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<ResultRecord>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ResultRecord) {
        self.attempted += 1;
        if record.code.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(record);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Whether every attempted item succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl Default for BatchSummary {
    fn default() -> Self {
        Self::new()
    }
}
