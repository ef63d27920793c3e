//! Task records and filtering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single to-do item.
///
/// The description is sanitized (control characters stripped, HTML-escaped,
/// capped at 500 chars) before it reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub(crate) fn new(id: u64, description: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            description,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Listing filter. Unrecognized query values fall back to `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    Active,
    Completed,
}

impl TaskFilter {
    /// Parse an optional `?filter=` query value.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("active") => TaskFilter::Active,
            Some("completed") => TaskFilter::Completed,
            _ => TaskFilter::All,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Active => "active",
            TaskFilter::Completed => "completed",
        }
    }
}

/// Task counts by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}
