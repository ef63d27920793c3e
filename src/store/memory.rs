//! The in-memory task store.

use std::sync::Mutex;

use chrono::Utc;

use crate::store::task::{Task, TaskCounts, TaskFilter};

struct StoreInner {
    tasks: Vec<Task>,
    next_id: u64,
}

/// Ordered in-memory task collection.
///
/// All operations take the lock for their full scan-then-mutate sequence,
/// so concurrent handlers never observe a partially applied change.
pub struct TaskStore {
    inner: Mutex<StoreInner>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                tasks: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Append a new task. The description must already be validated and
    /// sanitized by the caller.
    pub fn add(&self, description: String) -> Task {
        let mut inner = self.inner.lock().expect("task store mutex poisoned");

        let task = Task::new(inner.next_id, description);
        inner.next_id += 1;
        inner.tasks.push(task.clone());
        task
    }

    /// Look up a task by id.
    pub fn get(&self, id: u64) -> Option<Task> {
        let inner = self.inner.lock().expect("task store mutex poisoned");
        inner.tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Snapshot of all tasks matching the filter, in insertion order.
    pub fn list(&self, filter: TaskFilter) -> Vec<Task> {
        let inner = self.inner.lock().expect("task store mutex poisoned");
        inner
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    /// Flip a task's completion state.
    ///
    /// Returns the new `completed` value, or `None` if the id is unknown.
    pub fn toggle(&self, id: u64) -> Option<bool> {
        let mut inner = self.inner.lock().expect("task store mutex poisoned");

        let task = inner.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        task.updated_at = Utc::now();
        Some(task.completed)
    }

    /// Remove a task. Returns false if the id is unknown.
    pub fn delete(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().expect("task store mutex poisoned");

        match inner.tasks.iter().position(|t| t.id == id) {
            Some(index) => {
                inner.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Task counts by status.
    pub fn counts(&self) -> TaskCounts {
        let inner = self.inner.lock().expect("task store mutex poisoned");

        let total = inner.tasks.len();
        let completed = inner.tasks.iter().filter(|t| t.completed).count();
        TaskCounts {
            total,
            active: total - completed,
            completed,
        }
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
