//! View-facing session over a [`TaskStore`]: current selections, the two-phase
//! delete protocol, and toast-style feedback for every mutating request.

use chrono::{DateTime, TimeZone};

use crate::application::task_store::{Persisted, TaskStore};
use crate::domain::{
    error::ValidationError,
    query::{self, TaskQuery},
    storage::KeyValueStorage,
    summary::Summary,
    task::{NewTask, Task, TaskId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    fn new(level: Level, message: impl Into<String>) -> Self { Self { level, message: message.into() } }

    /// Downgrades a success to a warning when the write behind it failed.
    fn after_write<T>(persisted: &Persisted<T>, message: &str) -> Self {
        match &persisted.write_error {
            None => Self::new(Level::Success, message),
            Some(e) if e.is_quota_exceeded() => {
                Self::new(Level::Warning, format!("{message}, but storage is full; it will be lost on exit"))
            }
            Some(e) => Self::new(Level::Warning, format!("{message}, but it could not be saved: {e}")),
        }
    }
}

impl From<&ValidationError> for Notice {
    fn from(e: &ValidationError) -> Self { Self::new(Level::Error, e.to_string()) }
}

pub struct TaskList<S: KeyValueStorage> {
    store: TaskStore<S>,
    query: TaskQuery,
    pending_delete: Option<TaskId>,
}

impl<S: KeyValueStorage> TaskList<S> {
    pub fn new(store: TaskStore<S>) -> Self { Self { store, query: TaskQuery::default(), pending_delete: None } }

    pub fn store(&self) -> &TaskStore<S> { &self.store }

    pub fn query(&self) -> &TaskQuery { &self.query }

    pub fn query_mut(&mut self) -> &mut TaskQuery { &mut self.query }

    /// Non-blocking notice for a record that could not be read at startup.
    pub fn startup_notice(&self) -> Option<Notice> {
        self.store
            .load_error()
            .map(|_| Notice::new(Level::Info, "Saved tasks could not be read; starting with an empty list"))
    }

    pub fn visible<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<&Task> {
        query::run(self.store.tasks(), &self.query, now)
    }

    pub fn summary<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Summary { Summary::of(self.store.tasks(), now) }

    pub fn add(&mut self, input: NewTask) -> Result<Notice, ValidationError> {
        let persisted = self.store.add(input)?;
        Ok(Notice::after_write(&persisted, "Task added"))
    }

    /// Raw form fields in, validation surfaced as an error-level notice.
    pub fn submit_form(&mut self, text: &str, category: &str, due_date: &str) -> Notice {
        match NewTask::from_form(text, category, due_date).and_then(|input| self.add(input)) {
            Ok(notice) => notice,
            Err(e) => Notice::from(&e),
        }
    }

    /// `None` for an id that vanished; stale view state is not an error.
    pub fn toggle(&mut self, id: &TaskId) -> Option<Notice> {
        let persisted = self.store.toggle(id)?;
        let message = if persisted.value.completed { "Task completed" } else { "Task marked as pending" };
        Some(Notice::after_write(&persisted, message))
    }

    /// First phase of a delete. Returns `false` when the task does not exist.
    pub fn request_delete(&mut self, id: &TaskId) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        self.pending_delete = Some(id.clone());
        true
    }

    pub fn pending_delete(&self) -> Option<&TaskId> { self.pending_delete.as_ref() }

    /// Abandons a requested delete without touching the collection.
    pub fn cancel_delete(&mut self) -> bool { self.pending_delete.take().is_some() }

    /// Second phase: removes the task chosen by [`Self::request_delete`].
    pub fn confirm_delete(&mut self) -> Option<Notice> {
        let id = self.pending_delete.take()?;
        let persisted = self.store.remove(&id);
        persisted.value.then(|| Notice::after_write(&persisted, "Task deleted"))
    }
}
