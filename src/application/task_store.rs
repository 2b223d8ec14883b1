//! The single owner of the task collection and of all persistence I/O.

use crate::domain::{
    clock::{Clock, SystemClock},
    error::{StoreError, ValidationError},
    storage::KeyValueStorage,
    task::{NewTask, Task, TaskId, validate_text},
};
use crate::infrastructure::record;

/// Outcome of a mutation plus the outcome of the write that followed it.
/// A failed write does not undo the mutation.
#[derive(Debug)]
pub struct Persisted<T> {
    pub value: T,
    pub write_error: Option<StoreError>,
}

impl<T> Persisted<T> {
    pub fn is_durable(&self) -> bool { self.write_error.is_none() }
}

/// Reads the collection stored under `key`. A missing entry is an empty collection.
pub fn load<S: KeyValueStorage + ?Sized>(storage: &S, key: &str) -> Result<Vec<Task>, StoreError> {
    record::read(storage, key).map_err(|source| StoreError::Read { key: key.to_string(), source })
}

pub struct TaskStore<S: KeyValueStorage> {
    storage: S,
    key: String,
    clock: Box<dyn Clock>,
    tasks: Vec<Task>,
    load_error: Option<StoreError>,
}

impl<S: KeyValueStorage> TaskStore<S> {
    pub fn open(storage: S, key: impl Into<String>) -> Self {
        Self::open_with_clock(storage, key, SystemClock)
    }

    /// Loads the stored collection. An unreadable record is logged and replaced by
    /// an empty collection; the error stays available through [`Self::load_error`].
    pub fn open_with_clock(storage: S, key: impl Into<String>, clock: impl Clock + 'static) -> Self {
        let key = key.into();
        let (tasks, load_error) = match load(&storage, &key) {
            Ok(tasks) => {
                tracing::debug!(%key, count = tasks.len(), "loaded tasks");
                (tasks, None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable task record");
                (Vec::new(), Some(e))
            }
        };
        Self { storage, key, clock: Box::new(clock), tasks, load_error }
    }

    pub fn load_error(&self) -> Option<&StoreError> { self.load_error.as_ref() }

    pub fn storage(&self) -> &S { &self.storage }

    /// Storage order: newest first.
    pub fn tasks(&self) -> &[Task] { &self.tasks }

    pub fn get(&self, id: &TaskId) -> Option<&Task> { self.tasks.iter().find(|t| &t.id == id) }

    pub fn len(&self) -> usize { self.tasks.len() }

    pub fn is_empty(&self) -> bool { self.tasks.is_empty() }

    /// Writes the whole collection. Memory stays authoritative when this fails.
    pub fn save(&mut self) -> Result<(), StoreError> {
        record::write(&mut self.storage, &self.key, &self.tasks).map_err(|source| {
            let e = StoreError::Write { key: self.key.clone(), source };
            tracing::warn!(error = %e, "task collection not persisted");
            e
        })
    }

    pub fn add(&mut self, input: NewTask) -> Result<Persisted<Task>, ValidationError> {
        let text = validate_text(&input.text)?.to_string();
        let now = self.clock.now();
        let task = Task {
            id: TaskId::fresh_for(&self.tasks, now),
            text,
            completed: false,
            category: input.category,
            due_date: input.due_date,
            created_at: now,
            completed_at: None,
        };
        tracing::debug!(id = %task.id, category = %task.category, "task added");
        self.tasks.insert(0, task.clone());
        Ok(self.persist(task))
    }

    /// `None` when no task has `id`; nothing is written in that case.
    pub fn toggle(&mut self, id: &TaskId) -> Option<Persisted<Task>> {
        let now = self.clock.now();
        let task = self.tasks.iter_mut().find(|t| &t.id == id)?;
        task.toggle(now);
        tracing::debug!(%id, completed = task.completed, "task toggled");
        let task = task.clone();
        Some(self.persist(task))
    }

    /// `false` when no task has `id`; nothing is written in that case.
    pub fn remove(&mut self, id: &TaskId) -> Persisted<bool> {
        let Some(idx) = self.tasks.iter().position(|t| &t.id == id) else {
            return Persisted { value: false, write_error: None };
        };
        self.tasks.remove(idx);
        tracing::debug!(%id, "task removed");
        self.persist(true)
    }

    fn persist<T>(&mut self, value: T) -> Persisted<T> {
        Persisted { value, write_error: self.save().err() }
    }
}
