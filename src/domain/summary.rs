use chrono::{DateTime, TimeZone};

use super::query::is_overdue;
use super::task::Task;

/// Counts over the whole, unfiltered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

impl Summary {
    pub fn of<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Self {
        let today = now.date_naive();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let overdue = tasks.iter().filter(|t| is_overdue(t, today)).count();
        Self { total: tasks.len(), completed, pending: tasks.len() - completed, overdue }
    }
}
