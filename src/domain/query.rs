//! Search, filter and sort pipeline producing the displayed task order.
//!
//! Everything here is a pure read over a task slice. The caller passes the current
//! time explicitly; overdue checks use the calendar day of `now` in its own time zone.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone};
use feruca::Collator;
use thiserror::Error;

use super::task::{Category, Task};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseSelectionError {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
    Overdue,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [Self::All, Self::Completed, Self::Pending, Self::Overdue];

    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.completed,
            Self::Pending => !task.completed,
            Self::Overdue => is_overdue(task, today),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Overdue => "overdue",
        }
    }

    pub fn next(self) -> Self { cycle(&Self::ALL, self) }
}

impl FromStr for StatusFilter {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ParseSelectionError { kind: "status filter", value: s.to_string() })
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: &Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Only(category) => category.as_str(),
        }
    }

    /// All -> each known category -> All.
    pub fn next(&self) -> Self {
        let known = &Category::KNOWN;
        match self {
            Self::All => Self::Only(known[0].clone()),
            Self::Only(current) => match known.iter().position(|c| c == current) {
                Some(i) if i + 1 < known.len() => Self::Only(known[i + 1].clone()),
                _ => Self::All,
            },
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(s: &str) -> Self {
        match s {
            "all" | "" => Self::All,
            other => Self::Only(Category::parse(other)),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    DueDate,
    Category,
    Alphabetical,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [Self::Newest, Self::Oldest, Self::DueDate, Self::Category, Self::Alphabetical];

    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::Oldest => a.created_at.cmp(&b.created_at),
            Self::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Category => a.category.as_str().cmp(b.category.as_str()),
            Self::Alphabetical => locale_cmp(&a.text, &b.text),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::DueDate => "dueDate",
            Self::Category => "category",
            Self::Alphabetical => "alphabetical",
        }
    }

    pub fn next(self) -> Self { cycle(&Self::ALL, self) }
}

impl FromStr for SortKey {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseSelectionError { kind: "sort key", value: s.to_string() })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    let i = all.iter().position(|x| *x == current).unwrap_or(0);
    all[(i + 1) % all.len()]
}

/// The selections a view holds between redraws.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskQuery {
    pub search: String,
    pub status: StatusFilter,
    pub category: CategoryFilter,
    pub sort: SortKey,
}

/// Not completed, has a due date, and that date is strictly before `today`.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due < today)
}

/// Runs search, status filter, category filter, then a stable sort.
pub fn run<'a, Tz: TimeZone>(tasks: &'a [Task], query: &TaskQuery, now: &DateTime<Tz>) -> Vec<&'a Task> {
    let today = now.date_naive();
    let needle = query.search.to_lowercase();
    let mut out: Vec<&Task> = tasks
        .iter()
        .filter(|t| needle.is_empty() || t.text.to_lowercase().contains(&needle))
        .filter(|t| query.status.matches(t, today))
        .filter(|t| query.category.matches(&t.category))
        .collect();
    match query.sort {
        SortKey::Alphabetical => {
            let mut collator = Collator::default();
            out.sort_by(|a, b| collate(&mut collator, &a.text, &b.text));
        }
        key => out.sort_by(|a, b| key.compare(a, b)),
    }
    out
}

/// Unicode Collation Algorithm order (root locale): accents and case only break
/// ties between otherwise equal text, lowercase first.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    collate(&mut Collator::default(), a, b)
}

fn collate(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| b.cmp(a))
}
