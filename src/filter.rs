use std::fmt;

use chrono::NaiveDate;

use crate::task::{Priority, Status, Task};

/// A filter value, or the "all" wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: PartialEq + Copy> Choice<T> {
    pub fn accepts(&self, value: T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => *wanted == value,
        }
    }

    /// Steps through `All` followed by each of `options` in order.
    pub fn cycled(self, options: &[T]) -> Self {
        let next = match self {
            Choice::All => 0,
            Choice::Only(current) => match options.iter().position(|o| *o == current) {
                Some(index) => index + 1,
                None => 0,
            },
        };
        options.get(next).copied().map_or(Choice::All, Choice::Only)
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str("all"),
            Choice::Only(value) => value.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub search: String,
    pub status: Choice<Status>,
    pub priority: Choice<Priority>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
}

impl Filters {
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_text(task)
            && self.status.accepts(task.status)
            && self.priority.accepts(task.priority)
            && self.due_from.map_or(true, |from| task.due_date.is_some_and(|due| due >= from))
            && self.due_to.map_or(true, |to| task.due_date.is_some_and(|due| due <= to))
    }

    fn matches_text(&self, task: &Task) -> bool {
        let query = self.search.trim().to_lowercase();
        query.is_empty()
            || task.title.to_lowercase().contains(&query)
            || task.description.to_lowercase().contains(&query)
    }

    /// Matching tasks in their original order.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty()
            || self.status != Choice::All
            || self.priority != Choice::All
            || self.due_from.is_some()
            || self.due_to.is_some()
    }
}
