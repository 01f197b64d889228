use crate::{
    error::{Error, Result},
    task::{self, Priority, Task, TaskDraft},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Title,
    Description,
    DueDate,
    Priority,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Title, Field::Description, Field::DueDate, Field::Priority];

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::DueDate => "Due date (YYYY-MM-DD)",
            Field::Priority => "Priority",
        }
    }
}

/// Shared create/edit form. `id` is set only when editing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Priority,
    pub focus: Field,
}

impl TaskForm {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            id: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.map(task::format_date).unwrap_or_default(),
            priority: task.priority,
            focus: Field::Title,
        }
    }

    pub fn heading(&self) -> &'static str {
        if self.id.is_some() {
            "Edit task"
        } else {
            "Add task"
        }
    }

    pub fn focus_next(&mut self, direction: isize) {
        let len = Field::ALL.len() as isize;
        let index = Field::ALL.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        self.focus = Field::ALL[(index + direction).rem_euclid(len) as usize];
    }

    /// Text behind the focused field, if it is a text field.
    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Title => Some(&mut self.title),
            Field::Description => Some(&mut self.description),
            Field::DueDate => Some(&mut self.due_date),
            Field::Priority => None,
        }
    }

    pub fn value(&self, field: Field) -> String {
        match field {
            Field::Title => self.title.clone(),
            Field::Description => self.description.clone(),
            Field::DueDate => self.due_date.clone(),
            Field::Priority => self.priority.to_string(),
        }
    }

    /// Title emptiness is left to the board, which owns that rule.
    pub fn draft(&self) -> Result<TaskDraft> {
        let raw_date = self.due_date.trim();
        let due_date = if raw_date.is_empty() {
            None
        } else {
            let date = task::parse_date(raw_date)
                .ok_or_else(|| Error::InvalidDate(raw_date.to_string()))?;
            Some(date)
        };
        Ok(TaskDraft {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            due_date,
            priority: self.priority,
        })
    }
}
