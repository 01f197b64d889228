use crate::{
    error::{Error, Result},
    filter::Filters,
    store::{Storage, TaskStore},
    task::{self, Priority, Status, Task, TaskDraft},
};

/// In-memory tasks mirrored to storage after every mutation.
#[derive(Debug)]
pub struct KanbanBoard<S> {
    tasks: Vec<Task>,
    store: TaskStore<S>,
    filters: Filters,
    pending_delete: Option<String>,
}

impl<S: Storage> KanbanBoard<S> {
    /// Loads the stored collection, seeding example tasks when it is empty.
    pub fn open(store: TaskStore<S>) -> Result<Self> {
        let tasks = store.load();
        let mut board = Self {
            tasks,
            store,
            filters: Filters::default(),
            pending_delete: None,
        };
        if board.tasks.is_empty() {
            board.seed()?;
        }
        tracing::info!(count = board.tasks.len(), "Board opened");
        Ok(board)
    }

    fn seed(&mut self) -> Result<()> {
        let now = task::now();
        let tasks = vec![
            Task::new("Plan weekly schedule", now).with_description("Outline priorities"),
            Task::new("Buy groceries", now)
                .with_description("Milk, eggs, bread")
                .with_priority(Priority::Low)
                .with_status(Status::InProgress),
            Task::new("Submit assignment", now)
                .with_description("Task management web app")
                .with_priority(Priority::High)
                .with_status(Status::Completed)
                .with_due_date(Some(now.date_naive())),
        ];
        tracing::info!("Seeding example tasks");
        self.commit(tasks)
    }

    /// Saves `tasks` and adopts them. A failed save leaves the board as it was.
    fn commit(&mut self, tasks: Vec<Task>) -> Result<()> {
        self.store.save(&tasks).inspect_err(|err| {
            tracing::error!("Failed to save tasks: {err}");
        })?;
        self.tasks = tasks;
        Ok(())
    }

    /// Replaces the task with the draft's id in place, or prepends a new one.
    /// Returns the id of the saved task.
    pub fn upsert(&mut self, draft: TaskDraft) -> Result<String> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }

        let now = task::now();
        let id = draft
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(task::new_id);
        let existing = self.tasks.iter().position(|t| t.id == id);
        let (status, created_at) = match existing {
            Some(index) => (self.tasks[index].status, self.tasks[index].created_at),
            None => (Status::Todo, now),
        };

        let task = Task {
            id: id.clone(),
            title: title.to_string(),
            description: draft.description.trim().to_string(),
            due_date: draft.due_date,
            priority: draft.priority,
            status,
            created_at,
            updated_at: now,
        };
        let mut tasks = self.tasks.clone();
        match existing {
            Some(index) => tasks[index] = task,
            None => tasks.insert(0, task),
        }
        self.commit(tasks)?;
        match existing {
            Some(_) => tracing::info!(%id, "Updated task"),
            None => tracing::info!(%id, "Created task"),
        }
        Ok(id)
    }

    /// Returns whether a task was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let tasks = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.commit(tasks)?;
        tracing::info!(%id, "Removed task");
        Ok(true)
    }

    /// Returns whether a task with `id` exists.
    pub fn change_status(&mut self, id: &str, status: Status) -> Result<bool> {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        let mut tasks = self.tasks.clone();
        tasks[index].status = status;
        tasks[index].updated_at = task::now();
        self.commit(tasks)?;
        tracing::info!(%id, %status, "Changed status");
        Ok(true)
    }

    /// First step of a delete. Replaces any earlier pending request.
    pub fn request_delete(&mut self, id: &str) {
        self.pending_delete = Some(id.to_string());
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Removes the pending task, if any.
    pub fn confirm_delete(&mut self) -> Result<bool> {
        match self.pending_delete.take() {
            Some(id) => self.remove(&id),
            None => Ok(false),
        }
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut Filters {
        &mut self.filters
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// Filtered tasks partitioned into lanes, rebuilt from scratch.
    pub fn lanes(&self) -> Lanes {
        let mut lanes = Lanes::default();
        for task in self.filters.apply(&self.tasks) {
            lanes.lanes[task.status.index()].push(Card::from(task));
        }
        lanes
    }
}

#[derive(Debug, Default)]
pub struct Lanes {
    lanes: [Vec<Card>; 3],
}

impl Lanes {
    pub fn get(&self, status: Status) -> &[Card] {
        &self.lanes[status.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Status, &[Card])> {
        Status::ALL
            .into_iter()
            .map(move |status| (status, self.get(status)))
    }
}

/// Display data for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    pub priority: Priority,
    pub badge: &'static str,
    pub badge_class: String,
    pub title: String,
    pub description: String,
    pub due_label: String,
    pub status: Status,
}

impl From<&Task> for Card {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            priority: task.priority,
            badge: task.priority.as_str(),
            badge_class: task.priority.badge_class(),
            title: task.title.clone(),
            description: task.description.clone(),
            due_label: match task.due_date {
                Some(date) => format!("Due: {}", task::format_date(date)),
                None => "No due date".to_string(),
            },
            status: task.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        filter::Choice,
        store::{FlakyStorage, MemoryStorage, STORAGE_KEY},
    };

    fn seeded_storage(tasks: &[Task]) -> MemoryStorage {
        let mut storage = MemoryStorage::default();
        storage
            .set(STORAGE_KEY, &serde_json::to_string(tasks).unwrap())
            .unwrap();
        storage
    }

    fn board_with(tasks: &[Task]) -> KanbanBoard<MemoryStorage> {
        KanbanBoard::open(TaskStore::new(seeded_storage(tasks))).unwrap()
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            ..TaskDraft::default()
        }
    }

    fn lane_titles(board: &KanbanBoard<MemoryStorage>, status: Status) -> Vec<String> {
        board
            .lanes()
            .get(status)
            .iter()
            .map(|c| c.title.clone())
            .collect()
    }

    #[test]
    fn empty_storage_is_seeded_once() {
        let board = KanbanBoard::open(TaskStore::new(MemoryStorage::default())).unwrap();
        assert_eq!(board.tasks().len(), 3);
        for status in Status::ALL {
            assert_eq!(board.lanes().get(status).len(), 1);
        }
        assert_eq!(board.store().load(), board.tasks());

        let reopened = KanbanBoard::open(TaskStore::new(board.store().storage().clone())).unwrap();
        assert_eq!(reopened.tasks(), board.tasks());
    }

    #[test]
    fn existing_tasks_are_not_reseeded() {
        let task = Task::new("Only one", task::now());
        let board = board_with(std::slice::from_ref(&task));
        assert_eq!(board.tasks(), [task]);
    }

    #[test]
    fn null_description_keeps_stored_tasks() {
        let mut storage = MemoryStorage::default();
        let raw = r#"[{"id":"keep-me","title":"Real work","description":null,
            "dueDate":"","priority":"medium","status":"todo","createdAt":1,"updatedAt":1}]"#;
        storage.set(STORAGE_KEY, raw).unwrap();
        let board = KanbanBoard::open(TaskStore::new(storage)).unwrap();
        let titles: Vec<_> = board.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Real work"]);
        assert!(board.get("keep-me").is_some());
    }

    #[test]
    fn failed_save_leaves_board_untouched() {
        let now = task::now();
        let tasks = [Task::new("A", now), Task::new("B", now)];
        let mut storage = FlakyStorage::default();
        storage
            .set(STORAGE_KEY, &serde_json::to_string(&tasks).unwrap())
            .unwrap();
        let fail_writes = storage.write_switch();
        let mut board = KanbanBoard::open(TaskStore::new(storage)).unwrap();
        fail_writes.set(true);

        assert!(matches!(board.upsert(draft("C")), Err(Error::Io(_))));
        assert!(board.change_status(&tasks[0].id, Status::Completed).is_err());
        board.request_delete(&tasks[1].id);
        assert!(board.confirm_delete().is_err());

        assert_eq!(board.tasks(), tasks);
        assert_eq!(board.store().load(), tasks);
    }

    #[test]
    fn malformed_storage_opens_like_empty_storage() {
        let mut storage = MemoryStorage::default();
        storage.set(STORAGE_KEY, "<<garbage>>").unwrap();
        let board = KanbanBoard::open(TaskStore::new(storage)).unwrap();
        assert_eq!(board.tasks().len(), 3);
    }

    #[test]
    fn upsert_prepends_new_tasks() {
        let mut board = board_with(&[Task::new("Old", task::now())]);
        let id = board
            .upsert(TaskDraft {
                title: "  New  ".into(),
                description: " details ".into(),
                priority: Priority::High,
                ..TaskDraft::default()
            })
            .unwrap();

        let first = &board.tasks()[0];
        assert_eq!(first.id, id);
        assert_eq!(first.title, "New");
        assert_eq!(first.description, "details");
        assert_eq!(first.status, Status::Todo);
        assert_eq!(first.created_at, first.updated_at);
        assert_eq!(board.tasks()[1].title, "Old");
        assert_eq!(board.store().load(), board.tasks());
    }

    #[test]
    fn upsert_replaces_in_place_keeping_status_and_creation_time() {
        let now = task::now();
        let tasks = [
            Task::new("A", now),
            Task::new("B", now).with_status(Status::InProgress),
            Task::new("C", now),
        ];
        let mut board = board_with(&tasks);
        let target = tasks[1].id.clone();

        let edit = TaskDraft {
            id: Some(target.clone()),
            title: "B edited".into(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 2),
            priority: Priority::Low,
            ..TaskDraft::default()
        };
        board.upsert(edit.clone()).unwrap();
        board.upsert(edit).unwrap();

        let titles: Vec<_> = board.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["A", "B edited", "C"]);
        let stored = board.store().load();
        let matching: Vec<_> = stored.iter().filter(|t| t.id == target).collect();
        assert_eq!(matching.len(), 1);
        let edited = matching[0];
        assert_eq!(edited.status, Status::InProgress);
        assert_eq!(edited.created_at, tasks[1].created_at);
        assert_eq!(edited.priority, Priority::Low);
        assert_eq!(edited.due_date, NaiveDate::from_ymd_opt(2025, 1, 2));
        assert!(edited.updated_at >= edited.created_at);
    }

    #[test]
    fn upsert_with_blank_title_changes_nothing() {
        let existing = Task::new("Keep", task::now());
        let mut board = board_with(std::slice::from_ref(&existing));
        let before = board.store().storage().get(STORAGE_KEY).unwrap();

        let err = board.upsert(draft("   ")).unwrap_err();
        assert!(matches!(err, Error::EmptyTitle));

        let err = board
            .upsert(TaskDraft {
                id: Some(existing.id.clone()),
                ..draft("")
            })
            .unwrap_err();
        assert!(matches!(err, Error::EmptyTitle));

        assert_eq!(board.tasks(), [existing]);
        assert_eq!(board.store().storage().get(STORAGE_KEY).unwrap(), before);
    }

    #[test]
    fn remove_filters_out_the_task() {
        let now = task::now();
        let tasks = [Task::new("A", now), Task::new("B", now)];
        let mut board = board_with(&tasks);

        assert!(board.remove(&tasks[0].id).unwrap());
        assert!(board.store().load().iter().all(|t| t.id != tasks[0].id));
        assert_eq!(board.tasks().len(), 1);
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let tasks = [Task::new("A", task::now())];
        let mut board = board_with(&tasks);
        assert!(!board.remove("missing").unwrap());
        assert_eq!(board.tasks(), tasks);
        assert_eq!(board.store().load(), tasks);
    }

    #[test]
    fn change_status_moves_between_lanes() {
        let task = Task::new("Move me", task::now());
        let mut board = board_with(std::slice::from_ref(&task));

        assert!(board.change_status(&task.id, Status::Completed).unwrap());
        assert!(lane_titles(&board, Status::Todo).is_empty());
        assert_eq!(lane_titles(&board, Status::Completed), ["Move me"]);

        let stored = board.store().load();
        assert_eq!(stored[0].status, Status::Completed);
        assert!(stored[0].updated_at >= task.updated_at);

        assert!(!board.change_status("missing", Status::Todo).unwrap());
    }

    #[test]
    fn delete_needs_confirmation() {
        let now = task::now();
        let tasks = [Task::new("A", now), Task::new("B", now)];
        let mut board = board_with(&tasks);

        board.request_delete(&tasks[0].id);
        assert_eq!(board.pending_delete(), Some(tasks[0].id.as_str()));
        assert_eq!(board.tasks().len(), 2);

        board.cancel_delete();
        assert_eq!(board.pending_delete(), None);
        assert!(!board.confirm_delete().unwrap());
        assert_eq!(board.tasks().len(), 2);

        board.request_delete(&tasks[0].id);
        board.request_delete(&tasks[1].id);
        assert!(board.confirm_delete().unwrap());
        assert_eq!(board.pending_delete(), None);
        let remaining: Vec<_> = board.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(remaining, ["A"]);
    }

    #[test]
    fn lanes_follow_filters_and_keep_order() {
        let now = task::now();
        let tasks = [
            Task::new("alpha one", now),
            Task::new("beta", now).with_status(Status::Completed),
            Task::new("alpha two", now),
        ];
        let mut board = board_with(&tasks);
        assert_eq!(lane_titles(&board, Status::Todo), ["alpha one", "alpha two"]);

        board.filters_mut().search = "ALPHA".into();
        board.filters_mut().status = Choice::Only(Status::Todo);
        assert_eq!(lane_titles(&board, Status::Todo), ["alpha one", "alpha two"]);
        assert!(lane_titles(&board, Status::Completed).is_empty());

        board.filters_mut().clear();
        assert_eq!(lane_titles(&board, Status::Completed), ["beta"]);
    }

    #[test]
    fn card_labels() {
        let now = task::now();
        let dated = Task::new("Dated", now)
            .with_priority(Priority::High)
            .with_due_date(NaiveDate::from_ymd_opt(2024, 12, 24));
        let card = Card::from(&dated);
        assert_eq!(card.badge, "high");
        assert_eq!(card.badge_class, "priority-high");
        assert_eq!(card.due_label, "Due: 2024-12-24");

        let card = Card::from(&Task::new("Undated", now));
        assert_eq!(card.due_label, "No due date");
        assert_eq!(card.badge, "medium");
    }

    #[test]
    fn create_move_delete_scenario() {
        let mut board = board_with(&[Task::new("Existing", task::now())]);
        let id = board
            .upsert(TaskDraft {
                title: "Test".into(),
                priority: Priority::High,
                ..TaskDraft::default()
            })
            .unwrap();
        assert_eq!(lane_titles(&board, Status::Todo), ["Test", "Existing"]);
        assert!(lane_titles(&board, Status::InProgress).is_empty());
        assert!(lane_titles(&board, Status::Completed).is_empty());

        board.change_status(&id, Status::Completed).unwrap();
        assert_eq!(lane_titles(&board, Status::Todo), ["Existing"]);
        assert_eq!(lane_titles(&board, Status::Completed), ["Test"]);

        board.request_delete(&id);
        assert!(board.get(&id).is_some());
        board.confirm_delete().unwrap();
        for status in Status::ALL {
            assert!(!lane_titles(&board, status).contains(&"Test".to_string()));
        }
        assert!(board.store().load().iter().all(|t| t.id != id));
    }
}
