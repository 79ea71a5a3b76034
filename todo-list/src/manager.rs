use crate::error::{Error, ValidationError};
use crate::store::{TaskList, TaskStore};
use crate::task::{NewTask, Task, TaskId};
use chrono::Utc;
use tracing::{info, warn};

/// The only mutation surface over the task list.
///
/// Every mutating operation is staged on a copy of the list, saved through the
/// store, and only then becomes the in-memory list. A failed save therefore
/// leaves memory exactly as it was before the call.
pub struct TaskManager<S: TaskStore> {
    store: S,
    list: TaskList,
}

impl<S: TaskStore> TaskManager<S> {
    /// Loads the persisted list from `store`.
    pub fn open(store: S) -> Result<Self, Error> {
        let list = store.load()?;
        Ok(Self { store, list })
    }

    /// Current tasks in display order.
    pub fn tasks(&self) -> &[Task] {
        self.list.tasks()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.list.get(id)
    }

    /// Adds a new, not yet completed task.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::EmptyTitle`] if the title is empty or whitespace, nothing is saved.
    /// * [`Error::StoreWrite`] if the snapshot cannot be written.
    #[tracing::instrument(skip(self))]
    pub fn add(&mut self, draft: NewTask) -> Result<Task, Error> {
        let title = validated_title(&draft.title)?;
        let mut next = self.list.clone();
        let task = next.push(NewTask { title, ..draft }, Utc::now())?.clone();
        self.commit(next)?;
        info!(id = task.id(), "Task added");
        Ok(task)
    }

    /// Replaces the title and description of a task.
    ///
    /// The title is held to the same rule as [`TaskManager::add`].
    #[tracing::instrument(skip(self))]
    pub fn edit(&mut self, id: TaskId, new_title: &str, new_description: &str) -> Result<Task, Error> {
        let title = validated_title(new_title)?;
        let mut next = self.list.clone();
        let task = next.get_mut(id).ok_or(Error::TaskNotFound(id))?;
        task.rewrite(title, new_description.to_string(), Utc::now());
        let task = task.clone();
        self.commit(next)?;
        info!(id, "Task edited");
        Ok(task)
    }

    /// Removes a task. Callers are expected to have confirmed the deletion with the user.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: TaskId) -> Result<Task, Error> {
        let mut next = self.list.clone();
        let task = next.remove(id).ok_or(Error::TaskNotFound(id))?;
        self.commit(next)?;
        info!(id, "Task deleted");
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    pub fn toggle_completion(&mut self, id: TaskId) -> Result<Task, Error> {
        let mut next = self.list.clone();
        let task = next.get_mut(id).ok_or(Error::TaskNotFound(id))?;
        task.toggle(Utc::now());
        let task = task.clone();
        self.commit(next)?;
        info!(id, completed = task.is_completed(), "Task toggled");
        Ok(task)
    }

    fn commit(&mut self, next: TaskList) -> Result<(), Error> {
        self.store.save(&next)?;
        self.list = next;
        Ok(())
    }
}

fn validated_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        warn!("Rejected task with empty title");
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}
