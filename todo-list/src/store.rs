//! Whole-list persistence for tasks.
//!
//! The task list is stored as a single JSON snapshot. Every save rewrites the
//! full snapshot; readers never observe a partially written file because the
//! new contents are written to a sibling file first and renamed into place.

use crate::error::Error;
use crate::task::{NewTask, Task, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Ordered tasks plus the counter used to hand out ids.
///
/// Insertion order is display order. Ids are never reused, even after the
/// task that held them is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
    next_id: TaskId,
}

impl Default for TaskList {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskList {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuilds a list from decoded parts.
    ///
    /// Fails when two tasks share an id or an id leaves no room for the counter.
    pub(crate) fn from_parts(next_id: TaskId, tasks: Vec<Task>) -> Result<Self, String> {
        let mut seen = HashSet::with_capacity(tasks.len());
        let mut floor: TaskId = 1;
        for task in &tasks {
            if !seen.insert(task.id()) {
                return Err(format!("duplicate task id {}", task.id()));
            }
            let after = task
                .id()
                .checked_add(1)
                .ok_or_else(|| format!("task id {} is out of range", task.id()))?;
            floor = floor.max(after);
        }
        Ok(Self {
            tasks,
            next_id: next_id.max(floor),
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == id)
    }

    /// Appends a task built from `draft` and returns it.
    ///
    /// The largest id is never handed out, so the counter cannot wrap.
    pub(crate) fn push(&mut self, draft: NewTask, now: DateTime<Utc>) -> Result<&Task, Error> {
        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(Error::IdsExhausted)?;
        self.tasks.push(Task::new(id, draft, now));
        self.next_id = next_id;
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub(crate) fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id() == id)?;
        Some(self.tasks.remove(index))
    }
}

/// Durable storage for the whole task list.
#[cfg_attr(test, mockall::automock)]
pub trait TaskStore {
    /// Reads the persisted list, or an empty list when nothing was saved yet.
    fn load(&self) -> Result<TaskList, Error>;

    /// Replaces the persisted list with `list`.
    fn save(&self, list: &TaskList) -> Result<(), Error>;
}

#[derive(Deserialize)]
struct SnapshotHeader {
    version: u32,
}

#[derive(Deserialize)]
struct Snapshot {
    next_id: TaskId,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    next_id: TaskId,
    tasks: &'a [Task],
}

/// Task store backed by a JSON file on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| OsString::from("tasks.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn decode(&self, contents: &str) -> Result<TaskList, Error> {
        let corrupt = |source| Error::CorruptStore {
            path: self.path.clone(),
            source,
        };
        let header: SnapshotHeader = serde_json::from_str(contents).map_err(corrupt)?;
        if header.version != SNAPSHOT_VERSION {
            return Err(Error::UnsupportedVersion {
                path: self.path.clone(),
                version: header.version,
            });
        }
        let snapshot: Snapshot = serde_json::from_str(contents).map_err(corrupt)?;
        TaskList::from_parts(snapshot.next_id, snapshot.tasks).map_err(|reason| {
            Error::InvalidStore {
                path: self.path.clone(),
                reason,
            }
        })
    }

    fn encode(list: &TaskList) -> serde_json::Result<Vec<u8>> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            next_id: list.next_id(),
            tasks: list.tasks(),
        };
        let mut bytes = serde_json::to_vec_pretty(&snapshot)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn replace_with(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        let written = fs::File::create(&temp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        let result = written.and_then(|()| fs::rename(&temp, &self.path));
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result
    }
}

impl TaskStore for JsonFileStore {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<TaskList, Error> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("No task store found, starting with an empty list");
                return Ok(TaskList::new());
            }
            Err(source) => {
                return Err(Error::StoreRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let list = self.decode(&contents)?;
        debug!(tasks = list.len(), "Loaded task store");
        Ok(list)
    }

    #[tracing::instrument(skip(self, list), fields(path = %self.path.display(), tasks = list.len()))]
    fn save(&self, list: &TaskList) -> Result<(), Error> {
        let write_error = |source| Error::StoreWrite {
            path: self.path.clone(),
            source,
        };
        let bytes = Self::encode(list).map_err(|err| write_error(io::Error::from(err)))?;
        self.replace_with(&bytes).map_err(write_error)?;
        debug!("Saved task store");
        Ok(())
    }
}
