use crate::types::{Interview, NewInterview, NewTask, Task, TaskStatus};

pub trait StorageRead {
    fn list_tasks(&self) -> anyhow::Result<Vec<Task>>;
    fn load_task(&self, id: i64) -> anyhow::Result<Option<Task>>;
    fn list_interviews(&self) -> anyhow::Result<Vec<Interview>>;
    fn load_interview(&self, id: i64) -> anyhow::Result<Option<Interview>>;
}

pub trait StorageWrite {
    /// Stores `task` under a fresh id, stamped with the current time.
    fn insert_task(&self, task: NewTask) -> anyhow::Result<Task>;

    /// Overwrites only the status. `Ok(None)` means no task has that id.
    fn update_task_status(&self, id: i64, status: TaskStatus) -> anyhow::Result<Option<Task>>;

    fn insert_interview(&self, interview: NewInterview) -> anyhow::Result<Interview>;
}

pub trait Storage: StorageRead + StorageWrite {}

impl<T: StorageRead + StorageWrite> Storage for T {}
