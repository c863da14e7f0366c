use crate::error::Error;
use crate::model::{NewWorkItem, Task, TaskStatus, WorkItem, WorkItemStatus};
use async_trait::async_trait;

/// Contract of the shared persistent blackboard the agents coordinate
/// through. Implemented by the HTTP client in `wordboard-agents` and by
/// [`crate::memory::MemoryStore`] for tests.
///
/// Guards live at this boundary: workitem creation requires the owning
/// task to be SCHEDULING, word appends are rejected once the task is
/// COMPLETED, and every transition may carry an expected current status so
/// that concurrent agent instances cannot claim the same entity twice.
#[async_trait]
pub trait BlackboardStore: Send + Sync {
    /// Tasks in the given status, or all tasks. An empty result is not an
    /// error.
    async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, Error>;

    async fn get_task(&self, task_id: &str) -> Result<Task, Error>;

    /// Write a task status transition. Fails with
    /// [`Error::StateConflict`] if `expected` is given and no longer
    /// matches, or if the transition would move the status backwards.
    async fn transition_task(
        &self,
        task_id: &str,
        to: TaskStatus,
        expected: Option<TaskStatus>,
        scheduled_items_count: Option<u32>,
    ) -> Result<(), Error>;

    /// Create workitems for a task; the task must currently be SCHEDULING.
    async fn create_workitems(&self, task_id: &str, items: Vec<NewWorkItem>) -> Result<(), Error>;

    async fn list_workitems(&self, status: Option<WorkItemStatus>) -> Result<Vec<WorkItem>, Error>;

    async fn list_workitems_for_task(&self, task_id: &str) -> Result<Vec<WorkItem>, Error>;

    async fn get_workitem(&self, workitem_id: &str) -> Result<WorkItem, Error>;

    async fn transition_workitem(
        &self,
        workitem_id: &str,
        to: WorkItemStatus,
        expected: Option<WorkItemStatus>,
    ) -> Result<(), Error>;

    /// Append a discovered word to a task; rejected once the task is
    /// COMPLETED. Words are never deduplicated.
    async fn append_word(&self, task_id: &str, word: &str) -> Result<(), Error>;
}
