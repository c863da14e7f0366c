use tracing::{debug, info, warn};
use wordboard_core::model::{NewWorkItem, Task, TaskStatus};
use wordboard_core::store::BlackboardStore;
use wordboard_core::subsequence::tag_letters;
use wordboard_core::Error;

/// One scheduler tick: decompose every NEW task into workitems.
///
/// A transport failure aborts the remainder of the tick; anything else is
/// scoped to the task it happened on.
pub async fn run_scheduler_tick(store: &dyn BlackboardStore) -> Result<(), Error> {
    let tasks = store.list_tasks(Some(TaskStatus::New)).await?;
    for task in tasks {
        match schedule_task(store, &task).await {
            Ok(()) => info!("task {} scheduled", task.id),
            // Another scheduler instance claimed it first.
            Err(Error::StateConflict(_)) => debug!("task {} already claimed", task.id),
            Err(e @ Error::Transport(_)) => return Err(e),
            // Deliberately left in SCHEDULING: stuck tasks stay externally
            // observable instead of being rolled back.
            Err(e) => warn!("failed to schedule task {}: {e}", task.id),
        }
    }
    Ok(())
}

async fn schedule_task(store: &dyn BlackboardStore, task: &Task) -> Result<(), Error> {
    store
        .transition_task(&task.id, TaskStatus::Scheduling, Some(TaskStatus::New), None)
        .await?;

    // One workitem covering the full letter set.
    let items = vec![NewWorkItem {
        current_sequence: String::new(),
        remaining_elements: tag_letters(&task.letters),
    }];
    let count = items.len() as u32;
    store.create_workitems(&task.id, items).await?;

    store
        .transition_task(
            &task.id,
            TaskStatus::Scheduled,
            Some(TaskStatus::Scheduling),
            Some(count),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wordboard_core::memory::MemoryStore;
    use wordboard_core::model::{WorkItem, WorkItemStatus};

    #[tokio::test]
    async fn new_task_becomes_scheduled_with_one_workitem() {
        let store = MemoryStore::new();
        let task = store.create_task("cab");

        run_scheduler_tick(&store).await.unwrap();

        let task = store.get_task(&task.id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Scheduled);
        assert_eq!(task.scheduled_items_count, Some(1));

        let items = store.list_workitems_for_task(&task.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, WorkItemStatus::New);
        assert_eq!(items[0].current_sequence, "");
        assert_eq!(items[0].remaining_elements, tag_letters("cab"));
    }

    #[tokio::test]
    async fn tick_with_no_new_tasks_is_a_noop() {
        let store = MemoryStore::new();
        run_scheduler_tick(&store).await.unwrap();
        assert!(store.list_tasks(None).await.unwrap().is_empty());
    }

    /// Delegates everything to the wrapped store but fails workitem
    /// creation, simulating a broken store mid-schedule.
    struct BrokenWorkItems(MemoryStore);

    #[async_trait]
    impl BlackboardStore for BrokenWorkItems {
        async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, Error> {
            self.0.list_tasks(status).await
        }
        async fn get_task(&self, task_id: &str) -> Result<Task, Error> {
            self.0.get_task(task_id).await
        }
        async fn transition_task(
            &self,
            task_id: &str,
            to: TaskStatus,
            expected: Option<TaskStatus>,
            scheduled_items_count: Option<u32>,
        ) -> Result<(), Error> {
            self.0
                .transition_task(task_id, to, expected, scheduled_items_count)
                .await
        }
        async fn create_workitems(
            &self,
            _task_id: &str,
            _items: Vec<NewWorkItem>,
        ) -> Result<(), Error> {
            Err(Error::Internal("workitem insert failed".into()))
        }
        async fn list_workitems(
            &self,
            status: Option<WorkItemStatus>,
        ) -> Result<Vec<WorkItem>, Error> {
            self.0.list_workitems(status).await
        }
        async fn list_workitems_for_task(&self, task_id: &str) -> Result<Vec<WorkItem>, Error> {
            self.0.list_workitems_for_task(task_id).await
        }
        async fn get_workitem(&self, workitem_id: &str) -> Result<WorkItem, Error> {
            self.0.get_workitem(workitem_id).await
        }
        async fn transition_workitem(
            &self,
            workitem_id: &str,
            to: WorkItemStatus,
            expected: Option<WorkItemStatus>,
        ) -> Result<(), Error> {
            self.0.transition_workitem(workitem_id, to, expected).await
        }
        async fn append_word(&self, task_id: &str, word: &str) -> Result<(), Error> {
            self.0.append_word(task_id, word).await
        }
    }

    #[tokio::test]
    async fn failed_workitem_creation_leaves_task_in_scheduling() {
        let store = BrokenWorkItems(MemoryStore::new());
        let task = store.0.create_task("cab");

        // The tick itself survives; the task is left visibly stuck.
        run_scheduler_tick(&store).await.unwrap();

        let task = store.get_task(&task.id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Scheduling);
        assert!(store
            .list_workitems_for_task(&task.id)
            .await
            .unwrap()
            .is_empty());
    }
}
