use tracing::{info, warn};
use wordboard_core::model::{TaskStatus, WorkItemStatus};
use wordboard_core::store::BlackboardStore;
use wordboard_core::Error;

/// One watcher tick: two independent sweeps that advance task status from
/// what the workitems say. Both writes are idempotent overwrites, so
/// repeated observation is safe without a conditional guard.
pub async fn run_watcher_tick(store: &dyn BlackboardStore) -> Result<(), Error> {
    advance_scheduled(store).await?;
    advance_running(store).await?;
    Ok(())
}

/// SCHEDULED -> RUNNING once any workitem has been picked up.
async fn advance_scheduled(store: &dyn BlackboardStore) -> Result<(), Error> {
    for task in store.list_tasks(Some(TaskStatus::Scheduled)).await? {
        let items = store.list_workitems_for_task(&task.id).await?;
        if items.iter().any(|w| w.status != WorkItemStatus::New) {
            match store
                .transition_task(&task.id, TaskStatus::Running, None, None)
                .await
            {
                Ok(()) => info!("task {} is running", task.id),
                Err(e @ Error::Transport(_)) => return Err(e),
                Err(e) => warn!("failed to mark task {} running: {e}", task.id),
            }
        }
    }
    Ok(())
}

/// RUNNING -> COMPLETED once every workitem is completed.
async fn advance_running(store: &dyn BlackboardStore) -> Result<(), Error> {
    for task in store.list_tasks(Some(TaskStatus::Running)).await? {
        let items = store.list_workitems_for_task(&task.id).await?;
        if !items.is_empty() && items.iter().all(|w| w.status == WorkItemStatus::Completed) {
            match store
                .transition_task(&task.id, TaskStatus::Completed, None, None)
                .await
            {
                Ok(()) => info!("task {} completed", task.id),
                Err(e @ Error::Transport(_)) => return Err(e),
                Err(e) => warn!("failed to complete task {}: {e}", task.id),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::run_scheduler_tick;
    use wordboard_core::memory::MemoryStore;

    async fn scheduled_task(store: &MemoryStore, letters: &str) -> String {
        let task = store.create_task(letters);
        run_scheduler_tick(store).await.unwrap();
        task.id
    }

    #[tokio::test]
    async fn scheduled_task_with_untouched_workitems_stays_put() {
        let store = MemoryStore::new();
        let task_id = scheduled_task(&store, "cab").await;

        run_watcher_tick(&store).await.unwrap();

        let task = store.get_task(&task_id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Scheduled);
    }

    #[tokio::test]
    async fn picked_up_workitem_promotes_task_to_running() {
        let store = MemoryStore::new();
        let task_id = scheduled_task(&store, "cab").await;
        let item = &store.list_workitems_for_task(&task_id).await.unwrap()[0];
        store
            .transition_workitem(&item.id, WorkItemStatus::Running, None)
            .await
            .unwrap();

        run_watcher_tick(&store).await.unwrap();

        let task = store.get_task(&task_id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Running);
        assert!(task.started.is_some());
    }

    #[tokio::test]
    async fn all_workitems_completed_promotes_task_to_completed() {
        let store = MemoryStore::new();
        let task_id = scheduled_task(&store, "cab").await;
        let item = &store.list_workitems_for_task(&task_id).await.unwrap()[0];
        store
            .transition_workitem(&item.id, WorkItemStatus::Completed, None)
            .await
            .unwrap();

        // A single tick runs both sweeps, so the task moves through
        // RUNNING to COMPLETED in one pass.
        run_watcher_tick(&store).await.unwrap();

        let task = store.get_task(&task_id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.completed.is_some());
    }

    #[tokio::test]
    async fn repeated_ticks_are_idempotent() {
        let store = MemoryStore::new();
        let task_id = scheduled_task(&store, "cab").await;
        let item = &store.list_workitems_for_task(&task_id).await.unwrap()[0];
        store
            .transition_workitem(&item.id, WorkItemStatus::Completed, None)
            .await
            .unwrap();

        for _ in 0..4 {
            run_watcher_tick(&store).await.unwrap();
        }
        let task = store.get_task(&task_id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
    }
}
