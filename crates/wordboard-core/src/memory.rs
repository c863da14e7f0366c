use crate::error::Error;
use crate::model::{
    new_id, NewWorkItem, Task, TaskStatus, Word, WorkItem, WorkItemStatus,
};
use crate::store::BlackboardStore;
use crate::time::now_ms;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-memory blackboard for tests. Not durable, but it enforces the same
/// guards as the daemon: status monotonicity, conditional transitions, the
/// SCHEDULING guard on workitem creation and the COMPLETED guard on word
/// appends.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    tasks: BTreeMap<String, Task>,
    workitems: BTreeMap<String, WorkItem>,
    words: Vec<Word>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a NEW task, standing in for external submission.
    pub fn create_task(&self, letters: &str) -> Task {
        let task = Task {
            id: new_id(),
            letters: letters.to_string(),
            status: TaskStatus::New,
            last_updated: now_ms(),
            started: None,
            completed: None,
            scheduled_items_count: None,
        };
        let mut inner = self.inner.lock().unwrap();
        inner.tasks.insert(task.id.clone(), task.clone());
        task
    }

    /// Words recorded so far for a task, in append order.
    pub fn words_for_task(&self, task_id: &str) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .words
            .iter()
            .filter(|w| w.task_id == task_id)
            .map(|w| w.word.clone())
            .collect()
    }
}

#[async_trait]
impl BlackboardStore for MemoryStore {
    async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tasks
            .values()
            .filter(|t| status.map(|s| t.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, Error> {
        let inner = self.inner.lock().unwrap();
        inner
            .tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("task {task_id}")))
    }

    async fn transition_task(
        &self,
        task_id: &str,
        to: TaskStatus,
        expected: Option<TaskStatus>,
        scheduled_items_count: Option<u32>,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
        if let Some(exp) = expected {
            if task.status != exp {
                return Err(Error::StateConflict(format!(
                    "task {task_id} is {}, expected {exp}",
                    task.status
                )));
            }
        }
        if !task.status.allows_transition_to(to) {
            return Err(Error::StateConflict(format!(
                "task {task_id} cannot move from {} back to {to}",
                task.status
            )));
        }
        let now = now_ms();
        task.status = to;
        task.last_updated = now;
        match to {
            TaskStatus::Scheduled => task.scheduled_items_count = scheduled_items_count,
            TaskStatus::Running => task.started = Some(now),
            TaskStatus::Completed => task.completed = Some(now),
            _ => {}
        }
        Ok(())
    }

    async fn create_workitems(&self, task_id: &str, items: Vec<NewWorkItem>) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        let task = inner
            .tasks
            .get(task_id)
            .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
        if task.status != TaskStatus::Scheduling {
            return Err(Error::StateConflict(format!(
                "task {task_id} is {}, not SCHEDULING",
                task.status
            )));
        }
        for item in items {
            let workitem = WorkItem {
                id: new_id(),
                task_id: task_id.to_string(),
                status: WorkItemStatus::New,
                current_sequence: item.current_sequence,
                remaining_elements: item.remaining_elements,
                last_updated: now_ms(),
                started: None,
                completed: None,
            };
            inner.workitems.insert(workitem.id.clone(), workitem);
        }
        Ok(())
    }

    async fn list_workitems(&self, status: Option<WorkItemStatus>) -> Result<Vec<WorkItem>, Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .workitems
            .values()
            .filter(|w| status.map(|s| w.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn list_workitems_for_task(&self, task_id: &str) -> Result<Vec<WorkItem>, Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .workitems
            .values()
            .filter(|w| w.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn get_workitem(&self, workitem_id: &str) -> Result<WorkItem, Error> {
        let inner = self.inner.lock().unwrap();
        inner
            .workitems
            .get(workitem_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("workitem {workitem_id}")))
    }

    async fn transition_workitem(
        &self,
        workitem_id: &str,
        to: WorkItemStatus,
        expected: Option<WorkItemStatus>,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        let item = inner
            .workitems
            .get_mut(workitem_id)
            .ok_or_else(|| Error::NotFound(format!("workitem {workitem_id}")))?;
        if let Some(exp) = expected {
            if item.status != exp {
                return Err(Error::StateConflict(format!(
                    "workitem {workitem_id} is {}, expected {exp}",
                    item.status
                )));
            }
        }
        if !item.status.allows_transition_to(to) {
            return Err(Error::StateConflict(format!(
                "workitem {workitem_id} cannot move from {} back to {to}",
                item.status
            )));
        }
        let now = now_ms();
        item.status = to;
        item.last_updated = now;
        match to {
            WorkItemStatus::Running => item.started = Some(now),
            WorkItemStatus::Completed => item.completed = Some(now),
            WorkItemStatus::New => {}
        }
        Ok(())
    }

    async fn append_word(&self, task_id: &str, word: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        let task = inner
            .tasks
            .get(task_id)
            .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
        if task.status == TaskStatus::Completed {
            return Err(Error::StateConflict(format!(
                "task {task_id} is COMPLETED and cannot accept more words"
            )));
        }
        inner.words.push(Word {
            task_id: task_id.to_string(),
            word: word.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsequence::tag_letters;

    fn new_item(letters: &str) -> NewWorkItem {
        NewWorkItem {
            current_sequence: String::new(),
            remaining_elements: tag_letters(letters),
        }
    }

    #[tokio::test]
    async fn task_status_is_monotonic() {
        let store = MemoryStore::new();
        let task = store.create_task("abc");
        for status in [
            TaskStatus::Scheduling,
            TaskStatus::Scheduled,
            TaskStatus::Running,
            TaskStatus::Completed,
        ] {
            store
                .transition_task(&task.id, status, None, None)
                .await
                .unwrap();
        }
        let err = store
            .transition_task(&task.id, TaskStatus::Running, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StateConflict(_)));
    }

    #[tokio::test]
    async fn conditional_transition_rejects_stale_expectation() {
        let store = MemoryStore::new();
        let task = store.create_task("abc");
        store
            .transition_task(&task.id, TaskStatus::Scheduling, Some(TaskStatus::New), None)
            .await
            .unwrap();
        // A second claimer still expecting NEW loses the race.
        let err = store
            .transition_task(&task.id, TaskStatus::Scheduling, Some(TaskStatus::New), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StateConflict(_)));
    }

    #[tokio::test]
    async fn workitem_creation_requires_scheduling_status() {
        let store = MemoryStore::new();
        let task = store.create_task("abc");
        let err = store
            .create_workitems(&task.id, vec![new_item("abc")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StateConflict(_)));

        store
            .transition_task(&task.id, TaskStatus::Scheduling, None, None)
            .await
            .unwrap();
        store
            .create_workitems(&task.id, vec![new_item("abc")])
            .await
            .unwrap();
        let items = store.list_workitems_for_task(&task.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, WorkItemStatus::New);
        assert_eq!(items[0].remaining_elements, tag_letters("abc"));
    }

    #[tokio::test]
    async fn words_are_rejected_once_the_task_is_completed() {
        let store = MemoryStore::new();
        let task = store.create_task("cab");
        store.append_word(&task.id, "cab").await.unwrap();
        store
            .transition_task(&task.id, TaskStatus::Completed, None, None)
            .await
            .unwrap();
        let err = store.append_word(&task.id, "cab").await.unwrap_err();
        assert!(matches!(err, Error::StateConflict(_)));
        assert_eq!(store.words_for_task(&task.id), vec!["cab"]);
    }

    #[tokio::test]
    async fn unknown_ids_surface_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_task("missing").await.unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(matches!(
            store.append_word("missing", "w").await.unwrap_err(),
            Error::NotFound(_)
        ));
    }
}
