use crate::config::DaemonConfig;
use anyhow::{Context, Result};
use serde::Serialize;
use wordboard_core::model::{
    new_id, NewWorkItem, Task, TaskStatus, Word, WorkItem, WorkItemStatus,
};
use wordboard_core::{now_ms, Error};

use surrealdb::engine::local::SurrealKv;
use surrealdb::Surreal;

pub type SurrealConn = surrealdb::engine::local::Db;
pub type SurrealDb = Surreal<SurrealConn>;

#[derive(Clone)]
pub struct Db {
    inner: SurrealDb,
}

fn internal<E: std::fmt::Display>(e: E) -> Error {
    Error::Internal(e.to_string())
}

// Record ids live in SurrealDB as `table:key` things. Reads project the
// key back out with `record::id(id) AS id` so the domain structs keep
// their plain string ids; writes strip the `id` field from the content
// and address the record through `type::thing`.

impl Db {
    pub async fn connect(config: &DaemonConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.db_dir)
            .with_context(|| format!("creating db_dir {}", config.db_dir.display()))?;

        let db_path = config
            .db_dir
            .to_str()
            .context("db_dir must be valid utf-8")?
            .to_string();

        // Embedded SurrealKV.
        let inner = Surreal::new::<SurrealKv>(db_path)
            .versioned()
            .await
            .context("connecting to embedded SurrealKV")?;

        inner
            .use_ns("wordboard")
            .use_db("main")
            .await
            .context("selecting surreal namespace/db")?;

        Ok(Self { inner })
    }

    /// Liveness probe used by the healthcheck route.
    pub async fn ping(&self) -> Result<(), Error> {
        self.inner.query("RETURN 1;").await.map_err(internal)?;
        Ok(())
    }

    async fn create_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
    ) -> Result<(), Error> {
        let mut data = serde_json::to_value(record).map_err(internal)?;
        if let Some(obj) = data.as_object_mut() {
            obj.remove("id");
        }
        let res = self
            .inner
            .query("CREATE type::thing($table, $id) CONTENT $data RETURN NONE;")
            .bind(("table", table.to_string()))
            .bind(("id", id.to_string()))
            .bind(("data", data))
            .await
            .map_err(internal)?;
        res.check().map_err(internal)?;
        Ok(())
    }

    pub async fn create_task(&self, letters: String) -> Result<Task, Error> {
        let task = Task {
            id: new_id(),
            letters,
            status: TaskStatus::New,
            last_updated: now_ms(),
            started: None,
            completed: None,
            scheduled_items_count: None,
        };
        self.create_record("task", &task.id, &task).await?;
        Ok(task)
    }

    pub async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, Error> {
        let mut res = match status {
            Some(status) => self
                .inner
                .query(
                    "SELECT *, record::id(id) AS id FROM task WHERE status = $status ORDER BY id ASC;",
                )
                .bind(("status", status))
                .await
                .map_err(internal)?,
            None => self
                .inner
                .query("SELECT *, record::id(id) AS id FROM task ORDER BY id ASC;")
                .await
                .map_err(internal)?,
        };
        let tasks: Vec<Task> = res.take(0).map_err(internal)?;
        Ok(tasks)
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task, Error> {
        let mut res = self
            .inner
            .query("SELECT *, record::id(id) AS id FROM type::thing('task', $id);")
            .bind(("id", task_id.to_string()))
            .await
            .map_err(internal)?;
        let task: Option<Task> = res.take(0).map_err(internal)?;
        task.ok_or_else(|| Error::NotFound(format!("task {task_id}")))
    }

    /// Conditional status write. The UPDATE carries a `status = $guard`
    /// predicate so a task claimed by a concurrent agent between our read
    /// and our write matches zero rows instead of being overwritten.
    pub async fn transition_task(
        &self,
        task_id: &str,
        to: TaskStatus,
        expected: Option<TaskStatus>,
        scheduled_items_count: Option<u32>,
    ) -> Result<Task, Error> {
        let current = self.get_task(task_id).await?;
        if let Some(expected) = expected {
            if current.status != expected {
                return Err(Error::StateConflict(format!(
                    "task {task_id} is {} not {expected}",
                    current.status
                )));
            }
        }
        if !current.status.allows_transition_to(to) {
            return Err(Error::StateConflict(format!(
                "task {task_id} cannot move {} -> {to}",
                current.status
            )));
        }

        let guard = expected.unwrap_or(current.status);
        let now = now_ms();

        let mut set = String::from("status = $status, lastUpdated = $now");
        if to == TaskStatus::Scheduled && scheduled_items_count.is_some() {
            set.push_str(", scheduledItemsCount = $count");
        }
        if to == TaskStatus::Running {
            set.push_str(", started = $now");
        }
        if to == TaskStatus::Completed {
            set.push_str(", completed = $now");
        }
        let sql = format!(
            "UPDATE type::thing('task', $id) SET {set} WHERE status = $guard RETURN VALUE status;"
        );

        let mut query = self
            .inner
            .query(sql)
            .bind(("id", task_id.to_string()))
            .bind(("status", to))
            .bind(("guard", guard))
            .bind(("now", now));
        if to == TaskStatus::Scheduled && scheduled_items_count.is_some() {
            query = query.bind(("count", scheduled_items_count));
        }
        let mut res = query.await.map_err(internal)?;

        let updated: Option<TaskStatus> = res.take(0).map_err(internal)?;
        if updated.is_none() {
            return Err(Error::StateConflict(format!(
                "task {task_id} was modified concurrently"
            )));
        }
        self.get_task(task_id).await
    }

    /// Workitems may only be attached while the owning task is SCHEDULING.
    pub async fn create_workitems(
        &self,
        task_id: &str,
        items: Vec<NewWorkItem>,
    ) -> Result<Vec<WorkItem>, Error> {
        let task = self.get_task(task_id).await?;
        if task.status != TaskStatus::Scheduling {
            return Err(Error::StateConflict(format!(
                "task {task_id} is {} not SCHEDULING",
                task.status
            )));
        }

        let mut created = Vec::with_capacity(items.len());
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
            self.create_record("workitem", &workitem.id, &workitem)
                .await?;
            created.push(workitem);
        }
        Ok(created)
    }

    pub async fn list_workitems(
        &self,
        status: Option<WorkItemStatus>,
    ) -> Result<Vec<WorkItem>, Error> {
        let mut res = match status {
            Some(status) => self
                .inner
                .query(
                    "SELECT *, record::id(id) AS id FROM workitem WHERE status = $status ORDER BY id ASC;",
                )
                .bind(("status", status))
                .await
                .map_err(internal)?,
            None => self
                .inner
                .query("SELECT *, record::id(id) AS id FROM workitem ORDER BY id ASC;")
                .await
                .map_err(internal)?,
        };
        let items: Vec<WorkItem> = res.take(0).map_err(internal)?;
        Ok(items)
    }

    pub async fn list_workitems_for_task(&self, task_id: &str) -> Result<Vec<WorkItem>, Error> {
        let mut res = self
            .inner
            .query(
                "SELECT *, record::id(id) AS id FROM workitem WHERE task_id = $task_id ORDER BY id ASC;",
            )
            .bind(("task_id", task_id.to_string()))
            .await
            .map_err(internal)?;
        let items: Vec<WorkItem> = res.take(0).map_err(internal)?;
        Ok(items)
    }

    pub async fn get_workitem(&self, workitem_id: &str) -> Result<WorkItem, Error> {
        let mut res = self
            .inner
            .query("SELECT *, record::id(id) AS id FROM type::thing('workitem', $id);")
            .bind(("id", workitem_id.to_string()))
            .await
            .map_err(internal)?;
        let item: Option<WorkItem> = res.take(0).map_err(internal)?;
        item.ok_or_else(|| Error::NotFound(format!("workitem {workitem_id}")))
    }

    pub async fn transition_workitem(
        &self,
        workitem_id: &str,
        to: WorkItemStatus,
        expected: Option<WorkItemStatus>,
    ) -> Result<WorkItem, Error> {
        let current = self.get_workitem(workitem_id).await?;
        if let Some(expected) = expected {
            if current.status != expected {
                return Err(Error::StateConflict(format!(
                    "workitem {workitem_id} is {} not {expected}",
                    current.status
                )));
            }
        }
        if !current.status.allows_transition_to(to) {
            return Err(Error::StateConflict(format!(
                "workitem {workitem_id} cannot move {} -> {to}",
                current.status
            )));
        }

        let guard = expected.unwrap_or(current.status);
        let now = now_ms();

        let mut set = String::from("status = $status, lastUpdated = $now");
        if to == WorkItemStatus::Running {
            set.push_str(", started = $now");
        }
        if to == WorkItemStatus::Completed {
            set.push_str(", completed = $now");
        }
        let sql = format!(
            "UPDATE type::thing('workitem', $id) SET {set} WHERE status = $guard RETURN VALUE status;"
        );

        let mut res = self
            .inner
            .query(sql)
            .bind(("id", workitem_id.to_string()))
            .bind(("status", to))
            .bind(("guard", guard))
            .bind(("now", now))
            .await
            .map_err(internal)?;

        let updated: Option<WorkItemStatus> = res.take(0).map_err(internal)?;
        if updated.is_none() {
            return Err(Error::StateConflict(format!(
                "workitem {workitem_id} was modified concurrently"
            )));
        }
        self.get_workitem(workitem_id).await
    }

    /// Append-only word storage. Duplicates from re-run workitems are kept
    /// as-is; nothing deduplicates here.
    pub async fn append_word(&self, task_id: &str, word: String) -> Result<Word, Error> {
        let task = self.get_task(task_id).await?;
        if task.status == TaskStatus::Completed {
            return Err(Error::StateConflict(format!(
                "task {task_id} is COMPLETED, words are frozen"
            )));
        }
        let record = Word {
            task_id: task_id.to_string(),
            word,
        };
        self.create_record("word", &new_id(), &record).await?;
        Ok(record)
    }

    pub async fn words_for_task(&self, task_id: &str) -> Result<Vec<Word>, Error> {
        let mut res = self
            .inner
            .query(
                "SELECT *, record::id(id) AS id FROM word WHERE task_id = $task_id ORDER BY id ASC;",
            )
            .bind(("task_id", task_id.to_string()))
            .await
            .map_err(internal)?;
        let words: Vec<Word> = res.take(0).map_err(internal)?;
        Ok(words)
    }
}
