use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use wordboard_core::model::{
    AppendWordRequest, CreateWorkItemsRequest, FirstWordResponse, NewWorkItem, Task,
    TaskStatus, TaskTransitionRequest, WorkItem, WorkItemStatus, WorkItemTransitionRequest,
};
use wordboard_core::oracle::WordOracle;
use wordboard_core::store::BlackboardStore;
use wordboard_core::Error;

/// HTTP client for the blackboard daemon.
#[derive(Clone)]
pub struct StoreClient {
    base_url: String,
    http: Client,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(e: reqwest::Error) -> Error {
    Error::Transport(e.to_string())
}

/// Map a non-success response onto the shared failure taxonomy.
async fn check(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::BAD_REQUEST => Error::Validation(body),
        StatusCode::NOT_FOUND => Error::NotFound(body),
        StatusCode::FORBIDDEN | StatusCode::CONFLICT => Error::StateConflict(body),
        s if s.is_server_error() => Error::Internal(format!("{s}: {body}")),
        s => Error::Transport(format!("unexpected status {s}: {body}")),
    })
}

#[async_trait]
impl BlackboardStore for StoreClient {
    async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, Error> {
        let mut req = self.http.get(self.url("/tasks"));
        if let Some(s) = status {
            req = req.query(&[("status", s.as_str())]);
        }
        let resp = req.send().await.map_err(transport)?;
        // The daemon answers 404 when nothing matches; that is "nothing to
        // do", not a failure.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        check(resp).await?.json().await.map_err(transport)
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, Error> {
        let resp = self
            .http
            .get(self.url(&format!("/tasks/{task_id}")))
            .send()
            .await
            .map_err(transport)?;
        check(resp).await?.json().await.map_err(transport)
    }

    async fn transition_task(
        &self,
        task_id: &str,
        to: TaskStatus,
        expected: Option<TaskStatus>,
        scheduled_items_count: Option<u32>,
    ) -> Result<(), Error> {
        let body = TaskTransitionRequest {
            status: to,
            expected_status: expected,
            scheduled_items_count,
        };
        let resp = self
            .http
            .put(self.url(&format!("/tasks/{task_id}")))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        check(resp).await.map(|_| ())
    }

    async fn create_workitems(&self, task_id: &str, items: Vec<NewWorkItem>) -> Result<(), Error> {
        let body = CreateWorkItemsRequest { workitems: items };
        let resp = self
            .http
            .post(self.url(&format!("/tasks/{task_id}/workitems")))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        check(resp).await.map(|_| ())
    }

    async fn list_workitems(&self, status: Option<WorkItemStatus>) -> Result<Vec<WorkItem>, Error> {
        let mut req = self.http.get(self.url("/workitems"));
        if let Some(s) = status {
            req = req.query(&[("status", s.as_str())]);
        }
        let resp = req.send().await.map_err(transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        check(resp).await?.json().await.map_err(transport)
    }

    async fn list_workitems_for_task(&self, task_id: &str) -> Result<Vec<WorkItem>, Error> {
        let resp = self
            .http
            .get(self.url(&format!("/tasks/{task_id}/workitems")))
            .send()
            .await
            .map_err(transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        check(resp).await?.json().await.map_err(transport)
    }

    async fn get_workitem(&self, workitem_id: &str) -> Result<WorkItem, Error> {
        let resp = self
            .http
            .get(self.url(&format!("/workitems/{workitem_id}")))
            .send()
            .await
            .map_err(transport)?;
        check(resp).await?.json().await.map_err(transport)
    }

    async fn transition_workitem(
        &self,
        workitem_id: &str,
        to: WorkItemStatus,
        expected: Option<WorkItemStatus>,
    ) -> Result<(), Error> {
        let body = WorkItemTransitionRequest {
            status: to,
            expected_status: expected,
        };
        let resp = self
            .http
            .put(self.url(&format!("/workitems/{workitem_id}")))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        check(resp).await.map(|_| ())
    }

    async fn append_word(&self, task_id: &str, word: &str) -> Result<(), Error> {
        let body = AppendWordRequest {
            word: word.to_string(),
        };
        let resp = self
            .http
            .post(self.url(&format!("/tasks/{task_id}/words")))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        check(resp).await.map(|_| ())
    }
}

/// Remote [`WordOracle`] backed by the dictionary service's
/// `/firstword/{prefix}` endpoint.
#[derive(Clone)]
pub struct OracleClient {
    base_url: String,
    http: Client,
}

impl OracleClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl WordOracle for OracleClient {
    async fn first_word_with_prefix(&self, prefix: &str) -> Result<Option<String>, Error> {
        let resp = self
            .http
            .get(format!("{}/firstword/{prefix}", self.base_url))
            .send()
            .await
            .map_err(transport)?;
        let resp = check(resp).await?;
        let body: FirstWordResponse = resp.json().await.map_err(transport)?;
        Ok(body.first_word)
    }
}
