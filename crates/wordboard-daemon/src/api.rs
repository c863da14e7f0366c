use crate::db;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use wordboard_core::model::{
    AppendWordRequest, CreateWorkItemsRequest, Task, TaskStatus, TaskTransitionRequest, WorkItem,
    WorkItemStatus, WorkItemTransitionRequest,
};
use wordboard_core::Error;

#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
}

impl AppState {
    pub fn new(db: db::Db) -> Self {
        Self { db }
    }
}

/// Route table of the blackboard surface, shared between the binary and
/// the integration tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/tasks", post(create_task).get(list_tasks))
        .route("/tasks/{task_id}", get(get_task).put(update_task))
        .route("/status/{task_id}", get(task_status))
        .route("/tasks/{task_id}/words", post(append_word).get(task_words))
        .route(
            "/tasks/{task_id}/workitems",
            post(create_workitems).get(task_workitems),
        )
        .route("/workitems", get(list_workitems))
        .route(
            "/workitems/{workitem_id}",
            get(get_workitem).put(update_workitem),
        )
        .with_state(state)
}

fn http_err(e: Error) -> (StatusCode, String) {
    let status = match &e {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::StateConflict(_) => StatusCode::FORBIDDEN,
        Error::Transport(_) => StatusCode::BAD_GATEWAY,
        Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub letters: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskWordsResponse {
    #[serde(flatten)]
    pub task: Task,
    pub words: Vec<String>,
}

pub async fn healthcheck(State(state): State<AppState>) -> Result<StatusCode, (StatusCode, String)> {
    state.db.ping().await.map_err(http_err)?;
    Ok(StatusCode::OK)
}

/// Accepts a letter set and files it as a NEW task. Responds 202 with a
/// Location header pointing at the polling endpoint.
pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Response, (StatusCode, String)> {
    let letters = req.letters.trim().to_string();
    if letters.is_empty() {
        return Err(http_err(Error::Validation("letters must not be empty".into())));
    }
    let task = state.db.create_task(letters).await.map_err(http_err)?;
    Ok((
        StatusCode::ACCEPTED,
        [(header::LOCATION, format!("/status/{}", task.id))],
        Json(task),
    )
        .into_response())
}

/// Tasks, optionally filtered by status. An empty result is reported as
/// 404 so pollers can treat "nothing to do" without parsing a body.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(TaskStatus::from_str(raw).map_err(http_err)?),
        None => None,
    };
    let tasks = state.db.list_tasks(status).await.map_err(http_err)?;
    if tasks.is_empty() {
        return Err((StatusCode::NOT_FOUND, "Nothing found.".into()));
    }
    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let task = state.db.get_task(&task_id).await.map_err(http_err)?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(req): Json<TaskTransitionRequest>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let task = state
        .db
        .transition_task(
            &task_id,
            req.status,
            req.expected_status,
            req.scheduled_items_count,
        )
        .await
        .map_err(http_err)?;
    Ok(Json(task))
}

/// Polling endpoint for task submitters. While the search is in flight
/// the body carries the last update timestamp; once the task completes the
/// caller is redirected to the results.
pub async fn task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let task = state.db.get_task(&task_id).await.map_err(http_err)?;
    if task.status == TaskStatus::Completed {
        return Ok((
            StatusCode::SEE_OTHER,
            [(header::LOCATION, format!("/tasks/{}/words", task.id))],
        )
            .into_response());
    }
    Ok(Json(serde_json::json!({ "lastUpdated": task.last_updated })).into_response())
}

pub async fn append_word(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(req): Json<AppendWordRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .db
        .append_word(&task_id, req.word)
        .await
        .map_err(http_err)?;
    Ok(StatusCode::CREATED)
}

/// Results view. Available only after the task has COMPLETED; until then
/// the task is still being searched and the word list would be partial.
pub async fn task_words(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskWordsResponse>, (StatusCode, String)> {
    let task = state.db.get_task(&task_id).await.map_err(http_err)?;
    if task.status != TaskStatus::Completed {
        return Err((StatusCode::NOT_FOUND, "Nothing found.".into()));
    }
    let words = state
        .db
        .words_for_task(&task_id)
        .await
        .map_err(http_err)?
        .into_iter()
        .map(|w| w.word)
        .collect();
    Ok(Json(TaskWordsResponse { task, words }))
}

pub async fn create_workitems(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(req): Json<CreateWorkItemsRequest>,
) -> Result<(StatusCode, Json<Vec<WorkItem>>), (StatusCode, String)> {
    if req.workitems.is_empty() {
        return Err(http_err(Error::Validation(
            "workitems must not be empty".into(),
        )));
    }
    let created = state
        .db
        .create_workitems(&task_id, req.workitems)
        .await
        .map_err(http_err)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn task_workitems(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Vec<WorkItem>>, (StatusCode, String)> {
    // 404 for an unknown task as well as for a task with no workitems yet.
    let _ = state.db.get_task(&task_id).await.map_err(http_err)?;
    let items = state
        .db
        .list_workitems_for_task(&task_id)
        .await
        .map_err(http_err)?;
    if items.is_empty() {
        return Err((StatusCode::NOT_FOUND, "Nothing found.".into()));
    }
    Ok(Json(items))
}

pub async fn list_workitems(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<WorkItem>>, (StatusCode, String)> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(WorkItemStatus::from_str(raw).map_err(http_err)?),
        None => None,
    };
    let items = state.db.list_workitems(status).await.map_err(http_err)?;
    if items.is_empty() {
        return Err((StatusCode::NOT_FOUND, "Nothing found.".into()));
    }
    Ok(Json(items))
}

pub async fn get_workitem(
    State(state): State<AppState>,
    Path(workitem_id): Path<String>,
) -> Result<Json<WorkItem>, (StatusCode, String)> {
    let item = state.db.get_workitem(&workitem_id).await.map_err(http_err)?;
    Ok(Json(item))
}

pub async fn update_workitem(
    State(state): State<AppState>,
    Path(workitem_id): Path<String>,
    Json(req): Json<WorkItemTransitionRequest>,
) -> Result<Json<WorkItem>, (StatusCode, String)> {
    let item = state
        .db
        .transition_workitem(&workitem_id, req.status, req.expected_status)
        .await
        .map_err(http_err)?;
    Ok(Json(item))
}
