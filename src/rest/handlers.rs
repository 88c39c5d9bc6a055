use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::storage::Storage;

use super::{
    error::ApiError,
    models::{
        CreateInterviewRequest, CreateTaskRequest, ErrorResponse, HealthResponse,
        InterviewResponse, RootResponse, TaskResponse, UpdateTaskRequest,
    },
    AppState,
};

pub const WELCOME_MESSAGE: &str = "Welcome to Salarite Virtual HR API";

/// Runs a storage call on the blocking pool against a clone of the handle.
async fn with_storage<S, T, F>(storage: &S, f: F) -> Result<T, ApiError>
where
    S: Storage + Clone + Send + Sync + 'static,
    T: Send + 'static,
    F: FnOnce(&S) -> anyhow::Result<T> + Send + 'static,
{
    let storage = storage.clone();
    let result = tokio::task::spawn_blocking(move || f(&storage))
        .await
        .map_err(anyhow::Error::from)?;
    Ok(result?)
}

pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

pub async fn health<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let uptime_secs = state.started_at.elapsed().map(|d| d.as_secs()).unwrap_or(0);
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            uptime_secs,
        }),
    )
}

pub async fn create_task<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(request) = payload?;
    let new_task = request.into_new_task()?;
    let task = with_storage(&state.storage, move |s| s.insert_task(new_task)).await?;
    log::info!("Created task {} assigned to {}", task.id, task.assigned_to);
    Ok(Json(task.into()))
}

pub async fn list_tasks<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = with_storage(&state.storage, |s| s.list_tasks()).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

pub async fn get_task<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Path(id) = id?;
    with_storage(&state.storage, move |s| s.load_task(id))
        .await?
        .map(|task| Json(task.into()))
        .ok_or(ApiError::NotFound { entity: "Task" })
}

pub async fn update_task_status<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Path(id) = id?;
    let Json(UpdateTaskRequest { status }) = payload?;

    let task = with_storage(&state.storage, move |s| match status {
        Some(status) => s.update_task_status(id, status),
        None => s.load_task(id),
    })
    .await?
    .ok_or(ApiError::NotFound { entity: "Task" })?;

    if let Some(status) = status {
        log::info!("Task {} moved to {}", task.id, status);
    }
    Ok(Json(task.into()))
}

pub async fn create_interview<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateInterviewRequest>, JsonRejection>,
) -> Result<Json<InterviewResponse>, ApiError> {
    let Json(request) = payload?;
    let new_interview = request.into_new_interview();
    let interview = with_storage(&state.storage, move |s| s.insert_interview(new_interview)).await?;
    log::info!(
        "Scheduled interview {} with {} at {}",
        interview.id,
        interview.candidate_name,
        interview.scheduled_at
    );
    Ok(Json(interview.into()))
}

pub async fn list_interviews<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<InterviewResponse>>, ApiError> {
    let interviews = with_storage(&state.storage, |s| s.list_interviews()).await?;
    Ok(Json(
        interviews
            .into_iter()
            .map(InterviewResponse::from)
            .collect(),
    ))
}

pub async fn get_interview<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<InterviewResponse>, ApiError> {
    let Path(id) = id?;
    with_storage(&state.storage, move |s| s.load_interview(id))
        .await?
        .map(|interview| Json(interview.into()))
        .ok_or(ApiError::NotFound {
            entity: "Interview",
        })
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            detail: "Not Found".to_string(),
        }),
    )
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            detail: "Method Not Allowed".to_string(),
        }),
    )
}
