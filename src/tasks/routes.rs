//! REST endpoints for tasks and progress.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{StoreError, TaskError, ValidationError};
use crate::store::TaskStore;
use crate::tasks::generator::{ProfileSnapshot, TaskTemplateGenerator};
use crate::tasks::model::{NewTask, Task};
use crate::tasks::progress::{ProgressAggregator, ProgressSummary};
use crate::tasks::recorder::CompletionRecorder;

/// Shared state for task routes.
#[derive(Clone)]
pub struct TaskRouteState {
    store: Arc<dyn TaskStore>,
    generator: Arc<TaskTemplateGenerator>,
    recorder: Arc<CompletionRecorder>,
    aggregator: Arc<ProgressAggregator>,
}

impl TaskRouteState {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            generator: Arc::new(TaskTemplateGenerator::new()),
            recorder: Arc::new(CompletionRecorder::new(Arc::clone(&store))),
            aggregator: Arc::new(ProgressAggregator::new(Arc::clone(&store))),
            store,
        }
    }
}

/// Engine error mapped to an HTTP response.
#[derive(Debug)]
pub struct ApiError(TaskError);

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(TaskError::Validation(err))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(TaskError::Store(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TaskError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TaskError::NotFound { .. } => StatusCode::NOT_FOUND,
            TaskError::Batch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            TaskError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// GET /api/
async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Tanbih - Islamic Lifestyle Companion API" }))
}

/// POST /api/users/{user_id}/tasks/generate
///
/// Derive and persist the onboarding task batch for a user. Meant to be
/// called once per user; task ids are deterministic, so a retry after a
/// failure cannot duplicate the batch.
async fn generate_tasks(
    State(state): State<TaskRouteState>,
    Path(user_id): Path<String>,
    Json(profile): Json<ProfileSnapshot>,
) -> Result<(StatusCode, Json<Vec<Task>>), ApiError> {
    let tasks = state
        .generator
        .generate_and_insert(state.store.as_ref(), &user_id, &profile)
        .await?;
    Ok((StatusCode::CREATED, Json(tasks)))
}

/// POST /api/tasks
async fn create_task(
    State(state): State<TaskRouteState>,
    Json(fields): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = fields.validate()?;
    state.store.insert_task(&task).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks/{user_id}
async fn list_tasks(
    State(state): State<TaskRouteState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.store.list_tasks(&user_id).await?;
    Ok(Json(tasks))
}

/// Body of PUT /api/tasks/complete.
#[derive(Debug, Deserialize)]
struct CompleteTaskRequest {
    task_id: Uuid,
    completed: bool,
}

/// PUT /api/tasks/complete
async fn complete_task(
    State(state): State<TaskRouteState>,
    Json(request): Json<CompleteTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .recorder
        .set_completion(request.task_id, request.completed)
        .await?;
    Ok(Json(task))
}

/// GET /api/progress/{user_id}
async fn get_progress(
    State(state): State<TaskRouteState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProgressSummary>, ApiError> {
    let summary = state.aggregator.progress_for(&user_id).await?;
    Ok(Json(summary))
}

/// Build the task REST routes.
pub fn task_routes(state: TaskRouteState) -> Router {
    Router::new()
        .route("/api/", get(root))
        .route("/api/users/{user_id}/tasks/generate", post(generate_tasks))
        .route("/api/tasks", post(create_task))
        .route("/api/tasks/{user_id}", get(list_tasks))
        .route("/api/tasks/complete", put(complete_task))
        .route("/api/progress/{user_id}", get(get_progress))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn test_state() -> TaskRouteState {
        TaskRouteState::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn create_then_list() {
        let state = test_state();
        let fields = NewTask {
            owner_id: "user1".to_string(),
            title: "Evening Dhikr".to_string(),
            description: String::new(),
            category: "dhikr".to_string(),
            frequency: "daily".to_string(),
        };
        let (status, Json(task)) = create_task(State(state.clone()), Json(fields)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(tasks) = list_tasks(State(state), Path("user1".to_string())).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, task.id);
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let state = test_state();
        let fields = NewTask {
            owner_id: "user1".to_string(),
            title: "T".to_string(),
            description: String::new(),
            category: "fasting".to_string(),
            frequency: "daily".to_string(),
        };
        let err = create_task(State(state.clone()), Json(fields)).await.unwrap_err();
        assert!(matches!(err.0, TaskError::Validation(_)));

        // Nothing persisted.
        let Json(tasks) = list_tasks(State(state), Path("user1".to_string())).await.unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn generate_complete_and_progress_flow() {
        let state = test_state();
        let profile = ProfileSnapshot {
            occupation: "Student".to_string(),
            mental_wellness: "Good".to_string(),
        };
        let (status, Json(tasks)) = generate_tasks(
            State(state.clone()),
            Path("user1".to_string()),
            Json(profile),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(tasks.len(), 5);

        let request = CompleteTaskRequest {
            task_id: tasks[0].id,
            completed: true,
        };
        let Json(updated) = complete_task(State(state.clone()), Json(request)).await.unwrap();
        assert!(updated.completed);

        let Json(summary) = get_progress(State(state), Path("user1".to_string())).await.unwrap();
        assert_eq!(summary.total_tasks, 5);
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(summary.completion_rate, 20.0);
        assert_eq!(summary.streak_days, 1);
    }

    #[tokio::test]
    async fn complete_unknown_task_is_not_found() {
        let state = test_state();
        let request = CompleteTaskRequest {
            task_id: Uuid::new_v4(),
            completed: true,
        };
        let err = complete_task(State(state), Json(request)).await.unwrap_err();
        assert!(matches!(err.0, TaskError::NotFound { .. }));
    }
}
