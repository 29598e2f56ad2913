use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use notesapi_core::Todo;

use crate::dto::{CreateTodoRequest, CreatedTodo};
use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// GET /todos
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let records = state.records.clone();
    Ok(Json(blocking(move || records.list_todos()).await?))
}

/// POST /todos
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::from(e).with_details("invalid input"))?;
    let records = state.records.clone();
    let todo = blocking(move || records.create_todo(&input.task, input.is_completed))
        .await
        .map_err(|e| e.with_details("invalid input"))?;

    let location = format!("/todos/{}", todo.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreatedTodo {
            id: todo.id,
            task: todo.task,
        }),
    ))
}
