use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use notesapi_core::Note;

use crate::dto::{CreateNoteRequest, CreatedNote};
use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// GET /notes
pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    let records = state.records.clone();
    Ok(Json(blocking(move || records.list_notes()).await?))
}

/// POST /notes
pub async fn create_note(
    State(state): State<AppState>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::from(e).with_details("invalid input"))?;
    let records = state.records.clone();
    let note = blocking(move || records.create_note(&input.title, &input.body))
        .await
        .map_err(|e| e.with_details("invalid input"))?;

    let location = format!("/notes/{}", note.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreatedNote {
            id: note.id,
            title: note.title,
        }),
    ))
}
