use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use notesapi_core::DEFAULT_HISTORY_LIMIT;

use crate::dto::{CounterResponse, IncrementRequest, IncrementResponse};
use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// GET /counter
pub async fn get_counter(State(state): State<AppState>) -> Result<Json<CounterResponse>, ApiError> {
    let counter = state.counter.clone();
    let snapshot = blocking(move || counter.get_state(DEFAULT_HISTORY_LIMIT)).await?;
    Ok(Json(snapshot.into()))
}

/// POST /counter/increment
pub async fn increment_counter(
    State(state): State<AppState>,
    payload: Result<Json<IncrementRequest>, JsonRejection>,
) -> Result<Json<IncrementResponse>, ApiError> {
    let Json(input) = payload?;
    let who = input.who.unwrap_or_default();
    let counter = state.counter.clone();
    let increment = blocking(move || counter.increment(&who)).await?;
    Ok(Json(IncrementResponse {
        value: increment.value,
        who: increment.who.into_inner(),
    }))
}
