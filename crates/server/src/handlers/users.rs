use axum::Json;
use axum::extract::{Path, Query, State};
use notesapi_core::{CountryCount, User};
use notesapi_engine::EmailMatch;

use crate::dto::{PageQuery, SearchQuery};
use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// GET /users?skip=&take=
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let records = state.records.clone();
    Ok(Json(blocking(move || records.list_users(page.into())).await?))
}

async fn search(state: AppState, by: EmailMatch, q: String) -> Result<Json<Vec<User>>, ApiError> {
    let records = state.records.clone();
    Ok(Json(blocking(move || records.search_users(by, &q)).await?))
}

/// GET /users/search/email?q=
pub async fn search_email(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    search(state, EmailMatch::Exact, query.q).await
}

/// GET /users/search/email-prefix?q=
pub async fn search_email_prefix(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    search(state, EmailMatch::Prefix, query.q).await
}

/// GET /users/search/email-contains?q=
pub async fn search_email_contains(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    search(state, EmailMatch::Contains, query.q).await
}

/// GET /users/country/{country}
pub async fn users_by_country(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Result<Json<Vec<User>>, ApiError> {
    let records = state.records.clone();
    Ok(Json(blocking(move || records.users_in_country(&country)).await?))
}

/// GET /users/stats
pub async fn user_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<CountryCount>>, ApiError> {
    let records = state.records.clone();
    Ok(Json(blocking(move || records.user_stats()).await?))
}
