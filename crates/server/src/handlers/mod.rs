pub mod counter;
pub mod notes;
pub mod todos;
pub mod users;

/// GET /health
pub async fn health() -> &'static str {
    "API is running!"
}
