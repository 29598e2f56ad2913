//! | Method | Path                           |
//! |--------|--------------------------------|
//! | GET    | /health                        |
//! | GET    | /counter                       |
//! | POST   | /counter/increment             |
//! | GET    | /notes                         |
//! | POST   | /notes                         |
//! | GET    | /todos                         |
//! | POST   | /todos                         |
//! | GET    | /users                         |
//! | GET    | /users/search/email            |
//! | GET    | /users/search/email-prefix     |
//! | GET    | /users/search/email-contains   |
//! | GET    | /users/country/{country}       |
//! | GET    | /users/stats                   |

use axum::Router;
use axum::routing::{get, post};

use crate::handlers::{counter, health, notes, todos, users};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/counter", get(counter::get_counter))
        .route("/counter/increment", post(counter::increment_counter))
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route("/users", get(users::list_users))
        .route("/users/search/email", get(users::search_email))
        .route("/users/search/email-prefix", get(users::search_email_prefix))
        .route("/users/search/email-contains", get(users::search_email_contains))
        .route("/users/country/{country}", get(users::users_by_country))
        .route("/users/stats", get(users::user_stats))
        .with_state(state)
}
