pub mod categories;
pub mod health;
pub mod todos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /categories            list (GET), create (POST)
/// /categories/{id}       update (PUT), delete (DELETE)
///
/// /todos                 list (GET), create (POST)
/// /todos/{id}            get (GET), update (PUT), delete (DELETE)
/// /todos/{id}/toggle     toggle completion (PATCH)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/todos", todos::router())
}
