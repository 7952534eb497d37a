//! Handlers for the todo resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use validator::Validate;

use tickmate_core::error::CoreError;
use tickmate_core::todo::{
    group_by_category, CreateTodo, GroupedTodos, ListTodosParams, Todo, TodoListQuery, UpdateTodo,
};
use tickmate_core::types::DbId;
use tickmate_core::validation::field_errors;
use tickmate_db::models::todo::{NewTodo, TodoChanges};
use tickmate_db::repositories::{CategoryRepo, TodoRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::parse_id;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/todos
///
/// Status and category filters combine conjunctively. With
/// `groupByCategory=true` the payload switches to category buckets ordered
/// by name ascending with the uncategorized bucket last; empty buckets are
/// omitted.
pub async fn list_todos(
    State(state): State<AppState>,
    Query(params): Query<ListTodosParams>,
) -> AppResult<Response> {
    let query = TodoListQuery::parse(&params)?;
    let rows = TodoRepo::list(&state.pool, &query).await?;
    let todos: Vec<Todo> = rows.into_iter().map(Todo::from).collect();

    if query.group_by_category {
        let data = GroupedTodos {
            grouped: group_by_category(todos),
        };
        return Ok(Json(DataResponse { data }).into_response());
    }

    Ok(Json(DataResponse { data: todos }).into_response())
}

/// GET /api/todos/{id}
pub async fn get_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&raw_id, "Invalid todo ID")?;

    let row = TodoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Todo", id }))?;

    Ok(Json(DataResponse {
        data: Todo::from(row),
    }))
}

/// POST /api/todos
///
/// A provided `categoryId` must reference an existing category.
pub async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> AppResult<impl IntoResponse> {
    let input = input.normalized();
    input
        .validate()
        .map_err(|e| AppError::validation("Validation failed", field_errors(&e)))?;

    if let Some(category_id) = input.category_id {
        ensure_category_exists(&state, category_id).await?;
    }

    let due_date = input.parsed_due_date();
    let row = TodoRepo::create(
        &state.pool,
        &NewTodo {
            title: input.title,
            description: input.description,
            due_date,
            category_id: input.category_id,
        },
    )
    .await?;

    tracing::info!(todo_id = row.id, "Todo created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: Todo::from(row),
        }),
    ))
}

/// PUT /api/todos/{id}
///
/// Full-replacement update: optional fields sent as `null` (or omitted) are
/// cleared, except `completed`, which keeps the stored value when omitted.
pub async fn update_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(input): Json<UpdateTodo>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&raw_id, "Invalid todo ID")?;
    let input = input.normalized();
    input
        .validate()
        .map_err(|e| AppError::validation("Validation failed", field_errors(&e)))?;

    let existing = TodoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Todo", id }))?;

    if let Some(category_id) = input.category_id {
        ensure_category_exists(&state, category_id).await?;
    }

    let due_date = input.parsed_due_date();
    let row = TodoRepo::update(
        &state.pool,
        id,
        &TodoChanges {
            title: input.title,
            description: input.description,
            due_date,
            category_id: input.category_id,
            completed: input.completed.unwrap_or(existing.completed),
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "Todo", id }))?;

    tracing::info!(todo_id = id, "Todo updated");

    Ok(Json(DataResponse {
        data: Todo::from(row),
    }))
}

/// DELETE /api/todos/{id}
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&raw_id, "Invalid todo ID")?;

    let deleted = TodoRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Todo", id }));
    }

    tracing::info!(todo_id = id, "Todo deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/todos/{id}/toggle
///
/// Flips `completed` unconditionally and touches `updated_at`.
pub async fn toggle_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&raw_id, "Invalid todo ID")?;

    let existing = TodoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Todo", id }))?;

    let row = TodoRepo::set_completed(&state.pool, id, !existing.completed)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Todo", id }))?;

    tracing::info!(todo_id = id, completed = row.completed, "Todo toggled");

    Ok(Json(DataResponse {
        data: Todo::from(row),
    }))
}

/// Reject writes that reference a category that does not exist.
async fn ensure_category_exists(state: &AppState, id: DbId) -> AppResult<()> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))
}
