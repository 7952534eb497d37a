//! Handlers for the category resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use tickmate_core::category::{Category, CreateCategory, UpdateCategory};
use tickmate_core::error::CoreError;
use tickmate_core::validation::field_errors;
use tickmate_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::parse_id;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/categories
///
/// List all categories sorted by name ascending, each annotated with its
/// live todo count.
pub async fn list_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let rows = CategoryRepo::list(&state.pool).await?;
    let data: Vec<Category> = rows.into_iter().map(Category::from).collect();

    Ok(Json(DataResponse { data }))
}

/// POST /api/categories
///
/// A duplicate name is rejected with CONFLICT by the unique constraint.
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    let input = input.normalized();
    input
        .validate()
        .map_err(|e| AppError::validation("Validation failed", field_errors(&e)))?;

    let row = CategoryRepo::create(&state.pool, &input.name).await?;

    tracing::info!(category_id = row.id, "Category created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: Category::from(row),
        }),
    ))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&raw_id, "Invalid category ID")?;
    let input = input.normalized();
    input
        .validate()
        .map_err(|e| AppError::validation("Validation failed", field_errors(&e)))?;

    let row = CategoryRepo::update(&state.pool, id, &input.name)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;

    tracing::info!(category_id = id, "Category renamed");

    Ok(Json(DataResponse {
        data: Category::from(row),
    }))
}

/// DELETE /api/categories/{id}
///
/// Referencing todos have their category reference cleared, never deleted.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&raw_id, "Invalid category ID")?;

    let deleted = CategoryRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }));
    }

    tracing::info!(category_id = id, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}
