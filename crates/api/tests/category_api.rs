//! HTTP-level integration tests for the `/api/categories` endpoints.
//!
//! Uses Axum's `tower::ServiceExt` to send requests directly to the router.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_json, put_json};
use serde_json::json;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Test: create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_category(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = post_json(app.clone(), "/api/categories", json!({"name": "Work"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Work");
    assert_eq!(json["data"]["todoCount"], 0);
    assert!(json["data"]["id"].as_i64().is_some());
    assert!(json["data"]["createdAt"].as_str().is_some());
    assert!(json["data"]["updatedAt"].as_str().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_trims_name(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = post_json(app, "/api/categories", json!({"name": "  Work  "})).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Work");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_blank_name_is_validation_error(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = post_json(app.clone(), "/api/categories", json!({"name": "   "})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    let details = json["error"]["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["field"], "name");
    assert_eq!(details[0]["message"], "Name is required");

    // Nothing was persisted.
    let response = get(app, "/api/categories").await;
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_name_over_fifty_chars_is_validation_error(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/categories",
        json!({"name": "x".repeat(51)}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"]["details"][0]["message"],
        "Name must be at most 50 characters"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_name_is_conflict(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = post_json(app.clone(), "/api/categories", json!({"name": "Work"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(app.clone(), "/api/categories", json!({"name": "Work"})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "CONFLICT");

    // The category count stays at 1.
    let response = get(app, "/api/categories").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_is_sorted_by_name_with_counts(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = post_json(app.clone(), "/api/categories", json!({"name": "Work"})).await;
    let work_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    post_json(app.clone(), "/api/categories", json!({"name": "Errands"})).await;

    post_json(
        app.clone(),
        "/api/todos",
        json!({"title": "report", "categoryId": work_id}),
    )
    .await;

    let response = get(app, "/api/categories").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["name"], "Errands");
    assert_eq!(data[0]["todoCount"], 0);
    assert_eq!(data[1]["name"], "Work");
    assert_eq!(data[1]["todoCount"], 1);
}

// ---------------------------------------------------------------------------
// Test: update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_renames_category(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = post_json(app.clone(), "/api/categories", json!({"name": "Wrok"})).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = put_json(
        app,
        &format!("/api/categories/{id}"),
        json!({"name": "Work"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Work");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_category_is_not_found(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = put_json(app, "/api/categories/999", json!({"name": "Work"})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_non_numeric_id_is_validation_error(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = put_json(app, "/api/categories/abc", json!({"name": "Work"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["details"][0]["field"], "id");
    assert_eq!(json["error"]["details"][0]["message"], "ID must be a number");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_to_existing_name_is_conflict(pool: SqlitePool) {
    let app = build_test_app(pool);

    post_json(app.clone(), "/api/categories", json!({"name": "Work"})).await;
    let response = post_json(app.clone(), "/api/categories", json!({"name": "Personal"})).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = put_json(
        app,
        &format!("/api/categories/{id}"),
        json!({"name": "Work"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Test: delete clears references
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_clears_todo_references(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = post_json(app.clone(), "/api/categories", json!({"name": "Work"})).await;
    let category_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let mut todo_ids = Vec::new();
    for title in ["a", "b"] {
        let response = post_json(
            app.clone(),
            "/api/todos",
            json!({"title": title, "categoryId": category_id}),
        )
        .await;
        todo_ids.push(body_json(response).await["data"]["id"].as_i64().unwrap());
    }

    let response = delete(app.clone(), &format!("/api/categories/{category_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The todos survive with their category reference cleared.
    for id in todo_ids {
        let response = get(app.clone(), &format!("/api/todos/{id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["categoryId"], serde_json::Value::Null);
        assert_eq!(json["data"]["category"], serde_json::Value::Null);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_missing_category_is_not_found(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = delete(app, "/api/categories/42").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
