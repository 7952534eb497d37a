//! Typed HTTP client for the tickmate API.
//!
//! The [`TodoApi`] trait is the seam between the store and the transport so
//! the store can be driven by a scripted backend in tests; [`HttpTodoApi`]
//! is the reqwest-backed implementation.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use tickmate_core::category::{Category, CreateCategory, UpdateCategory};
use tickmate_core::error::FieldError;
use tickmate_core::todo::{CreateTodo, GroupedTodos, Todo, TodoGroup, TodoListQuery, UpdateTodo};
use tickmate_core::types::DbId;

/// Client-side error: a decoded API error envelope, or a transport failure.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with an error envelope.
    #[error("{message}")]
    Api {
        code: String,
        message: String,
        details: Vec<FieldError>,
    },
    /// The request never produced a decodable response.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A list response: flat, or partitioned into category buckets.
#[derive(Debug, Clone, PartialEq)]
pub enum TodoListing {
    Flat(Vec<Todo>),
    Grouped(Vec<TodoGroup>),
}

/// Operations the stores need from the backend.
#[async_trait]
pub trait TodoApi: Send + Sync + 'static {
    async fn list_todos(&self, query: &TodoListQuery) -> Result<TodoListing, ClientError>;
    async fn get_todo(&self, id: DbId) -> Result<Todo, ClientError>;
    async fn create_todo(&self, input: &CreateTodo) -> Result<Todo, ClientError>;
    async fn update_todo(&self, id: DbId, input: &UpdateTodo) -> Result<Todo, ClientError>;
    async fn delete_todo(&self, id: DbId) -> Result<(), ClientError>;
    async fn toggle_todo(&self, id: DbId) -> Result<Todo, ClientError>;

    async fn list_categories(&self) -> Result<Vec<Category>, ClientError>;
    async fn create_category(&self, input: &CreateCategory) -> Result<Category, ClientError>;
    async fn update_category(
        &self,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Category, ClientError>;
    async fn delete_category(&self, id: DbId) -> Result<(), ClientError>;
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    details: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// List responses change shape with `groupByCategory`; the grouped shape is
/// tried first, then the flat one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListEnvelope {
    Grouped { data: GroupedTodos },
    Flat { data: Vec<Todo> },
}

/// reqwest-backed [`TodoApi`] implementation.
pub struct HttpTodoApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTodoApi {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn read_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    if response.status().is_success() {
        let envelope: DataEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    } else {
        Err(read_error(response).await)
    }
}

async fn read_empty(response: reqwest::Response) -> Result<(), ClientError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(read_error(response).await)
    }
}

async fn read_error(response: reqwest::Response) -> ClientError {
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => ClientError::Api {
            code: envelope.error.code,
            message: envelope.error.message,
            details: envelope.error.details,
        },
        Err(err) => ClientError::Http(err),
    }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list_todos(&self, query: &TodoListQuery) -> Result<TodoListing, ClientError> {
        let response = self
            .http
            .get(self.url("/api/todos"))
            .query(&query.to_query_pairs())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(read_error(response).await);
        }
        let listing = match response.json::<ListEnvelope>().await? {
            ListEnvelope::Grouped { data } => TodoListing::Grouped(data.grouped),
            ListEnvelope::Flat { data } => TodoListing::Flat(data),
        };
        Ok(listing)
    }

    async fn get_todo(&self, id: DbId) -> Result<Todo, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/todos/{id}")))
            .send()
            .await?;
        read_data(response).await
    }

    async fn create_todo(&self, input: &CreateTodo) -> Result<Todo, ClientError> {
        let response = self
            .http
            .post(self.url("/api/todos"))
            .json(input)
            .send()
            .await?;
        read_data(response).await
    }

    async fn update_todo(&self, id: DbId, input: &UpdateTodo) -> Result<Todo, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/api/todos/{id}")))
            .json(input)
            .send()
            .await?;
        read_data(response).await
    }

    async fn delete_todo(&self, id: DbId) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/todos/{id}")))
            .send()
            .await?;
        read_empty(response).await
    }

    async fn toggle_todo(&self, id: DbId) -> Result<Todo, ClientError> {
        let response = self
            .http
            .patch(self.url(&format!("/api/todos/{id}/toggle")))
            .send()
            .await?;
        read_data(response).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        let response = self.http.get(self.url("/api/categories")).send().await?;
        read_data(response).await
    }

    async fn create_category(&self, input: &CreateCategory) -> Result<Category, ClientError> {
        let response = self
            .http
            .post(self.url("/api/categories"))
            .json(input)
            .send()
            .await?;
        read_data(response).await
    }

    async fn update_category(
        &self,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Category, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/api/categories/{id}")))
            .json(input)
            .send()
            .await?;
        read_data(response).await
    }

    async fn delete_category(&self, id: DbId) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/categories/{id}")))
            .send()
            .await?;
        read_empty(response).await
    }
}
