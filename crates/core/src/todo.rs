//! Todo domain types, input validation, list-query parsing, and the
//! grouped-view assembly.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::category::CategoryInfo;
use crate::error::{CoreError, FieldError};
use crate::types::{DbId, Timestamp};
use crate::validation::invalid;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A todo as it appears in API payloads, including its category summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    pub completed: bool,
    pub category_id: Option<DbId>,
    pub category: Option<CategoryInfo>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One bucket of the grouped list view. `category` is `None` for the
/// trailing uncategorized bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoGroup {
    pub category: Option<CategoryInfo>,
    pub todos: Vec<Todo>,
}

/// Payload shape for `groupByCategory=true` responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedTodos {
    pub grouped: Vec<TodoGroup>,
}

// ---------------------------------------------------------------------------
// Input DTOs
// ---------------------------------------------------------------------------

/// Input for creating a todo. `due_date` stays a raw string here so a parse
/// failure surfaces as a field diagnostic rather than a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    #[validate(custom(function = validate_title))]
    pub title: String,
    #[validate(custom(function = validate_description))]
    pub description: Option<String>,
    #[validate(custom(function = validate_due_date))]
    pub due_date: Option<String>,
    #[validate(range(min = 1, message = "Category ID must be a positive integer"))]
    pub category_id: Option<DbId>,
}

impl CreateTodo {
    /// Trim free-text fields so validation and storage see the same values.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.map(|d| d.trim().to_string());
        self
    }

    /// The due date as a UTC timestamp. Meaningful after validation passed.
    pub fn parsed_due_date(&self) -> Option<Timestamp> {
        parse_due_date(self.due_date.as_deref())
    }
}

/// Input for replacing a todo. Title is still required; `completed` is
/// optional and defaults to the stored value when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[validate(custom(function = validate_title))]
    pub title: String,
    #[validate(custom(function = validate_description))]
    pub description: Option<String>,
    #[validate(custom(function = validate_due_date))]
    pub due_date: Option<String>,
    #[validate(range(min = 1, message = "Category ID must be a positive integer"))]
    pub category_id: Option<DbId>,
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.map(|d| d.trim().to_string());
        self
    }

    /// The due date as a UTC timestamp. Meaningful after validation passed.
    pub fn parsed_due_date(&self) -> Option<Timestamp> {
        parse_due_date(self.due_date.as_deref())
    }
}

fn parse_due_date(raw: Option<&str>) -> Option<Timestamp> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(invalid("required", "Title is required"));
    }
    if title.chars().count() > 200 {
        return Err(invalid("max_length", "Title must be at most 200 characters"));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().chars().count() > 2000 {
        return Err(invalid(
            "max_length",
            "Description must be at most 2000 characters",
        ));
    }
    Ok(())
}

fn validate_due_date(raw: &str) -> Result<(), ValidationError> {
    if DateTime::parse_from_rfc3339(raw).is_err() {
        return Err(invalid(
            "datetime",
            "Due date must be a valid ISO 8601 date",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// List-query parsing
// ---------------------------------------------------------------------------

/// Completion filter for the list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

/// Sort key for the list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    CreatedAt,
    DueDate,
}

/// Sort direction for the list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Category filter: a concrete category, or explicitly-uncategorized
/// (the query string literal `null`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    Uncategorized,
    Category(DbId),
}

/// Raw, undecoded query string values for the todo list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTodosParams {
    pub status: Option<String>,
    pub category_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub group_by_category: Option<String>,
}

/// Validated list-endpoint settings. Doubles as the client store's filter
/// state, since the two are the same shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoListQuery {
    pub status: StatusFilter,
    pub category: Option<CategoryFilter>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub group_by_category: bool,
}

impl TodoListQuery {
    /// Parse raw query values, collecting every violation instead of
    /// stopping at the first.
    pub fn parse(params: &ListTodosParams) -> Result<Self, CoreError> {
        let mut details = Vec::new();
        let mut query = Self::default();

        match params.status.as_deref() {
            None | Some("all") => {}
            Some("active") => query.status = StatusFilter::Active,
            Some("completed") => query.status = StatusFilter::Completed,
            Some(_) => details.push(FieldError::new(
                "status",
                "Status must be one of: all, active, completed",
            )),
        }

        match params.category_id.as_deref() {
            None => {}
            Some("null") => query.category = Some(CategoryFilter::Uncategorized),
            Some(raw) => match raw.parse::<DbId>() {
                Ok(id) if id > 0 => query.category = Some(CategoryFilter::Category(id)),
                _ => details.push(FieldError::new(
                    "categoryId",
                    "Category ID must be 'null' or a positive integer",
                )),
            },
        }

        match params.sort_by.as_deref() {
            None | Some("createdAt") => {}
            Some("dueDate") => query.sort_by = SortBy::DueDate,
            Some(_) => details.push(FieldError::new(
                "sortBy",
                "Sort field must be one of: createdAt, dueDate",
            )),
        }

        match params.sort_order.as_deref() {
            None | Some("desc") => {}
            Some("asc") => query.sort_order = SortOrder::Asc,
            Some(_) => details.push(FieldError::new(
                "sortOrder",
                "Sort order must be one of: asc, desc",
            )),
        }

        // Anything other than the literal "true" means false, never an error.
        query.group_by_category = params.group_by_category.as_deref() == Some("true");

        if details.is_empty() {
            Ok(query)
        } else {
            Err(CoreError::Validation {
                message: "Validation failed".to_string(),
                details,
            })
        }
    }

    /// Encode as query pairs for the HTTP client, omitting values the list
    /// endpoint would default anyway.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = Vec::new();
        match self.status {
            StatusFilter::All => {}
            StatusFilter::Active => pairs.push(("status", "active".to_string())),
            StatusFilter::Completed => pairs.push(("status", "completed".to_string())),
        }
        match self.category {
            None => {}
            Some(CategoryFilter::Uncategorized) => pairs.push(("categoryId", "null".to_string())),
            Some(CategoryFilter::Category(id)) => pairs.push(("categoryId", id.to_string())),
        }
        let sort_by = match self.sort_by {
            SortBy::CreatedAt => "createdAt",
            SortBy::DueDate => "dueDate",
        };
        pairs.push(("sortBy", sort_by.to_string()));
        let sort_order = match self.sort_order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        pairs.push(("sortOrder", sort_order.to_string()));
        if self.group_by_category {
            pairs.push(("groupByCategory", "true".to_string()));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// Grouped-view assembly
// ---------------------------------------------------------------------------

/// Partition an ordered todo list into category buckets.
///
/// Bucket contents keep the incoming todo order. Buckets are emitted in
/// category-name order with the uncategorized bucket last. Empty buckets
/// cannot occur: a bucket exists only for todos present in the input.
pub fn group_by_category(todos: Vec<Todo>) -> Vec<TodoGroup> {
    let mut buckets: IndexMap<Option<DbId>, TodoGroup> = IndexMap::new();
    for todo in todos {
        let bucket = buckets.entry(todo.category_id).or_insert_with(|| TodoGroup {
            category: todo.category.clone(),
            todos: Vec::new(),
        });
        bucket.todos.push(todo);
    }

    let mut uncategorized = None;
    let mut grouped = Vec::with_capacity(buckets.len());
    for (key, bucket) in buckets {
        if key.is_some() {
            grouped.push(bucket);
        } else {
            uncategorized = Some(bucket);
        }
    }
    grouped.sort_by(|a, b| {
        let a = a.category.as_ref().map(|c| c.name.as_str()).unwrap_or_default();
        let b = b.category.as_ref().map(|c| c.name.as_str()).unwrap_or_default();
        a.cmp(b)
    });
    grouped.extend(uncategorized);
    grouped
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
