//! Category domain types and input validation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::types::{DbId, Timestamp};
use crate::validation::invalid;

/// A category as it appears in API payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: DbId,
    pub name: String,
    /// Number of todos currently referencing this category. Computed at
    /// read time by an aggregation query, never stored.
    pub todo_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Category summary embedded in todo payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: DbId,
    pub name: String,
}

/// Input for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(custom(function = validate_name))]
    pub name: String,
}

impl CreateCategory {
    /// Trim the name so validation and storage both see the same value.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

/// Input for renaming a category. Same shape as [`CreateCategory`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(custom(function = validate_name))]
    pub name: String,
}

impl UpdateCategory {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("required", "Name is required"));
    }
    if name.chars().count() > 50 {
        return Err(invalid("max_length", "Name must be at most 50 characters"));
    }
    Ok(())
}
