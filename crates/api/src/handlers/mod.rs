//! HTTP handlers, one module per resource.

pub mod categories;
pub mod todos;

use tickmate_core::error::FieldError;
use tickmate_core::types::DbId;

use crate::error::{AppError, AppResult};

/// Parse a path id, producing a `VALIDATION_ERROR` with an `id` field
/// detail when the value is not numeric.
pub(crate) fn parse_id(raw: &str, message: &'static str) -> AppResult<DbId> {
    raw.parse::<DbId>().map_err(|_| {
        AppError::validation(message, vec![FieldError::new("id", "ID must be a number")])
    })
}
