//! Helpers shared by the DTO validators.

use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::FieldError;

/// Build a [`ValidationError`] with a fixed code and human-readable message.
pub fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Flatten `validator` output into wire-shaped field diagnostics.
///
/// Every violated field contributes one entry, so multi-field failures are
/// all reported together. Field names are converted to camelCase to match
/// the JSON payloads, and the result is sorted by field name so the order
/// is deterministic.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut details = Vec::new();
    for (field, kind) in errors.errors() {
        if let ValidationErrorsKind::Field(errs) = kind {
            let field = snake_to_camel(field.as_ref());
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                details.push(FieldError::new(field.clone(), message));
            }
        }
    }
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

fn snake_to_camel(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
