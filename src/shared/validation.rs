//! Validation Utilities

use validator::ValidationErrors;

use super::error::{FieldError, LocationError};

/// Flatten validator errors into field/message pairs
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    // HashMap iteration order is unstable; keep reports deterministic
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Convert validation errors to a LocationError (first failing field wins)
pub fn location_error(errors: ValidationErrors) -> LocationError {
    match field_errors(&errors).into_iter().next() {
        Some(e) => LocationError::OutOfRange {
            field: e.field,
            message: e.message,
        },
        None => LocationError::OutOfRange {
            field: "coordinates".into(),
            message: "Validation failed".into(),
        },
    }
}
