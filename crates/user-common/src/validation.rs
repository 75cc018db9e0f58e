//! Validation helpers shared by the configuration consumers.

use validator::Validate;

/// A value failed its `validator` rules.
#[derive(Debug, thiserror::Error)]
#[error("Validation failed: {message}")]
pub struct ValidationFailed {
    pub message: String,
}

/// Validate a value, collapsing all rule violations into one message.
pub fn validate<T: Validate>(value: &T) -> Result<(), ValidationFailed> {
    value.validate().map_err(|e| ValidationFailed {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
///
/// Messages are sorted so the output does not depend on map ordering.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}
