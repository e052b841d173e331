// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

/// One or more rejected input fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub field_errors: Vec<FieldError>,
}

impl ValidationError {
    #[must_use]
    pub fn single(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field_errors: vec![FieldError {
                field,
                reason: reason.into(),
            }],
        }
    }

    pub(crate) fn push(&mut self, field: &'static str, reason: impl Into<String>) {
        self.field_errors.push(FieldError {
            field,
            reason: reason.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.field_errors.iter().any(|e| e.field == field)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.field_errors.is_empty() {
            return f.write_str("validation failed");
        }
        let parts = self
            .field_errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.reason))
            .collect::<Vec<_>>();
        write!(f, "validation failed: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_field() {
        let mut err = ValidationError::single("name", "must not be empty");
        err.push("email", "must be a valid email address");
        assert_eq!(
            err.to_string(),
            "validation failed: name: must not be empty; email: must be a valid email address"
        );
        assert!(err.has_field("email"));
        assert!(!err.has_field("phone"));
    }
}
