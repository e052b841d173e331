// SPDX-License-Identifier: Apache-2.0

use roster_model::ValidationError;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    NotFound(String),
    Conflict(String),
    Validation(ValidationError),
    Persistence(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(msg) | Self::Conflict(msg) => f.write_str(msg),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persistence(msg) => write!(f, "store failure: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
