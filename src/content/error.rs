//! Upstream shape violations found while mapping documents

use thiserror::Error;

/// A raw document did not have the shape the view models require
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("document {document}: missing required field `{field}`")]
    MissingField { document: String, field: String },

    #[error("document {document}: field `{field}` is invalid: {reason}")]
    InvalidField {
        document: String,
        field: String,
        reason: String,
    },
}

impl ContentError {
    /// The dotted path of the offending field, e.g. `data.banner.url`
    pub fn field(&self) -> &str {
        match self {
            ContentError::MissingField { field, .. } => field,
            ContentError::InvalidField { field, .. } => field,
        }
    }
}
