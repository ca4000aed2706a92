use std::fmt;

use crate::domain::Field;

/// A single failed submission rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: Field,
    /// Why it failed.
    pub reason: Reason,
}

impl ValidationError {
    pub(crate) const fn new(field: Field, reason: Reason) -> Self {
        Self { field, reason }
    }
}

/// The reason a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// The field is required but empty.
    Missing,
    /// The field has a value outside its allowed set.
    Invalid,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("is required"),
            Self::Invalid => f.write_str("has an invalid value"),
        }
    }
}
