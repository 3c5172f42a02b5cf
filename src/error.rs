use derive_more::From;

use crate::db::{
    self,
    ticket::{Priority, Status},
};

/// Failure of a helpdesk operation.
#[derive(Debug, From)]
pub enum Error {
    /// No credential, or one that doesn't resolve to a user.
    Unauthenticated,

    /// Authenticated, but the role or ownership doesn't allow the action.
    Forbidden,

    #[from]
    Validation(Validation),

    NotFound,

    #[from]
    Internal(db::Error),

    /// Signing a credential failed.
    #[from]
    Token(jsonwebtoken::errors::Error),
}

/// Rejected input, reported back to the caller as is.
#[derive(Debug, PartialEq)]
pub enum Validation {
    Required(&'static str),
    InvalidStatus(String),
    InvalidPriority(String),
    InvalidId(&'static str, String),
    UnknownUser(&'static str),
    NotAnAgent(&'static str),
    Malformed(String),
}

impl Validation {
    pub fn message(&self) -> String {
        match self {
            Self::Required(field) => format!("`{field}` is required"),
            Self::InvalidStatus(value) => format!("invalid status `{value}`"),
            Self::InvalidPriority(value) => {
                format!("invalid priority `{value}`")
            }
            Self::InvalidId(field, value) => {
                format!("`{field}` must be a number or null, got `{value}`")
            }
            Self::UnknownUser(field) => {
                format!("`{field}` does not reference an existing user")
            }
            Self::NotAnAgent(field) => {
                format!("`{field}` must reference an agent")
            }
            Self::Malformed(detail) => format!("malformed request: {detail}"),
        }
    }

    /// Legal values, when the input had to be one of a fixed set.
    pub fn allowed(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::InvalidStatus(_) => Some(Status::NAMES),
            Self::InvalidPriority(_) => Some(Priority::NAMES),
            Self::Required(_)
            | Self::InvalidId(..)
            | Self::UnknownUser(_)
            | Self::NotAnAgent(_)
            | Self::Malformed(_) => None,
        }
    }
}

/// Rejects absent or blank text.
pub(crate) fn required(
    field: &'static str,
    value: Option<String>,
) -> Result<String, Validation> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(Validation::Required(field))
}
