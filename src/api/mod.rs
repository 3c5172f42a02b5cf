pub mod auth;
pub mod comment;
pub mod ticket;
pub mod user;

use serde::{de::IgnoredAny, Deserialize, Serialize};

use crate::error::Validation;

pub use self::{comment::Comment, ticket::Ticket, user::User};

/// Plain acknowledgement.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Message {
    pub message: String,
}

/// Body of every failed request.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Failure {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,

    /// Tickets the caller could have meant, on a ticket lookup miss.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<ticket::Summary>>,
}

/// Identifier as clients send it: a JSON number or a numeric string.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumericId {
    Number(i64),
    Text(String),
}

impl NumericId {
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    pub fn parse<T: From<i32>>(
        &self,
        field: &'static str,
    ) -> Result<T, Validation> {
        let invalid = || Validation::InvalidId(field, self.to_string());
        let id = match self {
            Self::Number(n) => i32::try_from(*n).map_err(|_| invalid())?,
            Self::Text(s) => s.trim().parse::<i32>().map_err(|_| invalid())?,
        };
        Ok(T::from(id))
    }
}

impl std::fmt::Display for NumericId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Input where only a string carries meaning. Numbers, booleans and the
/// like still parse, and read as no text at all.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Text(String),
    Other(IgnoredAny),
}

impl Loose {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Other(_) => None,
        }
    }
}

impl From<&str> for Loose {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}
