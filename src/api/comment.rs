use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::api::{self, NumericId};

pub use crate::db::comment::Id;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub message: String,
    pub ticket_id: api::ticket::Id,
    pub author_id: api::user::Id,
    pub author: api::User,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct List {
    pub comments: Vec<Comment>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Saved {
    pub comment: Comment,
    pub message: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct NewComment {
    pub ticket_id: Option<NumericId>,
    pub message: Option<String>,
}
