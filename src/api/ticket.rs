use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::api::{self, Loose, NumericId};

pub use crate::db::ticket::{Id, Priority, Status, Summary};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub created_by_id: api::user::Id,
    pub assigned_to_id: Option<api::user::Id>,
    pub created_by: api::User,
    pub assigned_to: Option<api::User>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Ticket together with its comment thread.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Detail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub comments: Vec<api::Comment>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Shown {
    pub ticket: Detail,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct List {
    pub tickets: Vec<Ticket>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Saved {
    pub ticket: Ticket,
    pub message: String,
}

/// Fields a new ticket is opened with. Anything else in the body, such as a
/// requested `status`, is ignored.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Loose>,

    /// Honored for agents opening a ticket on someone's behalf.
    pub created_by_id: Option<NumericId>,
    pub assigned_to_id: Option<NumericId>,
}

/// Fields an agent may change; absent ones are left as they are.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Changes {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to_id: Option<NumericId>,
}

/// Listing filters. `ALL` or an empty value disables a filter.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Query {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to_id: Option<String>,
    pub q: Option<String>,
}
