use std::{error::Error as StdError, str::FromStr};

use async_trait::async_trait;
use derive_more::Display;
use enum_utils::TryFromRepr;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio_postgres::{
    types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    },
    Row,
};

use super::{user, Client, Error, TicketStore};

#[derive(Clone, Debug)]
pub struct Ticket {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub created_by: user::Id,
    pub assigned_to: Option<user::Id>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Ticket about to be inserted; the store assigns its id.
#[derive(Clone, Debug)]
pub struct New {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub created_by: user::Id,
    pub assigned_to: Option<user::Id>,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub id: Id,
    pub title: String,
}

/// Optional predicates of a ticket listing, all of which must hold.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    pub created_by: Option<user::Id>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<user::Id>,

    /// Case-insensitive substring of either the title or the description.
    pub query: Option<String>,
}

impl Filter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.created_by.map_or(true, |id| ticket.created_by == id)
            && self.status.map_or(true, |s| ticket.status == s)
            && self.priority.map_or(true, |p| ticket.priority == p)
            && self
                .assigned_to
                .map_or(true, |id| ticket.assigned_to == Some(id))
            && self.query.as_deref().map_or(true, |q| {
                let q = q.to_lowercase();
                ticket.title.to_lowercase().contains(&q)
                    || ticket.description.to_lowercase().contains(&q)
            })
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Id(i32);

impl From<i32> for Id {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl FromSql<'_> for Id {
    accepts!(INT4);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        i32::from_sql(ty, raw).map(Self)
    }
}

impl ToSql for Id {
    accepts!(INT4);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, out)
    }
}

/// Returned when a status or priority name is not recognized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownVariant;

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    TryFromRepr,
    PartialEq,
    Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Status {
    /// Newly reported, nobody has looked at it yet.
    Open = 1,

    /// An agent is working on it.
    InProgress = 2,

    /// A fix or answer was provided.
    Resolved = 3,

    /// No further work is expected. Can still be reopened.
    Closed = 4,
}

impl Default for Status {
    fn default() -> Self {
        Self::Open
    }
}

impl Status {
    pub const NAMES: &'static [&'static str] =
        &["OPEN", "IN_PROGRESS", "RESOLVED", "CLOSED"];
}

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "RESOLVED" => Ok(Self::Resolved),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(UnknownVariant),
        }
    }
}

impl FromSql<'_> for Status {
    accepts!(INT2);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let repr = i16::from_sql(ty, raw)?;
        let repr = u8::try_from(repr)?;
        let status = Self::try_from(repr).map_err(|_| "invalid status")?;
        Ok(status)
    }
}

impl ToSql for Status {
    accepts!(INT2);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        let repr = i16::from((*self) as u8);
        repr.to_sql(ty, out)
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    TryFromRepr,
    PartialEq,
    Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Priority {
    pub const NAMES: &'static [&'static str] = &["LOW", "MEDIUM", "HIGH"];
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(UnknownVariant),
        }
    }
}

impl FromSql<'_> for Priority {
    accepts!(INT2);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let repr = i16::from_sql(ty, raw)?;
        let repr = u8::try_from(repr)?;
        let priority = Self::try_from(repr).map_err(|_| "invalid priority")?;
        Ok(priority)
    }
}

impl ToSql for Priority {
    accepts!(INT2);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        let repr = i16::from((*self) as u8);
        repr.to_sql(ty, out)
    }
}

fn from_row(row: &Row) -> Ticket {
    Ticket {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status: row.get("status"),
        priority: row.get("priority"),
        created_by: row.get("created_by_id"),
        assigned_to: row.get("assigned_to_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl TicketStore for Client {
    async fn get_ticket_by_id(&self, id: Id) -> Result<Option<Ticket>, Error> {
        const SQL: &str = "\
            SELECT id, title, description, status, priority, \
                   created_by_id, assigned_to_id, \
                   created_at, updated_at \
            FROM tickets \
            WHERE id = $1";
        Ok(self.0.query_opt(SQL, &[&id]).await?.as_ref().map(from_row))
    }

    async fn insert_ticket(&self, ticket: &New) -> Result<Ticket, Error> {
        const SQL: &str = "\
            INSERT INTO tickets (title, description, status, priority, \
                                 created_by_id, assigned_to_id, \
                                 created_at, updated_at) \
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
            RETURNING id, title, description, status, priority, \
                      created_by_id, assigned_to_id, \
                      created_at, updated_at";

        let row = self
            .0
            .query_one(
                SQL,
                &[
                    &ticket.title,
                    &ticket.description,
                    &Status::Open,
                    &ticket.priority,
                    &ticket.created_by,
                    &ticket.assigned_to,
                    &ticket.created_at,
                ],
            )
            .await?;
        Ok(from_row(&row))
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<bool, Error> {
        const SQL: &str = "\
            UPDATE tickets \
            SET title = $2, \
                description = $3, \
                status = $4, \
                priority = $5, \
                assigned_to_id = $6, \
                updated_at = $7 \
            WHERE id = $1";

        let updated = self
            .0
            .execute(
                SQL,
                &[
                    &ticket.id,
                    &ticket.title,
                    &ticket.description,
                    &ticket.status,
                    &ticket.priority,
                    &ticket.assigned_to,
                    &ticket.updated_at,
                ],
            )
            .await?;
        Ok(updated > 0)
    }

    async fn delete_ticket(&self, id: Id) -> Result<bool, Error> {
        // Comments go with it through `ON DELETE CASCADE`.
        const SQL: &str = "DELETE FROM tickets WHERE id = $1";
        Ok(self.0.execute(SQL, &[&id]).await? > 0)
    }

    async fn get_tickets(&self, filter: &Filter) -> Result<Vec<Ticket>, Error> {
        const SQL: &str = "\
            SELECT id, title, description, status, priority, \
                   created_by_id, assigned_to_id, \
                   created_at, updated_at \
            FROM tickets \
            WHERE ($1::INT4 IS NULL OR created_by_id = $1) \
              AND ($2::INT2 IS NULL OR status = $2) \
              AND ($3::INT2 IS NULL OR priority = $3) \
              AND ($4::INT4 IS NULL OR assigned_to_id = $4) \
              AND ($5::TEXT IS NULL \
                   OR strpos(lower(title), lower($5)) > 0 \
                   OR strpos(lower(description), lower($5)) > 0) \
            ORDER BY created_at DESC, \
                     id DESC";
        Ok(self
            .0
            .query(
                SQL,
                &[
                    &filter.created_by,
                    &filter.status,
                    &filter.priority,
                    &filter.assigned_to,
                    &filter.query,
                ],
            )
            .await?
            .iter()
            .map(from_row)
            .collect())
    }
}
