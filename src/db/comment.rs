use std::error::Error as StdError;

use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio_postgres::{
    types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    },
    Row,
};

use super::{ticket, user, Client, CommentStore, Error};

#[derive(Clone, Debug)]
pub struct Comment {
    pub id: Id,
    pub message: String,
    pub ticket_id: ticket::Id,
    pub author_id: user::Id,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct New {
    pub message: String,
    pub ticket_id: ticket::Id,
    pub author_id: user::Id,
    pub created_at: OffsetDateTime,
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

fn from_row(row: &Row) -> Comment {
    Comment {
        id: row.get("id"),
        message: row.get("message"),
        ticket_id: row.get("ticket_id"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl CommentStore for Client {
    async fn insert_comment(&self, comment: &New) -> Result<Comment, Error> {
        const SQL: &str = "\
            INSERT INTO comments (message, ticket_id, author_id, created_at) \
            VALUES ($1, $2, $3, $4) \
            RETURNING id, message, ticket_id, author_id, created_at";

        let row = self
            .0
            .query_one(
                SQL,
                &[
                    &comment.message,
                    &comment.ticket_id,
                    &comment.author_id,
                    &comment.created_at,
                ],
            )
            .await?;
        Ok(from_row(&row))
    }

    async fn get_comments_by_ticket(
        &self,
        ticket_id: ticket::Id,
    ) -> Result<Vec<Comment>, Error> {
        const SQL: &str = "\
            SELECT id, message, ticket_id, author_id, created_at \
            FROM comments \
            WHERE ticket_id = $1 \
            ORDER BY created_at ASC, \
                     id ASC";
        Ok(self
            .0
            .query(SQL, &[&ticket_id])
            .await?
            .iter()
            .map(from_row)
            .collect())
    }
}
