use std::{collections::HashMap, error::Error as StdError};

use async_trait::async_trait;
use derive_more::Display;
use enum_utils::TryFromRepr;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use tokio_postgres::{
    types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    },
    Row,
};

use super::{Client, Error, UserStore};

#[derive(Clone, Debug)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: PasswordHash,
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

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, TryFromRepr, PartialEq, Serialize,
)]
#[repr(u8)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Opens tickets and follows up on their own ones.
    Client = 1,

    /// Triages, updates, assigns and deletes any ticket.
    Agent = 2,
}

impl FromSql<'_> for Role {
    accepts!(INT2);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let repr = i16::from_sql(ty, raw)?;
        let repr = u8::try_from(repr)?;
        let role = Self::try_from(repr).map_err(|_| "invalid role")?;
        Ok(role)
    }
}

impl ToSql for Role {
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

/// Hex-encoded SHA-256 digest of a user secret.
#[derive(Clone, Debug, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(secret: &str) -> Self {
        Self(hex::encode(Sha256::digest(secret.as_bytes())))
    }
}

impl FromSql<'_> for PasswordHash {
    accepts!(TEXT);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        String::from_sql(ty, raw).map(Self)
    }
}

impl ToSql for PasswordHash {
    accepts!(TEXT);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, out)
    }
}

fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        role: row.get("role"),
        password_hash: row.get("password"),
    }
}

#[async_trait]
impl UserStore for Client {
    async fn get_user_by_id(&self, id: Id) -> Result<Option<User>, Error> {
        const SQL: &str = "SELECT id, name, email, password, role \
                           FROM users \
                           WHERE id = $1 \
                           LIMIT 1";
        Ok(self.0.query_opt(SQL, &[&id]).await?.as_ref().map(from_row))
    }

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, Error> {
        const SQL: &str = "SELECT id, name, email, password, role \
                           FROM users \
                           WHERE email = $1 \
                           LIMIT 1";
        Ok(self.0.query_opt(SQL, &[&email]).await?.as_ref().map(from_row))
    }

    async fn get_users_by_ids(
        &self,
        ids: &[Id],
    ) -> Result<HashMap<Id, User>, Error> {
        const SQL: &str = "SELECT id, name, email, password, role \
                           FROM users \
                           WHERE id IN (SELECT unnest($1::INT4[]))";

        Ok(self
            .0
            .query(SQL, &[&ids])
            .await?
            .iter()
            .map(|row| {
                let user = from_row(row);
                (user.id, user)
            })
            .collect())
    }

    async fn get_users_by_role(&self, role: Role) -> Result<Vec<User>, Error> {
        const SQL: &str = "SELECT id, name, email, password, role \
                           FROM users \
                           WHERE role = $1 \
                           ORDER BY id";
        Ok(self
            .0
            .query(SQL, &[&role])
            .await?
            .iter()
            .map(from_row)
            .collect())
    }
}
