pub mod comment;
pub mod memory;
pub mod ticket;
pub mod user;

use std::{collections::HashMap, error::Error as StdError};

use async_trait::async_trait;
use derive_more::{Display, From};
use tokio_postgres::{tls::NoTlsStream, NoTls, Socket};

pub use self::{comment::Comment, ticket::Ticket, user::User};

pub type Connection = tokio_postgres::Connection<Socket, NoTlsStream>;

pub async fn connect(url: &str) -> Result<(Client, Connection), Error> {
    tokio_postgres::connect(url, NoTls)
        .await
        .map(|(client, connection)| (Client(client), connection))
        .map_err(Error::from)
}

pub struct Client(tokio_postgres::Client);

#[derive(Debug, Display, From)]
pub enum Error {
    #[from]
    Postgres(tokio_postgres::Error),

    /// A row references a user that doesn't exist.
    #[display("dangling reference to user {_0}")]
    DanglingUser(user::Id),

    /// A write references a ticket that doesn't exist.
    #[display("dangling reference to ticket {_0}")]
    DanglingTicket(ticket::Id),
}

impl StdError for Error {}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_by_id(&self, id: user::Id) -> Result<Option<User>, Error>;

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, Error>;

    async fn get_users_by_ids(
        &self,
        ids: &[user::Id],
    ) -> Result<HashMap<user::Id, User>, Error>;

    async fn get_users_by_role(
        &self,
        role: user::Role,
    ) -> Result<Vec<User>, Error>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn get_ticket_by_id(
        &self,
        id: ticket::Id,
    ) -> Result<Option<Ticket>, Error>;

    async fn insert_ticket(
        &self,
        ticket: &ticket::New,
    ) -> Result<Ticket, Error>;

    /// Overwrites the mutable columns of an existing ticket.
    ///
    /// Returns `false` when no row with the ticket's id exists.
    async fn update_ticket(&self, ticket: &Ticket) -> Result<bool, Error>;

    /// Removes a ticket together with its comment thread.
    ///
    /// Returns `false` when no row with the given id exists.
    async fn delete_ticket(&self, id: ticket::Id) -> Result<bool, Error>;

    /// Tickets matching `filter`, newest first.
    async fn get_tickets(
        &self,
        filter: &ticket::Filter,
    ) -> Result<Vec<Ticket>, Error>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(
        &self,
        comment: &comment::New,
    ) -> Result<Comment, Error>;

    /// Comments of a ticket, oldest first.
    async fn get_comments_by_ticket(
        &self,
        ticket_id: ticket::Id,
    ) -> Result<Vec<Comment>, Error>;
}

pub trait Store: UserStore + TicketStore + CommentStore {}

impl<T> Store for T where T: UserStore + TicketStore + CommentStore {}
