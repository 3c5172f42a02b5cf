//! In-process [`Store`](super::Store) backed by plain collections.
//!
//! Each value owns its data, so tests construct a fresh one instead of
//! sharing state. Without a configured database the binary also runs on a
//! [`Store::seeded`] instance.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashMap},
};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{
    comment, ticket, user, Comment, CommentStore, Error, Ticket, TicketStore,
    User, UserStore,
};

#[derive(Default)]
pub struct Store(RwLock<Inner>);

#[derive(Default)]
struct Inner {
    users: BTreeMap<user::Id, User>,
    tickets: BTreeMap<ticket::Id, Ticket>,
    comments: BTreeMap<comment::Id, Comment>,
    last_user_id: i32,
    last_ticket_id: i32,
    last_comment_id: i32,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the demo accounts, one ticket and one comment.
    ///
    /// Mirrors `migrations/0002_seed.sql`.
    pub fn seeded() -> Self {
        let mut inner = Inner::default();
        let client = inner.add_user(
            "Cliente Demo",
            "client@helpdeskpro.com",
            "123456",
            user::Role::Client,
        );
        let agent = inner.add_user(
            "Agente Demo",
            "agent@helpdeskpro.com",
            "12345678",
            user::Role::Agent,
        );
        let now = OffsetDateTime::now_utc();
        let ticket = inner.add_ticket(&ticket::New {
            title: "No puedo acceder a mi cuenta".to_owned(),
            description: "Al intentar iniciar sesión recibo un error \
                          desconocido."
                .to_owned(),
            priority: ticket::Priority::Medium,
            created_by: client.id,
            assigned_to: Some(agent.id),
            created_at: now,
        });
        inner.add_comment(&comment::New {
            message: "Gracias por reportarlo, estamos revisando.".to_owned(),
            ticket_id: ticket.id,
            author_id: agent.id,
            created_at: now,
        });
        Self(RwLock::new(inner))
    }

    /// Provisions a user; there is no registration flow over HTTP.
    pub async fn add_user(
        &self,
        name: &str,
        email: &str,
        secret: &str,
        role: user::Role,
    ) -> User {
        self.0.write().await.add_user(name, email, secret, role)
    }
}

impl Inner {
    fn add_user(
        &mut self,
        name: &str,
        email: &str,
        secret: &str,
        role: user::Role,
    ) -> User {
        self.last_user_id += 1;
        let user = User {
            id: user::Id::from(self.last_user_id),
            name: name.to_owned(),
            email: email.to_owned(),
            role,
            password_hash: user::PasswordHash::new(secret),
        };
        self.users.insert(user.id, user.clone());
        user
    }

    fn add_ticket(&mut self, new: &ticket::New) -> Ticket {
        self.last_ticket_id += 1;
        let ticket = Ticket {
            id: ticket::Id::from(self.last_ticket_id),
            title: new.title.clone(),
            description: new.description.clone(),
            status: ticket::Status::Open,
            priority: new.priority,
            created_by: new.created_by,
            assigned_to: new.assigned_to,
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        self.tickets.insert(ticket.id, ticket.clone());
        ticket
    }

    fn add_comment(&mut self, new: &comment::New) -> Comment {
        self.last_comment_id += 1;
        let comment = Comment {
            id: comment::Id::from(self.last_comment_id),
            message: new.message.clone(),
            ticket_id: new.ticket_id,
            author_id: new.author_id,
            created_at: new.created_at,
        };
        self.comments.insert(comment.id, comment.clone());
        comment
    }
}

#[async_trait]
impl UserStore for Store {
    async fn get_user_by_id(
        &self,
        id: user::Id,
    ) -> Result<Option<User>, Error> {
        Ok(self.0.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, Error> {
        Ok(self
            .0
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_users_by_ids(
        &self,
        ids: &[user::Id],
    ) -> Result<HashMap<user::Id, User>, Error> {
        let inner = self.0.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id))
            .map(|u| (u.id, u.clone()))
            .collect())
    }

    async fn get_users_by_role(
        &self,
        role: user::Role,
    ) -> Result<Vec<User>, Error> {
        Ok(self
            .0
            .read()
            .await
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TicketStore for Store {
    async fn get_ticket_by_id(
        &self,
        id: ticket::Id,
    ) -> Result<Option<Ticket>, Error> {
        Ok(self.0.read().await.tickets.get(&id).cloned())
    }

    async fn insert_ticket(
        &self,
        ticket: &ticket::New,
    ) -> Result<Ticket, Error> {
        Ok(self.0.write().await.add_ticket(ticket))
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<bool, Error> {
        let mut inner = self.0.write().await;
        let Some(stored) = inner.tickets.get_mut(&ticket.id) else {
            return Ok(false);
        };
        stored.title.clone_from(&ticket.title);
        stored.description.clone_from(&ticket.description);
        stored.status = ticket.status;
        stored.priority = ticket.priority;
        stored.assigned_to = ticket.assigned_to;
        stored.updated_at = ticket.updated_at;
        Ok(true)
    }

    async fn delete_ticket(&self, id: ticket::Id) -> Result<bool, Error> {
        let mut inner = self.0.write().await;
        if inner.tickets.remove(&id).is_none() {
            return Ok(false);
        }
        inner.comments.retain(|_, c| c.ticket_id != id);
        Ok(true)
    }

    async fn get_tickets(
        &self,
        filter: &ticket::Filter,
    ) -> Result<Vec<Ticket>, Error> {
        let mut tickets = self
            .0
            .read()
            .await
            .tickets
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect::<Vec<_>>();
        tickets.sort_by_key(|t| Reverse((t.created_at, t.id)));
        Ok(tickets)
    }
}

#[async_trait]
impl CommentStore for Store {
    async fn insert_comment(
        &self,
        comment: &comment::New,
    ) -> Result<Comment, Error> {
        let mut inner = self.0.write().await;
        if !inner.tickets.contains_key(&comment.ticket_id) {
            return Err(Error::DanglingTicket(comment.ticket_id));
        }
        Ok(inner.add_comment(comment))
    }

    async fn get_comments_by_ticket(
        &self,
        ticket_id: ticket::Id,
    ) -> Result<Vec<Comment>, Error> {
        let mut comments = self
            .0
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.ticket_id == ticket_id)
            .cloned()
            .collect::<Vec<_>>();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }
}
