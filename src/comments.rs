//! Comment threads. Comments are append-only.

use time::OffsetDateTime;

use crate::{
    api,
    db::{comment, ticket, Comment, Store, User},
    error::{required, Validation},
    policy::{self, Action},
    tickets::{self, Users},
    Error,
};

#[derive(Debug)]
pub struct Thread {
    /// Oldest first.
    pub comments: Vec<Comment>,
    pub users: Users,
}

pub async fn add(
    store: &(impl Store + ?Sized),
    actor: &User,
    input: api::comment::NewComment,
) -> Result<Comment, Error> {
    let ticket_id = input
        .ticket_id
        .filter(|id| !id.is_blank())
        .ok_or(Validation::Required("ticketId"))?
        .parse::<ticket::Id>("ticketId")?;
    let message = required("message", input.message)?;

    let ticket = store
        .get_ticket_by_id(ticket_id)
        .await?
        .ok_or(Error::NotFound)?;
    policy::authorize(Some(actor), Action::PostComment(&ticket))?;

    let comment = store
        .insert_comment(&comment::New {
            message,
            ticket_id,
            author_id: actor.id,
            created_at: OffsetDateTime::now_utc(),
        })
        .await?;
    tracing::info!("user {} commented on ticket {ticket_id}", actor.id);
    Ok(comment)
}

/// Thread of a ticket, oldest first, with the authors resolved.
///
/// Any signed-in user may read any thread; an unknown ticket just has an
/// empty one.
pub async fn list(
    store: &(impl Store + ?Sized),
    actor: &User,
    ticket_id: ticket::Id,
) -> Result<Thread, Error> {
    policy::authorize(Some(actor), Action::ReadComments)?;

    let comments = store.get_comments_by_ticket(ticket_id).await?;
    let users =
        tickets::resolve_users(store, comments.iter().map(|c| c.author_id))
            .await?;
    Ok(Thread { comments, users })
}
