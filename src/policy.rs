//! Who may do what.
//!
//! Decisions depend only on the acting user, the requested action and, for
//! ticket-bound actions, who created the ticket. Nothing here touches the
//! store.

use crate::{
    db::{user, Ticket, User},
    Error,
};

#[derive(Clone, Copy, Debug)]
pub enum Action<'a> {
    /// Open a ticket owned by the actor.
    CreateTicket,

    /// Open a ticket owned by someone else.
    CreateTicketFor(user::Id),

    ListTickets,
    ViewTicket(&'a Ticket),
    UpdateTicket,
    DeleteTicket,
    ListAgents,
    PostComment(&'a Ticket),
    ReadComments,
}

/// Decides whether `actor` may perform `action`.
///
/// A missing actor is always [`Error::Unauthenticated`], whatever the
/// action, so callers never learn more than that.
pub fn authorize(
    actor: Option<&User>,
    action: Action<'_>,
) -> Result<(), Error> {
    use user::Role::{Agent, Client};
    use Action as A;

    let actor = actor.ok_or(Error::Unauthenticated)?;
    let allowed = match (actor.role, action) {
        (Agent, _) => true,
        (Client, A::CreateTicket | A::ListTickets | A::ReadComments) => true,
        (Client, A::CreateTicketFor(id)) => id == actor.id,
        (Client, A::ViewTicket(ticket) | A::PostComment(ticket)) => {
            ticket.created_by == actor.id
        }
        (Client, A::UpdateTicket | A::DeleteTicket | A::ListAgents) => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

/// Creator every ticket listed for `actor` must have, if any.
pub fn ticket_scope(actor: &User) -> Option<user::Id> {
    match actor.role {
        user::Role::Client => Some(actor.id),
        user::Role::Agent => None,
    }
}
