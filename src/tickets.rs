//! Ticket lifecycle: opening, listing, viewing, triaging and deleting.
//!
//! Status changes are unrestricted: an agent may move a ticket between any
//! two statuses, including reopening a closed one.

use std::{collections::HashMap, iter};

use itertools::Itertools as _;
use time::{Duration, OffsetDateTime};

use crate::{
    api::{self, Loose},
    db::{ticket, user, Comment, Store, Ticket, User},
    error::{required, Validation},
    policy::{self, Action},
    Error,
};

/// Users referenced by some tickets or comments, by id.
pub type Users = HashMap<user::Id, User>;

#[derive(Debug)]
pub struct Listing {
    pub tickets: Vec<Ticket>,
    pub users: Users,
}

#[derive(Debug)]
pub struct Detail {
    pub ticket: Ticket,

    /// Oldest first.
    pub comments: Vec<Comment>,
    pub users: Users,
}

pub async fn create(
    store: &(impl Store + ?Sized),
    actor: &User,
    input: api::ticket::NewTicket,
) -> Result<Ticket, Error> {
    policy::authorize(Some(actor), Action::CreateTicket)?;

    let title = required("title", input.title)?;
    let description = required("description", input.description)?;
    // Unrecognized priorities fall back to the default instead of failing.
    let priority = input
        .priority
        .as_ref()
        .and_then(Loose::as_text)
        .and_then(|p| p.parse().ok())
        .unwrap_or_default();

    let created_by = input
        .created_by_id
        .as_ref()
        .map(|raw| raw.parse::<user::Id>("createdById"))
        .transpose()?;
    let created_by = match created_by {
        Some(id)
            if policy::authorize(Some(actor), Action::CreateTicketFor(id))
                .is_ok() =>
        {
            existing_user(store, id, "createdById").await?;
            id
        }
        _ => actor.id,
    };

    let assigned_to = input
        .assigned_to_id
        .as_ref()
        .map(|raw| raw.parse::<user::Id>("assignedToId"))
        .transpose()?;
    let assigned_to = match assigned_to {
        Some(id)
            if policy::authorize(Some(actor), Action::UpdateTicket).is_ok() =>
        {
            existing_agent(store, id, "assignedToId").await?;
            Some(id)
        }
        _ => None,
    };

    let ticket = store
        .insert_ticket(&ticket::New {
            title,
            description,
            priority,
            created_by,
            assigned_to,
            created_at: OffsetDateTime::now_utc(),
        })
        .await?;
    tracing::info!("user {} opened ticket {}", actor.id, ticket.id);
    Ok(ticket)
}

/// Tickets visible to `actor` that match `query`, newest first.
///
/// Clients only ever see the tickets they created, whatever the filters.
pub async fn list(
    store: &(impl Store + ?Sized),
    actor: &User,
    query: api::ticket::Query,
) -> Result<Listing, Error> {
    policy::authorize(Some(actor), Action::ListTickets)?;

    let filter = ticket::Filter {
        created_by: policy::ticket_scope(actor),
        status: enum_filter(query.status, Validation::InvalidStatus)?,
        priority: enum_filter(query.priority, Validation::InvalidPriority)?,
        assigned_to: query
            .assigned_to_id
            .filter(|id| !id.trim().is_empty())
            .map(|id| {
                api::NumericId::Text(id).parse::<user::Id>("assignedToId")
            })
            .transpose()?,
        query: query.q.filter(|q| !q.trim().is_empty()),
    };

    let tickets = store.get_tickets(&filter).await?;
    let users = resolve_users(
        store,
        tickets
            .iter()
            .map(|t| t.created_by)
            .chain(tickets.iter().filter_map(|t| t.assigned_to)),
    )
    .await?;
    Ok(Listing { tickets, users })
}

pub async fn get(
    store: &(impl Store + ?Sized),
    actor: &User,
    id: ticket::Id,
) -> Result<Detail, Error> {
    let ticket = store.get_ticket_by_id(id).await?.ok_or(Error::NotFound)?;
    policy::authorize(Some(actor), Action::ViewTicket(&ticket))?;

    let comments = store.get_comments_by_ticket(id).await?;
    let users = resolve_users(
        store,
        iter::once(ticket.created_by)
            .chain(ticket.assigned_to)
            .chain(comments.iter().map(|c| c.author_id)),
    )
    .await?;
    Ok(Detail {
        ticket,
        comments,
        users,
    })
}

/// Id and title of every ticket `actor` may look up, newest first.
pub async fn available(
    store: &(impl Store + ?Sized),
    actor: &User,
) -> Result<Vec<ticket::Summary>, Error> {
    let filter = ticket::Filter {
        created_by: policy::ticket_scope(actor),
        ..ticket::Filter::default()
    };
    Ok(store
        .get_tickets(&filter)
        .await?
        .into_iter()
        .map(|t| ticket::Summary {
            id: t.id,
            title: t.title,
        })
        .collect())
}

/// Applies an agent's triage `changes`.
///
/// Everything is validated before the ticket is touched, so a rejected
/// update leaves it as it was. There is no way to unassign a ticket here.
pub async fn update(
    store: &(impl Store + ?Sized),
    actor: &User,
    id: ticket::Id,
    changes: api::ticket::Changes,
) -> Result<Ticket, Error> {
    policy::authorize(Some(actor), Action::UpdateTicket)?;

    let status = non_blank(changes.status)
        .map(|s| s.parse().map_err(|_| Validation::InvalidStatus(s)))
        .transpose()?;
    let priority = non_blank(changes.priority)
        .map(|p| p.parse().map_err(|_| Validation::InvalidPriority(p)))
        .transpose()?;
    let assigned_to = changes
        .assigned_to_id
        .as_ref()
        .map(|raw| raw.parse::<user::Id>("assignedToId"))
        .transpose()?;
    if let Some(id) = assigned_to {
        existing_agent(store, id, "assignedToId").await?;
    }

    let mut ticket =
        store.get_ticket_by_id(id).await?.ok_or(Error::NotFound)?;
    if let Some(status) = status {
        ticket.status = status;
    }
    if let Some(priority) = priority {
        ticket.priority = priority;
    }
    if let Some(assigned_to) = assigned_to {
        ticket.assigned_to = Some(assigned_to);
    }
    ticket.updated_at = OffsetDateTime::now_utc()
        .max(ticket.updated_at + Duration::microseconds(1));

    if !store.update_ticket(&ticket).await? {
        return Err(Error::NotFound);
    }
    tracing::info!("user {} updated ticket {}", actor.id, ticket.id);
    Ok(ticket)
}

/// Deletes a ticket along with its comment thread.
pub async fn delete(
    store: &(impl Store + ?Sized),
    actor: &User,
    id: ticket::Id,
) -> Result<(), Error> {
    policy::authorize(Some(actor), Action::DeleteTicket)?;

    if !store.delete_ticket(id).await? {
        return Err(Error::NotFound);
    }
    tracing::info!("user {} deleted ticket {id}", actor.id);
    Ok(())
}

/// Loads the distinct users behind `ids`.
pub async fn resolve_users(
    store: &(impl Store + ?Sized),
    ids: impl Iterator<Item = user::Id>,
) -> Result<Users, Error> {
    let ids = ids.unique().collect::<Vec<_>>();
    if ids.is_empty() {
        return Ok(Users::new());
    }
    Ok(store.get_users_by_ids(&ids).await?)
}

async fn existing_user(
    store: &(impl Store + ?Sized),
    id: user::Id,
    field: &'static str,
) -> Result<User, Error> {
    Ok(store
        .get_user_by_id(id)
        .await?
        .ok_or(Validation::UnknownUser(field))?)
}

async fn existing_agent(
    store: &(impl Store + ?Sized),
    id: user::Id,
    field: &'static str,
) -> Result<User, Error> {
    let user = existing_user(store, id, field).await?;
    if user.role != user::Role::Agent {
        return Err(Validation::NotAnAgent(field).into());
    }
    Ok(user)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses an optional listing filter where `ALL` means "any".
fn enum_filter<T: std::str::FromStr>(
    value: Option<String>,
    invalid: fn(String) -> Validation,
) -> Result<Option<T>, Validation> {
    match non_blank(value) {
        None => Ok(None),
        Some(v) if v.trim().eq_ignore_ascii_case("ALL") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| invalid(v)),
    }
}
