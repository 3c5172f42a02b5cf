use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse as _, Response},
    Json,
};

use super::{
    comment_view, failure, malformed, ticket_view, Actor, SharedAppState,
};
use crate::{
    api::{self, NumericId},
    db::ticket,
    policy::{self, Action},
    tickets, Error,
};

fn ticket_id(raw: String) -> Result<ticket::Id, Error> {
    Ok(NumericId::Text(raw).parse("id")?)
}

pub(super) async fn list(
    State(state): State<SharedAppState>,
    Actor(actor): Actor,
    query: Result<Query<api::ticket::Query>, QueryRejection>,
) -> Result<Json<api::ticket::List>, Error> {
    let Query(query) = query.map_err(|e| malformed(e.body_text()))?;

    let listing = tickets::list(state.store.as_ref(), &actor, query).await?;
    let tickets = listing
        .tickets
        .into_iter()
        .map(|t| ticket_view(t, &listing.users))
        .collect::<Result<_, _>>()?;
    Ok(Json(api::ticket::List { tickets }))
}

pub(super) async fn create(
    State(state): State<SharedAppState>,
    Actor(actor): Actor,
    input: Result<Json<api::ticket::NewTicket>, JsonRejection>,
) -> Result<Json<api::ticket::Saved>, Error> {
    let Json(input) = input.map_err(|e| malformed(e.body_text()))?;
    let store = state.store.as_ref();

    let ticket = tickets::create(store, &actor, input).await?;
    let users = tickets::resolve_users(
        store,
        [Some(ticket.created_by), ticket.assigned_to].into_iter().flatten(),
    )
    .await?;
    Ok(Json(api::ticket::Saved {
        ticket: ticket_view(ticket, &users)?,
        message: "ticket created".to_owned(),
    }))
}

/// On a miss the failure lists the tickets the caller may look up instead.
pub(super) async fn show(
    State(state): State<SharedAppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<Json<api::ticket::Shown>, Response> {
    let store = state.store.as_ref();
    let id = ticket_id(id).map_err(Error::into_response)?;

    let detail = match tickets::get(store, &actor, id).await {
        Ok(detail) => detail,
        Err(Error::NotFound) => {
            let available = tickets::available(store, &actor)
                .await
                .map_err(Error::into_response)?;
            return Err(failure(
                StatusCode::NOT_FOUND,
                format!("ticket {id} not found"),
                None,
                Some(available),
            ));
        }
        Err(e) => return Err(e.into_response()),
    };

    let ticket = detail_view(detail).map_err(Error::into_response)?;
    Ok(Json(api::ticket::Shown { ticket }))
}

fn detail_view(detail: tickets::Detail) -> Result<api::ticket::Detail, Error> {
    let tickets::Detail {
        ticket,
        comments,
        users,
    } = detail;
    Ok(api::ticket::Detail {
        ticket: ticket_view(ticket, &users)?,
        comments: comments
            .into_iter()
            .map(|c| comment_view(c, &users))
            .collect::<Result<_, _>>()?,
    })
}

/// Clients are turned away before the body or the id are even looked at.
pub(super) async fn update(
    State(state): State<SharedAppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    input: Result<Json<api::ticket::Changes>, JsonRejection>,
) -> Result<Json<api::ticket::Saved>, Error> {
    policy::authorize(Some(&actor), Action::UpdateTicket)?;
    let id = ticket_id(id)?;
    let Json(changes) = input.map_err(|e| malformed(e.body_text()))?;
    let store = state.store.as_ref();

    let ticket = tickets::update(store, &actor, id, changes).await?;
    let users = tickets::resolve_users(
        store,
        [Some(ticket.created_by), ticket.assigned_to].into_iter().flatten(),
    )
    .await?;
    Ok(Json(api::ticket::Saved {
        ticket: ticket_view(ticket, &users)?,
        message: "ticket updated".to_owned(),
    }))
}

pub(super) async fn remove(
    State(state): State<SharedAppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<Json<api::Message>, Error> {
    policy::authorize(Some(&actor), Action::DeleteTicket)?;
    let id = ticket_id(id)?;

    tickets::delete(state.store.as_ref(), &actor, id).await?;
    Ok(Json(api::Message {
        message: "ticket deleted".to_owned(),
    }))
}
