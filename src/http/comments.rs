use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::{comment_view, malformed, Actor, SharedAppState};
use crate::{
    api::{self, NumericId},
    comments, tickets, Error,
};

pub(super) async fn add(
    State(state): State<SharedAppState>,
    Actor(actor): Actor,
    input: Result<Json<api::comment::NewComment>, JsonRejection>,
) -> Result<Json<api::comment::Saved>, Error> {
    let Json(input) = input.map_err(|e| malformed(e.body_text()))?;
    let store = state.store.as_ref();

    let comment = comments::add(store, &actor, input).await?;
    let users =
        tickets::resolve_users(store, std::iter::once(comment.author_id))
            .await?;
    Ok(Json(api::comment::Saved {
        comment: comment_view(comment, &users)?,
        message: "comment added".to_owned(),
    }))
}

pub(super) async fn list(
    State(state): State<SharedAppState>,
    Actor(actor): Actor,
    Path(ticket_id): Path<String>,
) -> Result<Json<api::comment::List>, Error> {
    let ticket_id = NumericId::Text(ticket_id).parse("ticketId")?;

    let thread =
        comments::list(state.store.as_ref(), &actor, ticket_id).await?;
    let comments = thread
        .comments
        .into_iter()
        .map(|c| comment_view(c, &thread.users))
        .collect::<Result<_, _>>()?;
    Ok(Json(api::comment::List { comments }))
}
