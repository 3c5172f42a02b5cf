//! HTTP surface: routing, shared state, the authenticated caller and
//! mapping of [`Error`]s onto responses.

mod auth;
mod comments;
mod tickets;
mod users;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, RequestPartsExt as _, Router,
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::trace::TraceLayer;

use crate::{
    api,
    auth::{self as identity, Keys},
    db::{self, user, Comment, Ticket, User},
    error::Validation,
    tickets::Users,
    Error,
};

pub type SharedAppState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<dyn db::Store>,

    pub keys: Keys,

    /// Mark the credential cookie `Secure`.
    pub cookie_secure: bool,

    pub require_password: bool,
}

pub fn router(state: SharedAppState) -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/tickets", get(tickets::list).post(tickets::create))
        .route(
            "/tickets/:id",
            get(tickets::show).put(tickets::update).delete(tickets::remove),
        )
        .route("/comments", post(comments::add))
        .route("/comments/:ticket_id", get(comments::list))
        .route("/users", get(users::agents))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Signed-in user making the request.
///
/// The credential is read from the `token` cookie. When there's no cookie,
/// or it no longer resolves to a user, a bearer `Authorization` header is
/// tried instead.
pub struct Actor(pub User);

#[async_trait]
impl FromRequestParts<SharedAppState> for Actor {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut request::Parts,
        state: &SharedAppState,
    ) -> Result<Self, Self::Rejection> {
        let store = state.store.as_ref();

        let cookie = CookieJar::from_headers(&parts.headers)
            .get(identity::TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_owned());
        if let Some(user) =
            identity::resolve(&state.keys, store, cookie.as_deref()).await
        {
            return Ok(Self(user));
        }

        let bearer = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .ok()
            .map(|TypedHeader(Authorization(bearer))| {
                bearer.token().to_owned()
            });
        identity::resolve(&state.keys, store, bearer.as_deref())
            .await
            .map(Self)
            .ok_or(Error::Unauthenticated)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message, allowed) = match &self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "not authenticated".to_owned(),
                None,
            ),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "not allowed to perform this action".to_owned(),
                None,
            ),
            Self::Validation(v) => (
                StatusCode::BAD_REQUEST,
                v.message(),
                v.allowed()
                    .map(|names| names.iter().map(|&n| n.to_owned()).collect()),
            ),
            Self::NotFound => {
                (StatusCode::NOT_FOUND, "not found".to_owned(), None)
            }
            Self::Internal(e) => {
                tracing::error!("store failure: {e}");
                internal()
            }
            Self::Token(e) => {
                tracing::error!("failed to sign credential: {e}");
                internal()
            }
        };
        failure(status, message, allowed, None)
    }
}

fn internal() -> (StatusCode, String, Option<Vec<String>>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error".to_owned(),
        None,
    )
}

fn failure(
    status: StatusCode,
    message: String,
    allowed: Option<Vec<String>>,
    available: Option<Vec<api::ticket::Summary>>,
) -> Response {
    (
        status,
        Json(api::Failure {
            message,
            allowed,
            available,
        }),
    )
        .into_response()
}

/// Turns the text of an extractor rejection into a plain validation failure.
///
/// Rejections are passed as their `body_text()`, which names the offending
/// field where serde reported one.
fn malformed(detail: String) -> Error {
    Validation::Malformed(detail).into()
}

fn find_user(users: &Users, id: user::Id) -> Result<api::User, Error> {
    users
        .get(&id)
        .map(api::User::from)
        .ok_or_else(|| db::Error::DanglingUser(id).into())
}

fn ticket_view(ticket: Ticket, users: &Users) -> Result<api::Ticket, Error> {
    Ok(api::Ticket {
        id: ticket.id,
        created_by: find_user(users, ticket.created_by)?,
        assigned_to: ticket
            .assigned_to
            .map(|id| find_user(users, id))
            .transpose()?,
        title: ticket.title,
        description: ticket.description,
        status: ticket.status,
        priority: ticket.priority,
        created_by_id: ticket.created_by,
        assigned_to_id: ticket.assigned_to,
        created_at: ticket.created_at,
        updated_at: ticket.updated_at,
    })
}

fn comment_view(
    comment: Comment,
    users: &Users,
) -> Result<api::Comment, Error> {
    Ok(api::Comment {
        id: comment.id,
        author: find_user(users, comment.author_id)?,
        message: comment.message,
        ticket_id: comment.ticket_id,
        author_id: comment.author_id,
        created_at: comment.created_at,
    })
}
