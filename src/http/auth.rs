use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::{malformed, Actor, SharedAppState};
use crate::{
    api,
    auth as identity,
    db::user::Role,
    error::required,
    Error,
};

const AGENT_HOME: &str = "/agent/dashboard";

pub(super) async fn login(
    State(state): State<SharedAppState>,
    jar: CookieJar,
    input: Result<Json<api::auth::Credentials>, JsonRejection>,
) -> Result<(CookieJar, Json<api::auth::Login>), Error> {
    let Json(credentials) = input.map_err(|e| malformed(e.body_text()))?;
    let email = required("email", credentials.email)?;

    let Some(user) = identity::login(
        state.store.as_ref(),
        &email,
        credentials.password.as_deref(),
        state.require_password,
    )
    .await?
    else {
        tracing::debug!("rejected login attempt for {email}");
        return Err(Error::Unauthenticated);
    };

    let token = identity::issue(&state.keys, &user)?;
    let max_age = time::Duration::try_from(state.keys.expiration_time())
        .unwrap_or(time::Duration::MAX);
    let cookie = Cookie::build((identity::TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(max_age);
    tracing::info!("user {} signed in", user.id);

    Ok((
        jar.add(cookie),
        Json(api::auth::Login {
            user: api::User::from(&user),
            redirect_to: (user.role == Role::Agent)
                .then(|| AGENT_HOME.to_owned()),
        }),
    ))
}

pub(super) async fn logout(jar: CookieJar) -> (CookieJar, Json<api::Message>) {
    (
        jar.remove(Cookie::build((identity::TOKEN_COOKIE, "")).path("/")),
        Json(api::Message {
            message: "signed out".to_owned(),
        }),
    )
}

pub(super) async fn me(Actor(user): Actor) -> Json<api::User> {
    Json(api::User::from(&user))
}
