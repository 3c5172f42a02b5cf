pub mod common;

use helpdesk::api;
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn signs_in_by_email() {
    let server = common::Server::start().await;
    let client = server.client();

    let login = client.login(common::CLIENT).await.unwrap();
    assert_eq!(login.user.email, common::CLIENT);
    assert_eq!(login.user.name, "Cliente Demo");
    assert_eq!(login.user.role, api::user::Role::Client);
    assert_eq!(login.redirect_to, None);

    let me = client.me().await.unwrap();
    assert_eq!(me, login.user);
}

#[tokio::test]
async fn sends_agents_to_dashboard() {
    let server = common::Server::start().await;

    let login = server.client().login(common::AGENT).await.unwrap();

    assert_eq!(login.user.role, api::user::Role::Agent);
    assert_eq!(login.redirect_to.as_deref(), Some("/agent/dashboard"));
}

#[tokio::test]
async fn rejects_unknown_email() {
    let server = common::Server::start().await;
    let client = server.client();

    let status = client.login("nobody@helpdeskpro.com").await.unwrap_err();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(client.me().await.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejects_missing_email() {
    let server = common::Server::start().await;

    let (status, body) = server
        .client()
        .raw(Method::POST, "/auth/login", Some(json!({})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "`email` is required");
}

#[tokio::test]
async fn checks_password_when_required() {
    let server = common::Server::requiring_passwords().await;
    let client = server.client();

    assert_eq!(
        client.login(common::CLIENT).await.unwrap_err(),
        StatusCode::UNAUTHORIZED,
    );
    assert_eq!(
        client
            .login_with_password(common::CLIENT, "wrong")
            .await
            .unwrap_err(),
        StatusCode::UNAUTHORIZED,
    );
    client
        .login_with_password(common::CLIENT, "123456")
        .await
        .unwrap();
    assert_eq!(client.me().await.unwrap().email, common::CLIENT);
}

#[tokio::test]
async fn signs_out() {
    let server = common::Server::start().await;
    let client = server.client().auth(common::AGENT).await;
    assert!(client.me().await.is_ok());

    let res = client.logout().await.unwrap();

    assert_eq!(res.message, "signed out");
    assert_eq!(client.me().await.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn accepts_bearer_credential() {
    let server = common::Server::start().await;
    let token = server.client().token(common::AGENT).await;

    let client = server.client().with_bearer(&token);

    assert_eq!(client.me().await.unwrap().email, common::AGENT);
    assert!(client.agents().await.is_ok());
}

#[tokio::test]
async fn falls_back_to_bearer_past_stale_cookie() {
    let server = common::Server::start().await;
    let token = server.client().token(common::AGENT).await;

    let client = server
        .client()
        .with_cookie("stale.cookie.value")
        .with_bearer(&token);

    assert_eq!(client.me().await.unwrap().email, common::AGENT);
}

#[tokio::test]
async fn prefers_cookie_over_bearer() {
    let server = common::Server::start().await;
    let client_token = server.client().token(common::CLIENT).await;
    let agent_token = server.client().token(common::AGENT).await;

    let client = server
        .client()
        .with_cookie(&client_token)
        .with_bearer(&agent_token);

    assert_eq!(client.me().await.unwrap().email, common::CLIENT);
}

#[tokio::test]
async fn rejects_stale_cookie_alone() {
    let server = common::Server::start().await;

    let client = server.client().with_cookie("stale.cookie.value");

    assert_eq!(client.me().await.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejects_forged_bearer_credential() {
    let server = common::Server::start().await;

    let client = server.client().with_bearer("not.a.token");

    assert_eq!(client.me().await.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn denies_anonymous_callers_everywhere() {
    let server = common::Server::start().await;
    let client = server.client();

    for (method, path, body) in [
        (Method::GET, "/tickets", None),
        (Method::POST, "/tickets", Some(json!({"title": "a"}))),
        (Method::GET, "/tickets/1", None),
        (Method::PUT, "/tickets/1", Some(json!({"status": "CLOSED"}))),
        (Method::DELETE, "/tickets/1", None),
        (Method::GET, "/comments/1", None),
        (Method::POST, "/comments", Some(json!({"ticketId": 1}))),
        (Method::GET, "/users", None),
    ] {
        let (status, body) = client.raw(method.clone(), path, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {path}");
        assert_eq!(body["message"], "not authenticated");
    }
}
