pub mod common;

use helpdesk::api;
use reqwest::{Method, StatusCode};
use serde_json::json;

async fn seed_foreign_tickets(server: &common::Server) -> common::Client {
    server
        .store
        .add_user(
            "Otro Cliente",
            "other@helpdeskpro.com",
            "secret",
            api::user::Role::Client,
        )
        .await;
    let other = server.client().auth("other@helpdeskpro.com").await;
    for title in ["Printer", "Monitor"] {
        other
            .add_ticket(json!({
                "title": title,
                "description": "Broken",
                "priority": "LOW",
            }))
            .await
            .unwrap();
    }
    other
}

#[tokio::test]
async fn agent_lists_all_tickets_newest_first() {
    let server = common::Server::start().await;
    seed_foreign_tickets(&server).await;
    let agent = server.client().auth(common::AGENT).await;

    let titles = agent
        .list_tickets(&[])
        .await
        .unwrap()
        .tickets
        .into_iter()
        .map(|t| t.title)
        .collect::<Vec<_>>();

    assert_eq!(titles, ["Monitor", "Printer", "No puedo acceder a mi cuenta"]);
}

#[tokio::test]
async fn client_only_ever_sees_own_tickets() {
    let server = common::Server::start().await;
    seed_foreign_tickets(&server).await;
    let client = server.client().auth(common::CLIENT).await;

    for query in [
        &[][..],
        &[("status", "ALL"), ("priority", "ALL")][..],
        &[("priority", "low")][..],
        &[("assignedToId", "2")][..],
        &[("q", "printer")][..],
        &[("status", "OPEN"), ("q", "cuenta")][..],
    ] {
        let list = client.list_tickets(query).await.unwrap();
        assert!(
            list.tickets
                .iter()
                .all(|t| t.created_by_id == api::user::Id::from(1)),
            "{query:?}",
        );
    }
}

#[tokio::test]
async fn filters_by_status_and_priority() {
    let server = common::Server::start().await;
    seed_foreign_tickets(&server).await;
    let agent = server.client().auth(common::AGENT).await;

    let low = agent.list_tickets(&[("priority", "low")]).await.unwrap();
    assert_eq!(low.tickets.len(), 2);

    let closed = agent.list_tickets(&[("status", "CLOSED")]).await.unwrap();
    assert!(closed.tickets.is_empty());

    let assigned = agent
        .list_tickets(&[("assignedToId", "2")])
        .await
        .unwrap();
    assert_eq!(assigned.tickets.len(), 1);
}

#[tokio::test]
async fn searches_title_and_description() {
    let server = common::Server::start().await;
    let agent = server.client().auth(common::AGENT).await;

    let found = agent.list_tickets(&[("q", "ACCEDER")]).await.unwrap();
    assert_eq!(found.tickets.len(), 1);

    let found = agent.list_tickets(&[("q", "desconocido")]).await.unwrap();
    assert_eq!(found.tickets.len(), 1);

    let found = agent.list_tickets(&[("q", "zzz")]).await.unwrap();
    assert!(found.tickets.is_empty());
}

#[tokio::test]
async fn rejects_unknown_status_filter() {
    let server = common::Server::start().await;
    let agent = server.client().auth(common::AGENT).await;

    assert_eq!(
        agent
            .list_tickets(&[("status", "bogus")])
            .await
            .unwrap_err(),
        StatusCode::BAD_REQUEST,
    );
}

#[tokio::test]
async fn names_unexpected_query_parameter() {
    let server = common::Server::start().await;
    let agent = server.client().auth(common::AGENT).await;

    let (status, body) =
        agent.raw(Method::GET, "/tickets?sortBy=title", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("sortBy"), "{message}");
}
