pub mod common;

use reqwest::StatusCode;

#[tokio::test]
async fn agent_deletes_ticket_and_thread() {
    let server = common::Server::start().await;
    let agent = server.client().auth(common::AGENT).await;

    let res = agent.delete_ticket(1).await.unwrap();

    assert_eq!(res.message, "ticket deleted");
    assert_eq!(agent.get_ticket(1).await.unwrap_err(), StatusCode::NOT_FOUND);
    assert!(agent.comments(1).await.unwrap().comments.is_empty());
}

#[tokio::test]
async fn reports_missing_ticket() {
    let server = common::Server::start().await;
    let agent = server.client().auth(common::AGENT).await;

    assert_eq!(
        agent.delete_ticket(42).await.unwrap_err(),
        StatusCode::NOT_FOUND,
    );
}

#[tokio::test]
async fn forbids_clients_whatever_the_target() {
    let server = common::Server::start().await;
    let client = server.client().auth(common::CLIENT).await;

    for id in ["1", "42", "abc"] {
        assert_eq!(
            client.delete_ticket(id).await.unwrap_err(),
            StatusCode::FORBIDDEN,
            "{id}",
        );
    }
    assert!(client.get_ticket(1).await.is_ok());
}
