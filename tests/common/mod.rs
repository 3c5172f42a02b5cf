use std::{fmt, net::SocketAddr, sync::Arc, time::Duration};

use helpdesk::{
    api,
    auth::Keys,
    db::{self, memory},
    http::{self, AppState},
};
use reqwest::{header::COOKIE, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const CLIENT: &str = "client@helpdeskpro.com";
pub const AGENT: &str = "agent@helpdeskpro.com";

/// Application served on an ephemeral port over its own seeded store.
pub struct Server {
    addr: SocketAddr,
    pub store: Arc<memory::Store>,
}

impl Server {
    pub async fn start() -> Self {
        Self::spawn(false).await
    }

    pub async fn requiring_passwords() -> Self {
        Self::spawn(true).await
    }

    async fn spawn(require_password: bool) -> Self {
        let store = Arc::new(memory::Store::seeded());
        let app = http::router(Arc::new(AppState {
            store: Arc::clone(&store) as Arc<dyn db::Store>,
            keys: Keys::new("test-secret", Duration::from_secs(60 * 60)),
            cookie_secure: false,
            require_password,
        }));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind a listener");
        let addr = listener.local_addr().expect("no local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server failed");
        });

        Self { addr, store }
    }

    pub fn client(&self) -> Client {
        Client {
            inner: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("failed to build a client"),
            base_url: format!("http://{}", self.addr),
            bearer: None,
            cookie: None,
        }
    }
}

pub struct Client {
    inner: reqwest::Client,
    base_url: String,
    pub bearer: Option<String>,
    cookie: Option<String>,
}

impl Client {
    /// Signs in, keeping the credential cookie for later requests.
    pub async fn auth(self, email: &str) -> Self {
        self.login(email).await.expect("failed to sign in");
        self
    }

    /// Client carrying `token` in an `Authorization` header only.
    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_owned());
        self
    }

    /// Client sending `token` as its credential cookie on every request.
    pub fn with_cookie(mut self, token: &str) -> Self {
        self.cookie = Some(format!("token={token}"));
        self
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let req = self
            .inner
            .request(method, format!("{}{path}", self.base_url));
        let req = match &self.cookie {
            Some(cookie) => req.header(COOKIE, cookie),
            None => req,
        };
        match &self.bearer {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(
        req: reqwest::RequestBuilder,
    ) -> Result<T, StatusCode> {
        Ok(req
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<T>()
            .await
            .expect("failed to get a response"))
    }

    /// Sends a request without interpreting the outcome.
    pub async fn raw(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = self.request(method, path);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await.expect("failed to send a request");
        let status = res.status();
        let body = res.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn login(
        &self,
        email: &str,
    ) -> Result<api::auth::Login, StatusCode> {
        Self::send(
            self.request(Method::POST, "/auth/login")
                .json(&json!({ "email": email })),
        )
        .await
    }

    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<api::auth::Login, StatusCode> {
        Self::send(
            self.request(Method::POST, "/auth/login")
                .json(&json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Signs in and returns the issued credential itself.
    pub async fn token(&self, email: &str) -> String {
        self.request(Method::POST, "/auth/login")
            .json(&json!({ "email": email }))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .expect("wrong status code")
            .cookies()
            .find(|c| c.name() == "token")
            .map(|c| c.value().to_owned())
            .expect("no credential cookie")
    }

    pub async fn logout(&self) -> Result<api::Message, StatusCode> {
        Self::send(self.request(Method::POST, "/auth/logout")).await
    }

    pub async fn me(&self) -> Result<api::User, StatusCode> {
        Self::send(self.request(Method::GET, "/auth/me")).await
    }

    pub async fn list_tickets(
        &self,
        query: &[(&str, &str)],
    ) -> Result<api::ticket::List, StatusCode> {
        Self::send(self.request(Method::GET, "/tickets").query(query)).await
    }

    pub async fn add_ticket(
        &self,
        body: Value,
    ) -> Result<api::ticket::Saved, StatusCode> {
        Self::send(self.request(Method::POST, "/tickets").json(&body)).await
    }

    pub async fn get_ticket(
        &self,
        id: impl fmt::Display,
    ) -> Result<api::ticket::Shown, StatusCode> {
        Self::send(self.request(Method::GET, &format!("/tickets/{id}"))).await
    }

    pub async fn update_ticket(
        &self,
        id: impl fmt::Display,
        body: Value,
    ) -> Result<api::ticket::Saved, StatusCode> {
        Self::send(
            self.request(Method::PUT, &format!("/tickets/{id}")).json(&body),
        )
        .await
    }

    pub async fn delete_ticket(
        &self,
        id: impl fmt::Display,
    ) -> Result<api::Message, StatusCode> {
        Self::send(self.request(Method::DELETE, &format!("/tickets/{id}")))
            .await
    }

    pub async fn add_comment(
        &self,
        body: Value,
    ) -> Result<api::comment::Saved, StatusCode> {
        Self::send(self.request(Method::POST, "/comments").json(&body)).await
    }

    pub async fn comments(
        &self,
        ticket_id: impl fmt::Display,
    ) -> Result<api::comment::List, StatusCode> {
        Self::send(
            self.request(Method::GET, &format!("/comments/{ticket_id}")),
        )
        .await
    }

    pub async fn agents(&self) -> Result<api::user::Agents, StatusCode> {
        Self::send(self.request(Method::GET, "/users")).await
    }
}
