use std::{net, time};

use serde::Deserialize;

#[derive(Deserialize)]
pub struct Config {
    #[serde(default)]
    pub db: Db,
    pub http: Http,
    pub jwt: Jwt,
    #[serde(default)]
    pub auth: Auth,
}

#[derive(Default, Deserialize)]
pub struct Db {
    /// Without a URL the service runs on a seeded in-memory store.
    pub url: Option<String>,
}

#[derive(Deserialize)]
pub struct Http {
    pub server: Server,
    #[serde(default)]
    pub cors: Cors,
    #[serde(default)]
    pub cookie: Cookie,
}

#[derive(Deserialize)]
pub struct Server {
    pub addr: net::SocketAddr,
}

#[derive(Default, Deserialize)]
pub struct Cors {
    pub allowed_origins: Vec<String>,
}

#[derive(Default, Deserialize)]
pub struct Cookie {
    /// Should be enabled for anything served over HTTPS.
    #[serde(default)]
    pub secure: bool,
}

#[derive(Deserialize)]
pub struct Jwt {
    pub secret: String,
    #[serde(default = "default_expiration_time", with = "humantime_serde")]
    pub expiration_time: time::Duration,
}

#[derive(Default, Deserialize)]
pub struct Auth {
    /// Check the stored secret on login instead of trusting the email.
    #[serde(default)]
    pub require_password: bool,
}

fn default_expiration_time() -> time::Duration {
    time::Duration::from_secs(24 * 60 * 60)
}
