use std::{error::Error, sync::Arc};

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use tokio::{fs, net, task};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
};

use helpdesk::{
    auth::Keys,
    db,
    http::{self, AppState},
    Config,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = fs::read_to_string("config.toml").await?;
    let config = toml::from_str::<Config>(&config)?;

    let store: Arc<dyn db::Store> = match &config.db.url {
        Some(url) => {
            let (db_client, db_connection) = db::connect(url).await?;
            task::spawn(async move {
                if let Err(e) = db_connection.await {
                    tracing::error!("database connection failed: {e}");
                }
            });
            Arc::new(db_client)
        }
        None => {
            tracing::warn!("no database configured, serving demo data");
            Arc::new(db::memory::Store::seeded())
        }
    };

    let origins = config
        .http
        .cors
        .allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_origin(origins);

    let app = http::router(Arc::new(AppState {
        store,
        keys: Keys::new(&config.jwt.secret, config.jwt.expiration_time),
        cookie_secure: config.http.cookie.secure,
        require_password: config.auth.require_password,
    }))
    .layer(cors);

    let listener = net::TcpListener::bind(config.http.server.addr).await?;
    tracing::info!("listening on {}", config.http.server.addr);
    axum::serve(listener, app).await?;

    Ok(())
}
