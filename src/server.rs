use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use crate::session;
use crate::shared::AppState;
use crate::stats::handlers::{get_livestream_statistics, get_user_statistics};

/// Process configuration read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// When unset the server runs against the in-memory repository
    pub database_url: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        Self::from_vars(
            std::env::var("BIND_ADDR").ok(),
            std::env::var("DATABASE_URL").ok(),
        )
    }

    fn from_vars(
        bind_addr: Option<String>,
        database_url: Option<String>,
    ) -> Result<Self, std::net::AddrParseError> {
        let bind_addr = bind_addr
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()?;

        Ok(Self {
            bind_addr,
            database_url: database_url.filter(|url| !url.is_empty()),
        })
    }
}

/// Statistics routes, all of them behind session verification
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/user/:username/statistics", get(get_user_statistics))
        .route(
            "/api/livestream/:livestream_id/statistics",
            get(get_livestream_statistics),
        )
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            session::jwt_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
