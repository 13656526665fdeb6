//! JSON HTTP API for pet clinic client records.
//!
//! Every response uses the `{ data, error }` envelope from
//! [`http::envelope`]. Routes are served both under `/clients` and under
//! `/api/clients`.

pub mod config;
pub mod http;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use pet_clinic_core::ClientStore;

pub use config::{ConfigError, ServerConfig, DEFAULT_MAX_BODY_BYTES};

const CLIENT_PREFIXES: [&str; 2] = ["/clients", "/api/clients"];

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ClientStore>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<ClientStore>) -> Self {
        Self {
            store,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    #[must_use]
    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    use http::handlers::{
        create_client_handler, delete_client_handler, get_client_handler, healthz_handler,
        list_clients_handler, method_not_allowed_handler, route_not_found_handler,
        update_client_handler,
    };

    let mut router = Router::new().route("/healthz", get(healthz_handler));

    for prefix in CLIENT_PREFIXES {
        router = router
            .route(
                prefix,
                get(list_clients_handler)
                    .post(create_client_handler)
                    .fallback(method_not_allowed_handler),
            )
            .route(
                &format!("{prefix}/:id"),
                get(get_client_handler)
                    .put(update_client_handler)
                    .delete(delete_client_handler)
                    .fallback(method_not_allowed_handler),
            );
    }

    router
        .fallback(route_not_found_handler)
        .layer(from_fn(http::request_tracing::request_tracing_middleware))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .with_state(state)
}
