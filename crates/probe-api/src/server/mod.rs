use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{ErrorBody, GameState, ReconciledState, SaveReceipt};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::store::{ReconciliationStore, StoreError};

include!("error.rs");
include!("routes.rs");

pub async fn serve(addr: SocketAddr, store: ReconciliationStore) -> Result<(), ServerError> {
    let app = router(AppState::new(store));

    let listener = TcpListener::bind(addr).await?;
    info!("api listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Clone)]
struct AppState {
    store: Arc<ReconciliationStore>,
}

impl AppState {
    fn new(store: ReconciliationStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/game", get(get_game).post(save_game))
        .route("/api/reset", post(reset_game))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("*"),
    );
}
