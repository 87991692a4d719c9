use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use edb_core::{Event, EventStorage, StorageError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{error, info, Level};

use crate::assets::{content_type, Assets};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("encode events: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[derive(Clone)]
struct AppState {
    storage: Arc<dyn EventStorage>,
    assets: Arc<Assets>,
}

/// Read-only HTTP interface to an event store.
pub struct EventsServer {
    router: Router,
}

impl EventsServer {
    pub fn new(storage: Arc<dyn EventStorage>, assets: Assets) -> Self {
        let state = AppState { storage, assets: Arc::new(assets) };

        // any front end may read the event feeds
        let feeds = Router::new()
            .route("/events.json", get(all_events))
            .route("/actors/{actor}/events.json", get(actor_events))
            .layer(CorsLayer::new().allow_origin(Any));

        let router = Router::new().route("/", get(index)).route("/assets/{file}", get(asset)).merge(feeds).with_state(state).layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .into_inner(),
        );

        Self { router }
    }

    pub fn router(&self) -> Router { self.router.clone() }

    /// Serve until `shutdown` is cancelled, then let in-flight requests finish.
    pub async fn run(self, bind_address: &str, shutdown: CancellationToken) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(bind_address).await?;
        info!("listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router).with_graceful_shutdown(async move { shutdown.cancelled().await }).await?;

        info!("http server stopped");
        Ok(())
    }
}

async fn index(State(state): State<AppState>) -> Response { serve_asset(&state.assets, "index.html").await }

async fn asset(State(state): State<AppState>, Path(file): Path<String>) -> Response { serve_asset(&state.assets, &file).await }

async fn serve_asset(assets: &Assets, filename: &str) -> Response {
    match assets.load(filename).await {
        Some(body) => ([(header::CONTENT_TYPE, content_type(filename))], body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn all_events(State(state): State<AppState>) -> Result<Response, ApiError> {
    let events = state.storage.events().await?;
    events_json(&events)
}

async fn actor_events(State(state): State<AppState>, Path(actor): Path<String>) -> Result<Response, ApiError> {
    let events = state.storage.events_by_actor(&actor).await?;
    events_json(&events)
}

fn events_json(events: &[Event]) -> Result<Response, ApiError> {
    let body = serde_json::to_string_pretty(events)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
