use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::storage::Storage;

mod error;
mod handlers;
mod models;

use handlers::{
    create_interview, create_task, get_interview, get_task, health, list_interviews, list_tasks,
    method_not_allowed, not_found, root, update_task_status,
};

#[derive(Clone)]
pub struct AppState<S: Storage> {
    pub storage: S,
    pub started_at: std::time::SystemTime,
}

/// Any origin, with credentials. Browsers refuse `*` alongside credentials,
/// so the request's own origin, method and headers are echoed back.
/// Not suitable for production as-is.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn router<S: Storage + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::<S>))
        .route("/tasks/", get(list_tasks::<S>).post(create_task::<S>))
        .route("/tasks", get(list_tasks::<S>).post(create_task::<S>))
        .route(
            "/tasks/:id",
            get(get_task::<S>).patch(update_task_status::<S>),
        )
        .route(
            "/interviews/",
            get(list_interviews::<S>).post(create_interview::<S>),
        )
        .route(
            "/interviews",
            get(list_interviews::<S>).post(create_interview::<S>),
        )
        .route("/interviews/:id", get(get_interview::<S>))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
        .with_state(state)
}

pub async fn serve<S: Storage + Clone + Send + Sync + 'static>(
    addr: SocketAddr,
    storage: S,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    let state = AppState {
        storage,
        started_at: std::time::SystemTime::now(),
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("🌐 REST listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("🛑 REST shutdown requested");
        })
        .await?;
    log::info!("👋 REST server exited");
    Ok(())
}
