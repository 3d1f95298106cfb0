//! HTTP surface: register, login, logout and the protected profile routes.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

use crate::{session::SessionAuthority, store::CredentialStore};

pub mod handlers;
mod openapi;

pub use openapi::openapi;

/// Build the application router with the shared authority and store attached.
pub fn router(authority: Arc<SessionAuthority>, store: Arc<dyn CredentialStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_origin(Any);

    Router::new()
        .route("/", get(handlers::root::root))
        .route(
            "/health",
            get(handlers::health::health).options(handlers::health::health),
        )
        .route("/api/docs/openapi.json", get(|| async { Json(openapi()).into_response() }))
        .route("/api/v1/register", post(handlers::register::register))
        .route("/api/v1/login", post(handlers::login::login))
        .route("/api/v1/logout", post(handlers::logout::logout))
        .route("/api/v1/user/profile", get(handlers::profile::get_profile))
        .route("/api/v1/user/update", put(handlers::profile::update_profile))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(authority))
                .layer(Extension(store)),
        )
}

/// Start the server on `port` and run until Ctrl-C or SIGTERM.
/// # Errors
/// Return error if the listener cannot be bound or the server fails
pub async fn new(
    port: u16,
    authority: Arc<SessionAuthority>,
    store: Arc<dyn CredentialStore>,
) -> Result<()> {
    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    serve(listener, router(authority, store)).await
}

/// Serve `app` on an already bound listener with graceful shutdown.
/// # Errors
/// Return error if the server fails
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
