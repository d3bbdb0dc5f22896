//! Serves the built console and forwards API traffic.
//!
//! `/api/*` and `/auth/*` are proxied to the clinic API. Everything else is
//! looked up in the static asset directory, and unknown paths fall back to
//! `index.html` so client-side routes resolve on a hard reload.

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::{Request, State},
    response::{IntoResponse, Response},
    routing::any,
};
use http::{HeaderMap, HeaderName, StatusCode, header};
use thiserror::Error;
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use url::Url;

use crate::config::ServerSettings;
use crate::error::{ConsoleError, Result};

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::HOST,
];

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Malformed request: {0}")]
    BadRequest(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

#[derive(Clone)]
struct ProxyState {
    client: reqwest::Client,
    upstream: Url,
}

/// True for headers the proxy drops in both directions.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name) || name.as_str() == "keep-alive" || *name == header::CONTENT_LENGTH
}

/// Upstream target for a proxied path. The upstream's own path is kept as a
/// prefix.
pub fn upstream_url(upstream: &Url, path_and_query: &str) -> std::result::Result<Url, url::ParseError> {
    let base = upstream.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}{path_and_query}"))
}

fn forwardable(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

async fn proxy(
    State(state): State<ProxyState>,
    request: Request,
) -> std::result::Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = upstream_url(&state.upstream, path_and_query)
        .map_err(|e| ProxyError::BadRequest(e.to_string()))?;

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ProxyError::BadRequest(e.to_string()))?;

    let upstream = state
        .client
        .request(parts.method.clone(), target.clone())
        .headers(forwardable(&parts.headers))
        .body(body)
        .send()
        .await
        .inspect_err(|e| warn!(%target, error = %e, "upstream request failed"))?;

    let status = upstream.status();
    let headers = forwardable(upstream.headers());
    let bytes = upstream.bytes().await?;

    let mut response = Response::builder()
        .status(status)
        .body(Body::from(bytes))
        .map_err(|e| ProxyError::Internal(e.to_string()))?;
    response.headers_mut().extend(headers);
    Ok(response)
}

/// Router for the console: API proxy plus static assets with an
/// `index.html` fallback.
pub fn router(upstream: Url, static_dir: &Path, timeout: Duration) -> Result<Router> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let state = ProxyState { client, upstream };

    let assets = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Ok(Router::new()
        .route("/api/{*rest}", any(proxy))
        .route("/auth/{*rest}", any(proxy))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Bind `settings.listen` and serve until Ctrl+C or SIGTERM.
pub async fn serve(settings: &ServerSettings, upstream: &str, timeout: Duration) -> Result<()> {
    let address: SocketAddr = settings
        .listen
        .parse()
        .map_err(|e| ConsoleError::Config(format!("invalid listen address '{}': {e}", settings.listen)))?;
    let upstream = Url::parse(upstream)?;

    if !settings.static_dir.join("index.html").is_file() {
        warn!(dir = %settings.static_dir.display(), "static directory has no index.html");
    }

    let app = router(upstream.clone(), &settings.static_dir, timeout)?;

    info!("Binding to {address}");
    let listener = TcpListener::bind(address).await?;
    info!(%upstream, "Server running on {address}");

    serve_with_shutdown(listener, app, shutdown_signal()).await?;

    info!("Server shut down");
    Ok(())
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ConsoleError::Server(e.to_string()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_url_keeps_prefix_and_query() {
        let upstream = Url::parse("http://api.internal:8080/v1/").unwrap();
        assert_eq!(
            upstream_url(&upstream, "/api/queue/details?x=1")
                .unwrap()
                .as_str(),
            "http://api.internal:8080/v1/api/queue/details?x=1"
        );

        let bare = Url::parse("http://localhost:8080").unwrap();
        assert_eq!(
            upstream_url(&bare, "/auth/login").unwrap().as_str(),
            "http://localhost:8080/auth/login"
        );
    }

    #[test]
    fn test_hop_by_hop_headers() {
        assert!(is_hop_by_hop(&header::CONNECTION));
        assert!(is_hop_by_hop(&header::HOST));
        assert!(is_hop_by_hop(&header::CONTENT_LENGTH));
        assert!(is_hop_by_hop(&HeaderName::from_static("keep-alive")));
        assert!(!is_hop_by_hop(&header::AUTHORIZATION));
        assert!(!is_hop_by_hop(&header::CONTENT_TYPE));
    }

    #[test]
    fn test_forwardable_strips_connection_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer t".parse().unwrap());
        headers.insert(header::CONNECTION, "close".parse().unwrap());
        headers.insert(header::HOST, "console.local".parse().unwrap());

        let forwarded = forwardable(&headers);
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[header::AUTHORIZATION], "Bearer t");
    }

    #[test]
    fn test_proxy_error_statuses() {
        assert_eq!(
            ProxyError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
