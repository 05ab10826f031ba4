//! Static file server for the generated site, with live redirects in dev.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use redirects::{normalize_request_path, Redirects, Resolution, RuleTable};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Characters that may not appear raw in a `Location` header.
const LOCATION: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// The dev server mounts `root` at `/`, so redirects ignore the configured
/// base path.
#[derive(Clone)]
pub struct DevRedirects {
    table: Arc<RuleTable>,
}

impl DevRedirects {
    pub fn new(redirects: Redirects) -> Self {
        Self {
            table: Arc::new(redirects.table),
        }
    }
}

pub fn app(root: &Path, dev: Option<DevRedirects>) -> Router {
    let mut router = Router::new().fallback_service(
        ServeDir::new(root).not_found_service(ServeFile::new(root.join("notfound.html"))),
    );
    if let Some(dev) = dev {
        router = router.layer(middleware::from_fn_with_state(dev, redirect));
    }
    router.layer(TraceLayer::new_for_http())
}

async fn redirect(State(dev): State<DevRedirects>, request: Request, next: Next) -> Response {
    let path = match normalize_request_path(request.uri().path()) {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "[redirect] Undecodable request path, passing through");
            return next.run(request).await;
        }
    };
    let Resolution::Found(target) = dev.table.resolve(&path) else {
        return next.run(request).await;
    };

    let href = target.as_str();
    let location = utf8_percent_encode(href, LOCATION).to_string();
    match HeaderValue::from_str(&location) {
        Ok(location) => {
            tracing::debug!(%path, %href, "[redirect] Redirecting");
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        Err(e) => {
            tracing::warn!(%href, error = %e, "[redirect] Destination is not a valid header");
            next.run(request).await
        }
    }
}
