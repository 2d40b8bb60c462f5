use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::errors;
use crate::app::services::AppServices;

pub const MASTER_KEY_HEADER: &str = "master-key";
pub const SERVER_ADDR_HEADER: &str = "ip";
pub const SERVER_TOKEN_HEADER: &str = "token";

/// Moderation routes: the `master-key` header must match the configured key.
pub async fn master_key_guard(
    State(services): State<Arc<AppServices>>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let presented = header_str(req.headers(), MASTER_KEY_HEADER);
    if let Err(refused) = services.verify_master_key(presented) {
        tracing::warn!(reason = %refused, "moderation request refused");
        return errors::access_error_to_response(refused);
    }

    next.run(req).await
}

/// Game-server routes: `ip` and `token` headers must name a registered server.
pub async fn server_guard(
    State(services): State<Arc<AppServices>>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    // Owned copies: the request body is not `Sync`, so no borrow of `req` may
    // live across the store lookup.
    let server_addr = header_str(req.headers(), SERVER_ADDR_HEADER).map(str::to_string);
    let token = header_str(req.headers(), SERVER_TOKEN_HEADER).map(str::to_string);

    let verdict = services
        .verify_server(server_addr.as_deref(), token.as_deref())
        .await;

    match verdict {
        Ok(Ok(())) => next.run(req).await,
        Ok(Err(refused)) => {
            tracing::warn!(reason = %refused, "server request refused");
            errors::access_error_to_response(refused)
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Header value as text. Missing and non-UTF-8 values both read as absent.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
