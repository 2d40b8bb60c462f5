use std::net::SocketAddr;

use axum::{
    extract::ConnectInfo,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::app::{dto, errors};
use crate::middleware::header_str;

/// The caller's public address as seen through any reverse proxy.
pub async fn client_ip(
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> axum::response::Response {
    match resolve_client_ip(&headers, peer.map(|ConnectInfo(addr)| addr)) {
        Some(ip) => (StatusCode::OK, Json(dto::ClientIpResponse { ip })).into_response(),
        None => errors::json_error(
            StatusCode::BAD_REQUEST,
            "unknown_client_ip",
            "could not determine client IP",
        ),
    }
}

/// `X-Forwarded-For` first hop, then `X-Real-IP`, then the socket peer.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = header_str(headers, "x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim);
    let real_ip = header_str(headers, "x-real-ip").map(str::trim);

    forwarded
        .into_iter()
        .chain(real_ip)
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}
