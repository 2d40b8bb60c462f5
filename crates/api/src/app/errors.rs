use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use agdb_auth::AccessError;
use agdb_infra::EngineError;
use agdb_infra::store::StoreError;

/// Map an engine failure for the identifier the caller sent (`raw`).
///
/// Messages quote the caller's input, not the canonical form.
pub fn engine_error_to_response(raw: &str, err: EngineError) -> axum::response::Response {
    match err {
        EngineError::InvalidIdentifier(_) => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_steam_id",
            format!("Invalid SteamID {raw}"),
        ),
        EngineError::NotFound(_) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("Player with SteamID {raw} not found"),
        ),
        EngineError::Store(e) => store_error_to_response(e),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "storage failure");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "store_error",
        err.to_string(),
    )
}

pub fn access_error_to_response(err: AccessError) -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
