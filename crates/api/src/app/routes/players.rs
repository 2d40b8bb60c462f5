use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use agdb_players::BanDecision;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn list_players(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.engine.list_players().await {
        Ok(players) => {
            let items: Vec<dto::PlayerResponse> =
                players.iter().map(dto::PlayerResponse::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Correlated, enriched profile. Accepts any Steam ID encoding.
pub async fn get_player(
    Extension(services): Extension<Arc<AppServices>>,
    Path(steam_id): Path<String>,
) -> axum::response::Response {
    let correlation = match services.engine.correlate(&steam_id).await {
        Ok(correlation) => correlation,
        Err(e) => return errors::engine_error_to_response(&steam_id, e),
    };

    let profile = services.enricher.enrich(&correlation).await;
    (StatusCode::OK, Json(dto::ProfileResponse::from(profile))).into_response()
}

/// Login reported by a game server (guarded by server credentials).
pub async fn register_player(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterPlayerRequest>,
) -> axum::response::Response {
    let nickname = body.nickname.trim();
    let ip = body.ip.trim();
    if nickname.is_empty() || ip.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "nickname and ip must not be empty",
        );
    }

    match services.engine.register(&body.steam_id, nickname, ip).await {
        Ok(player) => (
            StatusCode::CREATED,
            Json(dto::PlayerResponse::from(&player)),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(&body.steam_id, e),
    }
}

/// Ban the player and everyone related (guarded by the master key).
///
/// The body is optional; a ban without a reason stores an empty one. A body
/// that is present but not a valid `BanRequest` is refused before any write.
pub async fn ban_player(
    Extension(services): Extension<Arc<AppServices>>,
    Path(steam_id): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    let request = match dto::BanRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("invalid ban request body: {e}"),
            );
        }
    };
    set_ban_state(services, steam_id, BanDecision::Ban { reason: request.reason }).await
}

pub async fn unban_player(
    Extension(services): Extension<Arc<AppServices>>,
    Path(steam_id): Path<String>,
) -> axum::response::Response {
    set_ban_state(services, steam_id, BanDecision::Unban).await
}

async fn set_ban_state(
    services: Arc<AppServices>,
    steam_id: String,
    decision: BanDecision,
) -> axum::response::Response {
    match services.engine.set_ban_state(&steam_id, decision).await {
        Ok(summary) => (
            StatusCode::CREATED,
            Json(dto::BanSummaryResponse::from(summary)),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(&steam_id, e),
    }
}
