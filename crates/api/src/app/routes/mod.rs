use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::app::services::AppServices;
use crate::middleware;

pub mod network;
pub mod players;
pub mod system;

/// Router for the player and network endpoints.
///
/// Guards are attached per route: reads are public, registration needs server
/// credentials, ban and unban need the master key.
pub fn router(services: Arc<AppServices>) -> Router {
    let server_guard = from_fn_with_state(services.clone(), middleware::server_guard);
    let master_key_guard = from_fn_with_state(services, middleware::master_key_guard);

    let moderation = Router::new()
        .route("/players/ban/:steam_id", post(players::ban_player))
        .route("/players/unban/:steam_id", post(players::unban_player))
        .route_layer(master_key_guard);

    Router::new()
        .route(
            "/players",
            get(players::list_players).merge(post(players::register_player).route_layer(server_guard)),
        )
        .route("/players/:steam_id", get(players::get_player))
        .route("/network/ip", get(network::client_ip))
        .merge(moderation)
}
