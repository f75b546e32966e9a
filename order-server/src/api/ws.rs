//! WebSocket endpoint
//!
//! GET /ws?token=<JWT>
//!
//! The token is optional and travels as a query parameter because browser
//! WebSockets cannot set headers. Diners may subscribe to orders they can
//! read; joining a role group requires a staff token.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use serde::Deserialize;

use crate::auth::{CurrentUser, authenticate};
use crate::core::ServerState;
use crate::hub::{SessionContext, run_session};
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(handle_ws))
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    token: Option<String>,
}

/// GET /ws
pub async fn handle_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsQuery>,
    user: Option<CurrentUser>,
    ws: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    let user = match (user, query.token) {
        (Some(user), _) => Some(user),
        (None, Some(token)) => Some(authenticate(state.jwt_service(), &token)?),
        (None, None) => None,
    };

    let ctx = SessionContext {
        hub: state.hub.clone(),
        orders: state.orders.clone(),
        user,
    };
    Ok(ws.on_upgrade(move |socket| run_session(socket, ctx)))
}
