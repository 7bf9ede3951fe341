//! Route handlers under `/api/v1`

pub mod auth;
pub mod health;
pub mod password;
pub mod reminders;
pub mod users;

use actix_web::{http::header::USER_AGENT, HttpRequest};
use kk_core::domain::entities::ClientInfo;

/// Peer address and user agent recorded with sessions and tasks
pub fn client_info(req: &HttpRequest) -> ClientInfo {
    let client_ip = req.peer_addr().map(|addr| addr.ip().to_string()).unwrap_or_default();
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    ClientInfo::new(client_ip, user_agent)
}
