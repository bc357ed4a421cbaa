//! HTTP routes for derived statistics
//!
//! - GET /api/stats/{email}   - Impact and progress for one user
//! - GET /api/leaderboard     - Top users by XP
//! - GET /api/community-goal  - Carbon offset across all pickups

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

use super::response::respond;
use crate::server::AppState;
use crate::services;
use crate::types::GreenpointError;

/// GET /api/stats/{email}
///
/// The path segment is percent-decoded, so `a%40b.c` addresses `a@b.c`.
pub async fn handle_stats(raw_email: &str, state: &AppState) -> Response<Full<Bytes>> {
    let result = async {
        let email = urlencoding::decode(raw_email)
            .map_err(|e| GreenpointError::Validation(format!("Invalid email segment: {}", e)))?;
        services::user_stats(state.store.as_ref(), &state.journal, &email).await
    }
    .await;

    respond(StatusCode::OK, result)
}

/// GET /api/leaderboard
pub async fn handle_leaderboard(state: &AppState) -> Response<Full<Bytes>> {
    respond(StatusCode::OK, services::leaderboard(state.store.as_ref()).await)
}

/// GET /api/community-goal
pub async fn handle_community_goal(state: &AppState) -> Response<Full<Bytes>> {
    respond(
        StatusCode::OK,
        services::community_goal(state.store.as_ref()).await,
    )
}
