//! HTTP routes for pickups
//!
//! - POST /api/pickups               - Schedule a pickup
//! - GET  /api/pickups?email=        - List a user's pickups
//! - POST /api/pickups/{id}/complete - Mark a pickup completed

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;

use super::response::{parse_json_body, respond};
use crate::server::AppState;
use crate::services::{self, SchedulePickupRequest};
use crate::types::GreenpointError;

#[derive(Debug, Default, Deserialize)]
struct EmailQuery {
    #[serde(default)]
    email: String,
}

/// POST /api/pickups
pub async fn handle_schedule<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let result = async {
        let body: SchedulePickupRequest =
            parse_json_body(req, state.args.max_body_bytes).await?;
        services::schedule(state.store.as_ref(), &state.journal, body).await
    }
    .await;

    respond(StatusCode::CREATED, result)
}

/// GET /api/pickups?email=
pub async fn handle_list(query: Option<&str>, state: &AppState) -> Response<Full<Bytes>> {
    let result = async {
        let query: EmailQuery = serde_urlencoded::from_str(query.unwrap_or(""))
            .map_err(|e| GreenpointError::BadRequest(format!("Invalid query: {}", e)))?;
        services::list_for(state.store.as_ref(), &query.email).await
    }
    .await;

    respond(StatusCode::OK, result)
}

/// POST /api/pickups/{id}/complete
pub async fn handle_complete(pickup_id: &str, state: &AppState) -> Response<Full<Bytes>> {
    respond(
        StatusCode::OK,
        services::complete(state.store.as_ref(), &state.journal, pickup_id).await,
    )
}
