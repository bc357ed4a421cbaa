//! HTTP routes for pledges
//!
//! - POST /api/pledges - Submit a pledge
//! - GET  /api/pledges - Most recent pledges

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};

use super::response::{parse_json_body, respond};
use crate::server::AppState;
use crate::services::{self, AddPledgeRequest};

/// POST /api/pledges
pub async fn handle_add<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let result = async {
        let body: AddPledgeRequest = parse_json_body(req, state.args.max_body_bytes).await?;
        services::add_pledge(state.store.as_ref(), &state.journal, body).await
    }
    .await;

    respond(StatusCode::CREATED, result)
}

/// GET /api/pledges
pub async fn handle_list(state: &AppState) -> Response<Full<Bytes>> {
    respond(
        StatusCode::OK,
        services::list_pledges(state.store.as_ref()).await,
    )
}
