//! HTTP routes for accounts
//!
//! - POST /api/auth/register - Create an account
//! - POST /api/auth/login    - Check credentials, return progress

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};

use super::response::{parse_json_body, respond, SuccessResponse};
use crate::server::AppState;
use crate::services::{self, LoginRequest, RegisterRequest};
use crate::types::GreenpointError;

/// POST /api/auth/register
pub async fn handle_register<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let result = async {
        let body: RegisterRequest = parse_json_body(req, state.args.max_body_bytes).await?;
        let user = services::register(state.store.as_ref(), &state.journal, body).await?;
        Ok::<_, GreenpointError>(SuccessResponse {
            success: true,
            message: format!("Registered {}", user.email),
        })
    }
    .await;

    respond(StatusCode::CREATED, result)
}

/// POST /api/auth/login
pub async fn handle_login<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let result = async {
        let body: LoginRequest = parse_json_body(req, state.args.max_body_bytes).await?;
        services::login(state.store.as_ref(), body).await
    }
    .await;

    respond(StatusCode::OK, result)
}
