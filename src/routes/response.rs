//! Response and body helpers shared by every route

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE,
};
use hyper::{Request, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::error;

use crate::types::GreenpointError;

/// Error body returned by every failing route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

fn with_cors(mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// Serialize `body` as JSON with the given status
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_vec(body).unwrap_or_else(|e| {
        error!("Failed to serialize response: {}", e);
        br#"{"error":"Serialization failed","code":"INTERNAL_ERROR"}"#.to_vec()
    });

    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(response)
}

/// Map an error to its status and JSON body
pub fn error_response(err: &GreenpointError) -> Response<Full<Bytes>> {
    json_response(
        err.status_code(),
        &ErrorResponse {
            error: err.to_string(),
            code: err.code(),
        },
    )
}

/// Turn a service result into a response
pub fn respond<T: Serialize>(
    status: StatusCode,
    result: Result<T, GreenpointError>,
) -> Response<Full<Bytes>> {
    match result {
        Ok(body) => json_response(status, &body),
        Err(err) => {
            if err.status_code().is_server_error() {
                error!("Request failed: {}", err);
            }
            error_response(&err)
        }
    }
}

/// CORS preflight response
pub fn cors_preflight() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    with_cors(response)
}

pub fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::NOT_FOUND,
        &ErrorResponse {
            error: format!("No route for {}", path),
            code: "NOT_FOUND",
        },
    )
}

pub fn method_not_allowed() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorResponse {
            error: "Method not allowed".into(),
            code: "METHOD_NOT_ALLOWED",
        },
    )
}

/// Read and decode a JSON request body of at most `limit` bytes
pub async fn parse_json_body<T, B>(req: Request<B>, limit: usize) -> Result<T, GreenpointError>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let collected = Limited::new(req.into_body(), limit)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                GreenpointError::BadRequest(format!("Request body exceeds {} bytes", limit))
            } else {
                GreenpointError::BadRequest(format!("Failed to read body: {}", e))
            }
        })?;

    Ok(serde_json::from_slice(&collected.to_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_body_limit() {
        let req = Request::new(Full::new(Bytes::from(vec![b'x'; 64])));
        let result: Result<serde_json::Value, _> = parse_json_body(req, 16).await;
        assert!(matches!(result, Err(GreenpointError::BadRequest(msg)) if msg.contains("exceeds")));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let req = Request::new(Full::new(Bytes::from_static(b"{not json")));
        let result: Result<serde_json::Value, _> = parse_json_body(req, 1024).await;
        assert!(matches!(result, Err(GreenpointError::BadRequest(_))));
    }

    #[test]
    fn test_error_response_shape() {
        let response = error_response(&GreenpointError::NotFound("User x".into()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
