//! HTTP server implementation
//!
//! hyper http1 with one task per connection. Routing is a single
//! `(method, path)` match over the API table.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::{Args, StoreKind};
use crate::db::MongoClient;
use crate::logging::ActivityJournal;
use crate::routes::{self, auth_routes, pickups, pledges, stats};
use crate::store::{MemoryStore, MongoStore, RecordStore};
use crate::types::GreenpointError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// The only shared mutable resource; all writes go through it
    pub store: Arc<dyn RecordStore>,
    pub journal: ActivityJournal,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, store: Arc<dyn RecordStore>, journal: ActivityJournal) -> Self {
        Self {
            args,
            store,
            journal,
            started_at: Instant::now(),
        }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(args: Args) -> Self {
        let journal = ActivityJournal::from_config(args.activity_log.as_ref());
        Self::new(args, Arc::new(MemoryStore::new()), journal)
    }

    /// Build state from configuration, connecting to MongoDB when selected
    ///
    /// In dev mode an unreachable MongoDB degrades to the in-memory store.
    pub async fn connect(args: Args) -> Result<Self, GreenpointError> {
        if args.store == StoreKind::Memory {
            if !args.dev_mode {
                warn!("In-memory store selected outside dev mode - data is lost on restart");
            }
            return Ok(Self::in_memory(args));
        }

        let opened = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => MongoStore::open(client).await,
            Err(e) => Err(e),
        };

        match opened {
            Ok(store) => {
                let journal = ActivityJournal::from_config(args.activity_log.as_ref());
                Ok(Self::new(args, Arc::new(store), journal))
            }
            Err(e) if args.dev_mode => {
                warn!(
                    "MongoDB unavailable (dev mode, continuing with in-memory store): {}",
                    e
                );
                Ok(Self::in_memory(args))
            }
            Err(e) => Err(e),
        }
    }
}

/// Accept connections until Ctrl-C or SIGTERM
pub async fn run(state: Arc<AppState>) -> Result<(), GreenpointError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Greenpoint listening on {} as node {} (store: {})",
        state.args.listen,
        state.args.node_id,
        state.store.backend()
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = service_fn(move |req: Request<Incoming>| {
                            let state = Arc::clone(&state);
                            async move { handle_request(state, addr, req).await }
                        });

                        if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                            error!("Error serving connection from {}: {:?}", addr, err);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {:?}", e);
                }
            },
            _ = &mut shutdown => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    info!("[{}] {} {}", addr, req.method(), req.uri().path());
    Ok(route(&state, req).await)
}

/// Dispatch one request against the API table
pub async fn route<B>(state: &AppState, req: Request<B>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    if method == Method::OPTIONS {
        return routes::cors_preflight();
    }

    match (method, ApiPath::parse(&path)) {
        (Method::GET, ApiPath::Health) => routes::health_check(state).await,
        (Method::GET, ApiPath::Version) => routes::version_info(),

        (Method::POST, ApiPath::Register) => auth_routes::handle_register(req, state).await,
        (Method::POST, ApiPath::Login) => auth_routes::handle_login(req, state).await,

        (Method::POST, ApiPath::Pickups) => pickups::handle_schedule(req, state).await,
        (Method::GET, ApiPath::Pickups) => pickups::handle_list(query.as_deref(), state).await,
        (Method::POST, ApiPath::CompletePickup(id)) => pickups::handle_complete(id, state).await,

        (Method::POST, ApiPath::Pledges) => pledges::handle_add(req, state).await,
        (Method::GET, ApiPath::Pledges) => pledges::handle_list(state).await,

        (Method::GET, ApiPath::Stats(email)) => stats::handle_stats(email, state).await,
        (Method::GET, ApiPath::Leaderboard) => stats::handle_leaderboard(state).await,
        (Method::GET, ApiPath::CommunityGoal) => stats::handle_community_goal(state).await,

        (_, ApiPath::Unknown) => routes::not_found_response(&path),
        _ => routes::method_not_allowed(),
    }
}

/// Resource addressed by a request path, independent of method
#[derive(Debug, PartialEq, Eq)]
enum ApiPath<'a> {
    Health,
    Version,
    Register,
    Login,
    Pickups,
    /// `/api/pickups/{id}/complete`
    CompletePickup(&'a str),
    Pledges,
    /// `/api/stats/{email}`, still percent-encoded
    Stats(&'a str),
    Leaderboard,
    CommunityGoal,
    Unknown,
}

impl<'a> ApiPath<'a> {
    fn parse(path: &'a str) -> Self {
        match path {
            "/health" | "/healthz" => Self::Health,
            "/version" => Self::Version,
            "/api/auth/register" => Self::Register,
            "/api/auth/login" => Self::Login,
            "/api/pickups" => Self::Pickups,
            "/api/pledges" => Self::Pledges,
            "/api/leaderboard" => Self::Leaderboard,
            "/api/community-goal" => Self::CommunityGoal,
            _ => {
                if let Some(id) = completion_id(path) {
                    Self::CompletePickup(id)
                } else if let Some(email) = stats_email(path) {
                    Self::Stats(email)
                } else {
                    Self::Unknown
                }
            }
        }
    }
}

fn completion_id(path: &str) -> Option<&str> {
    path.strip_prefix("/api/pickups/")?
        .strip_suffix("/complete")
        .filter(|id| !id.is_empty() && !id.contains('/'))
}

fn stats_email(path: &str) -> Option<&str> {
    path.strip_prefix("/api/stats/")
        .filter(|email| !email.is_empty() && !email.contains('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_id_extraction() {
        assert_eq!(
            completion_id("/api/pickups/65f0c0ffee/complete"),
            Some("65f0c0ffee")
        );
        assert_eq!(completion_id("/api/pickups//complete"), None);
        assert_eq!(completion_id("/api/pickups/a/b/complete"), None);
        assert_eq!(completion_id("/api/pickups"), None);
    }

    #[test]
    fn test_stats_email_extraction() {
        assert_eq!(stats_email("/api/stats/a%40b.c"), Some("a%40b.c"));
        assert_eq!(stats_email("/api/stats/"), None);
        assert_eq!(stats_email("/api/stats/a/b"), None);
    }

    #[test]
    fn test_path_parsing() {
        assert_eq!(ApiPath::parse("/healthz"), ApiPath::Health);
        assert_eq!(ApiPath::parse("/api/leaderboard"), ApiPath::Leaderboard);
        assert_eq!(
            ApiPath::parse("/api/pickups/abc/complete"),
            ApiPath::CompletePickup("abc")
        );
        assert_eq!(ApiPath::parse("/api/stats/x%40y.z"), ApiPath::Stats("x%40y.z"));
        assert_eq!(ApiPath::parse("/api/stats/"), ApiPath::Unknown);
        assert_eq!(ApiPath::parse("/api/unknown"), ApiPath::Unknown);
    }

    #[tokio::test]
    async fn test_wrong_method_on_parameterised_path() {
        let state = AppState::in_memory(Args::in_memory());
        let req = Request::builder()
            .method(Method::GET)
            .uri("/api/pickups/abc/complete")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = route(&state, req).await;
        assert_eq!(response.status(), hyper::StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_memory_store_selected_without_mongo() {
        let state = AppState::connect(Args::in_memory()).await.unwrap();
        assert_eq!(state.store.backend(), "memory");
    }
}
