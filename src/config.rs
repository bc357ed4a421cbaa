//! Configuration for Greenpoint
//!
//! CLI arguments and environment variable handling using clap. A `.env` file
//! is loaded by the binary before parsing.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use uuid::Uuid;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_MONGODB_DB: &str = "greenpoint";
pub const DEFAULT_MAX_BODY_BYTES: usize = 10240;

/// Backing store selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// MongoDB (production)
    Mongo,
    /// Process-local maps, lost on restart
    Memory,
}

/// Greenpoint - recycling engagement backend
#[derive(Parser, Debug, Clone)]
#[command(name = "greenpoint")]
#[command(about = "Pickups, pledges, XP and community impact for a recycling app")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Record store backend
    #[arg(long, env = "STORE", value_enum, default_value = "mongo")]
    pub store: StoreKind,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = DEFAULT_MONGODB_URI)]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = DEFAULT_MONGODB_DB)]
    pub mongodb_db: String,

    /// Development mode: fall back to the in-memory store if MongoDB is down
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// Append activity events to this JSONL file
    #[arg(long, env = "ACTIVITY_LOG")]
    pub activity_log: Option<PathBuf>,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl Args {
    /// Defaults with the in-memory store, for tests and embedding
    ///
    /// Built directly rather than parsed, so the process environment is
    /// never consulted.
    pub fn in_memory() -> Self {
        Self {
            node_id: Uuid::new_v4(),
            listen: SocketAddr::from(([127, 0, 0, 1], 0)),
            store: StoreKind::Memory,
            mongodb_uri: DEFAULT_MONGODB_URI.to_string(),
            mongodb_db: DEFAULT_MONGODB_DB.to_string(),
            dev_mode: true,
            log_level: "info".to_string(),
            log_json: false,
            activity_log: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_body_bytes == 0 {
            return Err("MAX_BODY_BYTES must be greater than zero".to_string());
        }

        if self.mongodb_db.trim().is_empty() {
            return Err("MONGODB_DB must not be empty".to_string());
        }

        Ok(())
    }

    /// Human-readable mode label
    pub fn mode(&self) -> &'static str {
        if self.dev_mode {
            "development"
        } else {
            "production"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_in_memory_profile() {
        let args = Args::in_memory();
        assert_eq!(args.store, StoreKind::Memory);
        assert!(args.dev_mode);
        assert_eq!(args.mode(), "development");
        assert_eq!(args.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(args.mongodb_db, "greenpoint");
        assert!(args.activity_log.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_zero_body_limit_rejected() {
        let args = Args {
            max_body_bytes: 0,
            ..Args::in_memory()
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_blank_database_rejected() {
        let args = Args {
            mongodb_db: "  ".into(),
            ..Args::in_memory()
        };
        assert!(args.validate().is_err());
    }
}
