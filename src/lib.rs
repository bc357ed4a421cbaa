//! Greenpoint - recycling engagement backend
//!
//! Users schedule recycling pickups and make pledges; each action earns XP.
//! The service derives badges, a leaderboard and environmental impact figures
//! from the stored records.
//!
//! ## Layout
//!
//! - **store**: `RecordStore` trait with MongoDB and in-memory backends
//! - **gamification**: XP policy, badge thresholds, impact formulas
//! - **services**: per-operation orchestration, HTTP-agnostic
//! - **routes** / **server**: hyper HTTP surface
//! - **logging**: subscriber setup and the activity journal

pub mod auth;
pub mod config;
pub mod db;
pub mod gamification;
pub mod logging;
pub mod routes;
pub mod server;
pub mod services;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{GreenpointError, Result};
