//! HTTP routes for Greenpoint

pub mod auth_routes;
pub mod health;
pub mod pickups;
pub mod pledges;
pub mod response;
pub mod stats;

pub use health::{health_check, version_info};
pub use response::{cors_preflight, method_not_allowed, not_found_response};
