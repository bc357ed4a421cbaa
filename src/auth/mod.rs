//! Credential handling
//!
//! Passwords are only ever stored as Argon2 hashes.

pub mod password;

pub use password::{hash_password, verify_password};
