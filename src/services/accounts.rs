//! Registration and login

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::required;
use crate::auth::{hash_password, verify_password};
use crate::db::schemas::UserDoc;
use crate::logging::{ActivityEvent, ActivityJournal, ActivityKind};
use crate::store::RecordStore;
use crate::types::{GreenpointError, Result};

/// Message shared by every credential failure so callers cannot probe for accounts
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Profile returned on successful login
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub email: String,
    pub xp: i64,
    pub streak: i64,
    pub badges: Vec<String>,
}

/// Create an account
///
/// A taken email fails with `AlreadyExists` and leaves the existing record
/// untouched. The unique index backs up the lookup for concurrent sign-ups.
pub async fn register(
    store: &dyn RecordStore,
    journal: &ActivityJournal,
    request: RegisterRequest,
) -> Result<UserDoc> {
    let email = required(&request.email, "email")?;
    if request.password.is_empty() {
        return Err(GreenpointError::Validation(
            "Missing required field: password".into(),
        ));
    }

    if store.find_user(email).await?.is_some() {
        warn!("Registration rejected, email taken: {}", email);
        return Err(GreenpointError::AlreadyExists(
            "Email already registered".into(),
        ));
    }

    let password_hash = hash_password(&request.password)?;
    let user = store
        .insert_user(UserDoc::new(email.to_string(), password_hash))
        .await?;

    info!("Registered user {}", user.email);
    journal
        .record(ActivityEvent::new(ActivityKind::UserRegistered, &user.email))
        .await;

    Ok(user)
}

/// Check credentials and return the user's progress
pub async fn login(store: &dyn RecordStore, request: LoginRequest) -> Result<LoginResponse> {
    let email = required(&request.email, "email")?;
    if request.password.is_empty() {
        return Err(GreenpointError::Validation(
            "Missing required field: password".into(),
        ));
    }

    let Some(user) = store.find_user(email).await? else {
        warn!("Login failed - unknown user: {}", email);
        return Err(GreenpointError::Auth(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&request.password, &user.password_hash)? {
        warn!("Login failed - invalid password: {}", email);
        return Err(GreenpointError::Auth(INVALID_CREDENTIALS.into()));
    }

    info!("Login successful: {}", email);
    Ok(LoginResponse {
        email: user.email,
        xp: user.xp,
        streak: user.streak,
        badges: user.badges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn creds(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let journal = ActivityJournal::new();

        let user = register(&store, &journal, creds("eco@x.y", "pw"))
            .await
            .unwrap();
        assert_eq!(user.xp, 0);
        assert_ne!(user.password_hash, "pw");

        let profile = login(&store, login_req("eco@x.y", "pw")).await.unwrap();
        assert_eq!(
            profile,
            LoginResponse {
                email: "eco@x.y".into(),
                xp: 0,
                streak: 0,
                badges: vec![],
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_first() {
        let store = MemoryStore::new();
        let journal = ActivityJournal::new();

        register(&store, &journal, creds("dup@x.y", "first"))
            .await
            .unwrap();
        let second = register(&store, &journal, creds("dup@x.y", "second")).await;
        assert!(matches!(second, Err(GreenpointError::AlreadyExists(_))));

        assert!(login(&store, login_req("dup@x.y", "first")).await.is_ok());
        assert!(login(&store, login_req("dup@x.y", "second")).await.is_err());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = MemoryStore::new();
        register(&store, &ActivityJournal::new(), creds("real@x.y", "pw"))
            .await
            .unwrap();

        let wrong_password = login(&store, login_req("real@x.y", "nope"))
            .await
            .unwrap_err();
        let unknown_user = login(&store, login_req("ghost@x.y", "pw"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, GreenpointError::Auth(_)));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let store = MemoryStore::new();
        let journal = ActivityJournal::new();

        assert!(matches!(
            register(&store, &journal, creds("", "pw")).await,
            Err(GreenpointError::Validation(_))
        ));
        assert!(matches!(
            register(&store, &journal, creds("a@x.y", "")).await,
            Err(GreenpointError::Validation(_))
        ));
        assert!(matches!(
            login(&store, login_req("  ", "pw")).await,
            Err(GreenpointError::Validation(_))
        ));
    }
}
