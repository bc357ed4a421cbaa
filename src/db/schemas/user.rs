//! User document schema
//!
//! Account credentials plus the persisted gamification counters.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Identity key, unique across users
    pub email: String,

    /// Argon2 PHC hash
    pub password_hash: String,

    /// Experience points, only ever changed through `$inc`
    #[serde(default)]
    pub xp: i64,

    /// Completed pickups counter
    #[serde(default)]
    pub streak: i64,

    /// Badge labels in the order they were granted
    #[serde(default)]
    pub badges: Vec<String>,
}

impl UserDoc {
    /// Create a fresh account with zeroed counters
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            email,
            password_hash,
            xp: 0,
            streak: 0,
            badges: Vec::new(),
        }
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_unique".to_string())
                        .build(),
                ),
            ),
            // Leaderboard scan
            (
                doc! { "xp": -1 },
                Some(IndexOptions::builder().name("xp_desc".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn set_id(&mut self, id: ObjectId) {
        self._id = Some(id);
    }
}
