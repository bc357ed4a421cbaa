//! Pickup request document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for pickups
pub const PICKUP_COLLECTION: &str = "pickups";

/// Lifecycle of a pickup request. Only moves forward.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PickupStatus {
    #[default]
    Scheduled,
    Completed,
}

impl PickupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
        }
    }
}

/// Pickup document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PickupDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Owner, referenced by value (no foreign key)
    pub email: String,

    pub date: String,

    #[serde(default)]
    pub location: String,

    /// Free-text pickup kind
    #[serde(rename = "type", default)]
    pub pickup_type: String,

    #[serde(default)]
    pub time: String,

    #[serde(default)]
    pub phone: String,

    /// Material labels, one per item
    #[serde(default)]
    pub materials: Vec<String>,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub status: PickupStatus,
}

impl PickupDoc {
    /// Number of items this pickup contributes to impact figures
    pub fn item_count(&self) -> u64 {
        self.materials.len() as u64
    }

    /// Hex form of the document id, empty before insertion
    pub fn id_hex(&self) -> String {
        self._id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

impl IntoIndexes for PickupDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "email": 1, "metadata.created_at": -1 },
            Some(
                IndexOptions::builder()
                    .name("owner_newest".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for PickupDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn set_id(&mut self, id: ObjectId) {
        self._id = Some(id);
    }
}
