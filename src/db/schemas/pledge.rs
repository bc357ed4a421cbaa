//! Pledge document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for pledges
pub const PLEDGE_COLLECTION: &str = "pledges";

/// Free-text commitment made by a user. Immutable once written.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PledgeDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub email: String,

    pub pledge: String,
}

impl PledgeDoc {
    pub fn new(email: String, pledge: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            email,
            pledge,
        }
    }
}

impl IntoIndexes for PledgeDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "metadata.created_at": -1 },
            Some(
                IndexOptions::builder()
                    .name("created_desc".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for PledgeDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn set_id(&mut self, id: ObjectId) {
        self._id = Some(id);
    }
}
