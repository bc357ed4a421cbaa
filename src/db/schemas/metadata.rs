//! Common metadata for all documents

use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Creation and update timestamps carried by every document
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    /// When the document was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    /// When the document was last updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl Metadata {
    /// Create new metadata stamped with the current time
    pub fn new() -> Self {
        let now = DateTime::now();
        Self {
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Mark the document as touched now
    pub fn touch(&mut self) {
        self.updated_at = Some(DateTime::now());
    }

    /// Creation time as RFC 3339, empty when unknown
    pub fn created_rfc3339(&self) -> String {
        self.created_at
            .and_then(|t| t.try_to_rfc3339_string().ok())
            .unwrap_or_default()
    }
}
