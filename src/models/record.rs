//! Stored record wrapper shared by every collection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Entity;

/// Document fields the store owns. Ignored when present in a request body.
pub const RESERVED_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

/// An entity document together with its store-assigned metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T: Entity> {
    pub id: String,
    #[serde(flatten)]
    pub fields: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<T: Entity> Record<T> {
    /// Wrap freshly submitted fields with a generated id and timestamps.
    pub fn new(fields: T) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }
}
