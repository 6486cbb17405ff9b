//! Data models for the portfolio content store.
//!
//! Every collection is described by a type implementing [`Entity`]. The
//! repository and the HTTP handlers are generic over that trait, so adding a
//! collection means adding a model file and one line in the router.

mod about;
mod admin;
mod contact;
mod message;
mod project;
mod push_subscription;
mod record;
mod skill;
mod work_experience;
mod year;

pub use about::*;
pub use admin::*;
pub use contact::*;
pub use message::*;
pub use project::*;
pub use push_subscription::*;
pub use record::*;
pub use skill::*;
pub use work_experience::*;
pub use year::*;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;
use crate::push::Notification;

/// Who may call which method on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reads are public, writes require a token.
    PublicRead,
    /// Anyone may create, everything else requires a token.
    Inbox,
}

/// How a collection is sorted when listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// By the `order` field ascending, unordered records last.
    Ascending,
    /// Most recently created first.
    NewestFirst,
}

/// A document type stored in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (table) name in the document store.
    const COLLECTION: &'static str;
    /// Human readable name used in messages and logs.
    const LABEL: &'static str;
    /// Path segment under `/api`.
    const PATH: &'static str = Self::COLLECTION;
    const ACCESS: Access = Access::PublicRead;
    const LIST_ORDER: ListOrder = ListOrder::Ascending;
    /// Top-level document fields that must be unique within the collection.
    const UNIQUE: &'static [&'static str] = &[];

    /// Check required fields and formats.
    fn validate(&self) -> Result<(), AppError>;

    /// Value of the optional `order` field.
    fn sort_key(&self) -> Option<i64> {
        None
    }

    /// Reset fields a caller may not choose when creating a record.
    fn prepare_new(&mut self) {}

    /// Record created on the first public list of an empty collection.
    fn default_record() -> Option<Self> {
        None
    }

    /// Notification relayed to admins when a record is created.
    fn notification(&self) -> Option<Notification> {
        None
    }
}

/// Reject a blank required field.
pub fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Reject a value that is not shaped like `local@domain`.
pub fn require_email(field: &str, value: &str) -> Result<(), AppError> {
    require(field, value)?;
    let valid = value
        .trim()
        .split_once('@')
        .map(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        })
        .unwrap_or(false);
    if !valid {
        return Err(AppError::Validation(format!("{} must be a valid email address", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("name", "Go").is_ok());
        assert!(require("name", "").is_err());
        assert!(require("name", "   ").is_err());
    }

    #[test]
    fn test_require_email() {
        assert!(require_email("email", "ursula@example.com").is_ok());
        assert!(require_email("email", "ursula.com").is_err());
        assert!(require_email("email", "@example.com").is_err());
        assert!(require_email("email", "ursula@localhost").is_err());
        assert!(require_email("email", "").is_err());
    }
}
