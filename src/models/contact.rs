//! Contact details model. The site shows a single Contact record.

use serde::{Deserialize, Serialize};

use super::{require_email, Entity};
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Entity for Contact {
    const COLLECTION: &'static str = "contacts";
    const LABEL: &'static str = "Contact";
    const PATH: &'static str = "contact";

    fn validate(&self) -> Result<(), AppError> {
        require_email("email", &self.email)
    }

    fn default_record() -> Option<Self> {
        Some(Self {
            email: "hello@example.com".to_string(),
            phone: None,
            location: None,
            github: None,
            linkedin: None,
            twitter: None,
            website: None,
        })
    }
}
