//! About section model. The site shows a single About record.

use serde::{Deserialize, Serialize};

use super::{require, Entity};
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct About {
    pub name: String,
    pub title: String,
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Entity for About {
    const COLLECTION: &'static str = "about";
    const LABEL: &'static str = "About";

    fn validate(&self) -> Result<(), AppError> {
        require("name", &self.name)?;
        require("title", &self.title)?;
        require("bio", &self.bio)
    }

    fn default_record() -> Option<Self> {
        Some(Self {
            name: "Your Name".to_string(),
            title: "Software Developer".to_string(),
            bio: "Tell visitors about yourself.".to_string(),
            image: None,
            resume_url: None,
            location: None,
        })
    }
}
