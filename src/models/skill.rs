//! Skill shown in the skills grid.

use serde::{Deserialize, Serialize};

use super::{require, Entity};
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Entity for Skill {
    const COLLECTION: &'static str = "skills";
    const LABEL: &'static str = "Skill";

    fn validate(&self) -> Result<(), AppError> {
        require("name", &self.name)
    }

    fn sort_key(&self) -> Option<i64> {
        self.order
    }
}
