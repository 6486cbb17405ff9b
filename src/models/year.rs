//! Timeline year entry.

use serde::{Deserialize, Serialize};

use super::{require, Entity};
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Year {
    pub year: i32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Entity for Year {
    const COLLECTION: &'static str = "years";
    const LABEL: &'static str = "Year";

    fn validate(&self) -> Result<(), AppError> {
        require("title", &self.title)?;
        if !(1900..=2200).contains(&self.year) {
            return Err(AppError::Validation(format!(
                "year {} is out of range",
                self.year
            )));
        }
        Ok(())
    }

    fn sort_key(&self) -> Option<i64> {
        self.order
    }
}
