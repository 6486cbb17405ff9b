//! Work experience model for the career timeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{require, Entity};
use crate::errors::AppError;

/// A position held at a company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub company: String,
    pub position: String,
    /// Calendar date (`YYYY-MM-DD`)
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Still employed here; `end_date` is ignored by the frontend when set
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Entity for WorkExperience {
    const COLLECTION: &'static str = "work_experiences";
    const LABEL: &'static str = "Work experience";
    const PATH: &'static str = "experiences";

    fn validate(&self) -> Result<(), AppError> {
        require("company", &self.company)?;
        require("position", &self.position)?;
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(AppError::Validation(
                    "endDate must not be before startDate".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn sort_key(&self) -> Option<i64> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experience(start: &str, end: Option<&str>) -> WorkExperience {
        WorkExperience {
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            start_date: start.parse().unwrap(),
            end_date: end.map(|e| e.parse().unwrap()),
            current: end.is_none(),
            description: None,
            technologies: vec![],
            order: None,
        }
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        assert!(experience("2020-01-01", Some("2019-12-31")).validate().is_err());
        assert!(experience("2020-01-01", Some("2021-06-30")).validate().is_ok());
        assert!(experience("2020-01-01", None).validate().is_ok());
    }

    #[test]
    fn test_malformed_date_fails_to_parse() {
        let parsed: Result<WorkExperience, _> = serde_json::from_str(
            r#"{"company":"Acme","position":"Engineer","startDate":"last spring"}"#,
        );
        assert!(parsed.is_err());
    }
}
