//! Portfolio project model.

use serde::{Deserialize, Serialize};

use super::{require, Entity};
use crate::errors::AppError;

/// A project card on the projects page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Entity for Project {
    const COLLECTION: &'static str = "projects";
    const LABEL: &'static str = "Project";

    fn validate(&self) -> Result<(), AppError> {
        require("title", &self.title)?;
        require("description", &self.description)?;
        if self.technologies.iter().any(|t| t.trim().is_empty()) {
            return Err(AppError::Validation(
                "technologies must not contain blank entries".to_string(),
            ));
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

    #[test]
    fn test_project_defaults_from_minimal_json() {
        let project: Project =
            serde_json::from_str(r#"{"title":"Site","description":"This site"}"#).unwrap();
        assert!(project.technologies.is_empty());
        assert!(!project.featured);
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_project_rejects_blank_technology() {
        let project: Project = serde_json::from_str(
            r#"{"title":"Site","description":"This site","technologies":["Rust"," "]}"#,
        )
        .unwrap();
        assert!(project.validate().is_err());
    }
}
