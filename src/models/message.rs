//! Visitor message model, submitted through the public contact form.

use serde::{Deserialize, Serialize};

use super::{require, require_email, Access, Entity, ListOrder};
use crate::errors::AppError;
use crate::push::Notification;

/// Longest message body accepted from the contact form.
pub const MAX_MESSAGE_LEN: usize = 5000;

const PREVIEW_LEN: usize = 120;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    /// Set by an admin once the message has been read
    #[serde(default)]
    pub read: bool,
}

impl Entity for Message {
    const COLLECTION: &'static str = "messages";
    const LABEL: &'static str = "Message";
    const ACCESS: Access = Access::Inbox;
    const LIST_ORDER: ListOrder = ListOrder::NewestFirst;

    fn validate(&self) -> Result<(), AppError> {
        require("name", &self.name)?;
        require_email("email", &self.email)?;
        require("message", &self.message)?;
        if self.message.chars().count() > MAX_MESSAGE_LEN {
            return Err(AppError::Validation(format!(
                "message must be at most {} characters",
                MAX_MESSAGE_LEN
            )));
        }
        Ok(())
    }

    fn prepare_new(&mut self) {
        self.read = false;
    }

    fn notification(&self) -> Option<Notification> {
        let body = match self.subject.as_deref().map(str::trim) {
            Some(subject) if !subject.is_empty() => subject.to_string(),
            _ => preview(&self.message),
        };
        Some(Notification {
            title: format!("New message from {}", self.name.trim()),
            body,
            url: Some("/admin/messages".to_string()),
        })
    }
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= PREVIEW_LEN {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(PREVIEW_LEN).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(subject: Option<&str>, body: &str) -> Message {
        Message {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: subject.map(str::to_string),
            message: body.to_string(),
            read: false,
        }
    }

    #[test]
    fn test_notification_prefers_subject() {
        let n = message(Some("Job offer"), "Hello there").notification().unwrap();
        assert_eq!(n.title, "New message from Ada");
        assert_eq!(n.body, "Job offer");
    }

    #[test]
    fn test_notification_previews_long_body() {
        let long = "x".repeat(500);
        let n = message(Some("  "), &long).notification().unwrap();
        assert_eq!(n.body.chars().count(), PREVIEW_LEN + 1);
        assert!(n.body.ends_with('…'));
    }

    #[test]
    fn test_new_messages_start_unread() {
        let mut m = message(None, "Hello");
        m.read = true;
        m.prepare_new();
        assert!(!m.read);
    }

    #[test]
    fn test_rejects_oversized_message() {
        let m = message(None, &"y".repeat(MAX_MESSAGE_LEN + 1));
        assert!(m.validate().is_err());
        assert!(message(None, "short").validate().is_ok());
    }
}
