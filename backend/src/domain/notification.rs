//! User-facing notifications returned alongside dashboard actions.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Error, ErrorCode};

/// Visual tone of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTone {
    /// Informational or success message.
    Default,
    /// Failure message.
    Destructive,
}

/// Title and description pair shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Short headline.
    pub title: String,
    /// Longer explanation.
    pub description: String,
    /// Visual tone.
    pub tone: NotificationTone,
}

impl Notification {
    /// Build a default-toned notification.
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone: NotificationTone::Default,
        }
    }

    /// Build a destructive notification.
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone: NotificationTone::Destructive,
        }
    }

    /// Convert into a domain error carrying the title in `details.title`.
    ///
    /// A blank description falls back to the title so the error message is
    /// never empty.
    #[must_use]
    pub fn into_error(self, code: ErrorCode) -> Error {
        let message = if self.description.trim().is_empty() {
            self.title.clone()
        } else {
            self.description
        };
        Error::new(code, message).with_details(json!({ "title": self.title }))
    }
}
