//! Push and notification-click signals.
//!
//! The engine answers these with directives; actually showing a
//! notification or opening a window is the host's side of the contract.

use serde::{Deserialize, Serialize};

use crate::policy::NOTIFICATION_ICON;

use super::CacheAgent;

/// Payload of a push message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    #[serde(default, alias = "primaryKey")]
    pub primary_key: Option<String>,
}

/// Instruction the host carries out on the agent's behalf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostDirective {
    ShowNotification {
        title: String,
        body: String,
        icon: String,
        badge: String,
        primary_key: Option<String>,
    },
    OpenWindow {
        url: String,
    },
}

impl CacheAgent {
    /// Turn a push message into a show-notification directive.
    pub fn handle_push(&self, payload: PushPayload) -> HostDirective {
        HostDirective::ShowNotification {
            title: payload.title,
            body: payload.body,
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_ICON.to_string(),
            primary_key: payload.primary_key,
        }
    }

    /// A clicked notification always opens the landing page.
    pub fn handle_notification_click(&self) -> HostDirective {
        HostDirective::OpenWindow { url: "/".to_string() }
    }
}
