//! Plain serializable shapes for the objects the bot API hands back.
//!
//! Each shape is a snapshot taken for display: fetched once, dumped as JSON,
//! summarised, then dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserIdentity {
    pub id: u64,
    pub is_bot: bool,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    pub is_premium: bool,
}

impl UserIdentity {
    /// First and last name joined, falling back to the username, then to a placeholder.
    pub fn display_name(&self) -> String {
        let full = [Some(self.first_name.as_str()), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !full.is_empty() {
            return full;
        }
        match self.username.as_deref() {
            Some(username) if !username.is_empty() => username.to_string(),
            _ => "(no name)".to_string(),
        }
    }

    /// `@username`, or a placeholder when the user has none.
    pub fn handle(&self) -> String {
        match self.username.as_deref() {
            Some(username) if !username.is_empty() => format!("@{}", username),
            _ => "(no username)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BotIdentity {
    #[serde(flatten)]
    pub user: UserIdentity,
    pub can_join_groups: bool,
    pub can_read_all_group_messages: bool,
    pub supports_inline_queries: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatDescriptor {
    pub id: i64,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub chat_type: Option<String>,
    pub username: Option<String>,
    pub description: Option<String>,
    pub invite_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdminEntry {
    pub user: UserIdentity,
    /// Bot API member status: creator, administrator, member, restricted, left or kicked
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InviteLink {
    pub invite_link: String,
    pub creator: UserIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub creates_join_request: bool,
    pub is_primary: bool,
    pub is_revoked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_join_request_count: Option<u32>,
}

#[cfg(test)]
pub(crate) fn user(id: u64, first: &str, last: Option<&str>, username: Option<&str>) -> UserIdentity {
    UserIdentity {
        id,
        is_bot: false,
        first_name: first.to_string(),
        last_name: last.map(String::from),
        username: username.map(String::from),
        language_code: None,
        is_premium: false,
    }
}
