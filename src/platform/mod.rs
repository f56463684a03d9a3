pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::ChatRef;
use crate::models::{AdminEntry, BotIdentity, ChatDescriptor, InviteLink};

/// The bot API operations the relay needs.
///
/// Every call is independent; a failure carries only a message and the caller
/// decides whether it matters.
#[async_trait]
pub trait ChatApi {
    async fn get_me(&self) -> Result<BotIdentity>;

    async fn get_chat(&self, chat: &ChatRef) -> Result<ChatDescriptor>;

    async fn get_chat_administrators(&self, chat: &ChatRef) -> Result<Vec<AdminEntry>>;

    /// Forward message `message_id` from `source` into `destination`.
    async fn forward_message(
        &self,
        source: &ChatRef,
        destination: &ChatRef,
        message_id: i32,
    ) -> Result<()>;

    async fn create_invite_link(&self, chat: &ChatRef) -> Result<InviteLink>;
}
