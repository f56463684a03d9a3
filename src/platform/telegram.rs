use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ChatFullInfo, ChatFullInfoKind, ChatFullInfoPublicKind, ChatId, ChatInviteLink, ChatMember,
    ChatMemberKind, ChatMemberStatus, Me, MessageId, Recipient, User,
};
use tracing::debug;

use super::ChatApi;
use crate::config::ChatRef;
use crate::models::{AdminEntry, BotIdentity, ChatDescriptor, InviteLink, UserIdentity};

/// `ChatApi` backed by the Telegram Bot API through teloxide.
pub struct TelegramApi {
    bot: Bot,
}

impl TelegramApi {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }
}

fn recipient(chat: &ChatRef) -> Recipient {
    match chat {
        ChatRef::Id(id) => Recipient::Id(ChatId(*id)),
        ChatRef::Username(name) => Recipient::ChannelUsername(name.clone()),
    }
}

fn user_identity(user: &User) -> UserIdentity {
    UserIdentity {
        id: user.id.0,
        is_bot: user.is_bot,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        language_code: user.language_code.clone(),
        is_premium: user.is_premium,
    }
}

fn bot_identity(me: &Me) -> BotIdentity {
    BotIdentity {
        user: user_identity(&me.user),
        can_join_groups: me.can_join_groups,
        can_read_all_group_messages: me.can_read_all_group_messages,
        supports_inline_queries: me.supports_inline_queries,
    }
}

fn chat_descriptor(chat: &ChatFullInfo) -> ChatDescriptor {
    let chat_type = match &chat.kind {
        ChatFullInfoKind::Public(public) => match &public.kind {
            ChatFullInfoPublicKind::Group(_) => "group",
            ChatFullInfoPublicKind::Supergroup(_) => "supergroup",
            ChatFullInfoPublicKind::Channel(_) => "channel",
        },
        ChatFullInfoKind::Private(_) => "private",
    };

    ChatDescriptor {
        id: chat.id.0,
        title: chat.title().map(String::from),
        chat_type: Some(chat_type.to_string()),
        username: chat.username().map(String::from),
        description: chat.description().map(String::from),
        invite_link: chat.invite_link().map(String::from),
    }
}

fn member_status(status: ChatMemberStatus) -> &'static str {
    match status {
        ChatMemberStatus::Owner => "creator",
        ChatMemberStatus::Administrator => "administrator",
        ChatMemberStatus::Member => "member",
        ChatMemberStatus::Restricted => "restricted",
        ChatMemberStatus::Left => "left",
        ChatMemberStatus::Banned => "kicked",
    }
}

fn admin_entry(member: &ChatMember) -> AdminEntry {
    let custom_title = match &member.kind {
        ChatMemberKind::Owner(owner) => owner.custom_title.clone(),
        ChatMemberKind::Administrator(admin) => admin.custom_title.clone(),
        _ => None,
    };

    AdminEntry {
        user: user_identity(&member.user),
        status: Some(member_status(member.kind.status()).to_string()),
        custom_title,
    }
}

fn invite_link(link: &ChatInviteLink) -> InviteLink {
    InviteLink {
        invite_link: link.invite_link.clone(),
        creator: user_identity(&link.creator),
        name: link.name.clone(),
        creates_join_request: link.creates_join_request,
        is_primary: link.is_primary,
        is_revoked: link.is_revoked,
        expire_date: link.expire_date,
        member_limit: link.member_limit,
        pending_join_request_count: link.pending_join_request_count,
    }
}

#[async_trait]
impl ChatApi for TelegramApi {
    async fn get_me(&self) -> Result<BotIdentity> {
        let me = self.bot.get_me().await.context("getMe request failed")?;
        debug!("getMe returned bot {}", me.user.id);
        Ok(bot_identity(&me))
    }

    async fn get_chat(&self, chat: &ChatRef) -> Result<ChatDescriptor> {
        let info = self
            .bot
            .get_chat(recipient(chat))
            .await
            .with_context(|| format!("getChat request failed for {}", chat))?;
        Ok(chat_descriptor(&info))
    }

    async fn get_chat_administrators(&self, chat: &ChatRef) -> Result<Vec<AdminEntry>> {
        let members = self
            .bot
            .get_chat_administrators(recipient(chat))
            .await
            .with_context(|| format!("getChatAdministrators request failed for {}", chat))?;
        debug!("{} administrators in {}", members.len(), chat);
        Ok(members.iter().map(admin_entry).collect())
    }

    async fn forward_message(
        &self,
        source: &ChatRef,
        destination: &ChatRef,
        message_id: i32,
    ) -> Result<()> {
        let sent = self
            .bot
            .forward_message(recipient(destination), recipient(source), MessageId(message_id))
            .await?;
        debug!(
            "Message {} forwarded as {} in {}",
            message_id, sent.id.0, sent.chat.id
        );
        Ok(())
    }

    async fn create_invite_link(&self, chat: &ChatRef) -> Result<InviteLink> {
        let link = self
            .bot
            .create_chat_invite_link(recipient(chat))
            .await
            .with_context(|| format!("createChatInviteLink request failed for {}", chat))?;
        Ok(invite_link(&link))
    }
}
