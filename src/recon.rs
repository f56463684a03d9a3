use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use tracing::warn;

use crate::config::ChatRef;
use crate::models::{AdminEntry, BotIdentity, ChatDescriptor};
use crate::platform::ChatApi;

/// Whatever the recon step managed to fetch. Each part is independent.
#[derive(Debug, Default)]
pub struct Recon {
    pub bot: Option<BotIdentity>,
    pub chat: Option<ChatDescriptor>,
    pub admins: Option<Vec<AdminEntry>>,
}

/// Pretty JSON with a four-space indent.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

fn dump<T: Serialize, W: Write>(out: &mut W, header: &str, value: &T) -> Result<()> {
    writeln!(out, "\n=== {} ===", header)?;
    writeln!(out, "{}", to_pretty_json(value)?)?;
    Ok(())
}

/// Fetch bot identity, chat and administrators, dumping each one that succeeds.
///
/// A failed fetch is reported and leaves its part empty; it never stops the others.
pub async fn fetch<A, W>(api: &A, source: &ChatRef, out: &mut W) -> Result<Recon>
where
    A: ChatApi + ?Sized,
    W: Write,
{
    let mut recon = Recon::default();

    match api.get_me().await {
        Ok(bot) => {
            dump(out, "get_me", &bot)?;
            recon.bot = Some(bot);
        }
        Err(e) => {
            warn!("get_me failed: {:#}", e);
            writeln!(out, "[!] get_me failed: {:#}", e)?;
        }
    }

    match api.get_chat(source).await {
        Ok(chat) => {
            dump(out, "get_chat (source)", &chat)?;
            recon.chat = Some(chat);
        }
        Err(e) => {
            warn!("get_chat failed for {}: {:#}", source, e);
            writeln!(out, "[!] get_chat failed for {}: {:#}", source, e)?;
        }
    }

    match api.get_chat_administrators(source).await {
        Ok(admins) => {
            dump(out, "get_chat_administrators (source)", &admins)?;
            recon.admins = Some(admins);
        }
        Err(e) => {
            warn!("get_chat_administrators failed for {}: {:#}", source, e);
            writeln!(out, "[!] Cannot get chat administrators: {:#}", e)?;
        }
    }

    Ok(recon)
}

fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}

/// Human-readable digest of the fetched recon data.
pub fn write_summary<W: Write>(recon: &Recon, out: &mut W) -> Result<()> {
    writeln!(out, "\n=== Parsed summary ===")?;

    match &recon.bot {
        Some(bot) => {
            writeln!(out, "Bot:")?;
            writeln!(out, "  - Name:      {}", bot.user.display_name())?;
            writeln!(out, "  - Username:  {}", bot.user.handle())?;
            writeln!(out, "  - ID:        {}", bot.user.id)?;
            writeln!(out, "  - Is bot:    {}", bot.user.is_bot)?;
        }
        None => writeln!(out, "Bot: (no data)")?,
    }

    match &recon.chat {
        Some(chat) => {
            writeln!(out, "\nSource chat:")?;
            writeln!(
                out,
                "  - Title:       {}",
                or_placeholder(chat.title.as_deref(), "(no title)")
            )?;
            writeln!(out, "  - ID:          {}", chat.id)?;
            writeln!(
                out,
                "  - Type:        {}",
                or_placeholder(chat.chat_type.as_deref(), "(no type)")
            )?;
            writeln!(
                out,
                "  - Invite link: {}",
                or_placeholder(chat.invite_link.as_deref(), "(no invite link)")
            )?;
        }
        None => writeln!(out, "\nSource chat: (no data)")?,
    }

    match recon.admins.as_deref() {
        Some(admins) if !admins.is_empty() => {
            writeln!(out, "\nAdmins:")?;
            for admin in admins {
                writeln!(out, "  - {} ({})", admin.user.display_name(), admin.user.handle())?;
                writeln!(out, "      ID:      {}", admin.user.id)?;
                writeln!(
                    out,
                    "      Status:  {}",
                    or_placeholder(admin.status.as_deref(), "(no status)")
                )?;
                writeln!(out, "      Is bot:  {}", admin.user.is_bot)?;
            }
        }
        _ => writeln!(out, "\nAdmins: (no data)")?,
    }

    Ok(())
}
