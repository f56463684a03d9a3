//! chat-relay setup wizard.
//!
//! Asks for the bot token, both chats and the forwarding defaults in the
//! terminal, then writes `config.toml` into the project root
//! (`CHAT_RELAY_ROOT`, or the current directory).

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chat_relay::config::{ChatRef, Config};
use chat_relay::prompt::{ask, ask_bool, ask_float, ask_int, ask_text};

// ── Config formatting ──────────────────────────────────────────────────────────

struct ConfigParams<'a> {
    bot_token: &'a str,
    source_chat: &'a ChatRef,
    destination_chat: &'a ChatRef,
    start_id: i32,
    max_id: i32,
    delay_secs: f64,
    fast_mode: bool,
}

fn toml_chat(chat: &ChatRef) -> String {
    match chat {
        ChatRef::Id(id) => id.to_string(),
        ChatRef::Username(name) => format!("\"{}\"", name),
    }
}

/// Renders the config.toml text the relay loads.
fn format_config(p: &ConfigParams<'_>) -> String {
    let bot_token = p.bot_token.replace('\\', "\\\\").replace('"', "\\\"");
    let source_chat = toml_chat(p.source_chat);
    let destination_chat = toml_chat(p.destination_chat);
    let start_id = p.start_id;
    let max_id = p.max_id;
    let delay_secs = format!("{:?}", p.delay_secs);
    let fast_mode = p.fast_mode;

    format!(
        r#"[telegram]
bot_token = "{bot_token}"
# numeric chat id or "@channelusername"
source_chat = {source_chat}
destination_chat = {destination_chat}

[forward]
start_id = {start_id}
max_id = {max_id}
delay_secs = {delay_secs}
fast_mode = {fast_mode}
# fast_step = 15
# failure_limit = 2000
# long_pause_every = 300
# long_pause_secs = 60
"#
    )
}

// ── CLI ────────────────────────────────────────────────────────────────────────

fn ask_chat<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<ChatRef> {
    ask(
        input,
        output,
        prompt,
        None,
        "Please enter a numeric chat id or @username.",
        |s| s.parse().ok(),
    )
}

fn run_cli<R: BufRead, W: Write>(input: &mut R, output: &mut W, config_path: &Path) -> Result<()> {
    writeln!(output, "=== chat-relay setup ===\n")?;

    let bot_token = ask_text(input, output, "Telegram bot token", "")?;
    if bot_token.is_empty() {
        bail!("a bot token is required");
    }
    let source_chat = ask_chat(input, output, "Source chat (forward FROM)")?;
    let destination_chat = ask_chat(input, output, "Destination chat (forward TO)")?;
    let start_id = ask_int(input, output, "Default start message ID", Some(1))?;
    let max_id = ask_int(input, output, "Default max message ID", Some(15_000_000))?;
    let delay_secs = ask_float(input, output, "Default delay between messages (seconds)", Some(0.4))?;
    let fast_mode = ask_bool(input, output, "Fast mode by default?", false)?;

    let config = format_config(&ConfigParams {
        bot_token: &bot_token,
        source_chat: &source_chat,
        destination_chat: &destination_chat,
        start_id,
        max_id,
        delay_secs,
        fast_mode,
    });

    // Never write a file the relay itself would refuse to load.
    Config::parse(&config).context("Generated config did not parse")?;

    std::fs::write(config_path, &config)
        .with_context(|| format!("Could not write {}", config_path.display()))?;

    writeln!(output, "\n✓  config.toml saved to {}", config_path.display())?;
    writeln!(output, "   Run the relay with:  cargo run --bin chat-relay")?;
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // Resolve project root: prefer CHAT_RELAY_ROOT env, fall back to cwd.
    let project_root =
        PathBuf::from(std::env::var("CHAT_RELAY_ROOT").unwrap_or_else(|_| ".".to_string()));
    let config_path = project_root.join("config.toml");

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_cli(&mut stdin.lock(), &mut stdout.lock(), &config_path)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(bot_token: &str, source: ChatRef, destination: ChatRef, fast_mode: bool) -> String {
        format_config(&ConfigParams {
            bot_token,
            source_chat: &source,
            destination_chat: &destination,
            start_id: 1,
            max_id: 15_000_000,
            delay_secs: 0.4,
            fast_mode,
        })
    }

    #[test]
    fn test_telegram_section_present() {
        let out = cfg("123:abc", ChatRef::Id(-100), ChatRef::Id(-200), false);
        assert!(out.contains("[telegram]"));
        assert!(out.contains(r#"bot_token = "123:abc""#));
        assert!(out.contains("source_chat = -100"));
        assert!(out.contains("destination_chat = -200"));
    }

    #[test]
    fn test_username_chats_are_quoted() {
        let out = cfg("t", ChatRef::Username("@src".into()), ChatRef::Id(5), false);
        assert!(out.contains(r#"source_chat = "@src""#));
    }

    #[test]
    fn test_forward_section_present() {
        let out = cfg("t", ChatRef::Id(1), ChatRef::Id(2), true);
        assert!(out.contains("[forward]"));
        assert!(out.contains("max_id = 15000000"));
        assert!(out.contains("delay_secs = 0.4"));
        assert!(out.contains("fast_mode = true"));
    }

    #[test]
    fn test_whole_number_delay_stays_a_float() {
        let out = format_config(&ConfigParams {
            bot_token: "t",
            source_chat: &ChatRef::Id(1),
            destination_chat: &ChatRef::Id(2),
            start_id: 1,
            max_id: 10,
            delay_secs: 1.0,
            fast_mode: false,
        });
        assert!(out.contains("delay_secs = 1.0"));
        assert_eq!(Config::parse(&out).unwrap().forward.delay_secs, 1.0);
    }

    #[test]
    fn test_generated_config_round_trips_through_loader() {
        let out = cfg("12\"3", ChatRef::Username("@src".into()), ChatRef::Id(-9), true);
        let config = Config::parse(&out).unwrap();
        assert_eq!(config.telegram.bot_token, "12\"3");
        assert_eq!(config.telegram.source_chat, ChatRef::Username("@src".into()));
        assert!(config.forward.fast_mode);
        assert_eq!(config.forward.failure_limit, 2000);
    }

    #[test]
    fn test_cli_writes_config_file() {
        let dir = std::env::temp_dir().join(format!("chat-relay-setup-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let mut input = io::Cursor::new(b"123:abc\nnope\n-1001\n@logs\n\n\n\ny\n".to_vec());
        let mut output = Vec::new();
        run_cli(&mut input, &mut output, &path).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.telegram.source_chat, ChatRef::Id(-1001));
        assert_eq!(config.telegram.destination_chat, ChatRef::Username("@logs".into()));
        assert!(config.forward.fast_mode);
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Please enter a numeric chat id or @username."));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cli_requires_token() {
        let mut input = io::Cursor::new(b"\n".to_vec());
        let mut output = Vec::new();
        let path = std::env::temp_dir().join("chat-relay-unused.toml");
        assert!(run_cli(&mut input, &mut output, &path).is_err());
        assert!(!path.exists());
    }
}
