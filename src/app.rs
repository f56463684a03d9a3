use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::{info, warn};

use crate::config::Config;
use crate::forward::{forward_range, ForwardPlan, ForwardPolicy, Pacer};
use crate::platform::ChatApi;
use crate::prompt::{ask_bool, ask_float, ask_int};
use crate::recon;

/// Console streams for one interactive session.
pub struct Console<R, W> {
    pub input: R,
    pub output: W,
}

/// Print the banner. Returns false when no bot token is configured.
pub fn banner<W: Write>(config: &Config, out: &mut W) -> Result<bool> {
    writeln!(out, "=== Telegram Chat Relay ===")?;
    writeln!(
        out,
        "Bot token set: {}",
        if config.has_token() { "YES" } else { "NO" }
    )?;
    writeln!(out, "Source chat:      {}", config.telegram.source_chat)?;
    writeln!(out, "Destination chat: {}", config.telegram.destination_chat)?;
    writeln!(out)?;

    if !config.has_token() {
        writeln!(
            out,
            "[-] bot_token is empty. Set it in the [telegram] section of the config and rerun."
        )?;
        return Ok(false);
    }
    Ok(true)
}

/// Recon, forwarding and invite link, each behind a yes/no question.
///
/// Only console I/O errors end the session early; API failures are reported
/// and the session moves on.
pub async fn run<A, P, R, W>(
    config: &Config,
    api: &A,
    pacer: &P,
    console: &mut Console<R, W>,
) -> Result<()>
where
    A: ChatApi + ?Sized,
    P: Pacer + ?Sized,
    R: BufRead,
    W: Write,
{
    let Console { input, output } = console;
    let source = &config.telegram.source_chat;
    let defaults = &config.forward;

    if ask_bool(
        input,
        output,
        "Show get_me / get_chat / get_chat_administrators info?",
        true,
    )? {
        let fetched = recon::fetch(api, source, output).await?;
        recon::write_summary(&fetched, output)?;
        writeln!(output)?;
    }

    if ask_bool(
        input,
        output,
        "Forward messages from source chat to destination chat?",
        true,
    )? {
        let start_id = ask_int(input, output, "Start from message ID", Some(defaults.start_id))?;
        let max_id = ask_int(input, output, "Max message ID to try", Some(defaults.max_id))?;
        let fast_mode = ask_bool(
            input,
            output,
            &format!("Enable fast mode (skip with step={})?", defaults.fast_step),
            defaults.fast_mode,
        )?;
        let delay_secs = ask_float(
            input,
            output,
            "Delay between messages (in seconds)",
            Some(defaults.delay_secs),
        )?;

        let step = if fast_mode { defaults.fast_step } else { 1 };
        match ForwardPlan::new(
            source.clone(),
            config.telegram.destination_chat.clone(),
            start_id,
            max_id,
            step,
            delay_secs,
        ) {
            Ok(plan) => {
                writeln!(
                    output,
                    "[*] Fast mode: {} (step={})",
                    if fast_mode { "ON" } else { "OFF" },
                    plan.step
                )?;
                writeln!(output, "[*] Forwarding {} -> {}", plan.source, plan.destination)?;
                writeln!(
                    output,
                    "[*] Range: {} .. {} (step={})",
                    plan.start_id, plan.max_id, plan.step
                )?;
                writeln!(output, "[*] Delay between messages: {} seconds\n", delay_secs)?;

                let policy = ForwardPolicy::from_config(defaults);
                let stats = forward_range(api, pacer, &plan, &policy, output).await?;

                writeln!(
                    output,
                    "\n[*] Finished: {} attempted, {} forwarded, {} failed.",
                    stats.attempted, stats.forwarded, stats.failed
                )?;
                if let Some(next) = stats.resume_from(&plan) {
                    writeln!(output, "[*] To continue later, start from message ID {}.", next)?;
                }
            }
            Err(e) => {
                warn!("Forwarding skipped: {:#}", e);
                writeln!(output, "[-] Cannot forward: {:#}", e)?;
            }
        }
    }

    if ask_bool(
        input,
        output,
        "Create and print an invite link for the SOURCE chat (if allowed)?",
        false,
    )? {
        match api.create_invite_link(source).await {
            Ok(link) => {
                info!("Created invite link for {}", source);
                writeln!(output, "\n=== Invite link from API ===")?;
                writeln!(output, "{}", recon::to_pretty_json(&link)?)?;
            }
            Err(e) => {
                warn!("create_invite_link failed for {}: {:#}", source, e);
                writeln!(output, "[!] Failed to create invite link: {:#}", e)?;
            }
        }
    }

    writeln!(output, "\nDone.")?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChatRef;
    use crate::models::{user, AdminEntry, BotIdentity, ChatDescriptor, InviteLink};
    use anyhow::{anyhow, bail, Context};
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::time::Duration;

    const CONFIG: &str = r#"
[telegram]
bot_token = "123:abc"
source_chat = -100111
destination_chat = -100222

[forward]
start_id = 1
max_id = 3
delay_secs = 0.0
"#;

    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl ChatApi for FakeApi {
        async fn get_me(&self) -> Result<BotIdentity> {
            self.record("get_me".into());
            Ok(BotIdentity {
                user: user(9, "Relay", None, Some("relay_bot")),
                can_join_groups: true,
                can_read_all_group_messages: false,
                supports_inline_queries: false,
            })
        }

        async fn get_chat(&self, chat: &ChatRef) -> Result<ChatDescriptor> {
            self.record(format!("get_chat {}", chat));
            bail!("Bad Request: chat not found")
        }

        async fn get_chat_administrators(&self, chat: &ChatRef) -> Result<Vec<AdminEntry>> {
            self.record(format!("get_chat_administrators {}", chat));
            Ok(Vec::new())
        }

        async fn forward_message(
            &self,
            source: &ChatRef,
            destination: &ChatRef,
            message_id: i32,
        ) -> Result<()> {
            self.record(format!("forward {} {} {}", source, destination, message_id));
            Ok(())
        }

        async fn create_invite_link(&self, chat: &ChatRef) -> Result<InviteLink> {
            self.record(format!("invite {}", chat));
            Err(anyhow!("Bad Request: not enough rights"))
                .with_context(|| format!("createChatInviteLink request failed for {}", chat))
        }
    }

    struct NoPause;

    #[async_trait]
    impl Pacer for NoPause {
        async fn pause(&self, _duration: Duration) {}
    }

    async fn session(config: &Config, script: &str) -> (FakeApi, String) {
        let api = FakeApi::default();
        let mut console = Console {
            input: Cursor::new(script.as_bytes().to_vec()),
            output: Vec::new(),
        };
        run(config, &api, &NoPause, &mut console).await.unwrap();
        (api, String::from_utf8(console.output).unwrap())
    }

    #[test]
    fn test_banner_rejects_empty_token() {
        let config = Config::parse(&CONFIG.replace("123:abc", "")).unwrap();
        let mut out = Vec::new();
        assert!(!banner(&config, &mut out).unwrap());
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Bot token set: NO"));
        assert!(printed.contains("[-] bot_token is empty"));
    }

    #[test]
    fn test_banner_with_token() {
        let config = Config::parse(CONFIG).unwrap();
        let mut out = Vec::new();
        assert!(banner(&config, &mut out).unwrap());
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Bot token set: YES"));
        assert!(printed.contains("Source chat:      -100111"));
    }

    #[tokio::test]
    async fn test_declining_everything_makes_no_calls() {
        let config = Config::parse(CONFIG).unwrap();
        let (api, out) = session(&config, "n\nn\nn\n").await;
        assert!(api.calls().is_empty());
        assert!(out.trim_end().ends_with("Done."));
    }

    #[tokio::test]
    async fn test_full_session_with_defaults() {
        let config = Config::parse(CONFIG).unwrap();
        // recon: default yes; forward: default yes, then four defaults; invite: y
        let (api, out) = session(&config, "\n\n\n\n\n\ny\n").await;

        assert_eq!(
            api.calls(),
            vec![
                "get_me",
                "get_chat -100111",
                "get_chat_administrators -100111",
                "forward -100111 -100222 1",
                "forward -100111 -100222 2",
                "forward -100111 -100222 3",
                "invite -100111",
            ]
        );
        assert!(out.contains("[!] get_chat failed for -100111: Bad Request"));
        assert!(out.contains("  - Name:      Relay"));
        assert!(out.contains("Source chat: (no data)"));
        assert!(out.contains("Admins: (no data)"));
        assert!(out.contains("[*] Fast mode: OFF (step=1)"));
        assert!(out.contains("[*] Finished: 3 attempted, 3 forwarded, 0 failed."));
        assert!(!out.contains("To continue later"));
        assert!(out.contains(
            "[!] Failed to create invite link: createChatInviteLink request failed for -100111: \
             Bad Request: not enough rights"
        ));
        assert!(out.trim_end().ends_with("Done."));
    }

    #[tokio::test]
    async fn test_invalid_delay_skips_forwarding() {
        let config = Config::parse(CONFIG).unwrap();
        let (api, out) = session(&config, "n\ny\n\n\nn\n-1\nn\n").await;
        assert!(api.calls().is_empty());
        assert!(out.contains("[-] Cannot forward: invalid delay"));
        assert!(out.trim_end().ends_with("Done."));
    }

    #[tokio::test]
    async fn test_fast_mode_uses_configured_step() {
        let config = Config::parse(&CONFIG.replace("max_id = 3", "max_id = 40")).unwrap();
        let (api, out) = session(&config, "n\ny\n\n\ny\n\nn\n").await;
        assert_eq!(
            api.calls(),
            vec![
                "forward -100111 -100222 1",
                "forward -100111 -100222 16",
                "forward -100111 -100222 31",
            ]
        );
        assert!(out.contains("[*] Fast mode: ON (step=15)"));
    }

    #[tokio::test]
    async fn test_eof_ends_session_with_error() {
        let config = Config::parse(CONFIG).unwrap();
        let api = FakeApi::default();
        let mut console = Console {
            input: Cursor::new(b"n\n".to_vec()),
            output: Vec::new(),
        };
        // Defaults cover empty lines, but a closed stdin is not an empty line.
        assert!(run(&config, &api, &NoPause, &mut console).await.is_err());
    }
}
