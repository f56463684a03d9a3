use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// A chat addressed either by numeric id or by public `@username`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(try_from = "RawChatRef")]
pub enum ChatRef {
    Id(i64),
    Username(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChatRef {
    Int(i64),
    Str(String),
}

impl TryFrom<RawChatRef> for ChatRef {
    type Error = String;

    fn try_from(raw: RawChatRef) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawChatRef::Int(id) => Ok(ChatRef::Id(id)),
            RawChatRef::Str(s) => s.parse(),
        }
    }
}

impl std::str::FromStr for ChatRef {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i64>() {
            return Ok(ChatRef::Id(id));
        }
        match s.strip_prefix('@') {
            Some(name) if !name.is_empty() => Ok(ChatRef::Username(s.to_string())),
            _ => Err(format!(
                "invalid chat reference '{}': expected a numeric id or @username",
                s
            )),
        }
    }
}

impl std::fmt::Display for ChatRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRef::Id(id) => write!(f, "{}", id),
            ChatRef::Username(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default = "default_forward_config")]
    pub forward: ForwardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Chat to forward from
    pub source_chat: ChatRef,
    /// Chat to forward into
    pub destination_chat: ChatRef,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForwardConfig {
    #[serde(default = "default_start_id")]
    pub start_id: i32,
    #[serde(default = "default_max_id")]
    pub max_id: i32,
    /// Seconds to wait after every forward attempt
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,
    #[serde(default)]
    pub fast_mode: bool,
    #[serde(default = "default_fast_step")]
    pub fast_step: usize,
    /// Consecutive failures before giving up; 0 disables the cutoff
    #[serde(default = "default_failure_limit")]
    pub failure_limit: u32,
    #[serde(default = "default_long_pause_every")]
    pub long_pause_every: i32,
    #[serde(default = "default_long_pause_secs")]
    pub long_pause_secs: u64,
}

impl ForwardConfig {
    pub fn long_pause(&self) -> Duration {
        Duration::from_secs(self.long_pause_secs)
    }
}

fn default_start_id() -> i32 {
    1
}

fn default_max_id() -> i32 {
    15_000_000
}

fn default_delay_secs() -> f64 {
    0.4
}

fn default_fast_step() -> usize {
    15
}

fn default_failure_limit() -> u32 {
    2000
}

fn default_long_pause_every() -> i32 {
    300
}

fn default_long_pause_secs() -> u64 {
    60
}

fn default_forward_config() -> ForwardConfig {
    ForwardConfig {
        start_id: default_start_id(),
        max_id: default_max_id(),
        delay_secs: default_delay_secs(),
        fast_mode: false,
        fast_step: default_fast_step(),
        failure_limit: default_failure_limit(),
        long_pause_every: default_long_pause_every(),
        long_pause_secs: default_long_pause_secs(),
    }
}

impl Config {
    /// True when a non-blank bot token is configured.
    pub fn has_token(&self) -> bool {
        !self.telegram.bot_token.trim().is_empty()
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}
