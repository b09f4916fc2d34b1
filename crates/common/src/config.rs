use std::ops::Range;
use std::time::Duration;

use url::Url;

use crate::{Error, Result};

const DEFAULT_HISTORY_TABLE: &str = "market_checks";
const DEFAULT_DISCORD_USERNAME: &str = "Pre-Pump Bot";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// All configuration loaded from environment variables at startup.
///
/// Every collaborator is optional: a missing variable switches the matching
/// feature off instead of failing. Only malformed values are errors.
#[derive(Debug, Clone)]
pub struct Config {
    // Persistence
    pub history: HistoryBackend,

    // Channels
    pub discord: Option<DiscordConfig>,
    pub telegram: Option<TelegramConfig>,

    // Metrics source
    pub sampler: SamplerSource,

    // Thresholds file (TOML); built-in defaults when absent
    pub thresholds_path: Option<String>,

    // Applied to every outbound HTTP client we build
    pub http_timeout: Duration,
}

/// Where observations are persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryBackend {
    /// No store configured; persistence is skipped.
    Disabled,
    /// PostgREST-compatible record store (e.g. Supabase).
    Rest { url: Url, api_key: String, table: String },
    /// Local SQLite database, e.g. `sqlite://prepump.db?mode=rwc`.
    Sqlite { database_url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscordConfig {
    pub webhook_url: Url,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat: ChatTarget,
}

/// A Telegram chat: numeric id or public `@channel` username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTarget {
    Id(i64),
    Username(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SamplerSource {
    /// Random data; unset ranges fall back to the sampler's defaults.
    Simulated {
        activity: Option<Range<u32>>,
        participation: Option<Range<u32>>,
    },
    Feed { url: Url, token: Option<String> },
}

impl Config {
    /// Load configuration from the process environment.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let history = match (
            var("DATABASE_URL"),
            var("SUPABASE_URL"),
            var("SUPABASE_ANON_KEY"),
        ) {
            (Some(database_url), _, _) => HistoryBackend::Sqlite { database_url },
            (None, Some(url), Some(api_key)) => HistoryBackend::Rest {
                url: parse_url("SUPABASE_URL", &url)?,
                api_key,
                table: var("HISTORY_TABLE").unwrap_or_else(|| DEFAULT_HISTORY_TABLE.to_string()),
            },
            _ => HistoryBackend::Disabled,
        };

        let discord = var("DISCORD_WEBHOOK")
            .map(|raw| -> Result<DiscordConfig> {
                Ok(DiscordConfig {
                    webhook_url: parse_url("DISCORD_WEBHOOK", &raw)?,
                    username: var("DISCORD_USERNAME")
                        .unwrap_or_else(|| DEFAULT_DISCORD_USERNAME.to_string()),
                })
            })
            .transpose()?;

        let telegram = match (var("TELEGRAM_BOT_TOKEN"), var("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat: parse_chat(&chat_id)?,
            }),
            _ => None,
        };

        let sampler = match var("SAMPLER_URL") {
            Some(raw) => SamplerSource::Feed {
                url: parse_url("SAMPLER_URL", &raw)?,
                token: var("SAMPLER_TOKEN"),
            },
            None => SamplerSource::Simulated {
                activity: var("SIM_ACTIVITY_RANGE")
                    .map(|raw| parse_range("SIM_ACTIVITY_RANGE", &raw))
                    .transpose()?,
                participation: var("SIM_PARTICIPATION_RANGE")
                    .map(|raw| parse_range("SIM_PARTICIPATION_RANGE", &raw))
                    .transpose()?,
            },
        };

        let http_timeout = match var("HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    Error::Config(format!("HTTP_TIMEOUT_SECS must be a whole number, got '{raw}'"))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Config {
            history,
            discord,
            telegram,
            sampler,
            thresholds_path: var("THRESHOLDS_PATH"),
            http_timeout,
        })
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::Config(format!("{key} is not a valid URL ('{raw}'): {e}")))
}

/// `"60..110"`: start inclusive, end exclusive.
fn parse_range(key: &str, raw: &str) -> Result<Range<u32>> {
    let invalid = || Error::Config(format!("{key} must look like '60..110', got '{raw}'"));
    let (start, end) = raw.split_once("..").ok_or_else(invalid)?;
    let start: u32 = start.trim().parse().map_err(|_| invalid())?;
    let end: u32 = end.trim().parse().map_err(|_| invalid())?;
    if start >= end {
        return Err(Error::Config(format!("{key} must not be empty, got '{raw}'")));
    }
    Ok(start..end)
}

fn parse_chat(raw: &str) -> Result<ChatTarget> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(ChatTarget::Id(id));
    }
    if raw.starts_with('@') && raw.len() > 1 {
        return Ok(ChatTarget::Username(raw.to_string()));
    }
    Err(Error::Config(format!(
        "TELEGRAM_CHAT_ID must be a numeric id or an @channel name, got '{raw}'"
    )))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_disables_everything() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.history, HistoryBackend::Disabled);
        assert!(cfg.discord.is_none());
        assert!(cfg.telegram.is_none());
        assert_eq!(
            cfg.sampler,
            SamplerSource::Simulated { activity: None, participation: None }
        );
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn rest_store_needs_url_and_key() {
        let cfg = load(&[("SUPABASE_URL", "https://db.example.com")]).unwrap();
        assert_eq!(cfg.history, HistoryBackend::Disabled);

        let cfg = load(&[
            ("SUPABASE_URL", "https://db.example.com"),
            ("SUPABASE_ANON_KEY", "anon"),
        ])
        .unwrap();
        match cfg.history {
            HistoryBackend::Rest { api_key, table, .. } => {
                assert_eq!(api_key, "anon");
                assert_eq!(table, "market_checks");
            }
            other => panic!("expected REST backend, got {other:?}"),
        }
    }

    #[test]
    fn sqlite_takes_precedence_over_rest() {
        let cfg = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SUPABASE_URL", "https://db.example.com"),
            ("SUPABASE_ANON_KEY", "anon"),
        ])
        .unwrap();
        assert_eq!(
            cfg.history,
            HistoryBackend::Sqlite { database_url: "sqlite::memory:".into() }
        );
    }

    #[test]
    fn telegram_needs_token_and_chat() {
        let cfg = load(&[("TELEGRAM_BOT_TOKEN", "123:abc")]).unwrap();
        assert!(cfg.telegram.is_none());

        let cfg = load(&[("TELEGRAM_BOT_TOKEN", "123:abc"), ("TELEGRAM_CHAT_ID", "-1001")]).unwrap();
        assert_eq!(cfg.telegram.unwrap().chat, ChatTarget::Id(-1001));

        let cfg = load(&[("TELEGRAM_BOT_TOKEN", "123:abc"), ("TELEGRAM_CHAT_ID", "@alerts")]).unwrap();
        assert_eq!(cfg.telegram.unwrap().chat, ChatTarget::Username("@alerts".into()));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = load(&[("DISCORD_WEBHOOK", "   "), ("SAMPLER_URL", "")]).unwrap();
        assert!(cfg.discord.is_none());
        assert!(matches!(cfg.sampler, SamplerSource::Simulated { .. }));
    }

    #[test]
    fn malformed_values_are_config_errors() {
        assert!(matches!(load(&[("DISCORD_WEBHOOK", "not a url")]), Err(Error::Config(_))));
        assert!(matches!(load(&[("HTTP_TIMEOUT_SECS", "ten")]), Err(Error::Config(_))));
        assert!(matches!(
            load(&[("TELEGRAM_BOT_TOKEN", "t"), ("TELEGRAM_CHAT_ID", "alerts")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn discord_username_defaults() {
        let cfg = load(&[("DISCORD_WEBHOOK", "https://discord.example.com/api/webhooks/1/x")]).unwrap();
        assert!(cfg.telegram.is_none());
        let discord = cfg.discord.as_ref().unwrap();
        assert_eq!(discord.username, "Pre-Pump Bot");
        assert_eq!(discord.webhook_url.host_str(), Some("discord.example.com"));
    }

    #[test]
    fn simulation_ranges_from_env() {
        let cfg = load(&[("SIM_ACTIVITY_RANGE", "0..16"), ("SIM_PARTICIPATION_RANGE", " 20 .. 30 ")]).unwrap();
        assert_eq!(
            cfg.sampler,
            SamplerSource::Simulated {
                activity: Some(0..16),
                participation: Some(20..30),
            }
        );
    }

    #[test]
    fn malformed_simulation_ranges_are_rejected() {
        for raw in ["60-110", "110..60", "5..5", "a..9"] {
            let result = load(&[("SIM_ACTIVITY_RANGE", raw)]);
            assert!(matches!(result, Err(Error::Config(_))), "{raw}");
        }
    }
}
