use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

use storycatcher_engine::TARGET_WORDS;

const DEFAULT_BIND: &str = "0.0.0.0:5000";
const DEFAULT_DB_PATH: &str = ".cache/storycatcher.db";
const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
const DEFAULT_VIDEOGEN_BASE: &str = "https://ext.videogen.io/v1";
const DEFAULT_ADMIN_EMAIL: &str = "admin@storycatcher.com";
const DEFAULT_POLL_SECS: u64 = 10;
const DEFAULT_MAX_WAIT_SECS: u64 = 300;

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub log_level: LevelFilter,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub videogen_api_key: Option<String>,
    pub videogen_base_url: String,
    pub supabase_url: Option<String>,
    pub supabase_service_key: Option<String>,
    pub admin_email: String,
    pub script_words: usize,
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("STORYCATCHER_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .context("STORYCATCHER_BIND must be a socket address like 0.0.0.0:5000")?;

        let log_level = match get("STORYCATCHER_LOG") {
            Some(level) => level
                .parse()
                .map_err(|_| anyhow!("STORYCATCHER_LOG must be one of off, error, warn, info, debug, trace"))?,
            None => LevelFilter::INFO,
        };

        let script_words = parse_number(get("STORYCATCHER_SCRIPT_WORDS"), TARGET_WORDS as u64, "STORYCATCHER_SCRIPT_WORDS")? as usize;
        if script_words == 0 {
            return Err(anyhow!("STORYCATCHER_SCRIPT_WORDS must be greater than zero"));
        }

        Ok(Config {
            bind_addr,
            db_path: PathBuf::from(get("STORYCATCHER_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string())),
            log_level,
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE.to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            videogen_api_key: get("VIDEOGEN_API_KEY"),
            videogen_base_url: get("VIDEOGEN_BASE_URL").unwrap_or_else(|| DEFAULT_VIDEOGEN_BASE.to_string()),
            supabase_url: get("SUPABASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            supabase_service_key: get("SUPABASE_SERVICE_ROLE_KEY"),
            admin_email: get("STORYCATCHER_ADMIN_EMAIL")
                .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string())
                .to_lowercase(),
            script_words,
            poll_interval: Duration::from_secs(parse_number(get("VIDEOGEN_POLL_SECS"), DEFAULT_POLL_SECS, "VIDEOGEN_POLL_SECS")?),
            max_wait: Duration::from_secs(parse_number(get("VIDEOGEN_MAX_WAIT_SECS"), DEFAULT_MAX_WAIT_SECS, "VIDEOGEN_MAX_WAIT_SECS")?),
        })
    }
}

fn parse_number(value: Option<String>, default: u64, key: &str) -> Result<u64> {
    match value {
        Some(v) => v
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", key, v)),
        None => Ok(default),
    }
}
