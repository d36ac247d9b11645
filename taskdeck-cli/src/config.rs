//! User configuration.
//!
//! Sources in precedence order, lowest first:
//!
//! 1. Built-in defaults
//! 2. The YAML file at `$TASKDECK_CONFIG`, else `<config_dir>/taskdeck/config.yaml`
//! 3. `TASKDECK_*` environment variables (`TASKDECK_API_KEY` sets `api_key`)
//! 4. Command-line flags
//!
//! A missing file is not an error. Missing credentials or board only fail
//! when a command needs them, so `taskdeck config` always works.

use anyhow::Context;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taskdeck_cards::repository::DEFAULT_API_URL;
use taskdeck_cards::{DeckError, Result, TrelloClient, TrelloCredentials};
use tracing::debug;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "TASKDECK_CONFIG";

/// Prefix of environment variables that set configuration keys
pub const ENV_PREFIX: &str = "TASKDECK_";

/// Effective configuration after all sources are merged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Board used when `--board` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    pub api_url: String,
    /// List that `add card` uses when `--list` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbox_list: Option<String>,
    pub color: bool,
    /// Print the banner before interactive sessions
    pub banner: bool,
    /// In review, offer to attach links found in a card's title
    pub prompt_title_links: bool,
    /// In review, ask for tags on cards that have none
    pub prompt_untagged: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_token: None,
            board: None,
            api_url: DEFAULT_API_URL.to_string(),
            inbox_list: None,
            color: true,
            banner: true,
            prompt_title_links: true,
            prompt_untagged: true,
        }
    }
}

/// Values from command-line flags. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Where the configuration file is read from
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("taskdeck").join("config.yaml"))
}

impl Settings {
    /// Build the layered figment without extracting it
    pub fn figment(path: Option<&Path>, overrides: &Overrides) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["config"])
                    .map(|key| key.as_str().to_lowercase().into()),
            )
            .merge(Serialized::defaults(overrides))
    }

    /// Load from the default locations
    pub fn load(overrides: &Overrides) -> anyhow::Result<Self> {
        Self::load_from(config_path().as_deref(), overrides)
    }

    /// Load with an explicit file path
    pub fn load_from(path: Option<&Path>, overrides: &Overrides) -> anyhow::Result<Self> {
        if let Some(path) = path {
            debug!(path = %path.display(), exists = path.exists(), "loading configuration");
        }
        Self::figment(path, overrides)
            .extract::<Self>()
            .with_context(|| match path {
                Some(path) => format!("failed to read configuration from {}", path.display()),
                None => "failed to read configuration".to_string(),
            })
    }

    /// API credentials, or a configuration error naming what is missing
    pub fn credentials(&self) -> Result<TrelloCredentials> {
        let key = non_empty(&self.api_key);
        let token = non_empty(&self.api_token);
        match (key, token) {
            (Some(key), Some(token)) => Ok(TrelloCredentials::new(key, token)),
            (None, _) => Err(DeckError::config(format!(
                "api_key is not set; add it to the configuration file or set {ENV_PREFIX}API_KEY"
            ))),
            (_, None) => Err(DeckError::config(format!(
                "api_token is not set; add it to the configuration file or set {ENV_PREFIX}API_TOKEN"
            ))),
        }
    }

    /// The board to work with
    pub fn board_name(&self) -> Result<&str> {
        non_empty(&self.board).ok_or_else(|| {
            DeckError::config(format!(
                "no board selected; pass --board, set {ENV_PREFIX}BOARD or add 'board' to the configuration file"
            ))
        })
    }

    /// A client for the configured API
    pub fn client(&self) -> Result<TrelloClient> {
        TrelloClient::new(self.api_url.clone(), self.credentials()?)
    }

    /// A copy safe to print: secrets keep only their last four characters
    pub fn masked(&self) -> Self {
        Self {
            api_key: self.api_key.as_deref().map(mask),
            api_token: self.api_token.as_deref().map(mask),
            ..self.clone()
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}
