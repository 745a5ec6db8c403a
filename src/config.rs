use serde_derive::Deserialize;
use std::fs;
use std::path::Path;
use toml;

use crate::error::ConfigError;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    pub discord: Discord,
    pub nitrado: Nitrado,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Discord {
    pub token: String,
    pub bot_client_id: String,
    pub channel_id: String,
    #[serde(default = "default_discord_base_url")]
    pub base_url: String,
    #[serde(default = "default_message_history_path")]
    pub message_history_path: String,
    #[serde(default = "default_create_message_path")]
    pub create_message_path: String,
    #[serde(default = "default_edit_message_path")]
    pub edit_message_path: String,
    #[serde(default = "default_discord_timeout")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Nitrado {
    #[serde(default = "default_nitrado_base_url")]
    pub base_url: String,
    #[serde(default = "default_boost_history_path")]
    pub boost_history_path: String,
    #[serde(default = "default_nitrado_timeout")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Account {
    pub auth_token: String,
    #[serde(default)]
    pub gameservers: Vec<GameServer>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GameServer {
    pub gameserver_name: String,
    pub gameserver_id: u64,
    #[serde(default)]
    pub enabled: bool,
}

/// One enabled game server together with the credential of its account.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerTarget {
    pub server_id: u64,
    pub name: String,
    pub auth_token: String,
}

impl Config {
    /// Enabled servers of every account, in config order.
    pub fn targets(&self) -> Vec<ServerTarget> {
        self.accounts
            .iter()
            .flat_map(|account| {
                account
                    .gameservers
                    .iter()
                    .filter(|server| server.enabled)
                    .map(|server| ServerTarget {
                        server_id: server.gameserver_id,
                        name: server.gameserver_name.clone(),
                        auth_token: account.auth_token.clone(),
                    })
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (&self.database_path, "database path"),
            (&self.discord.token, "Discord token"),
            (&self.discord.bot_client_id, "bot client ID"),
            (&self.discord.channel_id, "Discord channel ID"),
            (&self.discord.base_url, "Discord base URL"),
            (&self.discord.message_history_path, "Discord message history path"),
            (&self.discord.create_message_path, "Discord create message path"),
            (&self.discord.edit_message_path, "Discord edit message path"),
            (&self.nitrado.base_url, "NITRAPI base URL"),
            (&self.nitrado.boost_history_path, "NITRAPI boost history path"),
        ];

        for (value, name) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }

        if !self.nitrado.boost_history_path.contains(":id") {
            return Err(ConfigError::Invalid(
                "NITRAPI boost history path needs an :id placeholder".to_string(),
            ));
        }

        if self.discord.timeout_secs == 0 || self.nitrado.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least one second".to_string()));
        }

        for (idx, account) in self.accounts.iter().enumerate() {
            let has_enabled = account.gameservers.iter().any(|server| server.enabled);

            if has_enabled && account.auth_token.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("account #{} has no auth token", idx + 1)));
            }
        }

        Ok(())
    }
}

pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    let cfg: Config = toml::from_str(contents)?;
    cfg.validate()?;

    Ok(cfg)
}

pub fn load_config(filename: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(filename).map_err(|source| ConfigError::Io {
        path: filename.display().to_string(),
        source,
    })?;

    parse_config(&contents)
}

fn default_database_path() -> String {
    "./boosts.db".to_string()
}

fn default_discord_base_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_message_history_path() -> String {
    "/channels/:channel_id/messages".to_string()
}

fn default_create_message_path() -> String {
    "/channels/:channel_id/messages".to_string()
}

fn default_edit_message_path() -> String {
    "/channels/:channel_id/messages/:message_id".to_string()
}

fn default_discord_timeout() -> u64 {
    5
}

fn default_nitrado_base_url() -> String {
    "https://api.nitrado.net".to_string()
}

fn default_boost_history_path() -> String {
    "/services/:id/gameservers/boost/history".to_string()
}

fn default_nitrado_timeout() -> u64 {
    3
}
