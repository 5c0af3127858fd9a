use std::env;
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(String),
    InvalidValue { name: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVar(name) => {
                write!(f, "{} environment variable must be set", name)
            }
            ConfigError::InvalidValue { name, value } => {
                write!(f, "Invalid value for {}: {}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Time windows used by the expiry sweep.
///
/// `before_game_expire_duration` and `notification_interval` are minutes,
/// `game_play_duration` and `game_invitation_duration` are hours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRulesConfig {
    pub before_game_expire_duration: i64,
    pub notification_interval: i64,
    pub game_play_duration: i64,
    pub game_invitation_duration: i64,
}

impl Default for GameRulesConfig {
    fn default() -> Self {
        GameRulesConfig {
            before_game_expire_duration: 32 * 60,
            notification_interval: 10,
            game_play_duration: 32,
            game_invitation_duration: 24,
        }
    }
}

impl GameRulesConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = GameRulesConfig::default();
        Ok(GameRulesConfig {
            before_game_expire_duration: parse_or(
                &lookup,
                "BEFORE_GAME_EXPIRE_DURATION_MINUTES",
                defaults.before_game_expire_duration,
            )?,
            notification_interval: parse_or(
                &lookup,
                "NOTIFICATION_INTERVAL_MINUTES",
                defaults.notification_interval,
            )?,
            game_play_duration: parse_or(
                &lookup,
                "GAME_PLAY_DURATION_HOURS",
                defaults.game_play_duration,
            )?,
            game_invitation_duration: parse_or(
                &lookup,
                "GAME_INVITATION_DURATION_HOURS",
                defaults.game_invitation_duration,
            )?,
        })
    }
}

/// DynamoDB table names, one per collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub games_table: String,
    pub users_table: String,
    pub accounts_table: String,
    pub system_stats_table: String,
    pub player_connections_table: String,
}

impl TableConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required =
            |name: &str| lookup(name).ok_or_else(|| ConfigError::MissingVar(name.to_string()));

        Ok(TableConfig {
            games_table: required("GAMES_TABLE")?,
            users_table: required("USERS_TABLE")?,
            accounts_table: required("ACCOUNTS_TABLE")?,
            system_stats_table: required("SYSTEM_STATS_TABLE")?,
            player_connections_table: required("PLAYER_CONNECTIONS_TABLE")?,
        })
    }
}

/// Endpoint of the WebSocket API that push notifications are posted through.
pub fn websocket_api_endpoint() -> Result<String, ConfigError> {
    env::var("WEBSOCKET_API_ENDPOINT")
        .map_err(|_| ConfigError::MissingVar("WEBSOCKET_API_ENDPOINT".to_string()))
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
    }
}
