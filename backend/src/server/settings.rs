//! Startup settings loaded via OrthoConfig.
//!
//! Values come from CLI arguments, `ROSTER_*` environment variables, or a
//! configuration file, and are immutable once the server starts.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};

use crate::inbound::http::auth::{AuthStrategy, AuthStrategyKind, UnknownAuthStrategy};
use crate::outbound::crypto::DEFAULT_BCRYPT_COST;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_BASIC_REALM: &str = "roster";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:4200";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// The auth strategy name is not recognised.
    #[error(transparent)]
    AuthStrategy(#[from] UnknownAuthStrategy),
    /// The bcrypt cost is outside the range bcrypt accepts.
    #[error("bcrypt cost {0} is outside 4..=31")]
    BcryptCost(u32),
}

/// Origins arrive as a list when the environment value holds a comma, and
/// as a plain string otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum OriginInput {
    One(String),
    Many(Vec<String>),
}

fn origin_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let input = Option::<OriginInput>::deserialize(deserializer)?;
    Ok(input.map(|origins| match origins {
        OriginInput::One(raw) => raw.split(',').map(str::to_owned).collect(),
        OriginInput::Many(list) => list,
    }))
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROSTER")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Redis URL for the session store; sessions stay in process memory when absent.
    pub redis_url: Option<String>,
    /// `session` or `basic`.
    pub auth_strategy: Option<String>,
    /// Realm advertised in basic-auth challenges.
    pub basic_realm: Option<String>,
    /// Allowed CORS origins, as a list or one comma-separated value.
    #[serde(default, deserialize_with = "origin_list")]
    pub cors_origins: Option<Vec<String>>,
    /// Reject usernames already held by another account.
    #[ortho_config(default = false)]
    pub enforce_unique_usernames: bool,
    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: Option<u32>,
    /// Redirect plain-HTTP requests to HTTPS.
    #[ortho_config(default = false)]
    pub force_https: bool,
    /// Client request and keep-alive timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl ServerSettings {
    /// Listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured authentication strategy, defaulting to sessions.
    pub fn auth_strategy(&self) -> Result<AuthStrategy, SettingsError> {
        let kind = match self.auth_strategy.as_deref() {
            Some(raw) => raw.parse::<AuthStrategyKind>()?,
            None => AuthStrategyKind::default(),
        };
        Ok(kind.with_realm(self.basic_realm.as_deref().unwrap_or(DEFAULT_BASIC_REALM)))
    }

    /// Allowed CORS origins with blanks dropped.
    pub fn cors_origins(&self) -> Vec<String> {
        match self.cors_origins.as_deref() {
            Some(origins) => origins
                .iter()
                .map(|origin| origin.trim())
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect(),
            None => vec![DEFAULT_CORS_ORIGINS.to_owned()],
        }
    }

    /// bcrypt cost, checked against the range bcrypt supports.
    pub fn bcrypt_cost(&self) -> Result<u32, SettingsError> {
        let cost = self.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST);
        if (4..=31).contains(&cost) {
            Ok(cost)
        } else {
            Err(SettingsError::BcryptCost(cost))
        }
    }

    /// Client request timeout, also used for keep-alive.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}
