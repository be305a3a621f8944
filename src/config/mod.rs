use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_ACCESS_TTL_SECS: u64 = 10 * 60;
const DEFAULT_REFRESH_TTL_SECS: u64 = 7 * 24 * 3600;
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 3600;
const DEFAULT_RECIPES_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
// TTL 上限：十年
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 3600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("unknown AUTH_MODE `{0}`, expected one of none, session, token")]
    InvalidAuthMode(String),
    #[error("BCRYPT_COST must be between 4 and 31, got {0}")]
    InvalidBcryptCost(u32),
}

/// 认证策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    None,
    Session,
    Token,
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "noauth" => Ok(AuthMode::None),
            "session" => Ok(AuthMode::Session),
            "token" | "jwt" => Ok(AuthMode::Token),
            other => Err(ConfigError::InvalidAuthMode(other.to_string())),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthMode::None => "none",
            AuthMode::Session => "session",
            AuthMode::Token => "token",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub auth_mode: AuthMode,
    pub jwt_secret: String,
    pub jwt_access_ttl_secs: u64,
    pub jwt_refresh_ttl_secs: u64,
    pub session_ttl_secs: u64,
    pub recipes_cache_ttl_secs: u64,
    pub protect_list: bool,
    pub bcrypt_cost: u32,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Numeric values that fail to
    /// parse fall back to their defaults; TTLs are capped at ten years.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let ttl = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
                .min(MAX_TTL_SECS)
        };

        let auth_mode = match lookup("AUTH_MODE") {
            Some(mode) => mode.parse::<AuthMode>()?,
            None => AuthMode::Token,
        };
        let jwt_secret = match auth_mode {
            AuthMode::Token => required("JWT_SECRET")?,
            _ => lookup("JWT_SECRET").unwrap_or_default(),
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            redis_url: required("REDIS_URL")?,
            auth_mode,
            jwt_secret,
            jwt_access_ttl_secs: ttl("JWT_ACCESS_TTL_SECS", DEFAULT_ACCESS_TTL_SECS),
            jwt_refresh_ttl_secs: ttl("JWT_REFRESH_TTL_SECS", DEFAULT_REFRESH_TTL_SECS),
            session_ttl_secs: ttl("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS),
            recipes_cache_ttl_secs: ttl("RECIPES_CACHE_TTL_SECS", DEFAULT_RECIPES_CACHE_TTL_SECS),
            protect_list: lookup("PROTECT_LIST")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            bcrypt_cost: lookup("BCRYPT_COST")
                .and_then(|v| v.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.into()),
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            api_base_uri: lookup("API_BASE_URI")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_default(),
        })
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_access_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_refresh_ttl_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn recipes_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.recipes_cache_ttl_secs)
    }
}
