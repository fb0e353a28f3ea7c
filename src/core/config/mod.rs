use figment::providers::{Env, Format, Toml};
use figment::Figment;
use log::info;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;

pub const CONFIG_FILE: &str = "ticketscope.toml";

const ENV_KEYS: &[&str] = &[
    "server_host",
    "server_port",
    "database_url",
    "db_host",
    "db_port",
    "db_user",
    "db_password",
    "db_name",
    "db_pool_size",
    "db_connect_timeout_secs",
    "run_migrations",
    "cors_allowed_origins",
    "trending_topics",
];

const DEFAULT_TRENDING_TOPICS: &str = "API Integration,ESG Data Quality,Kensho AI Features";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub pool_size: u32,
    pub connect_timeout: Duration,
    pub run_migrations: bool,
}

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub trending_topics: Vec<String>,
}

/// Flat view of every tunable, as read from `ticketscope.toml` and the environment.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSettings {
    #[serde(deserialize_with = "lenient_string")]
    server_host: String,
    server_port: u16,
    database_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    db_host: String,
    db_port: u16,
    #[serde(deserialize_with = "lenient_string")]
    db_user: String,
    #[serde(deserialize_with = "lenient_string")]
    db_password: String,
    #[serde(deserialize_with = "lenient_string")]
    db_name: String,
    db_pool_size: u32,
    db_connect_timeout_secs: u64,
    run_migrations: bool,
    #[serde(deserialize_with = "lenient_string")]
    cors_allowed_origins: String,
    #[serde(deserialize_with = "lenient_string")]
    trending_topics: String,
}

/// figment's `Env` provider pre-parses values, so `DB_PASSWORD=123456` arrives as an
/// integer and `TRENDING_TOPICS=[a, b]` as an array. Text settings take them back as strings.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(value_to_string)
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .into_iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 5001,
            database_url: None,
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_user: "postgres".to_string(),
            db_password: "postgres".to_string(),
            db_name: "capital_iq_dev".to_string(),
            db_pool_size: 10,
            db_connect_timeout_secs: 5,
            run_migrations: false,
            cors_allowed_origins: String::new(),
            trending_topics: DEFAULT_TRENDING_TOPICS.to_string(),
        }
    }
}

impl From<RawSettings> for AppConfig {
    fn from(raw: RawSettings) -> Self {
        Self {
            server: ServerConfig {
                host: raw.server_host,
                port: raw.server_port,
                cors_allowed_origins: split_list(&raw.cors_allowed_origins),
            },
            database: DatabaseConfig {
                url: raw.database_url.filter(|u| !u.trim().is_empty()),
                host: raw.db_host,
                port: raw.db_port,
                user: raw.db_user,
                password: raw.db_password,
                name: raw.db_name,
                pool_size: raw.db_pool_size.max(1),
                connect_timeout: Duration::from_secs(raw.db_connect_timeout_secs.max(1)),
                run_migrations: raw.run_migrations,
            },
            dashboard: DashboardConfig {
                trending_topics: split_list(&raw.trending_topics),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawSettings::default().into()
    }
}

impl AppConfig {
    /// Layers defaults, then `ticketscope.toml` (if present), then the process environment.
    pub fn load() -> Result<Self, figment::Error> {
        let raw: RawSettings = Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::raw().only(ENV_KEYS))
            .extract()?;
        let config = Self::from(raw);
        info!(
            "Database config: {}",
            config.database.redacted_connection_string()
        );
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl DatabaseConfig {
    /// `DATABASE_URL` wins over the discrete `DB_*` settings.
    pub fn connection_string(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }

    pub fn redacted_connection_string(&self) -> String {
        let full = self.connection_string();
        let Some((scheme, rest)) = full.split_once("://") else {
            return full;
        };
        let Some((credentials, location)) = rest.rsplit_once('@') else {
            return full;
        };
        let user = credentials.split(':').next().unwrap_or_default();
        format!("{scheme}://{user}:***@{location}")
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
