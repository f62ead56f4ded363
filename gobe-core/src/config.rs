//! Settings file schema and loader.
//!
//! One file describes every backend a service talks to. Each section is
//! optional; a service that only needs a cache leaves `sql` and `mongo` out.
//!
//! ```yaml
//! sql:
//!   driver: postgres
//!   connector: orm
//!   db_host: localhost
//!   db_port: 5432
//!   db_name: app
//!   db_username: app
//!   db_password: ${APP_DB_PASSWORD}
//!   orm:
//!     debug: true
//!     auto_migrate: true
//! redis:
//!   host: localhost
//!   port: "6379"
//! ```
//!
//! The format is picked from the file extension (`.toml`, `.yaml`/`.yml`,
//! `.json`). `${VAR}` references are expanded from the process environment
//! before parsing; unset variables expand to an empty string.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

const REDACTED: &str = "********";

/// Settings file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<SqlConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mongo: Option<MongoConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis: Option<RedisConfig>,
}

/// Relational database driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbDriver {
    Mysql,
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
}

impl DbDriver {
    pub fn default_port(self) -> u16 {
        match self {
            Self::Mysql => 3306,
            Self::Postgres => 5432,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
        }
    }
}

/// How the relational database is reached: through the ORM or a bare driver pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    #[default]
    #[serde(alias = "gorm")]
    Orm,
    Sql,
}

/// ORM behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrmOptions {
    /// Log every statement.
    #[serde(default)]
    pub debug: bool,
    /// Create missing tables for the entities handed to the connector.
    #[serde(default)]
    pub auto_migrate: bool,
}

/// Relational database settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlConfig {
    pub driver: DbDriver,
    #[serde(default)]
    pub connector: Connector,
    #[serde(default)]
    pub db_name: String,
    #[serde(default)]
    pub db_host: String,
    #[serde(default, deserialize_with = "de_port", skip_serializing_if = "Option::is_none")]
    pub db_port: Option<u16>,
    #[serde(default)]
    pub db_username: String,
    #[serde(default)]
    pub db_password: String,
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
    /// Full DSN; when non-empty it is used as-is and the fields above are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_name: Option<String>,
    #[serde(default, alias = "gorm")]
    pub orm: OrmOptions,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_sql_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_ssl_mode() -> String {
    "disable".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_sql_timeout() -> u64 {
    30
}

impl SqlConfig {
    /// Port in effect, falling back to the driver's well-known port.
    pub fn port(&self) -> u16 {
        self.db_port.unwrap_or_else(|| self.driver.default_port())
    }

    /// DSN handed to the driver or ORM.
    pub fn data_source_name(&self) -> String {
        if let Some(dsn) = self.data_source_name.as_deref().filter(|s| !s.trim().is_empty()) {
            return dsn.to_string();
        }

        let ssl_mode = if self.ssl_mode.trim().is_empty() {
            "disable"
        } else {
            self.ssl_mode.trim()
        };

        let auth = credentials(&self.db_username, &self.db_password);
        match self.driver {
            DbDriver::Postgres => format!(
                "postgres://{}{}:{}/{}?sslmode={}",
                auth,
                self.db_host,
                self.port(),
                self.db_name,
                ssl_mode
            ),
            DbDriver::Mysql => format!(
                "mysql://{}{}:{}/{}?charset=utf8mb4&collation=utf8mb4_unicode_ci",
                auth,
                self.db_host,
                self.port(),
                self.db_name
            ),
        }
    }
}

/// Document store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MongoConfig {
    #[serde(default)]
    pub db_name: String,
    #[serde(default)]
    pub db_host: String,
    #[serde(default, deserialize_with = "de_port", skip_serializing_if = "Option::is_none")]
    pub db_port: Option<u16>,
    #[serde(default)]
    pub db_username: String,
    #[serde(default)]
    pub db_password: String,
    /// Full connection string; wins over the discrete fields when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default = "default_mongo_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_mongo_timeout() -> u64 {
    60
}

impl MongoConfig {
    pub fn uri(&self) -> String {
        if let Some(uri) = self.uri.as_deref().filter(|s| !s.trim().is_empty()) {
            return uri.to_string();
        }
        format!(
            "mongodb://{}{}:{}",
            credentials(&self.db_username, &self.db_password),
            self.db_host,
            self.db_port.unwrap_or(27017)
        )
    }
}

/// Key-value cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_host")]
    pub host: String,
    #[serde(default, deserialize_with = "de_port", skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub db: i64,
}

fn default_redis_host() -> String {
    "127.0.0.1".to_string()
}

impl RedisConfig {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(6379)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port())
    }
}

impl Settings {
    /// Load settings from a file, detecting the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            bail!("Settings file not found: {}", path.display());
        }

        let Some(format) = Format::from_path(path) else {
            bail!(
                "Unsupported settings format for {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            );
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings = Self::parse(&content, format)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), ?format, "Loaded settings");
        Ok(settings)
    }

    /// Parse settings from an in-memory document.
    pub fn parse(content: &str, format: Format) -> Result<Self> {
        let expanded = expand_env(content);
        let settings = match format {
            Format::Toml => toml::from_str(&expanded).context("invalid TOML")?,
            Format::Yaml => serde_yaml::from_str(&expanded).context("invalid YAML")?,
            Format::Json => serde_json::from_str(&expanded).context("invalid JSON")?,
        };
        Ok(settings)
    }

    /// Copy with every secret masked, safe to print.
    pub fn redacted(&self) -> Self {
        let mut out = self.clone();
        if let Some(sql) = out.sql.as_mut() {
            mask(&mut sql.db_password);
            if let Some(dsn) = sql.data_source_name.as_mut() {
                mask(dsn);
            }
        }
        if let Some(mongo) = out.mongo.as_mut() {
            mask(&mut mongo.db_password);
            if let Some(uri) = mongo.uri.as_mut() {
                mask(uri);
            }
        }
        if let Some(password) = out.redis.as_mut().and_then(|r| r.password.as_mut()) {
            mask(password);
        }
        out
    }
}

fn mask(value: &mut String) {
    if !value.is_empty() {
        *value = REDACTED.to_string();
    }
}

/// `user:pass@` with both parts percent-encoded, or nothing when no user is set.
fn credentials(username: &str, password: &str) -> String {
    if username.is_empty() {
        return String::new();
    }
    if password.is_empty() {
        return format!("{}@", urlencoding::encode(username));
    }
    format!(
        "{}:{}@",
        urlencoding::encode(username),
        urlencoding::encode(password)
    )
}

/// Replace `${VAR}` references with environment values.
fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                out.push_str(&env::var(name).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated reference stays verbatim
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Ports show up both as numbers and as quoted strings in settings files.
fn de_port<'de, D>(deserializer: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Option::<Port>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Port::Number(n)) => Ok(Some(n)),
        Some(Port::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Port::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {s:?}"))),
    }
}
