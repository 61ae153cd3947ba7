//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CoercionPolicy, Error, Result};

/// Connection and behaviour settings for a [`Client`](crate::Client)
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    /// Native protocol port
    pub port: u16,
    /// MySQL-compatible interface port
    pub mysql_port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    pub conn_max_lifetime_secs: u64,
    pub tls: bool,
    pub compression: bool,
    /// Log every statement at info level instead of debug
    pub debug: bool,
    /// Fail materialization on values that cannot be coerced
    pub strict_coercion: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9000,
            mysql_port: 9004,
            database: "default".to_string(),
            username: "default".to_string(),
            password: String::new(),
            max_open_conns: 10,
            max_idle_conns: 5,
            conn_max_lifetime_secs: 3600,
            tls: false,
            compression: false,
            debug: false,
            strict_coercion: false,
        }
    }
}

impl Config {
    /// Parse a JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::config("host must not be empty"));
        }
        if self.port == 0 || self.mysql_port == 0 {
            return Err(Error::config("ports must be non-zero"));
        }
        if self.max_open_conns == 0 {
            return Err(Error::config("max_open_conns must be at least 1"));
        }
        if self.max_idle_conns > self.max_open_conns {
            return Err(Error::config(format!(
                "max_idle_conns ({}) exceeds max_open_conns ({})",
                self.max_idle_conns, self.max_open_conns
            )));
        }
        Ok(())
    }

    pub fn conn_max_lifetime(&self) -> Duration {
        Duration::from_secs(self.conn_max_lifetime_secs)
    }

    pub fn coercion_policy(&self) -> CoercionPolicy {
        if self.strict_coercion {
            CoercionPolicy::Strict
        } else {
            CoercionPolicy::Lenient
        }
    }

    /// Native-protocol DSN
    ///
    /// # Examples
    /// ```
    /// use chorm_core::Config;
    ///
    /// let config = Config { tls: true, ..Config::default() };
    /// assert_eq!(
    ///     config.dsn(),
    ///     "clickhouse://default:@localhost:9000/default?dial_timeout=10s&max_execution_time=60&secure=true"
    /// );
    /// ```
    pub fn dsn(&self) -> String {
        let mut dsn = format!(
            "clickhouse://{}:{}@{}:{}/{}?dial_timeout=10s&max_execution_time=60",
            self.username, self.password, self.host, self.port, self.database
        );
        if self.tls {
            dsn.push_str("&secure=true");
        }
        if self.compression {
            dsn.push_str("&compress=true");
        }
        dsn
    }

    /// URL for the MySQL-compatible interface, as accepted by sqlx
    pub fn mysql_url(&self) -> String {
        let mut url = format!(
            "mysql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.mysql_port, self.database
        );
        if self.tls {
            url.push_str("?ssl-mode=required");
        }
        url
    }
}
