//! # Sales Config
//!
//! Runtime configuration for the sales API and its admin tooling.
//!
//! Every setting is read from a `SALES_`-prefixed environment variable and
//! falls back to a default when unset or unparsable. A `.env` file in the
//! working directory is loaded first when present.
//!
//! ```ignore
//! let cfg = sales_config::Config::from_env();
//! tracing::info!(config = %cfg, "starting");
//! ```

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_KEY_ID: &str = "920ee610-06ee-4f4e-a105-8fb95be31155";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebConfig {
    pub api_host: String,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub shutdown_timeout: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    pub key_id: String,
    pub private_key_file: String,
    pub algorithm: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    /// Host name, optionally with `:port`.
    pub host: String,
    pub name: String,
    pub disable_tls: bool,
    pub max_connections: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub web: WebConfig,
    pub auth: AuthConfig,
    pub db: DbConfig,
    /// Directory for rolling JSON log files. Console only when unset.
    pub log_dir: Option<String>,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let secs = |key: &str, default: u64| Duration::from_secs(parsed(&lookup, key, default));

        Self {
            web: WebConfig {
                api_host: string("SALES_WEB_API_HOST", "0.0.0.0:3000"),
                read_timeout: secs("SALES_WEB_READ_TIMEOUT", 5),
                write_timeout: secs("SALES_WEB_WRITE_TIMEOUT", 5),
                shutdown_timeout: secs("SALES_WEB_SHUTDOWN_TIMEOUT", 5),
            },
            auth: AuthConfig {
                key_id: string("SALES_AUTH_KEY_ID", DEFAULT_KEY_ID),
                private_key_file: string("SALES_AUTH_PRIVATE_KEY_FILE", "private.pem"),
                algorithm: string("SALES_AUTH_ALGORITHM", "RS256"),
            },
            db: DbConfig {
                user: string("SALES_DB_USER", "postgres"),
                password: string("SALES_DB_PASSWORD", "postgres"),
                host: string("SALES_DB_HOST", "localhost"),
                name: string("SALES_DB_NAME", "postgres"),
                disable_tls: lookup("SALES_DB_DISABLE_TLS")
                    .map(|v| parse_bool(&v))
                    .unwrap_or(true),
                max_connections: parsed(&lookup, "SALES_DB_MAX_CONNECTIONS", 10),
            },
            log_dir: lookup("SALES_LOG_DIR").filter(|dir| !dir.is_empty()),
        }
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--web-api-host={}", self.web.api_host)?;
        writeln!(f, "--web-read-timeout={:?}", self.web.read_timeout)?;
        writeln!(f, "--web-write-timeout={:?}", self.web.write_timeout)?;
        writeln!(f, "--web-shutdown-timeout={:?}", self.web.shutdown_timeout)?;
        writeln!(f, "--auth-key-id={}", self.auth.key_id)?;
        writeln!(f, "--auth-private-key-file={}", self.auth.private_key_file)?;
        writeln!(f, "--auth-algorithm={}", self.auth.algorithm)?;
        writeln!(f, "--db-user={}", self.db.user)?;
        writeln!(f, "--db-password=xxxxxx")?;
        writeln!(f, "--db-host={}", self.db.host)?;
        writeln!(f, "--db-name={}", self.db.name)?;
        writeln!(f, "--db-disable-tls={}", self.db.disable_tls)?;
        write!(f, "--db-max-connections={}", self.db.max_connections)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config_from(&[]);

        assert_eq!(cfg.web.api_host, "0.0.0.0:3000");
        assert_eq!(cfg.web.read_timeout, Duration::from_secs(5));
        assert_eq!(cfg.web.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(cfg.auth.key_id, DEFAULT_KEY_ID);
        assert_eq!(cfg.auth.private_key_file, "private.pem");
        assert_eq!(cfg.auth.algorithm, "RS256");
        assert_eq!(cfg.db.host, "localhost");
        assert!(cfg.db.disable_tls);
        assert_eq!(cfg.db.max_connections, 10);
        assert_eq!(cfg.log_dir, None);
    }

    #[test]
    fn test_overrides() {
        let cfg = config_from(&[
            ("SALES_WEB_API_HOST", "127.0.0.1:8080"),
            ("SALES_WEB_WRITE_TIMEOUT", "30"),
            ("SALES_AUTH_ALGORITHM", "PS256"),
            ("SALES_DB_HOST", "db:5433"),
            ("SALES_DB_DISABLE_TLS", "false"),
            ("SALES_DB_MAX_CONNECTIONS", "25"),
            ("SALES_LOG_DIR", "/var/log/sales"),
        ]);

        assert_eq!(cfg.web.api_host, "127.0.0.1:8080");
        assert_eq!(cfg.web.write_timeout, Duration::from_secs(30));
        assert_eq!(cfg.auth.algorithm, "PS256");
        assert_eq!(cfg.db.host, "db:5433");
        assert!(!cfg.db.disable_tls);
        assert_eq!(cfg.db.max_connections, 25);
        assert_eq!(cfg.log_dir.as_deref(), Some("/var/log/sales"));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let cfg = config_from(&[
            ("SALES_WEB_READ_TIMEOUT", "soon"),
            ("SALES_DB_MAX_CONNECTIONS", "-1"),
        ]);

        assert_eq!(cfg.web.read_timeout, Duration::from_secs(5));
        assert_eq!(cfg.db.max_connections, 10);
    }

    #[test]
    fn test_empty_log_dir_is_unset() {
        let cfg = config_from(&[("SALES_LOG_DIR", "")]);
        assert_eq!(cfg.log_dir, None);
    }

    #[test]
    fn test_display_masks_password() {
        let cfg = config_from(&[("SALES_DB_PASSWORD", "hunter2")]);
        let shown = cfg.to_string();

        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("--db-password=xxxxxx"));
        assert!(shown.contains("--db-host=localhost"));
    }
}
