use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub smtp: SmtpConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub tls: TlsMode,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub greeting_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub socket_timeout: Duration,
    /// Value of the `X-Mailer` header on outgoing mail
    pub mailer_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// STARTTLS when the server offers it, plaintext otherwise
    Opportunistic,
    /// STARTTLS, failing when the server does not offer it
    Required,
    /// Implicit TLS from the first byte (port 465)
    Wrapper,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    #[serde(with = "humantime_serde")]
    pub window: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("failed to parse PORT environment variable: {0}")]
    Port(#[from] std::num::ParseIntError),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            smtp: SmtpConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "mail.privateemail.com".to_string(),
            port: 587,
            tls: TlsMode::Opportunistic,
            connect_timeout: Duration::from_secs(60),
            greeting_timeout: Duration::from_secs(30),
            socket_timeout: Duration::from_secs(60),
            mailer_name: "Vidpace Email Sender v1.0".to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(15 * 60),
        }
    }
}

fn read_config(path: &str) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    parse_config(path, &contents)
}

fn parse_config(path: &str, contents: &str) -> Result<Config, ConfigError> {
    serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

fn apply_env_overrides(mut config: Config) -> Result<Config, ConfigError> {
    if let Ok(port) = env::var("PORT") {
        config.port = port.trim().parse()?;
    }
    Ok(config)
}

pub fn load_config() -> Result<Config, ConfigError> {
    // Retrieve env variable
    let config_path = env::var("MAILER_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return apply_env_overrides(read_config(&config_path)?);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return apply_env_overrides(read_config("config.yaml")?);
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'",
            config_path
        );
        return apply_env_overrides(read_config("config.example.yaml")?);
    }

    // Fallback to built-in defaults
    tracing::info!("No config file found, using built-in defaults");
    apply_env_overrides(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_private_email_relay() {
        let config = Config::default();

        assert_eq!(config.port, 3000);
        assert_eq!(config.smtp.host, "mail.privateemail.com");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.tls, TlsMode::Opportunistic);
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window, Duration::from_secs(900));
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let yaml = r"
port: 8080
smtp:
  host: smtp.example.com
  socket_timeout: 5s
rate_limit:
  window: 1m
";
        let config = parse_config("inline", yaml).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.smtp.host, "smtp.example.com");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.socket_timeout, Duration::from_secs(5));
        assert_eq!(config.smtp.greeting_timeout, Duration::from_secs(30));
        assert_eq!(config.rate_limit.window, Duration::from_secs(60));
        assert_eq!(config.rate_limit.max_requests, 10);
    }

    #[test]
    fn tls_mode_is_lowercase_in_yaml() {
        let config = parse_config("inline", "smtp:\n  tls: wrapper\n").unwrap();
        assert_eq!(config.smtp.tls, TlsMode::Wrapper);
    }

    #[test]
    fn invalid_yaml_reports_the_path() {
        let err = parse_config("broken.yaml", "port: [not a port").unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }
}
