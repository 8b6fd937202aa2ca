use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub host: String,
  pub max_connections: u32,
  pub acquire_timeout: Duration,
  pub request_timeout: Duration,
}

impl Config {
  pub fn from_env() -> Result<Self, String> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Build a config from any key lookup. `from_env` passes the process environment.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
  where
    F: Fn(&str) -> Option<String>,
  {
    let database_url = lookup("DATABASE_URL")
      .unwrap_or_else(|| "sqlite:trek.db".to_string());

    let port = parse_var(&lookup, "PORT", 8000)?;

    let host = lookup("HOST")
      .unwrap_or_else(|| "127.0.0.1".to_string());

    let max_connections = parse_var(&lookup, "DB_MAX_CONNECTIONS", 5)?;
    let acquire_timeout_secs = parse_var(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5)?;
    let request_timeout_secs = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

    if max_connections == 0 {
      return Err("Invalid DB_MAX_CONNECTIONS: must be at least 1".to_string());
    }

    Ok(Self {
      database_url,
      port,
      host,
      max_connections,
      acquire_timeout: Duration::from_secs(acquire_timeout_secs),
      request_timeout: Duration::from_secs(request_timeout_secs),
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
  F: Fn(&str) -> Option<String>,
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(key) {
    Some(raw) => raw
      .trim()
      .parse()
      .map_err(|e| format!("Invalid {}: {}", key, e)),
    None => Ok(default),
  }
}
