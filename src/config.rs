use chrono_tz::Tz;
use std::{env, net::SocketAddr, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    /// Zone whose calendar days the heatmap is bucketed by.
    pub timezone: Tz,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: resolve_port(env::var("PORT").ok().as_deref()),
            data_path: resolve_data_path(env::var("APP_DATA_PATH").ok()),
            timezone: resolve_timezone(env::var("APP_TIMEZONE").ok().as_deref()),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn resolve_port(value: Option<&str>) -> u16 {
    value
        .and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

fn resolve_data_path(value: Option<String>) -> PathBuf {
    match value {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_DATA_PATH),
    }
}

fn resolve_timezone(value: Option<&str>) -> Tz {
    let Some(name) = value.map(str::trim).filter(|name| !name.is_empty()) else {
        return Tz::UTC;
    };
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(err) => {
            warn!("unknown timezone {name:?} ({err}), using UTC");
            Tz::UTC
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_to_default() {
        assert_eq!(resolve_port(None), 8080);
        assert_eq!(resolve_port(Some("nope")), 8080);
        assert_eq!(resolve_port(Some(" 3000 ")), 3000);
    }

    #[test]
    fn data_path_defaults_under_data_dir() {
        assert_eq!(resolve_data_path(None), PathBuf::from("data/state.json"));
        assert_eq!(resolve_data_path(Some(String::new())), PathBuf::from("data/state.json"));
        assert_eq!(resolve_data_path(Some("/tmp/x.json".into())), PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn timezone_parses_iana_names() {
        assert_eq!(resolve_timezone(None), Tz::UTC);
        assert_eq!(resolve_timezone(Some("Europe/Berlin")), Tz::Europe__Berlin);
        assert_eq!(resolve_timezone(Some("Mars/Olympus")), Tz::UTC);
    }
}
