//! Runtime configuration from the environment.
//!
//! Precedence for the API base URL: `IMIS_API_URL` > host-based selection
//! from `IMIS_HOST` (defaults to `localhost`).

use std::env;

/// Backend reached when running against a local host.
pub const LOCAL_BASE_URL: &str = "http://localhost:80";
/// Production backend.
pub const REMOTE_BASE_URL: &str = "http://35.246.194.158:8080";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    /// Show every navigation route regardless of the session's roles.
    pub show_all_views: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: LOCAL_BASE_URL.to_string(),
            show_all_views: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("IMIS_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| {
                let host = lookup("IMIS_HOST").unwrap_or_else(|| "localhost".to_string());
                base_url_for_host(&host).to_string()
            });

        let show_all_views = lookup("IMIS_SHOW_ALL_VIEWS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            api_base_url,
            show_all_views,
        }
    }
}

/// Local hosts talk to the local backend, everything else to production.
pub fn base_url_for_host(host: &str) -> &'static str {
    if host.contains("localhost") || host.contains("127.0.0.1") {
        LOCAL_BASE_URL
    } else {
        REMOTE_BASE_URL
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
