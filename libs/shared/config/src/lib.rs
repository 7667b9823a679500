use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

pub const DEFAULT_RAW_DATA_PATH: &str = "data/raw/appointments.csv";
pub const DEFAULT_API_PORT: u16 = 3000;

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub raw_data_path: PathBuf,
    pub processed_data_path: Option<PathBuf>,
    pub api_host: IpAddr,
    pub api_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            raw_data_path: PathBuf::from(DEFAULT_RAW_DATA_PATH),
            processed_data_path: None,
            api_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            api_port: DEFAULT_API_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let raw_data_path = lookup("RAW_DATA_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                warn!("RAW_DATA_PATH not set, using default {}", DEFAULT_RAW_DATA_PATH);
                defaults.raw_data_path.clone()
            });

        let processed_data_path = lookup("PROCESSED_DATA_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let api_host = match lookup("API_HOST") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("API_HOST '{}' is not a valid IP address, using default", raw);
                defaults.api_host
            }),
            None => defaults.api_host,
        };

        let api_port = match lookup("API_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("API_PORT '{}' is not a valid port, using default", raw);
                defaults.api_port
            }),
            None => defaults.api_port,
        };

        Self {
            raw_data_path,
            processed_data_path,
            api_host,
            api_port,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.api_host, self.api_port)
    }

    pub fn writes_processed_output(&self) -> bool {
        self.processed_data_path.is_some()
    }
}
