use std::net::{IpAddr, Ipv4Addr};

use serde::Deserialize;
use tracing::level_filters::LevelFilter;

fn default_host() -> IpAddr {
	IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
	3000
}

fn default_log_level() -> String {
	"info".into()
}

fn default_rate_limit_per_second() -> u64 {
	10
}

fn default_rate_limit_burst() -> u32 {
	50
}

fn default_database_max_connections() -> u32 {
	10
}

/// Service configuration, read from the environment (and a `.env` file, if present).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub database_url: String,
	#[serde(default = "default_database_max_connections")]
	pub database_max_connections: u32,
	#[serde(default = "default_host")]
	pub host: IpAddr,
	#[serde(default = "default_port")]
	pub port: u16,
	/// One of `off`, `error`, `warn`, `info`, `debug` or `trace`.
	#[serde(default = "default_log_level")]
	pub log_level: String,
	/// Where traces and metrics are exported to. Nothing is exported when unset.
	pub otel_exporter_otlp_endpoint: Option<String>,
	#[serde(default = "default_rate_limit_per_second")]
	pub rate_limit_per_second: u64,
	#[serde(default = "default_rate_limit_burst")]
	pub rate_limit_burst: u32,
}

impl Config {
	pub fn from_env() -> Result<Self, envy::Error> {
		dotenvy::dotenv().ok();

		envy::from_env()
	}

	/// The configured log level, falling back to `info` when it cannot be parsed.
	pub fn level_filter(&self) -> LevelFilter {
		self.log_level.parse().unwrap_or(LevelFilter::INFO)
	}
}
