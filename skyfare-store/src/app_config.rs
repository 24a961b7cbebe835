use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub booking: BookingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    #[serde(default = "default_max_seats")]
    pub max_seats_per_booking: i32,
    #[serde(default = "default_reference_attempts")]
    pub reference_attempts: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_seats_per_booking: default_max_seats(),
            reference_attempts: default_reference_attempts(),
        }
    }
}

fn default_max_seats() -> i32 {
    9
}

fn default_reference_attempts() -> u32 {
    5
}

impl Config {
    /// Layered load: `config/default`, then `config/{RUN_MODE}`, then
    /// `config/local`, then `SKYFARE__`-prefixed environment variables.
    /// Every file is optional; serde defaults cover a bare environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SKYFARE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_an_empty_environment() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.booking.max_seats_per_booking, 9);
        assert_eq!(config.booking.reference_attempts, 5);
    }
}
