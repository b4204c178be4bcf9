use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug)]
pub struct Config {
    pub host: [u8; 4],
    pub port: u16,
    pub log_level: String,
    pub store_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub broadcast_capacity: usize,
    pub subscriber_buffer: usize,
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_host(value: &str) -> Option<[u8; 4]> {
    let octets = value
        .split('.')
        .map(|part| part.parse::<u8>().ok())
        .collect::<Option<Vec<_>>>()?;
    octets.try_into().ok()
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            host: env::var("HOST")
                .ok()
                .and_then(|v| parse_host(&v))
                .unwrap_or([127, 0, 0, 1]),
            port: parse_or("PORT", 3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            store_timeout_secs: parse_or("STORE_TIMEOUT_SECS", 5).max(1),
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 30).max(1),
            broadcast_capacity: parse_or("BROADCAST_CAPACITY", 256).max(1),
            subscriber_buffer: parse_or("SUBSCRIBER_BUFFER", 32).max(1),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_ipv4_host() {
        assert_eq!(parse_host("0.0.0.0"), Some([0, 0, 0, 0]));
        assert_eq!(parse_host("10.1.2.3"), Some([10, 1, 2, 3]));
    }

    #[test]
    fn rejects_malformed_host() {
        assert_eq!(parse_host("localhost"), None);
        assert_eq!(parse_host("1.2.3"), None);
        assert_eq!(parse_host("1.2.3.4.5"), None);
        assert_eq!(parse_host("300.0.0.1"), None);
    }

    #[test]
    fn every_setting_feeds_the_running_service() {
        let config = Config {
            host: [0, 0, 0, 0],
            port: 8080,
            log_level: "debug".to_string(),
            store_timeout_secs: 2,
            request_timeout_secs: 10,
            broadcast_capacity: 16,
            subscriber_buffer: 4,
        };
        assert_eq!(config.store_timeout(), Duration::from_secs(2));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(!format!("{:?}", config).contains("database"));
    }
}
