//! Server configuration loaded from environment variables

use crate::game::WordBank;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_IDLE_TTL_SECS: u64 = 2 * 60 * 60;
const DEFAULT_REAPER_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Sessions idle longer than this are removed (None = never)
    pub idle_ttl: Option<Duration>,
    pub reaper_interval: Duration,
    pub words: WordBank,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            idle_ttl: Some(Duration::from_secs(DEFAULT_IDLE_TTL_SECS)),
            reaper_interval: Duration::from_secs(DEFAULT_REAPER_INTERVAL_SECS),
            words: WordBank::default(),
        }
    }
}

/// Parse a numeric env var, warning and falling back on garbage
fn env_number<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!("Invalid value for {}: {:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load config from environment variables
    ///
    /// - `PORT`, `BIND_ADDR`
    /// - `WORDS_FILE` (one word per line) or `WORDS` (comma-separated)
    /// - `SESSION_IDLE_TTL_SECS` (0 disables reaping), `REAPER_INTERVAL_SECS`
    pub fn from_env() -> Self {
        let port = env_number("PORT", DEFAULT_PORT);
        let ip = env_number("BIND_ADDR", IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let idle_ttl = match env_number("SESSION_IDLE_TTL_SECS", DEFAULT_IDLE_TTL_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let reaper_interval = Duration::from_secs(
            env_number("REAPER_INTERVAL_SECS", DEFAULT_REAPER_INTERVAL_SECS).max(1),
        );

        let words = load_words();

        tracing::info!(
            %port,
            ?idle_ttl,
            words = words.len(),
            "Server config loaded"
        );

        Self {
            addr: SocketAddr::new(ip, port),
            idle_ttl,
            reaper_interval,
            words,
        }
    }
}

fn load_words() -> WordBank {
    if let Ok(path) = std::env::var("WORDS_FILE") {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match WordBank::new(contents.lines()) {
                Some(bank) => return bank,
                None => tracing::warn!("WORDS_FILE {} contains no words, using defaults", path),
            },
            Err(e) => tracing::warn!("Failed to read WORDS_FILE {}: {}, using defaults", path, e),
        }
        return WordBank::default();
    }

    if let Ok(list) = std::env::var("WORDS") {
        match WordBank::new(list.split(',')) {
            Some(bank) => return bank,
            None => tracing::warn!("WORDS is empty, using defaults"),
        }
    }

    WordBank::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const KEYS: &[&str] = &[
        "PORT",
        "BIND_ADDR",
        "WORDS",
        "WORDS_FILE",
        "SESSION_IDLE_TTL_SECS",
        "REAPER_INTERVAL_SECS",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = ServerConfig::from_env();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.idle_ttl, Some(Duration::from_secs(7200)));
        assert_eq!(config.words.len(), 20);
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("PORT", "8080");
        std::env::set_var("BIND_ADDR", "127.0.0.1");
        std::env::set_var("SESSION_IDLE_TTL_SECS", "0");
        std::env::set_var("WORDS", "apple, banana ,,apple");
        let config = ServerConfig::from_env();
        clear_env();

        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.idle_ttl, None);
        assert_eq!(
            config.words.words(),
            &["APPLE".to_string(), "BANANA".to_string()]
        );
    }

    #[test]
    #[serial]
    fn test_invalid_numbers_fall_back() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("REAPER_INTERVAL_SECS", "-5");
        let config = ServerConfig::from_env();
        clear_env();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.reaper_interval, Duration::from_secs(60));
    }

    #[test]
    #[serial]
    fn test_words_file_takes_precedence() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "castle\n\nrocket").unwrap();
        std::env::set_var("WORDS_FILE", file.path());
        std::env::set_var("WORDS", "ignored");
        let config = ServerConfig::from_env();
        clear_env();

        assert_eq!(
            config.words.words(),
            &["CASTLE".to_string(), "ROCKET".to_string()]
        );
    }

    #[test]
    #[serial]
    fn test_missing_words_file_uses_defaults() {
        clear_env();
        std::env::set_var("WORDS_FILE", "/nonexistent/words.txt");
        let config = ServerConfig::from_env();
        clear_env();

        assert_eq!(config.words.len(), 20);
    }
}
