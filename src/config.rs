use crate::error::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATA_PATH: &str = "賀展_比對結果.xlsx";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_TITLE: &str = "賀展料號比對系統";
pub const DEFAULT_STATIC_DIR: &str = "static";

/// When a search runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchTrigger {
    /// Search on every selection change, narrowing description choices
    /// once an item number is picked
    #[default]
    Auto,
    /// Search only when the user presses the search button
    Button,
}

impl SearchTrigger {
    pub fn narrows_choices(self) -> bool {
        self == SearchTrigger::Auto
    }
}

impl FromStr for SearchTrigger {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SearchTrigger::Auto),
            "button" => Ok(SearchTrigger::Button),
            _ => Err(ConfigError::InvalidTrigger(s.to_string())),
        }
    }
}

/// Runtime configuration for the lookup server
#[derive(Debug, Clone)]
pub struct Config {
    /// Comparison workbook to serve
    pub data_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub trigger: SearchTrigger,
    /// Page heading and browser title
    pub title: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            trigger: SearchTrigger::Auto,
            title: DEFAULT_TITLE.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Config {
    /// Build a configuration from positional arguments
    ///
    /// Usage: `part-lookup [DATA_PATH] [BIND_ADDR] [auto|button]`. Missing
    /// arguments keep their defaults. The program name must already be
    /// stripped.
    ///
    /// # Examples
    /// ```
    /// use part_lookup::config::{Config, SearchTrigger};
    ///
    /// let config = Config::from_args(["data.xlsx", "0.0.0.0:8080", "button"]).unwrap();
    /// assert_eq!(config.trigger, SearchTrigger::Button);
    /// assert_eq!(config.bind_addr.port(), 8080);
    /// ```
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        if let Some(path) = args.next() {
            config.data_path = PathBuf::from(path.as_ref());
        }
        if let Some(addr) = args.next() {
            let addr = addr.as_ref();
            config.bind_addr = addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(addr.to_string()))?;
        }
        if let Some(trigger) = args.next() {
            config.trigger = trigger.as_ref().parse()?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let config = Config::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.trigger, SearchTrigger::Auto);
        assert!(config.trigger.narrows_choices());
    }

    #[test]
    fn trigger_is_case_insensitive() {
        assert_eq!("BUTTON".parse::<SearchTrigger>(), Ok(SearchTrigger::Button));
        assert!(!SearchTrigger::Button.narrows_choices());
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            Config::from_args(["a.xlsx", "nowhere"]).unwrap_err(),
            ConfigError::InvalidAddress("nowhere".to_string())
        );
        assert_eq!(
            Config::from_args(["a.xlsx", "127.0.0.1:80", "sometimes"]).unwrap_err(),
            ConfigError::InvalidTrigger("sometimes".to_string())
        );
    }
}
