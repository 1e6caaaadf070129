//! Key/value sources for [`BotConfig`](super::BotConfig).
//!
//! The bot only ever asks for settings by name, so any store that can answer
//! `get(key)` works. Two file formats are supported: the plain `key: value`
//! format and a flat TOML table.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

pub trait ConfigProvider {
    /// Raw value for `key`, or `None` when the store has no such setting.
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigProvider for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// One `key: value` pair per line.
///
/// Lines are split at the first `:` so values may contain colons themselves.
/// Blank lines, `#` comments and lines without a colon are skipped; the last
/// occurrence of a key wins.
#[derive(Debug, Default)]
pub struct KeyValueConfig {
    values: HashMap<String, String>,
}

impl KeyValueConfig {
    pub fn parse(contents: &str) -> Self {
        let values = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();
        Self { values }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&contents))
    }
}

impl ConfigProvider for KeyValueConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// A flat TOML table. Strings are returned as-is, other scalars in their
/// TOML form (`6667`, `true`), and arrays of scalars comma-joined so
/// `owners = ["alice", "bob"]` reads the same as `owners: alice, bob`.
#[derive(Debug, Default)]
pub struct TomlConfig {
    table: toml::Table,
}

impl TomlConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { table })
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Table(_) | toml::Value::Array(_) => None,
        other => Some(other.to_string()),
    }
}

impl ConfigProvider for TomlConfig {
    fn get(&self, key: &str) -> Option<String> {
        match self.table.get(key)? {
            toml::Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(scalar_to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            value => scalar_to_string(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_key_value_parse() {
        let cfg = KeyValueConfig::parse(
            "nick: rustbot\n\
             # comment: ignored\n\
             \n\
             server:irc.example.net:6697\n\
             garbage line\n\
             channel : #rust \n\
             nick: rustbot2\n",
        );
        assert_eq!(cfg.get("nick").as_deref(), Some("rustbot2"));
        assert_eq!(cfg.get("server").as_deref(), Some("irc.example.net:6697"));
        assert_eq!(cfg.get("channel").as_deref(), Some("#rust"));
        assert_eq!(cfg.get("# comment"), None);
        assert_eq!(cfg.get("garbage line"), None);
        assert_eq!(cfg.get("password"), None);
    }

    #[test]
    fn test_toml_provider() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            "nick = \"rustbot\"\nport = 6697\nowners = [\"alice\", \"bob\"]\n[extra]\nkey = 1\n"
        )
        .unwrap();

        let cfg = TomlConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.get("nick").as_deref(), Some("rustbot"));
        assert_eq!(cfg.get("port").as_deref(), Some("6697"));
        assert_eq!(cfg.get("owners").as_deref(), Some("alice,bob"));
        assert_eq!(cfg.get("extra"), None);
        assert_eq!(cfg.get("missing"), None);
    }

    #[test]
    fn test_toml_provider_reports_syntax_errors() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "nick = ").unwrap();
        assert!(matches!(
            TomlConfig::from_file(file.path()),
            Err(ConfigError::Toml { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = KeyValueConfig::from_file(Path::new("/nonexistent/irc.cfg")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
