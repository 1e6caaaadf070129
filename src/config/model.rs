//! Configuration data model.
//!
//! [`BotConfig`] is built once at startup from a [`ConfigProvider`] and never
//! changes afterwards. Only the connection essentials are required; every
//! other setting has a default.

use super::provider::ConfigProvider;
use crate::irc::message::is_trailing_marker;
use crate::error::ConfigError;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 6667;

/// Address of the IRC server to connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Server {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `host:port`, ready for `TcpStream::connect`.
    pub fn address(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub nickname: String,
    pub server: Server,
    /// NickServ password. Identification is skipped when unset.
    pub password: Option<String>,
    pub channel: String,
    pub command_prefix: char,
    /// Lowercased nicks allowed to run privileged commands.
    pub owners: HashSet<String>,
    pub realname: String,
    /// Nick of the network's authentication service.
    pub auth_service: String,
    /// How long to wait after identifying before carrying on. The service's
    /// reply is never inspected, so this is a guess at how long it takes.
    pub auth_delay: Duration,
}

fn default_realname() -> String {
    "ircbot - Rust IRC bot".to_string()
}
fn default_auth_service() -> String {
    "NickServ".to_string()
}
fn default_auth_delay() -> Duration {
    Duration::from_secs(5)
}

fn required(provider: &dyn ConfigProvider, key: &'static str) -> Result<String, ConfigError> {
    provider
        .get(key)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn optional(provider: &dyn ConfigProvider, key: &str) -> Option<String> {
    provider.get(key).filter(|v| !v.is_empty())
}

fn parse_port(key: &'static str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn invalid_server(value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: "server",
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse `host`, `host:port` or `[v6addr]:port`. A bare IPv6 address is
/// taken as the host on the default port.
fn parse_server(value: &str) -> Result<Server, ConfigError> {
    if let Some(rest) = value.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| invalid_server(value, "unclosed '['"))?;
        if host.is_empty() {
            return Err(invalid_server(value, "missing host"));
        }
        return match tail {
            "" => Ok(Server::new(host)),
            _ => {
                let port = tail
                    .strip_prefix(':')
                    .ok_or_else(|| invalid_server(value, "expected ':' after ']'"))?;
                Ok(Server::new(host).with_port(parse_port("server", port)?))
            }
        };
    }

    match value.rsplit_once(':') {
        Some((host, _)) if host.contains(':') => Ok(Server::new(value)),
        Some((host, port)) if !host.is_empty() => {
            Ok(Server::new(host).with_port(parse_port("server", port)?))
        }
        Some(_) => Err(invalid_server(value, "missing host")),
        None => Ok(Server::new(value)),
    }
}

impl BotConfig {
    pub fn from_provider(provider: &dyn ConfigProvider) -> Result<Self, ConfigError> {
        let nickname = required(provider, "nick")?;
        if nickname.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                key: "nick",
                value: nickname,
                reason: "nicknames cannot contain whitespace".to_string(),
            });
        }

        let mut server = parse_server(&required(provider, "server")?)?;
        if let Some(port) = optional(provider, "port") {
            server.port = parse_port("port", &port)?;
        }

        let channel = required(provider, "channel")?;

        // `command_char` is what older example configs used.
        let prefix = optional(provider, "cchar")
            .or_else(|| optional(provider, "command_char"))
            .ok_or(ConfigError::Missing("cchar"))?;
        let mut chars = prefix.chars();
        let command_prefix = match (chars.next(), chars.next()) {
            (Some(c), None) if is_trailing_marker(c) => {
                return Err(ConfigError::Invalid {
                    key: "cchar",
                    value: prefix,
                    reason: "':', '+' and '-' are stripped from the start of chat text"
                        .to_string(),
                })
            }
            (Some(c), None) => c,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "cchar",
                    value: prefix,
                    reason: "must be exactly one character".to_string(),
                })
            }
        };

        let owners = optional(provider, "owners")
            .map(|list| {
                list.split(',')
                    .map(|nick| nick.trim().to_lowercase())
                    .filter(|nick| !nick.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let auth_delay = match optional(provider, "auth_delay") {
            Some(secs) => Duration::from_secs(secs.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: "auth_delay",
                    value: secs.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => default_auth_delay(),
        };

        Ok(Self {
            nickname,
            server,
            password: optional(provider, "password"),
            channel,
            command_prefix,
            owners,
            realname: optional(provider, "realname").unwrap_or_else(default_realname),
            auth_service: optional(provider, "nickserv").unwrap_or_else(default_auth_service),
            auth_delay,
        })
    }

    /// Whether `nick` may run privileged commands.
    pub fn is_owner(&self, nick: &str) -> bool {
        self.owners.contains(&nick.to_lowercase())
    }
}

#[cfg(test)]
impl BotConfig {
    /// A config for unit tests: no auth delay, `alice` as the only owner.
    pub(crate) fn for_tests(server: Server) -> Self {
        Self {
            nickname: "rustbot".to_string(),
            server,
            password: Some("hunter2".to_string()),
            channel: "#rust".to_string(),
            command_prefix: '!',
            owners: HashSet::from(["alice".to_string()]),
            realname: "Test bot".to_string(),
            auth_service: default_auth_service(),
            auth_delay: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn provider(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("nick", "rustbot"),
            ("server", "irc.example.net"),
            ("channel", "#rust"),
            ("cchar", "!"),
        ]
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = BotConfig::from_provider(&provider(&base())).unwrap();
        assert_eq!(cfg.nickname, "rustbot");
        assert_eq!(cfg.server, Server::new("irc.example.net"));
        assert_eq!(cfg.server.port, DEFAULT_PORT);
        assert_eq!(cfg.channel, "#rust");
        assert_eq!(cfg.command_prefix, '!');
        assert_eq!(cfg.password, None);
        assert!(cfg.owners.is_empty());
        assert_eq!(cfg.auth_service, "NickServ");
        assert_eq!(cfg.auth_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_full_config() {
        let mut pairs = base();
        pairs.extend([
            ("server", "irc.example.net:6697"),
            ("password", "hunter2"),
            ("owners", "Alice, bob ,"),
            ("realname", "Test bot"),
            ("nickserv", "AuthServ"),
            ("auth_delay", "0"),
            ("unknown", "ignored"),
        ]);
        let cfg = BotConfig::from_provider(&provider(&pairs)).unwrap();
        assert_eq!(cfg.server.port, 6697);
        assert_eq!(cfg.password.as_deref(), Some("hunter2"));
        assert!(cfg.is_owner("alice"));
        assert!(cfg.is_owner("BOB"));
        assert!(!cfg.is_owner("mallory"));
        assert_eq!(cfg.owners.len(), 2);
        assert_eq!(cfg.realname, "Test bot");
        assert_eq!(cfg.auth_service, "AuthServ");
        assert_eq!(cfg.auth_delay, Duration::ZERO);
    }

    #[test]
    fn test_port_key_overrides_server() {
        let mut pairs = base();
        pairs.push(("port", "7000"));
        let cfg = BotConfig::from_provider(&provider(&pairs)).unwrap();
        assert_eq!(cfg.server.address(), "irc.example.net:7000");
    }

    #[test]
    fn test_ipv6_server() {
        let cases = [
            ("::1", "::1", DEFAULT_PORT),
            ("[::1]", "::1", DEFAULT_PORT),
            ("[2001:db8::7]:6697", "2001:db8::7", 6697),
        ];
        for (value, host, port) in cases {
            let server = parse_server(value).unwrap();
            assert_eq!(server, Server::new(host).with_port(port), "{}", value);
        }
        assert_eq!(parse_server("::1").unwrap().address(), "[::1]:6667");
    }

    #[test]
    fn test_command_char_alias() {
        let mut pairs = base();
        pairs.retain(|(k, _)| *k != "cchar");
        pairs.push(("command_char", "."));
        let cfg = BotConfig::from_provider(&provider(&pairs)).unwrap();
        assert_eq!(cfg.command_prefix, '.');
    }

    #[test]
    fn test_missing_required_keys() {
        for key in ["nick", "server", "channel", "cchar"] {
            let mut pairs = base();
            pairs.retain(|(k, _)| *k != key);
            let err = BotConfig::from_provider(&provider(&pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigError::Missing(k) if k == key),
                "expected missing {}, got {:?}",
                key,
                err
            );
        }
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("cchar", "!!"),
            ("cchar", ":"),
            ("cchar", "+"),
            ("cchar", "-"),
            ("server", "[::1"),
            ("server", "[]:6667"),
            ("server", "[::1]6667"),
            ("server", "irc.example.net:notaport"),
            ("server", ":6667"),
            ("port", "70000"),
            ("auth_delay", "soon"),
            ("nick", "two words"),
        ];
        for (key, value) in cases {
            let mut pairs = base();
            pairs.retain(|(k, _)| *k != key);
            pairs.push((key, value));
            let err = BotConfig::from_provider(&provider(&pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "expected invalid {}, got {:?}",
                key,
                err
            );
        }
    }
}
