pub mod model;
pub mod provider;

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

pub use model::{BotConfig, Server};
pub use provider::{ConfigProvider, KeyValueConfig, TomlConfig};

const CONFIG_FILE: &str = "irc.cfg";

const BASIC_CONFIG: &str = "\
nick: rustbot
# host, host:port, or [address]:port for IPv6
server: irc.libera.chat
password: changeme
channel: #rustbot
cchar: !
owners: your_nick
";

/// `./irc.cfg` if present, otherwise `<config dir>/ircbot/irc.cfg`.
pub fn config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ircbot")
        .join(CONFIG_FILE)
}

/// Load and validate the configuration. `.toml` files are read as TOML,
/// anything else as `key: value` lines.
pub fn load_config(path: &Path) -> Result<BotConfig, ConfigError> {
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    if is_toml {
        BotConfig::from_provider(&TomlConfig::from_file(path)?)
    } else {
        BotConfig::from_provider(&KeyValueConfig::from_file(path)?)
    }
}

/// Write an example `key: value` config to `path`, creating parent
/// directories as needed.
pub fn write_basic_config(path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, BASIC_CONFIG).map_err(write_err)
}
