//! Client configuration.
//!
//! Values come from the process environment layered over an optional dotenv
//! file at `$XDG_CONFIG_HOME/brotab/brotab.env` (falling back to
//! `~/.config/brotab/brotab.env`). Entries in the file override the
//! environment.
//!
//! | Variable              | Default           |
//! |-----------------------|-------------------|
//! | `HTTP_IFACE`          | `127.0.0.1`       |
//! | `MIN_HTTP_PORT`       | `4625`            |
//! | `MAX_HTTP_PORT`       | `4635` (exclusive)|
//! | `BROTAB_HTTP_TIMEOUT` | `10` seconds      |
//! | `EDITOR`              | `nvim`            |
//! | `BROTAB_LOG_FILE`     | `<tmp>/brotab.log`|

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Duration;

use brotab_protocol::{
    DEFAULT_HTTP_IFACE, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_HTTP_PORT, DEFAULT_MIN_HTTP_PORT,
};

use crate::error::ConfigError;

const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

#[cfg(windows)]
const DEFAULT_EDITOR: &str = "notepad";
#[cfg(not(windows))]
const DEFAULT_EDITOR: &str = "nvim";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub http_iface: String,
    pub min_http_port: u16,
    /// Exclusive upper bound.
    pub max_http_port: u16,
    pub http_timeout: Duration,
    pub probe_timeout: Duration,
    pub editor: String,
    pub log_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            http_iface: DEFAULT_HTTP_IFACE.to_string(),
            min_http_port: DEFAULT_MIN_HTTP_PORT,
            max_http_port: DEFAULT_MAX_HTTP_PORT,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            probe_timeout: PROBE_TIMEOUT,
            editor: DEFAULT_EDITOR.to_string(),
            log_file: std::env::temp_dir().join("brotab.log"),
        }
    }
}

impl ClientConfig {
    /// Reads the process environment and the dotenv file (if any).
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        Self::load_layered(env, config_file_path().as_deref())
    }

    /// Layers the dotenv `file`, when it exists, over `env`.
    pub fn load_layered(
        env: impl IntoIterator<Item = (String, String)>,
        file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut vars: HashMap<String, String> = env.into_iter().collect();
        if let Some(path) = file.filter(|path| path.exists()) {
            vars.extend(read_dotenv(path)?);
        }
        Self::from_vars(&vars)
    }

    /// Builds a config from an explicit variable map; unset keys keep their
    /// defaults.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(iface) = non_empty(vars, "HTTP_IFACE") {
            config.http_iface = iface.to_string();
        }
        if let Some(port) = parse_var::<u16>(vars, "MIN_HTTP_PORT")? {
            config.min_http_port = port;
        }
        if let Some(port) = parse_var::<u16>(vars, "MAX_HTTP_PORT")? {
            config.max_http_port = port;
        }
        if let Some(secs) = parse_var::<u64>(vars, "BROTAB_HTTP_TIMEOUT")? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(editor) = non_empty(vars, "EDITOR") {
            config.editor = editor.to_string();
        }
        if let Some(path) = non_empty(vars, "BROTAB_LOG_FILE") {
            config.log_file = PathBuf::from(path);
        }

        if config.min_http_port >= config.max_http_port {
            return Err(ConfigError::EmptyPortRange {
                min: config.min_http_port,
                max: config.max_http_port,
            });
        }

        Ok(config)
    }

    /// Ports probed for mediators, lowest first.
    pub fn mediator_ports(&self) -> Range<u16> {
        self.min_http_port..self.max_http_port
    }
}

/// `$XDG_CONFIG_HOME/brotab/brotab.env`, or under `~/.config`.
pub fn config_file_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
    Some(base.join("brotab").join("brotab.env"))
}

/// Reads `KEY=VALUE` pairs from a dotenv file.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let dotenv_error = |err: dotenvy::Error| match err {
        dotenvy::Error::Io(source) => ConfigError::Read {
            path: path.to_path_buf(),
            source,
        },
        source => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
    };

    dotenvy::from_path_iter(path)
        .map_err(dotenv_error)?
        .map(|item| item.map_err(dotenv_error))
        .collect()
}

fn non_empty<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match non_empty(vars, key) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Malformed {
                key: key.to_string(),
                value: value.to_string(),
            }),
    }
}
