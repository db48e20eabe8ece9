use crate::domain::models::{ApiSettings, ConfigFile, Settings, WaitPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_VERSION: &str = "v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROJECTS_BASE_PATH: &str = "/var/lib/awx/projects";
pub const DEFAULT_WAIT_RETRIES: u32 = 120;
pub const DEFAULT_WAIT_INTERVAL_MS: u64 = 1000;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path} at line {line}, column {column}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("environment variable {name}={value:?} is not a valid {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("scm-inventory")
            .join("config.toml"),
    )
}

fn read_config_file(path: &Path) -> Result<ConfigFile, SettingsError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|e| parse_error(path, &raw, &e))
}

/// Flattens a toml error to one line; its `Display` is a multi-line snippet.
fn parse_error(path: &Path, raw: &str, err: &toml::de::Error) -> SettingsError {
    let offset = err.span().map_or(0, |span| span.start.min(raw.len()));
    let before = raw.get(..offset).unwrap_or(raw);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
        + 1;
    let message = err
        .message()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    SettingsError::Parse {
        path: path.to_path_buf(),
        line,
        column,
        message,
    }
}

impl Settings {
    pub fn from_file(file: ConfigFile) -> Self {
        let api = file.api;
        let inventory = file.inventory;
        Settings {
            api: ApiSettings {
                host: api.host.unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
                username: api.username,
                password: api.password,
                oauth_token: api.oauth_token,
                verify_ssl: api.verify_ssl.unwrap_or(true),
                api_version: api
                    .api_version
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
                timeout: Duration::from_secs(api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            },
            projects_base_path: inventory
                .projects_base_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROJECTS_BASE_PATH)),
            wait: WaitPolicy {
                retries: inventory.update_wait_retries.unwrap_or(DEFAULT_WAIT_RETRIES),
                interval: Duration::from_millis(
                    inventory
                        .update_wait_interval_ms
                        .unwrap_or(DEFAULT_WAIT_INTERVAL_MS),
                ),
            },
        }
    }

    /// Overrides values from environment variables, looked up through `env`.
    pub fn apply_env(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SettingsError> {
        let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = non_empty("TOWER_HOST") {
            self.api.host = host;
        }
        if let Some(username) = non_empty("TOWER_USERNAME") {
            self.api.username = Some(username);
        }
        if let Some(password) = env("TOWER_PASSWORD") {
            self.api.password = Some(password);
        }
        if let Some(token) = non_empty("TOWER_OAUTH_TOKEN") {
            self.api.oauth_token = Some(token);
        }
        if let Some(raw) = non_empty("TOWER_VERIFY_SSL") {
            self.api.verify_ssl = parse_bool(&raw).ok_or(SettingsError::InvalidEnv {
                name: "TOWER_VERIFY_SSL",
                value: raw.clone(),
                expected: "boolean",
            })?;
        }
        if let Some(version) = non_empty("TOWER_API_VERSION") {
            self.api.api_version = version;
        }
        if let Some(path) = non_empty("PROJECTS_BASE_PATH") {
            self.projects_base_path = PathBuf::from(path);
        }
        if let Some(raw) = non_empty("UPDATE_WAIT_RETRIES") {
            self.wait.retries = raw.trim().parse().map_err(|_| SettingsError::InvalidEnv {
                name: "UPDATE_WAIT_RETRIES",
                value: raw.clone(),
                expected: "retry count",
            })?;
        }
        if let Some(raw) = non_empty("UPDATE_WAIT_INTERVAL_MS") {
            let ms: u64 = raw.trim().parse().map_err(|_| SettingsError::InvalidEnv {
                name: "UPDATE_WAIT_INTERVAL_MS",
                value: raw.clone(),
                expected: "millisecond count",
            })?;
            self.wait.interval = Duration::from_millis(ms);
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Defaults, then the config file, then the process environment.
///
/// An explicit `config` path must exist; the default path is optional.
pub fn load_settings(config: Option<&Path>) -> Result<Settings, SettingsError> {
    let file = match config {
        Some(path) => read_config_file(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => read_config_file(&path)?,
            _ => ConfigFile::default(),
        },
    };
    let mut settings = Settings::from_file(file);
    settings.apply_env(|name| std::env::var(name).ok())?;
    tracing::debug!(
        host = %settings.api.host,
        base = %settings.projects_base_path.display(),
        retries = settings.wait.retries,
        "settings loaded"
    );
    Ok(settings)
}
