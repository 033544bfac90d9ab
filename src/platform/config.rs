// Web2Text Console - platform/config.rs
//
// Platform directory resolution and config.toml loading with startup
// validation. Invalid values produce actionable warnings and fall back
// to defaults; the application always starts.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for console data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/web2textconsole/).
    pub config_dir: PathBuf,

    /// Data directory for logs, caches, etc.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[server]` section.
    pub server: ServerSection,
    /// `[feed]` section.
    pub feed: FeedSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[server]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Backend base URL, e.g. "http://localhost:8000".
    pub base_url: Option<String>,
}

/// `[feed]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// Feed records per page.
    pub page_size: Option<u32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend base URL.
    pub server_url: String,
    /// Feed records per page.
    pub page_size: u32,
    /// Logging level string (read before tracing is initialised).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: constants::DEFAULT_SERVER_URL.to_string(),
            page_size: constants::DEFAULT_PAGE_SIZE,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    // Validate each field against named constants, accumulating all warnings.
    let mut config = AppConfig::default();

    // -- Server: base_url --
    if let Some(ref base_url) = raw.server.base_url {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            config.server_url = trimmed.to_string();
        } else {
            warnings.push(format!(
                "[server] base_url = \"{base_url}\" must start with http:// or https://. \
                 Using default ({}).",
                constants::DEFAULT_SERVER_URL,
            ));
        }
    }

    // -- Feed: page_size --
    if let Some(page_size) = raw.feed.page_size {
        if (constants::MIN_PAGE_SIZE..=constants::MAX_PAGE_SIZE).contains(&page_size) {
            config.page_size = page_size;
        } else {
            warnings.push(format!(
                "[feed] page_size = {page_size} is out of range ({}-{}). Using default ({}).",
                constants::MIN_PAGE_SIZE,
                constants::MAX_PAGE_SIZE,
                constants::DEFAULT_PAGE_SIZE,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, content: &str) {
        fs::write(dir.join(constants::CONFIG_FILE_NAME), content).unwrap();
    }

    #[test]
    fn missing_file_yields_defaults_without_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config.server_url, constants::DEFAULT_SERVER_URL);
        assert_eq!(config.page_size, constants::DEFAULT_PAGE_SIZE);
        assert!(warnings.is_empty());
    }

    #[test]
    fn valid_config_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
            [server]
            base_url = "https://backend.internal:8443/"

            [feed]
            page_size = 25

            [logging]
            level = "debug"
            "#,
        );
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        // Trailing slash is normalised away.
        assert_eq!(config.server_url, "https://backend.internal:8443");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn out_of_range_page_size_warns_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "[feed]\npage_size = 5000\n");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config.page_size, constants::DEFAULT_PAGE_SIZE);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("page_size"));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "[server]\nbase_url = \"ftp://nope\"\n");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config.server_url, constants::DEFAULT_SERVER_URL);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn unparseable_file_warns_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "this is not toml [[[");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config.server_url, constants::DEFAULT_SERVER_URL);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "[future]\nshiny = true\n");
        let (_, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
    }
}
