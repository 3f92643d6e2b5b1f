use std::path::{Path, PathBuf};

use scoop_core::PayloadFormat;
use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub source: Option<SourceConfig>,
    pub http: Option<HttpConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: Option<String>,
    pub format: Option<PayloadFormat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

/// Platform config directory path: `<config_dir>/scoop/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scoop").join("config.toml"))
}

/// Load config by cascading CWD `.scoop.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".scoop.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_source = base.source.unwrap_or_default();
    let over_source = overlay.source.unwrap_or_default();
    let base_http = base.http.unwrap_or_default();
    let over_http = overlay.http.unwrap_or_default();

    ConfigFile {
        source: Some(SourceConfig {
            url: over_source.url.or(base_source.url),
            format: over_source.format.or(base_source.format),
        }),
        http: Some(HttpConfig {
            timeout_secs: over_http.timeout_secs.or(base_http.timeout_secs),
            user_agent: over_http.user_agent.or(base_http.user_agent),
        }),
    }
}

impl ConfigFile {
    pub fn source_url(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.url.as_deref())
    }

    pub fn format(&self) -> Option<PayloadFormat> {
        self.source.as_ref().and_then(|s| s.format)
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.http.as_ref().and_then(|h| h.timeout_secs)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.http.as_ref().and_then(|h| h.user_agent.as_deref())
    }
}
