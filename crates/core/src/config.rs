use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;

use crate::i18n::Locale;

static ENV_DATA_DIR: &str = "TRIP_DATA_DIR";
static ENV_NOTES_URL: &str = "TRIP_NOTES_URL";
static DEFAULT_OUT_DIR: &str = "site";
static LOCAL_DATA_DIR: &str = "data";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "trip-planner", "trip"));

/// Where the JSON documents are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    Dir(PathBuf),
    /// Base URL; document paths are appended to it.
    Url(String),
}

impl fmt::Display for DataLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataLocation::Dir(path) => write!(f, "{}", path.display()),
            DataLocation::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Values given explicitly on the command line. Anything left `None` is
/// resolved from the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub data_url: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub locale: Option<Locale>,
    pub notes_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    data: DataLocation,
    out_dir: PathBuf,
    locale: Locale,
    notes_endpoint: Option<String>,
}

impl AppConfig {
    /// Construct [`AppConfig`] from the overrides, environment variables, and
    /// platform defaults.
    pub fn discover(overrides: ConfigOverrides) -> Result<Self> {
        let data = match (overrides.data_url, overrides.data_dir) {
            (Some(_), Some(_)) => bail!("--data-url and --data-dir cannot be combined"),
            (Some(url), None) => DataLocation::Url(validate_url(&url).context("Invalid data URL")?),
            (None, dir) => DataLocation::Dir(resolve_data_dir(dir)?),
        };

        let notes_endpoint = match overrides
            .notes_url
            .or_else(|| env::var(ENV_NOTES_URL).ok())
            .filter(|url| !url.trim().is_empty())
        {
            Some(url) => Some(validate_url(&url).context("Invalid notes endpoint")?),
            None => None,
        };

        Ok(Self {
            data,
            out_dir: overrides
                .out_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            locale: overrides.locale.unwrap_or_else(Locale::detect),
            notes_endpoint,
        })
    }

    /// Construct [`AppConfig`] directly from a data directory with defaults
    /// for everything else.
    pub fn from_data_dir(data_dir: PathBuf) -> Result<Self> {
        Ok(Self {
            data: DataLocation::Dir(data_dir),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            locale: Locale::default(),
            notes_endpoint: None,
        })
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_out_dir(mut self, out_dir: PathBuf) -> Self {
        self.out_dir = out_dir;
        self
    }

    pub fn with_notes_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.notes_endpoint = Some(endpoint.into());
        self
    }

    pub fn data(&self) -> &DataLocation {
        &self.data
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn notes_endpoint(&self) -> Option<&str> {
        self.notes_endpoint.as_deref()
    }
}

fn validate_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        bail!("'{}' is not an http(s) URL", trimmed);
    }
    Ok(trimmed.to_string())
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_dir_override {
        return Ok(dir);
    }

    if let Ok(env_dir) = env::var(ENV_DATA_DIR) {
        return Ok(PathBuf::from(env_dir));
    }

    if cfg!(debug_assertions) {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let dev_dir = manifest_dir.join("..").join("..").join(LOCAL_DATA_DIR);
        if dev_dir.is_dir() {
            return Ok(dev_dir);
        }
    }

    let local = env::current_dir()?.join(LOCAL_DATA_DIR);
    if local.is_dir() {
        return Ok(local);
    }

    if let Some(project) = &*PROJECT_DIRS {
        return Ok(project.data_dir().to_path_buf());
    }

    if let Some(base) = BaseDirs::new() {
        return Ok(base.home_dir().join(".trip"));
    }

    Ok(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_data_dir_wins() {
        let config = AppConfig::discover(ConfigOverrides {
            data_dir: Some(PathBuf::from("/tmp/trip-data")),
            locale: Some(Locale::En),
            notes_url: Some("https://notes.example/exec".into()),
            ..ConfigOverrides::default()
        })
        .unwrap();
        assert_eq!(
            config.data(),
            &DataLocation::Dir(PathBuf::from("/tmp/trip-data"))
        );
        assert_eq!(config.locale(), Locale::En);
        assert_eq!(config.notes_endpoint(), Some("https://notes.example/exec"));
        assert_eq!(config.out_dir(), Path::new("site"));
    }

    #[test]
    fn data_url_must_be_http() {
        let err = AppConfig::discover(ConfigOverrides {
            data_url: Some("ftp://example.org/data".into()),
            ..ConfigOverrides::default()
        })
        .unwrap_err();
        assert!(format!("{:#}", err).contains("not an http(s) URL"));
    }

    #[test]
    fn data_url_and_dir_conflict() {
        let result = AppConfig::discover(ConfigOverrides {
            data_url: Some("https://example.org/data".into()),
            data_dir: Some(PathBuf::from("data")),
            ..ConfigOverrides::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn from_data_dir_uses_defaults() {
        let config = AppConfig::from_data_dir(PathBuf::from("fixtures"))
            .unwrap()
            .with_out_dir(PathBuf::from("public"));
        assert_eq!(config.locale(), Locale::ZhTw);
        assert_eq!(config.notes_endpoint(), None);
        assert_eq!(config.out_dir(), Path::new("public"));
        assert_eq!(config.data().to_string(), "fixtures");
    }
}
