use std::path::{Component, Path, PathBuf};

use crate::error::{QueryError, Result};

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const HOME_ENV: &str = "HOME";

pub const DEFAULT_DATABASE_FILE: &str = "agricultural_data.db";
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpatialExtension {
    #[default]
    Load,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    InMemory,
}

impl DatabaseLocation {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::InMemory => ":memory:".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub location: DatabaseLocation,
    pub spatial: SpatialExtension,
}

impl StoreSettings {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            location: DatabaseLocation::InMemory,
            spatial: SpatialExtension::Skip,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

impl std::fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Resolves the database location. An explicit override wins over
/// `DATABASE_PATH`; relative paths resolve against `cwd`.
pub fn resolve_store_settings(
    env: impl Fn(&str) -> Option<String>,
    cwd: &Path,
    database_override: Option<&Path>,
    spatial: SpatialExtension,
) -> Result<StoreSettings> {
    if !cwd.is_absolute() {
        return Err(QueryError::Configuration(format!(
            "cwd must be absolute: {}",
            cwd.display()
        )));
    }

    let requested = match database_override {
        Some(path) => path.to_path_buf(),
        None => non_blank(env(DATABASE_PATH_ENV))
            .map_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE), PathBuf::from),
    };
    if requested.as_os_str() == ":memory:" {
        return Ok(StoreSettings {
            location: DatabaseLocation::InMemory,
            spatial,
        });
    }

    let home_dir = non_blank(env(HOME_ENV)).map(PathBuf::from);
    let resolved = resolve_user_path(&requested, home_dir.as_deref(), cwd)?;
    Ok(StoreSettings {
        location: DatabaseLocation::File(resolved),
        spatial,
    })
}

/// Reads the model credential. Fails fast when the key is absent so a query
/// service is never built without one.
pub fn resolve_model_settings(env: impl Fn(&str) -> Option<String>) -> Result<ModelSettings> {
    let api_key = non_blank(env(API_KEY_ENV)).ok_or_else(|| {
        QueryError::Configuration(format!("{API_KEY_ENV} environment variable not set"))
    })?;
    let base_url = non_blank(env(BASE_URL_ENV))
        .map_or_else(|| DEFAULT_BASE_URL.to_string(), |url| {
            url.trim_end_matches('/').to_string()
        });

    Ok(ModelSettings {
        api_key,
        model: DEFAULT_MODEL.to_string(),
        max_tokens: DEFAULT_MAX_TOKENS,
        base_url,
    })
}

/// Process environment lookup for the resolvers above.
#[must_use]
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn resolve_user_path(path: &Path, home_dir: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path, home_dir)?;
    let resolved = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    Ok(normalize_lexical(&resolved))
}

fn expand_tilde(path: &Path, home_dir: Option<&Path>) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let Some(home_dir) = home_dir else {
                return Err(QueryError::Configuration(format!(
                    "{HOME_ENV} is not set; cannot expand {}",
                    path.display()
                )));
            };
            let mut expanded = home_dir.to_path_buf();
            for component in components {
                expanded.push(component.as_os_str());
            }
            Ok(expanded)
        }
        Some(Component::Normal(first))
            if first
                .to_str()
                .is_some_and(|segment| segment.starts_with('~')) =>
        {
            Err(QueryError::Configuration(format!(
                "unsupported home expansion syntax (only `~` and `~/...` are supported): {}",
                path.display()
            )))
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }

    normalized
}
