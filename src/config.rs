//! Runtime configuration
//!
//! Read from `ROADMAP_*` environment variables or a JSON file. With an
//! `api_url` the hosted store is used, otherwise a local SQLite file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use roadmap_backend::{Persistence, SqliteRepository};

use crate::remote::RestRepository;

pub const APP_NAME: &str = "roadmap";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapConfig {
    /// PostgREST base url of the hosted store
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    /// Signed-in user's token; the anon key is used without one
    pub access_token: Option<String>,
    pub db_path: PathBuf,
    pub log_dir: Option<PathBuf>,
    /// Insert the default catalog into an empty local database
    pub seed_defaults: bool,
}

impl Default for RoadmapConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            access_token: None,
            db_path: PathBuf::from("roadmap.db"),
            log_dir: None,
            seed_defaults: true,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl RoadmapConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let seed_defaults = match get("ROADMAP_SEED_DEFAULTS") {
            Some(v) => parse_flag(&v).unwrap_or_else(|| {
                log::warn!("Ignoring ROADMAP_SEED_DEFAULTS={}", v);
                defaults.seed_defaults
            }),
            None => defaults.seed_defaults,
        };

        Self {
            api_url: get("ROADMAP_API_URL"),
            api_key: get("ROADMAP_API_KEY"),
            access_token: get("ROADMAP_ACCESS_TOKEN"),
            db_path: get("ROADMAP_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            log_dir: get("ROADMAP_LOG_DIR").map(PathBuf::from),
            seed_defaults,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        serde_json::from_str(&content).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }

    pub fn uses_remote(&self) -> bool {
        self.api_url.is_some()
    }
}

/// Open the configured store
pub async fn open_backend(config: &RoadmapConfig) -> Result<Arc<dyn Persistence>, String> {
    if let Some(url) = &config.api_url {
        let key = config
            .api_key
            .clone()
            .ok_or_else(|| "ROADMAP_API_KEY is required with ROADMAP_API_URL".to_string())?;
        let mut repo = RestRepository::new(url.clone(), key);
        if let Some(token) = &config.access_token {
            repo = repo.with_access_token(token.clone());
        }
        log::info!("Using hosted store at {}", url);
        return Ok(Arc::new(repo));
    }

    let repo = SqliteRepository::open(&config.db_path).await.map_err(|e| e.to_string())?;
    if config.seed_defaults {
        let seeded = repo.seed_defaults().await.map_err(|e| e.to_string())?;
        if seeded > 0 {
            log::info!("Seeded {} default problems", seeded);
        }
    }
    log::info!("Using local store at {}", config.db_path.display());
    Ok(Arc::new(repo))
}

/// Start file logging when a log directory is configured
pub fn init_logging(config: &RoadmapConfig) -> Result<(), String> {
    match &config.log_dir {
        Some(dir) => rolling_logger::init_logger(dir.clone(), APP_NAME),
        None => Ok(()),
    }
}
