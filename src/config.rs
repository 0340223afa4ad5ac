//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/fleettree/fleettree.toml`
//! 3. Local config: `<dir>/.fleettree.toml` (usually the working directory)
//! 4. Environment variables: `FLEETTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{EntityKind, OrphanPolicy};

/// Tree assembly and display settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeConfig {
    /// What to do with groups whose parent does not exist
    pub orphans: OrphanPolicy,
    /// Whether root groups start expanded
    pub expand_roots: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            orphans: OrphanPolicy::Drop,
            expand_roots: true,
        }
    }
}

/// Raw tree config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeConfig {
    pub orphans: Option<OrphanPolicy>,
    pub expand_roots: Option<bool>,
}

impl TreeConfig {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawTreeConfig) -> Self {
        Self {
            orphans: overlay.orphans.unwrap_or(self.orphans),
            expand_roots: overlay.expand_roots.unwrap_or(self.expand_roots),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub records_file: Option<PathBuf>,
    pub default_kind: Option<EntityKind>,
    #[serde(default)]
    pub tree: RawTreeConfig,
}

/// Unified configuration for fleettree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// JSON file holding the entity records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_file: Option<PathBuf>,
    /// Kind the picker opens with
    pub default_kind: EntityKind,
    /// Tree settings
    pub tree: TreeConfig,
}

/// Get the XDG config directory for fleettree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "fleettree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("fleettree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".fleettree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand `~`, `$VAR` and `${VAR}` in the records path.
    fn expand_paths(&mut self) {
        if let Some(path) = &self.records_file {
            let raw = path.to_string_lossy().to_string();
            let expanded = shellexpand::full(&raw)
                .map(|s| s.into_owned())
                .unwrap_or(raw);
            self.records_file = Some(PathBuf::from(expanded));
        }
    }

    /// Overlay wins for every value it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            records_file: overlay
                .records_file
                .clone()
                .or_else(|| self.records_file.clone()),
            default_kind: overlay.default_kind.unwrap_or(self.default_kind),
            tree: self.tree.merge(&overlay.tree),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory searched for `.fleettree.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/fleettree/fleettree.toml`
    /// 3. Local config: `<local_dir>/.fleettree.toml`
    /// 4. Environment variables: `FLEETTREE_*` prefix, `__` for nesting
    ///    (e.g. `FLEETTREE_TREE__ORPHANS=promote`)
    pub fn load(local_dir: Option<&Path>) -> ApplicationResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current, env_source())?;
        current.expand_paths();

        Ok(current)
    }

    /// Load a single config file on top of the defaults.
    pub fn from_file(path: &Path) -> ApplicationResult<Self> {
        let raw = load_raw_settings(path)?;
        let mut settings = Self::default().merge_with(&raw);
        settings.expand_paths();
        Ok(settings)
    }

    /// Apply FLEETTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("records_file") {
            settings.records_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("default_kind") {
            settings.default_kind = val.parse()?;
        }
        if let Ok(val) = config.get_string("tree.orphans") {
            settings.tree.orphans = val.parse()?;
        }
        if let Ok(val) = config.get_bool("tree.expand_roots") {
            settings.tree.expand_roots = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# fleettree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/fleettree/fleettree.toml
#   Local:  ./.fleettree.toml
#   Env:    FLEETTREE_* environment variables (FLEETTREE_TREE__ORPHANS=promote)

# JSON array of entity records
# records_file = "~/fleet/records.json"

# Kind the picker opens with: vehicle, driver or group
# default_kind = "group"

[tree]
# Groups whose parent id does not exist: "drop" them or "promote" them to roots
# orphans = "drop"

# Start with root groups expanded
# expand_roots = true
"#
        .to_string()
    }
}

/// `FLEETTREE_` prefix, `__` between nested keys: `FLEETTREE_TREE__ORPHANS`.
fn env_source() -> Environment {
    Environment::with_prefix("FLEETTREE")
        .prefix_separator("_")
        .separator("__")
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
