//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/tagtree/tagtree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `TAGTREE_*` prefix, `__` between sections
//!    (e.g. `TAGTREE_RENDER__INDENT=2`)

use std::path::{Path, PathBuf};

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::domain::{AssemblerOptions, TextMode, DEFAULT_INDENT};

type LayeredBuilder = ConfigBuilder<DefaultState>;

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderOptions {
    /// Spaces per nesting level in the markup rendering
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }
}

/// Unified configuration for tagtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub assembler: AssemblerOptions,
    pub render: RenderOptions,
}

/// Get the XDG config directory for tagtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tagtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("tagtree.toml"))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file that must exist; it overrides the global file
    #[instrument(level = "debug")]
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut builder = Self::defaults_builder()?;

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "using global config");
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("TAGTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Parse settings from TOML text on top of the compiled defaults.
    pub fn from_toml(content: &str) -> Result<Self, ApplicationError> {
        let config = Self::defaults_builder()?
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    fn defaults_builder() -> Result<LayeredBuilder, ApplicationError> {
        let defaults = Settings::default();
        let text_mode = match defaults.assembler.text_mode {
            TextMode::Replace => "replace",
            TextMode::Append => "append",
        };
        Config::builder()
            .set_default("assembler.strict_end_tags", defaults.assembler.strict_end_tags)
            .map_err(config_err)?
            .set_default("assembler.log_unknown_tags", defaults.assembler.log_unknown_tags)
            .map_err(config_err)?
            .set_default("assembler.text_mode", text_mode)
            .map_err(config_err)?
            .set_default("render.indent", defaults.render.indent as i64)
            .map_err(config_err)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# tagtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/tagtree/tagtree.toml
#   Explicit: tagtree --config <FILE>
#   Env:      TAGTREE_* environment variables, e.g. TAGTREE_RENDER__INDENT=2

[assembler]
# Fail when a close event names a different element than the open one
# strict_end_tags = false

# Log element names that fall back to the default kind
# log_unknown_tags = true

# How repeated text chunks of one element combine: "replace" or "append"
# text_mode = "replace"

[render]
# Spaces per nesting level in `tagtree render`
# indent = 3
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
