//! Input configuration
//!
//! Stored as TOML under the user's config directory:
//!
//! ```toml
//! circle_pad_deadzone = 0.3
//! circle_pad_modifier = "Window/0/Keyboard/16"
//!
//! [controls]
//! pad_a = "Window/0/Keyboard/65"
//! pad_circle_up = "Gilrs/0/Gamepad/Axis LeftStickY+"
//! ```
//!
//! Missing values fall back to defaults, so a partial or empty file still
//! yields a working (if unbound) configuration.

use crate::mapping::{InputMapping, VirtualTarget, MAX_CIRCLE_PAD_POS};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "padcore";
const CONFIG_FILE: &str = "input.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No configuration directory available on this system")]
    NoConfigDir,
}

/// Everything the input core reads from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Input that scales the circle pad while held
    pub circle_pad_modifier: InputMapping,

    /// Circle pad scale applied while the modifier is held
    pub circle_pad_modifier_scale: f32,

    /// Radial deadzone of the circle pad, in `[0, 1)`
    pub circle_pad_deadzone: f32,

    /// Circle pad magnitude at full deflection, in console units
    pub max_circle_pad: i16,

    pub detect_threshold: f32,

    pub tick_period_ms: u64,

    /// Physical input bound to each virtual target
    pub controls: BTreeMap<VirtualTarget, InputMapping>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            circle_pad_modifier: InputMapping::default(),
            circle_pad_modifier_scale: 0.5,
            circle_pad_deadzone: 0.3,
            max_circle_pad: MAX_CIRCLE_PAD_POS,
            detect_threshold: 0.8,
            tick_period_ms: 16,
            controls: BTreeMap::new(),
        }
    }
}

impl InputConfig {
    /// Keyboard layout shipped as the initial configuration
    pub fn default_bindings() -> Self {
        let keys: [(VirtualTarget, u32); VirtualTarget::COUNT] = [
            (VirtualTarget::A, 65),           // A
            (VirtualTarget::B, 83),           // S
            (VirtualTarget::X, 90),           // Z
            (VirtualTarget::Y, 88),           // X
            (VirtualTarget::L, 81),           // Q
            (VirtualTarget::R, 87),           // W
            (VirtualTarget::ZL, 49),          // 1
            (VirtualTarget::ZR, 50),          // 2
            (VirtualTarget::Start, 77),       // M
            (VirtualTarget::Select, 78),      // N
            (VirtualTarget::Home, 66),        // B
            (VirtualTarget::DUp, 84),         // T
            (VirtualTarget::DDown, 71),       // G
            (VirtualTarget::DLeft, 70),       // F
            (VirtualTarget::DRight, 72),      // H
            (VirtualTarget::CUp, 73),         // I
            (VirtualTarget::CDown, 75),       // K
            (VirtualTarget::CLeft, 74),       // J
            (VirtualTarget::CRight, 76),      // L
            (VirtualTarget::CircleUp, 38),    // Up
            (VirtualTarget::CircleDown, 40),  // Down
            (VirtualTarget::CircleLeft, 37),  // Left
            (VirtualTarget::CircleRight, 39), // Right
        ];

        Self {
            controls: keys
                .into_iter()
                .map(|(target, code)| (target, InputMapping::keyboard(code)))
                .collect(),
            circle_pad_modifier: InputMapping::keyboard(68), // D
            ..Self::default()
        }
    }

    /// Positional mapping list, one entry per [`VirtualTarget::ALL`] slot
    pub fn input_mappings(&self) -> Vec<InputMapping> {
        VirtualTarget::ALL
            .iter()
            .map(|target| self.controls.get(target).cloned().unwrap_or_default())
            .collect()
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// `<config dir>/padcore/input.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading input config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: InputConfig = toml::from_str(&content)?;
        info!(
            "Loaded input config with {} bound controls",
            config.controls.len()
        );
        Ok(config)
    }

    /// Loads `path`, falling back to the default bindings if it is missing or broken
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No config at {}, using default bindings", path.display());
            return Self::default_bindings();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Unable to read input config: {}", e);
                Self::default_bindings()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_error)?;
        info!("Input config saved to {}", path.display());
        Ok(())
    }
}

/// Supplies the configuration the core reads at init and reload
pub trait SettingsProvider: Send + Sync {
    fn current(&self) -> InputConfig;
}

/// In-memory settings shared between the UI side and the input core
#[derive(Debug, Default)]
pub struct SettingsPortal {
    config: RwLock<InputConfig>,
}

impl SettingsPortal {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Replaces the whole configuration; takes effect on the next reload
    pub fn write(&self, config: InputConfig) {
        *self.config.write() = config;
    }

    /// Rebinds one target; takes effect on the next reload
    pub fn bind(&self, target: VirtualTarget, mapping: InputMapping) {
        debug!("Binding {} to {}", target, mapping);
        self.config.write().controls.insert(target, mapping);
    }
}

impl SettingsProvider for SettingsPortal {
    fn current(&self) -> InputConfig {
        self.config.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_uses_defaults() {
        let config: InputConfig = toml::from_str(
            r#"
            circle_pad_deadzone = 0.1

            [controls]
            pad_a = "Window/0/Keyboard/65"
            pad_circle_up = "Gilrs/0/Gamepad/Axis LeftStickY+"
            "#,
        )
        .unwrap();

        assert_eq!(config.circle_pad_deadzone, 0.1);
        assert_eq!(config.detect_threshold, 0.8);
        assert_eq!(config.max_circle_pad, MAX_CIRCLE_PAD_POS);
        assert_eq!(config.controls.len(), 2);
        assert!(config.circle_pad_modifier.is_unbound());
    }

    #[test]
    fn input_mappings_are_positional() {
        let mut config = InputConfig::default();
        config
            .controls
            .insert(VirtualTarget::Start, InputMapping::keyboard(13));

        let mappings = config.input_mappings();
        assert_eq!(mappings.len(), VirtualTarget::COUNT);
        assert_eq!(
            mappings[VirtualTarget::Start as usize],
            InputMapping::keyboard(13)
        );
        assert!(mappings[VirtualTarget::A as usize].is_unbound());
    }

    #[test]
    fn unknown_target_is_rejected() {
        let result: Result<InputConfig, _> = toml::from_str(
            r#"
            [controls]
            pad_turbo = "Window/0/Keyboard/65"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn save_and_load_preserve_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = InputConfig::default_bindings();

        config.save(&path).unwrap();
        assert_eq!(InputConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_falls_back_to_default_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let config = InputConfig::load_or_default(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, InputConfig::default_bindings());
    }

    #[test]
    fn portal_bind_updates_snapshot() {
        let portal = SettingsPortal::new(InputConfig::default());
        portal.bind(VirtualTarget::A, InputMapping::gamepad(0, "Button South"));
        assert_eq!(
            portal.current().controls[&VirtualTarget::A],
            InputMapping::gamepad(0, "Button South")
        );
    }
}
