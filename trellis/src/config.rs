//! Global overlay configuration.

use std::collections::HashMap;

use serde::Deserialize;

use crate::animation::AnimationBuilder;

/// Visual mode an overlay renders in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Ios,
    #[default]
    Md,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Ios => "ios",
            Mode::Md => "md",
        }
    }
}

/// Named configuration slots for animation overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigKey {
    ModalEnter,
    ModalLeave,
    PopoverEnter,
    PopoverLeave,
    AlertEnter,
    AlertLeave,
    ActionSheetEnter,
    ActionSheetLeave,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ModalEnter => "modalEnter",
            ConfigKey::ModalLeave => "modalLeave",
            ConfigKey::PopoverEnter => "popoverEnter",
            ConfigKey::PopoverLeave => "popoverLeave",
            ConfigKey::AlertEnter => "alertEnter",
            ConfigKey::AlertLeave => "alertLeave",
            ConfigKey::ActionSheetEnter => "actionSheetEnter",
            ConfigKey::ActionSheetLeave => "actionSheetLeave",
        }
    }
}

/// Configuration shared by every overlay of a controller.
///
/// `mode` and `animated` are the defaults for overlays that don't set their
/// own. Animation overrides can only be installed in code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub animated: bool,
    #[serde(skip)]
    animations: HashMap<ConfigKey, AnimationBuilder>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            animated: true,
            animations: HashMap::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `mode`/`animated` from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the default mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set whether overlays animate by default.
    pub fn with_animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    /// Install an animation override for `key`.
    pub fn with_animation(mut self, key: ConfigKey, builder: AnimationBuilder) -> Self {
        self.animations.insert(key, builder);
        self
    }

    /// The override for `key`, or `fallback` when none is installed.
    pub fn get(&self, key: ConfigKey, fallback: &AnimationBuilder) -> AnimationBuilder {
        self.animations
            .get(&key)
            .cloned()
            .unwrap_or_else(|| fallback.clone())
    }
}
