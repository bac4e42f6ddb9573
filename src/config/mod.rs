//! Configuration management for the joystick controller
//!
//! Handles loading, validating and saving YAML scene files: the viewport, the
//! named listening elements, and the joysticks placed on them.

pub mod anchor;
pub mod joystick;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

pub use anchor::{Anchor, AnchorError};
pub use joystick::{JoystickConfig, JoystickOptions, MouseButton, MouseButtonSetting};

/// Root scene file structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementConfig>,
    #[serde(default)]
    pub joysticks: Vec<JoystickEntry>,
}

/// Size of the hosting window in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f64,
    #[serde(default = "default_viewport_height")]
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

/// Named rectangular listening surface (e.g. the left half of the screen)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ElementConfig {
    pub name: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// One joystick in the scene
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JoystickEntry {
    pub name: String,
    #[serde(default)]
    pub options: JoystickOptions,
}

impl SceneConfig {
    /// Load configuration from file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml_str(&contents)
            .with_context(|| format!("Invalid scene config: {}", path.display()))
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: SceneConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            anyhow::bail!(
                "Viewport must have a positive size (got {}x{})",
                self.viewport.width,
                self.viewport.height
            );
        }

        let mut element_names = HashSet::new();
        for element in &self.elements {
            if element.name.is_empty() {
                anyhow::bail!("Element name cannot be empty");
            }
            if !element_names.insert(element.name.as_str()) {
                anyhow::bail!("Duplicate element name: {}", element.name);
            }
            if !(element.width >= 0.0 && element.height >= 0.0) {
                anyhow::bail!("Element '{}' has a negative size", element.name);
            }
        }

        let mut joystick_names = HashSet::new();
        for joystick in &self.joysticks {
            if joystick.name.is_empty() {
                anyhow::bail!("Joystick name cannot be empty");
            }
            if !joystick_names.insert(joystick.name.as_str()) {
                anyhow::bail!("Duplicate joystick name: {}", joystick.name);
            }
            if let Some(target) = &joystick.options.dynamic_position_target {
                if !element_names.contains(target.as_str()) {
                    anyhow::bail!(
                        "Joystick '{}' references unknown dynamic_position_target '{}'",
                        joystick.name,
                        target
                    );
                }
            }
        }

        Ok(())
    }

    /// Built-in scene: a dynamic stick on the left half, a fixed one on the right
    pub fn default_scene() -> Self {
        let viewport = ViewportConfig::default();
        Self {
            viewport,
            elements: vec![ElementConfig {
                name: "left-half".to_string(),
                left: 0.0,
                top: 0.0,
                width: viewport.width / 2.0,
                height: viewport.height,
            }],
            joysticks: vec![
                JoystickEntry {
                    name: "move".to_string(),
                    options: JoystickOptions {
                        dynamic_position: Some(true),
                        dynamic_position_target: Some("left-half".to_string()),
                        ..Default::default()
                    },
                },
                JoystickEntry {
                    name: "aim".to_string(),
                    options: JoystickOptions {
                        x: Some(Anchor::Percent(85.0)),
                        y: Some(Anchor::Percent(25.0)),
                        distortion: Some(true),
                        ..Default::default()
                    },
                },
            ],
        }
    }
}

// Default value functions
fn default_viewport_width() -> f64 { 1280.0 }
fn default_viewport_height() -> f64 { 720.0 }
