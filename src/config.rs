// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// Provides sensible defaults if the config file is missing or has errors.
// Enumerated options are kept as strings in the file and resolved through
// the getters below, which warn and fall back on unknown values.

use anyhow::{Context, Result};
use ash::vk;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::RenderError;
use crate::frame::{RecordSync, UndefinedExtentPolicy};
use crate::settings::RenderSettings;

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    pub debug: DebugConfig,
    pub paths: PathsConfig,
}

/// Window settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Frame Loop".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }
}

/// Graphics settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub frames_in_flight: usize,
    pub clear_color: [f32; 4],
    pub present_mode: String,
    pub msaa: bool,
    pub sample_count: u32,
    pub record_sync: String,
    pub undefined_extent: String,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: 3,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            present_mode: "immediate".to_string(),
            msaa: false,
            sample_count: 4,
            record_sync: "device_idle".to_string(),
            undefined_extent: "error".to_string(),
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
    pub show_fps: bool,
    pub log_to_file: bool,
    pub log_file: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: true,
            show_fps: true,
            log_to_file: false,
            log_file: "frameloop.log".to_string(),
        }
    }
}

/// Locations of runtime inputs
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub shader_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from("shaders"),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {:#}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Frames in flight, rejecting an empty ring
    pub fn frames_in_flight(&self) -> Result<usize, RenderError> {
        match self.graphics.frames_in_flight {
            0 => Err(RenderError::NoFrameSlots),
            n => Ok(n),
        }
    }

    /// Get the preferred present mode as Vulkan enum
    pub fn present_mode(&self) -> vk::PresentModeKHR {
        match self.graphics.present_mode.to_lowercase().as_str() {
            "immediate" => vk::PresentModeKHR::IMMEDIATE,
            "mailbox" => vk::PresentModeKHR::MAILBOX,
            "fifo" => vk::PresentModeKHR::FIFO,
            "fifo_relaxed" => vk::PresentModeKHR::FIFO_RELAXED,
            _ => {
                log::warn!(
                    "Unknown present mode '{}', defaulting to IMMEDIATE",
                    self.graphics.present_mode
                );
                vk::PresentModeKHR::IMMEDIATE
            }
        }
    }

    pub fn record_sync(&self) -> RecordSync {
        match self.graphics.record_sync.to_lowercase().as_str() {
            "device_idle" => RecordSync::DeviceIdle,
            "image_fence" => RecordSync::ImageFence,
            other => {
                log::warn!("Unknown record_sync '{}', defaulting to device_idle", other);
                RecordSync::DeviceIdle
            }
        }
    }

    pub fn undefined_extent(&self) -> UndefinedExtentPolicy {
        match self.graphics.undefined_extent.to_lowercase().as_str() {
            "error" => UndefinedExtentPolicy::Error,
            "window" => UndefinedExtentPolicy::Window,
            other => {
                log::warn!("Unknown undefined_extent '{}', defaulting to error", other);
                UndefinedExtentPolicy::Error
            }
        }
    }

    /// Initial render settings as configured
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings::new(self.graphics.msaa, self.graphics.sample_count)
    }

    pub fn shader_path(&self, file: &str) -> PathBuf {
        self.paths.shader_dir.join(file)
    }
}
