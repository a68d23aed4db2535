// Configuration management
//
// HAL settings persisted as TOML: video, input bindings, hotkeys and extra
// named palettes. Every section falls back to its defaults when absent.

use crate::display::framebuffer::{
    DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH, MAX_SCREEN_HEIGHT, MAX_SCREEN_WIDTH,
};
use crate::display::palette::{
    PaletteLibrary, PaletteRegistry, PixelFormat, DEFAULT_PALETTE, PALETTE_SIZE,
};
use crate::error::{HalError, Result};
use crate::input::{HotkeyConfig, InputConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file path
pub const CONFIG_FILE: &str = "hal_config.toml";

/// Largest supported integer window scale
pub const MAX_WINDOW_SCALE: u32 = 8;

/// HAL configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HalConfig {
    /// Video settings
    pub video: VideoConfig,

    /// Input settings
    pub input: InputConfig,

    /// Hotkeys
    pub hotkeys: HotkeyConfig,

    /// Extra palettes by name
    pub palettes: BTreeMap<String, PaletteConfig>,
}

/// Video configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Logical screen width (1-256)
    pub logical_width: usize,

    /// Logical screen height (1-256)
    pub logical_height: usize,

    /// Initial window scale (1-8)
    pub window_scale: u32,

    /// Enable VSync
    pub vsync: bool,

    /// Target FPS
    pub fps: u32,

    /// Start in fullscreen
    pub fullscreen: bool,

    /// Palette selected at startup
    pub palette: String,

    /// Display-native pixel packing ("rgba8888" or "rgb565")
    pub pixel_format: String,

    /// Screenshot directory
    pub screenshot_directory: PathBuf,
}

impl VideoConfig {
    /// Parsed pixel format
    pub fn pixel_format(&self) -> Result<PixelFormat> {
        PixelFormat::from_name(&self.pixel_format).ok_or_else(|| {
            HalError::Config(format!("Unknown pixel format: {}", self.pixel_format))
        })
    }

    /// Initial window size in pixels
    pub fn window_size(&self) -> (u32, u32) {
        (
            self.logical_width as u32 * self.window_scale,
            self.logical_height as u32 * self.window_scale,
        )
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            logical_width: DEFAULT_SCREEN_WIDTH,
            logical_height: DEFAULT_SCREEN_HEIGHT,
            window_scale: 4,
            vsync: true,
            fps: 60,
            fullscreen: false,
            palette: DEFAULT_PALETTE.to_string(),
            pixel_format: "rgba8888".to_string(),
            screenshot_directory: PathBuf::from("screenshots"),
        }
    }
}

/// A named palette: up to 256 colors as 0xRRGGBB
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteConfig {
    pub colors: Vec<u32>,
}

impl HalConfig {
    /// Parse and validate a configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: HalConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// The validated configuration
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Save configuration to a TOML file
    ///
    /// # Arguments
    /// * `path` - Path where the TOML configuration file will be saved
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Load configuration from file, or fall back to defaults
    ///
    /// When the file is missing the defaults are written to it. A file
    /// that exists but fails to parse or validate is left untouched.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(HalError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No configuration at {}, using defaults", path.display());
                let config = Self::default();
                if let Err(e) = config.save_to_file(path) {
                    log::warn!("Could not save default configuration: {}", e);
                }
                config
            }
            Err(e) => {
                log::warn!("Could not load configuration ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Check every setting, reporting the first problem found
    pub fn validate(&self) -> Result<()> {
        let video = &self.video;
        if video.logical_width == 0
            || video.logical_height == 0
            || video.logical_width > MAX_SCREEN_WIDTH
            || video.logical_height > MAX_SCREEN_HEIGHT
        {
            return Err(HalError::Config(format!(
                "Logical screen {}x{} outside 1x1..{}x{}",
                video.logical_width, video.logical_height, MAX_SCREEN_WIDTH, MAX_SCREEN_HEIGHT
            )));
        }
        if !(1..=MAX_WINDOW_SCALE).contains(&video.window_scale) {
            return Err(HalError::Config(format!(
                "window_scale must be 1-{} (got {})",
                MAX_WINDOW_SCALE, video.window_scale
            )));
        }
        if video.fps == 0 {
            return Err(HalError::Config("fps must be at least 1".to_string()));
        }
        video.pixel_format()?;

        for (name, palette) in &self.palettes {
            if palette.colors.len() > PALETTE_SIZE {
                return Err(HalError::Config(format!(
                    "Palette '{}' has {} colors (max {})",
                    name,
                    palette.colors.len(),
                    PALETTE_SIZE
                )));
            }
        }
        if self.palette_library().lookup(&video.palette).is_none() {
            return Err(HalError::Config(format!(
                "Startup palette '{}' is not defined",
                video.palette
            )));
        }

        self.input.to_key_bindings()?;
        self.input.to_joystick_mapping()?;
        self.hotkeys.to_hotkeys()?;
        Ok(())
    }

    /// Built-in palettes plus the configured ones
    pub fn palette_library(&self) -> PaletteLibrary {
        let mut library = PaletteLibrary::new();
        for (name, palette) in &self.palettes {
            library.register(name, &palette.colors);
        }
        library
    }
}
