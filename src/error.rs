// HAL error types
//
// A single error enum shared by the display pipeline, the input layer and
// the host backend.

use std::io;

/// Errors reported by the HAL
#[derive(Debug)]
pub enum HalError {
    /// Surface, texture or pixel-format allocation failed (fatal at startup)
    ResourceInit(String),

    /// The requested palette is not registered
    PaletteNotFound(String),

    /// The display surface could not be locked for compositing
    SurfaceLock(String),

    /// The host failed to present the composited frame
    Present(String),

    /// Requested logical screen size is zero or exceeds the backbuffer capacity
    InvalidScreenSize { width: usize, height: usize },

    /// Configuration or input log could not be parsed or validated
    Config(String),

    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),
}

impl HalError {
    /// Whether the error only costs the current frame
    ///
    /// Transient errors drop the frame; the next frame retries normally.
    pub fn is_transient(&self) -> bool {
        matches!(self, HalError::SurfaceLock(_) | HalError::Present(_))
    }
}

impl std::fmt::Display for HalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HalError::ResourceInit(msg) => write!(f, "Resource initialization error: {}", msg),
            HalError::PaletteNotFound(name) => write!(f, "Palette not found: {}", name),
            HalError::SurfaceLock(msg) => write!(f, "Surface lock error: {}", msg),
            HalError::Present(msg) => write!(f, "Present error: {}", msg),
            HalError::InvalidScreenSize { width, height } => {
                write!(f, "Invalid logical screen size: {}x{}", width, height)
            }
            HalError::Config(msg) => write!(f, "Configuration error: {}", msg),
            HalError::Io(e) => write!(f, "I/O error: {}", e),
            HalError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
        }
    }
}

impl std::error::Error for HalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HalError::Io(e) => Some(e),
            HalError::PngEncoding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for HalError {
    fn from(e: io::Error) -> Self {
        HalError::Io(e)
    }
}

impl From<png::EncodingError> for HalError {
    fn from(e: png::EncodingError) -> Self {
        HalError::PngEncoding(e)
    }
}

impl From<toml::de::Error> for HalError {
    fn from(e: toml::de::Error) -> Self {
        HalError::Config(format!("Failed to parse config file: {}", e))
    }
}

impl From<toml::ser::Error> for HalError {
    fn from(e: toml::ser::Error) -> Self {
        HalError::Config(format!("Failed to serialize config: {}", e))
    }
}

impl From<serde_json::Error> for HalError {
    fn from(e: serde_json::Error) -> Self {
        HalError::Config(format!("Serialization error: {}", e))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, HalError>;
