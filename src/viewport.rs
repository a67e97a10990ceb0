use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Desktop window size used for the primary render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440,
            height: 900,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewportParseError {
    #[error("Invalid viewport format: expected WIDTHxHEIGHT (e.g., 1440x900)")]
    InvalidFormat,
    #[error("Invalid width: {0}")]
    InvalidWidth(String),
    #[error("Invalid height: {0}")]
    InvalidHeight(String),
    #[error("Viewport dimensions must be positive")]
    ZeroDimension,
}

impl FromStr for Viewport {
    type Err = ViewportParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or(ViewportParseError::InvalidFormat)?;
        if height.contains(['x', 'X']) {
            return Err(ViewportParseError::InvalidFormat);
        }

        let width: u32 = width
            .trim()
            .parse()
            .map_err(|_| ViewportParseError::InvalidWidth(width.to_string()))?;
        let height: u32 = height
            .trim()
            .parse()
            .map_err(|_| ViewportParseError::InvalidHeight(height.to_string()))?;

        if width == 0 || height == 0 {
            return Err(ViewportParseError::ZeroDimension);
        }

        Ok(Viewport { width, height })
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Browser context the helper opens: a plain desktop window or a named
/// Playwright device descriptor (user agent, touch, DPR, viewport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceProfile {
    Desktop(Viewport),
    Emulated(String),
}

impl DeviceProfile {
    pub fn mobile(device_name: impl Into<String>) -> Self {
        DeviceProfile::Emulated(device_name.into())
    }

    /// Value handed to the helper script; desktop renders pass `WIDTHxHEIGHT`.
    pub fn script_arg(&self) -> String {
        match self {
            DeviceProfile::Desktop(viewport) => viewport.to_string(),
            DeviceProfile::Emulated(name) => name.clone(),
        }
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        DeviceProfile::Desktop(Viewport::default())
    }
}
