use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::WebcamError;
use super::media_models::SourceSelection;

/// A playback element dimension: a pixel length (any JSON number) or a raw
/// CSS length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(f64),
    Css(String),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(px) => write!(f, "{}", px),
            Self::Css(css) => f.write_str(css),
        }
    }
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Self::Pixels(f64::from(px))
    }
}

impl From<f64> for Dimension {
    fn from(px: f64) -> Self {
        Self::Pixels(px)
    }
}

impl From<&str> for Dimension {
    fn from(css: &str) -> Self {
        Self::Css(css.to_string())
    }
}

/// Still-image encoding used by screenshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScreenshotFormat {
    #[default]
    #[serde(rename = "image/webp")]
    Webp,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl ScreenshotFormat {
    pub const ALL: [ScreenshotFormat; 3] = [Self::Webp, Self::Png, Self::Jpeg];

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Webp => "image/webp",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            Self::Webp => image::ImageFormat::WebP,
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for ScreenshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

impl FromStr for ScreenshotFormat {
    type Err = WebcamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.mime_type() == s)
            .ok_or_else(|| {
                WebcamError::ConfigurationFailed(format!("unsupported screenshot format: {}", s))
            })
    }
}

/// Structured camera-facing hint, e.g. `{ "exact": "environment" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacingModeConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal: Option<String>,
}

/// Camera-facing hint passed through to the video constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacingMode {
    Named(String),
    Constraint(FacingModeConstraint),
}

impl FacingMode {
    pub fn user() -> Self {
        Self::Named("user".into())
    }

    pub fn environment() -> Self {
        Self::Named("environment".into())
    }
}

impl Default for FacingMode {
    fn default() -> Self {
        Self::user()
    }
}

/// Configuration for a webcam widget. Fixed for the lifetime of a mount.
///
/// Field names serialize with the widget's camelCase option names
/// (`screenshotFormat`, `facingMode`, ...), so a JSON options object
/// deserializes directly. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebcamConfiguration {
    /// Include audio in the acquisition request (default: true).
    pub audio: bool,

    /// Mute the playback element (default: false).
    pub muted: bool,

    /// Playback element width (default: 640).
    pub width: Dimension,

    /// Playback element height (default: 480).
    pub height: Dimension,

    /// Encoding of screenshots (default: WebP).
    pub screenshot_format: ScreenshotFormat,

    /// Encoder quality hint in `0.0..=1.0`, used by lossy formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_quality: Option<f32>,

    /// CSS class passed through to the playback element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    /// Camera-facing hint (default: "user").
    pub facing_mode: FacingMode,

    /// Explicit audio device ID. Enumeration is skipped only when both
    /// sources are given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_source: Option<String>,

    /// Explicit video device ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_source: Option<String>,
}

impl WebcamConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        for (name, dimension) in [("width", &self.width), ("height", &self.height)] {
            match dimension {
                Dimension::Pixels(px) if !(px.is_finite() && *px > 0.0) => {
                    return Err(format!("{} must be positive, got {}", name, px))
                }
                Dimension::Css(css) if css.trim().is_empty() => {
                    return Err(format!("{} must not be empty", name))
                }
                _ => {}
            }
        }
        if let Some(quality) = self.screenshot_quality {
            if !(0.0..=1.0).contains(&quality) {
                return Err(format!("screenshot quality out of range: {}", quality));
            }
        }
        for (name, source) in [
            ("audio source", &self.audio_source),
            ("video source", &self.video_source),
        ] {
            if matches!(source, Some(id) if id.is_empty()) {
                return Err(format!("{} must not be empty", name));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON options object.
    pub fn from_json(json: &str) -> Result<Self, WebcamError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| WebcamError::ConfigurationFailed(format!("invalid options: {}", e)))?;
        config.validate().map_err(WebcamError::ConfigurationFailed)?;
        Ok(config)
    }

    /// Both explicit sources, if the configuration names them.
    pub fn explicit_sources(&self) -> Option<SourceSelection> {
        match (&self.audio_source, &self.video_source) {
            (Some(audio), Some(video)) => Some(SourceSelection {
                audio_source: Some(audio.clone()),
                video_source: Some(video.clone()),
            }),
            _ => None,
        }
    }
}

impl Default for WebcamConfiguration {
    fn default() -> Self {
        Self {
            audio: true,
            muted: false,
            width: Dimension::Pixels(640.0),
            height: Dimension::Pixels(480.0),
            screenshot_format: ScreenshotFormat::default(),
            screenshot_quality: None,
            class_name: None,
            facing_mode: FacingMode::default(),
            audio_source: None,
            video_source: None,
        }
    }
}
