// Global configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::presets::{PresetOptions, TimeoutFlag, default_user_agent};
use crate::restream::api::DEFAULT_API_URL;

/// Stream name go2rtc uses for the birdseye feed.
pub const BIRDSEYE_NAME: &str = "birdseye";

/// An ffmpeg argument setting: either a single string (a preset id or a
/// space separated argument string) or an explicit list of arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgsValue {
    Text(String),
    List(Vec<String>),
}

impl Default for ArgsValue {
    fn default() -> Self {
        ArgsValue::List(Vec::new())
    }
}

impl ArgsValue {
    pub fn text(value: &str) -> Self {
        ArgsValue::Text(value.to_string())
    }

    /// The value as a preset id. Lists are never presets.
    pub fn preset(&self) -> Option<&str> {
        match self {
            ArgsValue::Text(s) => Some(s),
            ArgsValue::List(_) => None,
        }
    }

    /// The value taken literally as arguments.
    pub fn to_args(&self) -> Vec<String> {
        match self {
            ArgsValue::Text(s) => s.split(' ').map(str::to_string).collect(),
            ArgsValue::List(list) => list.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ffmpeg: FfmpegConfig,

    #[serde(default)]
    pub restream: RestreamConfig,

    #[serde(default)]
    pub birdseye: BirdseyeConfig,

    #[serde(default)]
    pub presets: PresetsConfig,

    /// Cameras, in declaration order
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfmpegConfig {
    #[serde(default = "default_global_args")]
    pub global_args: ArgsValue,

    /// Hardware acceleration: a preset such as `preset-vaapi`, or raw args
    #[serde(default)]
    pub hwaccel_args: ArgsValue,

    #[serde(default = "default_input_args")]
    pub input_args: ArgsValue,

    #[serde(default)]
    pub output_args: OutputArgsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputArgsConfig {
    #[serde(default = "default_detect_args")]
    pub detect: ArgsValue,

    #[serde(default = "default_record_args")]
    pub record: ArgsValue,

    #[serde(default = "default_rtmp_args")]
    pub rtmp: ArgsValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestreamConfig {
    /// Also publish the birdseye composite through the relay
    #[serde(default)]
    pub birdseye: bool,

    /// go2rtc stream registration endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirdseyeConfig {
    #[serde(default = "default_birdseye_width")]
    pub width: u32,

    #[serde(default = "default_birdseye_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetsConfig {
    /// User agent sent by HTTP/RTSP input presets
    #[serde(default)]
    pub user_agent: Option<String>,

    /// RTSP timeout flag; detected from the installed ffmpeg when unset
    #[serde(default)]
    pub timeout_flag: Option<TimeoutFlag>,
}

impl PresetsConfig {
    pub fn options(&self) -> PresetOptions {
        PresetOptions {
            user_agent: self.user_agent.clone().unwrap_or_else(default_user_agent),
            timeout_flag: self.timeout_flag.unwrap_or_else(TimeoutFlag::detect),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputRole {
    Detect,
    Record,
    Rtmp,
    Restream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    #[default]
    Copy,
    H264,
    H265,
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VideoCodec::Copy => "copy",
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Copy,
    Aac,
    Opus,
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AudioCodec::Copy => "copy",
            AudioCodec::Aac => "aac",
            AudioCodec::Opus => "opus",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub name: String,

    pub ffmpeg: CameraFfmpegConfig,

    #[serde(default)]
    pub restream: CameraRestreamConfig,

    #[serde(default)]
    pub detect: DetectConfig,

    #[serde(default)]
    pub record: RecordConfig,

    #[serde(default)]
    pub rtmp: RtmpConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraFfmpegConfig {
    #[serde(default)]
    pub inputs: Vec<CameraInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraInput {
    pub path: String,

    #[serde(default)]
    pub roles: Vec<InputRole>,

    /// Per-input overrides of the global ffmpeg args
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_args: Option<ArgsValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hwaccel_args: Option<ArgsValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_args: Option<ArgsValue>,
}

impl CameraInput {
    pub fn has_role(&self, role: InputRole) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRestreamConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub video_encoding: VideoCodec,

    #[serde(default = "default_audio_encoding")]
    pub audio_encoding: Vec<AudioCodec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    #[serde(default = "default_detect_fps")]
    pub fps: u32,

    #[serde(default = "default_detect_width")]
    pub width: u32,

    #[serde(default = "default_detect_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtmpConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_global_args() -> ArgsValue {
    ArgsValue::text("-hide_banner -loglevel warning")
}

fn default_input_args() -> ArgsValue {
    ArgsValue::text("preset-rtsp-generic")
}

fn default_detect_args() -> ArgsValue {
    ArgsValue::text("-f rawvideo -pix_fmt yuv420p")
}

fn default_record_args() -> ArgsValue {
    ArgsValue::text("preset-record-generic")
}

fn default_rtmp_args() -> ArgsValue {
    ArgsValue::text("preset-rtmp-generic")
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_birdseye_width() -> u32 {
    1280
}

fn default_birdseye_height() -> u32 {
    720
}

fn default_audio_encoding() -> Vec<AudioCodec> {
    vec![AudioCodec::Copy]
}

fn default_detect_fps() -> u32 {
    5
}

fn default_detect_width() -> u32 {
    1280
}

fn default_detect_height() -> u32 {
    720
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            global_args: default_global_args(),
            hwaccel_args: ArgsValue::default(), // No hardware acceleration
            input_args: default_input_args(),
            output_args: OutputArgsConfig::default(),
        }
    }
}

impl Default for OutputArgsConfig {
    fn default() -> Self {
        Self {
            detect: default_detect_args(),
            record: default_record_args(),
            rtmp: default_rtmp_args(),
        }
    }
}

impl Default for RestreamConfig {
    fn default() -> Self {
        Self {
            birdseye: false,
            api_url: default_api_url(),
        }
    }
}

impl Default for BirdseyeConfig {
    fn default() -> Self {
        Self {
            width: default_birdseye_width(),
            height: default_birdseye_height(),
        }
    }
}

impl Default for CameraRestreamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            video_encoding: VideoCodec::Copy,
            audio_encoding: default_audio_encoding(),
        }
    }
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            fps: default_detect_fps(),
            width: default_detect_width(),
            height: default_detect_height(),
        }
    }
}

impl Default for RtmpConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("ffrelay");

        Ok(config_dir.join("config.toml"))
    }

    /// Parse and validate a TOML document
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from disk, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();

            // Try to save the default config, but don't fail if we can't
            if let Err(e) = config.save() {
                tracing::warn!("Could not create default config file: {:#}", e);
                tracing::warn!(
                    "Using built-in defaults. Run 'ffrelay init-config' to create a config file."
                );
            }

            Ok(config)
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Check if config file exists
    pub fn exists() -> bool {
        Self::config_path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Create a default config file if it doesn't exist
    pub fn ensure_default() -> Result<()> {
        if !Self::exists() {
            let config = Config::default();
            config.save()?;
        }
        Ok(())
    }

    /// Reject settings that parse but cannot produce valid streams
    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.restream.api_url).is_err() {
            return Err(ConfigError::RelayEndpoint(self.restream.api_url.clone()));
        }

        if self.restream.birdseye && (self.birdseye.width == 0 || self.birdseye.height == 0) {
            return Err(ConfigError::BirdseyeSize {
                width: self.birdseye.width,
                height: self.birdseye.height,
            });
        }

        let mut seen = HashSet::new();
        for camera in &self.cameras {
            if !seen.insert(camera.name.as_str()) {
                return Err(ConfigError::DuplicateCamera(camera.name.clone()));
            }
            if self.restream.birdseye && camera.name == BIRDSEYE_NAME {
                return Err(ConfigError::ReservedCameraName(camera.name.clone()));
            }
            if camera.ffmpeg.inputs.is_empty() {
                return Err(ConfigError::NoInputs(camera.name.clone()));
            }
            let detect = &camera.detect;
            if detect.fps == 0 || detect.width == 0 || detect.height == 0 {
                return Err(ConfigError::DetectSettings {
                    camera: camera.name.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn camera(&self, name: &str) -> Option<&CameraConfig> {
        self.cameras.iter().find(|c| c.name == name)
    }
}
