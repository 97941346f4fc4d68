//! Configuration loading from TOML files and environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::action::LockCommand;
use crate::monitor::Thresholds;
use crate::sensor::SensorId;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub action: ActionConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What to run when movement crosses a threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Lock program followed by its arguments. Not run through a shell.
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    /// Wait for the lock program to exit before polling again.
    #[serde(default = "default_wait_for_exit")]
    pub wait_for_exit: bool,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            wait_for_exit: default_wait_for_exit(),
        }
    }
}

impl ActionConfig {
    pub fn lock_command(&self) -> LockCommand {
        match self.command.split_first() {
            Some((program, args)) => LockCommand::new(program.clone(), args.iter().cloned()),
            None => LockCommand::new(String::new(), Vec::<String>::new()),
        }
    }
}

/// Movement thresholds and timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Maximum accumulated X movement per window.
    #[serde(default = "default_threshold_x")]
    pub threshold_x: u64,
    /// Maximum accumulated Y movement per window.
    #[serde(default = "default_threshold_y")]
    pub threshold_y: u64,
    /// Accumulation window in seconds.
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Minimum seconds between two lock spawns.
    #[serde(default = "default_trigger_spacing_seconds")]
    pub trigger_spacing_seconds: u64,
    /// Sleep between polls in microseconds.
    #[serde(default = "default_poll_interval_us")]
    pub poll_interval_us: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            threshold_x: default_threshold_x(),
            threshold_y: default_threshold_y(),
            window_seconds: default_window_seconds(),
            trigger_spacing_seconds: default_trigger_spacing_seconds(),
            poll_interval_us: default_poll_interval_us(),
        }
    }
}

impl MotionConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            x: self.threshold_x,
            y: self.threshold_y,
            window: Duration::from_secs(self.window_seconds),
            trigger_spacing: Duration::from_secs(self.trigger_spacing_seconds),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }
}

/// Sensor backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensorBackend {
    #[default]
    Iio,
    Hdaps,
}

impl SensorBackend {
    fn axis_count(self) -> u8 {
        match self {
            SensorBackend::Iio => 3,
            SensorBackend::Hdaps => 2,
        }
    }
}

/// Which device and axes to sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    #[serde(default)]
    pub backend: SensorBackend,
    /// Directory containing the device directory.
    #[serde(default = "default_sensor_root")]
    pub root: PathBuf,
    #[serde(default = "default_sensor_device")]
    pub device: String,
    #[serde(default = "default_sensor_kind")]
    pub kind: String,
    #[serde(default)]
    pub x_axis: u8,
    #[serde(default = "default_y_axis")]
    pub y_axis: u8,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            backend: SensorBackend::default(),
            root: default_sensor_root(),
            device: default_sensor_device(),
            kind: default_sensor_kind(),
            x_axis: 0,
            y_axis: default_y_axis(),
        }
    }
}

impl SensorConfig {
    pub fn x_id(&self) -> SensorId {
        SensorId::new(&self.device, &self.kind, self.x_axis)
    }

    pub fn y_id(&self) -> SensorId {
        SensorId::new(&self.device, &self.kind, self.y_axis)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_command() -> Vec<String> {
    vec!["xautolock".to_string(), "-locknow".to_string()]
}

fn default_wait_for_exit() -> bool {
    true
}

fn default_threshold_x() -> u64 {
    20
}

fn default_threshold_y() -> u64 {
    10
}

fn default_window_seconds() -> u64 {
    1
}

fn default_trigger_spacing_seconds() -> u64 {
    3
}

fn default_poll_interval_us() -> u64 {
    100
}

fn default_sensor_root() -> PathBuf {
    PathBuf::from("/sys/bus/iio/devices")
}

fn default_sensor_device() -> String {
    "iio:device0".to_string()
}

fn default_sensor_kind() -> String {
    "accel".to_string()
}

fn default_y_axis() -> u8 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = config_path {
            Self::from_file(path)?
        } else {
            let default_paths = [
                PathBuf::from("config/default.toml"),
                dirs::config_dir()
                    .map(|d| d.join("movelock/config.toml"))
                    .unwrap_or_default(),
            ];

            let mut loaded = None;
            for path in &default_paths {
                if path.is_file() {
                    loaded = Some(Self::from_file(path)?);
                    break;
                }
            }
            loaded.unwrap_or_default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Apply `MOVELOCK_*` overrides looked up through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("MOVELOCK_LOCK_COMMAND") {
            self.action.command = val.split_whitespace().map(str::to_string).collect();
        }
        if let Some(v) = var("MOVELOCK_THRESHOLD_X").and_then(|val| val.parse().ok()) {
            self.motion.threshold_x = v;
        }
        if let Some(v) = var("MOVELOCK_THRESHOLD_Y").and_then(|val| val.parse().ok()) {
            self.motion.threshold_y = v;
        }
        if let Some(val) = var("MOVELOCK_SENSOR_DEVICE") {
            self.sensor.device = val;
        }
        if let Some(val) = var("MOVELOCK_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.action.command.first().map_or(true, |p| p.is_empty()) {
            anyhow::bail!("Lock command cannot be empty");
        }
        if self.motion.window_seconds == 0 {
            anyhow::bail!("Movement window must be greater than 0");
        }
        if self.motion.poll_interval_us == 0 {
            anyhow::bail!("Poll interval must be greater than 0");
        }
        if self.sensor.device.is_empty() {
            anyhow::bail!("Sensor device cannot be empty");
        }
        let axes = self.sensor.backend.axis_count();
        if self.sensor.x_axis >= axes || self.sensor.y_axis >= axes {
            anyhow::bail!(
                "Sensor axes must be below {} for the {:?} backend",
                axes,
                self.sensor.backend
            );
        }
        if self.sensor.x_id() == self.sensor.y_id() {
            anyhow::bail!("X and Y must read different sensor axes");
        }
        Ok(())
    }
}
