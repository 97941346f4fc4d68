//! Accelerometer access with backend-specific implementations.

mod hdaps;
mod iio;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{SensorBackend, SensorConfig};

pub use hdaps::HdapsSensor;
pub use iio::IioSensor;

/// Identifies one scalar channel of a sensor device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorId {
    /// Device directory name, e.g. `iio:device0` or `hdaps`.
    pub device: String,
    /// Sensor type, e.g. `accel`.
    pub kind: String,
    /// Axis index within the device.
    pub axis: u8,
}

impl SensorId {
    pub fn new(device: impl Into<String>, kind: impl Into<String>, axis: u8) -> Self {
        Self {
            device: device.into(),
            kind: kind.into(),
            axis,
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}[{}]", self.device, self.kind, self.axis)
    }
}

/// Sensor read failure. Every variant is fatal to the daemon.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor {sensor} unavailable at {path:?}: {source}")]
    Unavailable {
        sensor: SensorId,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sensor {sensor} returned malformed data: {raw:?}")]
    Malformed { sensor: SensorId, raw: String },
}

/// Reads the current value of a single sensor axis.
pub trait SensorReader {
    fn read_axis(&mut self, id: &SensorId) -> Result<i64, SensorError>;
}

/// Build the reader selected by the configuration.
pub fn open(config: &SensorConfig) -> Box<dyn SensorReader> {
    match config.backend {
        SensorBackend::Iio => Box::new(IioSensor::new(config.root.clone())),
        SensorBackend::Hdaps => Box::new(HdapsSensor::new(config.root.clone())),
    }
}

fn read_sysfs(id: &SensorId, path: PathBuf) -> Result<String, SensorError> {
    std::fs::read_to_string(&path).map_err(|source| SensorError::Unavailable {
        sensor: id.clone(),
        path,
        source,
    })
}
