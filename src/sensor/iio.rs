//! Linux Industrial I/O accelerometers exposed through sysfs.

use std::path::PathBuf;
use tracing::trace;

use super::{read_sysfs, SensorError, SensorId, SensorReader};

const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];

/// Reads `<root>/<device>/in_<kind>_<axis>_raw`.
pub struct IioSensor {
    root: PathBuf,
}

impl IioSensor {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn channel_path(&self, id: &SensorId) -> Option<PathBuf> {
        let axis = AXIS_NAMES.get(usize::from(id.axis))?;
        Some(
            self.root
                .join(&id.device)
                .join(format!("in_{}_{}_raw", id.kind, axis)),
        )
    }
}

impl SensorReader for IioSensor {
    fn read_axis(&mut self, id: &SensorId) -> Result<i64, SensorError> {
        let path = self.channel_path(id).ok_or_else(|| SensorError::Malformed {
            sensor: id.clone(),
            raw: format!("axis index {} out of range", id.axis),
        })?;

        let raw = read_sysfs(id, path)?;
        let value = raw.trim().parse::<i64>().map_err(|_| SensorError::Malformed {
            sensor: id.clone(),
            raw: raw.clone(),
        })?;

        trace!("{} = {}", id, value);
        Ok(value)
    }
}
