//! ThinkPad HDAPS accelerometer.
//!
//! The driver reports both axes at once as `(x,y)` in
//! `/sys/devices/platform/hdaps/position`. One parsed sample serves one read
//! of each axis so X and Y of a poll come from the same driver sample.

use std::path::PathBuf;
use tracing::trace;

use super::{read_sysfs, SensorError, SensorId, SensorReader};

/// Reads `<root>/<device>/position`. The sensor kind is ignored.
pub struct HdapsSensor {
    root: PathBuf,
    /// Last parsed sample and which axes have been handed out from it.
    sample: Option<((i64, i64), [bool; 2])>,
}

impl HdapsSensor {
    pub fn new(root: PathBuf) -> Self {
        Self { root, sample: None }
    }

    fn fetch(&self, id: &SensorId) -> Result<(i64, i64), SensorError> {
        let raw = read_sysfs(id, self.root.join(&id.device).join("position"))?;
        parse_position(&raw).ok_or_else(|| SensorError::Malformed {
            sensor: id.clone(),
            raw,
        })
    }
}

fn parse_position(raw: &str) -> Option<(i64, i64)> {
    let inner = raw.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (x, y) = inner.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

impl SensorReader for HdapsSensor {
    fn read_axis(&mut self, id: &SensorId) -> Result<i64, SensorError> {
        let axis = usize::from(id.axis);
        if axis > 1 {
            return Err(SensorError::Malformed {
                sensor: id.clone(),
                raw: format!("axis index {} out of range", id.axis),
            });
        }

        let ((x, y), mut used) = match self.sample {
            Some((pair, used)) if !used[axis] => (pair, used),
            _ => (self.fetch(id)?, [false; 2]),
        };
        used[axis] = true;
        // Both axes consumed: the next read fetches a fresh sample.
        self.sample = if used == [true; 2] { None } else { Some(((x, y), used)) };

        let value = if axis == 0 { x } else { y };

        trace!("{} = {}", id, value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("(-3,512)\n"), Some((-3, 512)));
        assert_eq!(parse_position("( 4, 5 )"), Some((4, 5)));
        assert_eq!(parse_position("4,5"), None);
        assert_eq!(parse_position("(4;5)"), None);
        assert_eq!(parse_position("(a,5)"), None);
    }

    #[test]
    fn test_reads_each_axis() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("hdaps")).unwrap();
        std::fs::write(dir.path().join("hdaps/position"), "(501,497)\n").unwrap();

        let mut sensor = HdapsSensor::new(dir.path().to_path_buf());
        assert_eq!(sensor.read_axis(&SensorId::new("hdaps", "accel", 0)).unwrap(), 501);
        assert_eq!(sensor.read_axis(&SensorId::new("hdaps", "accel", 1)).unwrap(), 497);
        assert!(matches!(
            sensor.read_axis(&SensorId::new("hdaps", "accel", 2)),
            Err(SensorError::Malformed { .. })
        ));
    }

    #[test]
    fn test_x_and_y_share_one_sample() {
        let dir = tempfile::tempdir().unwrap();
        let position = dir.path().join("hdaps/position");
        std::fs::create_dir(dir.path().join("hdaps")).unwrap();
        std::fs::write(&position, "(1,2)").unwrap();

        let mut sensor = HdapsSensor::new(dir.path().to_path_buf());
        let x = SensorId::new("hdaps", "accel", 0);
        let y = SensorId::new("hdaps", "accel", 1);

        assert_eq!(sensor.read_axis(&x).unwrap(), 1);
        std::fs::write(&position, "(3,4)").unwrap();
        assert_eq!(sensor.read_axis(&y).unwrap(), 2);

        // Next poll sees the new sample.
        assert_eq!(sensor.read_axis(&x).unwrap(), 3);
        assert_eq!(sensor.read_axis(&y).unwrap(), 4);
    }

    #[test]
    fn test_repeated_axis_fetches_fresh_sample() {
        let dir = tempfile::tempdir().unwrap();
        let position = dir.path().join("hdaps/position");
        std::fs::create_dir(dir.path().join("hdaps")).unwrap();
        std::fs::write(&position, "(1,2)").unwrap();

        let mut sensor = HdapsSensor::new(dir.path().to_path_buf());
        let x = SensorId::new("hdaps", "accel", 0);

        assert_eq!(sensor.read_axis(&x).unwrap(), 1);
        std::fs::write(&position, "(5,6)").unwrap();
        assert_eq!(sensor.read_axis(&x).unwrap(), 5);
    }

    #[test]
    fn test_missing_device_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut sensor = HdapsSensor::new(dir.path().to_path_buf());
        assert!(matches!(
            sensor.read_axis(&SensorId::new("hdaps", "accel", 0)),
            Err(SensorError::Unavailable { .. })
        ));
    }
}
