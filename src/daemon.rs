//! The poll loop: sensor -> monitor -> lock action, forever.

use chrono::Local;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{info, trace};

use crate::action::{ActionSpawner, LockCommand};
use crate::monitor::{MotionMonitor, Outcome, Reading};
use crate::sensor::{SensorError, SensorId, SensorReader};

/// Everything the loop needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct DaemonSettings {
    pub x_sensor: SensorId,
    pub y_sensor: SensorId,
    pub command: LockCommand,
    pub poll_interval: Duration,
}

/// Poll until `shutdown` resolves or the sensor fails.
///
/// A sensor error ends the loop and is returned to the caller; there is no
/// retry.
pub async fn run<R, S, F>(
    settings: &DaemonSettings,
    monitor: &mut MotionMonitor,
    reader: &mut R,
    spawner: &mut S,
    shutdown: F,
) -> Result<(), SensorError>
where
    R: SensorReader + ?Sized,
    S: ActionSpawner,
    F: Future,
{
    let mut interval = tokio::time::interval(settings.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!("Entering main poll loop");

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown requested");
                return Ok(());
            }
            _ = interval.tick() => {
                poll_once(settings, monitor, reader, spawner).await?;
            }
        }
    }
}

/// One iteration: read both axes, update the monitor, spawn if told to.
async fn poll_once<R, S>(
    settings: &DaemonSettings,
    monitor: &mut MotionMonitor,
    reader: &mut R,
    spawner: &mut S,
) -> Result<Outcome, SensorError>
where
    R: SensorReader + ?Sized,
    S: ActionSpawner,
{
    let x = reader.read_axis(&settings.x_sensor)?;
    let y = reader.read_axis(&settings.y_sensor)?;

    let outcome = monitor.observe(Reading::new(x, y), Instant::now());
    match outcome {
        Outcome::Skipped => trace!("Skipping empty reading ({}, {})", x, y),
        _ if outcome.should_spawn() => {
            info!(
                "Movement threshold crossed at {} (x={}, y={})",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                x,
                y
            );
            spawner.spawn(&settings.command).await;
        }
        _ => {}
    }

    Ok(outcome)
}
