//! movelock - lock the session when the machine is moved.
//!
//! Polls two accelerometer axes, sums how much they change, and runs a lock
//! command when the movement within a short window crosses a threshold.

mod action;
mod config;
mod daemon;
mod monitor;
mod sensor;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::action::ProcessSpawner;
use crate::config::Config;
use crate::daemon::DaemonSettings;
use crate::monitor::MotionMonitor;

/// Application version.
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    let mut args = std::env::args();
    let progname = args
        .next()
        .as_deref()
        .and_then(|arg0| std::path::Path::new(arg0).file_name()?.to_str().map(str::to_string))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    let config_path = args.next().map(PathBuf::from);

    // Load configuration
    let config = Config::load(config_path.as_deref())?;
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.logging.level)?;

    info!("Starting movelock v{}", VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(run_monitor(config, progname))
}

/// Wire the sensor, monitor and spawner together and poll until interrupted.
async fn run_monitor(config: Config, progname: String) -> Result<()> {
    let settings = DaemonSettings {
        x_sensor: config.sensor.x_id(),
        y_sensor: config.sensor.y_id(),
        command: config.action.lock_command(),
        poll_interval: config.motion.poll_interval(),
    };
    let thresholds = config.motion.thresholds();

    info!(
        "Sensors: x={}, y={} ({:?} backend under {:?})",
        settings.x_sensor, settings.y_sensor, config.sensor.backend, config.sensor.root
    );
    info!(
        "Thresholds: x>{}, y>{} per {:?}, lock spacing {:?}, command \"{}\"",
        thresholds.x, thresholds.y, thresholds.window, thresholds.trigger_spacing, settings.command
    );

    let mut reader = sensor::open(&config.sensor);
    let mut spawner = ProcessSpawner::new(progname, config.action.wait_for_exit);
    let mut monitor = MotionMonitor::new(thresholds);

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler; run until killed.
            std::future::pending::<()>().await;
        }
    };

    daemon::run(&settings, &mut monitor, &mut *reader, &mut spawner, shutdown)
        .await
        .context("Sensor read failed")?;

    info!("Goodbye!");
    Ok(())
}

/// Initialize tracing subscriber with the given log level.
fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
