//! Runs the lock command as a child process.

use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{ActionSpawner, LockCommand};

/// Spawns the lock command with `tokio::process`.
pub struct ProcessSpawner {
    /// Name shown in the "executing" log line.
    progname: String,
    /// Block the poll loop until the child exits.
    wait_for_exit: bool,
}

impl ProcessSpawner {
    pub fn new(progname: impl Into<String>, wait_for_exit: bool) -> Self {
        Self {
            progname: progname.into(),
            wait_for_exit,
        }
    }
}

impl ActionSpawner for ProcessSpawner {
    async fn spawn(&mut self, command: &LockCommand) {
        info!("{}: executing \"{}\"", self.progname, command);

        let mut child = match Command::new(&command.program).args(&command.args).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to launch {}: {}", command.program, e);
                return;
            }
        };

        if !self.wait_for_exit {
            debug!("Detached {} (pid {:?})", command.program, child.id());
            return;
        }

        match child.wait().await {
            Ok(status) if status.success() => debug!("{} exited successfully", command.program),
            Ok(status) => warn!("{} exited with {}", command.program, status),
            Err(e) => warn!("Failed to wait for {}: {}", command.program, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_swallowed() {
        let mut spawner = ProcessSpawner::new("movelock", true);
        spawner
            .spawn(&LockCommand::new("/nonexistent/movelock-lock", ["now"]))
            .await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_detached_spawn_returns_before_child_exits() {
        let mut spawner = ProcessSpawner::new("movelock", false);
        let started = std::time::Instant::now();
        spawner.spawn(&LockCommand::new("sleep", ["2"])).await;

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_waits_for_child_to_finish() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("locked");

        let mut spawner = ProcessSpawner::new("movelock", true);
        spawner
            .spawn(&LockCommand::new("touch", [marker.to_string_lossy().into_owned()]))
            .await;

        assert!(marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_swallowed() {
        let mut spawner = ProcessSpawner::new("movelock", true);
        tokio_test::block_on(spawner.spawn(&LockCommand::new("false", Vec::<String>::new())));
    }
}
