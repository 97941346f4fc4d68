//! Lock action launched when too much movement is detected.

mod process;

use std::fmt;

pub use process::ProcessSpawner;

/// Program and argument list to run on trigger. Never passed to a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LockCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for LockCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Launches the lock command. Outcome is not reported back to the caller.
#[allow(async_fn_in_trait)]
pub trait ActionSpawner {
    async fn spawn(&mut self, command: &LockCommand);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_args() {
        let cmd = LockCommand::new("xautolock", ["-locknow"]);
        assert_eq!(cmd.to_string(), "xautolock -locknow");

        let bare = LockCommand::new("loginctl", Vec::<String>::new());
        assert_eq!(bare.to_string(), "loginctl");
    }
}
