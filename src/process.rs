//! Process start/kill capability used for engines and bots.

use std::path::Path;
use std::process::{Child, Command, Stdio};

use anyhow::Context;
use tracing::debug;

/// A spawned engine or bot process.
#[derive(Debug)]
pub(crate) struct ProcessHandle {
    name: String,
    child: Child,
}

/// Spawn `path` with `args`, stdio detached.
pub(crate) fn start(path: &Path, args: &[String]) -> anyhow::Result<ProcessHandle> {
    let child = Command::new(path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("could not start '{}'", path.display()))?;
    let name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(name = %name, pid = child.id(), "process started");
    Ok(ProcessHandle { name, child })
}

impl ProcessHandle {
    /// Kill the process. False when it could not be signalled, which usually
    /// means it already exited.
    pub(crate) fn kill(&mut self) -> bool {
        match self.child.kill() {
            Ok(()) => {
                let _ = self.child.wait();
                true
            }
            Err(e) => {
                debug!(name = %self.name, error = %e, "kill failed");
                false
            }
        }
    }

    /// True while the process has not exited.
    pub(crate) fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}
