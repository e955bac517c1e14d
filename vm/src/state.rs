use serde::Serialize;
use std::fmt::{self, Display};
use vmrig_fs as fs;

use crate::{VmError, context::Context, paths::SUSPEND_EXTENSION, vm::Vm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotRunning,
    Running,
    Suspended,
}

impl Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunState::NotRunning => "not running",
            RunState::Running => "running",
            RunState::Suspended => "suspended",
        })
    }
}

impl Vm {
    /// Running if `vmrun list` reports it, else suspended if a memory file
    /// is left in the bundle, else not running.
    pub async fn state(&self, ctx: &Context) -> Result<RunState, VmError> {
        let running = Vm::all_running(ctx).await?;
        if running.contains(self) {
            return Ok(RunState::Running);
        }
        if self.has_suspend_file(ctx).await? {
            Ok(RunState::Suspended)
        } else {
            Ok(RunState::NotRunning)
        }
    }

    /// A running VM keeps a memory file too, so it never counts as suspended.
    pub async fn is_suspended(&self, ctx: &Context) -> Result<bool, VmError> {
        let running = Vm::all_running(ctx).await?;
        if running.contains(self) {
            return Ok(false);
        }
        self.has_suspend_file(ctx).await
    }

    async fn has_suspend_file(&self, ctx: &Context) -> Result<bool, VmError> {
        let dir = self.path(ctx);
        if !fs::is_dir(&dir).await? {
            return Ok(false);
        }
        Ok(fs::read_dir(&dir).await?.iter().any(|entry| {
            !entry.is_dir
                && entry.path.extension().and_then(|ext| ext.to_str()) == Some(SUSPEND_EXTENSION)
        }))
    }
}
