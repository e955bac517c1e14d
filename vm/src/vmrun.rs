use async_trait::async_trait;
use std::path::PathBuf;
use vmrig_cmd::{Command, CommandError};

/// The hypervisor's control program.
///
/// Success is decided by exit status alone; a failure carries the captured
/// output (stderr merged into stdout) as its message.
#[async_trait]
pub trait Vmrun: Send + Sync {
    async fn run(&self, args: &[String]) -> Result<String, CommandError>;
}

#[derive(Debug, Clone)]
pub struct VmrunCommand {
    executable: PathBuf,
}

impl VmrunCommand {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

#[async_trait]
impl Vmrun for VmrunCommand {
    async fn run(&self, args: &[String]) -> Result<String, CommandError> {
        let mut cmd = Command::new(&self.executable);
        cmd.args(args);
        cmd.run().await
    }
}
