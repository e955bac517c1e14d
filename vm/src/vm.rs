use std::path::{Path, PathBuf};
use tracing::info;
use vmrig_fs as fs;

use crate::{
    VmError,
    bundle::resolve_config_file,
    context::Context,
    paths::bundle_name,
};

const SNAPSHOTS_BANNER: &str = "Total snapshots:";
const RUNNING_BANNER: &str = "Total running VMs:";

#[derive(Debug, Clone, Copy, Default)]
pub struct StartOptions {
    pub headless: bool,
}

/// A VM identified by name. Holds no other state; everything is read from
/// disk or asked of `vmrun` each time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vm {
    name: String,
}

impl Vm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self, ctx: &Context) -> PathBuf {
        ctx.paths().bundle_dir(&self.name)
    }

    pub async fn exists(ctx: &Context, name: &str) -> Result<bool, VmError> {
        Ok(fs::is_dir(ctx.paths().bundle_dir(name)).await?)
    }

    /// Every bundle directory under the VM root, by name.
    pub async fn all(ctx: &Context) -> Result<Vec<Vm>, VmError> {
        let vm_dir = ctx.paths().vm_dir();
        if !fs::is_dir(vm_dir).await? {
            return Ok(Vec::new());
        }
        let mut vms: Vec<Vm> = fs::read_dir(vm_dir)
            .await?
            .into_iter()
            .filter(|entry| entry.is_dir)
            .filter_map(|entry| bundle_name(&entry.path).map(Vm::new))
            .collect();
        vms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(vms)
    }

    /// VMs `vmrun list` reports, named after their bundle directory.
    pub async fn all_running(ctx: &Context) -> Result<Vec<Vm>, VmError> {
        let output = ctx.vmrun().run(&["list".to_owned()]).await?;
        Ok(parse_running(&output))
    }

    pub async fn conf_file(&self, ctx: &Context) -> Result<PathBuf, VmError> {
        let paths = ctx.paths();
        resolve_config_file(
            &self.name,
            &paths.bundle_dir(&self.name),
            &paths.config_pattern(&self.name),
        )
        .await
    }

    async fn vmrun_with_conf(
        &self,
        ctx: &Context,
        command: &str,
        extra: &[&str],
    ) -> Result<String, VmError> {
        let conf_file = self.conf_file(ctx).await?;
        let mut args = vec![command.to_owned(), path_arg(&conf_file)];
        args.extend(extra.iter().map(|arg| (*arg).to_owned()));
        Ok(ctx.vmrun().run(&args).await?)
    }

    pub async fn start(&self, ctx: &Context, options: StartOptions) -> Result<(), VmError> {
        let mode = if options.headless { "nogui" } else { "gui" };
        info!("starting {} ({mode})", self.name);
        self.vmrun_with_conf(ctx, "start", &[mode]).await?;
        Ok(())
    }

    pub async fn stop(&self, ctx: &Context) -> Result<(), VmError> {
        info!("stopping {}", self.name);
        self.vmrun_with_conf(ctx, "stop", &[]).await?;
        Ok(())
    }

    pub async fn suspend(&self, ctx: &Context) -> Result<(), VmError> {
        info!("suspending {}", self.name);
        self.vmrun_with_conf(ctx, "suspend", &[]).await?;
        Ok(())
    }

    pub async fn snapshots(&self, ctx: &Context) -> Result<Vec<String>, VmError> {
        let output = self.vmrun_with_conf(ctx, "listSnapshots", &[]).await?;
        Ok(parse_snapshots(&output))
    }

    pub async fn create_snapshot(&self, ctx: &Context, snapshot: &str) -> Result<(), VmError> {
        info!("creating snapshot '{snapshot}' of {}", self.name);
        self.vmrun_with_conf(ctx, "snapshot", &[snapshot]).await?;
        Ok(())
    }

    pub async fn revert_to_snapshot(&self, ctx: &Context, snapshot: &str) -> Result<(), VmError> {
        info!("reverting {} to snapshot '{snapshot}'", self.name);
        self.vmrun_with_conf(ctx, "revertToSnapshot", &[snapshot]).await?;
        Ok(())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn parse_snapshots(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.contains(SNAPSHOTS_BANNER))
        .map(str::to_owned)
        .collect()
}

fn parse_running(output: &str) -> Vec<Vm> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(RUNNING_BANNER))
        .filter_map(|line| {
            let bundle = Path::new(line).parent()?;
            let name = bundle_name(bundle).or_else(|| bundle.file_name()?.to_str())?;
            Some(Vm::new(name))
        })
        .collect()
}
