use tracing::{debug, info, warn};
use vmrig_fs as fs;

use crate::{VmError, bundle::name_suffix, context::Context, vm::Vm};

impl Vm {
    /// Removes the files named after this VM from its bundle, the bundle
    /// itself once empty, then any metadata recorded for it. The metadata
    /// step runs even when file removal fails; that failure is returned
    /// afterwards.
    pub async fn delete(&self, ctx: &Context) -> Result<(), VmError> {
        info!("deleting {}", self.name());
        let removed = self.remove_files(ctx).await;

        if let Err(err) = ctx.metadata().delete_vm_info(self.name()).await {
            warn!("failed to delete metadata for {}: {err}", self.name());
        }
        removed
    }

    async fn remove_files(&self, ctx: &Context) -> Result<(), VmError> {
        let dir = self.path(ctx);
        if !fs::is_dir(&dir).await? {
            return Ok(());
        }
        for entry in fs::read_dir(&dir).await? {
            if entry.is_dir {
                continue;
            }
            let Some(file_name) = entry.file_name() else {
                continue;
            };
            if name_suffix(file_name, self.name()).is_some() {
                debug!("removing {}", entry.path.display());
                fs::remove_file(&entry.path).await?;
            }
        }
        if fs::remove_dir_if_empty(&dir).await? {
            debug!("removed {}", dir.display());
        }
        Ok(())
    }
}
