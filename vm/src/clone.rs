use std::path::Path;
use tracing::{debug, info, warn};
use vmrig_fs as fs;
use vmrig_vmx::{RewriteMode, VmxDocument, rename};

use crate::{
    VmError,
    bundle::renamed,
    context::Context,
    paths::{AUXILIARY_CONFIG_EXTENSION, CONFIG_EXTENSION, DISK_EXTENSION},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Config(RewriteMode),
    Disk,
    Other,
}

impl FileKind {
    fn of(file_name: &str) -> Self {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        match extension {
            CONFIG_EXTENSION => FileKind::Config(RewriteMode::Config),
            AUXILIARY_CONFIG_EXTENSION => FileKind::Config(RewriteMode::Auxiliary),
            DISK_EXTENSION => FileKind::Disk,
            _ => FileKind::Other,
        }
    }
}

/// Copies the bundle of `source` into a new bundle for `target`.
///
/// Files named `<source>.*` or `<source>-*` are renamed to the target's
/// prefix, others keep their name. Config files have the source name
/// replaced and are reset to boot as a new machine; disk descriptors stored
/// as text get the name replaced; everything else is copied as is. If any
/// step fails the new bundle is removed again.
pub async fn clone(ctx: &Context, source: &str, target: &str) -> Result<(), VmError> {
    validate_name(source)?;
    validate_name(target)?;

    let paths = ctx.paths();
    let source_dir = paths.bundle_dir(source);
    let target_dir = paths.bundle_dir(target);

    if !fs::is_dir(&source_dir).await? {
        return Err(VmError::NotFound(source.to_owned()));
    }
    if fs::path_exists(&target_dir).await? {
        return Err(VmError::AlreadyExists(target.to_owned()));
    }

    info!("cloning {source} to {target}");
    fs::create_dir(&target_dir).await?;

    if let Err(err) = copy_bundle(&source_dir, &target_dir, source, target).await {
        if let Err(cleanup) = fs::remove_dir_all(&target_dir).await {
            warn!("failed to remove partial clone {}: {cleanup}", target_dir.display());
        }
        return Err(err);
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), VmError> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(VmError::InvalidName(name.to_owned()));
    }
    Ok(())
}

async fn copy_bundle(
    source_dir: &Path,
    target_dir: &Path,
    source: &str,
    target: &str,
) -> Result<(), VmError> {
    for entry in fs::read_dir(source_dir).await? {
        if entry.is_dir {
            debug!("skipping directory {}", entry.path.display());
            continue;
        }
        let Some(file_name) = entry.file_name() else {
            // not UTF-8, so it cannot carry the source name either
            let Some(raw_name) = entry.path.file_name() else {
                continue;
            };
            fs::copy_file(&entry.path, target_dir.join(raw_name)).await?;
            continue;
        };

        let target_name = renamed(file_name, source, target);
        let to = target_dir.join(&target_name);
        copy_bundle_file(&entry.path, &to, FileKind::of(&target_name), source, target).await?;
    }
    Ok(())
}

async fn copy_bundle_file(
    from: &Path,
    to: &Path,
    kind: FileKind,
    source: &str,
    target: &str,
) -> Result<(), VmError> {
    match kind {
        FileKind::Config(mode) => {
            let bytes = fs::read_file(from).await?;
            let text = String::from_utf8(bytes).map_err(|_| VmError::Encoding {
                path: from.to_owned(),
            })?;
            let mut document = VmxDocument::parse(&rename(&text, source, target));
            document.rewrite_for_clone(mode);
            debug!("rewrote config {} -> {}", from.display(), to.display());
            fs::write_file(to, document.to_string().as_bytes()).await?;
        }
        FileKind::Disk => {
            if fs::is_binary_file(from).await? {
                debug!("copied binary disk {} -> {}", from.display(), to.display());
                fs::copy_file(from, to).await?;
                return Ok(());
            }
            let bytes = fs::read_file(from).await?;
            match String::from_utf8(bytes) {
                Ok(text) => {
                    debug!("rewrote disk descriptor {} -> {}", from.display(), to.display());
                    fs::write_file(to, rename(&text, source, target).as_bytes()).await?;
                }
                Err(err) => {
                    fs::write_file(to, err.as_bytes()).await?;
                }
            }
        }
        FileKind::Other => {
            debug!("copied {} -> {}", from.display(), to.display());
            fs::copy_file(from, to).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestBed;

    const VM_FILES: [&str; 6] = [".vmx", ".vmxf", ".vmdk", "-s001.vmdk", "-s002.vmdk", ".vmsd"];

    const VMX: &str = r#"ide1:0.deviceType = "cdrom-image"
nvram = "foo.nvram"
ethernet0.present = "TRUE"
ethernet1.address = "00:0c:29:1d:6a:75"
ethernet0.connectionType = "nat"
ethernet0.generatedAddress = "00:0c:29:1d:6a:64"
ethernet0.virtualDev = "e1000"
tools.remindInstall = "TRUE"
ethernet0.wakeOnPcktRcv = "FALSE"
ethernet0.addressType = "generated"
uuid.action = "keep"
ethernet0.linkStatePropagation.enable = "TRUE"
ethernet0.generatedAddressenable = "TRUE"
ethernet1.generatedAddressenable = "TRUE""#;

    const SPARSE_DESCRIPTOR: &str = "# Disk DescriptorFile\nversion=1\ncreateType=\"twoGbMaxExtentSparse\"\n\nRW 8323072 SPARSE \"foo-s001.vmdk\"\nRW 8323072 SPARSE \"foo-s002.vmdk\"\n";

    const FLAT_DISK: &[u8] = b"KDMV\x01\x00\x00\x00foo.vmdk\x00\x00\x00";

    /// A `foo` bundle whose main disk is `disk`.
    async fn source(disk: &[u8]) -> TestBed {
        let bed = TestBed::with_vm("foo").await;
        for suffix in VM_FILES {
            bed.write("foo", &format!("foo{suffix}"), b"").await;
        }
        bed.write("foo", "foo.vmx", VMX.as_bytes()).await;
        bed.write("foo", "foo.vmxf", b"<Foundry><vmxPathName type=\"string\">foo.vmx</vmxPathName></Foundry>")
            .await;
        bed.write("foo", "foo.vmdk", disk).await;
        bed
    }

    async fn vmx(bed: &TestBed) -> String {
        String::from_utf8(bed.read("bar", "bar.vmx").await).unwrap()
    }

    #[tokio::test]
    async fn copies_and_renames_vm_files() {
        let bed = source(FLAT_DISK).await;
        clone(&bed.ctx, "foo", "bar").await.unwrap();

        for suffix in VM_FILES {
            assert!(bed.has("bar", &format!("bar{suffix}")).await, "bar{suffix}");
        }
        assert!(bed.has("foo", "foo.vmx").await);
    }

    #[tokio::test]
    async fn keeps_names_that_do_not_carry_the_source_prefix() {
        let bed = source(FLAT_DISK).await;
        bed.write("foo", "other_name.nvram", b"nvram").await;
        bed.write("foo", "other_name-s003.vmdk", b"\x00\x01").await;

        clone(&bed.ctx, "foo", "bar").await.unwrap();

        assert!(bed.has("bar", "other_name.nvram").await);
        assert!(bed.has("bar", "other_name-s003.vmdk").await);
        assert!(!bed.has("bar", "bar.nvram").await);
    }

    #[tokio::test]
    async fn rewrites_config_files() {
        let bed = source(FLAT_DISK).await;
        clone(&bed.ctx, "foo", "bar").await.unwrap();

        for file in ["bar.vmx", "bar.vmxf"] {
            let text = String::from_utf8(bed.read("bar", file).await).unwrap();
            assert!(!text.contains("foo"), "{file}: {text}");
            assert!(text.contains("bar"), "{file}: {text}");
        }
        let text = vmx(&bed).await;
        assert!(text.contains("nvram = \"bar.nvram\""));
    }

    #[tokio::test]
    async fn disables_tools_reminder() {
        let bed = source(FLAT_DISK).await;
        clone(&bed.ctx, "foo", "bar").await.unwrap();
        let text = vmx(&bed).await;
        assert!(text.lines().any(|line| line == "tools.remindInstall = \"FALSE\""));
        assert!(!text.contains("tools.remindInstall = \"TRUE\""));
    }

    #[tokio::test]
    async fn drops_generated_mac_addresses() {
        let bed = source(FLAT_DISK).await;
        clone(&bed.ctx, "foo", "bar").await.unwrap();
        let text = vmx(&bed).await;
        assert!(!text.lines().any(|line| line.starts_with("ethernet0.generatedAddress")));
        assert!(!text.lines().any(|line| line.starts_with("ethernet1.generatedAddress")));
        assert!(text.contains("ethernet1.address = \"00:0c:29:1d:6a:75\""));
    }

    #[tokio::test]
    async fn regenerates_uuid() {
        let bed = source(FLAT_DISK).await;
        clone(&bed.ctx, "foo", "bar").await.unwrap();
        let text = vmx(&bed).await;
        assert!(text.lines().any(|line| line == "uuid.action = \"create\""));
    }

    #[tokio::test]
    async fn binary_disk_is_copied_unchanged() {
        let bed = source(FLAT_DISK).await;
        clone(&bed.ctx, "foo", "bar").await.unwrap();
        assert_eq!(bed.read("bar", "bar.vmdk").await, FLAT_DISK);
    }

    #[tokio::test]
    async fn sparse_disk_descriptor_is_renamed() {
        let bed = source(SPARSE_DESCRIPTOR.as_bytes()).await;
        clone(&bed.ctx, "foo", "bar").await.unwrap();
        let text = String::from_utf8(bed.read("bar", "bar.vmdk").await).unwrap();
        assert!(text.contains("RW 8323072 SPARSE \"bar-s001.vmdk\""));
        assert!(!text.contains("foo"));
    }

    #[tokio::test]
    async fn other_files_are_copied_verbatim() {
        let bed = source(FLAT_DISK).await;
        bed.write("foo", "foo.vmsd", b"snapshot.fileName = \"foo-Snapshot1.vmsn\"\n")
            .await;
        clone(&bed.ctx, "foo", "bar").await.unwrap();
        assert_eq!(
            bed.read("bar", "bar.vmsd").await,
            b"snapshot.fileName = \"foo-Snapshot1.vmsn\"\n"
        );
    }

    #[tokio::test]
    async fn source_must_exist() {
        let bed = TestBed::empty().await;
        let err = clone(&bed.ctx, "foo", "bar").await.unwrap_err();
        assert!(matches!(err, VmError::NotFound(name) if name == "foo"));
    }

    #[tokio::test]
    async fn target_must_not_exist() {
        let bed = source(FLAT_DISK).await;
        bed.add_vm("bar").await;
        let err = clone(&bed.ctx, "foo", "bar").await.unwrap_err();
        assert!(matches!(err, VmError::AlreadyExists(name) if name == "bar"));
    }

    #[tokio::test]
    async fn rejects_path_like_names() {
        let bed = source(FLAT_DISK).await;
        let err = clone(&bed.ctx, "foo", "../bar").await.unwrap_err();
        assert!(matches!(err, VmError::InvalidName(_)));
    }

    #[tokio::test]
    async fn failed_clone_leaves_no_target() {
        let bed = source(FLAT_DISK).await;
        bed.write("foo", "foo.vmx", b"nvram = \"foo.nvram\"\n\xff\xfe\n").await;

        let err = clone(&bed.ctx, "foo", "bar").await.unwrap_err();
        assert!(matches!(err, VmError::Encoding { .. }));
        assert!(!fs::path_exists(bed.bundle("bar")).await.unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn copy_failure_midway_leaves_no_target() {
        let bed = source(FLAT_DISK).await;
        std::os::unix::fs::symlink("/nonexistent/foo.nvram", bed.bundle("foo").join("foo.nvram"))
            .unwrap();

        let err = clone(&bed.ctx, "foo", "bar").await.unwrap_err();
        assert!(matches!(err, VmError::Fs(_)));
        assert!(!fs::path_exists(bed.bundle("bar")).await.unwrap());
        assert!(bed.has("foo", "foo.vmx").await);
    }

    #[test]
    fn classifies_by_extension() {
        assert_eq!(FileKind::of("bar.vmx"), FileKind::Config(RewriteMode::Config));
        assert_eq!(FileKind::of("bar.vmxf"), FileKind::Config(RewriteMode::Auxiliary));
        assert_eq!(FileKind::of("bar-s001.vmdk"), FileKind::Disk);
        assert_eq!(FileKind::of("bar.vmsd"), FileKind::Other);
        assert_eq!(FileKind::of("bar.vmx.lck"), FileKind::Other);
    }
}
