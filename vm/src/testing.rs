use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use vmrig_cmd::CommandError;
use vmrig_fs::{self as fs, FsError};
use vmrig_lease::{Lease, LeaseError, LeaseLookup};
use vmrig_metadata::{MetadataError, MetadataStore};

use crate::{context::{Context, VmConfig}, vmrun::Vmrun};

pub(crate) fn failure(output: &str) -> Result<String, String> {
    Err(output.to_owned())
}

/// Answers by subcommand; unscripted subcommands succeed with no output.
#[derive(Clone, Default)]
pub(crate) struct FakeVmrun {
    responses: Arc<Mutex<HashMap<String, Result<String, String>>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeVmrun {
    pub(crate) fn respond(&self, subcommand: &str, response: Result<String, String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(subcommand.to_owned(), response);
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Vmrun for FakeVmrun {
    async fn run(&self, args: &[String]) -> Result<String, CommandError> {
        self.calls.lock().unwrap().push(args.to_vec());
        let subcommand = args.first().cloned().unwrap_or_default();
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&subcommand)
            .cloned()
            .unwrap_or_else(|| Ok(String::new()));
        response.map_err(|output| CommandError::Failure {
            command: format!("vmrun {}", args.join(" ")),
            code: Some(1),
            output,
        })
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeLeases {
    leases: Arc<Mutex<HashMap<String, Result<Option<String>, String>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeLeases {
    pub(crate) fn lease(&self, mac_address: &str, ip_address: &str) {
        self.respond(mac_address, Ok(Some(ip_address.to_owned())));
    }

    pub(crate) fn respond(&self, mac_address: &str, response: Result<Option<String>, String>) {
        self.leases
            .lock()
            .unwrap()
            .insert(mac_address.to_owned(), response);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeaseLookup for FakeLeases {
    async fn find_by_mac_address(&self, mac_address: &str) -> Result<Option<Lease>, LeaseError> {
        self.calls.lock().unwrap().push(mac_address.to_owned());
        let response = self
            .leases
            .lock()
            .unwrap()
            .get(mac_address)
            .cloned()
            .unwrap_or(Ok(None));
        match response {
            Ok(ip) => Ok(ip.map(|ip_address| Lease {
                ip_address,
                mac_address: mac_address.to_owned(),
                start: None,
                end: None,
            })),
            Err(message) => Err(LeaseError::Lookup(message)),
        }
    }
}

/// Records deletions; fails every call once [`FakeMetadata::fail`] is set.
#[derive(Clone, Default)]
pub(crate) struct FakeMetadata {
    deleted: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl FakeMetadata {
    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub(crate) fn fail(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_owned());
    }
}

#[async_trait]
impl MetadataStore for FakeMetadata {
    async fn delete_vm_info(&self, vm_name: &str) -> Result<(), MetadataError> {
        self.deleted.lock().unwrap().push(vm_name.to_owned());
        let failure = self.failure.lock().unwrap().clone();
        match failure {
            Some(message) => Err(MetadataError::Fs(FsError::ReadFile {
                path: PathBuf::from("inventory.json"),
                source: std::io::Error::other(message),
            })),
            None => Ok(()),
        }
    }
}

/// A temporary VM root wired to fakes.
pub(crate) struct TestBed {
    _dir: tempfile::TempDir,
    pub(crate) ctx: Context,
    pub(crate) vmrun: FakeVmrun,
    pub(crate) leases: FakeLeases,
    pub(crate) metadata: FakeMetadata,
}

impl TestBed {
    pub(crate) async fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let vm_dir = dir.path().to_owned();
        Self::rooted(dir, vm_dir)
    }

    /// A VM root that is a plain file, so every lookup beneath it errors.
    pub(crate) async fn unreachable_root() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let vm_dir = dir.path().join("vms");
        fs::write_file(&vm_dir, b"").await.unwrap();
        Self::rooted(dir, vm_dir)
    }

    fn rooted(dir: tempfile::TempDir, vm_dir: PathBuf) -> Self {
        let vmrun = FakeVmrun::default();
        let leases = FakeLeases::default();
        let metadata = FakeMetadata::default();
        let config = VmConfig { vm_dir };
        let ctx = Context::new(config, vmrun.clone(), leases.clone(), metadata.clone());
        Self {
            _dir: dir,
            ctx,
            vmrun,
            leases,
            metadata,
        }
    }

    pub(crate) async fn with_vm(name: &str) -> Self {
        let bed = Self::empty().await;
        bed.add_vm(name).await;
        bed
    }

    /// A bundle holding an empty `<name>.vmx`.
    pub(crate) async fn add_vm(&self, name: &str) {
        fs::create_dir(self.bundle(name)).await.unwrap();
        self.write(name, &format!("{name}.vmx"), b"").await;
    }

    pub(crate) fn bundle(&self, name: &str) -> PathBuf {
        self.ctx.paths().bundle_dir(name)
    }

    pub(crate) fn conf_file(&self, name: &str) -> String {
        self.bundle(name)
            .join(format!("{name}.vmx"))
            .to_string_lossy()
            .into_owned()
    }

    pub(crate) async fn write(&self, name: &str, file: &str, data: &[u8]) {
        fs::write_file(self.bundle(name).join(file), data)
            .await
            .unwrap();
    }

    pub(crate) async fn read(&self, name: &str, file: &str) -> Vec<u8> {
        fs::read_file(self.bundle(name).join(file)).await.unwrap()
    }

    pub(crate) async fn has(&self, name: &str, file: &str) -> bool {
        fs::path_exists(self.bundle(name).join(file)).await.unwrap()
    }

    pub(crate) fn running(&self, names: &[&str]) {
        let mut output = format!("Total running VMs: {}\n", names.len());
        for name in names {
            output.push_str(&format!("{}\n", self.conf_file(name)));
        }
        self.vmrun.respond("list", Ok(output));
    }
}
