use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;
use vmrig_fs as fs;
use vmrig_vmx::VmxDocument;

use crate::{VmError, context::Context, vm::Vm};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterInfo {
    #[serde(skip_serializing)]
    pub adapter_id: String,
    pub mac_address: String,
    pub ip_address: Option<String>,
}

/// Adapter id to its addresses, in config file order.
pub type NetworkInfo = IndexMap<String, AdapterInfo>;

impl Vm {
    /// Reads each adapter's MAC from the config file and asks the lease table
    /// for its IP. A MAC without a lease has no IP; a lookup that fails fails
    /// the whole query.
    pub async fn network_info(&self, ctx: &Context) -> Result<NetworkInfo, VmError> {
        let conf_file = self.conf_file(ctx).await?;
        let bytes = fs::read_file(&conf_file).await?;
        let document = VmxDocument::parse(&String::from_utf8_lossy(&bytes));

        let mut info = NetworkInfo::new();
        for (adapter_id, mac_address) in document.adapters() {
            let lease = ctx
                .leases()
                .find_by_mac_address(&mac_address)
                .await
                .map_err(|source| VmError::Lease {
                    mac_address: mac_address.clone(),
                    source,
                })?;
            debug!("{}: {adapter_id} {mac_address} -> {lease:?}", self.name());
            info.insert(
                adapter_id.clone(),
                AdapterInfo {
                    adapter_id,
                    mac_address,
                    ip_address: lease.map(|lease| lease.ip_address),
                },
            );
        }
        Ok(info)
    }

    pub async fn mac_addresses(&self, ctx: &Context) -> Result<Vec<String>, VmError> {
        let info = self.network_info(ctx).await?;
        Ok(info
            .into_values()
            .map(|adapter| adapter.mac_address)
            .collect())
    }
}
