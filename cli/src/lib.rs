mod config;

use std::{env, path::PathBuf};

use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use vmrig_env::{Environment, EnvironmentError};
use vmrig_vm::{
    Context, Inventory, LeaseFile, NetworkInfo, OperationResult, RunState, StartOptions, Vm,
    VmConfig, VmError, VmrunCommand, clone,
};

pub use crate::config::{Config, ConfigError};

#[derive(Parser, Debug)]
#[command(name = "vmrig", version, about = "Manage VMware Fusion virtual machines")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long = "config", global = true)]
    pub config_path: Option<PathBuf>,

    #[arg(long = "log", global = true, default_value = "info")]
    pub log: String,

    /// Print each result as a JSON envelope.
    #[arg(long = "json", global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List VMs and their state
    List,
    /// Start a VM
    Start {
        vm: String,
        /// Start without a GUI window.
        #[arg(long)]
        headless: bool,
    },
    /// Stop a running VM
    Stop { vm: String },
    /// Suspend a running VM
    Suspend { vm: String },
    /// List a VM's snapshots
    Snapshots { vm: String },
    /// Take a snapshot
    Snapshot { vm: String, name: String },
    /// Revert to a snapshot
    Revert { vm: String, name: String },
    /// Show state and network addresses
    Info { vm: String },
    /// Clone a VM bundle under a new name
    Clone {
        source: String,
        target: String,
        /// Start the clone once it is written.
        #[arg(long)]
        start: bool,
        #[arg(long, requires = "start")]
        headless: bool,
    },
    /// Delete a VM and its inventory record
    Delete { vm: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Vm(#[from] VmError),

    #[error("VM '{0}' is running; stop it before deleting")]
    Running(String),

    #[error("failed to encode result: {0}")]
    Json(#[from] serde_json::Error),

    /// The failure was already printed as a JSON envelope.
    #[error("operation failed")]
    Reported,
}

#[derive(Debug, Serialize)]
struct VmStatus {
    name: String,
    state: RunState,
}

#[derive(Debug, Serialize)]
struct VmInfo {
    name: String,
    state: RunState,
    network: NetworkInfo,
}

pub async fn get_config(cli: &Cli) -> Result<Config, AppError> {
    let env = Environment::create()?;
    let config_path = cli
        .config_path
        .clone()
        .or_else(|| env::var("VMRIG_CONFIG").ok().map(PathBuf::from));
    let config = Config::load(config_path.as_deref(), &env).await?;
    Ok(config)
}

pub fn context(config: &Config) -> Context {
    Context::new(
        VmConfig {
            vm_dir: config.vm_dir.clone(),
        },
        VmrunCommand::new(&config.vmrun_bin),
        LeaseFile::new(&config.lease_file),
        Inventory::new(&config.metadata_file),
    )
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = get_config(&cli).await?;
    let ctx = context(&config);
    let json = cli.json;

    match cli.command {
        Command::List => report(json, cmd_list(&ctx).await, print_list),
        Command::Start { vm, headless } => {
            let result = Vm::new(&vm)
                .start(&ctx, StartOptions { headless })
                .await
                .map_err(AppError::from);
            report(json, result, |()| println!("started '{vm}'"))
        }
        Command::Stop { vm } => {
            let result = Vm::new(&vm).stop(&ctx).await.map_err(AppError::from);
            report(json, result, |()| println!("stopped '{vm}'"))
        }
        Command::Suspend { vm } => {
            let result = Vm::new(&vm).suspend(&ctx).await.map_err(AppError::from);
            report(json, result, |()| println!("suspended '{vm}'"))
        }
        Command::Snapshots { vm } => {
            let result = Vm::new(&vm).snapshots(&ctx).await.map_err(AppError::from);
            report(json, result, |snapshots| {
                for snapshot in snapshots {
                    println!("{snapshot}");
                }
            })
        }
        Command::Snapshot { vm, name } => {
            let result = Vm::new(&vm)
                .create_snapshot(&ctx, &name)
                .await
                .map_err(AppError::from);
            report(json, result, |()| println!("created snapshot '{name}' of '{vm}'"))
        }
        Command::Revert { vm, name } => {
            let result = Vm::new(&vm)
                .revert_to_snapshot(&ctx, &name)
                .await
                .map_err(AppError::from);
            report(json, result, |()| println!("reverted '{vm}' to '{name}'"))
        }
        Command::Info { vm } => report(json, cmd_info(&ctx, &vm).await, print_info),
        Command::Clone {
            source,
            target,
            start,
            headless,
        } => {
            let result = cmd_clone(&ctx, &source, &target, start, headless).await;
            report(json, result, |()| println!("cloned '{source}' to '{target}'"))
        }
        Command::Delete { vm } => {
            let result = cmd_delete(&ctx, &vm).await;
            report(json, result, |()| println!("deleted '{vm}'"))
        }
    }
}

/// Prints `result` as an envelope in JSON mode, otherwise hands the data to
/// `human` and returns the error for the caller to log.
fn report<T: Serialize>(
    json: bool,
    result: Result<T, AppError>,
    human: impl FnOnce(T),
) -> Result<(), AppError> {
    if !json {
        human(result?);
        return Ok(());
    }

    let failed = result.is_err();
    let envelope = OperationResult::from(result);
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if failed {
        return Err(AppError::Reported);
    }
    Ok(())
}

async fn cmd_list(ctx: &Context) -> Result<Vec<VmStatus>, AppError> {
    let mut statuses = Vec::new();
    for vm in Vm::all(ctx).await? {
        let state = vm.state(ctx).await?;
        statuses.push(VmStatus {
            name: vm.name().to_owned(),
            state,
        });
    }
    Ok(statuses)
}

fn print_list(statuses: Vec<VmStatus>) {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic)
        .set_header(vec!["name", "state"]);

    for VmStatus { name, state } in statuses {
        table.add_row(vec![name, state.to_string()]);
    }

    println!("{table}")
}

async fn cmd_info(ctx: &Context, name: &str) -> Result<VmInfo, AppError> {
    let vm = Vm::new(name);
    if !Vm::exists(ctx, name).await? {
        return Err(VmError::NotFound(name.to_owned()).into());
    }
    let state = vm.state(ctx).await?;
    let network = vm.network_info(ctx).await?;
    Ok(VmInfo {
        name: name.to_owned(),
        state,
        network,
    })
}

fn print_info(info: VmInfo) {
    let VmInfo {
        name,
        state,
        network,
    } = info;
    println!("{name}: {state}");

    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic)
        .set_header(vec!["adapter", "mac", "ip"]);

    for (adapter_id, adapter) in network {
        table.add_row(vec![
            adapter_id,
            adapter.mac_address,
            adapter.ip_address.unwrap_or_else(|| String::from("-")),
        ]);
    }

    println!("{table}")
}

async fn cmd_clone(
    ctx: &Context,
    source: &str,
    target: &str,
    start: bool,
    headless: bool,
) -> Result<(), AppError> {
    clone(ctx, source, target).await?;
    if start {
        info!("starting clone '{target}'");
        Vm::new(target)
            .start(ctx, StartOptions { headless })
            .await?;
    }
    Ok(())
}

async fn cmd_delete(ctx: &Context, name: &str) -> Result<(), AppError> {
    let vm = Vm::new(name);
    if !Vm::exists(ctx, name).await? {
        return Err(VmError::NotFound(name.to_owned()).into());
    }
    if vm.state(ctx).await? == RunState::Running {
        return Err(AppError::Running(name.to_owned()));
    }
    vm.delete(ctx).await?;
    Ok(())
}
