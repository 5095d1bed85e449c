//! The `pvectl` command line.

pub mod config_cmd;
pub mod error;
pub mod output;
pub mod power_cmd;
pub mod snapshot_cmd;

use self::error::CliError;
use self::output::OutputFormat;
use crate::config::application::{
    request::config_overrides::ConfigOverrides,
    service::{
        config_provider::ConfigProvider, config_service::ConfigService, config_store::ConfigStore,
    },
};
use crate::core::application::orchestration::ExecutionOptions;
use crate::core::domain::model::PowerAction;
use crate::ProxmoxClient;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "pvectl", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file [default: $PVECTL_CONFIG or ~/.pvectl/config]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Context to use instead of the current one
    #[arg(long, global = true, value_name = "NAME")]
    pub context: Option<String>,

    /// Server URL overriding the context's cluster
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Do not verify the server certificate; `=false` forces verification
    #[arg(
        long = "insecure-skip-tls-verify",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub insecure_skip_tls_verify: Option<bool>,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<u64>,

    #[arg(long, value_name = "N")]
    pub retry_count: Option<u32>,

    /// Base delay between retries in seconds
    #[arg(long, value_name = "SECS")]
    pub retry_delay: Option<u64>,

    #[arg(long, value_name = "SECS")]
    pub max_retry_delay: Option<u64>,

    /// Retry POST/PUT/DELETE requests too; `=false` turns it off
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub retry_writes: Option<bool>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            context: self.context.clone(),
            server: self.server.clone(),
            verify_ssl: self.insecure_skip_tls_verify.map(|insecure| !insecure),
            timeout: self.request_timeout,
            retry_count: self.retry_count,
            retry_delay: self.retry_delay,
            max_retry_delay: self.max_retry_delay,
            retry_writes: self.retry_writes,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// View and modify the config file
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommand,
    },
    /// List resources
    Get {
        #[command(subcommand)]
        resource: snapshot_cmd::GetCommand,
    },
    /// Show one named resource in detail
    Describe {
        #[command(subcommand)]
        resource: snapshot_cmd::DescribeCommand,
    },
    /// Create resources
    Create {
        #[command(subcommand)]
        resource: snapshot_cmd::CreateCommand,
    },
    /// Delete resources
    Delete {
        #[command(subcommand)]
        resource: snapshot_cmd::DeleteCommand,
    },
    /// Roll a guest back to a snapshot
    Rollback {
        #[command(subcommand)]
        resource: snapshot_cmd::RollbackCommand,
    },
    /// Start guests
    Start(power_cmd::PowerArgs),
    /// Stop guests immediately
    Stop(power_cmd::PowerArgs),
    /// Shut guests down cleanly
    Shutdown(power_cmd::PowerArgs),
    /// Reboot guests
    Reboot(power_cmd::PowerArgs),
}

/// Which guests a command works on.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectorArgs {
    /// Guest IDs; none means every guest in the cluster
    #[arg(value_name = "VMID")]
    pub vmids: Vec<u32>,

    /// Guest ID, repeatable
    #[arg(long = "vmid", value_name = "VMID")]
    pub vmid_flags: Vec<u32>,

    /// Only guests on this node
    #[arg(long)]
    pub node: Option<String>,
}

impl SelectorArgs {
    pub fn vmids(&self) -> Vec<u32> {
        let mut vmids = self.vmids.clone();
        for vmid in &self.vmid_flags {
            if !vmids.contains(vmid) {
                vmids.push(*vmid);
            }
        }
        vmids
    }
}

/// How long to wait for Proxmox tasks.
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Seconds to wait for each task
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not wait for tasks to finish
    #[arg(long = "async", conflicts_with = "timeout")]
    pub no_wait: bool,

    /// Stop at the first failure
    #[arg(long)]
    pub fail_fast: bool,
}

impl WaitArgs {
    pub fn execution_options(&self) -> ExecutionOptions {
        let options = if self.no_wait {
            ExecutionOptions::asynchronous()
        } else {
            match self.timeout {
                Some(secs) => ExecutionOptions::sync(Duration::from_secs(secs)),
                None => ExecutionOptions::default(),
            }
        };
        options.with_fail_fast(self.fail_fast)
    }
}

/// Whether the command as a whole succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn from_failed(failed: bool) -> Self {
        if failed {
            Outcome::Failure
        } else {
            Outcome::Success
        }
    }
}

pub async fn run(cli: Cli) -> Result<Outcome, CliError> {
    let overrides = cli.overrides();
    let format = cli.output;
    match cli.command {
        Commands::Config { command } => {
            let mut service = config_service();
            config_cmd::run(command, &mut service, &overrides, format)
        }
        Commands::Get { resource } => {
            let client = connect(&overrides)?;
            snapshot_cmd::get(resource, &client, format).await
        }
        Commands::Describe { resource } => {
            let client = connect(&overrides)?;
            snapshot_cmd::describe(resource, &client, format).await
        }
        Commands::Create { resource } => {
            let client = connect(&overrides)?;
            snapshot_cmd::create(resource, &client, format).await
        }
        Commands::Delete { resource } => {
            let client = connect(&overrides)?;
            snapshot_cmd::delete(resource, &client, format).await
        }
        Commands::Rollback { resource } => {
            let client = connect(&overrides)?;
            snapshot_cmd::rollback(resource, &client, format).await
        }
        Commands::Start(args) => power(PowerAction::Start, args, &overrides, format).await,
        Commands::Stop(args) => power(PowerAction::Stop, args, &overrides, format).await,
        Commands::Shutdown(args) => power(PowerAction::Shutdown, args, &overrides, format).await,
        Commands::Reboot(args) => power(PowerAction::Reboot, args, &overrides, format).await,
    }
}

async fn power(
    action: PowerAction,
    args: power_cmd::PowerArgs,
    overrides: &ConfigOverrides,
    format: OutputFormat,
) -> Result<Outcome, CliError> {
    let client = connect(overrides)?;
    power_cmd::run(action, args, &client, format).await
}

fn config_service() -> ConfigService {
    ConfigService::new(ConfigProvider::from_process_env(), ConfigStore::new())
}

/// Loads the config file and builds a client for the active context.
fn connect(overrides: &ConfigOverrides) -> Result<ProxmoxClient, CliError> {
    let mut service = config_service();
    service.load(overrides)?;
    let config = service.current_config()?;
    debug!(context = config.context_name(), server = config.server(), "connecting");
    Ok(ProxmoxClient::from_config(&config)?)
}

/// Asks before a destructive action unless `--yes` was given.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Usage(
            "refusing to continue without confirmation; pass --yes to skip the prompt".to_string(),
        ));
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
