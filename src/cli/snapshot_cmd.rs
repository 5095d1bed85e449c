//! `pvectl get|describe|create|delete|rollback snapshot`

use super::error::CliError;
use super::output::{self, OutputFormat, SnapshotRow};
use super::{Outcome, SelectorArgs, WaitArgs, confirm};
use crate::ProxmoxClient;
use crate::core::domain::{model::any_failed, value_object::SnapshotName};
use crate::snapshot::application::request::snapshot_options::{
    CreateSnapshotOptions, DeleteSnapshotOptions, ListSnapshotOptions, RollbackSnapshotOptions,
};
use clap::{ArgGroup, Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum GetCommand {
    /// List snapshots
    #[command(visible_alias = "snapshots")]
    Snapshot(SelectorArgs),
}

#[derive(Subcommand, Debug)]
pub enum DescribeCommand {
    /// Show a snapshot on every selected guest
    Snapshot {
        /// Snapshot name
        name: String,
        #[command(flatten)]
        selector: SelectorArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum CreateCommand {
    /// Snapshot the selected guests
    Snapshot(CreateSnapshotArgs),
}

#[derive(Subcommand, Debug)]
pub enum DeleteCommand {
    /// Delete snapshots of the selected guests
    Snapshot(DeleteSnapshotArgs),
}

#[derive(Subcommand, Debug)]
pub enum RollbackCommand {
    /// Roll a guest back to one of its snapshots
    Snapshot(RollbackSnapshotArgs),
}

#[derive(Args, Debug)]
pub struct CreateSnapshotArgs {
    #[command(flatten)]
    pub selector: SelectorArgs,
    /// Snapshot name
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Include RAM state (VMs only)
    #[arg(long)]
    pub vmstate: bool,
    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["name", "all"])))]
pub struct DeleteSnapshotArgs {
    #[command(flatten)]
    pub selector: SelectorArgs,
    /// Snapshot name
    #[arg(long)]
    pub name: Option<String>,
    /// Delete every snapshot
    #[arg(long)]
    pub all: bool,
    /// Remove the snapshot even if removing a disk snapshot fails
    #[arg(short, long)]
    pub force: bool,
    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Args, Debug)]
pub struct RollbackSnapshotArgs {
    pub vmid: u32,
    /// Snapshot name
    pub name: String,
    /// Only if the guest is on this node
    #[arg(long)]
    pub node: Option<String>,
    /// Start the guest afterwards
    #[arg(long)]
    pub start: bool,
    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
    #[command(flatten)]
    pub wait: WaitArgs,
}

pub async fn get(
    command: GetCommand,
    client: &ProxmoxClient,
    format: OutputFormat,
) -> Result<Outcome, CliError> {
    let GetCommand::Snapshot(selector) = command;
    let options = ListSnapshotOptions {
        node: selector.node.clone(),
    };
    let entries = client.snapshots().list(&selector.vmids(), &options).await?;
    let rows: Vec<SnapshotRow> = entries.iter().map(SnapshotRow::from).collect();
    output::print_output(&entries, rows, format)?;
    Ok(Outcome::Success)
}

pub async fn describe(
    command: DescribeCommand,
    client: &ProxmoxClient,
    format: OutputFormat,
) -> Result<Outcome, CliError> {
    let DescribeCommand::Snapshot { name, selector } = command;
    let name = SnapshotName::parse(&name)?;
    let options = ListSnapshotOptions {
        node: selector.node.clone(),
    };
    let entries = client
        .snapshots()
        .describe(&selector.vmids(), &name, &options)
        .await?;
    if entries.is_empty() {
        return Err(CliError::NotFound(format!(
            "snapshot \"{}\" not found",
            name.as_str()
        )));
    }
    match format {
        OutputFormat::Json => output::print_json(&entries)?,
        OutputFormat::Table | OutputFormat::Yaml => output::print_yaml(&entries)?,
    }
    Ok(Outcome::Success)
}

pub async fn create(
    command: CreateCommand,
    client: &ProxmoxClient,
    format: OutputFormat,
) -> Result<Outcome, CliError> {
    let CreateCommand::Snapshot(args) = command;
    let name = SnapshotName::parse(&args.name)?;
    let options = CreateSnapshotOptions {
        node: args.selector.node.clone(),
        description: args.description,
        vmstate: args.vmstate,
        execution: args.wait.execution_options(),
    };
    let results = client
        .snapshots()
        .create(&args.selector.vmids(), &name, &options)
        .await?;
    output::print_results(&results, format)?;
    Ok(Outcome::from_failed(any_failed(&results)))
}

pub async fn delete(
    command: DeleteCommand,
    client: &ProxmoxClient,
    format: OutputFormat,
) -> Result<Outcome, CliError> {
    let DeleteCommand::Snapshot(args) = command;
    let vmids = args.selector.vmids();
    let name = args.name.as_deref().map(SnapshotName::parse).transpose()?;

    let scope = describe_scope(&vmids, args.selector.node.as_deref());
    let prompt = match &name {
        Some(name) => format!("Delete snapshot \"{}\" of {}?", name.as_str(), scope),
        None => format!("Delete ALL snapshots of {}?", scope),
    };
    if !confirm(&prompt, args.yes)? {
        output::print_info("Aborted");
        return Ok(Outcome::Success);
    }

    let options = DeleteSnapshotOptions {
        node: args.selector.node.clone(),
        force: args.force,
        execution: args.wait.execution_options(),
    };
    let service = client.snapshots();
    let results = match &name {
        Some(name) => service.delete(&vmids, name, &options).await?,
        None => service.delete_all(&vmids, &options).await?,
    };
    output::print_results(&results, format)?;
    Ok(Outcome::from_failed(any_failed(&results)))
}

pub async fn rollback(
    command: RollbackCommand,
    client: &ProxmoxClient,
    format: OutputFormat,
) -> Result<Outcome, CliError> {
    let RollbackCommand::Snapshot(args) = command;
    let name = SnapshotName::parse(&args.name)?;
    let prompt = format!(
        "Roll guest {} back to \"{}\"? Changes since then are lost.",
        args.vmid,
        name.as_str()
    );
    if !confirm(&prompt, args.yes)? {
        output::print_info("Aborted");
        return Ok(Outcome::Success);
    }

    let options = RollbackSnapshotOptions {
        node: args.node,
        start: args.start,
        execution: args.wait.execution_options(),
    };
    let results = client
        .snapshots()
        .rollback(args.vmid, &name, &options)
        .await?;
    if results.is_empty() {
        return Err(CliError::NotFound(format!("guest {} not found", args.vmid)));
    }
    output::print_results(&results, format)?;
    Ok(Outcome::from_failed(any_failed(&results)))
}

/// Human description of a selection for prompts.
pub(crate) fn describe_scope(vmids: &[u32], node: Option<&str>) -> String {
    let guests = if vmids.is_empty() {
        "every guest".to_string()
    } else {
        let ids: Vec<String> = vmids.iter().map(u32::to_string).collect();
        format!("guest(s) {}", ids.join(", "))
    };
    match node {
        Some(node) => format!("{} on node {}", guests, node),
        None => guests,
    }
}
