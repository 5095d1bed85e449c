//! `pvectl start|stop|shutdown|reboot vm|container`

use super::error::CliError;
use super::output::{self, OutputFormat};
use super::snapshot_cmd::describe_scope;
use super::{Outcome, SelectorArgs, WaitArgs, confirm};
use crate::ProxmoxClient;
use crate::core::domain::model::{PowerAction, ResourceKind, any_failed};
use crate::guest::application::request::power_options::PowerOptions;
use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GuestKind {
    #[value(alias = "vms", alias = "qemu")]
    Vm,
    #[value(alias = "containers", alias = "ct", alias = "lxc")]
    Container,
}

impl From<GuestKind> for ResourceKind {
    fn from(kind: GuestKind) -> Self {
        match kind {
            GuestKind::Vm => ResourceKind::Qemu,
            GuestKind::Container => ResourceKind::Lxc,
        }
    }
}

#[derive(Args, Debug)]
pub struct PowerArgs {
    #[arg(value_enum)]
    pub kind: GuestKind,
    #[command(flatten)]
    pub selector: SelectorArgs,
    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
    #[command(flatten)]
    pub wait: WaitArgs,
}

pub async fn run(
    action: PowerAction,
    args: PowerArgs,
    client: &ProxmoxClient,
    format: OutputFormat,
) -> Result<Outcome, CliError> {
    let kind = ResourceKind::from(args.kind);
    let vmids = args.selector.vmids();

    if action.is_disruptive() {
        let prompt = format!(
            "Hard {} {} ({})? Running workloads are not shut down cleanly.",
            action,
            describe_scope(&vmids, args.selector.node.as_deref()),
            kind.label()
        );
        if !confirm(&prompt, args.yes)? {
            output::print_info("Aborted");
            return Ok(Outcome::Success);
        }
    }

    let options = PowerOptions {
        node: args.selector.node.clone(),
        execution: args.wait.execution_options(),
    };
    let results = client
        .power()
        .execute(action, kind, &vmids, &options)
        .await?;
    output::print_results(&results, format)?;
    Ok(Outcome::from_failed(any_failed(&results)))
}
