//! Rendering of listings and operation results as tables, JSON or YAML.

use super::error::CliError;
use crate::core::domain::model::{
    operation_result::{OperationResult, ResultStatus},
    resource_ref::ResourceRef,
    snapshot::{SnapshotEntry, SnapshotRef},
};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// Prints `data` as a table of `rows`, or serializes `data` itself.
pub fn print_output<T, R>(data: &T, rows: Vec<R>, format: OutputFormat) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            print_table(rows);
            Ok(())
        }
        OutputFormat::Json => print_json(data),
        OutputFormat::Yaml => print_yaml(data),
    }
}

pub fn print_table<R: Tabled>(rows: Vec<R>) {
    if rows.is_empty() {
        println!("{}", "No resources found".yellow());
        return;
    }
    println!("{}", Table::new(rows));
}

pub fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(data).map_err(|e| CliError::Output(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

pub fn print_yaml<T: Serialize + ?Sized>(data: &T) -> Result<(), CliError> {
    let yaml = serde_yaml::to_string(data).map_err(|e| CliError::Output(e.to_string()))?;
    print!("{}", yaml);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Anything an [`OperationResult`] can point at.
pub trait ResultTarget {
    fn resource(&self) -> &ResourceRef;

    /// Sub-resource name, e.g. the snapshot.
    fn detail(&self) -> Option<&str> {
        None
    }
}

impl ResultTarget for ResourceRef {
    fn resource(&self) -> &ResourceRef {
        self
    }
}

impl ResultTarget for SnapshotRef {
    fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    fn detail(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }
}

#[derive(Tabled)]
pub struct ResultRow {
    #[tabled(rename = "VMID")]
    vmid: u32,
    #[tabled(rename = "NODE")]
    node: String,
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "TARGET")]
    target: String,
    #[tabled(rename = "OPERATION")]
    operation: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "DETAILS")]
    details: String,
}

impl<R: ResultTarget> From<&OperationResult<R>> for ResultRow {
    fn from(result: &OperationResult<R>) -> Self {
        let resource = result.resource.resource();
        let details = result
            .error
            .clone()
            .or_else(|| result.task_upid.clone())
            .unwrap_or_else(|| "-".to_string());
        Self {
            vmid: resource.vmid,
            node: resource.node.clone(),
            kind: resource.kind.label().to_string(),
            target: result.resource.detail().unwrap_or("-").to_string(),
            operation: result.operation.to_string(),
            status: result.effective_status().to_string(),
            details,
        }
    }
}

/// Prints the results and a one-line summary on stderr.
pub fn print_results<R>(
    results: &[OperationResult<R>],
    format: OutputFormat,
) -> Result<(), CliError>
where
    R: ResultTarget + Serialize,
{
    let rows: Vec<ResultRow> = results.iter().map(ResultRow::from).collect();
    print_output(results, rows, format)?;
    if format == OutputFormat::Table && !results.is_empty() {
        eprintln!("{}", summary(results));
    }
    Ok(())
}

fn summary<R>(results: &[OperationResult<R>]) -> String {
    let count = |status| {
        results
            .iter()
            .filter(|r| r.effective_status() == status)
            .count()
    };
    let (succeeded, failed, pending) = (
        count(ResultStatus::Succeeded),
        count(ResultStatus::Failed),
        count(ResultStatus::Pending),
    );
    let text = format!(
        "{} succeeded, {} failed, {} pending",
        succeeded, failed, pending
    );
    if failed > 0 {
        text.red().to_string()
    } else if pending > 0 {
        text.yellow().to_string()
    } else {
        text.green().to_string()
    }
}

#[derive(Tabled)]
pub struct SnapshotRow {
    #[tabled(rename = "VMID")]
    vmid: u32,
    #[tabled(rename = "NODE")]
    node: String,
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CREATED")]
    created: String,
    #[tabled(rename = "RAM")]
    vmstate: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

impl From<&SnapshotEntry> for SnapshotRow {
    fn from(entry: &SnapshotEntry) -> Self {
        let snapshot = &entry.snapshot;
        Self {
            vmid: entry.vmid,
            node: entry.node.clone(),
            kind: entry.kind.label().to_string(),
            name: snapshot.name.clone(),
            created: snapshot
                .snaptime
                .map(format_relative_time)
                .unwrap_or_else(|| "-".to_string()),
            vmstate: if snapshot.vmstate.unwrap_or(false) {
                "yes"
            } else {
                "no"
            }
            .to_string(),
            description: snapshot
                .description
                .as_deref()
                .map(|d| truncate(d.trim(), 40))
                .unwrap_or_default(),
        }
    }
}

/// `5m ago`, `2h ago`, `3d ago`.
pub fn format_relative_time(timestamp: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    let diff = (now - timestamp).max(0);
    if diff < 60 {
        format!("{}s ago", diff)
    } else if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86400 {
        format!("{}h ago", diff / 3600)
    } else {
        format!("{}d ago", diff / 86400)
    }
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
