//! `pvectl config ...`

use super::error::CliError;
use super::output::{self, OutputFormat};
use super::Outcome;
use crate::config::application::{
    request::config_overrides::ConfigOverrides,
    service::config_service::{ConfigService, ContextPatch},
};
use crate::core::domain::model::{ClusterSettings, UserSettings};
use clap::{ArgGroup, Args, Subcommand};
use tabled::Tabled;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the config file with secrets masked
    View,
    /// Print the name of the current context
    CurrentContext,
    /// List all contexts
    GetContexts,
    /// Set the current context
    UseContext { name: String },
    /// Create or update a context
    SetContext(SetContextArgs),
    /// Create or update a cluster
    SetCluster(SetClusterArgs),
    /// Set the credentials of a user
    SetCredentials(SetCredentialsArgs),
}

#[derive(Args, Debug)]
pub struct SetContextArgs {
    pub name: String,
    #[arg(long)]
    pub cluster: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub default_node: Option<String>,
}

#[derive(Args, Debug)]
pub struct SetClusterArgs {
    pub name: String,
    /// Server URL, e.g. https://pve1.example.com:8006
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,
    #[arg(
        long = "insecure-skip-tls-verify",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub insecure_skip_tls_verify: Option<bool>,
    /// PEM file with the CA that signed the server certificate
    #[arg(long, value_name = "PATH")]
    pub certificate_authority: Option<String>,
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
    #[arg(long, value_name = "N")]
    pub retry_count: Option<u32>,
    #[arg(long, value_name = "SECS")]
    pub retry_delay: Option<u64>,
    #[arg(long, value_name = "SECS")]
    pub max_retry_delay: Option<u64>,
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub retry_writes: Option<bool>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("token").args(["token_id", "token_secret"]).multiple(true)))]
#[command(group(
    ArgGroup::new("password_auth")
        .args(["username", "password"])
        .multiple(true)
        .conflicts_with("token")
))]
pub struct SetCredentialsArgs {
    pub name: String,
    /// API token id, e.g. root@pam!automation
    #[arg(long, requires = "token_secret")]
    pub token_id: Option<String>,
    #[arg(long, requires = "token_id")]
    pub token_secret: Option<String>,
    /// user@realm
    #[arg(long, requires = "password")]
    pub username: Option<String>,
    #[arg(long, requires = "username")]
    pub password: Option<String>,
}

#[derive(Tabled)]
struct ContextRow {
    #[tabled(rename = "CURRENT")]
    current: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CLUSTER")]
    cluster: String,
    #[tabled(rename = "USER")]
    user: String,
    #[tabled(rename = "DEFAULT NODE")]
    default_node: String,
}

pub fn run(
    command: ConfigCommand,
    service: &mut ConfigService,
    overrides: &ConfigOverrides,
    format: OutputFormat,
) -> Result<Outcome, CliError> {
    match command {
        ConfigCommand::View => {
            service.load(overrides)?;
            let masked = service.masked_config()?;
            match format {
                OutputFormat::Json => output::print_json(&masked)?,
                OutputFormat::Table | OutputFormat::Yaml => output::print_yaml(&masked)?,
            }
        }
        ConfigCommand::CurrentContext => {
            service.load(overrides)?;
            let name = service
                .current_context_name()
                .ok_or_else(|| CliError::NotFound("current-context is not set".to_string()))?;
            println!("{}", name);
        }
        ConfigCommand::GetContexts => {
            service.load(overrides)?;
            let current = service.current_context_name().map(str::to_string);
            let contexts = service.contexts()?;
            let rows: Vec<ContextRow> = contexts
                .iter()
                .map(|context| ContextRow {
                    current: if current.as_deref() == Some(context.name()) {
                        "*".to_string()
                    } else {
                        String::new()
                    },
                    name: context.name().to_string(),
                    cluster: context.cluster().to_string(),
                    user: context.user().to_string(),
                    default_node: context.default_node().unwrap_or_default().to_string(),
                })
                .collect();
            let entries: Vec<_> = contexts.iter().map(|c| c.to_entry()).collect();
            output::print_output(&entries, rows, format)?;
        }
        ConfigCommand::UseContext { name } => {
            service.load(overrides)?;
            service.use_context(&name)?;
            output::print_success(&format!("Switched to context \"{}\"", name));
        }
        ConfigCommand::SetContext(args) => {
            service.load_or_init(overrides)?;
            let context = service.set_context(
                &args.name,
                ContextPatch {
                    cluster: args.cluster,
                    user: args.user,
                    default_node: args.default_node,
                },
            )?;
            output::print_success(&format!("Context \"{}\" set", context.name()));
        }
        ConfigCommand::SetCluster(args) => {
            service.load_or_init(overrides)?;
            let cluster = service.set_cluster(
                &args.name,
                ClusterSettings {
                    server: args.server.unwrap_or_default(),
                    insecure_skip_tls_verify: args.insecure_skip_tls_verify,
                    certificate_authority: args.certificate_authority,
                    timeout: args.timeout,
                    retry_count: args.retry_count,
                    retry_delay: args.retry_delay,
                    max_retry_delay: args.max_retry_delay,
                    retry_writes: args.retry_writes,
                },
            )?;
            output::print_success(&format!("Cluster \"{}\" set", cluster.name()));
        }
        ConfigCommand::SetCredentials(args) => {
            service.load_or_init(overrides)?;
            let user = service.set_credentials(
                &args.name,
                UserSettings {
                    token_id: args.token_id,
                    token_secret: args.token_secret,
                    username: args.username,
                    password: args.password,
                },
            )?;
            output::print_success(&format!("User \"{}\" set", user.name()));
        }
    }
    Ok(Outcome::Success)
}
