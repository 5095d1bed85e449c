use std::path::PathBuf;

/// Values supplied on the command line. Each one, when present, wins over
/// the environment and the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// `--config`
    pub config_path: Option<PathBuf>,
    /// `--context`
    pub context: Option<String>,
    /// `--server`
    pub server: Option<String>,
    /// `Some(false)` for `--insecure-skip-tls-verify`.
    pub verify_ssl: Option<bool>,
    /// `--request-timeout`, seconds.
    pub timeout: Option<u64>,
    pub retry_count: Option<u32>,
    /// Seconds.
    pub retry_delay: Option<u64>,
    /// Seconds.
    pub max_retry_delay: Option<u64>,
    pub retry_writes: Option<bool>,
}
