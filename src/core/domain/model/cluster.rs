//! Connection settings for one Proxmox VE cluster.
//!
//! A cluster is read from a named `cluster` stanza of the config file:
//!
//! ```yaml
//! clusters:
//!   - name: pve-prod
//!     cluster:
//!       server: https://pve1.example.com:8006
//!       insecure-skip-tls-verify: false
//!       timeout: 60
//! ```

use crate::core::domain::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// The raw `cluster` stanza, exactly as it appears in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterSettings {
    /// Server URL, e.g. `https://pve1.example.com:8006`.
    #[serde(default)]
    pub server: String,
    /// Skip TLS certificate verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_skip_tls_verify: Option<bool>,
    /// Path to a PEM bundle trusted in addition to the system roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Number of retries for failed requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    /// Base retry delay in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<u64>,
    /// Upper bound for the exponential retry delay in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retry_delay: Option<u64>,
    /// Retry POST/PUT/DELETE requests too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_writes: Option<bool>,
}

/// A `clusters[]` list entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: ClusterSettings,
}

/// A validated cluster definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    name: String,
    server: String,
    verify_ssl: bool,
    certificate_authority: Option<String>,
    timeout: Option<u64>,
    retry_count: Option<u32>,
    retry_delay: Option<u64>,
    max_retry_delay: Option<u64>,
    retry_writes: bool,
}

impl Cluster {
    /// Builds a cluster from its settings, enforcing:
    /// - a non-empty server
    /// - positive `timeout`, `retry-delay` and `max-retry-delay` when present
    /// - `max-retry-delay >= retry-delay` when both are present
    pub fn new(name: impl Into<String>, settings: ClusterSettings) -> ConfigResult<Self> {
        let name = name.into();
        let invalid = |message: String| {
            ConfigError::Invalid(format!("cluster '{}': {}", name, message))
        };

        if settings.server.trim().is_empty() {
            return Err(invalid("server is required".to_string()));
        }
        for (key, value) in [
            ("timeout", settings.timeout),
            ("retry-delay", settings.retry_delay),
            ("max-retry-delay", settings.max_retry_delay),
        ] {
            if value == Some(0) {
                return Err(invalid(format!("{} must be a positive integer", key)));
            }
        }
        if let (Some(base), Some(max)) = (settings.retry_delay, settings.max_retry_delay) {
            if max < base {
                return Err(invalid(format!(
                    "max-retry-delay ({}) must be greater than or equal to retry-delay ({})",
                    max, base
                )));
            }
        }

        Ok(Self {
            server: settings.server,
            verify_ssl: !settings.insecure_skip_tls_verify.unwrap_or(false),
            certificate_authority: settings.certificate_authority,
            timeout: settings.timeout,
            retry_count: settings.retry_count,
            retry_delay: settings.retry_delay,
            max_retry_delay: settings.max_retry_delay,
            retry_writes: settings.retry_writes.unwrap_or(false),
            name,
        })
    }

    pub fn from_entry(entry: &NamedCluster) -> ConfigResult<Self> {
        Self::new(entry.name.clone(), entry.cluster.clone())
    }

    /// Converts back to the file representation.
    #[must_use]
    pub fn to_entry(&self) -> NamedCluster {
        NamedCluster {
            name: self.name.clone(),
            cluster: ClusterSettings {
                server: self.server.clone(),
                insecure_skip_tls_verify: (!self.verify_ssl).then_some(true),
                certificate_authority: self.certificate_authority.clone(),
                timeout: self.timeout,
                retry_count: self.retry_count,
                retry_delay: self.retry_delay,
                max_retry_delay: self.max_retry_delay,
                retry_writes: self.retry_writes.then_some(true),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    pub fn certificate_authority(&self) -> Option<&str> {
        self.certificate_authority.as_deref()
    }

    pub fn timeout(&self) -> Option<u64> {
        self.timeout
    }

    pub fn retry_count(&self) -> Option<u32> {
        self.retry_count
    }

    pub fn retry_delay(&self) -> Option<u64> {
        self.retry_delay
    }

    pub fn max_retry_delay(&self) -> Option<u64> {
        self.max_retry_delay
    }

    pub fn retry_writes(&self) -> bool {
        self.retry_writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(server: &str) -> ClusterSettings {
        ClusterSettings {
            server: server.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_cluster() {
        let cluster = Cluster::new("pve-prod", settings("https://pve1.example.com:8006")).unwrap();
        assert_eq!(cluster.name(), "pve-prod");
        assert!(cluster.verify_ssl());
        assert!(!cluster.retry_writes());
        assert_eq!(cluster.timeout(), None);
    }

    #[test]
    fn test_server_required() {
        let result = Cluster::new("empty", settings("  "));
        assert!(matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains("server")));
    }

    #[test]
    fn test_positive_durations() {
        for field in ["timeout", "retry-delay", "max-retry-delay"] {
            let mut s = settings("https://pve");
            match field {
                "timeout" => s.timeout = Some(0),
                "retry-delay" => s.retry_delay = Some(0),
                _ => s.max_retry_delay = Some(0),
            }
            let result = Cluster::new("c", s);
            assert!(
                matches!(&result, Err(ConfigError::Invalid(msg)) if msg.contains(field)),
                "{} = 0 should be rejected",
                field
            );
        }
    }

    #[test]
    fn test_retry_count_may_be_zero() {
        let mut s = settings("https://pve");
        s.retry_count = Some(0);
        assert!(Cluster::new("c", s).is_ok());
    }

    #[test]
    fn test_max_retry_delay_not_below_base() {
        for (base, max, ok) in [(1, 30, true), (5, 5, true), (10, 5, false), (2, 1, false)] {
            let mut s = settings("https://pve");
            s.retry_delay = Some(base);
            s.max_retry_delay = Some(max);
            assert_eq!(Cluster::new("c", s).is_ok(), ok, "base={} max={}", base, max);
        }
    }

    #[test]
    fn test_entry_round_trip() {
        let full = ClusterSettings {
            server: "https://pve1.example.com:8006".to_string(),
            insecure_skip_tls_verify: Some(true),
            certificate_authority: Some("/etc/pve/ca.pem".to_string()),
            timeout: Some(60),
            retry_count: Some(5),
            retry_delay: Some(2),
            max_retry_delay: Some(20),
            retry_writes: Some(true),
        };
        for s in [full, settings("https://pve2.example.com:8006")] {
            let cluster = Cluster::new("pve", s).unwrap();
            let rebuilt = Cluster::from_entry(&cluster.to_entry()).unwrap();
            assert_eq!(rebuilt, cluster);
        }
    }

    #[test]
    fn test_insecure_flag_inverts_verify_ssl() {
        let mut s = settings("https://pve");
        s.insecure_skip_tls_verify = Some(true);
        let cluster = Cluster::new("dev", s).unwrap();
        assert!(!cluster.verify_ssl());
        assert_eq!(cluster.to_entry().cluster.insecure_skip_tls_verify, Some(true));

        let secure = Cluster::new("prod", settings("https://pve")).unwrap();
        assert_eq!(secure.to_entry().cluster.insecure_skip_tls_verify, None);
    }

    #[test]
    fn test_deserialize_kebab_case_stanza() {
        let yaml = r#"
name: pve-dev
cluster:
  server: https://pve-dev.example.com:8006
  insecure-skip-tls-verify: true
  retry-count: 0
  max-retry-delay: 10
"#;
        let entry: NamedCluster = serde_yaml::from_str(yaml).unwrap();
        let cluster = Cluster::from_entry(&entry).unwrap();
        assert!(!cluster.verify_ssl());
        assert_eq!(cluster.retry_count(), Some(0));
        assert_eq!(cluster.max_retry_delay(), Some(10));
    }
}
