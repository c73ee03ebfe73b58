use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Centralized configuration for the crmctl server and jobs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    pub server: ServerSettings,
    pub jobs: JobsSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: SocketAddr,
    /// Path the GraphQL endpoint is mounted on
    pub graphql_path: String,
    /// PostgreSQL URL; `None` means the in-memory store
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub cors_permissive: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            graphql_path: "/graphql".to_string(),
            database_url: None,
            max_connections: 5,
            cors_permissive: false,
        }
    }
}

/// Job settings. A partial `[jobs.<name>]` table only overrides the keys it
/// sets; everything else comes from that job's entry in [`JobsSettings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JobsFile")]
pub struct JobsSettings {
    /// Endpoint the jobs call
    pub graphql_url: String,
    pub heartbeat: JobSettings,
    pub low_stock: JobSettings,
    pub order_reminders: JobSettings,
    pub report: JobSettings,
}

impl Default for JobsSettings {
    fn default() -> Self {
        Self {
            graphql_url: "http://127.0.0.1:8000/graphql".to_string(),
            heartbeat: JobSettings {
                enabled: true,
                every_secs: Some(300),
                cron: None,
                log_path: PathBuf::from("/tmp/crm_heartbeat_log.txt"),
                timeout_secs: 5,
            },
            low_stock: JobSettings {
                enabled: true,
                every_secs: None,
                cron: Some("0 0 */12 * * *".to_string()),
                log_path: PathBuf::from("/tmp/low_stock_updates_log.txt"),
                timeout_secs: 10,
            },
            order_reminders: JobSettings {
                enabled: true,
                every_secs: None,
                cron: Some("0 0 8 * * *".to_string()),
                log_path: PathBuf::from("/tmp/order_reminders_log.txt"),
                timeout_secs: 10,
            },
            report: JobSettings {
                enabled: true,
                every_secs: None,
                cron: Some("0 0 6 * * Mon".to_string()),
                log_path: PathBuf::from("/tmp/crm_report_log.txt"),
                timeout_secs: 10,
            },
        }
    }
}

/// One job's cadence and output. `every_secs` wins over `cron` when both are set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSettings {
    pub enabled: bool,
    pub every_secs: Option<u64>,
    pub cron: Option<String>,
    pub log_path: PathBuf,
    pub timeout_secs: u64,
}

/// `[jobs]` as written in the file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JobsFile {
    graphql_url: Option<String>,
    heartbeat: JobOverrides,
    low_stock: JobOverrides,
    order_reminders: JobOverrides,
    report: JobOverrides,
}

/// `[jobs.<name>]` as written in the file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JobOverrides {
    enabled: Option<bool>,
    every_secs: Option<u64>,
    cron: Option<String>,
    log_path: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

impl JobOverrides {
    /// Setting either cadence key replaces the default cadence as a whole.
    fn apply(self, defaults: JobSettings) -> JobSettings {
        let (every_secs, cron) = if self.every_secs.is_some() || self.cron.is_some() {
            (self.every_secs, self.cron)
        } else {
            (defaults.every_secs, defaults.cron)
        };
        JobSettings {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            every_secs,
            cron,
            log_path: self.log_path.unwrap_or(defaults.log_path),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }
}

impl From<JobsFile> for JobsSettings {
    fn from(file: JobsFile) -> Self {
        let defaults = JobsSettings::default();
        Self {
            graphql_url: file.graphql_url.unwrap_or(defaults.graphql_url),
            heartbeat: file.heartbeat.apply(defaults.heartbeat),
            low_stock: file.low_stock.apply(defaults.low_stock),
            order_reminders: file.order_reminders.apply(defaults.order_reminders),
            report: file.report.apply(defaults.report),
        }
    }
}

impl CrmConfig {
    /// Load config from an explicit path, or from ~/.crmctl/config.toml.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!(path = ?default_path, "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content).context(format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid TOML")
    }

    /// Get config file path: ~/.crmctl/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".crmctl/config.toml")
    }

    /// Apply DATABASE_URL, CRM_BIND and CRM_GRAPHQL_URL
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.is_empty() {
                self.server.database_url = Some(url);
            }
        }
        if let Ok(bind) = env::var("CRM_BIND") {
            self.server.bind = bind
                .parse()
                .context(format!("CRM_BIND is not a socket address: {}", bind))?;
        }
        if let Ok(url) = env::var("CRM_GRAPHQL_URL") {
            self.jobs.graphql_url = url;
        }
        Ok(())
    }

    /// Serialize to pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Save config to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)
            .context(format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = CrmConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = CrmConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = CrmConfig::from_toml(
            r#"
            [server]
            graphql_path = "/api/graphql"

            [jobs.heartbeat]
            every_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.server.graphql_path, "/api/graphql");
        assert_eq!(config.server.bind.port(), 8000);
        assert_eq!(config.jobs.heartbeat.every_secs, Some(60));
        assert!(config.jobs.heartbeat.enabled);
        assert_eq!(config.jobs.heartbeat.timeout_secs, 5);
        assert_eq!(
            config.jobs.heartbeat.log_path,
            PathBuf::from("/tmp/crm_heartbeat_log.txt")
        );
        assert_eq!(
            config.jobs.report.log_path,
            PathBuf::from("/tmp/crm_report_log.txt")
        );
    }

    #[test]
    fn partial_job_table_keeps_that_jobs_defaults() {
        let config = CrmConfig::from_toml(
            r#"
            [jobs.heartbeat]
            log_path = "/var/log/crm/heartbeat.txt"

            [jobs.report]
            every_secs = 3600
            timeout_secs = 30
            "#,
        )
        .unwrap();

        let heartbeat = &config.jobs.heartbeat;
        assert_eq!(heartbeat.log_path, PathBuf::from("/var/log/crm/heartbeat.txt"));
        assert_eq!(heartbeat.timeout_secs, 5);
        assert_eq!(heartbeat.every_secs, Some(300));

        let report = &config.jobs.report;
        assert_eq!(report.every_secs, Some(3600));
        assert_eq!(report.cron, None);
        assert_eq!(report.timeout_secs, 30);
        assert_eq!(report.log_path, PathBuf::from("/tmp/crm_report_log.txt"));

        assert_eq!(config.jobs.low_stock, JobsSettings::default().low_stock);
    }

    #[test]
    fn cron_in_file_replaces_default_interval() {
        let config = CrmConfig::from_toml(
            r#"
            [jobs.heartbeat]
            cron = "0 */10 * * * *"
            "#,
        )
        .unwrap();
        assert_eq!(config.jobs.heartbeat.every_secs, None);
        assert_eq!(config.jobs.heartbeat.cron.as_deref(), Some("0 */10 * * * *"));
    }

    #[test]
    fn save_and_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut config = CrmConfig::default();
        config.jobs.graphql_url = "http://crm.internal/graphql".into();
        config.save(&path).unwrap();

        let loaded = CrmConfig::from_file(&path).unwrap();
        assert_eq!(loaded.jobs.graphql_url, "http://crm.internal/graphql");
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CrmConfig::from_file(&dir.path().join("nope.toml")).is_err());
    }
}
