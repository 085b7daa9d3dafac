//! Sweep configuration: the axis values to iterate and how to run one case.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`ExecutorConfig::log_root`].
pub const LOG_PATH_ENV: &str = "TRACEBENCH_LOG_PATH";

pub const DEFAULT_CONFIGS: &[&str] = &[
    "settings.openai.toml",
    "settings.azure.toml",
    "settings.watsonx.toml",
];

pub const DEFAULT_MODES: &[&str] = &["fast", "balanced", "accurate"];

pub const DEFAULT_TASKS: &[&str] = &[
    "test_get_top_account_by_revenue_stream",
    "test_list_my_accounts",
    "test_find_vp_sales_active_high_value_accounts",
];

pub const DEFAULT_LOG_FILE_NAME: &str = "demo_server.log";
pub const DEFAULT_LOG_ROOT: &str = "logs/runs";
pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Known axis values plus executor settings, loaded from YAML.
///
/// Every field is optional in the file; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub configs: Vec<String>,
    pub modes: Vec<String>,
    pub tasks: Vec<String>,
    /// Treat a successful run whose log carries no trace id as a failure.
    pub require_trace_id: bool,
    pub executor: ExecutorConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            configs: to_strings(DEFAULT_CONFIGS),
            modes: to_strings(DEFAULT_MODES),
            tasks: to_strings(DEFAULT_TASKS),
            require_trace_id: true,
            executor: ExecutorConfig::default(),
        }
    }
}

impl SweepConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, values) in [
            ("configs", &self.configs),
            ("modes", &self.modes),
            ("tasks", &self.tasks),
        ] {
            if values.is_empty() {
                return Err(ConfigError::invalid(field, "must list at least one value"));
            }
            if let Some(bad) = values.iter().find(|v| v.is_empty() || v.contains(':')) {
                return Err(ConfigError::invalid(
                    field,
                    format!("'{bad}' must be non-empty and must not contain ':'"),
                ));
            }
        }
        if self.executor.program.trim().is_empty() {
            return Err(ConfigError::invalid("executor.program", "must not be empty"));
        }
        if self.executor.timeout_secs == 0 {
            return Err(ConfigError::invalid("executor.timeout_secs", "must be positive"));
        }
        if self.executor.log_file_name.trim().is_empty() {
            return Err(ConfigError::invalid(
                "executor.log_file_name",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// How the external agent process is launched for one test case.
///
/// `args` may contain the placeholders `{config}`, `{mode}`, `{task}` and
/// `{run}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Per-case log directories are created under this root.
    pub log_root: PathBuf,
    /// File inside the per-case log directory that the agent writes to.
    pub log_file_name: String,
    /// Remove the per-case log directory on teardown when false.
    pub keep_logs: bool,
    /// Upper bound on a single task run; the process is killed when exceeded.
    pub timeout_secs: u64,
    /// Extra environment passed to every case, below the per-case overrides.
    pub env: BTreeMap<String, String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            program: "uv".to_string(),
            args: to_strings(&[
                "run",
                "pytest",
                "src/system_tests/e2e/digital_sales_test.py",
                "-k",
                "{task}",
            ]),
            working_dir: None,
            log_root: PathBuf::from(DEFAULT_LOG_ROOT),
            log_file_name: DEFAULT_LOG_FILE_NAME.to_string(),
            keep_logs: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            env: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = SweepConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.configs.len(), 3);
        assert_eq!(config.modes, vec!["fast", "balanced", "accurate"]);
        assert!(config.require_trace_id);
        assert_eq!(config.executor.log_file_name, "demo_server.log");
    }

    #[test]
    fn test_load_partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "configs: [a.toml, b.toml]\nexecutor:\n  program: sh\n  args: [\"-c\", \"echo {{task}}\"]\n"
        )
        .unwrap();

        let config = SweepConfig::load(file.path()).unwrap();
        assert_eq!(config.configs, vec!["a.toml", "b.toml"]);
        assert_eq!(config.modes.len(), 3);
        assert_eq!(config.executor.program, "sh");
        assert_eq!(config.executor.args, vec!["-c", "echo {task}"]);
        assert_eq!(config.executor.log_file_name, DEFAULT_LOG_FILE_NAME);
    }

    #[test]
    fn test_validate_rejects_colon_in_axis_value() {
        let config = SweepConfig {
            modes: vec!["fa:st".to_string()],
            ..SweepConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("modes"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SweepConfig::load("/definitely/not/here.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
