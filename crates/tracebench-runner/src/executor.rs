//! Per-case environment preparation and task execution.

use crate::config::ExecutorConfig;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracebench_types::TestCase;
use tracing::{debug, info, warn};

pub const AGENT_SETTING_CONFIG_ENV: &str = "AGENT_SETTING_CONFIG";
pub const AGENT_MODE_ENV: &str = "DYNACONF_FEATURES__CUGA_MODE";
pub const TRACING_ENABLED_ENV: &str = "DYNACONF_ADVANCED_FEATURES__LANGFUSE_TRACING";

/// Log lines appended to a failure message.
const FAILURE_TAIL_LINES: usize = 20;

/// Environment overrides selecting the backend config and mode of one case.
pub fn env_overrides(case: &TestCase) -> BTreeMap<String, String> {
    BTreeMap::from([
        (AGENT_SETTING_CONFIG_ENV.to_string(), case.config.clone()),
        (AGENT_MODE_ENV.to_string(), case.mode.clone()),
        (TRACING_ENABLED_ENV.to_string(), "true".to_string()),
    ])
}

/// Everything a prepared test case needs to run and be inspected afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TestEnvironment {
    pub case: TestCase,
    pub log_dir: PathBuf,
    /// Log the trace id is extracted from after a successful run
    pub log_file: PathBuf,
    pub overrides: BTreeMap<String, String>,
}

impl TestEnvironment {
    pub fn new(case: &TestCase, log_dir: PathBuf, log_file_name: &str) -> Self {
        Self {
            case: case.clone(),
            log_file: log_dir.join(log_file_name),
            log_dir,
            overrides: env_overrides(case),
        }
    }
}

/// Runs one task under a prepared environment.
///
/// `environment` only describes where the case lives and cannot fail, so the
/// orchestrator always holds something to tear down. `tear_down` is called
/// exactly once per case, also when `set_up` failed halfway, and must cope
/// with a partially prepared environment.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    fn environment(&self, case: &TestCase) -> TestEnvironment;

    async fn set_up(&self, env: &TestEnvironment) -> Result<()>;

    async fn run(&self, env: &TestEnvironment, case: &TestCase) -> Result<()>;

    async fn tear_down(&self, env: TestEnvironment) -> Result<()>;
}

/// Launches the configured program once per case with the case's
/// environment overrides, capturing its output into the case log.
#[derive(Debug, Clone)]
pub struct ProcessTaskExecutor {
    config: ExecutorConfig,
}

impl ProcessTaskExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    fn case_dir_name(case: &TestCase) -> String {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3f");
        let raw = format!("{}_{}_{}_run{}_{stamp}", case.config, case.mode, case.task, case.run);
        raw.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }

    fn render_args(&self, case: &TestCase) -> Vec<String> {
        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{config}", &case.config)
                    .replace("{mode}", &case.mode)
                    .replace("{task}", &case.task)
                    .replace("{run}", &case.run.to_string())
            })
            .collect()
    }
}

#[async_trait]
impl TaskExecutor for ProcessTaskExecutor {
    fn environment(&self, case: &TestCase) -> TestEnvironment {
        let log_dir = self.config.log_root.join(Self::case_dir_name(case));
        TestEnvironment::new(case, log_dir, &self.config.log_file_name)
    }

    async fn set_up(&self, env: &TestEnvironment) -> Result<()> {
        tokio::fs::create_dir_all(&env.log_dir)
            .await
            .with_context(|| format!("Failed to create log directory {}", env.log_dir.display()))?;
        tokio::fs::write(&env.log_file, b"")
            .await
            .with_context(|| format!("Failed to create log file {}", env.log_file.display()))?;

        debug!(case = %env.case, log_dir = %env.log_dir.display(), "Test environment ready");
        Ok(())
    }

    async fn run(&self, env: &TestEnvironment, case: &TestCase) -> Result<()> {
        let stdout = OpenOptions::new()
            .append(true)
            .open(&env.log_file)
            .with_context(|| format!("Failed to open log file {}", env.log_file.display()))?;
        let stderr = stdout.try_clone()?;

        let args = self.render_args(case);
        info!(
            case = %case,
            program = %self.config.program,
            args = %args.join(" "),
            "Launching task"
        );

        let mut cmd = Command::new(&self.config.program);
        cmd.args(&args)
            .envs(&self.config.env)
            .envs(&env.overrides)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true);
        // Own process group, so a timeout also reaches the task's children.
        #[cfg(unix)]
        cmd.process_group(0);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to start '{}'", self.config.program))?;

        let limit = Duration::from_secs(self.config.timeout_secs);
        let waited = timeout(limit, child.wait()).await;
        let status = match waited {
            Ok(status) => status.context("Failed to wait for task process")?,
            Err(_) => {
                kill_process_tree(&mut child).await;
                bail!(
                    "Task '{}' timed out after {} seconds",
                    case.task,
                    self.config.timeout_secs
                );
            }
        };

        if !status.success() {
            let tail = log_tail(&env.log_file, FAILURE_TAIL_LINES);
            if tail.is_empty() {
                bail!("Task '{}' exited with {status}", case.task);
            }
            bail!("Task '{}' exited with {status}\n{tail}", case.task);
        }
        Ok(())
    }

    async fn tear_down(&self, env: TestEnvironment) -> Result<()> {
        if self.config.keep_logs {
            debug!(log_dir = %env.log_dir.display(), "Keeping test logs");
            return Ok(());
        }
        match tokio::fs::remove_dir_all(&env.log_dir).await {
            Ok(()) => Ok(()),
            // set_up never got as far as creating it
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", env.log_dir.display())),
        }
    }
}

/// Kill the task and every process it started in its group.
async fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // A negative pid addresses the whole process group.
            let rc = unsafe { libc::kill(-(pid as libc::pid_t), libc::SIGKILL) };
            if rc != 0 {
                warn!(
                    pid,
                    error = %std::io::Error::last_os_error(),
                    "Failed to kill task process group"
                );
            }
        }
    }
    if let Err(e) = child.kill().await {
        debug!(error = %e, "Task process already gone");
    }
}

/// Last `lines` lines of the log, empty if it cannot be read.
fn log_tail(path: &Path, lines: usize) -> String {
    let Ok(bytes) = std::fs::read(path) else {
        return String::new();
    };
    let content = String::from_utf8_lossy(&bytes);
    let all: Vec<&str> = content.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides() {
        let case = TestCase::new("settings.azure.toml", "balanced", "t1", 1);
        let overrides = env_overrides(&case);
        assert_eq!(overrides[AGENT_SETTING_CONFIG_ENV], "settings.azure.toml");
        assert_eq!(overrides[AGENT_MODE_ENV], "balanced");
        assert_eq!(overrides[TRACING_ENABLED_ENV], "true");
    }

    #[test]
    fn test_render_args_substitutes_placeholders() {
        let executor = ProcessTaskExecutor::new(ExecutorConfig {
            args: vec!["-k".into(), "{task}".into(), "--cfg={config}/{mode}#{run}".into()],
            ..ExecutorConfig::default()
        });
        let case = TestCase::new("a.toml", "fast", "test_x", 2);
        assert_eq!(
            executor.render_args(&case),
            vec!["-k", "test_x", "--cfg=a.toml/fast#2"]
        );
    }

    #[test]
    fn test_case_dir_name_is_path_safe() {
        let case = TestCase::new("settings.openai.toml", "fast", "t/1", 3);
        let name = ProcessTaskExecutor::case_dir_name(&case);
        assert!(name.starts_with("settings_openai_toml_fast_t_1_run3_"));
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_log_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log");
        std::fs::write(&path, "1\n2\n3\n4\n").unwrap();
        assert_eq!(log_tail(&path, 2), "3\n4");
        assert_eq!(log_tail(&path, 10), "1\n2\n3\n4");
        assert_eq!(log_tail(&dir.path().join("missing"), 2), "");
    }
}
