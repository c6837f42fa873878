//! Chart installer client.
//!
//! The store only persists release metadata. Actually installing or
//! upgrading a chart in a cluster is delegated to the `helm` binary, with
//! the resolved values document handed over through a temporary file.

use std::io::Write;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

use crate::error::{CoreError, ErrorContext};

/// Installs and upgrades chart releases in a cluster.
#[async_trait]
pub trait ChartInstaller: Send + Sync {
    /// Installs a new release. Returns the installer's textual report.
    async fn install(
        &self,
        name: &str,
        namespace: &str,
        chart: &str,
        version: &str,
        values: &str,
    ) -> Result<String, CoreError>;

    /// Upgrades an existing release in place.
    async fn upgrade(
        &self,
        name: &str,
        chart: &str,
        version: &str,
        values: &str,
    ) -> Result<String, CoreError>;

    /// Reports the installed state of a release, or
    /// [`CoreError::ReleaseNotInstalled`] when the cluster has no such
    /// release.
    async fn installed_state(&self, name: &str) -> Result<String, CoreError>;
}

/// Installer backed by the `helm` command-line client.
pub struct HelmCli {
    binary: String,
    timeout_secs: u64,
}

impl HelmCli {
    pub fn new() -> Self {
        Self::with_binary("helm")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout_secs: 300,
        }
    }

    /// Sets the per-operation timeout passed to helm, in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    async fn run(&self, op: &str, args: &[&str]) -> Result<String, CoreError> {
        debug!(op, "invoking {}", self.binary);
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .with_context(|| format!("spawning {}", self.binary))?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(CoreError::HelmCommand {
                op: op.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn values_file(values: &str) -> Result<NamedTempFile, CoreError> {
        let mut file =
            NamedTempFile::new().with_context(|| "creating values tempfile".to_string())?;
        file.write_all(values.as_bytes())
            .with_context(|| "writing values tempfile".to_string())?;
        Ok(file)
    }
}

impl Default for HelmCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChartInstaller for HelmCli {
    async fn install(
        &self,
        name: &str,
        namespace: &str,
        chart: &str,
        version: &str,
        values: &str,
    ) -> Result<String, CoreError> {
        let file = Self::values_file(values)?;
        let values_path = file.path().display().to_string();
        let timeout = format!("{}s", self.timeout_secs);
        let mut args = vec![
            "install",
            name,
            chart,
            "--namespace",
            namespace,
            "--values",
            values_path.as_str(),
            "--timeout",
            timeout.as_str(),
        ];
        if !version.is_empty() {
            args.extend_from_slice(&["--version", version]);
        }
        self.run("install", &args).await
    }

    async fn upgrade(
        &self,
        name: &str,
        chart: &str,
        version: &str,
        values: &str,
    ) -> Result<String, CoreError> {
        let file = Self::values_file(values)?;
        let values_path = file.path().display().to_string();
        let timeout = format!("{}s", self.timeout_secs);
        let mut args = vec![
            "upgrade",
            name,
            chart,
            "--values",
            values_path.as_str(),
            "--timeout",
            timeout.as_str(),
        ];
        if !version.is_empty() {
            args.extend_from_slice(&["--version", version]);
        }
        self.run("upgrade", &args).await
    }

    async fn installed_state(&self, name: &str) -> Result<String, CoreError> {
        match self.run("status", &["status", name]).await {
            Ok(report) => Ok(report),
            Err(CoreError::HelmCommand { stderr, .. }) if stderr.contains("not found") => {
                Err(CoreError::ReleaseNotInstalled(name.to_string()))
            }
            Err(err) => Err(err),
        }
    }
}
