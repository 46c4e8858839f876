use anyhow::{anyhow, Context, Result};
use log::{debug, info, trace};
use std::io::Write;
use std::process::{Command, Output, Stdio};

use super::engine::{ContainerRuntime, ExecOutput, RunSpec};
use super::inspect::ContainerDetails;

/// [`ContainerRuntime`] backed by a docker-compatible command line tool
pub struct CliRuntime {
    binary: String,
}

impl CliRuntime {
    /// Uses the `docker` binary, failing early if it cannot be executed
    pub fn docker() -> Result<Self> {
        Self::detect("docker")
    }

    /// Uses the `nerdctl` binary, failing early if it cannot be executed
    pub fn nerdctl() -> Result<Self> {
        Self::detect("nerdctl")
    }

    fn detect(binary: &str) -> Result<Self> {
        let output = Command::new(binary)
            .arg("--version")
            .output()
            .context(format!(
                "Failed to execute {} command. Is {} installed and running?",
                binary, binary
            ))?;

        if !output.status.success() {
            return Err(anyhow!("{} is not available", binary));
        }

        debug!(
            "Using {}",
            String::from_utf8_lossy(&output.stdout).trim_end()
        );
        Ok(Self {
            binary: binary.to_string(),
        })
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        trace!("{} {:?}", self.binary, args);
        Command::new(&self.binary)
            .args(args)
            .output()
            .context(format!("Failed to execute {} command: {:?}", self.binary, args))
    }

    fn run_command(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("{} command failed: {}", self.binary, error.trim_end()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// stdout followed by stderr, lossily decoded
fn merged(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

impl ContainerRuntime for CliRuntime {
    fn name(&self) -> &str {
        &self.binary
    }

    fn run_detached(&self, spec: &RunSpec) -> Result<String> {
        let mut args = vec!["run", "--detach", "--network", spec.network.as_str()];
        if spec.auto_remove {
            args.push("--rm");
        }
        args.push(spec.image.as_str());

        info!("Starting container from image '{}'...", spec.image);
        let stdout = self.run_command(&args)?;

        // Pull progress may precede the id, which is always printed last
        let id = stdout
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .ok_or_else(|| anyhow!("{} run did not print a container id", self.binary))?;
        Ok(id.to_string())
    }

    fn inspect(&self, container_id: &str) -> Result<ContainerDetails> {
        let stdout = self.run_command(&["inspect", container_id])?;
        ContainerDetails::from_inspect_json(&stdout)
            .context(format!("Failed to inspect container {}", container_id))
    }

    fn put_archive(&self, container_id: &str, dest: &str, archive: &[u8]) -> Result<()> {
        let target = format!("{}:{}", container_id, dest);
        debug!("Uploading {} byte archive to {}", archive.len(), target);

        let mut child = Command::new(&self.binary)
            .args(["cp", "-", target.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context(format!("Failed to execute {} cp", self.binary))?;

        child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("{} cp has no stdin", self.binary))?
            .write_all(archive)
            .context("Failed to stream archive")?;

        let output = child
            .wait_with_output()
            .context(format!("Failed to wait for {} cp", self.binary))?;
        if !output.status.success() {
            return Err(anyhow!(
                "Failed to upload archive to {}: {}",
                target,
                String::from_utf8_lossy(&output.stderr).trim_end()
            ));
        }

        Ok(())
    }

    fn exec(&self, container_id: &str, command: &[&str]) -> Result<ExecOutput> {
        let mut args = vec!["exec", container_id];
        args.extend_from_slice(command);

        let output = self.output(&args)?;
        // Killed by a signal has no code
        let exit_code = output.status.code().unwrap_or(-1);
        Ok(ExecOutput {
            exit_code,
            output: merged(&output),
        })
    }

    fn logs(&self, container_id: &str) -> Result<String> {
        let output = self.output(&["logs", container_id])?;
        if !output.status.success() {
            return Err(anyhow!(
                "{} logs failed: {}",
                self.binary,
                String::from_utf8_lossy(&output.stderr).trim_end()
            ));
        }
        Ok(merged(&output))
    }

    fn stop(&self, container_id: &str) -> Result<()> {
        info!("Stopping container {}...", container_id);
        self.run_command(&["stop", container_id])?;
        Ok(())
    }
}
