//! The single container instance shared by every check.
//!
//! [`Container`] owns the running instance: it is started once, read by all
//! checks, and stopped exactly once, either through [`Container::stop`] or,
//! on any early exit, when the guard is dropped.

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::thread;
use std::time::{Duration, Instant};

use crate::runtime::{ContainerRuntime, ExecOutput, RunSpec};

pub struct Container<'r> {
    runtime: Box<dyn ContainerRuntime + 'r>,
    id: String,
    address: String,
    stopped: bool,
}

impl<'r> Container<'r> {
    /// Starts a detached container and resolves its network address.
    ///
    /// If anything fails after the container is created, it is stopped before
    /// the error is returned.
    pub fn start(runtime: impl ContainerRuntime + 'r, spec: &RunSpec) -> Result<Self> {
        let runtime: Box<dyn ContainerRuntime + 'r> = Box::new(runtime);
        let id = runtime
            .run_detached(spec)
            .with_context(|| format!("Failed to start image {}", spec.image))?;
        info!("Started container {} with {}", id, runtime.name());

        let mut container = Self {
            runtime,
            id,
            address: String::new(),
            stopped: false,
        };

        let details = container.runtime.inspect(&container.id)?;
        container.address = details
            .ip_address()
            .ok_or_else(|| anyhow!("Container {} has no network address", container.id))?
            .to_string();
        debug!("Container address: {}", container.address);

        Ok(container)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Address on the container network, non-empty for the whole run
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn url(&self, port: u16, path: &str) -> String {
        format!("http://{}:{}{}", self.address, port, path)
    }

    pub fn upload(&self, dest: &str, archive: &[u8]) -> Result<()> {
        self.runtime
            .put_archive(&self.id, dest, archive)
            .with_context(|| format!("Failed to copy fixtures to {}", dest))
    }

    pub fn exec(&self, command: &[&str]) -> Result<ExecOutput> {
        self.runtime
            .exec(&self.id, command)
            .with_context(|| format!("Failed to exec {:?}", command))
    }

    pub fn logs(&self) -> Result<String> {
        self.runtime
            .logs(&self.id)
            .with_context(|| format!("Failed to read logs of {}", self.id))
    }

    /// Polls `is_ready` until it reports ready or `timeout` elapses.
    ///
    /// `is_ready` receives the time left before the deadline and must not block
    /// longer than that. Its errors count as "not ready yet".
    pub fn wait_until_ready<F>(&self, timeout: Duration, interval: Duration, mut is_ready: F) -> Result<()>
    where
        F: FnMut(&Self, Duration) -> Result<bool>,
    {
        let started = Instant::now();
        loop {
            let remaining = timeout.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Err(anyhow!(
                    "Container {} not ready after {:?}",
                    self.id,
                    timeout
                ));
            }

            match is_ready(self, remaining) {
                Ok(true) => {
                    debug!("Container ready after {:?}", started.elapsed());
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) => debug!("Not ready yet: {:#}", e),
            }

            thread::sleep(interval.min(timeout.saturating_sub(started.elapsed())));
        }
    }

    /// Stops the container, consuming the guard
    pub fn stop(mut self) -> Result<()> {
        self.stopped = true;
        self.runtime
            .stop(&self.id)
            .with_context(|| format!("Failed to stop container {}", self.id))
    }
}

impl Drop for Container<'_> {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Err(e) = self.runtime.stop(&self.id) {
            warn!("Failed to stop container {}: {:#}", self.id, e);
        }
    }
}
