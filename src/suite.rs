//! Setup, check execution and teardown for one image.
//!
//! [`Suite::run`] is strictly sequential:
//! 1. **Start** one detached container from the configured image.
//! 2. **Upload** the fixture archive into it.
//! 3. **Wait** (bounded) until the web server answers on its port.
//! 4. **Check** every entry of the checklist against that single container.
//! 5. **Stop** the container, on every exit path.
//!
//! Assertion failures are recorded per check and never stop the run. An
//! infrastructure failure (runtime or browser unreachable) aborts the remaining
//! checks; the container is still stopped by the [`Container`] guard.

use anyhow::Result;
use log::{debug, info};
use std::time::{Duration, Instant};

use crate::browser::Browser;
use crate::checks::{Check, CheckContext, CheckError};
use crate::config::SuiteConfig;
use crate::container::Container;
use crate::fixture::FixtureArchive;
use crate::notifier::Notifier;
use crate::runtime::{ContainerRuntime, RunSpec};

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub name: &'static str,
    /// `None` when the check passed, otherwise its diagnostic
    pub failure: Option<String>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn status_line(&self) -> String {
        if self.passed() {
            format!("{} ... ok", self.name)
        } else {
            format!("{} ... FAILED", self.name)
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    pub image: String,
    pub address: String,
    pub checks: Vec<CheckReport>,
    pub elapsed: Duration,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(CheckReport::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckReport> {
        self.checks.iter().filter(|check| !check.passed())
    }

    pub fn render_failures(&self) -> Vec<String> {
        self.failures()
            .map(|check| {
                format!(
                    "FAIL: {}\n{}",
                    check.name,
                    check.failure.as_deref().unwrap_or_default()
                )
            })
            .collect()
    }

    pub fn summary(&self) -> String {
        let failed = self.failures().count();
        let verdict = if failed == 0 {
            "OK".to_string()
        } else {
            format!("FAILED (failures={})", failed)
        };
        format!(
            "Ran {} checks against {} in {:.3}s\n{}",
            self.checks.len(),
            self.image,
            self.elapsed.as_secs_f64(),
            verdict
        )
    }
}

pub struct Suite {
    config: SuiteConfig,
    checks: Vec<Check>,
}

impl Suite {
    pub fn new(config: SuiteConfig, checks: &[Check]) -> Self {
        Self {
            config,
            checks: checks.to_vec(),
        }
    }

    /// Runs every check against one fresh container
    ///
    /// # Errors
    /// - The fixture directory cannot be packed.
    /// - The container cannot be started, inspected, reached or stopped.
    /// - A check could not talk to the runtime or the browser.
    ///
    /// Failed assertions are not errors; they are reported in [`SuiteReport`].
    pub fn run<R, B>(&self, runtime: R, browser: &B, notifier: &Notifier) -> Result<SuiteReport>
    where
        R: ContainerRuntime,
        B: Browser,
    {
        let started = Instant::now();
        let config = &self.config;

        // Packed before the container starts
        let archive = FixtureArchive::build(&config.fixtures_root, &config.fixture_entry)?;

        notifier.info(&format!(
            "Starting {} with {}...",
            config.image,
            runtime.name()
        ));
        let container = Container::start(runtime, &RunSpec::detached(&config.image))?;

        notifier.info(&format!(
            "Copying {} into {}...",
            config.fixtures_root.join(&config.fixture_entry).display(),
            config.fixture_dest
        ));
        container.upload(&config.fixture_dest, archive.as_bytes())?;

        // Any HTTP answer, whatever the status, means apache is serving
        let ready_url = container.url(config.port, "/");
        notifier.info(&format!("Waiting for {}...", ready_url));
        container.wait_until_ready(config.ready_timeout, config.poll_interval, |_, remaining| {
            browser.open_within(&ready_url, &[], remaining).map(|_| true)
        })?;

        let context = CheckContext {
            container: &container,
            browser,
            port: config.port,
        };

        let mut reports = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            notifier.check_started(check.name);
            debug!("Running check {}", check.name);

            let failure = match check.run(&context) {
                Ok(()) => None,
                Err(CheckError::Assertion(message)) => Some(message),
                Err(CheckError::Infrastructure(e)) => {
                    return Err(e.context(format!("Check {} could not run", check.name)));
                }
            };

            let report = CheckReport {
                name: check.name,
                failure,
            };
            notifier.check_finished(&report);
            reports.push(report);
        }

        let address = container.address().to_string();
        container.stop()?;
        info!("Finished {} checks", reports.len());

        Ok(SuiteReport {
            image: config.image.clone(),
            address,
            checks: reports,
            elapsed: started.elapsed(),
        })
    }
}

/// Process exit code for a finished run: zero only when every check passed
pub fn exit_code(result: &Result<SuiteReport>) -> i32 {
    match result {
        Ok(report) if report.passed() => 0,
        _ => 1,
    }
}
