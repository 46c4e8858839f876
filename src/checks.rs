//! Building blocks for checks against the running container.
//!
//! A [`Check`] is a named function over a [`CheckContext`]. Assertion helpers
//! on the context return [`CheckError::Assertion`] with the diagnostic for the
//! first expectation that does not hold; runtime or browser failures surface
//! as [`CheckError::Infrastructure`].

use thiserror::Error;

use crate::browser::{Browser, Page};
use crate::container::Container;
use crate::listing::ListingEntry;
use crate::runtime::ExecOutput;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{0}")]
    Assertion(String),
    #[error(transparent)]
    Infrastructure(#[from] anyhow::Error),
}

impl CheckError {
    pub fn is_assertion(&self) -> bool {
        matches!(self, CheckError::Assertion(_))
    }
}

pub type CheckResult = Result<(), CheckError>;

/// Fails with `message` unless `condition` holds
pub fn ensure(condition: bool, message: impl Into<String>) -> CheckResult {
    if condition {
        Ok(())
    } else {
        Err(CheckError::Assertion(message.into()))
    }
}

/// Fails with `message` unless `actual == expected`
pub fn ensure_eq<T>(actual: T, expected: T, message: impl Into<String>) -> CheckResult
where
    T: PartialEq + std::fmt::Debug,
{
    if actual == expected {
        Ok(())
    } else {
        Err(CheckError::Assertion(format!(
            "{}: expected {:?}, got {:?}",
            message.into(),
            expected,
            actual
        )))
    }
}

/// Shared state handed to every check
pub struct CheckContext<'a> {
    pub container: &'a Container<'a>,
    pub browser: &'a dyn Browser,
    pub port: u16,
}

impl CheckContext<'_> {
    pub fn run(&self, command: &[&str]) -> Result<ExecOutput, CheckError> {
        Ok(self.container.exec(command)?)
    }

    /// Merged output of `command`, ignoring its exit status
    pub fn exec(&self, command: &[&str]) -> Result<String, CheckError> {
        Ok(self.run(command)?.output)
    }

    pub fn assert_package_installed(&self, package: &str) -> CheckResult {
        let output = self.exec(&["dpkg", "-l", package])?;
        ensure(
            output.contains(package),
            format!("{} package not installed", package),
        )
    }

    pub fn assert_process_running(&self, process: &str) -> CheckResult {
        let output = self.exec(&["ps", "-ef"])?;
        ensure(output.contains(process), format!("{} not running", process))
    }

    /// Fails with "`<path>` is missing" when `output` reports a missing path
    pub fn assert_present(&self, path: &str, output: &ExecOutput) -> CheckResult {
        ensure(!output.reports_missing_path(), format!("{} is missing", path))
    }

    /// Runs `ls` with `flags` on `path` and parses the resulting line
    pub fn listing(&self, flags: &str, path: &str) -> Result<ListingEntry, CheckError> {
        let output = self.run(&["ls", flags, path])?;
        self.assert_present(path, &output)?;
        ListingEntry::parse(&output.output).map_err(|e| {
            CheckError::Assertion(format!("Unexpected listing for {}: {:#}", path, e))
        })
    }

    /// Content of `path`, failing when it does not exist
    pub fn read_file(&self, path: &str) -> Result<String, CheckError> {
        let output = self.run(&["cat", path])?;
        self.assert_present(path, &output)?;
        Ok(output.output)
    }

    /// Every line of `expected` must appear in the container log; all missing
    /// lines are reported together.
    pub fn assert_logs_contain(&self, expected: &[&str]) -> CheckResult {
        let logs = self.container.logs()?;
        let missing: Vec<&str> = expected
            .iter()
            .copied()
            .filter(|line| !logs.contains(line))
            .collect();

        ensure(
            missing.is_empty(),
            format!(
                "Docker log line missing: {} from ({})",
                missing.join(", "),
                logs.trim_end()
            ),
        )
    }

    /// Loads `path` on the container's port in a new browser session
    pub fn open(&self, path: &str, headers: &[(&str, &str)]) -> Result<Page, CheckError> {
        let url = self.container.url(self.port, path);
        Ok(self.browser.open(&url, headers)?)
    }
}

/// A named, independent check
#[derive(Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    run: fn(&CheckContext<'_>) -> CheckResult,
}

impl Check {
    pub const fn new(name: &'static str, run: fn(&CheckContext<'_>) -> CheckResult) -> Self {
        Self { name, run }
    }

    pub fn run(&self, context: &CheckContext<'_>) -> CheckResult {
        (self.run)(context)
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check").field("name", &self.name).finish()
    }
}
