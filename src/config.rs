//! Run configuration, resolved once before any container is started.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the image under test
pub const IMAGE_ENV: &str = "IMAGE_NAME";
pub const DEFAULT_FIXTURES: &str = "testpack/files";
/// Directory under the fixtures root that gets packed
pub const FIXTURE_ENTRY: &str = "html";
/// Where the fixture archive is unpacked inside the container
pub const FIXTURE_DEST: &str = "/var/www";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("I don't know what image to test: IMAGE_NAME is not set")]
    MissingImage,
    #[error("Fixture directory does not exist: {}", .0.display())]
    MissingFixtures(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    pub image: String,
    pub fixtures_root: PathBuf,
    pub fixture_entry: String,
    pub fixture_dest: String,
    pub port: u16,
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
}

impl SuiteConfig {
    /// Validates the image name and fills in defaults for everything else
    pub fn new(image: Option<&str>) -> Result<Self, ConfigError> {
        let image = image
            .map(str::trim)
            .filter(|image| !image.is_empty())
            .ok_or(ConfigError::MissingImage)?;

        Ok(Self {
            image: image.to_string(),
            fixtures_root: PathBuf::from(DEFAULT_FIXTURES),
            fixture_entry: FIXTURE_ENTRY.to_string(),
            fixture_dest: FIXTURE_DEST.to_string(),
            port: DEFAULT_PORT,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Reads the image name from [`IMAGE_ENV`]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(env::var(IMAGE_ENV).ok().as_deref())
    }

    pub fn with_fixtures_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.fixtures_root = root.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Fails when the directory to pack is missing
    pub fn validate(&self) -> Result<(), ConfigError> {
        let source = self.fixtures_root.join(&self.fixture_entry);
        if !source.is_dir() {
            return Err(ConfigError::MissingFixtures(source));
        }
        Ok(())
    }
}
