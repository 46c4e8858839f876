use anyhow::Result;

use super::inspect::ContainerDetails;

/// How a container should be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub image: String,
    pub network: String,
    /// Remove the container once it stops
    pub auto_remove: bool,
}

impl RunSpec {
    /// Detached run on the default bridge network with auto-removal.
    pub fn detached(image: &str) -> Self {
        Self {
            image: image.to_string(),
            network: "bridge".to_string(),
            auto_remove: true,
        }
    }
}

/// Result of a command executed inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i32,
    /// stdout followed by stderr
    pub output: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// `true` when the command complained about a missing path.
    pub fn reports_missing_path(&self) -> bool {
        self.output.contains("No such file or directory")
    }
}

/// Operations a container engine must provide for the image checks
pub trait ContainerRuntime {
    /// Returns the name of the engine for identification purposes
    fn name(&self) -> &str;

    /// Starts a detached container and returns its id
    fn run_detached(&self, spec: &RunSpec) -> Result<String>;

    /// Reads the runtime's view of a container
    fn inspect(&self, container_id: &str) -> Result<ContainerDetails>;

    /// Uploads a (possibly compressed) tar archive and unpacks it under `dest`
    fn put_archive(&self, container_id: &str, dest: &str, archive: &[u8]) -> Result<()>;

    /// Executes `command` inside the container.
    ///
    /// A non-zero exit status of the command is not an error; only a failure to
    /// reach the runtime is.
    fn exec(&self, container_id: &str, command: &[&str]) -> Result<ExecOutput>;

    /// Returns the aggregated stdout/stderr log of the container
    fn logs(&self, container_id: &str) -> Result<String>;

    /// Stops the container
    fn stop(&self, container_id: &str) -> Result<()>;
}

impl<R: ContainerRuntime + ?Sized> ContainerRuntime for &R {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run_detached(&self, spec: &RunSpec) -> Result<String> {
        (**self).run_detached(spec)
    }

    fn inspect(&self, container_id: &str) -> Result<ContainerDetails> {
        (**self).inspect(container_id)
    }

    fn put_archive(&self, container_id: &str, dest: &str, archive: &[u8]) -> Result<()> {
        (**self).put_archive(container_id, dest, archive)
    }

    fn exec(&self, container_id: &str, command: &[&str]) -> Result<ExecOutput> {
        (**self).exec(container_id, command)
    }

    fn logs(&self, container_id: &str) -> Result<String> {
        (**self).logs(container_id)
    }

    fn stop(&self, container_id: &str) -> Result<()> {
        (**self).stop(container_id)
    }
}
