//! Container runtime boundary.
//!
//! Everything the checks need from a container engine goes through the
//! [`ContainerRuntime`] trait. [`CliRuntime`] implements it by shelling out to
//! a docker-compatible command line (`docker` or `nerdctl`).

pub mod cli;
pub mod engine;
pub mod inspect;

pub use cli::CliRuntime;
pub use engine::{ContainerRuntime, ExecOutput, RunSpec};
pub use inspect::ContainerDetails;
