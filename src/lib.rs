pub mod apache;
pub mod browser;
pub mod checks;
pub mod config;
pub mod container;
pub mod fixture;
pub mod listing;
pub mod notifier;
pub mod runtime;
pub mod suite;

// Re-exports for easy access
pub use browser::{Browser, HttpBrowser, Page};
pub use checks::{Check, CheckContext, CheckError};
pub use config::{ConfigError, SuiteConfig};
pub use container::Container;
pub use notifier::Notifier;
pub use runtime::{CliRuntime, ContainerRuntime};
pub use suite::{Suite, SuiteReport};
