//! Docker integration tests
//!
//! Runs the real checklist against the image named by `IMAGE_NAME` using the
//! docker daemon and the fixtures under `testpack/files`.

#[cfg(all(test, feature = "docker"))]
mod tests {
    use apache_image_check::runtime::{ContainerRuntime, RunSpec};
    use apache_image_check::{apache, CliRuntime, Container, HttpBrowser, Notifier, Suite, SuiteConfig};
    use std::time::Duration;

    fn config() -> SuiteConfig {
        SuiteConfig::from_env()
            .expect("IMAGE_NAME should name the image to check")
            .with_fixtures_root(concat!(env!("CARGO_MANIFEST_DIR"), "/testpack/files"))
    }

    #[test]
    fn test_docker_runtime_creation() {
        let runtime = CliRuntime::docker();
        assert!(runtime.is_ok(), "Should be able to use the docker CLI");
        assert_eq!(runtime.unwrap().name(), "docker");
    }

    #[test]
    fn test_image_passes_checklist() {
        let runtime = CliRuntime::docker().expect("Should create docker runtime");
        let browser = HttpBrowser::new(Duration::from_secs(10));
        let suite = Suite::new(config(), apache::CHECKS);

        let report = suite
            .run(runtime, &browser, &Notifier::plain())
            .expect("Suite should run to completion");

        assert!(!report.address.is_empty(), "Container should have an address");
        assert!(report.passed(), "{}", report.render_failures().join("\n"));
    }

    #[test]
    fn test_exec_reports_missing_path() {
        let config = config();
        let runtime = CliRuntime::docker().expect("Should create docker runtime");
        let container = Container::start(runtime, &RunSpec::detached(&config.image))
            .expect("Should start container");

        let output = container
            .exec(&["ls", "/this/path/does/not/exist"])
            .expect("Should exec in container");
        assert!(output.reports_missing_path(), "{}", output.output);
        assert_ne!(output.exit_code, 0);

        container.stop().expect("Should stop container");
    }

    #[test]
    fn test_nonexistent_image() {
        let runtime = CliRuntime::docker().expect("Should create docker runtime");
        let result = Container::start(
            runtime,
            &RunSpec::detached("this-image-definitely-does-not-exist:never"),
        );

        let error_msg = format!("{:#}", result.err().expect("Should fail to start"));
        assert!(
            error_msg.contains("docker command failed")
                || error_msg.contains("Unable to find image")
                || error_msg.contains("pull access denied"),
            "Error should indicate Docker failure: {}",
            error_msg
        );
    }
}
