//! In-memory stand-ins for the container runtime and the browser

use anyhow::{anyhow, Result};
use apache_image_check::browser::{Browser, Page};
use apache_image_check::runtime::{ContainerDetails, ContainerRuntime, ExecOutput, RunSpec};
use apache_image_check::SuiteConfig;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

pub const CONTAINER_ID: &str = "4f66ad9a0b2e";
pub const CONTAINER_IP: &str = "172.17.0.2";

pub const ACCESS_LOG_QUERY: &str =
    "bash -c grep 1.2.3.4 /var/log/apache2/*access_log | grep -iq apache-image-check && echo -n true";

pub const HEALTHY_LOGS: &str = "\
run-parts: executing /hooks/entrypoint-pre.d/00_check_euid
run-parts: executing /hooks/entrypoint-pre.d/19_doc_root_setup
Checking if /var/www/html is empty
run-parts: executing /hooks/entrypoint-pre.d/20_ssl_setup
Log directory exists
";

pub struct MockRuntime {
    pub responses: RefCell<HashMap<String, ExecOutput>>,
    pub logs: RefCell<String>,
    pub ip_address: String,
    /// Every exec fails as if the daemon went away
    pub exec_unreachable: Cell<bool>,
    pub started: RefCell<Vec<RunSpec>>,
    pub uploads: RefCell<Vec<(String, Vec<u8>)>>,
    pub executed: RefCell<Vec<String>>,
    pub stop_calls: Cell<usize>,
}

impl MockRuntime {
    /// Answers like a correctly built image
    pub fn healthy() -> Self {
        let runtime = Self {
            responses: RefCell::new(HashMap::new()),
            logs: RefCell::new(HEALTHY_LOGS.to_string()),
            ip_address: CONTAINER_IP.to_string(),
            exec_unreachable: Cell::new(false),
            started: RefCell::new(Vec::new()),
            uploads: RefCell::new(Vec::new()),
            executed: RefCell::new(Vec::new()),
            stop_calls: Cell::new(0),
        };

        runtime.respond(
            "dpkg -l apache2",
            "ii  apache2        2.4.25-3+deb9u9 amd64        Apache HTTP Server\n",
        );
        runtime.respond(
            "ps -ef",
            "UID PID PPID C STIME TTY TIME CMD\nwww-data 1 0 0 10:12 ? 00:00:00 /usr/sbin/apache2 -DFOREGROUND\n",
        );
        runtime.respond("ls /etc/apache2/ports.conf", "/etc/apache2/ports.conf\n");
        runtime.respond("cat /etc/apache2/ports.conf", "Listen 8080\n");
        runtime.respond(
            "ls -ld /var/lock/apache2",
            "drwxrwxrwx 2 www-data www-data 4096 Mar  3 10:12 /var/lock/apache2\n",
        );
        runtime.respond(
            "ls -ld /var/run/apache2",
            "drwxrwxrwx 2 www-data www-data 4096 Mar  3 10:12 /var/run/apache2\n",
        );
        runtime.respond(
            "ls -l /etc/apache2/mods-enabled/rewrite.load",
            "lrwxrwxrwx 1 root root 30 Mar  3 10:12 /etc/apache2/mods-enabled/rewrite.load -> ../mods-available/rewrite.load\n",
        );
        runtime.respond(
            "cat /etc/apache2/sites-available/000-default.conf",
            "<VirtualHost *:8080>\n\tDocumentRoot /var/www/html\n\t<Directory /var/www/html>\n\t\tAllowOverride All\n\t</Directory>\n</VirtualHost>\n",
        );
        runtime.respond(ACCESS_LOG_QUERY, "true");
        runtime
    }

    pub fn respond(&self, command: &str, output: &str) {
        self.responses.borrow_mut().insert(
            command.to_string(),
            ExecOutput {
                exit_code: 0,
                output: output.to_string(),
            },
        );
    }

    pub fn respond_missing(&self, command: &str, path: &str) {
        self.responses.borrow_mut().insert(
            command.to_string(),
            ExecOutput {
                exit_code: 2,
                output: format!("ls: cannot access '{}': No such file or directory\n", path),
            },
        );
    }
}

impl ContainerRuntime for MockRuntime {
    fn name(&self) -> &str {
        "mock"
    }

    fn run_detached(&self, spec: &RunSpec) -> Result<String> {
        self.started.borrow_mut().push(spec.clone());
        Ok(CONTAINER_ID.to_string())
    }

    fn inspect(&self, container_id: &str) -> Result<ContainerDetails> {
        ContainerDetails::from_inspect_json(&format!(
            r#"[{{"Id": "{}", "State": {{"Running": true}}, "NetworkSettings": {{"IPAddress": "{}"}}}}]"#,
            container_id, self.ip_address
        ))
    }

    fn put_archive(&self, _container_id: &str, dest: &str, archive: &[u8]) -> Result<()> {
        self.uploads
            .borrow_mut()
            .push((dest.to_string(), archive.to_vec()));
        Ok(())
    }

    fn exec(&self, _container_id: &str, command: &[&str]) -> Result<ExecOutput> {
        if self.exec_unreachable.get() {
            return Err(anyhow!("Cannot connect to the Docker daemon"));
        }

        let key = command.join(" ");
        self.executed.borrow_mut().push(key.clone());
        Ok(self
            .responses
            .borrow()
            .get(&key)
            .cloned()
            .unwrap_or(ExecOutput {
                exit_code: 127,
                output: String::new(),
            }))
    }

    fn logs(&self, _container_id: &str) -> Result<String> {
        Ok(self.logs.borrow().clone())
    }

    fn stop(&self, _container_id: &str) -> Result<()> {
        self.stop_calls.set(self.stop_calls.get() + 1);
        Ok(())
    }
}

/// Serves canned pages keyed by URL path
pub struct MockBrowser {
    pub pages: HashMap<String, String>,
    pub unreachable: bool,
    pub agent_token: String,
    /// (url, headers) of every navigation
    pub visits: RefCell<Vec<(String, Vec<(String, String)>)>>,
    /// Deadline handed to every bounded navigation
    pub timeouts: RefCell<Vec<Duration>>,
}

impl MockBrowser {
    pub fn healthy() -> Self {
        let mut pages = HashMap::new();
        pages.insert(
            "/".to_string(),
            "<html><head><title>Index of /</title></head></html>".to_string(),
        );
        pages.insert(
            "/test.html".to_string(),
            "<!DOCTYPE html>\n<html><head><title>Success</title></head></html>".to_string(),
        );
        pages.insert(
            "/cgi-bin/rpaf.sh".to_string(),
            "<html><body><p>REMOTE_ADDR=1.2.3.4</p><p>SERVER_PORT=99</p></body></html>"
                .to_string(),
        );

        Self {
            pages,
            unreachable: false,
            agent_token: "apache-image-check".to_string(),
            visits: RefCell::new(Vec::new()),
            timeouts: RefCell::new(Vec::new()),
        }
    }

    pub fn visits_to(&self, path: &str) -> Vec<Vec<(String, String)>> {
        let url = format!("http://{}:8080{}", CONTAINER_IP, path);
        self.visits
            .borrow()
            .iter()
            .filter(|(visited, _)| *visited == url)
            .map(|(_, headers)| headers.clone())
            .collect()
    }
}

impl Browser for MockBrowser {
    fn agent_token(&self) -> &str {
        &self.agent_token
    }

    fn open_within(&self, url: &str, headers: &[(&str, &str)], timeout: Duration) -> Result<Page> {
        self.timeouts.borrow_mut().push(timeout);
        self.open(url, headers)
    }

    fn open(&self, url: &str, headers: &[(&str, &str)]) -> Result<Page> {
        self.visits.borrow_mut().push((
            url.to_string(),
            headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        ));

        if self.unreachable {
            return Err(anyhow!("Connection refused"));
        }

        let prefix = format!("http://{}:8080", CONTAINER_IP);
        let path = url.strip_prefix(&prefix).unwrap_or(url);
        match self.pages.get(path) {
            Some(source) => Ok(Page {
                url: url.to_string(),
                status: 200,
                source: source.clone(),
            }),
            None => Ok(Page {
                url: url.to_string(),
                status: 404,
                source: "<html><head><title>404 Not Found</title></head></html>".to_string(),
            }),
        }
    }
}

/// A fixtures root with `html/test.html` and a fast readiness loop
pub fn test_config() -> (SuiteConfig, TempDir) {
    let dir = TempDir::new().expect("Should create fixtures dir");
    let html = dir.path().join("html");
    fs::create_dir_all(html.join("cgi-bin")).expect("Should create html dir");
    fs::write(html.join("test.html"), "<title>Success</title>").expect("Should write page");
    fs::write(html.join("cgi-bin/rpaf.sh"), "#!/bin/sh\n").expect("Should write script");

    let config = SuiteConfig::new(Some("1and1internet/debian-9-apache:test"))
        .expect("Should accept image")
        .with_fixtures_root(dir.path())
        .with_ready_timeout(Duration::from_millis(200))
        .with_poll_interval(Duration::from_millis(10));
    (config, dir)
}
