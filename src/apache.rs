//! The checklist for the Debian based Apache image.

use crate::checks::{ensure, ensure_eq, Check, CheckContext, CheckResult};

/// Lines the entrypoint hooks print on a healthy start
pub const EXPECTED_LOG_LINES: &[&str] = &[
    "run-parts: executing /hooks/entrypoint-pre.d/19_doc_root_setup",
    "run-parts: executing /hooks/entrypoint-pre.d/20_ssl_setup",
    "Checking if /var/www/html is empty",
    "Log directory exists",
];

pub const FORWARDED_FOR: &str = "1.2.3.4";
pub const FORWARDED_PORT: &str = "99";

pub const CHECKS: &[Check] = &[
    Check::new("apache2_installed", apache2_installed),
    Check::new("apache2_running", apache2_running),
    Check::new("apache2_ports", apache2_ports),
    Check::new("apache2_lock", apache2_lock),
    Check::new("apache2_run", apache2_run),
    Check::new("apache2_mods_enabled", apache2_mods_enabled),
    Check::new("apache2_default_site", apache2_default_site),
    Check::new("docker_logs", docker_logs),
    Check::new("apache2_get", apache2_get),
    Check::new("apache2_cgi_headers", apache2_cgi_headers),
];

fn apache2_installed(ctx: &CheckContext<'_>) -> CheckResult {
    ctx.assert_package_installed("apache2")
}

fn apache2_running(ctx: &CheckContext<'_>) -> CheckResult {
    ctx.assert_process_running("apache2")
}

fn apache2_ports(ctx: &CheckContext<'_>) -> CheckResult {
    let path = "/etc/apache2/ports.conf";
    let listing = ctx.run(&["ls", path])?;
    ctx.assert_present(path, &listing)?;

    let content = ctx.exec(&["cat", path])?;
    ensure(content.contains("Listen 8080"), "ports.conf misconfigured")
}

/// Directory that apache2 processes running as any user must be able to write
fn world_writable_directory(ctx: &CheckContext<'_>, path: &str) -> CheckResult {
    let entry = ctx.listing("-ld", path)?;
    ensure(entry.is_directory(), format!("{} is not a directory", path))?;
    ensure(
        entry.others_can_write(),
        format!("{} is not a writable by others", path),
    )
}

fn apache2_lock(ctx: &CheckContext<'_>) -> CheckResult {
    world_writable_directory(ctx, "/var/lock/apache2")
}

fn apache2_run(ctx: &CheckContext<'_>) -> CheckResult {
    world_writable_directory(ctx, "/var/run/apache2")
}

fn apache2_mods_enabled(ctx: &CheckContext<'_>) -> CheckResult {
    let entry = ctx.listing("-l", "/etc/apache2/mods-enabled/rewrite.load")?;
    ensure(entry.is_symlink(), "rewrite module not enabled")
}

fn apache2_default_site(ctx: &CheckContext<'_>) -> CheckResult {
    let content = ctx.read_file("/etc/apache2/sites-available/000-default.conf")?;
    ensure(
        content.contains("VirtualHost *:8080"),
        "Missing or incorrect VirtualHost entry",
    )?;
    ensure(content.contains("AllowOverride All"), "Missing AllowOverride All")
}

fn docker_logs(ctx: &CheckContext<'_>) -> CheckResult {
    ctx.assert_logs_contain(EXPECTED_LOG_LINES)
}

fn apache2_get(ctx: &CheckContext<'_>) -> CheckResult {
    let page = ctx.open("/test.html", &[])?;
    ensure_eq(page.title().as_str(), "Success", "Unexpected page title")
}

fn apache2_cgi_headers(ctx: &CheckContext<'_>) -> CheckResult {
    let page = ctx.open(
        "/cgi-bin/rpaf.sh",
        &[
            ("X-Forwarded-For", FORWARDED_FOR),
            ("X-Forwarded-Port", FORWARDED_PORT),
        ],
    )?;
    ensure(page.source.contains(FORWARDED_FOR), "Missing X-Forwarded-For")?;
    ensure(page.source.contains(FORWARDED_PORT), "Missing X-Forwarded-Port")?;

    let query = access_log_query(ctx.browser.agent_token());
    let logged = ctx.exec(&["bash", "-c", query.as_str()])?;
    ensure_eq(logged.as_str(), "true", "Missing 1.2.3.4 from logs")
}

/// Prints `true` when a request from `agent` with the forwarded address was logged
fn access_log_query(agent: &str) -> String {
    format!(
        "grep {} /var/log/apache2/*access_log | grep -iq {} && echo -n true",
        FORWARDED_FOR, agent
    )
}
