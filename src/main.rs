use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::debug;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use apache_image_check::config::{DEFAULT_FIXTURES, DEFAULT_PORT, IMAGE_ENV};
use apache_image_check::notifier::VerbosityLevel;
use apache_image_check::suite::exit_code;
use apache_image_check::{apache, CliRuntime, HttpBrowser, Notifier, Suite, SuiteConfig};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Engine {
    Docker,
    Nerdctl,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        env = IMAGE_ENV,
        help = "Image to check (e.g., 1and1internet/debian-9-apache:latest)"
    )]
    image: Option<String>,

    #[arg(
        short,
        long,
        default_value = DEFAULT_FIXTURES,
        help = "Directory containing the html/ fixtures copied to /var/www"
    )]
    fixtures: PathBuf,

    #[arg(
        short,
        long,
        value_enum,
        default_value = "docker",
        help = "Container engine to use"
    )]
    engine: Engine,

    #[arg(long, default_value_t = DEFAULT_PORT, help = "Port the web server listens on")]
    port: u16,

    #[arg(
        long,
        default_value_t = 30,
        help = "Seconds to wait for the web server after the container starts"
    )]
    ready_timeout: u64,

    #[arg(long, help = "Print the check names and exit")]
    list: bool,

    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Verbose mode (-v for info, -vv for debug, -vvv for trace). Also switches to text-based progress"
    )]
    verbose: u8,
}

fn run(cli: Cli, notifier: &Notifier) -> Result<ExitCode> {
    let config = SuiteConfig::new(cli.image.as_deref())?
        .with_fixtures_root(&cli.fixtures)
        .with_port(cli.port)
        .with_ready_timeout(Duration::from_secs(cli.ready_timeout));
    config.validate()?;

    debug!("Image: {}", config.image);
    debug!("Fixtures: {}", config.fixtures_root.display());
    debug!("Engine: {:?}", cli.engine);

    let suite = Suite::new(config, apache::CHECKS);
    let browser = HttpBrowser::new(Duration::from_secs(10));

    let result = match cli.engine {
        Engine::Docker => {
            debug!("Initializing Docker engine");
            let runtime = CliRuntime::docker()
                .map_err(|e| anyhow!("Failed to initialize Docker engine: {}", e))?;
            suite.run(runtime, &browser, notifier)
        }
        Engine::Nerdctl => {
            debug!("Initializing nerdctl engine");
            let runtime = CliRuntime::nerdctl()
                .map_err(|e| anyhow!("Failed to initialize nerdctl engine: {}", e))?;
            suite.run(runtime, &browser, notifier)
        }
    };

    let code = exit_code(&result);
    let report = result.context("Image check aborted")?;
    notifier.finish(&report);
    Ok(ExitCode::from(code as u8))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list {
        for check in apache::CHECKS {
            println!("{}", check.name);
        }
        return ExitCode::SUCCESS;
    }

    let verbosity = VerbosityLevel::from(cli.verbose);
    env_logger::Builder::from_env(Env::default())
        .filter_level(verbosity.to_log_level())
        .init();

    let notifier = Notifier::new(cli.verbose);
    match run(cli, &notifier) {
        Ok(code) => code,
        Err(e) => {
            notifier.clear();
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<apache_image_check::ConfigError>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
