use clap::Parser;
use config::{Config, ConfigError};
use statsd::MetricsError;
use std::path::PathBuf;
use std::process::ExitCode;
use unique_devices::UniqueDevicesError;

mod config;
mod logging;
mod statsd;

#[derive(Parser)]
#[command(version, about = "Unique devices analytics API")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "./config.yaml")]
    config: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Service(#[from] UniqueDevicesError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::from_file(&cli.config)?;
    let _sentry = logging::init(&config.common);

    if let Some(metrics_config) = &config.common.metrics {
        statsd::init(metrics_config, &config.common.service_name)?;
    }

    tracing::info!(
        service = %config.common.service_name,
        version = env!("CARGO_PKG_VERSION"),
        build_date = option_env!("BUILD_DATE").unwrap_or("unknown"),
        build_host = option_env!("BUILD_HOST").unwrap_or("unknown"),
        "starting"
    );

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(unique_devices::run(config.unique_devices))
        .inspect_err(|err| tracing::error!("service stopped: {err}"))?;

    Ok(())
}
