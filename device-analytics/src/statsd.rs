use crate::config::MetricsConfig;
use metrics_exporter_statsd::StatsdBuilder;

#[derive(thiserror::Error, Debug)]
pub enum MetricsError {
    #[error("could not build statsd recorder: {0}")]
    Build(String),
    #[error("could not install metrics recorder: {0}")]
    Install(String),
}

/// Installs a StatsD recorder as the global `metrics` recorder. Every metric
/// name is prefixed with `prefix`.
pub fn init(config: &MetricsConfig, prefix: &str) -> Result<(), MetricsError> {
    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .build(Some(prefix))
        .map_err(|err| MetricsError::Build(err.to_string()))?;

    metrics::set_global_recorder(recorder).map_err(|err| MetricsError::Install(err.to_string()))
}
