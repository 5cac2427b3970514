use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;
use store::{CassandraStore, DeviceStore};

pub mod api;
pub mod config;
pub mod errors;
mod handler;
pub mod mapper;
pub mod metrics_defs;
pub mod problem;
pub mod project;
pub mod query;
pub mod store;
pub mod timestamp;
pub mod types;

#[cfg(test)]
mod testutils;

pub use config::Config;
pub use errors::{DevicesError, UniqueDevicesError};
pub use handler::UniqueDevices;

/// Connects to Cassandra and serves the API until an error occurs.
pub async fn run(config: Config) -> Result<(), UniqueDevicesError> {
    config.validate()?;
    let store = CassandraStore::connect(&config.cassandra).await?;
    run_with_store(config, Arc::new(store)).await
}

pub async fn run_with_store(
    config: Config,
    store: Arc<dyn DeviceStore>,
) -> Result<(), UniqueDevicesError> {
    metrics_defs::describe_all();

    let unique_devices = UniqueDevices::new(store, config.cassandra.consistency, config.deadline());
    let app = api::router(&config.route_prefix(), unique_devices.clone());
    let serve_api = api::serve(&config.listen_address, config.listen_port, app);

    match &config.admin_listener {
        Some(admin) => {
            tokio::try_join!(
                serve_api,
                run_http_service(&admin.host, admin.port, admin_service(unique_devices))
            )?;
        }
        None => serve_api.await?,
    }

    Ok(())
}

/// Admin endpoints whose `/ready` follows the storage adapter's readiness.
pub fn admin_service(
    unique_devices: UniqueDevices,
) -> AdminService<impl Fn() -> bool + Clone + Send + Sync + 'static, UniqueDevicesError> {
    AdminService::new(move || unique_devices.is_ready())
}
