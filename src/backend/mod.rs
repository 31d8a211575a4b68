//! Implementations of the zone conversion collaborator.
use crate::{
    config::{Backend, Config},
    conversion::ZoneConverter,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

mod local;
mod timeapi;

pub use local::LocalZones;
pub use timeapi::{TimeApi, DEFAULT_ENDPOINT};

/// Create the converter selected by the configuration.
pub fn build(config: &Config) -> Result<Arc<dyn ZoneConverter>> {
    let converter: Arc<dyn ZoneConverter> = match config.backend() {
        Backend::TimeApi => {
            let endpoint = config.endpoint_uri().context("parse endpoint")?;
            info!("Using conversion endpoint {}", endpoint);
            let client = TimeApi::new(endpoint, config.timeout_duration())
                .context("create HTTP client")?;
            Arc::new(client)
        }
        Backend::Local => {
            info!("Using local time zone database");
            Arc::new(LocalZones)
        }
    };
    Ok(converter)
}
