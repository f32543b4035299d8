//! CLI command implementations

pub mod batch;
pub mod check;
pub mod lookup;

use crate::backends::{HttpCapabilityBackend, HttpPricingBackend};
use crate::config::CliConfig;
use advisor_lib::catalog::CapabilityCatalog;
use advisor_lib::pricing::PricingResolver;
use advisor_lib::series::SeriesRegistry;
use anyhow::Result;
use std::sync::Arc;

/// Build the shared core services from configured endpoints
pub(crate) fn build_core(
    config: &CliConfig,
) -> Result<(
    Arc<CapabilityCatalog>,
    Arc<SeriesRegistry>,
    Arc<PricingResolver>,
)> {
    let capability_backend = Arc::new(HttpCapabilityBackend::new(&config.capability_endpoint)?);
    let catalog = Arc::new(CapabilityCatalog::new(capability_backend));
    let registry = Arc::new(SeriesRegistry::builtin());
    let pricing_backend = Arc::new(HttpPricingBackend::new(&config.pricing_endpoint)?);
    let pricing = Arc::new(PricingResolver::new(pricing_backend));
    Ok((catalog, registry, pricing))
}
