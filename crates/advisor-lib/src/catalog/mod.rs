//! Per-region capability catalog
//!
//! Caches machine profile capabilities per region. The first lookup in
//! a region triggers one bulk fetch of the full regional catalog; the
//! cache is append-only for the lifetime of a run and a region is
//! fetched at most once, even under concurrent access.

pub mod correction;

use crate::models::ProfileCapabilities;
use crate::observability::AdvisorMetrics;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Backing service for regional capability data
#[async_trait]
pub trait CapabilityBackend: Send + Sync {
    /// List the capabilities of every profile offered in a region
    async fn list_capabilities(&self, region: &str) -> Result<Vec<ProfileCapabilities>>;
}

/// Regional catalog keyed by lowercase profile id
type RegionMap = HashMap<String, ProfileCapabilities>;

/// Catalog configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Whether to apply the premium-storage suffix correction after fetch
    pub apply_premium_correction: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            apply_premium_correction: true,
        }
    }
}

/// Lazily-populated capability catalog shared across workers
///
/// A backend failure marks the region as fetched-but-empty so the
/// at-most-once fetch property holds; lookups in such a region resolve
/// to `None`, which callers must read as "unknown", not "incompatible".
pub struct CapabilityCatalog {
    backend: Arc<dyn CapabilityBackend>,
    regions: DashMap<String, Arc<OnceCell<Arc<RegionMap>>>>,
    config: CatalogConfig,
    metrics: AdvisorMetrics,
}

impl CapabilityCatalog {
    /// Create a catalog with default configuration
    pub fn new(backend: Arc<dyn CapabilityBackend>) -> Self {
        Self::with_config(backend, CatalogConfig::default())
    }

    /// Create a catalog with explicit configuration
    pub fn with_config(backend: Arc<dyn CapabilityBackend>, config: CatalogConfig) -> Self {
        Self {
            backend,
            regions: DashMap::new(),
            config,
            metrics: AdvisorMetrics::new(),
        }
    }

    /// Look up the capabilities of one profile in a region
    ///
    /// `None` means the profile is unknown to the catalog, either
    /// because the region does not offer it or because the regional
    /// fetch failed.
    pub async fn get(&self, region: &str, profile_id: &str) -> Option<ProfileCapabilities> {
        self.metrics.inc_catalog_lookups();
        let map = self.region_map(region).await;
        map.get(&profile_id.trim().to_lowercase()).cloned()
    }

    /// All profiles of a region, sorted by profile id
    ///
    /// Sorted output keeps downstream scoring deterministic.
    pub async fn region_profiles(&self, region: &str) -> Vec<ProfileCapabilities> {
        let map = self.region_map(region).await;
        let mut profiles: Vec<ProfileCapabilities> = map.values().cloned().collect();
        profiles.sort_by(|a, b| a.profile_id.cmp(&b.profile_id));
        profiles
    }

    async fn region_map(&self, region: &str) -> Arc<RegionMap> {
        let key = region.trim().to_lowercase();
        let cell = self
            .regions
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        cell.get_or_init(|| self.fetch_region(key.clone())).await.clone()
    }

    async fn fetch_region(&self, region: String) -> Arc<RegionMap> {
        self.metrics.inc_region_fetches();
        match self.backend.list_capabilities(&region).await {
            Ok(mut profiles) => {
                if self.config.apply_premium_correction {
                    let corrected = correction::apply_premium_suffix_correction(&mut profiles);
                    if corrected > 0 {
                        debug!(
                            region = %region,
                            corrected = corrected,
                            "Premium storage support corrected from naming convention"
                        );
                    }
                }

                let mut map = RegionMap::with_capacity(profiles.len());
                for profile in profiles {
                    map.insert(profile.profile_id.trim().to_lowercase(), profile);
                }

                info!(
                    region = %region,
                    profiles = map.len(),
                    "Fetched regional capability catalog"
                );
                Arc::new(map)
            }
            Err(e) => {
                warn!(
                    region = %region,
                    error = %e,
                    "Capability fetch failed; region marked unavailable for this run"
                );
                Arc::new(RegionMap::new())
            }
        }
    }
}
