//! Memoized pricing resolver
//!
//! Resolves an hourly and monthly rate per (profile, region, OS) key.
//! Each key is resolved against the pricing backend at most once per
//! run; concurrent requesters for the same key share one in-flight
//! query. Failures memoize as `found: false` quotes.

use crate::models::{OsType, PricingQuote};
use crate::observability::AdvisorMetrics;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Fixed hours-per-month convention for monthly rates
pub const HOURS_PER_MONTH: f64 = 730.0;

/// One price row returned by the pricing backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEntry {
    /// Product name; OS partitioning matches on this string
    pub product_name: String,
    /// Hourly unit price
    pub unit_price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Pricing backend queried with consumption-type billing filters
#[async_trait]
pub trait PricingBackend: Send + Sync {
    /// Consumption-billing price rows for a profile in a region,
    /// covering all operating systems
    async fn query(&self, profile_id: &str, region: &str) -> Result<Vec<PriceEntry>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PriceKey {
    profile_id: String,
    region: String,
    os_type: OsType,
}

/// Memoized price lookup shared across workers
pub struct PricingResolver {
    backend: Arc<dyn PricingBackend>,
    cache: DashMap<PriceKey, Arc<OnceCell<PricingQuote>>>,
    metrics: AdvisorMetrics,
}

impl PricingResolver {
    pub fn new(backend: Arc<dyn PricingBackend>) -> Self {
        Self {
            backend,
            cache: DashMap::new(),
            metrics: AdvisorMetrics::new(),
        }
    }

    /// Resolve the price of a profile for one OS
    ///
    /// A `found: false` quote means the rate is unknown; callers must
    /// never treat the zero rate as "free".
    pub async fn get_price(&self, profile_id: &str, region: &str, os_type: OsType) -> PricingQuote {
        self.metrics.inc_pricing_lookups();
        let key = PriceKey {
            profile_id: profile_id.trim().to_lowercase(),
            region: region.trim().to_lowercase(),
            os_type,
        };
        let cell = self
            .cache
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        cell.get_or_init(|| self.resolve_uncached(profile_id, region, os_type))
            .await
            .clone()
    }

    async fn resolve_uncached(
        &self,
        profile_id: &str,
        region: &str,
        os_type: OsType,
    ) -> PricingQuote {
        self.metrics.inc_pricing_fetches();
        let entries = match self.backend.query(profile_id, region).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    profile_id = %profile_id,
                    region = %region,
                    os = %os_type,
                    error = %e,
                    "Pricing query failed; rate unknown"
                );
                return PricingQuote::not_found(profile_id, region, os_type);
            }
        };

        let partition: Vec<&PriceEntry> = entries
            .iter()
            .filter(|entry| {
                let is_windows = entry.product_name.to_lowercase().contains("windows");
                match os_type {
                    OsType::Windows => is_windows,
                    OsType::Linux => !is_windows,
                }
            })
            .collect();

        if partition.len() > 1 {
            // Multiple regional variants can price the same profile; the
            // first row is taken as authoritative.
            debug!(
                profile_id = %profile_id,
                region = %region,
                os = %os_type,
                rows = partition.len(),
                "Multiple price rows in partition, taking first"
            );
        }

        match partition.first() {
            Some(entry) => PricingQuote {
                profile_id: profile_id.to_string(),
                region: region.to_string(),
                os_type,
                hourly_rate: entry.unit_price,
                monthly_rate: entry.unit_price * HOURS_PER_MONTH,
                currency: entry.currency.clone(),
                found: true,
            },
            None => {
                debug!(
                    profile_id = %profile_id,
                    region = %region,
                    os = %os_type,
                    "No price rows for OS partition"
                );
                PricingQuote::not_found(profile_id, region, os_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockPricing {
        call_count: AtomicUsize,
        rows: Vec<PriceEntry>,
        fail: bool,
    }

    impl MockPricing {
        fn new(rows: Vec<PriceEntry>) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                rows,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                rows: Vec::new(),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PricingBackend for MockPricing {
        async fn query(&self, _profile_id: &str, _region: &str) -> Result<Vec<PriceEntry>> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("pricing backend unreachable");
            }
            Ok(self.rows.clone())
        }
    }

    fn row(product: &str, price: f64) -> PriceEntry {
        PriceEntry {
            product_name: product.to_string(),
            unit_price: price,
            currency: "USD".to_string(),
        }
    }

    #[tokio::test]
    async fn test_os_partitioning() {
        let backend = Arc::new(MockPricing::new(vec![
            row("D4 v5 Series Windows", 0.40),
            row("D4 v5 Series", 0.20),
        ]));
        let resolver = PricingResolver::new(backend);

        let windows = resolver.get_price("D4_v5", "westeurope", OsType::Windows).await;
        assert!(windows.found);
        assert_eq!(windows.hourly_rate, 0.40);

        let linux = resolver.get_price("D4_v5", "westeurope", OsType::Linux).await;
        assert!(linux.found);
        assert_eq!(linux.hourly_rate, 0.20);
    }

    #[tokio::test]
    async fn test_monthly_rate_convention() {
        let backend = Arc::new(MockPricing::new(vec![row("D4 v5 Series", 0.20)]));
        let resolver = PricingResolver::new(backend);

        let quote = resolver.get_price("D4_v5", "westeurope", OsType::Linux).await;
        assert_eq!(quote.monthly_rate, 0.20 * HOURS_PER_MONTH);
    }

    #[tokio::test]
    async fn test_first_row_taken_when_multiple() {
        let backend = Arc::new(MockPricing::new(vec![
            row("D4 v5 Series", 0.20),
            row("D4 v5 Series Low Priority", 0.05),
        ]));
        let resolver = PricingResolver::new(backend);

        let quote = resolver.get_price("D4_v5", "westeurope", OsType::Linux).await;
        assert_eq!(quote.hourly_rate, 0.20);
    }

    #[tokio::test]
    async fn test_empty_partition_is_not_found() {
        // Only Linux rows exist; a Windows lookup resolves to unknown
        let backend = Arc::new(MockPricing::new(vec![row("D4 v5 Series", 0.20)]));
        let resolver = PricingResolver::new(backend);

        let quote = resolver
            .get_price("D4_v5", "westeurope", OsType::Windows)
            .await;
        assert!(!quote.found);
        assert_eq!(quote.hourly_rate, 0.0);
        assert_eq!(quote.monthly_rate, 0.0);
    }

    #[tokio::test]
    async fn test_backend_failure_memoized_as_not_found() {
        let backend = Arc::new(MockPricing::failing());
        let resolver = PricingResolver::new(backend.clone());

        let first = resolver.get_price("D4_v5", "westeurope", OsType::Linux).await;
        let second = resolver.get_price("D4_v5", "westeurope", OsType::Linux).await;
        assert!(!first.found);
        assert!(!second.found);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_keyed_per_os() {
        let backend = Arc::new(MockPricing::new(vec![
            row("D4 v5 Series Windows", 0.40),
            row("D4 v5 Series", 0.20),
        ]));
        let resolver = PricingResolver::new(backend.clone());

        resolver.get_price("D4_v5", "westeurope", OsType::Linux).await;
        resolver.get_price("D4_v5", "westeurope", OsType::Windows).await;
        resolver.get_price("D4_v5", "westeurope", OsType::Linux).await;

        // One query per (profile, region, os) key
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_query_once() {
        let backend = Arc::new(MockPricing::new(vec![row("D4 v5 Series", 0.20)]));
        let resolver = Arc::new(PricingResolver::new(backend.clone()));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let resolver = resolver.clone();
            handles.push(tokio::spawn(async move {
                resolver.get_price("D4_v5", "westeurope", OsType::Linux).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().found);
        }

        assert_eq!(backend.calls(), 1);
    }
}
