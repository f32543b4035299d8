//! Core data models for the resize advisor

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Operating system of a virtual machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OsType {
    Linux,
    Windows,
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsType::Linux => write!(f, "Linux"),
            OsType::Windows => write!(f, "Windows"),
        }
    }
}

/// Hypervisor generation of a machine profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Generation {
    Gen1,
    Gen2,
}

impl Default for Generation {
    fn default() -> Self {
        Generation::Gen1
    }
}

/// Hardware capabilities of a machine profile in one region
///
/// Immutable once fetched; keyed by (region, profile id). `vcpus` and
/// `memory_gb` are `None` when the backing service did not report them,
/// which makes the profile unscoreable as a resize alternative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCapabilities {
    pub profile_id: String,
    pub region: String,
    #[serde(default)]
    pub vcpus: Option<u32>,
    #[serde(default)]
    pub memory_gb: Option<f64>,
    #[serde(default)]
    pub max_data_disks: Option<u32>,
    #[serde(default)]
    pub premium_storage_supported: bool,
    #[serde(default)]
    pub accelerated_networking_supported: bool,
    #[serde(default)]
    pub ultra_disk_supported: bool,
    #[serde(default)]
    pub trusted_launch_supported: bool,
    /// Zones the profile is offered in; empty means "unknown"
    #[serde(default)]
    pub availability_zones: BTreeSet<u32>,
    #[serde(default)]
    pub generation: Generation,
}

impl ProfileCapabilities {
    /// Whether the profile carries enough data to be scored as an alternative
    pub fn is_scoreable(&self) -> bool {
        matches!(self.vcpus, Some(v) if v > 0) && matches!(self.memory_gb, Some(m) if m > 0.0)
    }
}

/// Point-in-time configuration of the VM under evaluation
///
/// Produced by an external supplier; treated as a value object and
/// never mutated by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmSnapshot {
    pub current_profile_id: String,
    pub region: String,
    #[serde(default)]
    pub data_disk_count: u32,
    #[serde(default)]
    pub uses_premium_storage: bool,
    #[serde(default)]
    pub uses_accelerated_networking: bool,
    #[serde(default)]
    pub uses_ultra_disk: bool,
    #[serde(default)]
    pub trusted_launch_enabled: bool,
    #[serde(default)]
    pub pinned_zone: Option<u32>,
    pub os_type: OsType,
}

/// Resolved price for a (profile, region, OS) key
///
/// `found == false` means the rate is unknown, never that the profile
/// is free; callers must not derive savings from a zero rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingQuote {
    pub profile_id: String,
    pub region: String,
    pub os_type: OsType,
    pub hourly_rate: f64,
    pub monthly_rate: f64,
    pub currency: String,
    pub found: bool,
}

impl PricingQuote {
    /// Quote representing an unresolved price
    pub fn not_found(profile_id: &str, region: &str, os_type: OsType) -> Self {
        Self {
            profile_id: profile_id.to_string(),
            region: region.to_string(),
            os_type,
            hourly_rate: 0.0,
            monthly_rate: 0.0,
            currency: "USD".to_string(),
            found: false,
        }
    }
}
