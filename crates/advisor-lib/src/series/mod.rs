//! Series classification registry
//!
//! Static knowledge base of machine profile families that are retired,
//! announced for retirement, or superseded by a newer generation. Loaded
//! once at construction and never mutated afterwards.

pub mod parser;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle status of a profile series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationStatus {
    /// No lifecycle concern on record
    None,
    /// Hardware decommissioned; the series can no longer be deployed
    Retired,
    /// Retirement announced with a future date
    Announced,
    /// Still deployable but superseded by a newer generation
    PreviousGen,
}

/// Classification of one profile series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesClassification {
    /// Registry key the classification was resolved from
    pub series_key: String,
    pub status: ClassificationStatus,
    pub retirement_date: Option<NaiveDate>,
    /// Suggested replacement series, best first
    pub replacement_series: Vec<String>,
    pub reason: String,
}

impl SeriesClassification {
    /// Classification for a series with no lifecycle concern
    pub fn unclassified(series_key: impl Into<String>) -> Self {
        Self {
            series_key: series_key.into(),
            status: ClassificationStatus::None,
            retirement_date: None,
            replacement_series: Vec::new(),
            reason: String::new(),
        }
    }

    /// Whether the series is being phased out (retired or announced)
    pub fn is_retiring(&self) -> bool {
        matches!(
            self.status,
            ClassificationStatus::Retired | ClassificationStatus::Announced
        )
    }
}

/// Read-only registry of series classifications
///
/// Lookup order: exact `family_vN` key first, then the bare family key
/// for pre-versioning names. Unparseable identifiers classify as
/// `None`; `classify` never fails.
pub struct SeriesRegistry {
    entries: HashMap<String, SeriesClassification>,
}

impl SeriesRegistry {
    /// Registry with the built-in classification table
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        for entry in builtin_entries() {
            entries.insert(entry.series_key.clone(), entry);
        }
        Self { entries }
    }

    /// Registry from an explicit entry list, for tests and overrides
    pub fn from_entries(list: Vec<SeriesClassification>) -> Self {
        let mut entries = HashMap::new();
        for entry in list {
            entries.insert(entry.series_key.clone(), entry);
        }
        Self { entries }
    }

    /// Classify a profile identifier
    pub fn classify(&self, profile_id: &str) -> SeriesClassification {
        let Some(ident) = parser::parse(profile_id) else {
            return SeriesClassification::unclassified(profile_id.trim().to_lowercase());
        };

        if let Some(entry) = self.entries.get(&ident.versioned_key()) {
            return entry.clone();
        }
        if let Some(entry) = self.entries.get(&ident.family_key()) {
            return entry.clone();
        }
        SeriesClassification::unclassified(ident.family_key())
    }

    /// Number of classified series
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entry(
    key: &str,
    status: ClassificationStatus,
    retirement_date: Option<NaiveDate>,
    replacements: &[&str],
    reason: &str,
) -> SeriesClassification {
    SeriesClassification {
        series_key: key.to_string(),
        status,
        retirement_date,
        replacement_series: replacements.iter().map(|s| s.to_string()).collect(),
        reason: reason.to_string(),
    }
}

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Built-in lifecycle table for well-known series
fn builtin_entries() -> Vec<SeriesClassification> {
    use ClassificationStatus::*;

    vec![
        entry(
            "a_v1",
            Retired,
            date(2024, 8, 31),
            &["Av2", "Dv5"],
            "First-generation A-series hardware has been decommissioned",
        ),
        entry(
            "nc_v1",
            Retired,
            date(2023, 9, 6),
            &["NCasT4_v3", "NCads_v4"],
            "K80-based GPU hardware has been decommissioned",
        ),
        entry(
            "nv_v1",
            Retired,
            date(2023, 8, 31),
            &["NVads_v5"],
            "M60-based visualization hardware has been decommissioned",
        ),
        entry(
            "hb_v1",
            Announced,
            date(2026, 8, 31),
            &["HBv3", "HBv4"],
            "Original HB HPC line is scheduled for retirement",
        ),
        entry(
            "nd_v1",
            Announced,
            date(2025, 9, 30),
            &["NDm_v4"],
            "P40-based training hardware is scheduled for retirement",
        ),
        entry(
            "d_v1",
            PreviousGen,
            Option::None,
            &["Dv5"],
            "Superseded by newer D-series generations",
        ),
        entry(
            "d_v2",
            PreviousGen,
            Option::None,
            &["Dv5"],
            "Superseded by newer D-series generations",
        ),
        entry(
            "ds_v1",
            PreviousGen,
            Option::None,
            &["Dsv5"],
            "Superseded by newer premium-storage D-series generations",
        ),
        entry(
            "ds_v2",
            PreviousGen,
            Option::None,
            &["Dsv5"],
            "Superseded by newer premium-storage D-series generations",
        ),
        entry(
            "f_v1",
            PreviousGen,
            Option::None,
            &["Fsv2"],
            "Superseded by the Fsv2 compute-optimized line",
        ),
    ]
}
