//! Alternative recommendation scorer
//!
//! Ranks candidate profiles by similarity to the current profile and by
//! desirability (feature parity, newer generations). Scoring is a pure
//! function of the candidate list and registry; candidates with equal
//! scores order by ascending profile id so the ranking is deterministic.

use crate::models::{PricingQuote, ProfileCapabilities};
use crate::series::{parser, ClassificationStatus, SeriesRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Starting score before similarity penalties and bonuses
pub const BASE_SCORE: f32 = 100.0;
/// Weight applied to the combined vCPU/memory distance ratio
pub const SIMILARITY_WEIGHT: f32 = 50.0;
/// Bonus when premium storage support matches the current profile
pub const PREMIUM_MATCH_BONUS: f32 = 10.0;
/// Bonus when accelerated networking support matches the current profile
pub const ACCEL_MATCH_BONUS: f32 = 5.0;
/// Penalty for candidates classified as previous-generation
pub const PREVIOUS_GEN_PENALTY: f32 = 20.0;

/// Hardware category of a profile family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeCategory {
    GeneralPurpose,
    ComputeOptimized,
    MemoryOptimized,
    StorageOptimized,
    GpuAccelerated,
    HighPerformanceCompute,
    Unknown,
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SizeCategory::GeneralPurpose => "general purpose",
            SizeCategory::ComputeOptimized => "compute optimized",
            SizeCategory::MemoryOptimized => "memory optimized",
            SizeCategory::StorageOptimized => "storage optimized",
            SizeCategory::GpuAccelerated => "GPU accelerated",
            SizeCategory::HighPerformanceCompute => "high performance compute",
            SizeCategory::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// Categorize a profile by the leading letter of its family token
pub fn categorize(profile_id: &str) -> SizeCategory {
    let family = match parser::parse(profile_id) {
        Some(ident) => ident.family,
        None => return SizeCategory::Unknown,
    };
    match family.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('A') | Some('B') | Some('D') => SizeCategory::GeneralPurpose,
        Some('F') => SizeCategory::ComputeOptimized,
        Some('E') | Some('G') | Some('M') => SizeCategory::MemoryOptimized,
        Some('L') => SizeCategory::StorageOptimized,
        Some('N') => SizeCategory::GpuAccelerated,
        Some('H') => SizeCategory::HighPerformanceCompute,
        _ => SizeCategory::Unknown,
    }
}

/// One ranked resize alternative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeCandidate {
    pub profile_id: String,
    pub vcpus: u32,
    pub memory_gb: f64,
    pub premium_storage_supported: bool,
    pub category: SizeCategory,
    pub score: f32,
    /// Filled in by the orchestrator when pricing is requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<PricingQuote>,
}

/// Rank resize alternatives for the current profile, best first
///
/// Candidates classified `Retired` or `Announced` are never returned,
/// nor are candidates missing vCPU or memory data. Returns an empty
/// list when the current profile itself is unscoreable.
pub fn rank(
    current: &ProfileCapabilities,
    candidates: &[ProfileCapabilities],
    registry: &SeriesRegistry,
    max_results: usize,
) -> Vec<AlternativeCandidate> {
    let (Some(current_vcpus), Some(current_memory)) = (current.vcpus, current.memory_gb) else {
        return Vec::new();
    };
    if current_vcpus == 0 || current_memory <= 0.0 {
        return Vec::new();
    }

    let mut ranked: Vec<AlternativeCandidate> = candidates
        .iter()
        .filter(|candidate| {
            !candidate
                .profile_id
                .eq_ignore_ascii_case(&current.profile_id)
        })
        .filter(|candidate| candidate.is_scoreable())
        .filter(|candidate| !registry.classify(&candidate.profile_id).is_retiring())
        .map(|candidate| {
            let vcpus = candidate.vcpus.unwrap_or_default();
            let memory_gb = candidate.memory_gb.unwrap_or_default();
            let score = score_candidate(
                current,
                current_vcpus,
                current_memory,
                candidate,
                vcpus,
                memory_gb,
                registry,
            );
            AlternativeCandidate {
                profile_id: candidate.profile_id.clone(),
                vcpus,
                memory_gb,
                premium_storage_supported: candidate.premium_storage_supported,
                category: categorize(&candidate.profile_id),
                score,
                quote: None,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.profile_id.cmp(&b.profile_id))
    });
    ranked.truncate(max_results);
    ranked
}

fn score_candidate(
    current: &ProfileCapabilities,
    current_vcpus: u32,
    current_memory: f64,
    candidate: &ProfileCapabilities,
    vcpus: u32,
    memory_gb: f64,
    registry: &SeriesRegistry,
) -> f32 {
    let vcpu_ratio =
        (vcpus as f64 - current_vcpus as f64).abs() / current_vcpus as f64;
    let memory_ratio = (memory_gb - current_memory).abs() / current_memory;
    let mut score = BASE_SCORE - SIMILARITY_WEIGHT * (vcpu_ratio + memory_ratio) as f32;

    if candidate.premium_storage_supported == current.premium_storage_supported {
        score += PREMIUM_MATCH_BONUS;
    }
    if candidate.accelerated_networking_supported == current.accelerated_networking_supported {
        score += ACCEL_MATCH_BONUS;
    }

    score += generation_bonus(&candidate.profile_id);

    if registry.classify(&candidate.profile_id).status == ClassificationStatus::PreviousGen {
        score -= PREVIOUS_GEN_PENALTY;
    }

    score
}

/// Version bonus preferring newer hardware generations
fn generation_bonus(profile_id: &str) -> f32 {
    match parser::parse(profile_id).map(|ident| ident.version) {
        Some(5) => 15.0,
        Some(4) => 10.0,
        Some(3) => 5.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{ClassificationStatus, SeriesClassification, SeriesRegistry};

    fn caps(id: &str, vcpus: u32, memory_gb: f64) -> ProfileCapabilities {
        ProfileCapabilities {
            profile_id: id.to_string(),
            region: "westeurope".to_string(),
            vcpus: Some(vcpus),
            memory_gb: Some(memory_gb),
            max_data_disks: Some(8),
            premium_storage_supported: false,
            accelerated_networking_supported: false,
            ultra_disk_supported: false,
            trusted_launch_supported: false,
            availability_zones: Default::default(),
            generation: Default::default(),
        }
    }

    fn classification(key: &str, status: ClassificationStatus) -> SeriesClassification {
        SeriesClassification {
            series_key: key.to_string(),
            status,
            retirement_date: None,
            replacement_series: Vec::new(),
            reason: String::new(),
        }
    }

    #[test]
    fn test_identical_shape_scores_highest() {
        let registry = SeriesRegistry::from_entries(Vec::new());
        let current = caps("D8_v5", 8, 32.0);
        let candidates = vec![caps("E8_v5", 8, 32.0), caps("E16_v5", 16, 64.0)];

        let ranked = rank(&current, &candidates, &registry, 10);
        assert_eq!(ranked[0].profile_id, "E8_v5");
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_current_profile_excluded() {
        let registry = SeriesRegistry::from_entries(Vec::new());
        let current = caps("D8_v5", 8, 32.0);
        let candidates = vec![caps("D8_v5", 8, 32.0), caps("E8_v5", 8, 32.0)];

        let ranked = rank(&current, &candidates, &registry, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].profile_id, "E8_v5");
    }

    #[test]
    fn test_retiring_candidates_never_recommended() {
        let registry = SeriesRegistry::from_entries(vec![
            classification("a_v1", ClassificationStatus::Retired),
            classification("hb_v1", ClassificationStatus::Announced),
        ]);
        let current = caps("D8_v5", 8, 32.0);
        let candidates = vec![
            caps("A8", 8, 32.0),
            caps("HB8", 8, 32.0),
            caps("E8_v5", 8, 32.0),
        ];

        let ranked = rank(&current, &candidates, &registry, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].profile_id, "E8_v5");
    }

    #[test]
    fn test_unscoreable_candidates_discarded() {
        let registry = SeriesRegistry::from_entries(Vec::new());
        let current = caps("D8_v5", 8, 32.0);
        let mut no_vcpus = caps("E8_v5", 8, 32.0);
        no_vcpus.vcpus = None;
        let mut no_memory = caps("F8s_v2", 8, 32.0);
        no_memory.memory_gb = None;

        let ranked = rank(&current, &[no_vcpus, no_memory], &registry, 10);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_unscoreable_current_returns_empty() {
        let registry = SeriesRegistry::from_entries(Vec::new());
        let mut current = caps("D8_v5", 8, 32.0);
        current.vcpus = None;

        let ranked = rank(&current, &[caps("E8_v5", 8, 32.0)], &registry, 10);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_generation_bonus_and_tie_break() {
        // Worked example: X4 (previous-gen) against X5a/X5b with
        // identical shapes. Both v5 candidates outrank the v4-equivalent
        // and order lexicographically between themselves.
        let registry = SeriesRegistry::from_entries(vec![classification(
            "x_v4",
            ClassificationStatus::PreviousGen,
        )]);
        let current = caps("X4_v4", 8, 32.0);
        let candidates = vec![
            caps("X5b_v5", 8, 32.0),
            caps("X5a_v5", 8, 32.0),
            caps("X6_v4", 8, 32.0),
        ];

        let ranked = rank(&current, &candidates, &registry, 10);
        assert_eq!(ranked[0].profile_id, "X5a_v5");
        assert_eq!(ranked[1].profile_id, "X5b_v5");
        assert_eq!(ranked[2].profile_id, "X6_v4");
        assert_eq!(ranked[0].score, ranked[1].score);
        assert!(ranked[1].score > ranked[2].score);
    }

    #[test]
    fn test_previous_gen_penalty() {
        let registry = SeriesRegistry::from_entries(vec![classification(
            "d_v2",
            ClassificationStatus::PreviousGen,
        )]);
        let current = caps("F8_v1", 8, 32.0);
        let candidates = vec![caps("D8_v2", 8, 32.0), caps("E8_v1", 8, 32.0)];

        let ranked = rank(&current, &candidates, &registry, 10);
        assert_eq!(ranked[0].profile_id, "E8_v1");
        // Same shape and features, so the gap is exactly the penalty
        assert_eq!(ranked[0].score - ranked[1].score, PREVIOUS_GEN_PENALTY);
    }

    #[test]
    fn test_feature_match_bonuses() {
        let registry = SeriesRegistry::from_entries(Vec::new());
        let mut current = caps("D8s_v1", 8, 32.0);
        current.premium_storage_supported = true;
        current.accelerated_networking_supported = true;

        let mut matching = caps("E8s_v1", 8, 32.0);
        matching.premium_storage_supported = true;
        matching.accelerated_networking_supported = true;
        let plain = caps("F8_v1", 8, 32.0);

        let ranked = rank(&current, &[matching, plain], &registry, 10);
        assert_eq!(ranked[0].profile_id, "E8s_v1");
        assert_eq!(
            ranked[0].score - ranked[1].score,
            PREMIUM_MATCH_BONUS + ACCEL_MATCH_BONUS
        );
    }

    #[test]
    fn test_max_results_truncates() {
        let registry = SeriesRegistry::from_entries(Vec::new());
        let current = caps("D8_v5", 8, 32.0);
        let candidates: Vec<ProfileCapabilities> = (1..=10)
            .map(|i| caps(&format!("E{}_v5", i), 8, 32.0))
            .collect();

        let ranked = rank(&current, &candidates, &registry, 3);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let registry = SeriesRegistry::builtin();
        let current = caps("D8_v5", 8, 32.0);
        let candidates = vec![
            caps("E8_v5", 8, 32.0),
            caps("F8s_v2", 8, 16.0),
            caps("E16_v5", 16, 64.0),
        ];

        let first = rank(&current, &candidates, &registry, 10);
        let second = rank(&current, &candidates, &registry, 10);
        let first_ids: Vec<&str> = first.iter().map(|c| c.profile_id.as_str()).collect();
        let second_ids: Vec<&str> = second.iter().map(|c| c.profile_id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.score, b.score);
        }
    }

    #[test]
    fn test_categorize_families() {
        assert_eq!(categorize("D4s_v5"), SizeCategory::GeneralPurpose);
        assert_eq!(categorize("F8s_v2"), SizeCategory::ComputeOptimized);
        assert_eq!(categorize("E8_v5"), SizeCategory::MemoryOptimized);
        assert_eq!(categorize("L8s_v3"), SizeCategory::StorageOptimized);
        assert_eq!(categorize("NC24_v4"), SizeCategory::GpuAccelerated);
        assert_eq!(categorize("HB120_v3"), SizeCategory::HighPerformanceCompute);
        assert_eq!(categorize("???"), SizeCategory::Unknown);
    }
}
