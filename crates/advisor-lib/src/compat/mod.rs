//! Compatibility rule engine
//!
//! Compares a VM's current configuration against a target profile's
//! capabilities. Evaluation is a pure function: fixed inputs always
//! produce the same issues and warnings, in rule-declaration order.
//!
//! Rules split into blocking issues (data disks, premium storage, ultra
//! disk, trusted launch, retiring target) and non-blocking warnings
//! (accelerated networking, availability zone). Unknown target
//! capabilities downgrade every rule to a warning: the catalog could not
//! confirm safety, which is not the same as confirmed incompatibility.

use crate::models::{ProfileCapabilities, VmSnapshot};
use crate::series::SeriesClassification;
use serde::{Deserialize, Serialize};

/// Per-rule enable flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub check_data_disks: bool,
    pub check_premium_storage: bool,
    pub check_accelerated_networking: bool,
    pub check_availability_zones: bool,
    pub check_ultra_disk: bool,
    pub check_trusted_launch: bool,
    pub check_retirement: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            check_data_disks: true,
            check_premium_storage: true,
            check_accelerated_networking: true,
            check_availability_zones: true,
            check_ultra_disk: true,
            check_trusted_launch: true,
            check_retirement: true,
        }
    }
}

/// Outcome of one compatibility evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityReport {
    /// True iff no blocking issue fired; warnings never affect this
    pub is_fully_compatible: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

/// Evaluate whether a VM can be resized onto a target profile
///
/// `target` is `None` when the catalog could not resolve the target's
/// capabilities; only warnings are produced in that case because the
/// data-disk rule requires a known limit to block.
pub fn evaluate(
    snapshot: &VmSnapshot,
    target_profile_id: &str,
    target: Option<&ProfileCapabilities>,
    target_classification: &SeriesClassification,
    rules: &RuleConfig,
) -> CompatibilityReport {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    // Rule 1: data disk count
    if rules.check_data_disks && snapshot.data_disk_count > 0 {
        match target.and_then(|t| t.max_data_disks) {
            Some(max) if snapshot.data_disk_count > max => {
                issues.push(format!(
                    "VM has {} data disks but {} supports at most {}",
                    snapshot.data_disk_count, target_profile_id, max
                ));
            }
            Some(_) => {}
            None => {
                warnings.push(format!(
                    "Data disk limit of {} is unknown; cannot confirm {} data disks fit",
                    target_profile_id, snapshot.data_disk_count
                ));
            }
        }
    }

    // Rule 2: premium storage
    if rules.check_premium_storage && snapshot.uses_premium_storage {
        match target {
            Some(t) if !t.premium_storage_supported => {
                issues.push(format!(
                    "VM uses premium storage but {} does not support it",
                    target_profile_id
                ));
            }
            Some(_) => {}
            None => {
                warnings.push(format!(
                    "Could not confirm premium storage support on {}",
                    target_profile_id
                ));
            }
        }
    }

    // Rule 3: accelerated networking (non-blocking)
    if rules.check_accelerated_networking && snapshot.uses_accelerated_networking {
        match target {
            Some(t) if !t.accelerated_networking_supported => {
                warnings.push(format!(
                    "Accelerated networking is not supported on {} and will be disabled",
                    target_profile_id
                ));
            }
            Some(_) => {}
            None => {
                warnings.push(format!(
                    "Could not confirm accelerated networking support on {}",
                    target_profile_id
                ));
            }
        }
    }

    // Rule 4: availability zone (non-blocking)
    if rules.check_availability_zones {
        if let Some(zone) = snapshot.pinned_zone {
            match target {
                Some(t) if t.availability_zones.is_empty() => {
                    warnings.push(format!(
                        "Availability zone support of {} is unknown; VM is pinned to zone {}",
                        target_profile_id, zone
                    ));
                }
                Some(t) if !t.availability_zones.contains(&zone) => {
                    warnings.push(format!(
                        "VM is pinned to zone {} which {} is not offered in",
                        zone, target_profile_id
                    ));
                }
                Some(_) => {}
                None => {
                    warnings.push(format!(
                        "Availability zone support of {} is unknown; VM is pinned to zone {}",
                        target_profile_id, zone
                    ));
                }
            }
        }
    }

    // Rule 5: ultra disk
    if rules.check_ultra_disk && snapshot.uses_ultra_disk {
        match target {
            Some(t) if !t.ultra_disk_supported => {
                issues.push(format!(
                    "VM uses ultra disk but {} does not support it",
                    target_profile_id
                ));
            }
            Some(_) => {}
            None => {
                warnings.push(format!(
                    "Could not confirm ultra disk support on {}",
                    target_profile_id
                ));
            }
        }
    }

    // Rule 6: trusted launch
    if rules.check_trusted_launch && snapshot.trusted_launch_enabled {
        match target {
            Some(t) if !t.trusted_launch_supported => {
                issues.push(format!(
                    "VM has trusted launch enabled but {} does not support it",
                    target_profile_id
                ));
            }
            Some(_) => {}
            None => {
                warnings.push(format!(
                    "Could not confirm trusted launch support on {}",
                    target_profile_id
                ));
            }
        }
    }

    // Rule 7: target series being phased out
    if rules.check_retirement && target_classification.is_retiring() {
        let when = target_classification
            .retirement_date
            .map(|d| format!(" (retirement date {})", d))
            .unwrap_or_default();
        issues.push(format!(
            "Target profile {} is being phased out{}: {}",
            target_profile_id, when, target_classification.reason
        ));
    }

    CompatibilityReport {
        is_fully_compatible: issues.is_empty(),
        issues,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OsType;
    use crate::series::ClassificationStatus;
    use std::collections::BTreeSet;

    fn snapshot() -> VmSnapshot {
        VmSnapshot {
            current_profile_id: "D8s_v3".to_string(),
            region: "westeurope".to_string(),
            data_disk_count: 0,
            uses_premium_storage: false,
            uses_accelerated_networking: false,
            uses_ultra_disk: false,
            trusted_launch_enabled: false,
            pinned_zone: None,
            os_type: OsType::Linux,
        }
    }

    fn target() -> ProfileCapabilities {
        ProfileCapabilities {
            profile_id: "D4_v5".to_string(),
            region: "westeurope".to_string(),
            vcpus: Some(4),
            memory_gb: Some(16.0),
            max_data_disks: Some(8),
            premium_storage_supported: true,
            accelerated_networking_supported: true,
            ultra_disk_supported: true,
            trusted_launch_supported: true,
            availability_zones: BTreeSet::from([1, 2, 3]),
            generation: Default::default(),
        }
    }

    fn active() -> SeriesClassification {
        SeriesClassification::unclassified("d_v5")
    }

    fn retired() -> SeriesClassification {
        SeriesClassification {
            series_key: "a_v1".to_string(),
            status: ClassificationStatus::Retired,
            retirement_date: chrono::NaiveDate::from_ymd_opt(2024, 8, 31),
            replacement_series: vec!["Av2".to_string()],
            reason: "hardware decommissioned".to_string(),
        }
    }

    #[test]
    fn test_clean_vm_is_fully_compatible() {
        let report = evaluate(
            &snapshot(),
            "D4_v5",
            Some(&target()),
            &active(),
            &RuleConfig::default(),
        );
        assert!(report.is_fully_compatible);
        assert!(report.issues.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_disk_and_premium_issues_in_rule_order() {
        // Worked example: 6 data disks and premium storage in use; the
        // target supports 4 disks and no premium storage.
        let mut snap = snapshot();
        snap.data_disk_count = 6;
        snap.uses_premium_storage = true;

        let mut tgt = target();
        tgt.max_data_disks = Some(4);
        tgt.premium_storage_supported = false;

        let report = evaluate(&snap, "D4_v5", Some(&tgt), &active(), &RuleConfig::default());
        assert!(!report.is_fully_compatible);
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues[0].contains("data disks"));
        assert!(report.issues[1].contains("premium storage"));
    }

    #[test]
    fn test_accelerated_networking_is_warning_only() {
        let mut snap = snapshot();
        snap.uses_accelerated_networking = true;
        let mut tgt = target();
        tgt.accelerated_networking_supported = false;

        let report = evaluate(&snap, "D4_v5", Some(&tgt), &active(), &RuleConfig::default());
        assert!(report.is_fully_compatible);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Accelerated networking"));
    }

    #[test]
    fn test_zone_pinning_warnings() {
        let mut snap = snapshot();
        snap.pinned_zone = Some(2);

        // Zone offered: no warning
        let report = evaluate(
            &snap,
            "D4_v5",
            Some(&target()),
            &active(),
            &RuleConfig::default(),
        );
        assert!(report.warnings.is_empty());

        // Zone missing from the target's set
        let mut tgt = target();
        tgt.availability_zones = BTreeSet::from([1]);
        let report = evaluate(&snap, "D4_v5", Some(&tgt), &active(), &RuleConfig::default());
        assert!(report.is_fully_compatible);
        assert!(report.warnings[0].contains("zone 2"));

        // Zone set unknown
        let mut tgt = target();
        tgt.availability_zones = BTreeSet::new();
        let report = evaluate(&snap, "D4_v5", Some(&tgt), &active(), &RuleConfig::default());
        assert!(report.warnings[0].contains("unknown"));
    }

    #[test]
    fn test_ultra_disk_and_trusted_launch_block() {
        let mut snap = snapshot();
        snap.uses_ultra_disk = true;
        snap.trusted_launch_enabled = true;

        let mut tgt = target();
        tgt.ultra_disk_supported = false;
        tgt.trusted_launch_supported = false;

        let report = evaluate(&snap, "D4_v5", Some(&tgt), &active(), &RuleConfig::default());
        assert!(!report.is_fully_compatible);
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues[0].contains("ultra disk"));
        assert!(report.issues[1].contains("trusted launch"));
    }

    #[test]
    fn test_retiring_target_blocks() {
        let report = evaluate(
            &snapshot(),
            "A4",
            Some(&target()),
            &retired(),
            &RuleConfig::default(),
        );
        assert!(!report.is_fully_compatible);
        assert!(report.issues[0].contains("phased out"));
        assert!(report.issues[0].contains("2024-08-31"));
    }

    #[test]
    fn test_unknown_target_downgrades_to_warnings() {
        let mut snap = snapshot();
        snap.data_disk_count = 6;
        snap.uses_premium_storage = true;
        snap.uses_ultra_disk = true;
        snap.trusted_launch_enabled = true;
        snap.pinned_zone = Some(1);

        let report = evaluate(&snap, "X99", None, &active(), &RuleConfig::default());
        assert!(report.is_fully_compatible);
        assert!(report.issues.is_empty());
        assert_eq!(report.warnings.len(), 5);
    }

    #[test]
    fn test_rules_can_be_disabled() {
        let mut snap = snapshot();
        snap.data_disk_count = 6;
        snap.uses_premium_storage = true;

        let mut tgt = target();
        tgt.max_data_disks = Some(4);
        tgt.premium_storage_supported = false;

        let rules = RuleConfig {
            check_data_disks: false,
            check_premium_storage: false,
            ..RuleConfig::default()
        };
        let report = evaluate(&snap, "D4_v5", Some(&tgt), &active(), &rules);
        assert!(report.is_fully_compatible);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let mut snap = snapshot();
        snap.data_disk_count = 9;
        snap.uses_premium_storage = true;
        snap.uses_accelerated_networking = true;
        snap.pinned_zone = Some(4);

        let mut tgt = target();
        tgt.max_data_disks = Some(4);
        tgt.premium_storage_supported = false;
        tgt.accelerated_networking_supported = false;

        let first = evaluate(&snap, "D4_v5", Some(&tgt), &retired(), &RuleConfig::default());
        let second = evaluate(&snap, "D4_v5", Some(&tgt), &retired(), &RuleConfig::default());
        assert_eq!(first.issues, second.issues);
        assert_eq!(first.warnings, second.warnings);
        assert_eq!(first.is_fully_compatible, second.is_fully_compatible);
    }
}
