//! Single-VM compatibility check

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;

use advisor_lib::models::VmSnapshot;
use advisor_lib::orchestrator::{AdvisorEngine, EngineConfig, ResizeJob, VmConfigSupplier};
use advisor_lib::scorer::AlternativeCandidate;

use crate::config::CliConfig;
use crate::output::{
    color_quality, color_score, format_currency, format_savings, print_error, print_success,
    print_warning, OutputFormat,
};
use crate::sources::FileSnapshotSupplier;
use crate::CheckArgs;

/// Row for the alternatives table
#[derive(Tabled)]
struct AlternativeRow {
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "vCPUs")]
    vcpus: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Monthly")]
    monthly: String,
}

/// Evaluate one VM against a target profile
pub async fn run(config: &CliConfig, args: &CheckArgs, format: OutputFormat) -> Result<()> {
    let snapshot = resolve_snapshot(args).await?;
    let job = ResizeJob {
        index: 0,
        resource_id: args.resource_id.clone(),
        region: args.region.clone(),
        current_profile_id: snapshot.current_profile_id.clone(),
        target_profile_id: args.target.clone(),
    };

    let (catalog, registry, pricing) = super::build_core(config)?;
    let supplier = Arc::new(FileSnapshotSupplier::from_single(
        args.resource_id.clone(),
        snapshot,
    ));
    let engine = AdvisorEngine::new(
        catalog,
        registry,
        pricing,
        supplier,
        EngineConfig {
            max_alternatives: config.max_alternatives,
            include_pricing: !args.no_pricing,
            ..EngineConfig::default()
        },
    );

    let record = engine.evaluate_job(&job).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        OutputFormat::Table => {
            println!(
                "{} → {} in {}\n",
                record.current_profile_id.bold(),
                record.target_profile_id.bold(),
                record.region
            );

            if let Some(report) = &record.compatibility {
                for issue in &report.issues {
                    print_error(issue);
                }
                for warning in &report.warnings {
                    print_warning(warning);
                }
                if report.issues.is_empty() && report.warnings.is_empty() {
                    print_success("No compatibility concerns found");
                }
            }

            if let Some(classification) = &record.target_classification {
                if classification.is_retiring() && !classification.replacement_series.is_empty() {
                    println!(
                        "\nSuggested replacement series: {}",
                        classification.replacement_series.join(", ")
                    );
                }
            }

            println!("\nRecommendation: {}", color_quality(record.quality));

            if let (Some(current), Some(target)) = (&record.current_quote, &record.target_quote) {
                println!();
                if current.found {
                    println!(
                        "Current:  {}/mo",
                        format_currency(current.monthly_rate, &current.currency)
                    );
                }
                if target.found {
                    println!(
                        "Target:   {}/mo",
                        format_currency(target.monthly_rate, &target.currency)
                    );
                }
                match record.monthly_savings {
                    Some(savings) => {
                        println!("Change:   {}", format_savings(savings, &current.currency))
                    }
                    None => print_warning("Pricing incomplete; savings not computed"),
                }
            }

            if !record.alternatives.is_empty() {
                println!("\nAlternatives:");
                let rows: Vec<AlternativeRow> =
                    record.alternatives.iter().map(alternative_row).collect();
                let table = tabled::Table::new(rows)
                    .with(tabled::settings::Style::rounded())
                    .to_string();
                println!("{}", table);
            }
        }
    }

    Ok(())
}

async fn resolve_snapshot(args: &CheckArgs) -> Result<VmSnapshot> {
    match &args.snapshot_file {
        Some(path) => {
            let supplier = FileSnapshotSupplier::from_path(Path::new(path))?;
            let snapshot = supplier
                .snapshot(&args.resource_id)
                .await
                .with_context(|| format!("No snapshot for {} in {}", args.resource_id, path))?;
            Ok(snapshot)
        }
        None => {
            let current = args
                .current
                .clone()
                .context("--current is required when no --snapshot-file is given")?;
            Ok(VmSnapshot {
                current_profile_id: current,
                region: args.region.clone(),
                data_disk_count: args.data_disks,
                uses_premium_storage: args.premium,
                uses_accelerated_networking: args.accelerated_networking,
                uses_ultra_disk: args.ultra_disk,
                trusted_launch_enabled: args.trusted_launch,
                pinned_zone: args.zone,
                os_type: args.os.into(),
            })
        }
    }
}

fn alternative_row(candidate: &AlternativeCandidate) -> AlternativeRow {
    let monthly = match &candidate.quote {
        Some(quote) if quote.found => {
            format!("{}/mo", format_currency(quote.monthly_rate, &quote.currency))
        }
        Some(_) => "unknown".to_string(),
        None => "-".to_string(),
    };
    AlternativeRow {
        profile: candidate.profile_id.clone(),
        vcpus: candidate.vcpus.to_string(),
        memory: format!("{:.0} GB", candidate.memory_gb),
        category: candidate.category.to_string(),
        score: color_score(candidate.score),
        monthly,
    }
}
