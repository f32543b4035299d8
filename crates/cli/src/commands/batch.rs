//! Batch evaluation over a jobs file

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tabled::Tabled;

use advisor_lib::orchestrator::{
    sort_by_input_index, AdvisorEngine, BatchOrchestrator, EngineConfig, OrchestratorConfig,
    ProcessMode, RecommendationRecord, RecordSource, RecordStatus,
};

use crate::config::CliConfig;
use crate::output::{
    color_quality, color_record_status, format_savings, print_success, print_warning, OutputFormat,
};
use crate::sources::{FileRecordSource, FileSnapshotSupplier};
use crate::BatchArgs;

/// Row for the batch summary table
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Recommendation")]
    quality: String,
    #[tabled(rename = "Issues")]
    issues: String,
    #[tabled(rename = "Warnings")]
    warnings: String,
    #[tabled(rename = "Savings")]
    savings: String,
}

/// Run the orchestrator over a jobs file
pub async fn run(config: &CliConfig, args: &BatchArgs, format: OutputFormat) -> Result<()> {
    let source = FileRecordSource::new(&args.jobs);
    let jobs = source.fetch_jobs().await?;
    if jobs.is_empty() {
        print_warning("No jobs in input file");
        return Ok(());
    }

    let supplier = Arc::new(FileSnapshotSupplier::from_path(Path::new(&args.snapshots))?);
    let (catalog, registry, pricing) = super::build_core(config)?;
    let engine = Arc::new(AdvisorEngine::new(
        catalog,
        registry,
        pricing,
        supplier,
        EngineConfig {
            max_alternatives: config.max_alternatives,
            include_pricing: !args.no_pricing,
            ..EngineConfig::default()
        },
    ));

    let orchestrator_config = OrchestratorConfig {
        mode: if args.parallel.is_some() {
            ProcessMode::Parallel
        } else {
            ProcessMode::Sequential
        },
        concurrency: args.parallel.unwrap_or(config.concurrency),
        per_job_timeout: Duration::from_secs(
            args.timeout_secs.unwrap_or(config.per_job_timeout_secs),
        ),
    };
    let orchestrator = BatchOrchestrator::new(engine, orchestrator_config);

    let mut records = orchestrator.process_all(jobs).await;
    sort_by_input_index(&mut records);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write records to {}", path))?;
        print_success(&format!("Wrote {} records to {}", records.len(), path));
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Table => {
            let rows: Vec<RecordRow> = records.iter().map(record_row).collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            let completed = records
                .iter()
                .filter(|r| r.status == RecordStatus::Completed)
                .count();
            println!(
                "\nTotal: {} records, {} completed, {} not processed",
                records.len(),
                completed,
                records.len() - completed
            );
        }
    }

    Ok(())
}

fn record_row(record: &RecommendationRecord) -> RecordRow {
    let (issues, warnings) = match &record.compatibility {
        Some(report) => (report.issues.len().to_string(), report.warnings.len().to_string()),
        None => ("-".to_string(), "-".to_string()),
    };
    let savings = match record.monthly_savings {
        Some(amount) => {
            let currency = record
                .current_quote
                .as_ref()
                .map(|q| q.currency.as_str())
                .unwrap_or("USD");
            format_savings(amount, currency)
        }
        None => "-".to_string(),
    };
    RecordRow {
        index: record.index,
        resource: record.resource_id.clone(),
        current: record.current_profile_id.clone(),
        target: record.target_profile_id.clone(),
        status: color_record_status(record.status),
        quality: color_quality(record.quality),
        issues,
        warnings,
        savings,
    }
}
