//! Batch orchestrator
//!
//! Drives the catalog, registry, evaluator, scorer, and pricing
//! resolver over a set of resize jobs. Processing is fault-isolated:
//! every input job produces exactly one output record, and a failure,
//! panic, or timeout in one job never aborts its siblings.

use crate::catalog::CapabilityCatalog;
use crate::compat::{self, CompatibilityReport, RuleConfig};
use crate::error::{JobError, SupplierError};
use crate::models::VmSnapshot;
use crate::observability::{AdvisorMetrics, RunLogger};
use crate::pricing::PricingResolver;
use crate::scorer::{self, AlternativeCandidate};
use crate::series::{SeriesClassification, SeriesRegistry};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};

/// Supplies the current configuration of a VM
#[async_trait]
pub trait VmConfigSupplier: Send + Sync {
    async fn snapshot(&self, resource_id: &str) -> Result<VmSnapshot, SupplierError>;
}

/// Supplies pre-parsed resize jobs
///
/// Parsing of whatever external record format exists (tabular file,
/// advisory feed) is entirely the source's responsibility; the core
/// never sees raw text.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_jobs(&self) -> Result<Vec<ResizeJob>>;
}

/// One resize evaluation unit of work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeJob {
    /// Position in the input set, carried through to the output record
    pub index: usize,
    /// Coordinate the configuration supplier resolves
    pub resource_id: String,
    pub region: String,
    pub current_profile_id: String,
    pub target_profile_id: String,
}

impl ResizeJob {
    fn validate(&self) -> Result<(), JobError> {
        for (field, value) in [
            ("resource_id", &self.resource_id),
            ("region", &self.region),
            ("current_profile_id", &self.current_profile_id),
            ("target_profile_id", &self.target_profile_id),
        ] {
            if value.trim().is_empty() {
                return Err(JobError::Validation(format!("{} is empty", field)));
            }
        }
        Ok(())
    }
}

/// Final state of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Completed,
    Failed,
    Timeout,
    Invalid,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
            RecordStatus::Timeout => "timeout",
            RecordStatus::Invalid => "invalid",
        }
    }
}

/// Overall quality label attached to a completed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationQuality {
    /// No issues and no warnings
    ReadyToResize,
    /// Compatible, but warnings deserve a look
    ReviewWarnings,
    /// At least one blocking issue
    Blocked,
    /// The record did not complete
    Unknown,
}

/// The per-job output record, immutable once emitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub index: usize,
    pub resource_id: String,
    pub region: String,
    pub current_profile_id: String,
    pub target_profile_id: String,
    pub status: RecordStatus,
    pub quality: RecommendationQuality,
    pub compatibility: Option<CompatibilityReport>,
    pub current_classification: Option<SeriesClassification>,
    pub target_classification: Option<SeriesClassification>,
    pub alternatives: Vec<AlternativeCandidate>,
    pub current_quote: Option<crate::models::PricingQuote>,
    pub target_quote: Option<crate::models::PricingQuote>,
    /// Current minus target monthly rate; present only when both quotes
    /// resolved, so an unknown rate never masquerades as savings
    pub monthly_savings: Option<f64>,
    pub error: Option<String>,
    pub generated_at: i64,
}

impl RecommendationRecord {
    /// Record for a job that did not complete
    fn unprocessed(job: &ResizeJob, status: RecordStatus, error: String) -> Self {
        Self {
            index: job.index,
            resource_id: job.resource_id.clone(),
            region: job.region.clone(),
            current_profile_id: job.current_profile_id.clone(),
            target_profile_id: job.target_profile_id.clone(),
            status,
            quality: RecommendationQuality::Unknown,
            compatibility: None,
            current_classification: None,
            target_classification: None,
            alternatives: Vec::new(),
            current_quote: None,
            target_quote: None,
            monthly_savings: None,
            error: Some(error),
            generated_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Re-sort records into input order after a parallel run
pub fn sort_by_input_index(records: &mut [RecommendationRecord]) {
    records.sort_by_key(|record| record.index);
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub rules: RuleConfig,
    /// Maximum alternatives attached to a record
    pub max_alternatives: usize,
    pub include_alternatives: bool,
    pub include_pricing: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: RuleConfig::default(),
            max_alternatives: 5,
            include_alternatives: true,
            include_pricing: true,
        }
    }
}

/// Evaluates one resize job end to end
///
/// Pipeline: validate, snapshot, capabilities, classification,
/// compatibility, then optionally alternatives and pricing. All shared
/// state lives in the catalog and resolver caches, which own their
/// fetch-once semantics; the engine itself is stateless per job.
pub struct AdvisorEngine {
    catalog: Arc<CapabilityCatalog>,
    registry: Arc<SeriesRegistry>,
    pricing: Arc<PricingResolver>,
    supplier: Arc<dyn VmConfigSupplier>,
    config: EngineConfig,
    metrics: AdvisorMetrics,
}

impl AdvisorEngine {
    pub fn new(
        catalog: Arc<CapabilityCatalog>,
        registry: Arc<SeriesRegistry>,
        pricing: Arc<PricingResolver>,
        supplier: Arc<dyn VmConfigSupplier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            registry,
            pricing,
            supplier,
            config,
            metrics: AdvisorMetrics::new(),
        }
    }

    /// Evaluate one job into a completed record
    pub async fn evaluate_job(&self, job: &ResizeJob) -> Result<RecommendationRecord, JobError> {
        job.validate()?;
        let start = Instant::now();

        let snapshot = self.supplier.snapshot(&job.resource_id).await?;

        let current_caps = self
            .catalog
            .get(&job.region, &job.current_profile_id)
            .await;
        let target_caps = self.catalog.get(&job.region, &job.target_profile_id).await;

        let current_classification = self.registry.classify(&job.current_profile_id);
        let target_classification = self.registry.classify(&job.target_profile_id);

        let report = compat::evaluate(
            &snapshot,
            &job.target_profile_id,
            target_caps.as_ref(),
            &target_classification,
            &self.config.rules,
        );

        let mut alternatives = Vec::new();
        let needs_alternatives = !report.is_fully_compatible
            || current_classification.is_retiring()
            || target_classification.is_retiring();
        if self.config.include_alternatives && needs_alternatives {
            if let Some(current) = current_caps.as_ref() {
                let candidates = self.catalog.region_profiles(&job.region).await;
                alternatives = scorer::rank(
                    current,
                    &candidates,
                    &self.registry,
                    self.config.max_alternatives,
                );
            } else {
                debug!(
                    resource_id = %job.resource_id,
                    profile_id = %job.current_profile_id,
                    "Current profile unknown in region, skipping alternatives"
                );
            }
        }

        let mut current_quote = None;
        let mut target_quote = None;
        let mut monthly_savings = None;
        if self.config.include_pricing {
            let current = self
                .pricing
                .get_price(&job.current_profile_id, &job.region, snapshot.os_type)
                .await;
            let target = self
                .pricing
                .get_price(&job.target_profile_id, &job.region, snapshot.os_type)
                .await;
            if current.found && target.found {
                monthly_savings = Some(current.monthly_rate - target.monthly_rate);
            }
            for candidate in alternatives.iter_mut() {
                let quote = self
                    .pricing
                    .get_price(&candidate.profile_id, &job.region, snapshot.os_type)
                    .await;
                candidate.quote = Some(quote);
            }
            current_quote = Some(current);
            target_quote = Some(target);
        }

        let quality = if !report.is_fully_compatible {
            RecommendationQuality::Blocked
        } else if !report.warnings.is_empty() {
            RecommendationQuality::ReviewWarnings
        } else {
            RecommendationQuality::ReadyToResize
        };

        self.metrics
            .observe_record_latency(start.elapsed().as_secs_f64());

        Ok(RecommendationRecord {
            index: job.index,
            resource_id: job.resource_id.clone(),
            region: job.region.clone(),
            current_profile_id: job.current_profile_id.clone(),
            target_profile_id: job.target_profile_id.clone(),
            status: RecordStatus::Completed,
            quality,
            compatibility: Some(report),
            current_classification: Some(current_classification),
            target_classification: Some(target_classification),
            alternatives,
            current_quote,
            target_quote,
            monthly_savings,
            error: None,
            generated_at: chrono::Utc::now().timestamp(),
        })
    }
}

/// Scheduling mode for a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    /// One record at a time, in input order
    Sequential,
    /// Fixed-size worker pool over a shared queue; completion order is
    /// relaxed, records carry the input index
    Parallel,
}

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub mode: ProcessMode,
    /// Worker pool size in parallel mode
    pub concurrency: usize,
    /// Wall-clock budget for one record's full pipeline
    pub per_job_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            mode: ProcessMode::Sequential,
            concurrency: 4,
            per_job_timeout: Duration::from_secs(60),
        }
    }
}

/// Fault-isolated batch driver
pub struct BatchOrchestrator {
    engine: Arc<AdvisorEngine>,
    config: OrchestratorConfig,
    logger: RunLogger,
    metrics: AdvisorMetrics,
}

impl BatchOrchestrator {
    pub fn new(engine: Arc<AdvisorEngine>, config: OrchestratorConfig) -> Self {
        let run_id = format!("run-{}", chrono::Utc::now().timestamp_millis());
        Self {
            engine,
            config,
            logger: RunLogger::new(run_id),
            metrics: AdvisorMetrics::new(),
        }
    }

    /// Process every job into exactly one record
    pub async fn process_all(&self, jobs: Vec<ResizeJob>) -> Vec<RecommendationRecord> {
        let total = jobs.len();
        let mode = match self.config.mode {
            ProcessMode::Sequential => "sequential",
            ProcessMode::Parallel => "parallel",
        };
        self.logger
            .log_run_started(total, mode, self.config.concurrency);
        let start = Instant::now();

        let records = match self.config.mode {
            ProcessMode::Sequential => self.process_sequential(jobs).await,
            ProcessMode::Parallel => self.process_parallel(jobs).await,
        };

        let completed = records
            .iter()
            .filter(|r| r.status == RecordStatus::Completed)
            .count();
        let timed_out = records
            .iter()
            .filter(|r| r.status == RecordStatus::Timeout)
            .count();
        let failed = records.len() - completed - timed_out;
        self.logger
            .log_run_finished(completed, failed, timed_out, start.elapsed().as_secs_f64());

        records
    }

    async fn process_sequential(&self, jobs: Vec<ResizeJob>) -> Vec<RecommendationRecord> {
        let mut records = Vec::with_capacity(jobs.len());
        for job in jobs {
            let record = run_one(
                self.engine.clone(),
                job,
                self.config.per_job_timeout,
                &self.metrics,
            )
            .await;
            self.logger.log_record(
                &record.resource_id,
                record.status.as_str(),
                record
                    .compatibility
                    .as_ref()
                    .map(|c| c.is_fully_compatible),
            );
            records.push(record);
        }
        records
    }

    async fn process_parallel(&self, jobs: Vec<ResizeJob>) -> Vec<RecommendationRecord> {
        let total = jobs.len();
        if total == 0 {
            return Vec::new();
        }

        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let (result_tx, mut result_rx) = mpsc::channel(total);
        let workers = self.config.concurrency.max(1);

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let queue = queue.clone();
            let result_tx = result_tx.clone();
            let engine = self.engine.clone();
            let per_job_timeout = self.config.per_job_timeout;
            let logger = self.logger.clone();
            let metrics = self.metrics.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    let job = { queue.lock().await.pop_front() };
                    let Some(job) = job else {
                        break;
                    };
                    let record =
                        run_one(engine.clone(), job, per_job_timeout, &metrics).await;
                    logger.log_record(
                        &record.resource_id,
                        record.status.as_str(),
                        record
                            .compatibility
                            .as_ref()
                            .map(|c| c.is_fully_compatible),
                    );
                    if result_tx.send(record).await.is_err() {
                        break;
                    }
                }
                debug!(worker_id = worker_id, "Worker drained queue");
            }));
        }
        drop(result_tx);

        let mut records = Vec::with_capacity(total);
        while let Some(record) = result_rx.recv().await {
            records.push(record);
        }
        for handle in handles {
            let _ = handle.await;
        }
        records
    }
}

/// Run one job inside its own task with the per-record budget
///
/// Spawning isolates panics; the timeout aborts the task so a stuck
/// backend call cannot hold a worker past the budget.
async fn run_one(
    engine: Arc<AdvisorEngine>,
    job: ResizeJob,
    per_job_timeout: Duration,
    metrics: &AdvisorMetrics,
) -> RecommendationRecord {
    let task_job = job.clone();
    let mut handle = tokio::spawn(async move { engine.evaluate_job(&task_job).await });

    match timeout(per_job_timeout, &mut handle).await {
        Ok(Ok(Ok(record))) => {
            metrics.inc_records_processed();
            record
        }
        Ok(Ok(Err(job_err))) => {
            metrics.inc_records_failed();
            let status = match &job_err {
                JobError::Validation(_) => RecordStatus::Invalid,
                JobError::Snapshot(_) => RecordStatus::Failed,
            };
            RecommendationRecord::unprocessed(&job, status, job_err.to_string())
        }
        Ok(Err(join_err)) => {
            metrics.inc_records_failed();
            warn!(
                resource_id = %job.resource_id,
                error = %join_err,
                "Record processing task failed"
            );
            RecommendationRecord::unprocessed(
                &job,
                RecordStatus::Failed,
                format!("processing task failed: {}", join_err),
            )
        }
        Err(_elapsed) => {
            handle.abort();
            metrics.inc_records_timed_out();
            warn!(
                resource_id = %job.resource_id,
                budget_secs = per_job_timeout.as_secs_f64(),
                "Record processing exceeded budget"
            );
            RecommendationRecord::unprocessed(
                &job,
                RecordStatus::Timeout,
                format!(
                    "processing exceeded {}s budget",
                    per_job_timeout.as_secs_f64()
                ),
            )
        }
    }
}
