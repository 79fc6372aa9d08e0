/// Analysis engine orchestrating the detection pipeline
///
/// Builds the aggregates, whitelist and flow graph, fans the three detectors
/// out onto blocking workers over shared read-only inputs, then assembles
/// rings, scores accounts and shapes the report.
pub mod aggregates;
pub mod cycle_detector;
pub mod merchant_guard;
pub mod report;
pub mod rings;
pub mod scoring;
pub mod shell_detector;
pub mod smurf_detector;

use std::sync::Arc;
use std::time::Instant;

use tokio::task;
use tracing::{info, warn};

use crate::core::errors::{EngineError, Result};
use crate::core::{DetectionConfig, TransactionTable};
use crate::graph::FlowGraph;
use crate::metrics;

pub use aggregates::AccountAggregates;
pub use report::{AnalysisReport, AnalysisSummary, FraudRing, SuspiciousAccount};
pub use rings::RingPattern;
pub use smurf_detector::{SmurfFlag, SmurfPattern};

pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub(crate) fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisEngine {
    config: DetectionConfig,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        AnalysisEngine {
            config: DetectionConfig::default(),
        }
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        AnalysisEngine { config }
    }

    /// Run the full batch analysis over one transaction snapshot.
    ///
    /// The only surfaced failure is input validation; everything else either
    /// completes or is a counted, logged drop inside one detector.
    pub async fn analyze(&self, table: TransactionTable) -> Result<AnalysisReport> {
        self.config.validate()?;
        if table.is_empty() {
            return Err(EngineError::InvalidInput(
                "transaction table is empty".to_string(),
            ));
        }

        let started = Instant::now();

        let aggregates = Arc::new(AccountAggregates::collect(&table));
        let whitelist = Arc::new(merchant_guard::build_whitelist(&aggregates, &self.config));
        let graph = Arc::new(FlowGraph::from_table(&table));
        let table = Arc::new(table);

        info!(
            "Analyzing {} transactions across {} accounts ({} whitelisted)",
            table.len(),
            graph.node_count(),
            whitelist.len()
        );

        // Shared-nothing workers over immutable inputs; the joins below are
        // the barrier in front of ring assembly.
        let (cycles, smurf, chains) = {
            let cycle_graph = Arc::clone(&graph);
            let cycle_cfg = self.config.clone();
            let cycles_task = task::spawn_blocking(move || {
                cycle_detector::detect_cycles(&cycle_graph, &cycle_cfg)
            });

            let smurf_table = Arc::clone(&table);
            let smurf_wl = Arc::clone(&whitelist);
            let smurf_cfg = self.config.clone();
            let smurf_task = task::spawn_blocking(move || {
                smurf_detector::detect_smurfing(&smurf_table, &smurf_wl, &smurf_cfg)
            });

            let shell_graph = Arc::clone(&graph);
            let shell_agg = Arc::clone(&aggregates);
            let shell_wl = Arc::clone(&whitelist);
            let shell_cfg = self.config.clone();
            let shells_task = task::spawn_blocking(move || {
                shell_detector::detect_shell_chains(&shell_graph, &shell_agg, &shell_wl, &shell_cfg)
            });

            tokio::try_join!(cycles_task, smurf_task, shells_task)
                .map_err(|e| EngineError::AnalysisFailed(e.to_string()))?
        };

        if smurf.dropped_rows > 0 {
            warn!(
                "{} rows dropped from smurfing detection (unparseable timestamp)",
                smurf.dropped_rows
            );
            metrics::ROWS_DROPPED
                .with_label_values(&["bad_timestamp"])
                .inc_by(smurf.dropped_rows as f64);
        }

        info!(
            "Detectors finished: {} cycles, {} smurfed accounts, {} shell chains",
            cycles.len(),
            smurf.flags.len(),
            chains.len()
        );

        let tables = rings::assemble(cycles, chains, smurf.flags);
        let scored = scoring::score_accounts(&tables, &aggregates, &self.config);
        let report = report::build_report(scored, tables, graph.node_count(), started.elapsed());

        metrics::ANALYSES_TOTAL.inc();
        metrics::ANALYSIS_DURATION.observe(started.elapsed().as_secs_f64());
        metrics::FLAGGED_ACCOUNTS.set(report.summary.suspicious_accounts_flagged as f64);
        metrics::FRAUD_RINGS.set(report.summary.fraud_rings_detected as f64);

        info!(
            "Analysis complete: {} suspicious accounts, {} rings in {:.4}s",
            report.summary.suspicious_accounts_flagged,
            report.summary.fraud_rings_detected,
            report.summary.processing_time_seconds
        );

        Ok(report)
    }
}
