//! Metrics collection and reporting for headless runs and CI.
//!
//! Reports are exported as pretty JSON so runs can be diffed and compared.

use anyhow::Result;
use portalfx_portal::FrameStats;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Top-level metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Run identifier.
    pub test_name: String,

    /// Timestamp when metrics were collected (ISO 8601).
    pub timestamp: String,

    /// Overall result.
    pub result: TestResult,

    /// Particle simulation metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationMetrics>,

    /// Upload staging metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadMetrics>,

    /// Execution metrics.
    pub test_execution: TestExecutionMetrics,
}

/// Overall result status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// All validations passed.
    Pass,
    /// Something failed.
    Fail,
    /// Skipped.
    Skip,
}

/// Aggregated particle simulation metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    /// Integration passes run.
    pub frames: u64,

    /// Pool capacity.
    pub max_particles: u32,

    /// Live slots after the last pass.
    pub final_live_count: u32,

    /// Total slots spawned.
    pub total_spawned: u64,

    /// Total slots recycled at the floor.
    pub recycled_floor: u64,

    /// Total slots recycled by age.
    pub recycled_age: u64,

    /// First frame at which the portal was visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opened_at_frame: Option<u64>,

    /// Opacity after the last pass.
    pub final_opacity: f32,

    /// Average pass time (microseconds).
    pub avg_frame_time_us: f64,
}

impl SimulationMetrics {
    /// Start an empty accumulator for a pool of `max_particles`.
    pub fn new(max_particles: u32) -> Self {
        Self {
            max_particles,
            ..Default::default()
        }
    }

    /// Fold one pass into the totals.
    pub fn record(&mut self, stats: &FrameStats, frame_time_us: f64) {
        let n = self.frames as f64;
        self.avg_frame_time_us = (self.avg_frame_time_us * n + frame_time_us) / (n + 1.0);
        self.frames += 1;
        self.final_live_count = stats.live_count;
        self.total_spawned += u64::from(stats.spawned);
        self.recycled_floor += u64::from(stats.recycled_floor);
        self.recycled_age += u64::from(stats.recycled_age);
        self.final_opacity = stats.opacity;
        if self.opened_at_frame.is_none() && stats.opacity > 0.0 {
            self.opened_at_frame = Some(stats.tick.0);
        }
    }
}

/// Upload staging metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadMetrics {
    /// Batches staged for upload.
    pub batches: u64,

    /// Bytes staged in the final batch.
    pub last_batch_bytes: usize,
}

/// Execution metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Wall-clock duration in seconds.
    pub duration_seconds: f64,

    /// Number of assertions checked, if tracked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions_checked: Option<usize>,
}

/// Builder for [`MetricsReport`].
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Start a report named `test_name`, stamped with the current time.
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: TestResult::Pass,
                simulation: None,
                upload: None,
                test_execution: TestExecutionMetrics {
                    duration_seconds: 0.0,
                    assertions_checked: None,
                },
            },
        }
    }

    /// Set the overall result.
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Attach simulation metrics.
    pub fn simulation(mut self, metrics: SimulationMetrics) -> Self {
        self.report.simulation = Some(metrics);
        self
    }

    /// Attach upload metrics.
    pub fn upload(mut self, metrics: UploadMetrics) -> Self {
        self.report.upload = Some(metrics);
        self
    }

    /// Set execution metrics.
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Finish the report.
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files.
pub struct MetricsSink {
    path: std::path::PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Write the report.
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        tracing::info!(path = %self.path.display(), "metrics report written");
        Ok(())
    }
}
