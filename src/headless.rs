use anyhow::{Context, Result};
use portalfx_core::FrameTick;
use portalfx_portal::{Portal, PortalConfig};
use portalfx_render::{load_or_untextured, PortalSurface, UploadQueue};
use portalfx_testkit::{
    EventRecord, JsonlSink, MetricsReportBuilder, MetricsSink, SimulationMetrics,
    TestExecutionMetrics, TestResult, UploadMetrics,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub struct HeadlessConfig {
    pub portal: PortalConfig,
    pub frames: u64,
    pub delta: f32,
    pub events: Option<PathBuf>,
    pub metrics: Option<PathBuf>,
}

/// Totals from a finished run.
#[derive(Debug)]
pub struct RunSummary {
    pub simulation: SimulationMetrics,
    pub uploads: u64,
    pub textured: bool,
}

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    if !(cfg.delta.is_finite() && cfg.delta >= 0.0) {
        anyhow::bail!("--delta must be a non-negative number of seconds, got {}", cfg.delta);
    }

    let mut portal = Portal::new(cfg.portal).context("invalid portal configuration")?;
    let panorama = portal.texture().and_then(load_or_untextured).map(Arc::new);
    let mut textured = panorama.is_some();
    if let Some(texture) = &panorama {
        tracing::info!(
            width = texture.width,
            height = texture.height,
            "panorama loaded"
        );
    }

    let mut events = match &cfg.events {
        Some(path) => Some(
            JsonlSink::create(path)
                .with_context(|| format!("failed to create event log {}", path.display()))?,
        ),
        None => None,
    };

    let mut queue = UploadQueue::new();
    let mut simulation = SimulationMetrics::new(portal.config().max_particles);
    let mut last_batch_bytes = 0;
    let started = Instant::now();

    for _ in 0..cfg.frames {
        let pass_started = Instant::now();
        let stats = portal.update(cfg.delta);
        let pass_us = pass_started.elapsed().as_secs_f64() * 1e6;

        let was_open = simulation.opened_at_frame.is_some();
        simulation.record(&stats, pass_us);

        if let Some((batch, _)) = queue.stage(&mut portal) {
            last_batch_bytes = batch.as_bytes().len();
        }
        let surface = PortalSurface::for_portal(&portal).with_panorama(panorama.clone());
        textured = surface.is_textured();

        tracing::debug!(
            tick = stats.tick.0,
            live = stats.live_count,
            recycled_floor = stats.recycled_floor,
            recycled_age = stats.recycled_age,
            opacity = surface.opacity,
            textured = surface.is_textured(),
            "frame"
        );

        if let Some(sink) = events.as_mut() {
            sink.write(&EventRecord::frame(&stats))?;
            if !was_open && surface.is_visible() {
                sink.write(&EventRecord::marker(stats.tick, "PortalOpened"))?;
            }
        }
    }

    if let Some(sink) = events.as_mut() {
        sink.write(&EventRecord::marker(
            portal.tick(),
            if textured { "RunFinished" } else { "RunFinishedUntextured" },
        ))?;
        sink.flush()?;
    }

    let summary = RunSummary {
        simulation,
        uploads: queue.uploads(),
        textured,
    };

    if let Some(path) = &cfg.metrics {
        let report = MetricsReportBuilder::new("portalfx_headless")
            .result(TestResult::Pass)
            .simulation(summary.simulation.clone())
            .upload(UploadMetrics {
                batches: summary.uploads,
                last_batch_bytes,
            })
            .execution(TestExecutionMetrics {
                duration_seconds: started.elapsed().as_secs_f64(),
                assertions_checked: None,
            })
            .build();
        MetricsSink::create(path)
            .and_then(|sink| sink.write(&report))
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
    }

    tracing::info!(
        frames = summary.simulation.frames,
        live = summary.simulation.final_live_count,
        opened_at = ?summary.simulation.opened_at_frame.map(FrameTick),
        "headless run finished"
    );
    Ok(summary)
}
