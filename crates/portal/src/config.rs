//! Construction parameters for a portal instance.

use std::ops::Range;
use std::path::PathBuf;

use portalfx_core::Rgb;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a [`PortalConfig`] cannot produce a well-formed pool.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A field is out of its valid domain.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfiguration {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

/// Half-open millisecond range `[min, max)` a lifespan is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifespanRange {
    /// Inclusive lower bound in milliseconds.
    pub min: f32,
    /// Exclusive upper bound in milliseconds.
    pub max: f32,
}

impl LifespanRange {
    /// Construct a range.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// As a std range for sampling.
    pub fn as_range(&self) -> Range<f32> {
        self.min..self.max
    }

    /// Whether `value` lies in `[min, max)`.
    pub fn contains(&self, value: f32) -> bool {
        self.as_range().contains(&value)
    }
}

/// Uniform velocity noise half-widths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityJitter {
    /// Applied independently to x and y.
    pub xy: f32,
    /// Applied to z.
    pub z: f32,
}

impl Default for VelocityJitter {
    fn default() -> Self {
        Self { xy: 0.06, z: 0.02 }
    }
}

/// How the per-frame downward acceleration is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum GravityMode {
    /// Subtract `gravity` once per integration pass, ignoring `delta`.
    ///
    /// This makes fall speed depend on the frame rate; it is the default so
    /// existing scenes keep their look.
    #[default]
    PerTick,
    /// Subtract `gravity * delta * reference_hz`, matching `PerTick` at
    /// `reference_hz` frames per second.
    DeltaScaled {
        /// Frame rate at which both modes agree.
        reference_hz: f32,
    },
}

impl GravityMode {
    /// Velocity decrement for one pass of length `delta` seconds.
    pub fn decrement(&self, gravity: f32, delta: f32) -> f32 {
        match *self {
            GravityMode::PerTick => gravity,
            GravityMode::DeltaScaled { reference_hz } => gravity * delta * reference_hz,
        }
    }
}

/// Everything needed to construct a [`crate::Portal`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Equirectangular panorama shown through the portal.
    pub texture: Option<PathBuf>,
    /// World-space y below which particles are recycled.
    pub floor: f32,
    /// Group position in the parent frame.
    pub position: [f32; 3],
    /// Group rotation about +Y in radians.
    pub yaw: f32,
    /// Pool capacity.
    pub max_particles: u32,
    /// Ring radius in local units.
    pub radius: f32,
    /// Slots added per frame while filling.
    pub spawn_batch: u32,
    /// Angular step of the initial fill is `2π / spawn_ring_divisions`.
    pub spawn_ring_divisions: u32,
    /// Lifespan range for first-time spawns.
    pub spawn_lifespan_ms: LifespanRange,
    /// Lifespan range for recycled slots.
    pub recycle_lifespan_ms: LifespanRange,
    /// Tangential velocity factor applied to the ring position.
    pub tangential_speed: f32,
    /// Velocity noise for first-time spawns.
    pub spawn_jitter: VelocityJitter,
    /// Velocity noise for recycled slots.
    pub recycle_jitter: VelocityJitter,
    /// Per-axis positional noise half-width applied every pass.
    pub position_jitter: f32,
    /// Downward velocity change per pass.
    pub gravity: f32,
    /// How `gravity` interacts with `delta`.
    pub gravity_mode: GravityMode,
    /// Color at life ratio 0.
    pub initial_color: Rgb,
    /// Color at life ratio 0.5.
    pub mid_color: Rgb,
    /// Color at life ratio 1.
    pub final_color: Rgb,
    /// Fade duration once the pool fills. `None` switches opacity instantly.
    pub reveal_fade_ms: Option<f32>,
    /// RNG seed. `None` uses OS entropy.
    pub seed: Option<u64>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            texture: None,
            floor: 0.0,
            position: [0.0, 10.0, 0.0],
            yaw: std::f32::consts::PI,
            max_particles: 50_000,
            radius: 5.0,
            spawn_batch: 500,
            spawn_ring_divisions: 15_000,
            spawn_lifespan_ms: LifespanRange::new(400.0, 2000.0),
            recycle_lifespan_ms: LifespanRange::new(20.0, 820.0),
            tangential_speed: 0.05,
            spawn_jitter: VelocityJitter::default(),
            recycle_jitter: VelocityJitter::default(),
            position_jitter: 0.005,
            gravity: 0.004,
            gravity_mode: GravityMode::PerTick,
            initial_color: Rgb::YELLOW,
            mid_color: Rgb::ORANGE,
            final_color: Rgb::RED,
            reveal_fade_ms: None,
            seed: None,
        }
    }
}

/// Largest pool a portal will allocate; about 176 MiB of slot storage.
pub const MAX_PARTICLE_CAPACITY: u32 = 1 << 22;

impl PortalConfig {
    /// Reject configurations that would yield undefined buffer sizes or
    /// empty sampling ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_particles == 0 {
            return Err(ConfigError::invalid("max_particles", "must be at least 1"));
        }
        if self.max_particles > MAX_PARTICLE_CAPACITY {
            return Err(ConfigError::invalid(
                "max_particles",
                format!(
                    "{} exceeds the supported maximum of {MAX_PARTICLE_CAPACITY}",
                    self.max_particles
                ),
            ));
        }
        if self.spawn_batch == 0 {
            return Err(ConfigError::invalid("spawn_batch", "must be at least 1"));
        }
        if self.spawn_ring_divisions == 0 {
            return Err(ConfigError::invalid(
                "spawn_ring_divisions",
                "must be at least 1",
            ));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::invalid(
                "radius",
                format!("must be positive and finite, got {}", self.radius),
            ));
        }
        if !self.floor.is_finite() {
            return Err(ConfigError::invalid("floor", "must be finite"));
        }
        if self.position.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::invalid("position", "must be finite"));
        }
        if !self.yaw.is_finite() {
            return Err(ConfigError::invalid("yaw", "must be finite"));
        }
        check_lifespan("spawn_lifespan_ms", &self.spawn_lifespan_ms)?;
        check_lifespan("recycle_lifespan_ms", &self.recycle_lifespan_ms)?;
        check_jitter("spawn_jitter", &self.spawn_jitter)?;
        check_jitter("recycle_jitter", &self.recycle_jitter)?;
        if !(self.position_jitter.is_finite() && self.position_jitter >= 0.0) {
            return Err(ConfigError::invalid(
                "position_jitter",
                "must be non-negative",
            ));
        }
        if let GravityMode::DeltaScaled { reference_hz } = self.gravity_mode {
            if !(reference_hz.is_finite() && reference_hz > 0.0) {
                return Err(ConfigError::invalid(
                    "gravity_mode.reference_hz",
                    "must be positive",
                ));
            }
        }
        if let Some(fade) = self.reveal_fade_ms {
            if !(fade.is_finite() && fade >= 0.0) {
                return Err(ConfigError::invalid(
                    "reveal_fade_ms",
                    "must be non-negative",
                ));
            }
        }
        Ok(())
    }
}

fn check_lifespan(field: &'static str, range: &LifespanRange) -> Result<(), ConfigError> {
    if !(range.min.is_finite() && range.max.is_finite()) || range.min <= 0.0 {
        return Err(ConfigError::invalid(
            field,
            "bounds must be finite and positive",
        ));
    }
    if range.min >= range.max {
        return Err(ConfigError::invalid(
            field,
            format!("empty range [{}, {})", range.min, range.max),
        ));
    }
    Ok(())
}

fn check_jitter(field: &'static str, jitter: &VelocityJitter) -> Result<(), ConfigError> {
    if !(jitter.xy.is_finite() && jitter.z.is_finite()) || jitter.xy < 0.0 || jitter.z < 0.0 {
        return Err(ConfigError::invalid(field, "must be non-negative"));
    }
    Ok(())
}
