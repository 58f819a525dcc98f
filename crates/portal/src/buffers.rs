//! Owned particle storage.
//!
//! All per-slot state lives in one struct of parallel arrays sized to the
//! pool capacity. Positions and colors are stored as `[f32; 3]` so the
//! renderer can upload them without repacking.

use glam::Vec3;
use portalfx_core::Rgb;

/// Which upload-facing arrays changed since the renderer last consumed them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    /// Position array changed.
    pub positions: bool,
    /// Color array changed.
    pub colors: bool,
}

impl DirtyFlags {
    /// Whether anything needs re-uploading.
    pub fn any(&self) -> bool {
        self.positions || self.colors
    }
}

/// Parallel per-slot arrays for a fixed-capacity pool.
#[derive(Debug, Clone)]
pub struct ParticleBuffers {
    positions: Vec<[f32; 3]>,
    velocities: Vec<Vec3>,
    ages: Vec<f32>,
    lifespans: Vec<f32>,
    colors: Vec<[f32; 3]>,
    dirty: DirtyFlags,
}

impl ParticleBuffers {
    /// Allocate zeroed storage for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: vec![[0.0; 3]; capacity],
            velocities: vec![Vec3::ZERO; capacity],
            ages: vec![0.0; capacity],
            lifespans: vec![0.0; capacity],
            colors: vec![[0.0; 3]; capacity],
            dirty: DirtyFlags::default(),
        }
    }

    /// Number of slots, live or inert.
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Local-space position of slot `idx`.
    pub fn position(&self, idx: usize) -> Vec3 {
        Vec3::from_array(self.positions[idx])
    }

    /// Overwrite the local-space position of slot `idx`.
    pub fn set_position(&mut self, idx: usize, position: Vec3) {
        self.positions[idx] = position.to_array();
    }

    /// Local-space velocity of slot `idx`.
    pub fn velocity(&self, idx: usize) -> Vec3 {
        self.velocities[idx]
    }

    /// Overwrite the velocity of slot `idx`.
    pub fn set_velocity(&mut self, idx: usize, velocity: Vec3) {
        self.velocities[idx] = velocity;
    }

    /// Milliseconds since slot `idx` was last (re)spawned.
    pub fn age(&self, idx: usize) -> f32 {
        self.ages[idx]
    }

    /// Overwrite the age of slot `idx`.
    pub fn set_age(&mut self, idx: usize, age: f32) {
        self.ages[idx] = age;
    }

    /// Lifespan of slot `idx` in milliseconds.
    pub fn lifespan(&self, idx: usize) -> f32 {
        self.lifespans[idx]
    }

    /// Overwrite the lifespan of slot `idx`.
    pub fn set_lifespan(&mut self, idx: usize, lifespan: f32) {
        self.lifespans[idx] = lifespan;
    }

    /// `age / lifespan` for slot `idx`, unclamped.
    pub fn life_ratio(&self, idx: usize) -> f32 {
        self.ages[idx] / self.lifespans[idx]
    }

    /// Current color of slot `idx`.
    pub fn color(&self, idx: usize) -> Rgb {
        Rgb::from(self.colors[idx])
    }

    /// Overwrite the color of slot `idx`.
    pub fn set_color(&mut self, idx: usize, color: Rgb) {
        self.colors[idx] = color.to_array();
    }

    /// Mutable color slot, for writing interpolation results in place.
    pub fn color_slot_mut(&mut self, idx: usize) -> &mut [f32; 3] {
        &mut self.colors[idx]
    }

    /// Position array of the first `live` slots.
    pub fn positions(&self, live: usize) -> &[[f32; 3]] {
        &self.positions[..live]
    }

    /// Color array of the first `live` slots.
    pub fn colors(&self, live: usize) -> &[[f32; 3]] {
        &self.colors[..live]
    }

    /// Flag both upload arrays as changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = DirtyFlags {
            positions: true,
            colors: true,
        };
    }

    /// Current dirty state.
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Return and reset the dirty state. Called by the uploader.
    pub fn take_dirty(&mut self) -> DirtyFlags {
        std::mem::take(&mut self.dirty)
    }
}
