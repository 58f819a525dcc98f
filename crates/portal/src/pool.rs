//! Fixed-capacity particle pool: spawn on the fill ring, recycle in place.

use std::f32::consts::TAU;

use glam::Vec3;
use portalfx_core::{instance_rng, Rgb};
use rand::{rngs::StdRng, Rng};
use tracing::info;

use crate::buffers::ParticleBuffers;
use crate::config::{LifespanRange, PortalConfig, VelocityJitter};

/// Signals emitted by the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolEvent {
    /// The pool filled up. Emitted exactly once per pool.
    CapacityReached,
}

/// Result of one [`ParticlePool::spawn`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnOutcome {
    /// Slots activated by this call.
    pub spawned: u32,
    /// Event raised by this call, if any.
    pub event: Option<PoolEvent>,
}

/// Shape parameters copied out of [`PortalConfig`].
#[derive(Debug, Clone)]
struct EmissionParams {
    radius: f32,
    ring_step: f32,
    tangential_speed: f32,
    spawn_jitter: VelocityJitter,
    recycle_jitter: VelocityJitter,
    spawn_lifespan: LifespanRange,
    recycle_lifespan: LifespanRange,
    initial_color: Rgb,
}

/// Owns every particle slot and the random stream used to (re)spawn them.
#[derive(Debug)]
pub struct ParticlePool {
    buffers: ParticleBuffers,
    live_count: u32,
    max_particles: u32,
    params: EmissionParams,
    rng: StdRng,
    capacity_signaled: bool,
}

impl ParticlePool {
    /// Build an empty pool. `config` must already be validated.
    pub fn new(config: &PortalConfig, instance: u64) -> Self {
        let params = EmissionParams {
            radius: config.radius,
            ring_step: TAU / config.spawn_ring_divisions as f32,
            tangential_speed: config.tangential_speed,
            spawn_jitter: config.spawn_jitter,
            recycle_jitter: config.recycle_jitter,
            spawn_lifespan: config.spawn_lifespan_ms,
            recycle_lifespan: config.recycle_lifespan_ms,
            initial_color: config.initial_color,
        };
        Self {
            buffers: ParticleBuffers::with_capacity(config.max_particles as usize),
            live_count: 0,
            max_particles: config.max_particles,
            params,
            rng: instance_rng(config.seed, instance),
            capacity_signaled: false,
        }
    }

    /// Slots activated so far.
    pub fn live_count(&self) -> u32 {
        self.live_count
    }

    /// Pool capacity.
    pub fn max_particles(&self) -> u32 {
        self.max_particles
    }

    /// Whether every slot has been activated.
    pub fn is_full(&self) -> bool {
        self.live_count >= self.max_particles
    }

    /// Read-only slot storage.
    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    /// Mutable slot storage.
    pub fn buffers_mut(&mut self) -> &mut ParticleBuffers {
        &mut self.buffers
    }

    /// Mutable storage plus the pool RNG, for the integrator's noise draws.
    pub(crate) fn split_mut(&mut self) -> (&mut ParticleBuffers, &mut StdRng) {
        (&mut self.buffers, &mut self.rng)
    }

    /// Activate up to `batch` new slots on the fill ring.
    ///
    /// Never pushes `live_count` past capacity. The call that fills the last
    /// slot reports [`PoolEvent::CapacityReached`].
    pub fn spawn(&mut self, batch: u32) -> SpawnOutcome {
        let start = self.live_count;
        let end = start.saturating_add(batch).min(self.max_particles);
        for i in start..end {
            self.spawn_slot(i as usize);
        }
        self.live_count = end;

        let event = if self.is_full() && !self.capacity_signaled {
            self.capacity_signaled = true;
            info!(capacity = self.max_particles, "particle pool reached capacity");
            Some(PoolEvent::CapacityReached)
        } else {
            None
        };

        SpawnOutcome {
            spawned: end - start,
            event,
        }
    }

    fn spawn_slot(&mut self, idx: usize) {
        let theta = idx as f32 * self.params.ring_step;
        let position = Vec3::new(
            self.params.radius * theta.cos(),
            self.params.radius * theta.sin(),
            0.0,
        );
        let velocity = tangential_velocity(
            &mut self.rng,
            position,
            self.params.tangential_speed,
            self.params.spawn_jitter,
        );
        let lifespan = self.rng.gen_range(self.params.spawn_lifespan.as_range());

        self.buffers.set_position(idx, position);
        self.buffers.set_velocity(idx, velocity);
        self.buffers.set_age(idx, 0.0);
        self.buffers.set_lifespan(idx, lifespan);
        self.buffers.set_color(idx, self.params.initial_color);
    }

    /// Respawn a live slot at a random point on the ring with a short lifespan.
    ///
    /// The slot's color is left as-is; the next integration pass recomputes it.
    pub fn recycle(&mut self, idx: usize) {
        debug_assert!(idx < self.live_count as usize, "recycling inert slot {idx}");
        let theta = self.rng.gen::<f32>() * TAU;
        let position = Vec3::new(
            self.params.radius * theta.cos(),
            self.params.radius * theta.sin(),
            0.0,
        );
        let velocity = tangential_velocity(
            &mut self.rng,
            position,
            self.params.tangential_speed,
            self.params.recycle_jitter,
        );
        let lifespan = self.rng.gen_range(self.params.recycle_lifespan.as_range());

        self.buffers.set_position(idx, position);
        self.buffers.set_velocity(idx, velocity);
        self.buffers.set_age(idx, 0.0);
        self.buffers.set_lifespan(idx, lifespan);
    }
}

/// Velocity along the ring tangent `(-y, x) * speed` plus uniform noise.
fn tangential_velocity(
    rng: &mut StdRng,
    position: Vec3,
    speed: f32,
    jitter: VelocityJitter,
) -> Vec3 {
    Vec3::new(
        -position.y * speed + symmetric_noise(rng, jitter.xy),
        position.x * speed + symmetric_noise(rng, jitter.xy),
        symmetric_noise(rng, jitter.z),
    )
}

/// Uniform sample in `[-half_width, half_width)`.
pub(crate) fn symmetric_noise(rng: &mut StdRng, half_width: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * 2.0 * half_width
}
