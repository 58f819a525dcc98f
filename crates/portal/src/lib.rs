#![warn(missing_docs)]
//! Particle-ringed portal simulation.
//!
//! A [`Portal`] owns a fixed-capacity [`ParticlePool`], the [`PortalReveal`]
//! that fades the panorama in once the pool is full, and the
//! [`FrameIntegrator`] that advances everything once per rendered frame.
//! Rendering itself happens elsewhere; callers read the position/color
//! arrays and the opacity after each [`Portal::update`].

mod buffers;
mod config;
mod integrator;
mod pool;
mod reveal;
mod transform;

use std::path::Path;

use glam::Vec3;
use portalfx_core::FrameTick;

pub use buffers::{DirtyFlags, ParticleBuffers};
pub use config::{
    ConfigError, GravityMode, LifespanRange, PortalConfig, VelocityJitter, MAX_PARTICLE_CAPACITY,
};
pub use integrator::{FrameIntegrator, FrameStats, LifeGradient};
pub use pool::{ParticlePool, PoolEvent, SpawnOutcome};
pub use reveal::PortalReveal;
pub use transform::GroupTransform;

/// One portal instance: pool, reveal and integrator with a shared lifetime.
#[derive(Debug)]
pub struct Portal {
    config: PortalConfig,
    pool: ParticlePool,
    reveal: PortalReveal,
    integrator: FrameIntegrator,
    placement: GroupTransform,
    tick: FrameTick,
}

impl Portal {
    /// Validate `config` and build an empty portal.
    pub fn new(config: PortalConfig) -> Result<Self, ConfigError> {
        Self::with_instance(config, 0)
    }

    /// Like [`Portal::new`], mixing `instance` into the RNG seed so several
    /// portals built from one config do not emit identical streams.
    pub fn with_instance(config: PortalConfig, instance: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let placement =
            GroupTransform::from_placement(Vec3::from_array(config.position), config.yaw);
        let portal = Self {
            pool: ParticlePool::new(&config, instance),
            reveal: PortalReveal::new(config.floor, config.reveal_fade_ms),
            integrator: FrameIntegrator::new(&config),
            placement,
            tick: FrameTick::ZERO,
            config,
        };
        tracing::info!(
            max_particles = portal.config.max_particles,
            radius = portal.config.radius,
            floor = portal.config.floor,
            seeded = portal.config.seed.is_some(),
            "portal created"
        );
        Ok(portal)
    }

    /// Advance one frame using the placement from the config.
    pub fn update(&mut self, delta: f32) -> FrameStats {
        let placement = self.placement;
        self.update_with_transform(delta, &placement)
    }

    /// Advance one frame with the group's current world transform.
    pub fn update_with_transform(&mut self, delta: f32, transform: &GroupTransform) -> FrameStats {
        let mut stats = self
            .integrator
            .step(&mut self.pool, &mut self.reveal, delta, transform);
        stats.tick = self.tick;
        self.tick = self.tick.advance(1);
        stats
    }

    /// Surface opacity in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        self.reveal.opacity()
    }

    /// World-space floor height.
    pub fn floor(&self) -> f32 {
        self.reveal.floor()
    }

    /// Live slot count.
    pub fn live_count(&self) -> u32 {
        self.pool.live_count()
    }

    /// Frames integrated so far.
    pub fn tick(&self) -> FrameTick {
        self.tick
    }

    /// Placement derived from the config's position and yaw.
    pub fn placement(&self) -> &GroupTransform {
        &self.placement
    }

    /// Panorama path the surface should show, if any.
    pub fn texture(&self) -> Option<&Path> {
        self.config.texture.as_deref()
    }

    /// The validated construction parameters.
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Particle pool.
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Mutable particle pool.
    pub fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    /// Reveal state.
    pub fn reveal(&self) -> &PortalReveal {
        &self.reveal
    }

    /// Color ramp applied to every slot.
    pub fn gradient(&self) -> &LifeGradient {
        self.integrator.gradient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_fails_fast() {
        let err = Portal::new(PortalConfig {
            max_particles: 0,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfiguration { .. }));
    }

    #[test]
    fn ticks_count_updates() {
        let mut portal = Portal::new(PortalConfig {
            max_particles: 10,
            seed: Some(1),
            ..Default::default()
        })
        .expect("valid");
        let first = portal.update(0.016);
        let second = portal.update(0.016);
        assert_eq!(first.tick, FrameTick(0));
        assert_eq!(second.tick, FrameTick(1));
        assert_eq!(portal.tick(), FrameTick(2));
    }

    #[test]
    fn default_placement_lifts_and_turns_the_group() {
        let portal = Portal::new(PortalConfig {
            seed: Some(1),
            max_particles: 1,
            ..Default::default()
        })
        .expect("valid");
        let world = portal.placement().to_world(Vec3::new(5.0, 0.0, 0.0));
        assert!((world - Vec3::new(-5.0, 10.0, 0.0)).length() < 1e-5);
    }
}
