//! Per-frame particle integration.

use portalfx_core::{FrameTick, Rgb};
use serde::Serialize;

use crate::config::{GravityMode, PortalConfig};
use crate::pool::{symmetric_noise, ParticlePool};
use crate::reveal::PortalReveal;
use crate::transform::GroupTransform;

/// Three-stop color ramp over a particle's life ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifeGradient {
    /// Color at ratio 0.
    pub initial: Rgb,
    /// Color at ratio 0.5.
    pub mid: Rgb,
    /// Color at ratio 1.
    pub end: Rgb,
}

impl LifeGradient {
    /// Sample the ramp. Ratios outside `[0, 1]` extrapolate the nearest segment.
    pub fn sample(&self, ratio: f32) -> Rgb {
        if ratio < 0.5 {
            self.initial.lerp(self.mid, ratio * 2.0)
        } else {
            self.mid.lerp(self.end, (ratio - 0.5) * 2.0)
        }
    }

    /// Sample directly into an upload slot.
    pub fn write(&self, ratio: f32, out: &mut [f32; 3]) {
        *out = self.sample(ratio).to_array();
    }
}

/// What happened during one integration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameStats {
    /// Frame index, starting at 0.
    pub tick: FrameTick,
    /// Live slots after the pass.
    pub live_count: u32,
    /// Slots activated this pass.
    pub spawned: u32,
    /// Slots advanced this pass.
    pub advanced: u32,
    /// Slots recycled because they crossed the floor.
    pub recycled_floor: u32,
    /// Slots recycled because they outlived their lifespan.
    pub recycled_age: u32,
    /// Portal opacity after the pass.
    pub opacity: f32,
}

/// Advances all live slots once per rendered frame.
#[derive(Debug, Clone)]
pub struct FrameIntegrator {
    spawn_batch: u32,
    position_jitter: f32,
    gravity: f32,
    gravity_mode: GravityMode,
    gradient: LifeGradient,
}

impl FrameIntegrator {
    /// Copy integration parameters out of a validated config.
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            spawn_batch: config.spawn_batch,
            position_jitter: config.position_jitter,
            gravity: config.gravity,
            gravity_mode: config.gravity_mode,
            gradient: LifeGradient {
                initial: config.initial_color,
                mid: config.mid_color,
                end: config.final_color,
            },
        }
    }

    /// Color ramp used for every slot.
    pub fn gradient(&self) -> &LifeGradient {
        &self.gradient
    }

    /// Run one pass.
    ///
    /// Slots spawned during this call are first advanced on the next call, so
    /// each one is uploaded once at its exact ring position.
    ///
    /// A negative or non-finite `delta` is treated as zero.
    pub fn step(
        &self,
        pool: &mut ParticlePool,
        reveal: &mut PortalReveal,
        delta: f32,
        transform: &GroupTransform,
    ) -> FrameStats {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        let advance_count = pool.live_count() as usize;

        let mut stats = FrameStats::default();
        if !pool.is_full() {
            let outcome = pool.spawn(self.spawn_batch);
            stats.spawned = outcome.spawned;
            if let Some(event) = outcome.event {
                reveal.handle(event);
            }
        }

        let floor = reveal.floor();
        let age_step = delta * 1000.0;
        let gravity_step = self.gravity_mode.decrement(self.gravity, delta);

        for idx in 0..advance_count {
            let (buffers, rng) = pool.split_mut();

            let age = buffers.age(idx) + age_step;
            buffers.set_age(idx, age);

            let mut velocity = buffers.velocity(idx);
            let mut position = buffers.position(idx) + velocity;
            position.x += symmetric_noise(rng, self.position_jitter);
            position.y += symmetric_noise(rng, self.position_jitter);
            position.z += symmetric_noise(rng, self.position_jitter);
            buffers.set_position(idx, position);

            velocity.y -= gravity_step;
            buffers.set_velocity(idx, velocity);

            // Unclamped on purpose: a dying slot shows the overshoot color for one upload.
            let lifespan = buffers.lifespan(idx);
            self.gradient.write(age / lifespan, buffers.color_slot_mut(idx));

            let world = transform.to_world(position);
            if world.y <= floor {
                stats.recycled_floor += 1;
                pool.recycle(idx);
            } else if age >= lifespan {
                stats.recycled_age += 1;
                pool.recycle(idx);
            }
        }

        pool.buffers_mut().mark_dirty();
        reveal.advance(delta);

        stats.advanced = advance_count as u32;
        stats.live_count = pool.live_count();
        stats.opacity = reveal.opacity();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn quiet_config(max_particles: u32) -> PortalConfig {
        PortalConfig {
            max_particles,
            spawn_batch: max_particles,
            position_jitter: 0.0,
            floor: -1000.0,
            seed: Some(11),
            ..Default::default()
        }
    }

    fn setup(config: &PortalConfig) -> (FrameIntegrator, ParticlePool, PortalReveal) {
        (
            FrameIntegrator::new(config),
            ParticlePool::new(config, 0),
            PortalReveal::new(config.floor, config.reveal_fade_ms),
        )
    }

    #[test]
    fn gradient_hits_each_stop() {
        let gradient = LifeGradient {
            initial: Rgb::YELLOW,
            mid: Rgb::ORANGE,
            end: Rgb::RED,
        };
        assert_eq!(gradient.sample(0.0), Rgb::YELLOW);
        assert_eq!(gradient.sample(0.5), Rgb::ORANGE);
        let end = gradient.sample(1.0);
        assert!((end.r - 1.0).abs() < 1e-6 && end.g.abs() < 1e-6 && end.b.abs() < 1e-6);
    }

    #[test]
    fn gradient_overshoots_past_end() {
        let gradient = LifeGradient {
            initial: Rgb::YELLOW,
            mid: Rgb::ORANGE,
            end: Rgb::RED,
        };
        assert!(gradient.sample(1.2).g < 0.0);
    }

    #[test]
    fn fresh_spawns_wait_one_frame() {
        let config = quiet_config(4);
        let (integrator, mut pool, mut reveal) = setup(&config);
        let stats = integrator.step(&mut pool, &mut reveal, 0.016, &GroupTransform::default());
        assert_eq!(stats.spawned, 4);
        assert_eq!(stats.advanced, 0);
        assert_eq!(pool.buffers().age(0), 0.0);

        let stats = integrator.step(&mut pool, &mut reveal, 0.016, &GroupTransform::default());
        assert_eq!(stats.spawned, 0);
        assert_eq!(stats.advanced, 4);
        assert!((pool.buffers().age(0) - 16.0).abs() < 1e-3);
    }

    #[test]
    fn gravity_is_a_fixed_decrement_per_tick() {
        let config = quiet_config(1);
        let (integrator, mut pool, mut reveal) = setup(&config);
        integrator.step(&mut pool, &mut reveal, 0.016, &GroupTransform::default());
        pool.buffers_mut().set_lifespan(0, 1.0e9);
        let before = pool.buffers().velocity(0);

        integrator.step(&mut pool, &mut reveal, 0.5, &GroupTransform::default());
        let after = pool.buffers().velocity(0);
        assert!((before.y - after.y - 0.004).abs() < 1e-6);
        assert_eq!(before.x, after.x);
    }

    #[test]
    fn delta_scaled_gravity_follows_frame_time() {
        let config = PortalConfig {
            gravity_mode: GravityMode::DeltaScaled { reference_hz: 60.0 },
            ..quiet_config(1)
        };
        let (integrator, mut pool, mut reveal) = setup(&config);
        integrator.step(&mut pool, &mut reveal, 0.0, &GroupTransform::default());
        pool.buffers_mut().set_lifespan(0, 1.0e9);
        let before = pool.buffers().velocity(0).y;
        integrator.step(&mut pool, &mut reveal, 0.5, &GroupTransform::default());
        let after = pool.buffers().velocity(0).y;
        assert!((before - after - 0.004 * 30.0).abs() < 1e-5);
    }

    #[test]
    fn position_moves_by_previous_velocity() {
        let config = quiet_config(1);
        let (integrator, mut pool, mut reveal) = setup(&config);
        integrator.step(&mut pool, &mut reveal, 0.0, &GroupTransform::default());
        pool.buffers_mut().set_lifespan(0, 1.0e9);
        pool.buffers_mut().set_position(0, Vec3::new(1.0, 2.0, 3.0));
        pool.buffers_mut().set_velocity(0, Vec3::new(0.5, 0.25, -0.5));

        integrator.step(&mut pool, &mut reveal, 0.0, &GroupTransform::default());
        assert_eq!(pool.buffers().position(0), Vec3::new(1.5, 2.25, 2.5));
    }

    #[test]
    fn pass_marks_buffers_dirty() {
        let config = quiet_config(2);
        let (integrator, mut pool, mut reveal) = setup(&config);
        assert!(!pool.buffers().dirty().any());
        integrator.step(&mut pool, &mut reveal, 0.016, &GroupTransform::default());
        assert!(pool.buffers().dirty().positions);
        assert!(pool.buffers().dirty().colors);
    }

    #[test]
    fn filling_the_pool_opens_the_reveal() {
        let config = PortalConfig {
            spawn_batch: 3,
            ..quiet_config(7)
        };
        let (integrator, mut pool, mut reveal) = setup(&config);
        let opacities: Vec<f32> = (0..4)
            .map(|_| integrator.step(&mut pool, &mut reveal, 0.016, &GroupTransform::default()).opacity)
            .collect();
        assert_eq!(opacities, vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn bad_frame_times_never_age_backwards() {
        let config = quiet_config(1);
        let (integrator, mut pool, mut reveal) = setup(&config);
        let transform = GroupTransform::default();
        integrator.step(&mut pool, &mut reveal, 0.016, &transform);
        integrator.step(&mut pool, &mut reveal, 0.016, &transform);
        let aged = pool.buffers().age(0);
        assert!(aged > 0.0);

        integrator.step(&mut pool, &mut reveal, -0.5, &transform);
        assert_eq!(pool.buffers().age(0), aged);

        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            integrator.step(&mut pool, &mut reveal, bad, &transform);
            let age = pool.buffers().age(0);
            assert!(age.is_finite() && age >= 0.0, "{bad} left age at {age}");
        }

        pool.buffers_mut().set_lifespan(0, 100.0);
        let recycled: u32 = (0..10)
            .map(|_| integrator.step(&mut pool, &mut reveal, 0.016, &transform).recycled_age)
            .sum();
        assert!(recycled >= 1, "slot never reached its lifespan");
    }

    #[test]
    fn position_jitter_stays_within_half_width() {
        let config = PortalConfig {
            position_jitter: 0.005,
            ..quiet_config(1)
        };
        let (integrator, mut pool, mut reveal) = setup(&config);
        let transform = GroupTransform::default();
        integrator.step(&mut pool, &mut reveal, 0.0, &transform);
        pool.buffers_mut().set_lifespan(0, 1.0e9);

        let mut moved = false;
        for _ in 0..200 {
            pool.buffers_mut().set_velocity(0, Vec3::ZERO);
            let before = pool.buffers().position(0);
            integrator.step(&mut pool, &mut reveal, 0.0, &transform);
            let step = pool.buffers().position(0) - before;
            assert!(step.abs().max_element() <= 0.005 + 1e-6, "jitter {step:?}");
            moved |= step != Vec3::ZERO;
        }
        assert!(moved);
    }
}
