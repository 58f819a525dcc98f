//! Frame-level scenarios for the portal simulation.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use portalfx_core::Rgb;
use portalfx_portal::{GroupTransform, Portal, PortalConfig};

fn single_slot_portal(floor: f32) -> Portal {
    let mut portal = Portal::new(PortalConfig {
        max_particles: 1,
        spawn_batch: 1,
        position_jitter: 0.0,
        floor,
        seed: Some(2024),
        ..Default::default()
    })
    .expect("valid config");
    // First frame only spawns.
    portal.update(0.0);
    assert_eq!(portal.live_count(), 1);
    portal
}

fn pin_slot(portal: &mut Portal, position: Vec3, velocity: Vec3, age: f32, lifespan: f32) {
    let buffers = portal.pool_mut().buffers_mut();
    buffers.set_position(0, position);
    buffers.set_velocity(0, velocity);
    buffers.set_age(0, age);
    buffers.set_lifespan(0, lifespan);
}

#[test]
fn initial_fill_places_slots_on_slow_ring() {
    let mut portal = Portal::new(PortalConfig {
        max_particles: 2000,
        seed: Some(99),
        ..Default::default()
    })
    .expect("valid config");

    for frame in 0..4u32 {
        portal.update(0.016);
        let start = frame as usize * 500;
        let buffers = portal.pool().buffers();
        for i in start..start + 500 {
            let theta = i as f32 * (TAU / 15_000.0);
            let expected = Vec3::new(5.0 * theta.cos(), 5.0 * theta.sin(), 0.0);
            assert_eq!(buffers.position(i), expected, "slot {i} off the fill ring");
            assert_eq!(buffers.color(i), Rgb::YELLOW);
        }
    }
    assert_eq!(portal.live_count(), 2000);
}

#[test]
fn slot_reaching_lifespan_exactly_is_recycled_same_pass() {
    let mut portal = single_slot_portal(-1000.0);
    pin_slot(&mut portal, Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO, 0.0, 500.0);

    let stats = portal.update(0.5);

    assert_eq!(stats.recycled_age, 1);
    let buffers = portal.pool().buffers();
    assert_eq!(buffers.age(0), 0.0);
    assert!((20.0..820.0).contains(&buffers.lifespan(0)));
}

#[test]
fn slot_recycles_when_world_height_touches_floor() {
    let group = GroupTransform::from_placement(Vec3::new(0.0, 5.0, 0.0), PI);

    let mut portal = single_slot_portal(-10.0);
    pin_slot(
        &mut portal,
        Vec3::new(0.0, -14.5, 0.0),
        Vec3::new(0.0, -0.5, 0.0),
        0.0,
        1.0e9,
    );
    let stats = portal.update_with_transform(0.016, &group);
    assert_eq!(stats.recycled_floor, 1, "local y -15 is world y -10");
    let buffers = portal.pool().buffers();
    assert_eq!(buffers.age(0), 0.0);
    assert!((buffers.position(0).truncate().length() - 5.0).abs() < 1e-4);

    let mut portal = single_slot_portal(-10.0);
    pin_slot(
        &mut portal,
        Vec3::new(0.0, -14.5, 0.0),
        Vec3::new(0.0, -0.49, 0.0),
        0.0,
        1.0e9,
    );
    let stats = portal.update_with_transform(0.016, &group);
    assert_eq!(stats.recycled_floor, 0, "local y -14.99 stays above the floor");
    assert!((portal.pool().buffers().position(0).y + 14.99).abs() < 1e-4);
}

#[test]
fn color_follows_life_ratio_stops() {
    let mut portal = single_slot_portal(-1000.0);

    pin_slot(&mut portal, Vec3::X * 5.0, Vec3::ZERO, 0.0, 1000.0);
    portal.update(0.0);
    assert_eq!(portal.pool().buffers().color(0), Rgb::YELLOW);

    pin_slot(&mut portal, Vec3::X * 5.0, Vec3::ZERO, 0.0, 1000.0);
    portal.update(0.5);
    assert_eq!(portal.pool().buffers().color(0), Rgb::ORANGE);

    pin_slot(&mut portal, Vec3::X * 5.0, Vec3::ZERO, 0.0, 1000.0);
    let stats = portal.update(1.0);
    assert_eq!(stats.recycled_age, 1);
    let end = portal.pool().buffers().color(0);
    assert!((end.r - 1.0).abs() < 1e-6 && end.g.abs() < 1e-6 && end.b.abs() < 1e-6);
}

#[test]
fn dying_slot_keeps_overshoot_color_for_its_last_upload() {
    let mut portal = single_slot_portal(-1000.0);
    pin_slot(&mut portal, Vec3::X * 5.0, Vec3::ZERO, 0.0, 100.0);

    let stats = portal.update(0.15);

    assert_eq!(stats.recycled_age, 1);
    let color = portal.pool().buffers().color(0);
    assert!(color.g < 0.0, "ratio 1.5 extrapolates past red, got {color:?}");
}

#[test]
fn portal_opens_when_pool_fills_and_stays_open() {
    let mut portal = Portal::new(PortalConfig {
        max_particles: 1500,
        floor: -5.0,
        seed: Some(5),
        ..Default::default()
    })
    .expect("valid config");

    let opacities: Vec<f32> = (0..10).map(|_| portal.update(1.0 / 60.0).opacity).collect();
    assert_eq!(&opacities[..3], &[0.0, 0.0, 1.0]);
    assert!(opacities[3..].iter().all(|&o| o == 1.0));
    assert_eq!(portal.live_count(), 1500);
}

#[test]
fn fade_enhancement_ramps_after_capacity() {
    let mut portal = Portal::new(PortalConfig {
        max_particles: 500,
        reveal_fade_ms: Some(100.0),
        seed: Some(5),
        ..Default::default()
    })
    .expect("valid config");

    let first = portal.update(0.05).opacity;
    let second = portal.update(0.05).opacity;
    let third = portal.update(0.05).opacity;
    assert!((first - 0.5).abs() < 1e-5);
    assert!((second - 1.0).abs() < 1e-5);
    assert_eq!(third, 1.0);
}
