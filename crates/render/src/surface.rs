//! Draw parameters for the portal disc, its panoramic interior and the point ring.
//!
//! These are plain descriptors; the host renderer turns them into pipelines.

use std::f32::consts::PI;
use std::sync::Arc;

use portalfx_portal::Portal;

use crate::PanoramaTexture;

/// How fragments combine with what is already in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Standard alpha blending.
    Alpha,
    /// Source is added to the destination; overlapping points glow.
    Additive,
}

/// Which triangle faces are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSide {
    /// Front faces only.
    Front,
    /// Back faces only, for viewing a sphere from inside.
    Back,
    /// Both faces.
    Double,
}

/// Material for the particle point cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointsMaterial {
    /// Point size in world units.
    pub size: f32,
    /// Shrink points with distance.
    pub size_attenuation: bool,
    /// Global alpha.
    pub opacity: f32,
    /// Blend mode.
    pub blending: BlendMode,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            size: 0.1,
            size_attenuation: true,
            opacity: 0.9,
            blending: BlendMode::Additive,
        }
    }
}

/// Everything the host needs to draw one portal this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PortalSurface {
    /// Radius of the disc that masks the interior.
    pub disc_radius: f32,
    /// Segments around the disc.
    pub disc_segments: u32,
    /// Faces of the disc.
    pub disc_side: FaceSide,
    /// Radius of the enclosing sphere carrying the panorama.
    pub interior_radius: f32,
    /// Width and height segments of the sphere.
    pub interior_segments: (u32, u32),
    /// Faces of the sphere; the panorama is seen from inside.
    pub interior_side: FaceSide,
    /// Extra rotation of the sphere about +Y, radians.
    pub interior_yaw: f32,
    /// Panorama mapped onto the inside of the sphere; `None` draws it untextured.
    pub interior_texture: Option<Arc<PanoramaTexture>>,
    /// Opacity of both disc and interior.
    pub opacity: f32,
    /// Particle material.
    pub points: PointsMaterial,
}

impl PortalSurface {
    /// Describe `portal` as it should be drawn after the latest pass.
    pub fn for_portal(portal: &Portal) -> Self {
        let radius = portal.config().radius;
        Self {
            disc_radius: radius,
            disc_segments: 32,
            disc_side: FaceSide::Double,
            interior_radius: radius * 3.0,
            interior_segments: (32, 32),
            interior_side: FaceSide::Back,
            interior_yaw: PI,
            interior_texture: None,
            opacity: portal.opacity(),
            points: PointsMaterial::default(),
        }
    }

    /// Attach the decoded panorama to the interior sphere.
    pub fn with_panorama(mut self, texture: Option<Arc<PanoramaTexture>>) -> Self {
        self.interior_texture = texture;
        self
    }

    /// Whether the interior sphere samples a panorama.
    pub fn is_textured(&self) -> bool {
        self.interior_texture.is_some()
    }

    /// Whether the interior contributes anything this frame.
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}
