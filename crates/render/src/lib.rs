#![warn(missing_docs)]
//! Renderer-facing side of the portal: upload staging, panorama loading and
//! draw descriptors. No GPU calls happen here.

mod panorama;
mod particles;
mod surface;

pub use panorama::{load_or_untextured, PanoramaError, PanoramaTexture};
pub use particles::{ParticleBatch, ParticleVertex, UploadQueue, UploadView};
pub use surface::{BlendMode, FaceSide, PointsMaterial, PortalSurface};
