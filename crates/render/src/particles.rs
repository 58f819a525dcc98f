//! Upload staging for the portal's particle ring.

use portalfx_portal::{DirtyFlags, Portal};

/// GPU vertex for a single particle point.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleVertex {
    /// Group-local position.
    pub position: [f32; 3],
    /// RGB tint.
    pub color: [f32; 3],
}

/// Read-only view of the arrays the renderer uploads after a pass.
#[derive(Debug, Clone, Copy)]
pub struct UploadView<'a> {
    /// `live_count * 3` floats, group-local.
    pub positions: &'a [f32],
    /// `live_count * 3` floats, RGB.
    pub colors: &'a [f32],
    /// Opacity of the portal surface.
    pub opacity: f32,
}

impl<'a> UploadView<'a> {
    /// Borrow the live portion of `portal`'s buffers.
    pub fn of(portal: &'a Portal) -> Self {
        let live = portal.live_count() as usize;
        let buffers = portal.pool().buffers();
        Self {
            positions: bytemuck::cast_slice(buffers.positions(live)),
            colors: bytemuck::cast_slice(buffers.colors(live)),
            opacity: portal.opacity(),
        }
    }

    /// Number of points in the view.
    pub fn point_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Interleaved vertices built from an [`UploadView`].
#[derive(Debug, Default)]
pub struct ParticleBatch {
    /// Vertex data ready for a vertex buffer.
    pub vertices: Vec<ParticleVertex>,
}

impl ParticleBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refill from `view`, reusing the existing allocation.
    pub fn fill(&mut self, view: &UploadView<'_>) {
        self.vertices.clear();
        self.vertices.extend(
            view.positions
                .chunks_exact(3)
                .zip(view.colors.chunks_exact(3))
                .map(|(p, c)| ParticleVertex {
                    position: [p[0], p[1], p[2]],
                    color: [c[0], c[1], c[2]],
                }),
        );
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Tracks dirty state across frames so unchanged buffers are not re-sent.
#[derive(Debug, Default)]
pub struct UploadQueue {
    batch: ParticleBatch,
    uploads: u64,
}

impl UploadQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the portal's dirty flags and restage vertices if anything changed.
    ///
    /// Returns `None` when the last pass left the buffers untouched.
    pub fn stage(&mut self, portal: &mut Portal) -> Option<(&ParticleBatch, DirtyFlags)> {
        let dirty = portal.pool_mut().buffers_mut().take_dirty();
        if !dirty.any() {
            return None;
        }
        self.batch.fill(&UploadView::of(portal));
        self.uploads += 1;
        Some((&self.batch, dirty))
    }

    /// Batches staged so far.
    pub fn uploads(&self) -> u64 {
        self.uploads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portalfx_portal::PortalConfig;

    fn portal(max_particles: u32) -> Portal {
        Portal::new(PortalConfig {
            max_particles,
            seed: Some(3),
            ..Default::default()
        })
        .expect("valid config")
    }

    #[test]
    fn view_covers_live_slots_only() {
        let mut portal = portal(800);
        portal.update(0.016);
        let view = UploadView::of(&portal);
        assert_eq!(view.point_count(), 500);
        assert_eq!(view.positions.len(), 1500);
        assert_eq!(view.colors.len(), 1500);
        assert_eq!(view.opacity, 0.0);
    }

    #[test]
    fn queue_skips_clean_frames() {
        let mut portal = portal(100);
        let mut queue = UploadQueue::new();
        assert!(queue.stage(&mut portal).is_none());

        portal.update(0.016);
        let (batch, dirty) = queue.stage(&mut portal).expect("dirty after update");
        assert!(dirty.positions && dirty.colors);
        assert_eq!(batch.vertices.len(), 100);
        assert_eq!(
            batch.as_bytes().len(),
            100 * std::mem::size_of::<ParticleVertex>()
        );

        assert!(queue.stage(&mut portal).is_none());
        assert_eq!(queue.uploads(), 1);
    }

    #[test]
    fn batch_interleaves_position_and_color() {
        let mut portal = portal(4);
        portal.update(0.016);
        let view = UploadView::of(&portal);
        let mut batch = ParticleBatch::new();
        batch.fill(&view);
        assert_eq!(
            batch.vertices[1].position,
            [view.positions[3], view.positions[4], view.positions[5]]
        );
        assert_eq!(batch.vertices[1].color, [1.0, 1.0, 0.0]);
    }
}
