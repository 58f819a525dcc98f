//! Opacity of the portal surface, gated on the pool filling up.

use crate::pool::PoolEvent;

/// Tracks whether the portal has opened and how far its fade has progressed.
///
/// Opacity is monotonic: once the pool has been full, it never drops back.
#[derive(Debug, Clone)]
pub struct PortalReveal {
    floor: f32,
    opened: bool,
    fade_ms: Option<f32>,
    elapsed_ms: f32,
}

impl PortalReveal {
    /// Closed portal with the given floor plane and optional fade duration.
    pub fn new(floor: f32, fade_ms: Option<f32>) -> Self {
        Self {
            floor,
            opened: false,
            fade_ms,
            elapsed_ms: 0.0,
        }
    }

    /// World-space y threshold used by the particle death test.
    pub fn floor(&self) -> f32 {
        self.floor
    }

    /// Whether the pool has ever reached capacity.
    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Consume a pool event.
    pub fn handle(&mut self, event: PoolEvent) {
        match event {
            PoolEvent::CapacityReached => self.open(),
        }
    }

    /// Open the portal. Repeated calls are no-ops.
    pub fn open(&mut self) {
        self.opened = true;
    }

    /// Advance the fade clock. Only meaningful once open.
    pub fn advance(&mut self, delta_seconds: f32) {
        if self.opened {
            self.elapsed_ms += delta_seconds.max(0.0) * 1000.0;
        }
    }

    /// Current surface opacity in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        if !self.opened {
            return 0.0;
        }
        match self.fade_ms {
            Some(fade) if fade > 0.0 => (self.elapsed_ms / fade).clamp(0.0, 1.0),
            _ => 1.0,
        }
    }
}
