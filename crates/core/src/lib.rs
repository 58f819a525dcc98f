#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod color;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

pub use color::{ColorParseError, Rgb};

/// Monotonic frame counter advanced once per integration pass.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FrameTick(pub u64);

impl FrameTick {
    /// First frame of any portal instance.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` frames.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Derive a reproducible RNG for one portal instance.
///
/// `None` seeds from OS entropy, which is what interactive runs want; tests and
/// replays always pass an explicit seed.
pub fn instance_rng(seed: Option<u64>, instance: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ instance.rotate_left(32)),
        None => StdRng::from_entropy(),
    }
}
