//! Placement of the portal group inside the parent scene.

use glam::{Affine3A, Quat, Vec3};

/// Local-to-world transform of the portal group.
///
/// Supplied by the scene graph every frame and only ever read here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupTransform {
    matrix: Affine3A,
}

impl GroupTransform {
    /// Group at `position`, rotated `yaw` radians about +Y.
    pub fn from_placement(position: Vec3, yaw: f32) -> Self {
        Self {
            matrix: Affine3A::from_rotation_translation(Quat::from_rotation_y(yaw), position),
        }
    }

    /// Wrap an arbitrary world matrix, e.g. one already composed with parents.
    pub fn from_matrix(matrix: Affine3A) -> Self {
        Self { matrix }
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &Affine3A {
        &self.matrix
    }

    /// Convert a local-space point to world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.matrix.transform_point3(local)
    }
}

impl Default for GroupTransform {
    fn default() -> Self {
        Self::from_matrix(Affine3A::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn half_turn_yaw_mirrors_x_and_z() {
        let t = GroupTransform::from_placement(Vec3::new(0.0, 5.0, 0.0), PI);
        let world = t.to_world(Vec3::new(1.0, -2.0, 3.0));
        assert!((world - Vec3::new(-1.0, 3.0, -3.0)).length() < 1e-5);
    }

    #[test]
    fn yaw_never_changes_height() {
        let t = GroupTransform::from_placement(Vec3::ZERO, 1.234);
        let world = t.to_world(Vec3::new(4.0, -7.5, 2.0));
        assert!((world.y + 7.5).abs() < 1e-6);
    }
}
