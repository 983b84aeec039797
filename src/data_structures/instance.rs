//! Local and world transforms of scene nodes.
//!
//! An [`Instance`] is a position, rotation and scale relative to a parent.
//! Multiplying `parent * local` yields the child's transform in the parent's
//! space, which is how the scene graph composes world transforms.

use std::ops::Mul;

use cgmath::{Deg, One, Rotation3};

/// Transformation of a node: position, rotation (as quaternion), and scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Create a new instance with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Transform placed at `position`, turned by `rotation` and scaled by `scale` in all axes.
    pub fn placed(
        position: cgmath::Vector3<f32>,
        rotation: cgmath::Quaternion<f32>,
        scale: f32,
    ) -> Self {
        Self {
            position,
            rotation,
            ..Self::uniform_scale(scale)
        }
    }

    /// Identity transform scaled by `scale` in all axes.
    pub fn uniform_scale(scale: f32) -> Self {
        Self {
            scale: cgmath::Vector3::new(scale, scale, scale),
            ..Self::new()
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Rotates around `axis` given in the node's own (local) frame.
    ///
    /// The rotation is applied after the current one, so repeated calls with
    /// the same axis accumulate regardless of how the total angle is split up.
    pub fn rotate_local(&mut self, axis: cgmath::Vector3<f32>, angle: Deg<f32>) {
        self.rotation = self.rotation * cgmath::Quaternion::from_axis_angle(axis, angle);
    }
}

impl Mul<Instance> for Instance {
    type Output = Self;

    fn mul(self, rhs: Instance) -> Self::Output {
        &self * &rhs
    }
}

impl<'a, 'b> Mul<&'b Instance> for &'a Instance {
    type Output = Instance;

    fn mul(self, rhs: &'b Instance) -> Self::Output {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = cgmath::Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Instance {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
        }
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}
