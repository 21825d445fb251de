//! Coordinate conversion between the description and engine conventions
//!
//! Descriptions are right-handed and Z-up with roll-pitch-yaw Euler angles.
//! The engine side is right-handed and Y-up. Every position, orientation and
//! joint axis crosses between the two through the functions in this module;
//! nothing else in the crate permutes axes or composes rotations on its own.

use glam::{Quat, Vec3};

/// Position and roll-pitch-yaw orientation in description convention
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    /// Euler angles (roll, pitch, yaw) in radians
    pub rpy: Vec3,
}

impl Pose {
    pub fn new(position: Vec3, rpy: Vec3) -> Self {
        Self { position, rpy }
    }

    /// Convert the whole pose into an engine-space transform
    pub fn to_target(&self) -> Transform {
        Transform::new(convert_position(self.position), convert_rotation(self.rpy))
    }
}

/// Rigid transform in engine convention
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Compose `self * child`: express `child` (given relative to `self`) in the parent space
    pub fn compose(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.translation + self.rotation * child.translation,
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }

    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.inverse();
        Transform {
            translation: rotation * -self.translation,
            rotation,
        }
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * point
    }

    pub fn abs_diff_eq(&self, other: &Transform, max_abs_diff: f32) -> bool {
        self.translation.abs_diff_eq(other.translation, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}

/// Map a description-space vector to engine space: `(x, y, z) -> (y, z, x)`
pub fn convert_position(p: Vec3) -> Vec3 {
    Vec3::new(p.y, p.z, p.x)
}

/// Convert roll-pitch-yaw angles to an engine-space rotation.
///
/// Three elemental rotations are composed intrinsically, each one applied in
/// the frame left by the previous one:
///
/// 1. about engine `+Y` by the yaw (`rpy.z`),
/// 2. about engine `-X` by the pitch (`rpy.y`),
/// 3. about engine `-Z` by the roll (`rpy.x`).
///
/// Intrinsic composition makes the result `Ry(yaw) * R-x(pitch) * R-z(roll)`.
/// Both the order and the negated axes match how the engine-side meshes were
/// exported; changing either skews every transform built from a description.
/// The product is intrinsic on purpose: pre-multiplying each step instead
/// (the extrinsic `R-z * R-x * Ry`) gives different poses for combined angles.
pub fn convert_rotation(rpy: Vec3) -> Quat {
    let yaw = Quat::from_axis_angle(Vec3::Y, rpy.z);
    let pitch = Quat::from_axis_angle(Vec3::NEG_X, rpy.y);
    let roll = Quat::from_axis_angle(Vec3::NEG_Z, rpy.x);
    (yaw * pitch * roll).normalize()
}

/// Permute a description-space axis into engine space and normalize it.
///
/// A zero vector stays zero.
pub fn convert_axis(axis: Vec3) -> Vec3 {
    normalize_axis(convert_position(axis))
}

/// Normalize an axis that is already in engine space; zero stays zero
pub fn normalize_axis(axis: Vec3) -> Vec3 {
    axis.normalize_or_zero()
}
