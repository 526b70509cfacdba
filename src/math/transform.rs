use crate::math::{Matrix2, Vector2};

/// Represents a rigid transformation in 2D space (position and rotation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 2D space
    pub position: Vector2,

    /// Rotation as a 2x2 rotation matrix
    pub rotation: Matrix2,
}

impl Transform {
    /// Creates a new transform with the given position and rotation matrix
    #[inline]
    pub fn new(position: Vector2, rotation: Matrix2) -> Self {
        Self { position, rotation }
    }

    /// Creates a new identity transform
    #[inline]
    pub fn identity() -> Self {
        Self::new(Vector2::zero(), Matrix2::identity())
    }

    /// Creates a transform from a position and a rotation angle in radians
    #[inline]
    pub fn from_pose(position: Vector2, angle: f32) -> Self {
        Self::new(position, Matrix2::from_angle(angle))
    }

    /// Transforms a point from local space to world space
    #[inline]
    pub fn transform_point(&self, point: Vector2) -> Vector2 {
        self.position + self.rotation * point
    }

    /// Transforms a point from world space to local space
    #[inline]
    pub fn inverse_transform_point(&self, point: Vector2) -> Vector2 {
        self.rotation.transpose() * (point - self.position)
    }

    /// Returns the inverse transform
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.transpose();
        Self::new(-(rotation * self.position), rotation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
