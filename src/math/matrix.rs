use nalgebra as na;
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::Result;
use std::ops::{Add, Mul};
use std::fmt;

/// A 2x2 matrix stored as two columns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix2 {
    pub col1: Vector2,
    pub col2: Vector2,
}

// === Matrix2 Implementation ===

impl Matrix2 {
    /// Creates a new 2x2 matrix from its columns
    #[inline]
    pub const fn new(col1: Vector2, col2: Vector2) -> Self {
        Self { col1, col2 }
    }

    /// Creates a new 2x2 identity matrix
    #[inline]
    pub const fn identity() -> Self {
        Self::new(Vector2::unit_x(), Vector2::unit_y())
    }

    /// Creates a new 2x2 zero matrix
    #[inline]
    pub const fn zero() -> Self {
        Self::new(Vector2::zero(), Vector2::zero())
    }

    /// Creates a diagonal matrix
    #[inline]
    pub const fn from_diagonal(a: f32, d: f32) -> Self {
        Self::new(Vector2::new(a, 0.0), Vector2::new(0.0, d))
    }

    /// Creates the rotation matrix for a counter-clockwise angle in radians
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(Vector2::new(c, s), Vector2::new(-s, c))
    }

    /// Returns the determinant of the matrix
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.col1.x * self.col2.y - self.col2.x * self.col1.y
    }

    /// Returns the transpose of the matrix
    #[inline]
    pub fn transpose(&self) -> Self {
        Self::new(
            Vector2::new(self.col1.x, self.col2.x),
            Vector2::new(self.col1.y, self.col2.y),
        )
    }

    /// Returns the inverse of the matrix.
    ///
    /// Fails with [`PhysicsError::SingularMatrix`] when the determinant is
    /// exactly zero.
    pub fn inverse(&self) -> Result<Self> {
        let (a, b, c, d) = (self.col1.x, self.col2.x, self.col1.y, self.col2.y);
        let det = a * d - b * c;

        if det == 0.0 {
            return Err(PhysicsError::SingularMatrix { determinant: det });
        }

        let inv_det = 1.0 / det;
        Ok(Self::new(
            Vector2::new(inv_det * d, -inv_det * c),
            Vector2::new(-inv_det * b, inv_det * a),
        ))
    }

    /// Returns the matrix with every element replaced by its absolute value
    #[inline]
    pub fn abs(&self) -> Self {
        Self::new(self.col1.abs(), self.col2.abs())
    }

    /// Convert to nalgebra Matrix2
    pub fn to_nalgebra(&self) -> na::Matrix2<f32> {
        na::Matrix2::new(self.col1.x, self.col2.x, self.col1.y, self.col2.y)
    }

    /// Convert from nalgebra Matrix2
    pub fn from_nalgebra(m: &na::Matrix2<f32>) -> Self {
        Self::new(
            Vector2::new(m[(0, 0)], m[(1, 0)]),
            Vector2::new(m[(0, 1)], m[(1, 1)]),
        )
    }
}

impl Default for Matrix2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Matrix2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[[{}, {}], [{}, {}]]",
            self.col1.x, self.col2.x, self.col1.y, self.col2.y
        )
    }
}

impl Mul<Vector2> for Matrix2 {
    type Output = Vector2;
    #[inline]
    fn mul(self, v: Vector2) -> Vector2 {
        Vector2::new(
            self.col1.x * v.x + self.col2.x * v.y,
            self.col1.y * v.x + self.col2.y * v.y,
        )
    }
}

impl Mul for Matrix2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self * rhs.col1, self * rhs.col2)
    }
}

impl Add for Matrix2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.col1 + rhs.col1, self.col2 + rhs.col2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn multiply_uses_both_columns() {
        let a = Matrix2::new(Vector2::new(1.0, 3.0), Vector2::new(2.0, 4.0));
        let v = a * Vector2::new(1.0, 1.0);
        assert_eq!(v, Vector2::new(3.0, 7.0));

        let n = a.to_nalgebra() * na::Vector2::new(1.0, 1.0);
        assert_eq!(Vector2::from_nalgebra(&n), v);
    }

    #[test]
    fn product_matches_nalgebra() {
        let a = Matrix2::new(Vector2::new(1.0, 3.0), Vector2::new(2.0, 4.0));
        let b = Matrix2::new(Vector2::new(-1.0, 0.5), Vector2::new(2.0, 7.0));
        let expected = a.to_nalgebra() * b.to_nalgebra();
        assert_eq!(a * b, Matrix2::from_nalgebra(&expected));
    }

    #[test]
    fn singular_matrix_is_an_error() {
        let m = Matrix2::new(Vector2::new(1.0, 2.0), Vector2::new(2.0, 4.0));
        assert!(matches!(
            m.inverse(),
            Err(PhysicsError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn rotation_inverse_is_transpose() {
        let r = Matrix2::from_angle(0.7);
        let inv = r.inverse().unwrap();
        let t = r.transpose();
        assert_relative_eq!(inv.col1, t.col1, epsilon = 1e-6);
        assert_relative_eq!(inv.col2, t.col2, epsilon = 1e-6);
    }
}
