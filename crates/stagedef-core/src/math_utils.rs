//! Angle conversion and rotation helpers.
//!
//! Stage files store orientations as 16-bit fixed-point angles where 65536
//! units make one full turn. Collision triangles additionally need proper
//! rotation matrices to bring their local 2D deltas into world space.

use crate::vector::{Vector3Angle16, Vector3f};

/// Degrees per fixed-point angle unit.
pub const ANGLE16_TO_DEGREES: f64 = 360.0 / 65536.0;

/// Converts a 16-bit fixed-point angle to degrees.
///
/// The conversion is linear and periodic with period 65536:
///
/// ```
/// use stagedef_core::math_utils::angle16_to_degrees;
/// assert_eq!(angle16_to_degrees(0), 0.0);
/// assert_eq!(angle16_to_degrees(16384), 90.0);
/// assert_eq!(angle16_to_degrees(32768), 180.0);
/// ```
#[inline]
pub fn angle16_to_degrees(raw: u16) -> f32 {
    (ANGLE16_TO_DEGREES * f64::from(raw)) as f32
}

/// Converts degrees to radians.
#[inline]
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// A row-major 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    pub rows: [[f32; 3]; 3],
}

impl Matrix3 {
    pub const IDENTITY: Matrix3 = Matrix3 {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Right-handed rotation about the X axis.
    pub fn rotation_x(degrees: f32) -> Self {
        let (s, c) = degrees_to_radians(degrees).sin_cos();
        Self {
            rows: [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]],
        }
    }

    /// Right-handed rotation about the Y axis.
    pub fn rotation_y(degrees: f32) -> Self {
        let (s, c) = degrees_to_radians(degrees).sin_cos();
        Self {
            rows: [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]],
        }
    }

    /// Right-handed rotation about the Z axis.
    pub fn rotation_z(degrees: f32) -> Self {
        let (s, c) = degrees_to_radians(degrees).sin_cos();
        Self {
            rows: [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Multiplies this matrix by a column vector.
    pub fn transform(&self, v: Vector3f) -> Vector3f {
        let r = &self.rows;
        Vector3f::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        )
    }
}

/// The three per-axis rotations described by a fixed-point angle triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRotations {
    pub x: Matrix3,
    pub y: Matrix3,
    pub z: Matrix3,
}

impl AxisRotations {
    pub fn from_angles(angles: Vector3Angle16) -> Self {
        let degrees = angles.to_degrees();
        Self {
            x: Matrix3::rotation_x(degrees.x),
            y: Matrix3::rotation_y(degrees.y),
            z: Matrix3::rotation_z(degrees.z),
        }
    }

    /// Applies Z, then Y, then X.
    pub fn apply(&self, v: Vector3f) -> Vector3f {
        self.x.transform(self.y.transform(self.z.transform(v)))
    }
}
