//! Small fixed-size vector types used by decoded records.

use std::ops::{Add, Index, Sub};

/// A 3D vector with f32 components
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Three fixed-point angles, 65536 units per full turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vector3Angle16 {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

impl Vector3f {
    /// Creates a new 3D float vector
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns the components as an array
    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vector3f {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3f {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Index<usize> for Vector3f {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vector3f index out of range: {index}"),
        }
    }
}

impl From<[f32; 3]> for Vector3f {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl Vector3Angle16 {
    #[inline]
    pub fn new(x: u16, y: u16, z: u16) -> Self {
        Self { x, y, z }
    }

    /// Converts all three components to degrees.
    pub fn to_degrees(self) -> Vector3f {
        Vector3f::new(
            crate::math_utils::angle16_to_degrees(self.x),
            crate::math_utils::angle16_to_degrees(self.y),
            crate::math_utils::angle16_to_degrees(self.z),
        )
    }
}
