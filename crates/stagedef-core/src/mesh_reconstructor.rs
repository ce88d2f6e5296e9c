//! Collision mesh reconstruction.
//!
//! Collision triangles are stored compactly: a base vertex, a face normal, a
//! fixed-point rotation and two 2D deltas locating the other two vertices in
//! the rotated frame. The triangle list carries no length; the number of
//! triangles is recovered from the largest index referenced by the collision
//! grid, which assumes indices are dense from zero.

use byteorder::ByteOrder;

use crate::byte_reader::ByteReader;
use crate::math_utils::AxisRotations;
use crate::records::CollisionGroupHeader;
use crate::status::StageResult;
use crate::vector::{Vector3Angle16, Vector3f};

/// Size of one encoded collision triangle.
pub const TRIANGLE_STRIDE: usize = 0x40;

/// Terminates each grid cell's triangle index list.
pub const CELL_LIST_END: u16 = 0xFFFF;

/// A triangle in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vector3f; 3],
    pub normal: Vector3f,
}

/// A collision triangle as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedTriangle {
    pub base: Vector3f,
    pub normal: Vector3f,
    pub rotation: Vector3Angle16,
    /// (dx, dy) of the second vertex in the rotated frame.
    pub delta2: [f32; 2],
    /// (dx, dy) of the third vertex in the rotated frame.
    pub delta3: [f32; 2],
}

impl EncodedTriangle {
    /// Reads one triangle at the cursor and advances past its full stride.
    pub fn read<O: ByteOrder>(reader: &mut ByteReader<'_, O>) -> StageResult<Self> {
        let base = reader.read_vector3f()?; //          0x0   vertex 1
        let normal = reader.read_vector3f()?; //        0xC   normal
        let rotation = reader.read_angles(true)?; //    0x18  rotation from the XY plane
        let delta2 = [reader.read_f32()?, reader.read_f32()?]; // 0x20
        let delta3 = [reader.read_f32()?, reader.read_f32()?]; // 0x28
        reader.skip(0x10)?; //                          0x30  tangent, bitangent
        Ok(Self {
            base,
            normal,
            rotation,
            delta2,
            delta3,
        })
    }

    /// Rotates the deltas into world space and offsets them by the base vertex.
    pub fn resolve(&self) -> Triangle {
        let rotations = AxisRotations::from_angles(self.rotation);
        let to_world = |[dx, dy]: [f32; 2]| rotations.apply(Vector3f::new(dx, dy, 0.0)) + self.base;
        Triangle {
            vertices: [self.base, to_world(self.delta2), to_world(self.delta3)],
            normal: self.normal,
        }
    }
}

/// Counts the triangles referenced by the collision grid.
///
/// Returns zero when the grid is absent. The cursor is left where it was.
pub fn triangle_count<O: ByteOrder>(
    reader: &mut ByteReader<'_, O>,
    header: &CollisionGroupHeader,
) -> StageResult<usize> {
    if header.grid_triangle_list_offset == 0 {
        return Ok(0);
    }
    let cells = u64::from(header.grid_step_x_count) * u64::from(header.grid_step_z_count);
    let max_index = reader.with_position(header.grid_triangle_list_offset as usize, |r| {
        let mut max_index: Option<u16> = None;
        for _ in 0..cells {
            let cell_offset = r.read_u32()?;
            if cell_offset == 0 {
                continue;
            }
            let cell_max = r.with_position(cell_offset as usize, |r| {
                let mut cell_max: Option<u16> = None;
                loop {
                    let index = r.read_u16()?;
                    if index == CELL_LIST_END {
                        break;
                    }
                    cell_max = cell_max.max(Some(index));
                }
                Ok(cell_max)
            })?;
            max_index = max_index.max(cell_max);
        }
        Ok(max_index)
    })?;
    Ok(max_index.map_or(0, |max| usize::from(max) + 1))
}

/// Decodes and deduplicates every triangle referenced by a collision group.
///
/// Two triangles are duplicates when all three resolved vertices compare
/// exactly equal. The cursor is left where it was.
pub fn reconstruct<O: ByteOrder>(
    reader: &mut ByteReader<'_, O>,
    header: &CollisionGroupHeader,
) -> StageResult<Vec<Triangle>> {
    let count = match header.triangle_list_offset {
        0 => 0,
        _ => triangle_count(reader, header)?,
    };
    if count == 0 {
        return Ok(Vec::new());
    }
    log::debug!(
        "reconstructing {count} collision triangles at {:#x}",
        header.triangle_list_offset
    );

    let mut triangles: Vec<Triangle> = Vec::with_capacity(count);
    reader.with_position(header.triangle_list_offset as usize, |r| {
        for _ in 0..count {
            let triangle = EncodedTriangle::read(r)?.resolve();
            if !triangles.iter().any(|kept| kept.vertices == triangle.vertices) {
                triangles.push(triangle);
            }
        }
        Ok(())
    })?;
    Ok(triangles)
}
