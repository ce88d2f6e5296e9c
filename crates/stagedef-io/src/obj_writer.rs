//! Wavefront OBJ writer for collision meshes.
//!
//! Every triangle contributes three `v` lines, one `vn` line and one
//! `f a//n b//n c//n` line. Vertex and normal numbering is 1-based and runs
//! across every stage and collision field added to the same writer, so one
//! writer yields a single self-consistent OBJ file per session.
//!
//! # Example
//!
//! ```
//! use stagedef_core::{Triangle, Vector3f};
//! use stagedef_io::obj_writer::ObjWriter;
//!
//! let mut obj = ObjWriter::new();
//! obj.add_triangles(&[Triangle {
//!     vertices: [
//!         Vector3f::new(0.0, 0.0, 0.0),
//!         Vector3f::new(1.0, 0.0, 0.0),
//!         Vector3f::new(0.0, 0.0, 1.0),
//!     ],
//!     normal: Vector3f::new(0.0, 1.0, 0.0),
//! }]);
//! let mut out = Vec::new();
//! obj.write_obj(&mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().ends_with("f 1//1 2//1 3//1\n"));
//! ```

use std::io::{self, Write};

use log::debug;
use stagedef_core::mesh_reconstructor::Triangle;
use stagedef_core::records::Stage;
use stagedef_core::vector::Vector3f;

use crate::traits::Writer;

/// Collects triangles and writes them as OBJ text.
#[derive(Debug, Clone, Default)]
pub struct ObjWriter {
    vertices: Vec<Vector3f>,
    normals: Vec<Vector3f>,
    /// 1-based (vertex, vertex, vertex, normal) indices.
    faces: Vec<[usize; 4]>,
}

impl ObjWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends triangles, continuing the vertex and normal numbering.
    pub fn add_triangles<'a>(&mut self, triangles: impl IntoIterator<Item = &'a Triangle>) {
        for triangle in triangles {
            let first = self.vertices.len() + 1;
            self.vertices.extend_from_slice(&triangle.vertices);
            self.normals.push(triangle.normal);
            let normal = self.normals.len();
            self.faces.push([first, first + 1, first + 2, normal]);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Writes the vertex list, then the normal list, then the face list.
    pub fn write_obj<W: Write>(&self, mut out: W) -> io::Result<()> {
        debug!(
            "writing {} vertices, {} faces",
            self.vertices.len(),
            self.faces.len()
        );
        for v in &self.vertices {
            writeln!(out, "v {:.6} {:.6} {:.6}", v.x, v.y, v.z)?;
        }
        for n in &self.normals {
            writeln!(out, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
        }
        for [a, b, c, n] in &self.faces {
            writeln!(out, "f {a}//{n} {b}//{n} {c}//{n}")?;
        }
        Ok(())
    }
}

impl Writer for ObjWriter {
    type Error = io::Error;

    fn new() -> Self {
        Self::default()
    }

    fn add_stage(&mut self, stage: &Stage) {
        self.add_triangles(stage.triangles());
    }

    fn write_to<W: Write>(&self, sink: W) -> io::Result<()> {
        self.write_obj(sink)
    }

    fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}
