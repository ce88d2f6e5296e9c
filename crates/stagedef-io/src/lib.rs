//! Stage definition output library.
//!
//! Writers for decoded stages, sharing one interface through [`Writer`].
//!
//! # Supported Formats
//!
//! | Format | Contents                                   |
//! |--------|--------------------------------------------|
//! | XML    | Start, fallout, background, fog, item groups |
//! | OBJ    | Reconstructed collision meshes             |
//!
//! ```ignore
//! use stagedef_io::{ObjWriter, StageXmlWriter, Writer};
//!
//! let mut xml = StageXmlWriter::new();
//! xml.add_stage(&stage);
//! xml.write("STAGE001.xml")?;
//!
//! let mut obj = ObjWriter::new();
//! obj.add_stage(&stage);
//! obj.write("STAGE001.obj")?;
//! ```
//!
//! The lower-level [`XmlWriter`] enforces well-formed output through an
//! explicit state machine and can be driven directly.

pub mod obj_writer;
pub mod stage_writer;
pub mod traits;
pub mod xml_writer;

pub use obj_writer::ObjWriter;
pub use stage_writer::{write_stage, StageXmlWriter, DOCUMENT_VERSION};
pub use traits::Writer;
pub use xml_writer::{Attribute, Tag, Value, WriterState, XmlError, XmlResult, XmlWriter};
