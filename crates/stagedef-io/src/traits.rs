//! Common interface for stage output formats.
//!
//! Writers collect decoded stages and emit them in their format:
//!
//! ```ignore
//! use stagedef_io::{ObjWriter, StageXmlWriter, Writer};
//!
//! fn save<W: Writer>(stage: &Stage, path: &Path) -> Result<(), W::Error> {
//!     let mut writer = W::new();
//!     writer.add_stage(stage);
//!     writer.write(path)
//! }
//!
//! save::<StageXmlWriter>(&stage, Path::new("STAGE001.xml"))?;
//! save::<ObjWriter>(&stage, Path::new("STAGE001.obj"))?;
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use stagedef_core::records::Stage;

pub trait Writer: Sized {
    type Error: From<io::Error>;

    /// Create a new writer instance.
    fn new() -> Self;

    /// Add a decoded stage to be written.
    fn add_stage(&mut self, stage: &Stage);

    /// Write everything added so far to `sink`.
    fn write_to<W: Write>(&self, sink: W) -> Result<(), Self::Error>;

    /// Write everything added so far to a file, creating or truncating it.
    fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut sink = BufWriter::new(file);
        self.write_to(&mut sink)?;
        sink.flush()?;
        Ok(())
    }

    /// True if nothing has been added that would produce output.
    fn is_empty(&self) -> bool;
}
