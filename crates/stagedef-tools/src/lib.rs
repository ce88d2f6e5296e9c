//! Batch extraction of stage definition files.
//!
//! Each input file is read, decompressed when needed, decoded and written
//! next to the input (or into an output directory) as `<input>.xml`, plus
//! `<input>.obj` when mesh output is requested and the stage has collision
//! triangles. Every file gets its own decode session, so one bad file never
//! affects the others.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use stagedef_core::{decode_stage, lz, DecodeOptions, StageError};
use stagedef_io::{ObjWriter, StageXmlWriter, Writer, XmlError};
use thiserror::Error;

/// Errors that fail a single file.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error("XML output failed: {0}")]
    Xml(#[from] XmlError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ExtractError {
    /// True for inputs that are not stage definitions at all.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, ExtractError::Stage(err) if err.is_unrecognized())
    }
}

/// When to run the LZ decompressor over an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DecompressMode {
    /// Decompress `.lz` files and buffers whose header matches their size.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub write_mesh: bool,
    pub decompress: DecompressMode,
    /// Directory for output files. Defaults to each input's own directory.
    pub output_dir: Option<PathBuf>,
}

/// Files written for one successfully extracted stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub xml: PathBuf,
    pub obj: Option<PathBuf>,
}

#[derive(Debug)]
pub enum FileOutcome {
    Extracted(Extracted),
    /// The file was not a recognized stage definition.
    Skipped,
    Failed(ExtractError),
}

/// Per-outcome file counts for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub extracted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Extracted(_) => self.extracted += 1,
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// `<input file name>.<extension>`, placed in `dir` if given.
pub fn output_path(input: &Path, dir: Option<&Path>, extension: &str) -> PathBuf {
    let mut name = input
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("stage"));
    name.push(".");
    name.push(extension);
    match dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn has_lz_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("lz"))
}

/// Returns the decoder input for `raw`, decompressing according to `mode`.
pub fn prepare_input(path: &Path, raw: Vec<u8>, mode: DecompressMode) -> Result<Vec<u8>, StageError> {
    let compressed = match mode {
        DecompressMode::Always => true,
        DecompressMode::Never => false,
        DecompressMode::Auto => has_lz_extension(path) || lz::looks_compressed(&raw),
    };
    if !compressed {
        return Ok(raw);
    }
    let data = lz::decompress(&raw)?;
    debug!(
        "{}: decompressed {} -> {} bytes",
        path.display(),
        raw.len(),
        data.len()
    );
    Ok(data)
}

/// Decodes one file and writes its outputs.
pub fn extract_file(path: &Path, options: &ExtractOptions) -> Result<Extracted, ExtractError> {
    let raw = fs::read(path)?;
    let data = prepare_input(path, raw, options.decompress)?;
    let decode_options = DecodeOptions {
        reconstruct_mesh: options.write_mesh,
    };
    let stage = decode_stage(&data, decode_options)?;

    let dir = options.output_dir.as_deref();
    let xml_path = output_path(path, dir, "xml");
    let mut xml = StageXmlWriter::new();
    xml.add_stage(&stage);
    xml.write(&xml_path)?;

    let mut obj_path = None;
    if options.write_mesh {
        let mut obj = ObjWriter::new();
        obj.add_stage(&stage);
        if obj.is_empty() {
            debug!("{}: no collision triangles", path.display());
        } else {
            let target = output_path(path, dir, "obj");
            match obj.write(&target) {
                Ok(()) => obj_path = Some(target),
                Err(err) => warn!("{}: mesh output failed: {err}", target.display()),
            }
        }
    }

    Ok(Extracted {
        xml: xml_path,
        obj: obj_path,
    })
}

/// Extracts a single file, classifying the result.
pub fn process_file(path: &Path, options: &ExtractOptions) -> FileOutcome {
    match extract_file(path, options) {
        Ok(extracted) => {
            info!("{} -> {}", path.display(), extracted.xml.display());
            if let Some(obj) = &extracted.obj {
                info!("{} -> {}", path.display(), obj.display());
            }
            FileOutcome::Extracted(extracted)
        }
        Err(err) if err.is_unrecognized() => {
            warn!("{}: skipped, {err}", path.display());
            FileOutcome::Skipped
        }
        Err(err) => {
            error!("{}: {err}", path.display());
            FileOutcome::Failed(err)
        }
    }
}

/// Extracts every file in order and tallies the outcomes.
pub fn run_batch<I, P>(paths: I, options: &ExtractOptions) -> BatchSummary
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut summary = BatchSummary::default();
    for path in paths {
        let outcome = process_file(path.as_ref(), options);
        summary.record(&outcome);
    }
    summary
}
