//! Stage Definition Core Library
//!
//! Decoding of Super Monkey Ball stage definition buffers into typed records:
//! start positions, item groups with their items, keyframe animation,
//! background models, fog and reconstructed collision meshes.
//!
//! ```ignore
//! use stagedef_core::{decode_stage, DecodeOptions};
//!
//! let data = std::fs::read("STAGE001.lz.raw")?;
//! let stage = decode_stage(&data, DecodeOptions::default())?;
//! println!("{} start positions", stage.start_positions.len());
//! ```

#![allow(clippy::needless_range_loop)]

pub mod animation;
pub mod byte_reader;
pub mod game_variant;
pub mod lz;
pub mod math_utils;
pub mod mesh_reconstructor;
pub mod records;
pub mod stage_decoder;
pub mod status;
pub mod vector;
pub mod wormhole_registry;

pub use byte_reader::ByteReader;
pub use game_variant::{Endian, GameVariant};
pub use lz::LzError;
pub use mesh_reconstructor::Triangle;
pub use records::*;
pub use stage_decoder::{decode_stage, DecodeOptions, StageDecoder};
pub use status::{StageError, StageResult};
pub use vector::{Vector3Angle16, Vector3f};
pub use wormhole_registry::WormholeRegistry;
