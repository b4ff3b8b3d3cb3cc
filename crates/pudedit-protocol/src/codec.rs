//! Boundary to the map file codec.
//!
//! The editor core only ever talks to a [`MapCodec`]; the byte layout lives
//! behind it. [`MsgpackCodec`] persists the file model with MessagePack.

use std::path::Path;

use thiserror::Error;

use crate::wire::{deserialize_map, serialize_map, WireError};
use crate::{MapFile, ValidationError};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("wire error: {0}")]
    Wire(#[from] WireError),
    #[error("invalid map: {0}")]
    Invalid(#[from] ValidationError),
}

pub trait MapCodec {
    /// Read and parse a map file. The result has passed [`MapCodec::check`].
    fn open(&self, path: &Path) -> Result<MapFile, CodecError>;

    fn check(&self, map: &MapFile) -> Result<(), ValidationError> {
        map.validate()
    }

    fn write(&self, map: &MapFile, path: &Path) -> Result<(), CodecError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MsgpackCodec;

impl MapCodec for MsgpackCodec {
    fn open(&self, path: &Path) -> Result<MapFile, CodecError> {
        let bytes = std::fs::read(path)?;
        let map = deserialize_map(&bytes)?;
        self.check(&map)?;
        Ok(map)
    }

    fn write(&self, map: &MapFile, path: &Path) -> Result<(), CodecError> {
        let bytes = serialize_map(map)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
