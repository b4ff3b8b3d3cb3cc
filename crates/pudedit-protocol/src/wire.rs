use rmp_serde::{decode, encode};
use thiserror::Error;

use crate::MapFile;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("encode error: {0}")]
    Encode(#[from] encode::Error),
    #[error("decode error: {0}")]
    Decode(#[from] decode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn serialize_map(map: &MapFile) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec(map)?)
}

pub fn deserialize_map(bytes: &[u8]) -> Result<MapFile, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_map_json(map: &MapFile) -> Result<String, WireError> {
    Ok(serde_json::to_string_pretty(map)?)
}
