use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Controller, Era, PlayerId, Race, UnitType, MAX_PLAYERS};

/// Edge lengths the game accepts, for both width and height.
pub const SUPPORTED_SIZES: [u16; 4] = [32, 64, 96, 128];

/// Longest description the legacy format can hold, in bytes.
pub const DESCRIPTION_MAX_LEN: usize = 31;

pub fn is_supported_size(len: u16) -> bool {
    SUPPORTED_SIZES.contains(&len)
}

/// One placed unit as persisted: position of its anchor cell, type, owner and payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub x: u16,
    pub y: u16,
    pub unit: UnitType,
    pub owner: PlayerId,
    /// Resource amount in units of 2500 for gold mines and oil patches, the passive/active flag otherwise.
    #[serde(default)]
    pub alter: u16,
}

/// Per-player settings stored alongside the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettings {
    pub race: Race,
    pub controller: Controller,
    /// AI script index.
    #[serde(default)]
    pub ai: u8,
    pub gold: u16,
    pub lumber: u16,
    pub oil: u16,
}

impl PlayerSettings {
    pub fn default_for(player: PlayerId) -> Self {
        if player.is_neutral() {
            return Self {
                race: Race::Neutral,
                controller: Controller::Nobody,
                ai: 0,
                gold: 0,
                lumber: 0,
                oil: 0,
            };
        }
        Self {
            race: if player.0 % 2 == 0 { Race::Human } else { Race::Orc },
            controller: if player.0 == 0 {
                Controller::Human
            } else {
                Controller::Computer
            },
            ai: 0,
            gold: 2000,
            lumber: 1000,
            oil: 1000,
        }
    }

    pub fn defaults() -> [PlayerSettings; MAX_PLAYERS] {
        std::array::from_fn(|slot| Self::default_for(PlayerId(slot as u8)))
    }
}

/// Everything the map codec reads and writes. Flat arrays are row-major, `width * height` long.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFile {
    pub width: u16,
    pub height: u16,
    pub era: Era,
    #[serde(default)]
    pub description: String,
    pub players: [PlayerSettings; MAX_PLAYERS],
    pub neutral: PlayerSettings,
    #[serde(default)]
    pub units: Vec<UnitRecord>,
    pub tiles: Vec<u16>,
    pub action_map: Vec<u16>,
    pub movement_map: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported map size {width}x{height}")]
    UnsupportedSize { width: u16, height: u16 },
    #[error("{field} has {found} entries, expected {expected}")]
    ArrayLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("unit #{index} at ({x}, {y}) lies outside the map")]
    UnitOutOfBounds { index: usize, x: u16, y: u16 },
    #[error("unit #{index} has invalid owner {owner}")]
    InvalidOwner { index: usize, owner: u8 },
    #[error("unit #{index} is a start location owned by the neutral player")]
    NeutralStartLocation { index: usize },
    #[error("player {player} has more than one start location")]
    DuplicateStartLocation { player: u8 },
    #[error("description is {len} bytes, at most 31 allowed")]
    DescriptionTooLong { len: usize },
}

impl MapFile {
    pub fn units_count(&self) -> usize {
        self.units.len()
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check the invariants the game relies on when loading the file.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_supported_size(self.width) || !is_supported_size(self.height) {
            return Err(ValidationError::UnsupportedSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.description.len() > DESCRIPTION_MAX_LEN {
            return Err(ValidationError::DescriptionTooLong {
                len: self.description.len(),
            });
        }

        let expected = self.cell_count();
        for (field, found) in [
            ("tiles", self.tiles.len()),
            ("action_map", self.action_map.len()),
            ("movement_map", self.movement_map.len()),
        ] {
            if found != expected {
                return Err(ValidationError::ArrayLength {
                    field,
                    expected,
                    found,
                });
            }
        }

        let mut starts = [false; MAX_PLAYERS];
        for (index, record) in self.units.iter().enumerate() {
            if record.x >= self.width || record.y >= self.height {
                return Err(ValidationError::UnitOutOfBounds {
                    index,
                    x: record.x,
                    y: record.y,
                });
            }
            if PlayerId::new(record.owner.0).is_none() {
                return Err(ValidationError::InvalidOwner {
                    index,
                    owner: record.owner.0,
                });
            }
            if record.unit.is_start_location() {
                if record.owner.is_neutral() {
                    return Err(ValidationError::NeutralStartLocation { index });
                }
                let seen = &mut starts[record.owner.slot()];
                if *seen {
                    return Err(ValidationError::DuplicateStartLocation {
                        player: record.owner.0,
                    });
                }
                *seen = true;
            }
        }
        Ok(())
    }
}
