//! Conversion between the dense edit grid and the sparse file model.

use pudedit_protocol::{
    Era, MapFile, PlayerId, PlayerSettings, UnitRecord, UnitType, ValidationError,
    DESCRIPTION_MAX_LEN, MAX_PLAYERS,
};
use thiserror::Error;
use tracing::error;

use crate::cell::Layer;
use crate::grid::{Grid, GridError};
use crate::index::{Occupancy, ReferenceError, UnitIndex};
use crate::observer::MapObserver;
use crate::placement::{self, PlacementError, Stamp};
use crate::terrain::TILE_MASK;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("emitted {found} unit records but the counter says {expected}")]
    UnitCountMismatch { expected: usize, found: usize },
    #[error("unit #{index} at ({x}, {y}) overlaps another unit")]
    Overlap { index: usize, x: u16, y: u16 },
    #[error("tile #{index} has id {tile:#06x}, wider than 12 bits")]
    InvalidTile { index: usize, tile: u16 },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Map-level data that lives next to the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapMeta {
    pub era: Era,
    description: String,
    pub players: [PlayerSettings; MAX_PLAYERS],
    pub neutral: PlayerSettings,
}

impl Default for MapMeta {
    fn default() -> Self {
        Self {
            era: Era::default(),
            description: String::new(),
            players: PlayerSettings::defaults(),
            neutral: PlayerSettings::default_for(PlayerId::NEUTRAL),
        }
    }
}

impl MapMeta {
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description, cut to the longest prefix the file can hold.
    pub fn set_description(&mut self, text: &str) {
        let mut end = text.len().min(DESCRIPTION_MAX_LEN);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        self.description = text[..end].to_string();
    }

    pub fn settings(&self, player: PlayerId) -> &PlayerSettings {
        if player.is_neutral() {
            &self.neutral
        } else {
            &self.players[player.slot()]
        }
    }

    pub fn settings_mut(&mut self, player: PlayerId) -> &mut PlayerSettings {
        if player.is_neutral() {
            &mut self.neutral
        } else {
            &mut self.players[player.slot()]
        }
    }

    fn of_file(file: &MapFile) -> Self {
        let mut meta = Self {
            era: file.era,
            description: String::new(),
            players: file.players,
            neutral: file.neutral,
        };
        meta.set_description(&file.description);
        meta
    }
}

/// Walk `grid` row-major and build the file model.
///
/// `expected` is the live unit counter; a different record count means the
/// grid and the counter have drifted apart and nothing should be written.
pub fn flatten(grid: &Grid, meta: &MapMeta, expected: usize) -> Result<MapFile, SyncError> {
    let len = grid.len();
    let mut tiles = Vec::with_capacity(len);
    let mut action_map = Vec::with_capacity(len);
    let mut movement_map = Vec::with_capacity(len);
    let mut units = Vec::with_capacity(expected);

    for (x, y, cell) in grid.iter() {
        tiles.push(cell.tile);
        action_map.push(cell.tile_action());
        movement_map.push(cell.tile_movement());

        for layer in Layer::ALL {
            let slot = cell.layer(layer);
            if let (true, Some(unit)) = (slot.anchor, slot.unit) {
                units.push(UnitRecord {
                    x,
                    y,
                    unit,
                    owner: slot.player,
                    alter: slot.alter,
                });
            }
        }
        if let Some(owner) = cell.start_location {
            units.push(UnitRecord {
                x,
                y,
                unit: UnitType::start_location(cell.start_location_human),
                owner,
                alter: 0,
            });
        }
    }

    if units.len() != expected {
        error!(
            expected,
            found = units.len(),
            "unit counter out of sync with grid, refusing to flatten"
        );
        return Err(SyncError::UnitCountMismatch {
            expected,
            found: units.len(),
        });
    }

    Ok(MapFile {
        width: grid.width(),
        height: grid.height(),
        era: meta.era,
        description: meta.description.clone(),
        players: meta.players,
        neutral: meta.neutral,
        units,
        tiles,
        action_map,
        movement_map,
    })
}

/// Rebuild a grid, its unit index and metadata from the file model.
///
/// Units are stamped through the placement engine with their table footprint;
/// a record whose footprint is already taken is rejected.
pub fn expand<O: MapObserver + ?Sized>(
    file: &MapFile,
    observer: &mut O,
) -> Result<(Grid, UnitIndex, MapMeta), SyncError> {
    file.validate()?;

    let mut grid = Grid::create(file.width, file.height)?;
    for (index, (cell, &tile)) in grid.cells_mut().iter_mut().zip(&file.tiles).enumerate() {
        if tile & !TILE_MASK != 0 {
            return Err(SyncError::InvalidTile { index, tile });
        }
        cell.tile = tile;
    }

    let mut units = UnitIndex::new();
    for (index, record) in file.units.iter().enumerate() {
        if !placement::can_place(&grid, record.unit, record.x, record.y) {
            return Err(SyncError::Overlap {
                index,
                x: record.x,
                y: record.y,
            });
        }
        let stamp = Stamp::new(record.unit, record.owner).with_alter(record.alter);
        placement::place_unit(&mut grid, stamp, record.x, record.y, observer)?;

        let occupancy = if record.unit.is_start_location() {
            Occupancy::StartLocation
        } else {
            Layer::of(record.unit).into()
        };
        let (owner, unit) = units.add_reference(&grid, record.x, record.y, occupancy)?;
        observer.unit_listed(owner, unit);
    }

    observer.minimap_render(0, 0, grid.width(), grid.height());
    observer.units_recounted(units.count());
    Ok((grid, units, MapMeta::of_file(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NullObserver;
    use crate::terrain::{action, movement};

    fn placed(grid: &mut Grid, index: &mut UnitIndex, unit: UnitType, owner: PlayerId, x: u16, y: u16) {
        placement::place_unit(grid, Stamp::new(unit, owner), x, y, &mut NullObserver).unwrap();
        let occupancy = if unit.is_start_location() {
            Occupancy::StartLocation
        } else {
            Layer::of(unit).into()
        };
        index.add_reference(grid, x, y, occupancy).unwrap();
    }

    #[test]
    fn flatten_emits_anchors_and_start_locations() {
        let mut grid = Grid::create(32, 32).unwrap();
        grid.cell_at_mut(0, 0).tile = 0x0012;
        let mut index = UnitIndex::new();
        placed(&mut grid, &mut index, UnitType::TownHall, PlayerId(0), 2, 2);
        placed(&mut grid, &mut index, UnitType::GryphonRider, PlayerId(0), 3, 2);
        placed(&mut grid, &mut index, UnitType::OrcStart, PlayerId(1), 20, 20);

        let file = flatten(&grid, &MapMeta::default(), index.count() as usize).unwrap();
        assert_eq!(file.units.len(), 3);
        assert_eq!(file.units[0].unit, UnitType::TownHall);
        assert_eq!(file.units[1].unit, UnitType::GryphonRider);
        assert_eq!(
            file.units[2],
            UnitRecord {
                x: 20,
                y: 20,
                unit: UnitType::OrcStart,
                owner: PlayerId(1),
                alter: 0
            }
        );
        assert_eq!(file.tiles.len(), 32 * 32);
        assert_eq!(file.action_map[0], action::PASSABLE);
        assert_eq!(file.movement_map[0], movement::WATER);
        assert_eq!(file.validate(), Ok(()));
    }

    #[test]
    fn stray_anchor_is_a_count_mismatch() {
        let mut grid = Grid::create(32, 32).unwrap();
        let slot = &mut grid.cell_at_mut(7, 7).below;
        slot.unit = Some(UnitType::Grunt);
        slot.anchor = true;
        slot.spread_x = 1;
        slot.spread_y = 1;

        assert_eq!(
            flatten(&grid, &MapMeta::default(), 0),
            Err(SyncError::UnitCountMismatch {
                expected: 0,
                found: 1
            })
        );
    }

    #[test]
    fn expand_restores_grid_and_index() {
        let mut grid = Grid::create(64, 32).unwrap();
        let mut index = UnitIndex::new();
        placed(&mut grid, &mut index, UnitType::GoldMine, PlayerId::NEUTRAL, 10, 10);
        placed(&mut grid, &mut index, UnitType::Dragon, PlayerId(7), 11, 11);
        placed(&mut grid, &mut index, UnitType::HumanStart, PlayerId(2), 0, 0);
        let mut meta = MapMeta::default();
        meta.era = Era::Swamp;
        meta.set_description("marsh");

        let file = flatten(&grid, &meta, index.count() as usize).unwrap();
        let (restored, restored_index, restored_meta) = expand(&file, &mut NullObserver).unwrap();
        assert!(restored.persisted_eq(&grid));
        assert_eq!(restored_index, index);
        assert_eq!(restored_meta, meta);
    }

    #[test]
    fn expand_rejects_overlapping_units() {
        let mut grid = Grid::create(32, 32).unwrap();
        let mut index = UnitIndex::new();
        placed(&mut grid, &mut index, UnitType::Farm, PlayerId(0), 4, 4);
        let mut file = flatten(&grid, &MapMeta::default(), 1).unwrap();
        file.units.push(UnitRecord {
            x: 5,
            y: 5,
            unit: UnitType::Footman,
            owner: PlayerId(1),
            alter: 0,
        });
        assert_eq!(
            expand(&file, &mut NullObserver).map(|_| ()),
            Err(SyncError::Overlap { index: 1, x: 5, y: 5 })
        );
    }

    #[test]
    fn expand_rejects_wide_tiles() {
        let grid = Grid::create(32, 32).unwrap();
        let mut file = flatten(&grid, &MapMeta::default(), 0).unwrap();
        file.tiles[40] = 0x1050;
        assert_eq!(
            expand(&file, &mut NullObserver).map(|_| ()),
            Err(SyncError::InvalidTile {
                index: 40,
                tile: 0x1050
            })
        );
    }

    #[test]
    fn description_is_truncated_on_char_boundary() {
        let mut meta = MapMeta::default();
        meta.set_description(&"é".repeat(20));
        assert_eq!(meta.description().len(), 30);
        meta.set_description("short");
        assert_eq!(meta.description(), "short");
    }
}
