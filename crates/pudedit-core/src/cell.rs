use pudedit_protocol::{Orientation, PlayerId, UnitType};
use thiserror::Error;

use crate::terrain::{TerrainClass, TILE_MASK};

/// Bytes per cell in the packed form used by snapshots.
pub const CELL_BYTES: usize = 20;

const NONE: u8 = 0xff;
const FLAG_ANCHOR: u8 = 0x01;

/// Occupancy layer of a cell: ground units and buildings below, flyers above.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Below,
    Above,
}

impl Layer {
    pub const ALL: [Layer; 2] = [Layer::Below, Layer::Above];

    pub fn of(unit: UnitType) -> Self {
        if unit.is_flying() {
            Layer::Above
        } else {
            Layer::Below
        }
    }
}

/// One layer of a cell.
///
/// A footprint stamps the same `unit`/`player`/`orient` on every covered cell.
/// On covered cells `spread_x`/`spread_y` hold the offset from the anchor; on
/// the anchor (top-left) cell they hold the footprint size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerSlot {
    pub unit: Option<UnitType>,
    pub player: PlayerId,
    pub orient: Orientation,
    pub anchor: bool,
    pub spread_x: u8,
    pub spread_y: u8,
    pub alter: u16,
    /// Transient UI selection; never packed.
    pub selected: bool,
}

impl Default for LayerSlot {
    fn default() -> Self {
        Self {
            unit: None,
            player: PlayerId(0),
            orient: Orientation::default(),
            anchor: false,
            spread_x: 0,
            spread_y: 0,
            alter: 0,
            selected: false,
        }
    }
}

impl LayerSlot {
    pub fn is_empty(&self) -> bool {
        self.unit.is_none()
    }

    fn persisted_eq(&self, other: &Self) -> bool {
        self.unit == other.unit
            && self.player == other.player
            && self.anchor == other.anchor
            && self.spread_x == other.spread_x
            && self.spread_y == other.spread_y
            && self.alter == other.alter
    }

    fn pack(&self, out: &mut [u8]) {
        out[0] = self.unit.map_or(NONE, UnitType::id);
        out[1] = self.player.0;
        out[2] = self.orient as u8;
        out[3] = if self.anchor { FLAG_ANCHOR } else { 0 };
        out[4] = self.spread_x;
        out[5] = self.spread_y;
        out[6..8].copy_from_slice(&self.alter.to_le_bytes());
    }

    fn unpack(bytes: &[u8]) -> Result<Self, CellDecodeError> {
        let unit = match bytes[0] {
            NONE => None,
            raw => Some(UnitType::from_u8(raw).ok_or(CellDecodeError::UnknownUnit(raw))?),
        };
        Ok(Self {
            unit,
            player: PlayerId::new(bytes[1]).ok_or(CellDecodeError::InvalidPlayer(bytes[1]))?,
            orient: Orientation::from_u8(bytes[2])
                .ok_or(CellDecodeError::InvalidOrientation(bytes[2]))?,
            anchor: bytes[3] & FLAG_ANCHOR != 0,
            spread_x: bytes[4],
            spread_y: bytes[5],
            alter: u16::from_le_bytes([bytes[6], bytes[7]]),
            selected: false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellDecodeError {
    #[error("unknown unit id {0:#04x}")]
    UnknownUnit(u8),
    #[error("invalid player {0}")]
    InvalidPlayer(u8),
    #[error("invalid orientation {0}")]
    InvalidOrientation(u8),
    #[error("tile id {0:#06x} exceeds 12 bits")]
    InvalidTile(u16),
}

/// Full state of one grid tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub tile: u16,
    pub below: LayerSlot,
    pub above: LayerSlot,
    /// Player whose start marker sits on this cell.
    pub start_location: Option<PlayerId>,
    pub start_location_human: bool,
}

impl Cell {
    pub fn with_tile(tile: u16) -> Self {
        Self {
            tile: tile & TILE_MASK,
            ..Self::default()
        }
    }

    pub fn layer(&self, layer: Layer) -> &LayerSlot {
        match layer {
            Layer::Below => &self.below,
            Layer::Above => &self.above,
        }
    }

    pub fn layer_mut(&mut self, layer: Layer) -> &mut LayerSlot {
        match layer {
            Layer::Below => &mut self.below,
            Layer::Above => &mut self.above,
        }
    }

    /// Occupant of `layer`: type, owner and facing.
    pub fn unit_at(&self, layer: Layer) -> Option<(UnitType, PlayerId, Orientation)> {
        let slot = self.layer(layer);
        slot.unit.map(|unit| (unit, slot.player, slot.orient))
    }

    pub fn terrain(&self) -> TerrainClass {
        TerrainClass::of(self.tile)
    }

    pub fn tile_action(&self) -> u16 {
        self.terrain().action_code()
    }

    pub fn tile_movement(&self) -> u16 {
        self.terrain().movement_code()
    }

    /// Equality over the state that survives a save/load cycle
    /// (facing and selection are dropped).
    pub fn persisted_eq(&self, other: &Self) -> bool {
        self.tile == other.tile
            && self.below.persisted_eq(&other.below)
            && self.above.persisted_eq(&other.above)
            && self.start_location == other.start_location
            && self.start_location_human == other.start_location_human
    }

    /// Write the packed record into `out`, which must hold [`CELL_BYTES`] bytes.
    ///
    /// Layout (little endian): tile u16, below slot (8 bytes), above slot
    /// (8 bytes), start player (0xff when none), start race flag.
    pub fn pack(&self, out: &mut [u8]) {
        out[0..2].copy_from_slice(&self.tile.to_le_bytes());
        self.below.pack(&mut out[2..10]);
        self.above.pack(&mut out[10..18]);
        out[18] = self.start_location.map_or(NONE, |player| player.0);
        out[19] = u8::from(self.start_location_human);
    }

    pub fn unpack(bytes: &[u8]) -> Result<Self, CellDecodeError> {
        let tile = u16::from_le_bytes([bytes[0], bytes[1]]);
        if tile & !TILE_MASK != 0 {
            return Err(CellDecodeError::InvalidTile(tile));
        }
        let start_location = match bytes[18] {
            NONE => None,
            raw => Some(PlayerId::new(raw).ok_or(CellDecodeError::InvalidPlayer(raw))?),
        };
        Ok(Self {
            tile,
            below: LayerSlot::unpack(&bytes[2..10])?,
            above: LayerSlot::unpack(&bytes[10..18])?,
            start_location,
            start_location_human: bytes[19] != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{action, movement};

    fn occupied_cell() -> Cell {
        let mut cell = Cell::with_tile(0x0063);
        cell.below = LayerSlot {
            unit: Some(UnitType::GoldMine),
            player: PlayerId::NEUTRAL,
            orient: Orientation::West,
            anchor: true,
            spread_x: 3,
            spread_y: 3,
            alter: 48,
            selected: true,
        };
        cell.above = LayerSlot {
            unit: Some(UnitType::Dragon),
            player: PlayerId(5),
            orient: Orientation::NorthEast,
            anchor: true,
            spread_x: 1,
            spread_y: 1,
            alter: 0,
            selected: false,
        };
        cell.start_location = Some(PlayerId(2));
        cell.start_location_human = true;
        cell
    }

    #[test]
    fn default_cell_is_empty() {
        let cell = Cell::default();
        assert_eq!(cell.unit_at(Layer::Below), None);
        assert_eq!(cell.unit_at(Layer::Above), None);
        assert_eq!(cell.start_location, None);
    }

    #[test]
    fn layer_follows_flying_classification() {
        assert_eq!(Layer::of(UnitType::GryphonRider), Layer::Above);
        assert_eq!(Layer::of(UnitType::Battleship), Layer::Below);
        assert_eq!(Layer::of(UnitType::TownHall), Layer::Below);
    }

    #[test]
    fn pack_keeps_everything_but_selection() {
        let cell = occupied_cell();
        let mut bytes = [0u8; CELL_BYTES];
        cell.pack(&mut bytes);

        let decoded = Cell::unpack(&bytes).unwrap();
        assert!(decoded.persisted_eq(&cell));
        assert_eq!(decoded.below.orient, Orientation::West);
        assert_eq!(decoded.above.orient, Orientation::NorthEast);
        assert!(!decoded.below.selected);
    }

    #[test]
    fn unpack_rejects_unknown_unit_ids() {
        let mut bytes = [0u8; CELL_BYTES];
        Cell::default().pack(&mut bytes);
        bytes[2] = 0x22;
        assert_eq!(Cell::unpack(&bytes), Err(CellDecodeError::UnknownUnit(0x22)));
    }

    #[test]
    fn unpack_rejects_wide_tiles_and_bad_players() {
        let mut bytes = [0u8; CELL_BYTES];
        Cell::default().pack(&mut bytes);
        bytes[1] = 0x10;
        assert_eq!(Cell::unpack(&bytes), Err(CellDecodeError::InvalidTile(0x1000)));

        bytes[1] = 0;
        bytes[18] = 9;
        assert_eq!(Cell::unpack(&bytes), Err(CellDecodeError::InvalidPlayer(9)));
    }

    #[test]
    fn tile_derivations() {
        let water = Cell::with_tile(0x0012);
        assert_eq!(water.tile_action(), action::PASSABLE);
        assert_eq!(water.tile_movement(), movement::WATER);

        let forest = Cell::with_tile(0x0071);
        assert_eq!(forest.tile_action(), action::TREES);
        assert_eq!(forest.tile_movement(), movement::TREES);
    }
}
