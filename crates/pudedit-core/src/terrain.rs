//! Terrain classification of raw tile ids.
//!
//! Solid tiles are `0x00G?`, where the nibble `G` selects the terrain group.
//! Boundary tiles (two terrains meeting) are `0x0G??`. The class decides the
//! codes written to the action and movement maps of the file.

/// Tile ids are 12 bits wide.
pub const TILE_MASK: u16 = 0x0fff;

/// Light ground, the tile new maps are filled with.
pub const DEFAULT_TILE: u16 = 0x0050;

pub mod action {
    pub const PASSABLE: u16 = 0x4000;
    pub const TREES: u16 = 0xfffd;
    pub const ROCK: u16 = 0xfffe;
    pub const HUMAN_WALL: u16 = 0xfffc;
    pub const ORC_WALL: u16 = 0xfffb;
}

pub mod movement {
    pub const LAND: u16 = 0x0001;
    pub const COAST: u16 = 0x0002;
    pub const WATER: u16 = 0x0040;
    pub const TREES: u16 = 0x0081;
    pub const ROCK: u16 = 0x0082;
    pub const WALL: u16 = 0x008d;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerrainClass {
    Water,
    Constructible,
    Unconstructible,
    Trees,
    Rock,
    HumanWall,
    OrcWall,
}

impl TerrainClass {
    pub fn of(tile: u16) -> Self {
        let tile = tile & TILE_MASK;
        if tile < 0x0100 {
            match (tile >> 4) & 0xf {
                0x1 | 0x2 => TerrainClass::Water,
                0x3 | 0x4 => TerrainClass::Unconstructible,
                0x5 | 0x6 => TerrainClass::Constructible,
                0x7 => TerrainClass::Trees,
                0x8 => TerrainClass::Rock,
                0x9 | 0xb => TerrainClass::HumanWall,
                0xa | 0xc => TerrainClass::OrcWall,
                _ => TerrainClass::Unconstructible,
            }
        } else {
            match tile >> 8 {
                0x1 => TerrainClass::Water,
                // Shorelines and dirt transitions cannot hold buildings.
                0x2 | 0x3 | 0x5 => TerrainClass::Unconstructible,
                0x4 => TerrainClass::Rock,
                0x6 => TerrainClass::Constructible,
                0x7 => TerrainClass::Trees,
                0x8 => TerrainClass::HumanWall,
                0x9 => TerrainClass::OrcWall,
                _ => TerrainClass::Unconstructible,
            }
        }
    }

    pub fn action_code(self) -> u16 {
        match self {
            TerrainClass::Water | TerrainClass::Constructible | TerrainClass::Unconstructible => {
                action::PASSABLE
            }
            TerrainClass::Trees => action::TREES,
            TerrainClass::Rock => action::ROCK,
            TerrainClass::HumanWall => action::HUMAN_WALL,
            TerrainClass::OrcWall => action::ORC_WALL,
        }
    }

    pub fn movement_code(self) -> u16 {
        match self {
            TerrainClass::Water => movement::WATER,
            TerrainClass::Constructible => movement::LAND,
            TerrainClass::Unconstructible => movement::COAST,
            TerrainClass::Trees => movement::TREES,
            TerrainClass::Rock => movement::ROCK,
            TerrainClass::HumanWall | TerrainClass::OrcWall => movement::WALL,
        }
    }
}
