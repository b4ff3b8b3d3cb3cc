use serde::{Deserialize, Serialize};

/// Number of playable slots in a map.
pub const MAX_PLAYERS: usize = 8;

/// Playable slots plus the neutral slot.
pub const PLAYER_SLOTS: usize = MAX_PLAYERS + 1;

/// Player index (0-7) or the neutral owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Owner value the legacy format uses for neutral units (critters, gold mines, ...).
    pub const NEUTRAL: PlayerId = PlayerId(15);

    /// Validating constructor: accepts 0-7 and the neutral value.
    #[inline]
    pub const fn new(raw: u8) -> Option<Self> {
        if (raw as usize) < MAX_PLAYERS || raw == Self::NEUTRAL.0 {
            Some(Self(raw))
        } else {
            None
        }
    }

    #[inline]
    pub const fn is_neutral(self) -> bool {
        self.0 == Self::NEUTRAL.0
    }

    /// Slot in per-player tables; neutral maps to the last slot.
    #[inline]
    pub const fn slot(self) -> usize {
        if self.is_neutral() {
            MAX_PLAYERS
        } else {
            self.0 as usize
        }
    }

    pub fn players() -> impl Iterator<Item = PlayerId> {
        (0..MAX_PLAYERS as u8).map(PlayerId)
    }
}

/// Facing of a unit sprite. Only used to pick a sprite frame.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    #[default]
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::North,
        Orientation::NorthEast,
        Orientation::East,
        Orientation::SouthEast,
        Orientation::South,
        Orientation::SouthWest,
        Orientation::West,
        Orientation::NorthWest,
    ];

    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// Tileset of the map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    #[default]
    Forest,
    Winter,
    Wasteland,
    Swamp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    Human,
    Orc,
    Neutral,
}

/// Who drives a player slot when the map is played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    Computer,
    Human,
    Nobody,
    PassiveComputer,
    RescuePassive,
    RescueActive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_ids_cover_eight_slots_and_neutral() {
        assert_eq!(PlayerId::new(7), Some(PlayerId(7)));
        assert_eq!(PlayerId::new(8), None);
        assert_eq!(PlayerId::new(15), Some(PlayerId::NEUTRAL));
        assert_eq!(PlayerId::NEUTRAL.slot(), MAX_PLAYERS);
    }

    #[test]
    fn orientation_from_raw() {
        assert_eq!(Orientation::from_u8(2), Some(Orientation::East));
        assert_eq!(Orientation::from_u8(8), None);
    }
}
