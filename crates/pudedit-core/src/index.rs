//! Per-player listing of placed units, kept in lockstep with anchor cells.

use pudedit_protocol::{PlayerId, PLAYER_SLOTS};
use thiserror::Error;

use crate::cell::Layer;
use crate::grid::Grid;

/// What a reference points at on its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occupancy {
    Below,
    Above,
    StartLocation,
}

impl From<Layer> for Occupancy {
    fn from(layer: Layer) -> Self {
        match layer {
            Layer::Below => Occupancy::Below,
            Layer::Above => Occupancy::Above,
        }
    }
}

/// Lightweight handle to a unit's anchor cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitRef {
    pub x: u16,
    pub y: u16,
    pub occupancy: Occupancy,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("no {occupancy:?} unit at ({x}, {y})")]
    InvalidUnit { x: u16, y: u16, occupancy: Occupancy },
    #[error("unit counter overflow")]
    Overflow,
    #[error("unit counter underflow")]
    Underflow,
    #[error("({x}, {y}) {occupancy:?} is not indexed")]
    Missing { x: u16, y: u16, occupancy: Occupancy },
}

/// Append-ordered unit lists for the 8 players and the neutral slot,
/// plus the global counter that saving checks against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitIndex {
    lists: [Vec<UnitRef>; PLAYER_SLOTS],
    count: u16,
}

impl UnitIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    pub fn is_full(&self) -> bool {
        self.count == u16::MAX
    }

    pub fn units_of(&self, player: PlayerId) -> &[UnitRef] {
        &self.lists[player.slot()]
    }

    pub fn start_location_of(&self, player: PlayerId) -> Option<(u16, u16)> {
        self.units_of(player)
            .iter()
            .find(|unit| unit.occupancy == Occupancy::StartLocation)
            .map(|unit| (unit.x, unit.y))
    }

    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
        self.count = 0;
    }

    fn owner_at(grid: &Grid, x: u16, y: u16, occupancy: Occupancy) -> Option<PlayerId> {
        let cell = grid.get(x, y)?;
        match occupancy {
            Occupancy::Below => cell.unit_at(Layer::Below).map(|(_, owner, _)| owner),
            Occupancy::Above => cell.unit_at(Layer::Above).map(|(_, owner, _)| owner),
            Occupancy::StartLocation => cell.start_location,
        }
    }

    /// Register the unit anchored at `(x, y)`. Its owner is read from the grid.
    pub fn add_reference(
        &mut self,
        grid: &Grid,
        x: u16,
        y: u16,
        occupancy: Occupancy,
    ) -> Result<(PlayerId, UnitRef), ReferenceError> {
        let owner = Self::owner_at(grid, x, y, occupancy)
            .ok_or(ReferenceError::InvalidUnit { x, y, occupancy })?;
        self.count = self.count.checked_add(1).ok_or(ReferenceError::Overflow)?;
        let unit = UnitRef { x, y, occupancy };
        self.lists[owner.slot()].push(unit);
        Ok((owner, unit))
    }

    /// Drop the reference to the unit anchored at `(x, y)`.
    /// Must run before the unit is cleared from the grid.
    pub fn remove_reference(
        &mut self,
        grid: &Grid,
        x: u16,
        y: u16,
        occupancy: Occupancy,
    ) -> Result<(PlayerId, UnitRef), ReferenceError> {
        let owner = Self::owner_at(grid, x, y, occupancy)
            .ok_or(ReferenceError::InvalidUnit { x, y, occupancy })?;
        let count = self.count.checked_sub(1).ok_or(ReferenceError::Underflow)?;
        let unit = UnitRef { x, y, occupancy };
        let list = &mut self.lists[owner.slot()];
        let position = list
            .iter()
            .position(|entry| *entry == unit)
            .ok_or(ReferenceError::Missing { x, y, occupancy })?;
        list.remove(position);
        self.count = count;
        Ok((owner, unit))
    }

    /// Rebuild from the grid's anchor cells and start markers, row-major.
    pub fn recount(&mut self, grid: &Grid) -> Result<u16, ReferenceError> {
        self.clear();
        for (x, y, cell) in grid.iter() {
            for layer in Layer::ALL {
                let slot = cell.layer(layer);
                if slot.anchor && slot.unit.is_some() {
                    self.add_reference(grid, x, y, layer.into())?;
                }
            }
            if cell.start_location.is_some() {
                self.add_reference(grid, x, y, Occupancy::StartLocation)?;
            }
        }
        Ok(self.count)
    }
}
