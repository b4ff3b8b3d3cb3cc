//! Stamping and clearing multi-cell unit footprints.
//!
//! Footprints that run past the grid edge are clipped, never rejected. The
//! anchor cell records the clipped size, so a footprint always covers exactly
//! `spread_x * spread_y` cells starting at its anchor.
//!
//! Nothing here checks unit/unit overlap. Callers run [`can_place`] first.

use pudedit_protocol::{Orientation, PlayerId, UnitType};
use thiserror::Error;

use crate::cell::Layer;
use crate::grid::Grid;
use crate::observer::MapObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("start locations need a playing owner, not the neutral player")]
    NeutralStartLocation,
}

/// What gets stamped on every covered cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stamp {
    pub unit: UnitType,
    pub owner: PlayerId,
    pub orient: Orientation,
    pub alter: u16,
}

impl Stamp {
    pub fn new(unit: UnitType, owner: PlayerId) -> Self {
        Self {
            unit,
            owner,
            orient: Orientation::default(),
            alter: 0,
        }
    }

    pub fn with_orient(mut self, orient: Orientation) -> Self {
        self.orient = orient;
        self
    }

    pub fn with_alter(mut self, alter: u16) -> Self {
        self.alter = alter;
        self
    }
}

/// Rectangle actually written to the grid, after clipping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Footprint {
    pub x: u16,
    pub y: u16,
    pub w: u8,
    pub h: u8,
}

impl Footprint {
    /// Clip a `w * h` rectangle at `(x, y)` to the grid. `None` when nothing is left.
    pub fn clipped(grid: &Grid, x: u16, y: u16, w: u8, h: u8) -> Option<Self> {
        if !grid.in_bounds(x, y) || w == 0 || h == 0 {
            return None;
        }
        let w = (w as u16).min(grid.width() - x) as u8;
        let h = (h as u16).min(grid.height() - y) as u8;
        Some(Self { x, y, w, h })
    }

    /// Covered cells with their offset from the anchor.
    pub fn cells(self) -> impl Iterator<Item = (u16, u16, u8, u8)> {
        (0..self.h).flat_map(move |dy| {
            (0..self.w).map(move |dx| (self.x + dx as u16, self.y + dy as u16, dx, dy))
        })
    }
}

/// A unit taken off the grid by [`remove`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Removed {
    pub unit: UnitType,
    pub owner: PlayerId,
    pub footprint: Footprint,
}

/// Stamp `stamp` over the `w * h` rectangle at `(x, y)`.
///
/// Start-location types do not occupy a layer: they only mark the origin
/// cell. Returns the written footprint, or `None` when `(x, y)` is off the grid.
pub fn place<O: MapObserver + ?Sized>(
    grid: &mut Grid,
    stamp: Stamp,
    x: u16,
    y: u16,
    w: u8,
    h: u8,
    observer: &mut O,
) -> Result<Option<Footprint>, PlacementError> {
    if stamp.unit.is_start_location() {
        if stamp.owner.is_neutral() {
            return Err(PlacementError::NeutralStartLocation);
        }
        let Some(cell) = grid.get_mut(x, y) else {
            return Ok(None);
        };
        cell.start_location = Some(stamp.owner);
        cell.start_location_human = stamp.unit == UnitType::HumanStart;
        observer.minimap_update(x, y);
        return Ok(Some(Footprint { x, y, w: 1, h: 1 }));
    }

    let Some(footprint) = Footprint::clipped(grid, x, y, w, h) else {
        return Ok(None);
    };
    let layer = Layer::of(stamp.unit);
    for (cx, cy, dx, dy) in footprint.cells() {
        let slot = grid.cell_at_mut(cx, cy).layer_mut(layer);
        slot.unit = Some(stamp.unit);
        slot.player = stamp.owner;
        slot.orient = stamp.orient;
        slot.alter = stamp.alter;
        slot.anchor = false;
        slot.spread_x = dx;
        slot.spread_y = dy;
        slot.selected = false;
    }
    let anchor = grid.cell_at_mut(x, y).layer_mut(layer);
    anchor.anchor = true;
    anchor.spread_x = footprint.w;
    anchor.spread_y = footprint.h;

    observer.minimap_update(x, y);
    Ok(Some(footprint))
}

/// Stamp `unit` with its table footprint.
pub fn place_unit<O: MapObserver + ?Sized>(
    grid: &mut Grid,
    stamp: Stamp,
    x: u16,
    y: u16,
    observer: &mut O,
) -> Result<Option<Footprint>, PlacementError> {
    let (w, h) = stamp.unit.footprint();
    place(grid, stamp, x, y, w, h, observer)
}

/// Anchor of the unit covering `(x, y)` in `layer`.
pub fn anchor_of(grid: &Grid, x: u16, y: u16, layer: Layer) -> Option<(u16, u16)> {
    let slot = grid.get(x, y)?.layer(layer);
    let unit = slot.unit?;
    if slot.anchor {
        return Some((x, y));
    }
    let ax = x.checked_sub(slot.spread_x as u16)?;
    let ay = y.checked_sub(slot.spread_y as u16)?;
    let anchor = grid.get(ax, ay)?.layer(layer);
    (anchor.anchor && anchor.unit == Some(unit)).then_some((ax, ay))
}

/// Whether `unit` fits at `(x, y)` without covering another unit of its layer.
pub fn can_place(grid: &Grid, unit: UnitType, x: u16, y: u16) -> bool {
    if unit.is_start_location() {
        return grid
            .get(x, y)
            .is_some_and(|cell| cell.start_location.is_none());
    }
    let (w, h) = unit.footprint();
    let Some(footprint) = Footprint::clipped(grid, x, y, w, h) else {
        return false;
    };
    let layer = Layer::of(unit);
    footprint
        .cells()
        .all(|(cx, cy, _, _)| grid.cell_at(cx, cy).layer(layer).is_empty())
}

/// Clear the whole footprint covering `(x, y)` in `layer`.
///
/// Any covered cell may be given. Cells inside the rectangle that belong to
/// a different unit are left alone.
pub fn remove<O: MapObserver + ?Sized>(
    grid: &mut Grid,
    x: u16,
    y: u16,
    layer: Layer,
    observer: &mut O,
) -> Option<Removed> {
    let (ax, ay) = anchor_of(grid, x, y, layer)?;
    let anchor = *grid.cell_at(ax, ay).layer(layer);
    let unit = anchor.unit?;
    let footprint = Footprint::clipped(grid, ax, ay, anchor.spread_x, anchor.spread_y)?;

    for (cx, cy, dx, dy) in footprint.cells() {
        let slot = grid.cell_at_mut(cx, cy).layer_mut(layer);
        let ours = slot.unit == Some(unit)
            && slot.player == anchor.player
            && if dx == 0 && dy == 0 {
                slot.anchor
            } else {
                !slot.anchor && slot.spread_x == dx && slot.spread_y == dy
            };
        if ours {
            *slot = Default::default();
        }
    }

    observer.minimap_render(footprint.x, footprint.y, footprint.w as u16, footprint.h as u16);
    Some(Removed {
        unit,
        owner: anchor.player,
        footprint,
    })
}

/// Clear the start marker on `(x, y)`, returning its player.
pub fn remove_start_location<O: MapObserver + ?Sized>(
    grid: &mut Grid,
    x: u16,
    y: u16,
    observer: &mut O,
) -> Option<PlayerId> {
    let cell = grid.get_mut(x, y)?;
    let player = cell.start_location.take()?;
    cell.start_location_human = false;
    observer.minimap_update(x, y);
    Some(player)
}
