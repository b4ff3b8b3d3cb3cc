//! One open map: grid, unit index, metadata, history and the UI observer.

use std::path::Path;
use std::time::Instant;

use pudedit_protocol::{
    is_supported_size, CodecError, Era, MapCodec, MapFile, Orientation, PlayerId, PlayerSettings,
    UnitType, ValidationError,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::cell::{Cell, Layer};
use crate::config::{ConfigError, EditorConfig};
use crate::grid::{Grid, GridError};
use crate::history::{Debouncer, History, SnapshotError};
use crate::index::{Occupancy, ReferenceError, UnitIndex};
use crate::observer::{MapObserver, NullObserver};
use crate::placement::{self, Footprint, PlacementError, Removed, Stamp};
use crate::sync::{self, MapMeta, SyncError};
use crate::terrain::TILE_MASK;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("unsupported map size {width}x{height}")]
    UnsupportedSize { width: u16, height: u16 },
    #[error("({x}, {y}) is outside the map")]
    OutOfBounds { x: u16, y: u16 },
    #[error("({x}, {y}) is already occupied")]
    Occupied { x: u16, y: u16 },
    #[error("no {layer:?} unit at ({x}, {y})")]
    NoUnit { x: u16, y: u16, layer: Layer },
    #[error("player {0:?} has no start location")]
    NoStartLocation(PlayerId),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Editing session for a single map.
///
/// All grid mutation goes through here so the unit index, the history and
/// the observer stay in step with the grid.
#[derive(Debug)]
pub struct EditorSession<O: MapObserver = NullObserver> {
    config: EditorConfig,
    grid: Grid,
    units: UnitIndex,
    meta: MapMeta,
    history: History,
    debouncer: Debouncer,
    observer: O,
    dirty: bool,
}

impl EditorSession<NullObserver> {
    /// Blank map without an observer.
    pub fn blank(width: u16, height: u16, config: EditorConfig) -> Result<Self, EditorError> {
        Self::new(width, height, config, NullObserver)
    }
}

impl<O: MapObserver> EditorSession<O> {
    /// Blank map filled with the configured default tile.
    pub fn new(
        width: u16,
        height: u16,
        config: EditorConfig,
        mut observer: O,
    ) -> Result<Self, EditorError> {
        if !is_supported_size(width) || !is_supported_size(height) {
            return Err(EditorError::UnsupportedSize { width, height });
        }
        config.validate()?;
        let grid = Grid::filled(width, height, Cell::with_tile(config.default_tile))?;
        observer.minimap_render(0, 0, width, height);
        observer.units_recounted(0);
        Self::assemble(config, grid, UnitIndex::new(), MapMeta::default(), observer)
    }

    /// Session over a parsed map file.
    pub fn from_map_file(
        file: &MapFile,
        config: EditorConfig,
        mut observer: O,
    ) -> Result<Self, EditorError> {
        config.validate()?;
        let (grid, units, meta) = sync::expand(file, &mut observer)?;
        Self::assemble(config, grid, units, meta, observer)
    }

    pub fn open<C: MapCodec>(
        codec: &C,
        path: &Path,
        config: EditorConfig,
        observer: O,
    ) -> Result<Self, EditorError> {
        let file = codec.open(path)?;
        let session = Self::from_map_file(&file, config, observer)?;
        info!(
            path = %path.display(),
            width = file.width,
            height = file.height,
            units = session.units.count(),
            "map opened"
        );
        Ok(session)
    }

    fn assemble(
        config: EditorConfig,
        grid: Grid,
        units: UnitIndex,
        meta: MapMeta,
        observer: O,
    ) -> Result<Self, EditorError> {
        let history = History::new(
            &grid,
            config.history_capacity,
            config.compression(),
            config.snapshot_buffer_bytes,
        )?;
        let debouncer = Debouncer::new(config.snapshot_delay());
        Ok(Self {
            config,
            grid,
            units,
            meta,
            history,
            debouncer,
            observer,
            dirty: false,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn units(&self) -> &UnitIndex {
        &self.units
    }

    pub fn meta(&self) -> &MapMeta {
        &self.meta
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Changed since the last open or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flatten the session into the file model.
    pub fn to_map_file(&self) -> Result<MapFile, SyncError> {
        sync::flatten(&self.grid, &self.meta, self.units.count() as usize)
    }

    /// Flatten, validate and write. Nothing is written if any step fails.
    pub fn save<C: MapCodec>(&mut self, codec: &C, path: &Path) -> Result<(), EditorError> {
        let file = self.to_map_file()?;
        codec.check(&file)?;
        codec.write(&file, path)?;
        self.dirty = false;
        info!(path = %path.display(), units = file.units_count(), "map saved");
        Ok(())
    }

    fn edited(&mut self) {
        self.dirty = true;
        self.observer.document_changed();
        self.request_snapshot(Instant::now());
    }

    fn list(&mut self, x: u16, y: u16, occupancy: Occupancy) -> Result<(), ReferenceError> {
        match self.units.add_reference(&self.grid, x, y, occupancy) {
            Ok((owner, unit)) => {
                self.observer.unit_listed(owner, unit);
                Ok(())
            }
            Err(err) => {
                error!(%err, x, y, ?occupancy, "unit index out of step with grid");
                Err(err)
            }
        }
    }

    fn unlist(&mut self, x: u16, y: u16, occupancy: Occupancy) -> Result<(), ReferenceError> {
        match self.units.remove_reference(&self.grid, x, y, occupancy) {
            Ok((owner, unit)) => {
                self.observer.unit_unlisted(owner, unit);
                Ok(())
            }
            Err(err) => {
                error!(%err, x, y, ?occupancy, "unit index out of step with grid");
                Err(err)
            }
        }
    }

    /// Place `unit` with its table footprint, anchored at `(x, y)`.
    ///
    /// The footprint must be free in the unit's layer. A start location for a
    /// player who already has one moves the marker. `alter` is stored as
    /// given: a resource amount on mines and patches, a flag on other units.
    pub fn place_unit(
        &mut self,
        unit: UnitType,
        owner: PlayerId,
        orient: Orientation,
        x: u16,
        y: u16,
        alter: u16,
    ) -> Result<Footprint, EditorError> {
        if !self.grid.in_bounds(x, y) {
            return Err(EditorError::OutOfBounds { x, y });
        }
        if !placement::can_place(&self.grid, unit, x, y) {
            return Err(EditorError::Occupied { x, y });
        }

        let mut moved_from = None;
        if unit.is_start_location() {
            if owner.is_neutral() {
                return Err(PlacementError::NeutralStartLocation.into());
            }
            moved_from = self.units.start_location_of(owner);
        }
        if moved_from.is_none() && self.units.is_full() {
            return Err(ReferenceError::Overflow.into());
        }
        if let Some((sx, sy)) = moved_from {
            self.unlist(sx, sy, Occupancy::StartLocation)?;
            placement::remove_start_location(&mut self.grid, sx, sy, &mut self.observer);
            debug!(player = owner.0, from = ?(sx, sy), to = ?(x, y), "start location moved");
        }

        let stamp = Stamp::new(unit, owner).with_orient(orient).with_alter(alter);
        let footprint = placement::place_unit(&mut self.grid, stamp, x, y, &mut self.observer)?
            .ok_or(EditorError::OutOfBounds { x, y })?;

        let occupancy = if unit.is_start_location() {
            Occupancy::StartLocation
        } else {
            Layer::of(unit).into()
        };
        self.list(x, y, occupancy)?;
        self.edited();
        Ok(footprint)
    }

    /// Remove the unit covering `(x, y)` in `layer`.
    pub fn remove_unit(&mut self, x: u16, y: u16, layer: Layer) -> Result<Removed, EditorError> {
        let (ax, ay) = placement::anchor_of(&self.grid, x, y, layer)
            .ok_or(EditorError::NoUnit { x, y, layer })?;
        self.unlist(ax, ay, layer.into())?;
        let removed = placement::remove(&mut self.grid, ax, ay, layer, &mut self.observer)
            .ok_or(EditorError::NoUnit { x, y, layer })?;
        self.edited();
        Ok(removed)
    }

    /// Remove `player`'s start marker, returning where it was.
    pub fn remove_start_location(&mut self, player: PlayerId) -> Result<(u16, u16), EditorError> {
        let (x, y) = self
            .units
            .start_location_of(player)
            .ok_or(EditorError::NoStartLocation(player))?;
        self.unlist(x, y, Occupancy::StartLocation)?;
        placement::remove_start_location(&mut self.grid, x, y, &mut self.observer);
        self.edited();
        Ok((x, y))
    }

    /// Set the raw tile id of one cell. Autotiling is up to the caller.
    pub fn paint_tile(&mut self, x: u16, y: u16, tile: u16) -> Result<(), EditorError> {
        let cell = self
            .grid
            .get_mut(x, y)
            .ok_or(EditorError::OutOfBounds { x, y })?;
        cell.tile = tile & TILE_MASK;
        self.observer.minimap_update(x, y);
        self.edited();
        Ok(())
    }

    /// Select or deselect the whole unit covering `(x, y)` in `layer`.
    pub fn set_selected(
        &mut self,
        x: u16,
        y: u16,
        layer: Layer,
        selected: bool,
    ) -> Result<(), EditorError> {
        let (ax, ay) = placement::anchor_of(&self.grid, x, y, layer)
            .ok_or(EditorError::NoUnit { x, y, layer })?;
        let anchor = *self.grid.cell_at(ax, ay).layer(layer);
        let Some(footprint) =
            Footprint::clipped(&self.grid, ax, ay, anchor.spread_x, anchor.spread_y)
        else {
            return Err(EditorError::NoUnit { x, y, layer });
        };
        for (cx, cy, _, _) in footprint.cells() {
            if placement::anchor_of(&self.grid, cx, cy, layer) == Some((ax, ay)) {
                self.grid.cell_at_mut(cx, cy).layer_mut(layer).selected = selected;
            }
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for cell in self.grid.cells_mut() {
            cell.below.selected = false;
            cell.above.selected = false;
        }
    }

    /// Anchors of the selected units.
    pub fn selection(&self) -> Vec<(u16, u16, Layer)> {
        let mut selected = Vec::new();
        for (x, y, cell) in self.grid.iter() {
            for layer in Layer::ALL {
                let slot = cell.layer(layer);
                if slot.anchor && slot.selected && slot.unit.is_some() {
                    selected.push((x, y, layer));
                }
            }
        }
        selected
    }

    pub fn set_era(&mut self, era: Era) {
        self.meta.era = era;
        self.dirty = true;
        self.observer.document_changed();
    }

    pub fn set_description(&mut self, text: &str) {
        self.meta.set_description(text);
        self.dirty = true;
        self.observer.document_changed();
    }

    pub fn player_settings(&self, player: PlayerId) -> &PlayerSettings {
        self.meta.settings(player)
    }

    /// Mutable settings of `player`; the document is marked changed.
    pub fn player_settings_mut(&mut self, player: PlayerId) -> &mut PlayerSettings {
        self.dirty = true;
        self.observer.document_changed();
        self.meta.settings_mut(player)
    }

    /// Ask for a snapshot after the configured delay. Returns whether this
    /// request armed the timer.
    pub fn request_snapshot(&mut self, now: Instant) -> bool {
        self.debouncer.request(now)
    }

    /// Deadline of the pending capture, for hosts scheduling a wake-up.
    pub fn snapshot_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Drive the debounce timer. Returns `true` when a snapshot was pushed.
    pub fn poll(&mut self, now: Instant) -> Result<bool, SnapshotError> {
        if !self.debouncer.poll(now) {
            return Ok(false);
        }
        self.force_push()?;
        Ok(true)
    }

    /// Capture the grid now, settling any pending request.
    /// On failure the edits stay, only the undo point is lost.
    pub fn force_push(&mut self) -> Result<(), SnapshotError> {
        self.debouncer.flush();
        self.history.push(&self.grid).map_err(|err| {
            warn!(%err, "snapshot not taken");
            err
        })
    }

    pub fn undo(&mut self, steps: usize) -> Result<bool, EditorError> {
        let offset = isize::try_from(steps).map_err(|_| SnapshotError::EmptyHistory {
            requested: steps,
            available: self.history.undo_len(),
        })?;
        self.rollback(-offset)
    }

    pub fn redo(&mut self, steps: usize) -> Result<bool, EditorError> {
        let offset = isize::try_from(steps).map_err(|_| SnapshotError::EmptyHistory {
            requested: steps,
            available: self.history.redo_len(),
        })?;
        self.rollback(offset)
    }

    /// Move through history: negative offsets undo, positive redo.
    ///
    /// A pending debounced capture is taken first so recent edits get their
    /// own undo point. If that capture fails, the first step back lands on
    /// the last captured state. The grid is swapped only after the target
    /// snapshot decoded in full.
    pub fn rollback(&mut self, offset: isize) -> Result<bool, EditorError> {
        if offset == 0 {
            return Ok(false);
        }
        let uncaptured = self.debouncer.deadline().is_some() && self.force_push().is_err();
        let result = if uncaptured && offset < 0 {
            // The live grid has no snapshot of its own; `current` is one step back.
            match offset + 1 {
                0 => self.history.current().restore().map(Some),
                rest => self.history.rollback(rest).map_err(|err| match err {
                    SnapshotError::EmptyHistory {
                        requested,
                        available,
                    } => SnapshotError::EmptyHistory {
                        requested: requested + 1,
                        available: available + 1,
                    },
                    other => other,
                }),
            }
        } else {
            self.history.rollback(offset)
        };
        let grid = match result {
            Ok(Some(grid)) => grid,
            Ok(None) => return Ok(false),
            Err(SnapshotError::EmptyHistory {
                requested,
                available,
            }) => {
                debug!(offset, available, "nothing to roll back to");
                return Err(SnapshotError::EmptyHistory {
                    requested,
                    available,
                }
                .into());
            }
            Err(err) => return Err(err.into()),
        };
        self.grid = grid;

        let count = self.units.recount(&self.grid).map_err(|err| {
            error!(%err, "unit recount after rollback failed");
            err
        })?;
        self.observer
            .minimap_render(0, 0, self.grid.width(), self.grid.height());
        self.observer.units_recounted(count);
        self.dirty = true;
        self.observer.document_changed();
        Ok(true)
    }
}
