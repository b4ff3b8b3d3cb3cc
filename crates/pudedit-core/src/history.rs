//! Compressed full-grid snapshots and the bounded undo/redo history.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use thiserror::Error;
use tracing::{debug, error};

use crate::grid::Grid;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot compression failed: {0}")]
    Compression(#[source] io::Error),
    #[error("compressed snapshot exceeds the {capacity} byte buffer")]
    BufferExhausted { capacity: usize },
    #[error("cannot step {requested} entries, only {available} available")]
    EmptyHistory { requested: usize, available: usize },
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
}

/// Output sink with a hard byte limit.
struct BoundedBuffer {
    bytes: Vec<u8>,
    limit: usize,
    exhausted: bool,
}

impl Write for BoundedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.bytes.len() + buf.len() > self.limit {
            self.exhausted = true;
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "snapshot buffer exhausted",
            ));
        }
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Immutable zlib-compressed capture of a whole grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    width: u16,
    height: u16,
    raw_len: usize,
    data: Vec<u8>,
}

impl Snapshot {
    /// Pack and compress `grid`. Fails rather than grow past `buffer_bytes`.
    pub fn capture(
        grid: &Grid,
        level: Compression,
        buffer_bytes: usize,
    ) -> Result<Self, SnapshotError> {
        let raw = grid.pack();
        let sink = BoundedBuffer {
            bytes: Vec::new(),
            limit: buffer_bytes,
            exhausted: false,
        };
        let mut encoder = ZlibEncoder::new(sink, level);
        let written = encoder.write_all(&raw).and_then(|()| encoder.try_finish());
        if let Err(err) = written {
            return Err(if encoder.get_ref().exhausted {
                SnapshotError::BufferExhausted {
                    capacity: buffer_bytes,
                }
            } else {
                SnapshotError::Compression(err)
            });
        }
        let sink = encoder.finish().map_err(SnapshotError::Compression)?;
        Ok(Self {
            width: grid.width(),
            height: grid.height(),
            raw_len: raw.len(),
            data: sink.bytes,
        })
    }

    /// Decompress into a fresh grid. The caller's grid is never touched.
    pub fn restore(&self) -> Result<Grid, SnapshotError> {
        let mut raw = Vec::with_capacity(self.raw_len);
        ZlibDecoder::new(self.data.as_slice())
            .read_to_end(&mut raw)
            .map_err(|err| SnapshotError::Corrupt(err.to_string()))?;
        if raw.len() != self.raw_len {
            return Err(SnapshotError::Corrupt(format!(
                "inflated to {} bytes, expected {}",
                raw.len(),
                self.raw_len
            )));
        }
        Grid::unpack(self.width, self.height, &raw)
            .map_err(|err| SnapshotError::Corrupt(err.to_string()))
    }

    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    pub fn compressed_len(&self) -> usize {
        self.data.len()
    }

    #[cfg(test)]
    pub(crate) fn corrupt(&mut self) {
        self.data.truncate(self.data.len() / 2);
    }
}

/// Linear undo/redo history over snapshots.
///
/// `current` is the state the live grid was last captured or restored as and
/// is always present. Undo entries are older states, oldest first; redo
/// entries are newer states, nearest last.
#[derive(Debug)]
pub struct History {
    current: Snapshot,
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    capacity: usize,
    level: Compression,
    buffer_bytes: usize,
}

impl History {
    /// Start a history whose baseline is `grid`.
    pub fn new(
        grid: &Grid,
        capacity: usize,
        level: Compression,
        buffer_bytes: usize,
    ) -> Result<Self, SnapshotError> {
        let current = Snapshot::capture(grid, level, buffer_bytes)?;
        Ok(Self {
            current,
            undo: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity,
            level,
            buffer_bytes,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Capture `grid` as the new current state.
    ///
    /// On failure nothing changes: the history simply has no entry for this edit.
    pub fn push(&mut self, grid: &Grid) -> Result<(), SnapshotError> {
        let snapshot = Snapshot::capture(grid, self.level, self.buffer_bytes)?;
        debug!(
            raw = snapshot.raw_len(),
            compressed = snapshot.compressed_len(),
            "snapshot pushed"
        );
        let previous = std::mem::replace(&mut self.current, snapshot);
        self.undo.push_back(previous);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
            debug!(capacity = self.capacity, "oldest snapshot evicted");
        }
        if !self.redo.is_empty() {
            debug!(dropped = self.redo.len(), "redo history invalidated");
            self.redo.clear();
        }
        Ok(())
    }

    /// Step `offset` entries back (negative) or forward (positive).
    ///
    /// Returns the restored grid, or `None` for `offset == 0`. The target is
    /// decompressed before the stacks move, so a failure leaves both the
    /// history and the caller's grid as they were.
    pub fn rollback(&mut self, offset: isize) -> Result<Option<Grid>, SnapshotError> {
        let steps = offset.unsigned_abs();
        if steps == 0 {
            return Ok(None);
        }
        let available = if offset < 0 {
            self.undo.len()
        } else {
            self.redo.len()
        };
        if steps > available {
            return Err(SnapshotError::EmptyHistory {
                requested: steps,
                available,
            });
        }

        let target = if offset < 0 {
            &self.undo[available - steps]
        } else {
            &self.redo[available - steps]
        };
        let grid = target.restore().map_err(|err| {
            error!(%err, offset, "snapshot restore failed");
            err
        })?;

        for _ in 0..steps {
            if offset < 0 {
                if let Some(previous) = self.undo.pop_back() {
                    let newer = std::mem::replace(&mut self.current, previous);
                    self.redo.push(newer);
                }
            } else if let Some(next) = self.redo.pop() {
                let older = std::mem::replace(&mut self.current, next);
                self.undo.push_back(older);
            }
        }
        debug!(
            offset,
            undo = self.undo.len(),
            redo = self.redo.len(),
            "rolled back"
        );
        Ok(Some(grid))
    }

    #[cfg(test)]
    pub(crate) fn undo_entries_mut(&mut self) -> impl Iterator<Item = &mut Snapshot> {
        self.undo.iter_mut()
    }
}

/// Coalesces snapshot requests into one capture after a fixed delay.
///
/// The host's event loop calls [`Debouncer::poll`] with the current time;
/// there is no background timer.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: u32,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: 0,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Record a request. Only the first one arms the timer.
    pub fn request(&mut self, now: Instant) -> bool {
        self.pending = self.pending.saturating_add(1);
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(now + self.delay);
        true
    }

    /// `true` exactly once when the armed deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.disarm();
                true
            }
            _ => false,
        }
    }

    /// Fire early if anything is pending.
    pub fn flush(&mut self) -> bool {
        let armed = self.deadline.is_some();
        self.disarm();
        armed
    }

    fn disarm(&mut self) {
        self.pending = 0;
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pudedit_protocol::{PlayerId, UnitType};

    fn grid_with_tile(tile: u16) -> Grid {
        let mut grid = Grid::create(32, 32).unwrap();
        grid.cell_at_mut(0, 0).tile = tile;
        grid
    }

    fn history(capacity: usize) -> History {
        History::new(&grid_with_tile(0), capacity, Compression::default(), 1 << 20).unwrap()
    }

    #[test]
    fn capture_restores_grid() {
        let mut grid = grid_with_tile(0x55);
        let slot = &mut grid.cell_at_mut(3, 3).below;
        slot.unit = Some(UnitType::Peasant);
        slot.player = PlayerId(2);
        slot.anchor = true;
        slot.spread_x = 1;
        slot.spread_y = 1;
        slot.selected = true;

        let snapshot = Snapshot::capture(&grid, Compression::best(), 1 << 20).unwrap();
        assert_eq!(snapshot.raw_len(), grid.packed_len());
        assert!(snapshot.compressed_len() < snapshot.raw_len());

        let restored = snapshot.restore().unwrap();
        assert!(restored.persisted_eq(&grid));
        assert!(!restored.cell_at(3, 3).below.selected);
    }

    #[test]
    fn tiny_buffer_is_exhausted() {
        let grid = grid_with_tile(0x55);
        let err = Snapshot::capture(&grid, Compression::default(), 8).unwrap_err();
        assert!(matches!(err, SnapshotError::BufferExhausted { capacity: 8 }));
    }

    #[test]
    fn corrupt_snapshot_is_reported() {
        let mut snapshot = Snapshot::capture(&grid_with_tile(1), Compression::default(), 1 << 20)
            .unwrap();
        snapshot.corrupt();
        assert!(matches!(snapshot.restore(), Err(SnapshotError::Corrupt(_))));
    }

    #[test]
    fn undo_then_redo() {
        let mut history = history(16);
        history.push(&grid_with_tile(1)).unwrap();
        history.push(&grid_with_tile(2)).unwrap();

        let grid = history.rollback(-2).unwrap().unwrap();
        assert_eq!(grid.cell_at(0, 0).tile, 0);
        assert_eq!((history.undo_len(), history.redo_len()), (0, 2));

        let grid = history.rollback(1).unwrap().unwrap();
        assert_eq!(grid.cell_at(0, 0).tile, 1);
        assert_eq!((history.undo_len(), history.redo_len()), (1, 1));
    }

    #[test]
    fn zero_offset_is_a_no_op() {
        let mut history = history(16);
        assert!(history.rollback(0).unwrap().is_none());
    }

    #[test]
    fn push_evicts_oldest_and_clears_redo() {
        let mut history = history(2);
        for tile in 1..=3 {
            history.push(&grid_with_tile(tile)).unwrap();
        }
        assert_eq!(history.undo_len(), 2);

        history.rollback(-1).unwrap();
        assert_eq!(history.redo_len(), 1);
        history.push(&grid_with_tile(9)).unwrap();
        assert_eq!(history.redo_len(), 0);
        assert!(matches!(
            history.rollback(1),
            Err(SnapshotError::EmptyHistory {
                requested: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn failed_restore_leaves_history_untouched() {
        let mut history = history(16);
        history.push(&grid_with_tile(1)).unwrap();
        for snapshot in history.undo_entries_mut() {
            snapshot.corrupt();
        }
        assert!(matches!(history.rollback(-1), Err(SnapshotError::Corrupt(_))));
        assert_eq!((history.undo_len(), history.redo_len()), (1, 0));
        assert_eq!(history.current().restore().unwrap().cell_at(0, 0).tile, 1);
    }

    #[test]
    fn debouncer_coalesces_requests() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(3));
        assert!(debouncer.request(start));
        assert!(!debouncer.request(start + Duration::from_secs(1)));
        assert_eq!(debouncer.pending(), 2);

        assert!(!debouncer.poll(start + Duration::from_secs(2)));
        assert!(debouncer.poll(start + Duration::from_secs(3)));
        assert!(!debouncer.poll(start + Duration::from_secs(4)));
        assert_eq!(debouncer.pending(), 0);
    }

    #[test]
    fn debouncer_flush_fires_once() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        assert!(!debouncer.flush());
        debouncer.request(Instant::now());
        assert!(debouncer.flush());
        assert!(!debouncer.flush());
    }
}
