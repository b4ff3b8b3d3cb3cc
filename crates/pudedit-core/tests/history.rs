use flate2::Compression;
use pudedit_core::{Grid, History, Snapshot, SnapshotError};

fn grid_with_tile(tile: u16) -> Grid {
    let mut grid = Grid::create(64, 64).unwrap();
    grid.cell_at_mut(10, 20).tile = tile;
    grid
}

fn tile_of(grid: &Grid) -> u16 {
    grid.cell_at(10, 20).tile
}

#[test]
fn pushing_past_capacity_loses_the_oldest_states() {
    let mut history = History::new(&grid_with_tile(0), 16, Compression::default(), 1 << 20).unwrap();
    for tile in 1..=17 {
        history.push(&grid_with_tile(tile)).unwrap();
    }
    assert_eq!(history.undo_len(), 16);

    let mut last = None;
    for _ in 0..16 {
        last = history.rollback(-1).unwrap();
    }
    // The earliest retained state is the first push, not the origin.
    assert_eq!(last.map(|grid| tile_of(&grid)), Some(1));

    assert!(matches!(
        history.rollback(-1),
        Err(SnapshotError::EmptyHistory {
            requested: 1,
            available: 0
        })
    ));
}

#[test]
fn pushing_the_same_grid_twice_then_undoing_restores_it() {
    let origin = grid_with_tile(0);
    let mut history = History::new(&origin, 16, Compression::fast(), 1 << 20).unwrap();
    let edited = grid_with_tile(0x71);
    history.push(&edited).unwrap();
    history.push(&edited).unwrap();

    let restored = history.rollback(-1).unwrap().unwrap();
    assert_eq!(restored, edited);
}

#[test]
fn multi_step_redo_walks_forward() {
    let mut history = History::new(&grid_with_tile(0), 8, Compression::default(), 1 << 20).unwrap();
    for tile in 1..=4 {
        history.push(&grid_with_tile(tile)).unwrap();
    }
    let grid = history.rollback(-3).unwrap().unwrap();
    assert_eq!(tile_of(&grid), 1);
    assert_eq!(history.redo_len(), 3);

    let grid = history.rollback(2).unwrap().unwrap();
    assert_eq!(tile_of(&grid), 3);
    assert!(matches!(
        history.rollback(2),
        Err(SnapshotError::EmptyHistory {
            requested: 2,
            available: 1
        })
    ));
}

#[test]
fn largest_map_fits_the_default_buffer() {
    let grid = Grid::create(128, 128).unwrap();
    let snapshot = Snapshot::capture(&grid, Compression::new(6), 4 * 1024 * 1024).unwrap();
    assert_eq!(snapshot.raw_len(), 128 * 128 * 20);
    assert!(snapshot.compressed_len() < snapshot.raw_len() / 10);
    assert_eq!(snapshot.restore().unwrap(), grid);
}
