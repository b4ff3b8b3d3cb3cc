use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flate2::Compression;
use pudedit_core::placement::{self, Stamp};
use pudedit_core::{Grid, History, NullObserver, Snapshot};
use pudedit_protocol::{PlayerId, UnitType};

fn busy_map() -> Grid {
    let mut grid = Grid::create(128, 128).unwrap();
    for (index, cell) in grid.cells_mut().iter_mut().enumerate() {
        cell.tile = 0x0050 + (index % 7) as u16;
    }
    for y in (0..128).step_by(8) {
        for x in (0..128).step_by(8) {
            let unit = if (x + y) % 16 == 0 {
                UnitType::Farm
            } else {
                UnitType::Footman
            };
            let owner = PlayerId(((x / 8) % 8) as u8);
            placement::place_unit(&mut grid, Stamp::new(unit, owner), x, y, &mut NullObserver)
                .expect("place");
        }
    }
    grid
}

fn bench_snapshot(c: &mut Criterion) {
    let grid = busy_map();
    let mut group = c.benchmark_group("pudedit-core/snapshot");

    group.bench_function("capture_128", |b| {
        b.iter(|| {
            let snapshot = Snapshot::capture(&grid, Compression::new(6), 4 << 20).expect("capture");
            black_box(snapshot.compressed_len());
        })
    });

    let snapshot = Snapshot::capture(&grid, Compression::new(6), 4 << 20).expect("capture");
    group.bench_function("restore_128", |b| {
        b.iter(|| {
            let restored = snapshot.restore().expect("restore");
            black_box(restored.len());
        })
    });

    group.bench_function("push_undo_redo_128", |b| {
        let mut history = History::new(&grid, 16, Compression::new(6), 4 << 20).expect("history");
        b.iter(|| {
            history.push(&grid).expect("push");
            let undone = history.rollback(-1).expect("undo");
            black_box(undone.map(|grid| grid.len()));
            let redone = history.rollback(1).expect("redo");
            black_box(redone.map(|grid| grid.len()));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_snapshot);
criterion_main!(benches);
