use pudedit_core::placement::{self, Stamp};
use pudedit_core::{Grid, Layer, NullObserver, Occupancy, UnitIndex};
use pudedit_protocol::{PlayerId, UnitType};

#[test]
fn town_hall_at_two_two() {
    let mut grid = Grid::create(32, 32).unwrap();
    placement::place_unit(
        &mut grid,
        Stamp::new(UnitType::TownHall, PlayerId(0)),
        2,
        2,
        &mut NullObserver,
    )
    .unwrap();

    let anchor = &grid.cell_at(2, 2).below;
    assert!(anchor.anchor);
    assert_eq!((anchor.spread_x, anchor.spread_y), (4, 4));

    let corner = &grid.cell_at(5, 5).below;
    assert!(!corner.anchor);
    assert_eq!(corner.unit, Some(UnitType::TownHall));
    assert_eq!(corner.player, PlayerId(0));
}

#[test]
fn every_unit_type_has_one_anchor_with_its_footprint() {
    for unit in UnitType::ALL {
        if unit.is_start_location() {
            continue;
        }
        let mut grid = Grid::create(32, 32).unwrap();
        placement::place_unit(&mut grid, Stamp::new(unit, PlayerId(1)), 10, 10, &mut NullObserver)
            .unwrap();

        let layer = Layer::of(unit);
        let (w, h) = unit.footprint();
        let mut anchors = 0;
        for y in 10..10 + h as u16 {
            for x in 10..10 + w as u16 {
                let slot = grid.cell_at(x, y).layer(layer);
                assert_eq!(slot.unit, Some(unit), "{unit:?} missing at ({x}, {y})");
                if slot.anchor {
                    anchors += 1;
                    assert_eq!((slot.spread_x, slot.spread_y), (w, h));
                }
            }
        }
        assert_eq!(anchors, 1, "{unit:?}");
        let covered = grid
            .cells()
            .iter()
            .filter(|cell| cell.layer(layer).unit.is_some())
            .count();
        assert_eq!(covered, w as usize * h as usize, "{unit:?}");
    }
}

#[test]
fn index_follows_place_and_remove() {
    let mut grid = Grid::create(64, 64).unwrap();
    let mut index = UnitIndex::new();

    placement::place_unit(
        &mut grid,
        Stamp::new(UnitType::OrcBarracks, PlayerId(5)),
        40,
        40,
        &mut NullObserver,
    )
    .unwrap();
    index
        .add_reference(&grid, 40, 40, Occupancy::Below)
        .unwrap();
    assert_eq!(index.count(), 1);

    let (ax, ay) = placement::anchor_of(&grid, 42, 41, Layer::Below).unwrap();
    index.remove_reference(&grid, ax, ay, Occupancy::Below).unwrap();
    placement::remove(&mut grid, ax, ay, Layer::Below, &mut NullObserver).unwrap();

    assert_eq!(index.count(), 0);
    assert!(index.units_of(PlayerId(5)).is_empty());
    assert_eq!(index.recount(&grid), Ok(0));
}

#[test]
fn neighbouring_footprints_are_removed_independently() {
    let mut grid = Grid::create(32, 32).unwrap();
    placement::place_unit(&mut grid, Stamp::new(UnitType::Farm, PlayerId(0)), 0, 0, &mut NullObserver)
        .unwrap();
    placement::place_unit(&mut grid, Stamp::new(UnitType::Farm, PlayerId(0)), 2, 0, &mut NullObserver)
        .unwrap();
    assert!(!placement::can_place(&grid, UnitType::Farm, 1, 0));

    placement::remove(&mut grid, 1, 1, Layer::Below, &mut NullObserver).unwrap();
    assert!(grid.cell_at(0, 0).below.is_empty());
    assert!(grid.cell_at(1, 1).below.is_empty());
    assert!(grid.cell_at(2, 0).below.anchor);
    assert_eq!(grid.cell_at(3, 1).below.unit, Some(UnitType::Farm));
}
