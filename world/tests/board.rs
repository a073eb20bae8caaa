use std::collections::{HashMap, HashSet};

use delve_core::{Coord, EntityKind, Event, GridError, TileLayer, TileRef};
use delve_world::{query, Board, BorderRule, Enemy, Food};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Default)]
struct Tiles(HashMap<Coord, TileRef>);

impl TileLayer for Tiles {
    fn tile(&self, cell: Coord) -> Option<TileRef> {
        self.0.get(&cell).copied()
    }

    fn set_tile(&mut self, cell: Coord, tile: TileRef) {
        let _ = self.0.insert(cell, tile);
    }
}

fn board(width: u32, height: u32) -> Board {
    Board::new(width, height, BorderRule::default(), &[])
}

#[test]
fn border_is_impassable_and_interior_is_pooled() {
    let board = board(6, 5);

    for y in 0..5 {
        for x in 0..6 {
            let cell = Coord::new(x, y);
            let border = x == 0 || y == 0 || x == 5 || y == 4;
            let slot = board.cell_at(cell).expect("cell in bounds");
            assert_eq!(slot.is_passable(), !border, "passability of {cell}");
            assert_eq!(board.is_empty_cell(cell), !border, "pool membership of {cell}");
        }
    }
    assert_eq!(board.empty_count(), 4 * 3);
    board.verify().expect("fresh board is consistent");
}

#[test]
fn reserved_cells_are_withheld_from_pool() {
    let spawn = Coord::new(1, 1);
    let exit = Coord::new(4, 3);
    let board = Board::new(6, 5, BorderRule::default(), &[spawn, exit]);

    assert!(!board.is_empty_cell(spawn));
    assert!(!board.is_empty_cell(exit));
    assert!(board.is_claimed(spawn));
    assert_eq!(board.empty_count(), 10);
    board.verify().expect("reserved board is consistent");
}

#[test]
fn cell_at_fails_softly_out_of_bounds() {
    let board = board(4, 4);
    assert!(board.cell_at(Coord::new(-1, 0)).is_none());
    assert!(board.cell_at(Coord::new(0, 4)).is_none());
    assert!(board.cell_at(Coord::new(4, 0)).is_none());
    assert!(board.cell_at(Coord::new(3, 3)).is_some());
}

#[test]
fn placement_reports_each_failure() {
    let mut board = board(5, 5);
    let mut tiles = Tiles::default();

    assert_eq!(
        board.place_occupant(Food::default(), Coord::new(9, 9), &mut tiles),
        Err(GridError::OutOfBounds {
            cell: Coord::new(9, 9)
        })
    );
    assert_eq!(
        board.place_occupant(Food::default(), Coord::new(0, 2), &mut tiles),
        Err(GridError::Impassable {
            cell: Coord::new(0, 2)
        })
    );

    let cell = Coord::new(2, 2);
    let _ = board
        .place_occupant(Food::default(), cell, &mut tiles)
        .expect("first placement succeeds");
    assert_eq!(
        board.place_occupant(Enemy::default(), cell, &mut tiles),
        Err(GridError::CellOccupied { cell })
    );
    assert_eq!(board.entity_count(), 1);
    board.verify().expect("failed placements leave board consistent");
}

#[test]
fn placing_then_destroying_restores_occupancy() {
    let mut board = board(7, 7);
    let mut tiles = Tiles::default();
    let before: HashSet<Coord> = board.empty_cells().iter().copied().collect();

    let cell = Coord::new(3, 4);
    let id = board
        .place_occupant(Enemy::default(), cell, &mut tiles)
        .expect("placement succeeds");
    assert_eq!(board.occupant(cell), Some(id));
    assert!(!board.is_empty_cell(cell));

    let removed = board.vacate(cell).expect("occupant removed");
    assert_eq!(removed.kind(), EntityKind::Enemy);

    let after: HashSet<Coord> = board.empty_cells().iter().copied().collect();
    assert_eq!(before, after);
    assert_eq!(board.occupant(cell), None);
    assert_eq!(board.entity_count(), 0);
    board.verify().expect("round trip keeps board consistent");
}

#[test]
fn vacating_empty_cell_is_a_no_op() {
    let mut board = board(5, 5);
    assert!(board.vacate(Coord::new(2, 2)).is_none());
    assert!(board.vacate(Coord::new(-3, 2)).is_none());
    assert_eq!(board.empty_count(), 9);
}

#[test]
fn relocation_keeps_identity_and_pool() {
    let mut board = board(6, 6);
    let mut tiles = Tiles::default();
    let from = Coord::new(2, 2);
    let to = Coord::new(3, 2);
    let id = board
        .place_occupant(Enemy::default(), from, &mut tiles)
        .expect("placement succeeds");

    assert_eq!(board.relocate(id, to), Ok(from));
    assert_eq!(board.occupant(to), Some(id));
    assert_eq!(board.occupant(from), None);
    assert!(board.is_empty_cell(from));
    assert!(!board.is_empty_cell(to));
    assert_eq!(query::position_of(&board, id), Some(to));
    board.verify().expect("relocation keeps board consistent");
}

#[test]
fn failed_relocation_leaves_board_untouched() {
    let mut board = board(6, 6);
    let mut tiles = Tiles::default();
    let enemy = board
        .place_occupant(Enemy::default(), Coord::new(1, 1), &mut tiles)
        .expect("placement succeeds");
    let _ = board
        .place_occupant(Food::default(), Coord::new(2, 1), &mut tiles)
        .expect("placement succeeds");

    assert_eq!(
        board.relocate(enemy, Coord::new(0, 1)),
        Err(GridError::Impassable {
            cell: Coord::new(0, 1)
        })
    );
    assert_eq!(
        board.relocate(enemy, Coord::new(2, 1)),
        Err(GridError::CellOccupied {
            cell: Coord::new(2, 1)
        })
    );
    assert_eq!(query::position_of(&board, enemy), Some(Coord::new(1, 1)));
    board.verify().expect("failed relocation keeps board consistent");
}

#[test]
fn sampling_draws_distinct_cells_and_claims_them() {
    let mut board = board(6, 6);
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let drawn = board.sample_empty_cells(5, &mut rng);

    assert_eq!(drawn.len(), 5);
    let unique: HashSet<Coord> = drawn.iter().copied().collect();
    assert_eq!(unique.len(), 5);
    for cell in &drawn {
        assert!(!board.is_empty_cell(*cell));
        assert!(board.is_claimed(*cell));
    }
    assert_eq!(board.empty_count(), 16 - 5);
    board.verify().expect("claimed cells keep board consistent");
}

#[test]
fn sampling_returns_fewer_cells_when_pool_runs_out() {
    let mut board = board(4, 4);
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let drawn = board.sample_empty_cells(10, &mut rng);

    assert_eq!(drawn.len(), 4);
    assert_eq!(board.empty_count(), 0);
    assert!(board.sample_empty_cells(1, &mut rng).is_empty());
}

#[test]
fn sampling_is_deterministic_for_a_seed() {
    let mut first = board(9, 9);
    let mut second = board(9, 9);

    let a = first.sample_empty_cells(12, &mut ChaCha8Rng::seed_from_u64(3));
    let b = second.sample_empty_cells(12, &mut ChaCha8Rng::seed_from_u64(3));

    assert_eq!(a, b);
}

#[test]
fn releasing_claim_returns_cell_to_pool() {
    let mut board = board(5, 5);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let drawn = board.sample_empty_cells(1, &mut rng);
    let cell = drawn[0];

    assert!(board.release(cell));
    assert!(board.is_empty_cell(cell));
    assert!(!board.release(cell));
    board.verify().expect("release keeps board consistent");
}

#[test]
fn placing_on_claimed_cell_clears_claim() {
    let mut board = board(5, 5);
    let mut tiles = Tiles::default();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let cell = board.sample_empty_cells(1, &mut rng)[0];

    let _ = board
        .place_occupant(Food::default(), cell, &mut tiles)
        .expect("claimed cell accepts occupant");
    assert!(!board.is_claimed(cell));

    let _ = board.vacate(cell);
    assert!(board.is_empty_cell(cell));
    board.verify().expect("claim lifecycle keeps board consistent");
}

#[test]
fn lifecycle_events_are_recorded_in_order() {
    let mut board = board(6, 6);
    let mut tiles = Tiles::default();
    let id = board
        .place_occupant(Enemy::default(), Coord::new(2, 2), &mut tiles)
        .expect("placement succeeds");
    let _ = board.relocate(id, Coord::new(2, 3)).expect("move succeeds");
    let _ = board.vacate(Coord::new(2, 3));

    let mut events = Vec::new();
    board.drain_events(&mut events);

    assert_eq!(
        events,
        vec![
            Event::EntitySpawned {
                id,
                kind: EntityKind::Enemy,
                cell: Coord::new(2, 2),
            },
            Event::EntityMoved {
                id,
                from: Coord::new(2, 2),
                to: Coord::new(2, 3),
            },
            Event::EntityDestroyed {
                id,
                kind: EntityKind::Enemy,
                cell: Coord::new(2, 3),
            },
        ]
    );

    let mut again = Vec::new();
    board.drain_events(&mut again);
    assert!(again.is_empty());
}
