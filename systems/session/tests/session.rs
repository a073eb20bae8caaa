use std::collections::HashMap;

use delve_core::{Coord, Direction, EntityKind, Event, Subscriber, TileLayer, TileRef};
use delve_system_movement::StepOutcome;
use delve_system_session::{GameConfig, Session, SessionConfig};
use delve_world::{query, Enemy, Food};

#[derive(Debug, Default)]
struct Tiles(HashMap<Coord, TileRef>);

impl TileLayer for Tiles {
    fn tile(&self, cell: Coord) -> Option<TileRef> {
        self.0.get(&cell).copied()
    }

    fn set_tile(&mut self, cell: Coord, tile: TileRef) {
        let _ = self.0.insert(cell, tile);
    }
}

fn quiet_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.spawner.obstacles.prefabs.clear();
    config.spawner.consumables.prefabs.clear();
    config.spawner.hostiles.prefabs.clear();
    config
}

fn quiet_session() -> Session<Tiles> {
    Session::new(quiet_config())
}

#[test]
fn session_starts_on_level_one() {
    let session = quiet_session();

    assert_eq!(session.level(), 1);
    assert_eq!(session.resource(), 20);
    assert_eq!(session.player(), Coord::new(1, 1));
    assert_eq!(session.exit(), Coord::new(6, 6));
    assert_eq!(session.subscribers(), &[Subscriber::ResourceDecay]);
    assert_eq!(
        session.events().first(),
        Some(&Event::LevelStarted {
            level: 1,
            width: 8,
            height: 8,
        })
    );
    assert!(session.tiles().tile(Coord::new(0, 0)).is_some());
}

#[test]
fn legal_steps_decay_resource_and_rejected_steps_do_not() {
    let mut session = quiet_session();

    let moved = session.step(Direction::North);
    assert_eq!(
        moved,
        Some(StepOutcome::Moved {
            to: Coord::new(1, 2)
        })
    );
    assert_eq!(session.resource(), 19);
    assert_eq!(session.turn(), 1);

    let rejected = session.step(Direction::West);
    assert!(matches!(rejected, Some(StepOutcome::Rejected(_))));
    assert_eq!(session.resource(), 19);
    assert_eq!(session.turn(), 1);
    assert_eq!(session.player(), Coord::new(1, 2));
}

#[test]
fn entering_the_exit_builds_the_next_level() {
    let mut session = quiet_session();

    for _ in 0..5 {
        let _ = session.step(Direction::North);
    }
    for _ in 0..4 {
        let _ = session.step(Direction::East);
    }
    assert_eq!(session.level(), 1);

    let outcome = session.step(Direction::East);

    assert_eq!(
        outcome,
        Some(StepOutcome::Entered {
            to: Coord::new(6, 6),
            kind: EntityKind::Exit,
        })
    );
    assert_eq!(session.level(), 2);
    assert_eq!(session.resource(), 10);
    assert_eq!(session.player(), Coord::new(1, 1));
    assert_eq!(session.board().width(), 9);
    assert_eq!(session.exit(), Coord::new(7, 7));
    assert_eq!(
        session.events().last(),
        Some(&Event::EntitySpawned {
            id: session
                .board()
                .occupant(Coord::new(7, 7))
                .expect("exit placed"),
            kind: EntityKind::Exit,
            cell: Coord::new(7, 7),
        })
    );
    assert!(session.events().contains(&Event::LevelStarted {
        level: 2,
        width: 9,
        height: 9,
    }));
}

#[test]
fn running_out_of_resource_ends_the_session() {
    let mut config = quiet_config();
    config.session = SessionConfig {
        starting_resource: 2,
        ..SessionConfig::default()
    };
    let mut session: Session<Tiles> = Session::new(config);

    let _ = session.step(Direction::North);
    assert!(!session.is_over());
    let _ = session.step(Direction::North);

    assert!(session.is_over());
    assert_eq!(session.resource(), 0);
    assert_eq!(session.events().last(), Some(&Event::SessionOver { level: 1 }));
    assert_eq!(session.step(Direction::North), None);
    assert_eq!(session.turn(), 2);

    session.restart();

    assert!(!session.is_over());
    assert_eq!(session.resource(), 2);
    assert_eq!(session.level(), 1);
    assert_eq!(session.player(), Coord::new(1, 1));
}

#[test]
fn enemy_closes_in_attacks_and_dies_to_bumps() {
    let mut session = quiet_session();
    let enemy = session
        .spawn_entity(Enemy::default(), Coord::new(1, 3))
        .expect("enemy placed");
    assert_eq!(
        session.subscribers(),
        &[Subscriber::ResourceDecay, Subscriber::Entity(enemy)]
    );

    let bump = Some(StepOutcome::Bumped {
        target: Coord::new(1, 2),
        kind: EntityKind::Enemy,
    });
    assert_eq!(session.step(Direction::North), bump);
    assert_eq!(session.resource(), 19);
    assert_eq!(session.step(Direction::North), bump);
    assert_eq!(session.resource(), 15);
    assert_eq!(session.step(Direction::North), bump);
    assert_eq!(session.resource(), 11);

    assert_eq!(query::count_of_kind(session.board(), EntityKind::Enemy), 0);
    assert_eq!(session.subscribers(), &[Subscriber::ResourceDecay]);

    assert_eq!(
        session.step(Direction::North),
        Some(StepOutcome::Moved {
            to: Coord::new(1, 2)
        })
    );
    assert_eq!(session.resource(), 10);

    let hits = session
        .events()
        .iter()
        .filter(|event| matches!(event, Event::PlayerDamaged { by, amount: 3 } if *by == enemy))
        .count();
    assert_eq!(hits, 2);
}

#[test]
fn food_pickup_grants_resource() {
    let mut session = quiet_session();
    let _ = session
        .spawn_entity(Food::new(5), Coord::new(1, 2))
        .expect("food placed");

    let outcome = session.step(Direction::North);

    assert_eq!(
        outcome,
        Some(StepOutcome::Entered {
            to: Coord::new(1, 2),
            kind: EntityKind::Food,
        })
    );
    assert_eq!(session.resource(), 24);
    assert!(session.board().occupant(Coord::new(1, 2)).is_none());
}

#[test]
fn spawn_entity_rejects_occupied_cells() {
    let mut session = quiet_session();
    let exit = session.exit();

    let result = session.spawn_entity(Food::default(), exit);

    assert_eq!(
        result,
        Err(delve_core::GridError::CellOccupied { cell: exit })
    );
}

#[test]
fn extreme_decay_saturates_instead_of_overflowing() {
    let mut config = quiet_config();
    config.session.decay_per_tick = i32::MIN;
    let mut session: Session<Tiles> = Session::new(config);

    let outcome = session.step(Direction::North);

    assert!(matches!(outcome, Some(StepOutcome::Moved { .. })));
    assert_eq!(session.resource(), i32::MAX);
    assert!(!session.is_over());
}

#[test]
fn extreme_attack_damage_saturates_instead_of_overflowing() {
    let mut config = quiet_config();
    config.enemy.attack_damage = i32::MIN;
    let mut session: Session<Tiles> = Session::new(config);
    let _ = session
        .spawn_entity(Enemy::default(), Coord::new(1, 2))
        .expect("enemy placed");

    let _ = session.step(Direction::East);

    assert_eq!(session.resource(), i32::MAX);
}
