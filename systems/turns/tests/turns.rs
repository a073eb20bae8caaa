use delve_core::{Coord, EntityId, EntityKind, Event, Subscriber};
use delve_system_turns::TurnScheduler;

fn spawned(id: u32, kind: EntityKind) -> Event {
    Event::EntitySpawned {
        id: EntityId::new(id),
        kind,
        cell: Coord::new(1, 1),
    }
}

fn destroyed(id: u32, kind: EntityKind) -> Event {
    Event::EntityDestroyed {
        id: EntityId::new(id),
        kind,
        cell: Coord::new(1, 1),
    }
}

#[test]
fn dispatches_in_registration_order() {
    let mut scheduler = TurnScheduler::new();
    let _ = scheduler.subscribe(Subscriber::Entity(EntityId::new(5)));
    let _ = scheduler.subscribe(Subscriber::ResourceDecay);
    let _ = scheduler.subscribe(Subscriber::Entity(EntityId::new(2)));

    let mut seen = Vec::new();
    let event = scheduler.tick(|subscriber| seen.push(subscriber));

    assert_eq!(
        seen,
        vec![
            Subscriber::Entity(EntityId::new(5)),
            Subscriber::ResourceDecay,
            Subscriber::Entity(EntityId::new(2)),
        ]
    );
    assert_eq!(event, Event::TurnAdvanced { turn: 1 });
}

#[test]
fn every_tick_reaches_every_subscriber_once() {
    let mut scheduler = TurnScheduler::new();
    let _ = scheduler.subscribe(Subscriber::ResourceDecay);
    let _ = scheduler.subscribe(Subscriber::Entity(EntityId::new(0)));

    let mut calls = 0;
    for _ in 0..3 {
        let _ = scheduler.tick(|_| calls += 1);
    }

    assert_eq!(calls, 6);
    assert_eq!(scheduler.turn(), 3);
}

#[test]
fn tick_without_subscribers_still_advances_turn() {
    let mut scheduler = TurnScheduler::new();
    let event = scheduler.tick(|_| panic!("no subscribers expected"));
    assert_eq!(event, Event::TurnAdvanced { turn: 1 });
}

#[test]
fn lifecycle_registers_only_enemies() {
    let mut scheduler = TurnScheduler::new();
    scheduler.sync_lifecycle(&[
        spawned(0, EntityKind::Wall),
        spawned(1, EntityKind::Enemy),
        spawned(2, EntityKind::Food),
        spawned(3, EntityKind::Enemy),
    ]);

    assert_eq!(
        scheduler.subscribers(),
        &[
            Subscriber::Entity(EntityId::new(1)),
            Subscriber::Entity(EntityId::new(3)),
        ]
    );
}

#[test]
fn destroyed_enemy_is_unsubscribed_and_order_kept() {
    let mut scheduler = TurnScheduler::new();
    let _ = scheduler.subscribe(Subscriber::ResourceDecay);
    scheduler.sync_lifecycle(&[
        spawned(1, EntityKind::Enemy),
        spawned(2, EntityKind::Enemy),
        spawned(3, EntityKind::Enemy),
    ]);

    scheduler.sync_lifecycle(&[
        destroyed(2, EntityKind::Enemy),
        Event::EntityMoved {
            id: EntityId::new(3),
            from: Coord::new(1, 1),
            to: Coord::new(1, 2),
        },
    ]);

    assert_eq!(
        scheduler.subscribers(),
        &[
            Subscriber::ResourceDecay,
            Subscriber::Entity(EntityId::new(1)),
            Subscriber::Entity(EntityId::new(3)),
        ]
    );
}

#[test]
fn clearing_entities_keeps_collaborators() {
    let mut scheduler = TurnScheduler::new();
    scheduler.sync_lifecycle(&[spawned(1, EntityKind::Enemy)]);
    let _ = scheduler.subscribe(Subscriber::ResourceDecay);

    scheduler.clear_entities();

    assert_eq!(scheduler.subscribers(), &[Subscriber::ResourceDecay]);
}
