#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session that owns the board and plays the resource, level and
//! player-state collaborators around it.

use delve_core::{
    Coord, Direction, EntityId, Event, GridError, LevelState, PlayerState, ResourcePool,
    Subscriber, TileLayer,
};
use delve_system_bootstrap::{LevelBuilder, LevelConfig, TilePalette};
use delve_system_enemy::{EnemyBehavior, Reaction};
use delve_system_movement::{resolve_step, StepContext, StepOutcome};
use delve_system_spawning::{Spawner, SpawnerConfig};
use delve_system_turns::TurnScheduler;
use delve_world::{Board, Entity};
use serde::{Deserialize, Serialize};

/// Resource the player starts every game with.
pub const DEFAULT_STARTING_RESOURCE: i32 = 20;

/// Configuration parameters for the session itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Resource at the start of a game.
    pub starting_resource: i32,
    /// Resource lost on every tick.
    pub decay_per_tick: i32,
    /// Seed for spawning and tile variation.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_resource: DEFAULT_STARTING_RESOURCE,
            decay_per_tick: 1,
            seed: 0,
        }
    }
}

/// Complete configuration of a game.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Session parameters.
    pub session: SessionConfig,
    /// Level sizing.
    pub level: LevelConfig,
    /// Tiles painted on new boards.
    pub palette: TilePalette,
    /// Content placement.
    pub spawner: SpawnerConfig,
    /// Enemy behaviour.
    pub enemy: delve_system_enemy::Config,
}

/// A running game over a tile layer of type `T`.
#[derive(Debug)]
pub struct Session<T> {
    config: SessionConfig,
    builder: LevelBuilder,
    spawner: Spawner,
    board: Board,
    exit: Coord,
    actors: Actors<T>,
    over: bool,
}

impl<T> Session<T>
where
    T: TileLayer + Default,
{
    /// Starts a game at level one.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let GameConfig {
            session,
            level,
            palette,
            spawner,
            enemy,
        } = config;

        let mut scheduler = TurnScheduler::new();
        let _ = scheduler.subscribe(Subscriber::ResourceDecay);

        let mut this = Self {
            config: session,
            builder: LevelBuilder::new(level, palette, session.seed.wrapping_add(1)),
            spawner: Spawner::new(spawner, session.seed),
            board: Board::new(0, 0, level.border, &[]),
            exit: Coord::new(0, 0),
            actors: Actors {
                player: Coord::new(0, 0),
                tiles: T::default(),
                ledger: Ledger::new(session.starting_resource, session.decay_per_tick),
                progress: Progress::default(),
                scheduler,
                behavior: EnemyBehavior::new(enemy),
            },
            over: false,
        };
        this.start_level();
        this
    }

    /// Resolves one player input.
    ///
    /// Returns `None` once the session is over.
    pub fn step(&mut self, direction: Direction) -> Option<StepOutcome> {
        if self.over {
            log::debug!("session over; ignoring {direction:?}");
            return None;
        }

        let outcome = resolve_step(&mut self.board, direction, &mut self.actors);
        if let StepOutcome::Bumped { target, kind } = outcome {
            self.actors
                .ledger
                .events
                .push(Event::PlayerBumped { target, kind });
        }
        self.actors.flush(&mut self.board);

        if self.actors.ledger.food <= 0 {
            self.over = true;
            let level = self.actors.progress.level;
            log::info!("out of resource on level {level}");
            self.actors.ledger.events.push(Event::SessionOver { level });
        } else if self.actors.progress.advance_requested {
            self.actors.progress.level = self.actors.progress.level.saturating_add(1);
            log::info!("advancing to level {}", self.actors.progress.level);
            self.start_level();
        }
        Some(outcome)
    }

    /// Starts a new game at level one with a full resource.
    pub fn restart(&mut self) {
        log::info!("restarting session");
        self.over = false;
        self.actors.progress.level = 1;
        self.actors.ledger.food = self.config.starting_resource;
        self.start_level();
    }

    /// Places an entity outside of level generation and registers it for ticks.
    pub fn spawn_entity(
        &mut self,
        entity: impl Into<Entity>,
        cell: Coord,
    ) -> Result<EntityId, GridError> {
        let id = self
            .board
            .place_occupant(entity, cell, &mut self.actors.tiles)?;
        self.actors.flush(&mut self.board);
        Ok(id)
    }

    fn start_level(&mut self) {
        self.actors.ledger.ready = false;
        self.actors.progress.advance_requested = false;
        self.actors.tiles = T::default();
        self.actors.scheduler.clear_entities();

        let level = self.builder.build_level(
            &self.actors.progress,
            &mut self.actors.tiles,
            &mut self.spawner,
        );
        self.board = level.board;
        self.exit = level.exit;
        self.actors.player = level.spawn;

        self.actors.ledger.events.push(Event::LevelStarted {
            level: level.number,
            width: self.board.width(),
            height: self.board.height(),
        });
        self.actors.flush(&mut self.board);
        self.actors.ledger.ready = true;
    }

    /// Current board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Tile layer painted for the current board.
    #[must_use]
    pub const fn tiles(&self) -> &T {
        &self.actors.tiles
    }

    /// Cell the player stands on.
    #[must_use]
    pub const fn player(&self) -> Coord {
        self.actors.player
    }

    /// Cell holding the exit of the current level.
    #[must_use]
    pub const fn exit(&self) -> Coord {
        self.exit
    }

    /// Remaining resource.
    #[must_use]
    pub const fn resource(&self) -> i32 {
        self.actors.ledger.food
    }

    /// Current level number.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.actors.progress.level
    }

    /// Number of ticks dispatched since the session was created.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.actors.scheduler.turn()
    }

    /// Subscribers in dispatch order.
    #[must_use]
    pub fn subscribers(&self) -> &[Subscriber] {
        self.actors.scheduler.subscribers()
    }

    /// Reports whether the resource ran out.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.over
    }

    /// Everything that happened since the session was created.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.actors.ledger.events
    }
}

/// Resource bookkeeping and the session event log.
#[derive(Debug)]
struct Ledger {
    food: i32,
    decay_per_tick: i32,
    ready: bool,
    events: Vec<Event>,
}

impl Ledger {
    fn new(food: i32, decay_per_tick: i32) -> Self {
        Self {
            food,
            decay_per_tick,
            ready: false,
            events: Vec::new(),
        }
    }

    fn adjust(&mut self, delta: i32) {
        if delta == 0 {
            return;
        }
        self.food = self.food.saturating_add(delta);
        self.events.push(Event::ResourceChanged {
            delta,
            total: self.food,
        });
    }

    fn decay(&mut self) {
        if self.ready {
            self.adjust(self.decay_per_tick.saturating_neg());
        }
    }
}

impl ResourcePool for Ledger {
    fn grant(&mut self, amount: i32) {
        self.adjust(amount);
    }
}

#[derive(Debug)]
struct Progress {
    level: u32,
    advance_requested: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            level: 1,
            advance_requested: false,
        }
    }
}

impl LevelState for Progress {
    fn current_level(&self) -> u32 {
        self.level
    }

    fn request_level_advance(&mut self) {
        self.advance_requested = true;
    }
}

/// Player view handed to enemies during a tick.
struct Target<'a> {
    cell: Coord,
    ledger: &'a mut Ledger,
}

impl PlayerState for Target<'_> {
    fn cell(&self) -> Coord {
        self.cell
    }

    fn receive_damage(&mut self, amount: i32) {
        self.ledger.adjust(amount.saturating_neg());
    }
}

/// Everything except the board, split out so the board can be borrowed
/// alongside it.
#[derive(Debug)]
struct Actors<T> {
    player: Coord,
    tiles: T,
    ledger: Ledger,
    progress: Progress,
    scheduler: TurnScheduler,
    behavior: EnemyBehavior,
}

impl<T> Actors<T> {
    /// Moves board lifecycle events into the log and keeps tick
    /// registration in step with them.
    fn flush(&mut self, board: &mut Board) {
        let mut lifecycle = Vec::new();
        board.drain_events(&mut lifecycle);
        self.scheduler.sync_lifecycle(&lifecycle);
        self.ledger.events.append(&mut lifecycle);
    }
}

impl<T> StepContext for Actors<T>
where
    T: TileLayer,
{
    fn player_cell(&self) -> Coord {
        self.player
    }

    fn move_player(&mut self, to: Coord) {
        self.ledger.events.push(Event::PlayerMoved {
            from: self.player,
            to,
        });
        self.player = to;
    }

    fn tick(&mut self, board: &mut Board) {
        let Self {
            player,
            ledger,
            scheduler,
            behavior,
            ..
        } = self;

        let turn = scheduler.tick(|subscriber| match subscriber {
            Subscriber::ResourceDecay => ledger.decay(),
            Subscriber::Entity(id) => {
                let mut target = Target {
                    cell: *player,
                    ledger: &mut *ledger,
                };
                if let Reaction::Attacked { damage } = behavior.react(board, id, &mut target) {
                    ledger.events.push(Event::PlayerDamaged {
                        by: id,
                        amount: damage,
                    });
                }
            }
        });
        ledger.events.push(turn);
        self.flush(board);
    }

    fn tiles(&mut self) -> &mut dyn TileLayer {
        &mut self.tiles
    }

    fn collaborators(&mut self) -> (&mut dyn ResourcePool, &mut dyn LevelState) {
        (&mut self.ledger, &mut self.progress)
    }
}
