#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Delve dungeon simulation.
//!
//! This crate defines the vocabulary that connects the authoritative board,
//! the pure systems, and the collaborators that live outside the simulation
//! core. The board records [`Event`] values whenever an entity lifecycle
//! starts, moves or ends; systems consume those events deterministically and
//! act on the board only through its placement and vacate operations. The
//! collaborator traits ([`TileLayer`], [`ResourcePool`], [`PlayerState`],
//! [`LevelState`]) are injected explicitly by whoever composes a session.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single board cell expressed as x and y coordinates.
///
/// The y axis grows upward, so [`Direction::North`] increases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    x: i32,
    y: i32,
}

impl Coord {
    /// Creates a new board coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate one cell away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Reports whether the two coordinates share an edge.
    ///
    /// Diagonal neighbours are not adjacent.
    #[must_use]
    pub fn is_adjacent_to(self, other: Coord) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        (dx == 0 && dy == 1) || (dy == 0 && dx == 1)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal directions a player or enemy may step in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing `y`.
    North,
    /// Movement toward increasing `x`.
    East,
    /// Movement toward decreasing `y`.
    South,
    /// Movement toward decreasing `x`.
    West,
}

impl Direction {
    /// Unit offset applied to a coordinate when stepping in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }
}

/// Opaque handle to a tile owned by the rendering layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileRef(u32);

impl TileRef {
    /// Creates a tile handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tile handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an entity by the board that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Variants of entity that can occupy a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Single-use consumable that grants resource on entry.
    Food,
    /// Destructible obstacle that degrades with each bump.
    Wall,
    /// Cell that advances the game to the next level.
    Exit,
    /// Mobile hostile that reacts to every tick.
    Enemy,
}

/// Party registered with the turn scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subscriber {
    /// Board entity that reacts to ticks, currently only enemies.
    Entity(EntityId),
    /// Resource decay owned by the game-state collaborator.
    ResourceDecay,
}

/// Recoverable failures reported by board operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum GridError {
    /// The coordinate lies outside `[0, width) x [0, height)`.
    #[error("cell {cell} is out of bounds")]
    OutOfBounds {
        /// Coordinate that was requested.
        cell: Coord,
    },
    /// The target cell cannot be entered.
    #[error("cell {cell} is impassable")]
    Impassable {
        /// Coordinate that was requested.
        cell: Coord,
    },
    /// Placement was attempted onto an occupied cell.
    #[error("cell {cell} is already occupied")]
    CellOccupied {
        /// Coordinate that was requested.
        cell: Coord,
    },
    /// The referenced entity is not bound to this board.
    #[error("entity {id} is not on the board")]
    UnknownEntity {
        /// Identifier that was requested.
        id: EntityId,
    },
    /// More cells were requested than the empty-cell pool holds.
    #[error("requested {requested} empty cells but only {available} were available")]
    PoolExhausted {
        /// Number of cells requested by the caller.
        requested: usize,
        /// Number of cells that could be provided.
        available: usize,
    },
}

/// Events recorded by the board and the session while the simulation advances.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// An entity was bound to a cell and started its lifecycle.
    EntitySpawned {
        /// Identifier allocated by the board.
        id: EntityId,
        /// Variant of the new entity.
        kind: EntityKind,
        /// Cell the entity occupies.
        cell: Coord,
    },
    /// An entity moved between two cells without ending its lifecycle.
    EntityMoved {
        /// Identifier of the entity that moved.
        id: EntityId,
        /// Cell occupied before moving.
        from: Coord,
        /// Cell occupied after moving.
        to: Coord,
    },
    /// An entity was removed from the board and ended its lifecycle.
    EntityDestroyed {
        /// Identifier of the removed entity.
        id: EntityId,
        /// Variant of the removed entity.
        kind: EntityKind,
        /// Cell the entity occupied.
        cell: Coord,
    },
    /// The turn scheduler dispatched a tick.
    TurnAdvanced {
        /// Number of ticks dispatched so far, including this one.
        turn: u64,
    },
    /// The player changed cells.
    PlayerMoved {
        /// Cell occupied before moving.
        from: Coord,
        /// Cell occupied after moving.
        to: Coord,
    },
    /// The player spent a turn bumping an occupant that denied entry.
    PlayerBumped {
        /// Cell the player attempted to enter.
        target: Coord,
        /// Variant of the occupant that was bumped.
        kind: EntityKind,
    },
    /// An enemy attacked the player.
    PlayerDamaged {
        /// Enemy that dealt the damage.
        by: EntityId,
        /// Amount of damage dealt.
        amount: i32,
    },
    /// The player's resource changed.
    ResourceChanged {
        /// Signed change applied to the resource.
        delta: i32,
        /// Resource total after the change.
        total: i32,
    },
    /// A new level was built and the player spawned into it.
    LevelStarted {
        /// Level number, starting at one.
        level: u32,
        /// Board width in cells.
        width: u32,
        /// Board height in cells.
        height: u32,
    },
    /// The resource ran out and the session ended.
    SessionOver {
        /// Level the player reached.
        level: u32,
    },
}

/// Tile layer owned by the rendering collaborator.
///
/// The core only reads back tiles it previously wrote.
pub trait TileLayer {
    /// Returns the tile currently shown at the cell, if any.
    fn tile(&self, cell: Coord) -> Option<TileRef>;

    /// Replaces the tile shown at the cell.
    fn set_tile(&mut self, cell: Coord, tile: TileRef);
}

/// Resource collaborator credited by consumables.
pub trait ResourcePool {
    /// Adds the provided amount to the resource.
    fn grant(&mut self, amount: i32);
}

/// Player-state collaborator read by enemy behaviour.
pub trait PlayerState {
    /// Cell the player currently occupies.
    fn cell(&self) -> Coord;

    /// Applies damage dealt to the player.
    fn receive_damage(&mut self, amount: i32);
}

/// Level/game-state collaborator.
pub trait LevelState {
    /// Current level number, starting at one.
    fn current_level(&self) -> u32;

    /// Records that the player reached the exit.
    ///
    /// Implementations must not rebuild the board from inside this call.
    fn request_level_advance(&mut self);
}
