#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for the Delve dungeon.
//!
//! The [`Board`] exclusively owns cell occupancy, the entities bound to
//! cells, and the pool of empty cells that spawning draws from. Every other
//! component changes occupancy through [`Board::place_occupant`],
//! [`Board::vacate`] and [`Board::relocate`], which keep the pool and the
//! occupancy grid in lockstep and record lifecycle [`Event`] values for the
//! turn scheduler.

mod entity;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use delve_core::{Coord, EntityId, Event, GridError, LevelState, ResourcePool, TileLayer};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use entity::{
    Enemy, Entity, ExitCell, Food, Wall, DEFAULT_BUMP_DAMAGE, DEFAULT_ENEMY_HEALTH,
    DEFAULT_FOOD_AMOUNT, DEFAULT_WALL_HEALTH,
};

/// Describes how many rings of cells along the board edge are impassable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct BorderRule {
    thickness: u32,
}

impl BorderRule {
    /// Creates a border of the provided thickness, raised to one when zero.
    #[must_use]
    pub const fn new(thickness: u32) -> Self {
        Self {
            thickness: if thickness == 0 { 1 } else { thickness },
        }
    }

    /// Number of impassable rings along each edge.
    #[must_use]
    pub const fn thickness(&self) -> u32 {
        self.thickness
    }

    fn is_border(self, column: u32, row: u32, width: u32, height: u32) -> bool {
        column < self.thickness
            || row < self.thickness
            || column >= width.saturating_sub(self.thickness)
            || row >= height.saturating_sub(self.thickness)
    }
}

impl Default for BorderRule {
    fn default() -> Self {
        Self::new(1)
    }
}

impl From<u32> for BorderRule {
    fn from(thickness: u32) -> Self {
        Self::new(thickness)
    }
}

impl From<BorderRule> for u32 {
    fn from(rule: BorderRule) -> Self {
        rule.thickness
    }
}

/// Passability and occupancy of a single board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCell {
    passable: bool,
    occupant: Option<EntityId>,
}

impl GridCell {
    /// Reports whether anything may stand on the cell.
    #[must_use]
    pub const fn is_passable(&self) -> bool {
        self.passable
    }

    /// Entity bound to the cell, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<EntityId> {
        self.occupant
    }
}

/// Broken board bookkeeping detected by [`Board::verify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Pool membership disagrees with the cell's passability, occupancy or claim.
    #[error("empty-cell pool disagrees with cell {cell}")]
    PoolMismatch {
        /// Offending cell.
        cell: Coord,
    },
    /// A cell names an occupant that is missing or bound elsewhere.
    #[error("cell {cell} lists occupant {id} which is not bound there")]
    DanglingOccupant {
        /// Offending cell.
        cell: Coord,
        /// Occupant listed by the cell.
        id: EntityId,
    },
    /// An entity points at a cell that does not list it.
    #[error("entity {id} is not listed by the cell it points at")]
    UnlistedEntity {
        /// Offending entity.
        id: EntityId,
    },
    /// An impassable cell holds an occupant.
    #[error("impassable cell {cell} holds an occupant")]
    ImpassableOccupant {
        /// Offending cell.
        cell: Coord,
    },
}

/// Represents the authoritative dungeon board.
#[derive(Debug)]
pub struct Board {
    width: u32,
    height: u32,
    cells: Vec<GridCell>,
    entities: BTreeMap<EntityId, Entity>,
    next_entity: u32,
    pool: EmptyCellPool,
    claimed: BTreeSet<Coord>,
    events: Vec<Event>,
}

impl Board {
    /// Allocates a board, marks the border impassable and fills the empty-cell
    /// pool with every interior cell except the `reserved` ones.
    #[must_use]
    pub fn new(width: u32, height: u32, border: BorderRule, reserved: &[Coord]) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);
        let mut pool = EmptyCellPool::default();

        for row in 0..height {
            for column in 0..width {
                let passable = !border.is_border(column, row, width, height);
                cells.push(GridCell {
                    passable,
                    occupant: None,
                });
                if passable {
                    let cell = Coord::new(column as i32, row as i32);
                    let _ = pool.insert(cell);
                }
            }
        }

        let mut board = Self {
            width,
            height,
            cells,
            entities: BTreeMap::new(),
            next_entity: 0,
            pool,
            claimed: BTreeSet::new(),
            events: Vec::new(),
        };
        for cell in reserved {
            let _ = board.reserve(*cell);
        }
        board
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells, border included.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Reports whether the coordinate lies on the board.
    #[must_use]
    pub fn contains(&self, cell: Coord) -> bool {
        self.index(cell).is_some()
    }

    /// Returns the cell at the coordinate, or `None` when out of bounds.
    #[must_use]
    pub fn cell_at(&self, cell: Coord) -> Option<&GridCell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    /// Entity bound to the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: Coord) -> Option<EntityId> {
        self.cell_at(cell).and_then(GridCell::occupant)
    }

    /// Looks up an entity by identifier.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Entity bound to the cell, if any.
    #[must_use]
    pub fn entity_at(&self, cell: Coord) -> Option<&Entity> {
        self.occupant(cell).and_then(|id| self.entities.get(&id))
    }

    /// Iterates entities in identifier order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(id, entity)| (*id, entity))
    }

    /// Number of entities currently bound to the board.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether the cell is currently in the empty-cell pool.
    #[must_use]
    pub fn is_empty_cell(&self, cell: Coord) -> bool {
        self.pool.contains(cell)
    }

    /// Cells currently in the empty-cell pool, in pool order.
    #[must_use]
    pub fn empty_cells(&self) -> &[Coord] {
        self.pool.cells()
    }

    /// Number of cells currently in the empty-cell pool.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.pool.len()
    }

    /// Reports whether the cell was withheld from the pool without an occupant.
    #[must_use]
    pub fn is_claimed(&self, cell: Coord) -> bool {
        self.claimed.contains(&cell)
    }

    /// Withholds an empty cell from the pool, for spawn points and the exit.
    ///
    /// Returns `false` when the cell was not in the pool.
    pub fn reserve(&mut self, cell: Coord) -> bool {
        if !self.pool.remove(cell) {
            return false;
        }
        let _ = self.claimed.insert(cell);
        true
    }

    /// Returns a claimed cell without an occupant to the pool.
    ///
    /// Returns `false` when the cell was not claimed.
    pub fn release(&mut self, cell: Coord) -> bool {
        if !self.claimed.remove(&cell) {
            return false;
        }
        if let Some(slot) = self.cell_at(cell) {
            if slot.passable && slot.occupant.is_none() {
                let _ = self.pool.insert(cell);
            }
        }
        true
    }

    /// Checks that an occupant could be bound to the cell right now.
    pub fn check_placeable(&self, cell: Coord) -> Result<(), GridError> {
        let slot = self.cell_at(cell).ok_or(GridError::OutOfBounds { cell })?;
        if slot.occupant.is_some() {
            return Err(GridError::CellOccupied { cell });
        }
        if !slot.passable {
            return Err(GridError::Impassable { cell });
        }
        Ok(())
    }

    /// Binds a new entity to the cell, removes the cell from the pool and
    /// initialises the entity.
    pub fn place_occupant(
        &mut self,
        entity: impl Into<Entity>,
        cell: Coord,
        tiles: &mut dyn TileLayer,
    ) -> Result<EntityId, GridError> {
        self.check_placeable(cell)?;
        let index = self.index(cell).ok_or(GridError::OutOfBounds { cell })?;

        let id = EntityId::new(self.next_entity);
        self.next_entity = self.next_entity.wrapping_add(1);

        let mut entity = entity.into();
        let kind = entity.kind();
        self.occupy(index, cell, id);
        entity.init(cell, tiles);
        let _ = self.entities.insert(id, entity);

        log::debug!("placed {kind:?} {id} at {cell}");
        self.events.push(Event::EntitySpawned { id, kind, cell });
        Ok(id)
    }

    /// Removes the occupant of the cell and returns the cell to the pool.
    ///
    /// The returned entity has ended its lifecycle on this board.
    pub fn vacate(&mut self, cell: Coord) -> Option<Entity> {
        let index = self.index(cell)?;
        let id = self.cells.get_mut(index)?.occupant.take()?;
        self.free(index, cell);

        let entity = self.entities.remove(&id)?;
        let kind = entity.kind();
        log::debug!("removed {kind:?} {id} from {cell}");
        self.events.push(Event::EntityDestroyed { id, kind, cell });
        Some(entity)
    }

    /// Moves an entity to a neighbouring or distant cell, keeping its identity.
    ///
    /// The target is validated before the source cell is touched, so a failed
    /// move leaves the board unchanged. Returns the cell the entity left.
    pub fn relocate(&mut self, id: EntityId, to: Coord) -> Result<Coord, GridError> {
        let from = self
            .entities
            .get(&id)
            .and_then(Entity::cell)
            .ok_or(GridError::UnknownEntity { id })?;
        self.check_placeable(to)?;
        let from_index = self.index(from).ok_or(GridError::UnknownEntity { id })?;
        let to_index = self.index(to).ok_or(GridError::OutOfBounds { cell: to })?;

        if let Some(slot) = self.cells.get_mut(from_index) {
            slot.occupant = None;
        }
        self.free(from_index, from);
        self.occupy(to_index, to, id);
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.rebind(to);
        }

        self.events.push(Event::EntityMoved { id, from, to });
        Ok(from)
    }

    /// Runs the first contact phase against an occupant.
    ///
    /// The occupant may destroy itself, in which case its cell is vacated
    /// before this returns. Returns whether the player may step into the cell
    /// this turn, or `None` when the entity is not on the board.
    pub fn wants_to_enter(&mut self, id: EntityId, tiles: &mut dyn TileLayer) -> Option<bool> {
        let entity = self.entities.get_mut(&id)?;
        let contact = entity.wants_to_enter(tiles);
        let cell = entity.cell();
        if contact.consumed {
            if let Some(cell) = cell {
                let _ = self.vacate(cell);
            }
        }
        Some(contact.admit)
    }

    /// Runs the second contact phase once the player stands on the cell.
    ///
    /// Returns `false` when the entity already left the board, which is the
    /// case for a wall broken during the first phase.
    pub fn entered(
        &mut self,
        id: EntityId,
        resources: &mut dyn ResourcePool,
        level: &mut dyn LevelState,
    ) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        let contact = entity.entered(resources, level);
        let cell = entity.cell();
        if contact.consumed {
            if let Some(cell) = cell {
                let _ = self.vacate(cell);
            }
        }
        true
    }

    /// Draws up to `count` distinct cells uniformly from the empty-cell pool.
    ///
    /// Drawn cells leave the pool and stay claimed until they receive an
    /// occupant or are released. Fewer cells are returned when the pool runs
    /// out.
    pub fn sample_empty_cells<R>(&mut self, count: usize, rng: &mut R) -> Vec<Coord>
    where
        R: Rng + ?Sized,
    {
        let draws = count.min(self.pool.len());
        if draws < count {
            log::debug!(
                "{}",
                GridError::PoolExhausted {
                    requested: count,
                    available: draws,
                }
            );
        }

        let mut drawn = Vec::with_capacity(draws);
        for _ in 0..draws {
            let index = rng.gen_range(0..self.pool.len());
            if let Some(cell) = self.pool.take_at(index) {
                let _ = self.claimed.insert(cell);
                drawn.push(cell);
            }
        }
        drawn
    }

    /// Moves recorded lifecycle events into `out`.
    pub fn drain_events(&mut self, out: &mut Vec<Event>) {
        out.append(&mut self.events);
    }

    /// Checks the occupancy and empty-cell pool invariants.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        for (index, slot) in self.cells.iter().enumerate() {
            let cell = self.coord(index);
            let should_pool = slot.passable && slot.occupant.is_none() && !self.is_claimed(cell);
            if should_pool != self.pool.contains(cell) {
                return Err(InvariantViolation::PoolMismatch { cell });
            }

            if let Some(id) = slot.occupant {
                if !slot.passable {
                    return Err(InvariantViolation::ImpassableOccupant { cell });
                }
                let bound_here = self
                    .entities
                    .get(&id)
                    .and_then(Entity::cell)
                    .is_some_and(|bound| bound == cell);
                if !bound_here {
                    return Err(InvariantViolation::DanglingOccupant { cell, id });
                }
            }
        }

        for (id, entity) in &self.entities {
            let listed = entity
                .cell()
                .and_then(|cell| self.occupant(cell))
                .is_some_and(|occupant| occupant == *id);
            if !listed {
                return Err(InvariantViolation::UnlistedEntity { id: *id });
            }
        }

        if let Some(cell) = self
            .pool
            .cells()
            .iter()
            .copied()
            .find(|cell| !self.contains(*cell))
        {
            return Err(InvariantViolation::PoolMismatch { cell });
        }

        Ok(())
    }

    fn occupy(&mut self, index: usize, cell: Coord, id: EntityId) {
        if let Some(slot) = self.cells.get_mut(index) {
            slot.occupant = Some(id);
        }
        let _ = self.pool.remove(cell);
        let _ = self.claimed.remove(&cell);
    }

    fn free(&mut self, index: usize, cell: Coord) {
        let _ = self.claimed.remove(&cell);
        if self.cells.get(index).is_some_and(|slot| slot.passable) {
            let _ = self.pool.insert(cell);
        }
    }

    fn index(&self, cell: Coord) -> Option<usize> {
        let column = u32::try_from(cell.x()).ok()?;
        let row = u32::try_from(cell.y()).ok()?;
        if column < self.width && row < self.height {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn coord(&self, index: usize) -> Coord {
        let width = self.width.max(1) as usize;
        Coord::new((index % width) as i32, (index / width) as i32)
    }
}

#[derive(Clone, Debug, Default)]
struct EmptyCellPool {
    cells: Vec<Coord>,
    index: HashMap<Coord, usize>,
}

impl EmptyCellPool {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn cells(&self) -> &[Coord] {
        &self.cells
    }

    fn contains(&self, cell: Coord) -> bool {
        self.index.contains_key(&cell)
    }

    fn insert(&mut self, cell: Coord) -> bool {
        if self.contains(cell) {
            return false;
        }
        let _ = self.index.insert(cell, self.cells.len());
        self.cells.push(cell);
        true
    }

    fn remove(&mut self, cell: Coord) -> bool {
        let Some(index) = self.index.remove(&cell) else {
            return false;
        };
        let _ = self.cells.swap_remove(index);
        if let Some(moved) = self.cells.get(index).copied() {
            let _ = self.index.insert(moved, index);
        }
        true
    }

    fn take_at(&mut self, index: usize) -> Option<Coord> {
        let cell = self.cells.get(index).copied()?;
        let _ = self.remove(cell);
        Some(cell)
    }
}

/// Query functions that provide read-only access to the board.
pub mod query {
    use super::Board;
    use delve_core::{Coord, EntityId, EntityKind};

    /// Identifiers of every entity of the provided kind, in identifier order.
    #[must_use]
    pub fn entities_of_kind(board: &Board, kind: EntityKind) -> Vec<EntityId> {
        board
            .entities()
            .filter(|(_, entity)| entity.kind() == kind)
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of entities of the provided kind.
    #[must_use]
    pub fn count_of_kind(board: &Board, kind: EntityKind) -> usize {
        board
            .entities()
            .filter(|(_, entity)| entity.kind() == kind)
            .count()
    }

    /// Variant of the occupant at the cell, if any.
    #[must_use]
    pub fn occupant_kind(board: &Board, cell: Coord) -> Option<EntityKind> {
        board.entity_at(cell).map(|entity| entity.kind())
    }

    /// Cell an entity is bound to.
    #[must_use]
    pub fn position_of(board: &Board, id: EntityId) -> Option<Coord> {
        board.entity(id).and_then(|entity| entity.cell())
    }

    /// Reports whether the player may attempt to step onto the cell.
    #[must_use]
    pub fn is_passable(board: &Board, cell: Coord) -> bool {
        board.cell_at(cell).is_some_and(|slot| slot.is_passable())
    }
}
