//! Entities that occupy board cells and their contact state machines.
//!
//! Every variant answers the two-phase contact protocol: `wants_to_enter`
//! runs when the player steps against the occupied cell and may mutate the
//! occupant, and `entered` runs once the player stands on the cell. Neither
//! phase touches the board directly; the [`crate::Board`] applies the
//! returned [`Contact`] so occupancy only ever changes through its own
//! placement and vacate operations.

use delve_core::{Coord, EntityKind, LevelState, ResourcePool, TileLayer, TileRef};

/// Default amount of resource granted by a food pickup.
pub const DEFAULT_FOOD_AMOUNT: i32 = 3;
/// Default number of bumps a wall absorbs before it breaks.
pub const DEFAULT_WALL_HEALTH: i32 = 3;
/// Default enemy health.
pub const DEFAULT_ENEMY_HEALTH: i32 = 3;
/// Damage an enemy takes from a single bump.
pub const DEFAULT_BUMP_DAMAGE: i32 = 1;

/// Tagged union over every entity that can occupy a board cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    /// Single-use consumable.
    Food(Food),
    /// Destructible obstacle.
    Wall(Wall),
    /// Level exit.
    Exit(ExitCell),
    /// Reactive hostile.
    Enemy(Enemy),
}

impl Entity {
    /// Variant tag of the entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Food(_) => EntityKind::Food,
            Self::Wall(_) => EntityKind::Wall,
            Self::Exit(_) => EntityKind::Exit,
            Self::Enemy(_) => EntityKind::Enemy,
        }
    }

    /// Cell the entity is bound to, or `None` before it has been placed.
    #[must_use]
    pub const fn cell(&self) -> Option<Coord> {
        match self {
            Self::Food(food) => food.cell,
            Self::Wall(wall) => wall.cell,
            Self::Exit(exit) => exit.cell,
            Self::Enemy(enemy) => enemy.cell,
        }
    }

    /// Returns the wall state when the entity is a wall.
    #[must_use]
    pub fn as_wall(&self) -> Option<&Wall> {
        match self {
            Self::Wall(wall) => Some(wall),
            _ => None,
        }
    }

    /// Returns the enemy state when the entity is an enemy.
    #[must_use]
    pub fn as_enemy(&self) -> Option<&Enemy> {
        match self {
            Self::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub(crate) fn init(&mut self, cell: Coord, tiles: &mut dyn TileLayer) {
        match self {
            Self::Food(food) => food.cell = Some(cell),
            Self::Wall(wall) => wall.init(cell, tiles),
            Self::Exit(exit) => {
                exit.cell = Some(cell);
                tiles.set_tile(cell, exit.end_tile);
            }
            Self::Enemy(enemy) => {
                enemy.cell = Some(cell);
                enemy.health = enemy.max_health;
            }
        }
    }

    pub(crate) fn rebind(&mut self, cell: Coord) {
        match self {
            Self::Food(food) => food.cell = Some(cell),
            Self::Wall(wall) => wall.cell = Some(cell),
            Self::Exit(exit) => exit.cell = Some(cell),
            Self::Enemy(enemy) => enemy.cell = Some(cell),
        }
    }

    pub(crate) fn wants_to_enter(&mut self, tiles: &mut dyn TileLayer) -> Contact {
        match self {
            Self::Food(_) | Self::Exit(_) => Contact::ADMIT,
            Self::Wall(wall) => wall.bump(tiles),
            Self::Enemy(enemy) => enemy.bump(),
        }
    }

    pub(crate) fn entered(
        &mut self,
        resources: &mut dyn ResourcePool,
        level: &mut dyn LevelState,
    ) -> Contact {
        match self {
            Self::Food(food) => {
                resources.grant(food.amount);
                Contact::CONSUMED
            }
            Self::Exit(_) => {
                level.request_level_advance();
                Contact::ADMIT
            }
            Self::Wall(_) | Self::Enemy(_) => Contact::ADMIT,
        }
    }
}

impl From<Food> for Entity {
    fn from(food: Food) -> Self {
        Self::Food(food)
    }
}

impl From<Wall> for Entity {
    fn from(wall: Wall) -> Self {
        Self::Wall(wall)
    }
}

impl From<ExitCell> for Entity {
    fn from(exit: ExitCell) -> Self {
        Self::Exit(exit)
    }
}

impl From<Enemy> for Entity {
    fn from(enemy: Enemy) -> Self {
        Self::Enemy(enemy)
    }
}

/// Result of one contact phase as seen by the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Contact {
    pub(crate) admit: bool,
    pub(crate) consumed: bool,
}

impl Contact {
    const ADMIT: Self = Self {
        admit: true,
        consumed: false,
    };
    const DENY: Self = Self {
        admit: false,
        consumed: false,
    };
    const CONSUMED: Self = Self {
        admit: true,
        consumed: true,
    };
}

/// Consumable that grants resource once the player steps onto it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Food {
    amount: i32,
    cell: Option<Coord>,
}

impl Food {
    /// Creates food that grants the provided amount.
    #[must_use]
    pub const fn new(amount: i32) -> Self {
        Self { amount, cell: None }
    }

    /// Amount of resource granted on pickup.
    #[must_use]
    pub const fn amount(&self) -> i32 {
        self.amount
    }
}

impl Default for Food {
    fn default() -> Self {
        Self::new(DEFAULT_FOOD_AMOUNT)
    }
}

/// Obstacle that absorbs bumps until it breaks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wall {
    health: i32,
    max_health: i32,
    obstacle_tile: TileRef,
    damaged_tile: TileRef,
    original_tile: Option<TileRef>,
    cell: Option<Coord>,
}

impl Wall {
    /// Creates a wall shown with `obstacle_tile` and switched to `damaged_tile`
    /// when a single bump remains.
    ///
    /// `max_health` is raised to one when smaller.
    #[must_use]
    pub fn new(max_health: i32, obstacle_tile: TileRef, damaged_tile: TileRef) -> Self {
        let max_health = max_health.max(1);
        Self {
            health: max_health,
            max_health,
            obstacle_tile,
            damaged_tile,
            original_tile: None,
            cell: None,
        }
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Health the wall starts with.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Reports whether one more bump breaks the wall.
    #[must_use]
    pub const fn is_nearly_destroyed(&self) -> bool {
        self.health == 1
    }

    /// Tile that was shown before the wall was placed.
    #[must_use]
    pub const fn original_tile(&self) -> Option<TileRef> {
        self.original_tile
    }

    fn init(&mut self, cell: Coord, tiles: &mut dyn TileLayer) {
        self.cell = Some(cell);
        self.health = self.max_health;
        self.original_tile = tiles.tile(cell);
        tiles.set_tile(cell, self.obstacle_tile);
    }

    fn bump(&mut self, tiles: &mut dyn TileLayer) -> Contact {
        self.health -= 1;
        let Some(cell) = self.cell else {
            return Contact::DENY;
        };

        if self.health > 0 {
            if self.health == 1 {
                tiles.set_tile(cell, self.damaged_tile);
            }
            return Contact::DENY;
        }

        if let Some(original) = self.original_tile {
            tiles.set_tile(cell, original);
        }
        Contact::CONSUMED
    }
}

/// Cell that ends the level once the player enters it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExitCell {
    end_tile: TileRef,
    cell: Option<Coord>,
}

impl ExitCell {
    /// Creates an exit marked with the provided tile.
    #[must_use]
    pub const fn new(end_tile: TileRef) -> Self {
        Self {
            end_tile,
            cell: None,
        }
    }
}

/// Hostile that chases the player and absorbs bump attacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    health: i32,
    max_health: i32,
    bump_damage: i32,
    cell: Option<Coord>,
}

impl Enemy {
    /// Creates an enemy with the provided health and the default bump damage.
    #[must_use]
    pub const fn new(max_health: i32) -> Self {
        Self {
            health: max_health,
            max_health,
            bump_damage: DEFAULT_BUMP_DAMAGE,
            cell: None,
        }
    }

    /// Overrides the damage taken per bump.
    #[must_use]
    pub const fn with_bump_damage(mut self, bump_damage: i32) -> Self {
        self.bump_damage = bump_damage;
        self
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Health the enemy spawns with.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Cell the enemy currently occupies.
    #[must_use]
    pub const fn position(&self) -> Option<Coord> {
        self.cell
    }

    fn bump(&mut self) -> Contact {
        self.health -= self.bump_damage;
        Contact {
            admit: false,
            consumed: self.health <= 0,
        }
    }
}

impl Default for Enemy {
    fn default() -> Self {
        Self::new(DEFAULT_ENEMY_HEALTH)
    }
}
