#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic content spawner that fills the empty-cell pool at level start.
//!
//! Obstacles are placed first, then consumables, then hostiles. Each category
//! draws from the pool left behind by the previous one, so no two categories
//! can claim the same cell.

use delve_core::{Coord, GridError, LevelState, TileLayer, TileRef};
use delve_world::{Board, Enemy, Entity, Food, Wall};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Tile shown on an intact obstacle by default.
pub const DEFAULT_OBSTACLE_TILE: TileRef = TileRef::new(16);
/// Tile shown on an obstacle with one bump left by default.
pub const DEFAULT_DAMAGED_TILE: TileRef = TileRef::new(17);

/// Placement policy applied to one category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnMode {
    /// Try the four board corners only.
    FixedCorners,
    /// Place a uniformly drawn number of entities in `[min_count, max_count]`.
    RandomCount,
    /// Scale the count with board area and level depth.
    Procedural,
}

/// Parameters of the procedural count formula.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProceduralConfig {
    /// Board cells per spawned entity at a level multiplier of one.
    pub cells_per: u32,
    /// Growth per level.
    pub level_multiplier: f64,
    /// Entities placed regardless of level.
    pub base_count: i32,
    /// Rounds the suggested count up instead of down.
    pub round_up: bool,
    /// Upper bound on the count, if any.
    pub max_cap: Option<u32>,
}

impl Default for ProceduralConfig {
    fn default() -> Self {
        Self {
            cells_per: 40,
            level_multiplier: 0.5,
            base_count: 0,
            round_up: false,
            max_cap: None,
        }
    }
}

impl ProceduralConfig {
    /// Unrounded count suggested for a board of `area` cells at `level`.
    #[must_use]
    pub fn suggested(&self, area: u64, level: u32) -> f64 {
        let from_area = area as f64 / f64::from(self.cells_per.max(1));
        f64::from(self.base_count) + (self.level_multiplier * f64::from(level)) * from_area
    }

    /// Count after rounding and capping, before clamping to available cells.
    #[must_use]
    pub fn count(&self, area: u64, level: u32) -> usize {
        let suggested = self.suggested(area, level);
        let rounded = if self.round_up {
            suggested.ceil()
        } else {
            suggested.floor()
        };
        let count = rounded.max(0.0) as usize;
        match self.max_cap {
            Some(cap) => count.min(cap as usize),
            None => count,
        }
    }
}

/// Obstacle variant the spawner can instantiate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallPrefab {
    /// Bumps absorbed before breaking.
    pub health: i32,
    /// Tile shown while intact.
    pub tile: TileRef,
    /// Tile shown with one bump left.
    pub damaged_tile: TileRef,
}

impl Default for WallPrefab {
    fn default() -> Self {
        Self {
            health: delve_world::DEFAULT_WALL_HEALTH,
            tile: DEFAULT_OBSTACLE_TILE,
            damaged_tile: DEFAULT_DAMAGED_TILE,
        }
    }
}

/// Consumable variant the spawner can instantiate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodPrefab {
    /// Resource granted on pickup.
    pub amount: i32,
}

impl Default for FoodPrefab {
    fn default() -> Self {
        Self {
            amount: delve_world::DEFAULT_FOOD_AMOUNT,
        }
    }
}

/// Hostile variant the spawner can instantiate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyPrefab {
    /// Health on spawn.
    pub health: i32,
    /// Health lost per bump attack.
    pub bump_damage: i32,
}

impl Default for EnemyPrefab {
    fn default() -> Self {
        Self {
            health: delve_world::DEFAULT_ENEMY_HEALTH,
            bump_damage: delve_world::DEFAULT_BUMP_DAMAGE,
        }
    }
}

/// Template that produces a fresh entity for every placement.
pub trait Prefab {
    /// Builds a new, unplaced entity.
    fn instantiate(&self) -> Entity;
}

impl Prefab for WallPrefab {
    fn instantiate(&self) -> Entity {
        Wall::new(self.health, self.tile, self.damaged_tile).into()
    }
}

impl Prefab for FoodPrefab {
    fn instantiate(&self) -> Entity {
        Food::new(self.amount).into()
    }
}

impl Prefab for EnemyPrefab {
    fn instantiate(&self) -> Entity {
        Enemy::new(self.health)
            .with_bump_damage(self.bump_damage)
            .into()
    }
}

/// Placement configuration for a single category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig<P> {
    /// Placement policy.
    pub mode: SpawnMode,
    /// Lower bound for [`SpawnMode::RandomCount`], inclusive.
    pub min_count: u32,
    /// Upper bound for [`SpawnMode::RandomCount`], inclusive.
    pub max_count: u32,
    /// Parameters for [`SpawnMode::Procedural`].
    pub procedural: ProceduralConfig,
    /// Variants drawn uniformly for each placement. Empty skips the category.
    pub prefabs: Vec<P>,
}

impl<P> Default for CategoryConfig<P> {
    fn default() -> Self {
        Self {
            mode: SpawnMode::RandomCount,
            min_count: 1,
            max_count: 3,
            procedural: ProceduralConfig::default(),
            prefabs: Vec::new(),
        }
    }
}

/// Configuration parameters required to construct the spawner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Destructible walls.
    pub obstacles: CategoryConfig<WallPrefab>,
    /// Food.
    pub consumables: CategoryConfig<FoodPrefab>,
    /// Enemies.
    pub hostiles: CategoryConfig<EnemyPrefab>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            obstacles: CategoryConfig {
                mode: SpawnMode::RandomCount,
                min_count: 6,
                max_count: 10,
                procedural: ProceduralConfig {
                    cells_per: 50,
                    level_multiplier: 0.2,
                    ..ProceduralConfig::default()
                },
                prefabs: vec![WallPrefab::default()],
            },
            consumables: CategoryConfig {
                mode: SpawnMode::RandomCount,
                min_count: 1,
                max_count: 3,
                procedural: ProceduralConfig::default(),
                prefabs: vec![FoodPrefab { amount: 3 }, FoodPrefab { amount: 5 }],
            },
            hostiles: CategoryConfig {
                mode: SpawnMode::Procedural,
                min_count: 1,
                max_count: 3,
                procedural: ProceduralConfig::default(),
                prefabs: vec![EnemyPrefab::default()],
            },
        }
    }
}

/// Outcome of spawning a single category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CategoryReport {
    /// Number of placements the mode asked for.
    pub requested: usize,
    /// Number of entities actually placed.
    pub placed: usize,
}

impl CategoryReport {
    /// Reports the shortfall when fewer entities were placed than requested.
    #[must_use]
    pub fn exhausted(&self) -> Option<GridError> {
        (self.placed < self.requested).then_some(GridError::PoolExhausted {
            requested: self.requested,
            available: self.placed,
        })
    }
}

/// Outcome of populating a board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Walls.
    pub obstacles: CategoryReport,
    /// Food.
    pub consumables: CategoryReport,
    /// Enemies.
    pub hostiles: CategoryReport,
}

impl SpawnReport {
    /// Total entities placed across categories.
    #[must_use]
    pub fn placed(&self) -> usize {
        self.obstacles.placed + self.consumables.placed + self.hostiles.placed
    }
}

/// Populates boards from configuration with a deterministic random stream.
#[derive(Debug)]
pub struct Spawner {
    config: SpawnerConfig,
    rng: ChaCha8Rng,
}

impl Spawner {
    /// Creates a spawner whose random stream starts from `seed`.
    #[must_use]
    pub fn new(config: SpawnerConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// Places obstacles, consumables and hostiles in that order.
    pub fn populate(
        &mut self,
        board: &mut Board,
        level: &dyn LevelState,
        tiles: &mut dyn TileLayer,
    ) -> SpawnReport {
        let current_level = level.current_level();
        let Self { config, rng } = self;
        let report = SpawnReport {
            obstacles: spawn_category(
                "obstacles",
                &config.obstacles,
                board,
                current_level,
                rng,
                tiles,
            ),
            consumables: spawn_category(
                "consumables",
                &config.consumables,
                board,
                current_level,
                rng,
                tiles,
            ),
            hostiles: spawn_category(
                "hostiles",
                &config.hostiles,
                board,
                current_level,
                rng,
                tiles,
            ),
        };
        log::debug!(
            "level {current_level}: placed {} obstacles, {} consumables, {} hostiles",
            report.obstacles.placed,
            report.consumables.placed,
            report.hostiles.placed
        );
        report
    }
}

fn spawn_category<P, R>(
    label: &str,
    category: &CategoryConfig<P>,
    board: &mut Board,
    level: u32,
    rng: &mut R,
    tiles: &mut dyn TileLayer,
) -> CategoryReport
where
    P: Prefab,
    R: Rng + ?Sized,
{
    if category.prefabs.is_empty() {
        log::warn!("no prefabs configured for {label}; skipping");
        return CategoryReport::default();
    }

    let report = match category.mode {
        SpawnMode::FixedCorners => place_corners(&category.prefabs, board, rng, tiles),
        SpawnMode::RandomCount => {
            let low = category.min_count.min(category.max_count);
            let high = category.min_count.max(category.max_count);
            let count = rng.gen_range(low..=high) as usize;
            place_random(&category.prefabs, count, board, rng, tiles)
        }
        SpawnMode::Procedural => {
            let count = category.procedural.count(board.area(), level);
            let clamped = count.min(board.empty_count());
            let mut report = place_random(&category.prefabs, clamped, board, rng, tiles);
            report.requested = count;
            report
        }
    };

    if let Some(shortfall) = report.exhausted() {
        log::debug!("{label}: {shortfall}");
    }
    report
}

fn place_corners<P, R>(
    prefabs: &[P],
    board: &mut Board,
    rng: &mut R,
    tiles: &mut dyn TileLayer,
) -> CategoryReport
where
    P: Prefab,
    R: Rng + ?Sized,
{
    let last_x = board.width() as i32 - 1;
    let last_y = board.height() as i32 - 1;
    let corners = [
        Coord::new(0, 0),
        Coord::new(last_x, 0),
        Coord::new(0, last_y),
        Coord::new(last_x, last_y),
    ];

    let mut report = CategoryReport {
        requested: corners.len(),
        placed: 0,
    };
    for corner in corners {
        if !board.is_empty_cell(corner) {
            continue;
        }
        let prefab = pick(prefabs, rng);
        if board
            .place_occupant(prefab.instantiate(), corner, tiles)
            .is_ok()
        {
            report.placed += 1;
        }
    }
    report
}

fn place_random<P, R>(
    prefabs: &[P],
    count: usize,
    board: &mut Board,
    rng: &mut R,
    tiles: &mut dyn TileLayer,
) -> CategoryReport
where
    P: Prefab,
    R: Rng + ?Sized,
{
    let mut report = CategoryReport {
        requested: count,
        placed: 0,
    };
    for _ in 0..count {
        let Some(cell) = board.sample_empty_cells(1, rng).pop() else {
            break;
        };
        let prefab = pick(prefabs, rng);
        match board.place_occupant(prefab.instantiate(), cell, tiles) {
            Ok(_) => report.placed += 1,
            Err(error) => {
                log::warn!("sampled cell {cell} rejected placement: {error}");
                let _ = board.release(cell);
            }
        }
    }
    report
}

fn pick<'a, P, R>(prefabs: &'a [P], rng: &mut R) -> &'a P
where
    R: Rng + ?Sized,
{
    &prefabs[rng.gen_range(0..prefabs.len())]
}
