#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level construction: board sizing, tile painting, exit placement and
//! content spawning.

use delve_core::{Coord, LevelState, TileLayer, TileRef};
use delve_system_spawning::{SpawnReport, Spawner};
use delve_world::{Board, BorderRule, ExitCell};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Smallest side length a board can have.
pub const MIN_SIZE: u32 = 3;

/// Configuration parameters for level sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Side length of the first level.
    pub base_size: u32,
    /// Largest side length any level may reach.
    pub max_size: u32,
    /// Impassable rings along the board edge.
    pub border: BorderRule,
    /// Cell the player starts each level on.
    pub spawn: Coord,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            base_size: 8,
            max_size: 255,
            border: BorderRule::default(),
            spawn: Coord::new(1, 1),
        }
    }
}

/// Computes board dimensions from the level number.
#[derive(Clone, Copy, Debug, Default)]
pub struct LevelGenerator {
    config: LevelConfig,
}

impl LevelGenerator {
    /// Creates a generator from configuration.
    #[must_use]
    pub const fn new(config: LevelConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Side length of the square board for `level`.
    ///
    /// Grows by one cell per level from `base_size`, clamped to
    /// `[3, max_size]`, and always wide enough for two interior cells per
    /// row so the spawn and the exit never share a cell.
    #[must_use]
    pub fn size_for_level(&self, level: u32) -> u32 {
        let grown = self
            .config
            .base_size
            .saturating_add(level.max(1) - 1);
        let upper = self.config.max_size.max(MIN_SIZE);
        let interior_floor = self
            .config
            .border
            .thickness()
            .saturating_mul(2)
            .saturating_add(2);
        grown.clamp(MIN_SIZE, upper).max(interior_floor)
    }
}

/// Tiles painted onto a fresh board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilePalette {
    /// Variants drawn for passable cells.
    pub ground: Vec<TileRef>,
    /// Variants drawn for border cells.
    pub border: Vec<TileRef>,
    /// Tile marking the exit.
    pub exit: TileRef,
}

/// Ground variant shown on passable cells by default.
pub const GROUND_TILES: [TileRef; 3] = [TileRef::new(1), TileRef::new(2), TileRef::new(3)];
/// Border variant shown on impassable cells by default.
pub const BORDER_TILES: [TileRef; 2] = [TileRef::new(8), TileRef::new(9)];
/// Tile marking the exit by default.
pub const EXIT_TILE: TileRef = TileRef::new(4);

impl Default for TilePalette {
    fn default() -> Self {
        Self {
            ground: GROUND_TILES.to_vec(),
            border: BORDER_TILES.to_vec(),
            exit: EXIT_TILE,
        }
    }
}

/// A freshly built level.
#[derive(Debug)]
pub struct Level {
    /// Level number the board was built for.
    pub number: u32,
    /// Populated board.
    pub board: Board,
    /// Cell the player starts on.
    pub spawn: Coord,
    /// Cell holding the exit.
    pub exit: Coord,
    /// What the spawner placed.
    pub report: SpawnReport,
}

/// Builds levels with a deterministic tile-variant stream.
#[derive(Debug)]
pub struct LevelBuilder {
    generator: LevelGenerator,
    palette: TilePalette,
    rng: ChaCha8Rng,
}

impl LevelBuilder {
    /// Creates a builder whose tile choices start from `seed`.
    #[must_use]
    pub fn new(config: LevelConfig, palette: TilePalette, seed: u64) -> Self {
        Self {
            generator: LevelGenerator::new(config),
            palette,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Sizing rules in use.
    #[must_use]
    pub const fn generator(&self) -> &LevelGenerator {
        &self.generator
    }

    /// Builds the board for the current level.
    ///
    /// Tiles are painted first so obstacles can remember the ground they
    /// cover. The spawn and exit cells are reserved before the spawner runs.
    pub fn build_level(
        &mut self,
        level: &dyn LevelState,
        tiles: &mut dyn TileLayer,
        spawner: &mut Spawner,
    ) -> Level {
        let number = level.current_level();
        let side = self.generator.size_for_level(number);
        let config = self.generator.config;
        let inset = config.border.thickness() as i32;
        let far = side as i32 - 1 - inset;

        let spawn = Coord::new(
            config.spawn.x().clamp(inset, far),
            config.spawn.y().clamp(inset, far),
        );
        let exit = if spawn == Coord::new(far, far) {
            Coord::new(inset, inset)
        } else {
            Coord::new(far, far)
        };

        let mut board = Board::new(side, side, config.border, &[spawn, exit]);
        self.paint(&board, tiles);

        if let Err(error) = board.place_occupant(ExitCell::new(self.palette.exit), exit, tiles) {
            log::warn!("level {number}: exit could not be placed: {error}");
        }

        let report = spawner.populate(&mut board, level, tiles);
        log::info!(
            "level {number}: {side}x{side} board, spawn {spawn}, exit {exit}, {} entities",
            board.entity_count()
        );

        Level {
            number,
            board,
            spawn,
            exit,
            report,
        }
    }

    fn paint(&mut self, board: &Board, tiles: &mut dyn TileLayer) {
        for y in 0..board.height() as i32 {
            for x in 0..board.width() as i32 {
                let cell = Coord::new(x, y);
                let passable = board.cell_at(cell).is_some_and(|slot| slot.is_passable());
                let variants = if passable {
                    &self.palette.ground
                } else {
                    &self.palette.border
                };
                if variants.is_empty() {
                    continue;
                }
                let tile = variants[self.rng.gen_range(0..variants.len())];
                tiles.set_tile(cell, tile);
            }
        }
    }
}
