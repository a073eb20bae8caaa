#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick enemy reaction: attack an adjacent player or close the distance.

use delve_core::{Coord, Direction, EntityId, EntityKind, PlayerState};
use delve_world::{query, Board};
use serde::{Deserialize, Serialize};

/// Damage dealt to an adjacent player in the reference design.
pub const DEFAULT_ATTACK_DAMAGE: i32 = 3;

/// Configuration parameters for enemy behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Damage dealt to the player when adjacent.
    pub attack_damage: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            attack_damage: DEFAULT_ATTACK_DAMAGE,
        }
    }
}

/// What an enemy did in response to a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    /// The player was adjacent and took damage.
    Attacked {
        /// Damage dealt.
        damage: i32,
    },
    /// The enemy stepped one cell toward the player.
    Moved {
        /// Cell the enemy left.
        from: Coord,
        /// Cell the enemy entered.
        to: Coord,
    },
    /// Both candidate steps were illegal.
    Stationary,
    /// The subscriber no longer names an enemy on the board.
    Absent,
}

/// Greedy axis-priority chaser.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnemyBehavior {
    config: Config,
}

impl EnemyBehavior {
    /// Creates the behaviour from configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Re-evaluates one enemy against the current player position.
    ///
    /// The larger axis distance is tried first, with ties going to the y
    /// axis. When that step is out of bounds, impassable or occupied the
    /// other axis is tried; the enemy moves through [`Board::relocate`] so
    /// occupancy is never observed in a half-moved state.
    pub fn react(
        &self,
        board: &mut Board,
        enemy: EntityId,
        player: &mut dyn PlayerState,
    ) -> Reaction {
        let Some(position) = enemy_position(board, enemy) else {
            return Reaction::Absent;
        };

        let target = player.cell();
        if target.is_adjacent_to(position) {
            let damage = self.config.attack_damage;
            player.receive_damage(damage);
            log::debug!("enemy {enemy} at {position} hits player for {damage}");
            return Reaction::Attacked { damage };
        }

        let dx = target.x() - position.x();
        let dy = target.y() - position.y();
        let attempts = if dx.abs() > dy.abs() {
            [horizontal(dx), vertical(dy)]
        } else {
            [vertical(dy), horizontal(dx)]
        };

        for direction in attempts {
            let to = position.step(direction);
            match board.relocate(enemy, to) {
                Ok(from) => {
                    log::trace!("enemy {enemy} steps {from} -> {to}");
                    return Reaction::Moved { from, to };
                }
                Err(error) => log::trace!("enemy {enemy} cannot step {direction:?}: {error}"),
            }
        }

        Reaction::Stationary
    }
}

fn enemy_position(board: &Board, enemy: EntityId) -> Option<Coord> {
    let entity = board.entity(enemy)?;
    if entity.kind() != EntityKind::Enemy {
        return None;
    }
    query::position_of(board, enemy)
}

fn horizontal(dx: i32) -> Direction {
    if dx > 0 {
        Direction::East
    } else {
        Direction::West
    }
}

fn vertical(dy: i32) -> Direction {
    if dy > 0 {
        Direction::North
    } else {
        Direction::South
    }
}
