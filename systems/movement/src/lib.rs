#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player movement resolver that drives the two-phase contact protocol.

use delve_core::{Coord, Direction, EntityKind, GridError, LevelState, ResourcePool, TileLayer};
use delve_world::Board;

/// Result of resolving one player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The target cell is out of bounds or impassable. No turn was spent.
    Rejected(GridError),
    /// The player stepped into an empty cell.
    Moved {
        /// Cell the player now stands on.
        to: Coord,
    },
    /// The player stepped into a cell that held an occupant at check time.
    Entered {
        /// Cell the player now stands on.
        to: Coord,
        /// Kind of the occupant that admitted the player.
        kind: EntityKind,
    },
    /// The occupant denied entry and the player stayed put.
    Bumped {
        /// Cell of the occupant.
        target: Coord,
        /// Kind of the occupant.
        kind: EntityKind,
    },
}

impl StepOutcome {
    /// Whether the input spent a turn.
    #[must_use]
    pub const fn spent_turn(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Collaborators the resolver drives during a single step.
pub trait StepContext {
    /// Cell the player stands on.
    fn player_cell(&self) -> Coord;

    /// Updates the player position.
    fn move_player(&mut self, to: Coord);

    /// Fires one turn tick. Every subscriber must react before this returns.
    fn tick(&mut self, board: &mut Board);

    /// Tile layer touched by contact side effects.
    fn tiles(&mut self) -> &mut dyn TileLayer;

    /// Collaborators notified by the second contact phase.
    fn collaborators(&mut self) -> (&mut dyn ResourcePool, &mut dyn LevelState);
}

/// Resolves a player input against the board.
///
/// The order is fixed: legality check, tick, occupant read, first contact
/// phase, move, second contact phase. The second phase runs only when the
/// target held an occupant when it was read, even if that occupant destroyed
/// itself during the first phase.
pub fn resolve_step<C>(board: &mut Board, direction: Direction, context: &mut C) -> StepOutcome
where
    C: StepContext + ?Sized,
{
    let from = context.player_cell();
    let to = from.step(direction);
    if let Err(error) = check_target(board, to) {
        log::trace!("player step {direction:?} from {from} rejected: {error}");
        return StepOutcome::Rejected(error);
    }

    context.tick(board);

    let occupant = board
        .occupant(to)
        .and_then(|id| board.entity(id).map(|entity| (id, entity.kind())));

    if let Some((id, kind)) = occupant {
        let admitted = board.wants_to_enter(id, context.tiles()).unwrap_or(true);
        if !admitted {
            log::debug!("player bumps {kind:?} {id} at {to}");
            return StepOutcome::Bumped { target: to, kind };
        }
    }

    context.move_player(to);

    match occupant {
        Some((id, kind)) => {
            let (resources, level) = context.collaborators();
            if !board.entered(id, resources, level) {
                log::debug!("{kind:?} {id} left {to} before the player arrived");
            }
            StepOutcome::Entered { to, kind }
        }
        None => StepOutcome::Moved { to },
    }
}

fn check_target(board: &Board, to: Coord) -> Result<(), GridError> {
    let slot = board
        .cell_at(to)
        .ok_or(GridError::OutOfBounds { cell: to })?;
    if !slot.is_passable() {
        return Err(GridError::Impassable { cell: to });
    }
    Ok(())
}
