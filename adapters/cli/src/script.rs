//! Parsing of scripted move strings such as `NNEESW`.

use anyhow::{bail, Result};
use delve_core::Direction;

/// Parses one direction per letter. Whitespace and commas are ignored.
pub(crate) fn parse(script: &str) -> Result<Vec<Direction>> {
    let mut moves = Vec::with_capacity(script.len());
    for (position, letter) in script.chars().enumerate() {
        let direction = match letter.to_ascii_uppercase() {
            'N' => Direction::North,
            'E' => Direction::East,
            'S' => Direction::South,
            'W' => Direction::West,
            ',' => continue,
            other if other.is_whitespace() => continue,
            other => bail!("unknown move {other:?} at position {}", position + 1),
        };
        moves.push(direction);
    }
    Ok(moves)
}
