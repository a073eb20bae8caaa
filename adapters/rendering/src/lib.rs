#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile storage and text presentation for delve adapters.

use std::{fmt, io::Write};

use anyhow::{Context, Result as AnyResult};
use delve_core::{Coord, EntityKind, TileLayer, TileRef};
use delve_world::{Board, Entity};

/// Dense tile layer that grows to fit whatever is painted onto it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: Vec<Option<TileRef>>,
}

impl TileMap {
    /// Creates an unpainted map of the provided size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            tiles: vec![None; len],
        }
    }

    /// Columns currently allocated.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Rows currently allocated.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells with a tile.
    #[must_use]
    pub fn painted(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_some()).count()
    }

    fn index(&self, cell: Coord) -> Option<usize> {
        let x = u32::try_from(cell.x()).ok()?;
        let y = u32::try_from(cell.y()).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn grow_to_fit(&mut self, x: u32, y: u32) {
        let width = self.width.max(x.saturating_add(1));
        let height = self.height.max(y.saturating_add(1));
        if width == self.width && height == self.height {
            return;
        }

        let mut grown = Self::new(width, height);
        for row in 0..self.height {
            for column in 0..self.width {
                let from = row as usize * self.width as usize + column as usize;
                let to = row as usize * width as usize + column as usize;
                grown.tiles[to] = self.tiles[from];
            }
        }
        *self = grown;
    }
}

impl TileLayer for TileMap {
    fn tile(&self, cell: Coord) -> Option<TileRef> {
        self.index(cell).and_then(|index| self.tiles[index])
    }

    fn set_tile(&mut self, cell: Coord, tile: TileRef) {
        let (Ok(x), Ok(y)) = (u32::try_from(cell.x()), u32::try_from(cell.y())) else {
            return;
        };
        self.grow_to_fit(x, y);
        if let Some(index) = self.index(cell) {
            self.tiles[index] = Some(tile);
        }
    }
}

/// Characters used by the text renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    /// Player.
    pub player: char,
    /// Passable cell without an occupant.
    pub ground: char,
    /// Impassable border cell.
    pub border: char,
    /// Cell nothing was painted on.
    pub unpainted: char,
    /// Food.
    pub food: char,
    /// Intact wall.
    pub wall: char,
    /// Wall with one bump left.
    pub damaged_wall: char,
    /// Exit.
    pub exit: char,
    /// Enemy.
    pub enemy: char,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            player: '@',
            ground: '.',
            border: '+',
            unpainted: ' ',
            food: 'f',
            wall: '#',
            damaged_wall: '%',
            exit: 'E',
            enemy: 'e',
        }
    }
}

impl Glyphs {
    fn entity(&self, entity: &Entity) -> char {
        match entity.kind() {
            EntityKind::Food => self.food,
            EntityKind::Wall => {
                if entity.as_wall().is_some_and(|wall| wall.is_nearly_destroyed()) {
                    self.damaged_wall
                } else {
                    self.wall
                }
            }
            EntityKind::Exit => self.exit,
            EntityKind::Enemy => self.enemy,
        }
    }
}

/// Rendered board, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    rows: Vec<String>,
}

impl Frame {
    /// Rows from north to south.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Renders the board with the default glyphs.
#[must_use]
pub fn render_ascii(board: &Board, tiles: &dyn TileLayer, player: Coord) -> Frame {
    render_with(board, tiles, player, &Glyphs::default())
}

/// Renders the board with custom glyphs.
///
/// The player is drawn over whatever shares its cell. Occupants are drawn
/// over their tile.
#[must_use]
pub fn render_with(board: &Board, tiles: &dyn TileLayer, player: Coord, glyphs: &Glyphs) -> Frame {
    let rows = (0..board.height() as i32)
        .rev()
        .map(|y| {
            (0..board.width() as i32)
                .map(|x| glyph_at(board, tiles, player, glyphs, Coord::new(x, y)))
                .collect()
        })
        .collect();
    Frame { rows }
}

fn glyph_at(
    board: &Board,
    tiles: &dyn TileLayer,
    player: Coord,
    glyphs: &Glyphs,
    cell: Coord,
) -> char {
    if cell == player {
        return glyphs.player;
    }
    if let Some(entity) = board.entity_at(cell) {
        return glyphs.entity(entity);
    }
    if tiles.tile(cell).is_none() {
        return glyphs.unpainted;
    }
    match board.cell_at(cell) {
        Some(slot) if slot.is_passable() => glyphs.ground,
        _ => glyphs.border,
    }
}

/// Summary shown beneath a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusLine {
    /// Current level.
    pub level: u32,
    /// Remaining resource.
    pub resource: i32,
    /// Ticks dispatched so far.
    pub turn: u64,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level {} | food {} | turn {}",
            self.level, self.resource, self.turn
        )
    }
}

/// Destination for rendered frames.
pub trait RenderingBackend {
    /// Presents one frame with its status line.
    fn present(&mut self, frame: &Frame, status: StatusLine) -> AnyResult<()>;
}

/// Backend that writes frames as text.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
}

impl<W> TextBackend<W>
where
    W: Write,
{
    /// Wraps a writer.
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W> RenderingBackend for TextBackend<W>
where
    W: Write,
{
    fn present(&mut self, frame: &Frame, status: StatusLine) -> AnyResult<()> {
        write!(self.out, "{frame}{status}\n\n").context("failed to write frame")?;
        self.out.flush().context("failed to flush frame")
    }
}
