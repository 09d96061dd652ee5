//! Grid model: map text → walls/floor + spawn points.
//!
//! ## Map alphabet
//!   'W' = Wall          'P' = Player spawn
//!   'E' = Enemy spawn   'C' = Cheese
//!   'K' = Key           'D' = Door
//!   'T' = Trap          anything else = Floor
//!
//! Marker cells are floor. Rows shorter than the widest row are padded with
//! floor so the grid is always rectangular.

use crate::error::ParseError;

use super::entity::GridPos;
use super::tile::Tile;

/// Substituted when the map has no 'P'.
pub const FALLBACK_SPAWN: GridPos = GridPos::new(1, 1);

/// Static geometry. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Build from rows of tiles. Short rows are padded with floor.
    pub fn from_rows(mut tiles: Vec<Vec<Tile>>) -> Self {
        let height = tiles.len();
        let width = tiles.iter().map(|r| r.len()).max().unwrap_or(0);
        for row in &mut tiles {
            row.resize(width, Tile::Floor);
        }
        Grid { tiles, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.col >= 0
            && pos.row >= 0
            && (pos.col as usize) < self.width
            && (pos.row as usize) < self.height
    }

    /// Tile at `pos`, or None outside the grid.
    #[inline]
    pub fn tile(&self, pos: GridPos) -> Option<Tile> {
        if self.in_bounds(pos) {
            Some(self.tiles[pos.row as usize][pos.col as usize])
        } else {
            None
        }
    }

    /// True only for an in-bounds wall. Out-of-bounds is not a wall.
    #[inline]
    pub fn is_wall(&self, pos: GridPos) -> bool {
        self.tile(pos).is_some_and(Tile::is_wall)
    }

    /// Wall or off the map. What the pathfinder treats as an obstacle.
    #[inline]
    pub fn is_blocked(&self, pos: GridPos) -> bool {
        self.tile(pos).map_or(true, Tile::is_wall)
    }

    /// In-bounds floor cell?
    #[inline]
    pub fn is_floor(&self, pos: GridPos) -> bool {
        self.tile(pos).is_some_and(Tile::is_passable)
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (GridPos, Tile)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(row, tiles)| {
            tiles
                .iter()
                .enumerate()
                .map(move |(col, &t)| (GridPos::new(col as i32, row as i32), t))
        })
    }
}

/// Where entities start, as read from the map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Spawns {
    pub player: GridPos,
    /// True when `player` came from `FALLBACK_SPAWN`.
    pub player_fallback: bool,
    pub enemy: Option<GridPos>,
    pub key: Option<GridPos>,
    pub door: Option<GridPos>,
    pub cheese: Vec<GridPos>,
    pub traps: Vec<GridPos>,
}

/// Parsed level: geometry + spawn points.
#[derive(Clone, Debug)]
pub struct Level {
    pub grid: Grid,
    pub spawns: Spawns,
}

/// Parse map text. One line per grid row.
pub fn parse(map_text: &str) -> Result<Level, ParseError> {
    let mut lines: Vec<&str> = map_text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .collect();
    // Whitespace-only rows are floor; only truly empty trailing lines go.
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut tiles = Vec::with_capacity(lines.len());
    let mut player: Option<GridPos> = None;
    let mut spawns = Spawns::default();

    for (row, line) in lines.iter().enumerate() {
        let mut tile_row = Vec::with_capacity(line.len());
        for (col, ch) in line.chars().enumerate() {
            tile_row.push(Tile::from_char(ch));
            let pos = GridPos::new(col as i32, row as i32);
            match ch {
                'P' => place_once(&mut player, 'P', pos)?,
                'E' => place_once(&mut spawns.enemy, 'E', pos)?,
                'K' => place_once(&mut spawns.key, 'K', pos)?,
                'D' => place_once(&mut spawns.door, 'D', pos)?,
                'C' => spawns.cheese.push(pos),
                'T' => spawns.traps.push(pos),
                _ => {}
            }
        }
        tiles.push(tile_row);
    }

    let grid = Grid::from_rows(tiles);

    match player {
        Some(pos) => spawns.player = pos,
        None => {
            if !grid.is_floor(FALLBACK_SPAWN) {
                return Err(ParseError::NoSpawn { fallback: FALLBACK_SPAWN });
            }
            tracing::warn!("map has no 'P' marker, spawning player at {}", FALLBACK_SPAWN);
            spawns.player = FALLBACK_SPAWN;
            spawns.player_fallback = true;
        }
    }

    Ok(Level { grid, spawns })
}

fn place_once(slot: &mut Option<GridPos>, marker: char, pos: GridPos) -> Result<(), ParseError> {
    match *slot {
        Some(first) => Err(ParseError::DuplicateMarker { marker, first, second: pos }),
        None => {
            *slot = Some(pos);
            Ok(())
        }
    }
}
