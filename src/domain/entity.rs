//! Entities: Player, Enemy, and the static pieces (cheese, key, door, trap).
//!
//! Positions are grid coordinates. World (pixel) positions and bounding
//! boxes are always derived from the grid position on demand, never stored.

use std::fmt;

/// Grid coordinate: (column, row), row grows downward.
///
/// Signed so a simulated step off the map is representable; such a
/// position is rejected at query time and never stored on an entity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct GridPos {
    pub col: i32,
    pub row: i32,
}

impl GridPos {
    pub const fn new(col: i32, row: i32) -> Self {
        GridPos { col, row }
    }

    /// Neighbouring cell in `dir`. Not bounds-checked.
    pub fn offset(self, dir: Direction) -> Self {
        let (dc, dr) = dir.delta();
        GridPos::new(self.col + dc, self.row + dr)
    }

    pub fn manhattan(self, other: GridPos) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }

    /// Top-left corner of this cell in world units.
    pub fn to_world(self, cell_size: u32) -> WorldPos {
        let cs = cell_size as i32;
        WorldPos { x: self.col * cs, y: self.row * cs }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Position in world units (grid coordinate × cell size).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
}

impl WorldPos {
    pub const fn new(x: i32, y: i32) -> Self {
        WorldPos { x, y }
    }

    /// Grid cell containing this point. Floors toward negative infinity.
    pub fn to_grid(self, cell_size: u32) -> GridPos {
        let cs = cell_size.max(1) as i32;
        GridPos::new(self.x.div_euclid(cs), self.y.div_euclid(cs))
    }
}

/// Axis-aligned bounding box in world units.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn origin(&self) -> WorldPos {
        WorldPos::new(self.x, self.y)
    }

    pub fn center(&self) -> WorldPos {
        WorldPos::new(self.x + self.w as i32 / 2, self.y + self.h as i32 / 2)
    }
}

/// Grid-quantized movement direction. One step = one cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Fixed neighbour order. Pathfinding tie-breaks depend on it.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// (column delta, row delta)
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EntityKind {
    Player,
    Enemy,
    Cheese,
    Key,
    Door,
    Trap,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source. One per level build.
#[derive(Debug, Default)]
pub struct IdCounter {
    next: u32,
}

impl IdCounter {
    pub fn new() -> Self {
        IdCounter { next: 0 }
    }

    pub fn next(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

// ── Capabilities ──

/// Anything with an identity and a cell on the grid.
pub trait Placed {
    fn id(&self) -> EntityId;
    fn kind(&self) -> EntityKind;
    fn position(&self) -> GridPos;

    /// Bounding box, recomputed from the grid position on every call.
    fn bounds(&self, cell_size: u32) -> Rect {
        let origin = self.position().to_world(cell_size);
        Rect { x: origin.x, y: origin.y, w: cell_size, h: cell_size }
    }
}

/// Entities that walk. `simulate_move` only proposes; validation is the
/// resolver's job.
pub trait Movable: Placed {
    fn set_position(&mut self, pos: GridPos);

    fn simulate_move(&self, dir: Direction) -> GridPos {
        self.position().offset(dir)
    }
}

// ── Concrete entities ──

#[derive(Clone, Debug)]
pub struct Player {
    pub id: EntityId,
    pub pos: GridPos,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: GridPos,
}

/// Static piece: cheese, key, door or trap.
#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: GridPos,
}

impl Placed for Player {
    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Player
    }

    fn position(&self) -> GridPos {
        self.pos
    }
}

impl Movable for Player {
    fn set_position(&mut self, pos: GridPos) {
        self.pos = pos;
    }
}

impl Placed for Enemy {
    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Enemy
    }

    fn position(&self) -> GridPos {
        self.pos
    }
}

impl Movable for Enemy {
    fn set_position(&mut self, pos: GridPos) {
        self.pos = pos;
    }
}

impl Placed for Entity {
    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn position(&self) -> GridPos {
        self.pos
    }
}

/// Mints every entity of a level so ids stay unique within it.
#[derive(Debug, Default)]
pub struct EntityFactory {
    ids: IdCounter,
}

impl EntityFactory {
    pub fn new() -> Self {
        EntityFactory { ids: IdCounter::new() }
    }

    pub fn player(&mut self, pos: GridPos) -> Player {
        Player { id: self.ids.next(), pos }
    }

    pub fn enemy(&mut self, pos: GridPos) -> Enemy {
        Enemy { id: self.ids.next(), pos }
    }

    pub fn piece(&mut self, kind: EntityKind, pos: GridPos) -> Entity {
        Entity { id: self.ids.next(), kind, pos }
    }
}
