/// Static geometry of one grid cell.
/// Everything that is not a wall is floor; entities stand on floor.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    Wall,
    #[default]
    Floor,
}

impl Tile {
    /// Map alphabet → tile. Entity markers sit on floor.
    pub fn from_char(ch: char) -> Self {
        match ch {
            'W' => Tile::Wall,
            _ => Tile::Floor,
        }
    }

    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Can an entity occupy this cell?
    pub fn is_passable(self) -> bool {
        !self.is_wall()
    }
}
