//! Movement and win rules, truth-table driven.
//!
//! Pure functions, no side effects. They say what is legal; `sim::step`
//! performs it.
//!
//! ## Move (player and enemy)
//! ┌──────────────────────┬─────────┬─────────────────────┐
//! │ Condition             │ Result  │ Notes               │
//! ├──────────────────────┼─────────┼─────────────────────┤
//! │ dest out of bounds    │ DENY    │ checked first       │
//! │ dest is wall          │ DENY    │                     │
//! │ otherwise             │ ALLOW   │ doors never block   │
//! └──────────────────────┴─────────┴─────────────────────┘
//!
//! ## Exit
//! ┌──────────────────────────────────────────┬─────────┐
//! │ Condition                                 │ Result  │
//! ├──────────────────────────────────────────┼─────────┤
//! │ on door ∧ has key ∧ no cheese left         │ WIN     │
//! │ anything else                              │ nothing │
//! └──────────────────────────────────────────┴─────────┘

use super::entity::{Direction, GridPos, Movable};
use super::grid::Grid;

/// Why a move was refused. A silent no-op for gameplay, kept for logs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Blocked {
    OutOfBounds,
    Wall,
}

/// Validate a candidate destination cell.
pub fn validate_target(grid: &Grid, candidate: GridPos) -> Result<GridPos, Blocked> {
    if !grid.in_bounds(candidate) {
        return Err(Blocked::OutOfBounds);
    }
    if grid.is_wall(candidate) {
        return Err(Blocked::Wall);
    }
    Ok(candidate)
}

/// Simulate `mover` stepping one cell in `dir` and validate the result.
pub fn validate_move<M: Movable + ?Sized>(grid: &Grid, mover: &M, dir: Direction) -> Result<GridPos, Blocked> {
    validate_target(grid, mover.simulate_move(dir))
}

/// All three exit conditions must hold at once.
pub fn can_win(on_door: bool, has_key: bool, cheese_left: usize) -> bool {
    on_door && has_key && cheese_left == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EntityFactory;
    use crate::domain::grid;

    fn level(rows: &[&str]) -> grid::Level {
        grid::parse(&rows.join("\n")).unwrap()
    }

    #[test]
    fn floor_move_allowed() {
        let l = level(&["P  "]);
        let p = EntityFactory::new().player(l.spawns.player);
        assert_eq!(validate_move(&l.grid, &p, Direction::Right), Ok(GridPos::new(1, 0)));
    }

    #[test]
    fn wall_move_denied() {
        let l = level(&["PW"]);
        let p = EntityFactory::new().player(l.spawns.player);
        assert_eq!(validate_move(&l.grid, &p, Direction::Right), Err(Blocked::Wall));
    }

    #[test]
    fn edge_move_denied_as_out_of_bounds() {
        let l = level(&["P"]);
        let p = EntityFactory::new().player(l.spawns.player);
        for dir in Direction::ALL {
            assert_eq!(validate_move(&l.grid, &p, dir), Err(Blocked::OutOfBounds));
        }
    }

    #[test]
    fn boxed_in_player_cannot_move() {
        let l = level(&["WWW", "WPW", "WWW"]);
        let p = EntityFactory::new().player(l.spawns.player);
        for dir in Direction::ALL {
            assert_eq!(validate_move(&l.grid, &p, dir), Err(Blocked::Wall));
        }
    }

    #[test]
    fn marker_cells_do_not_block() {
        let l = level(&["PDKTCE"]);
        for col in 1..6 {
            assert!(validate_target(&l.grid, GridPos::new(col, 0)).is_ok());
        }
    }

    #[test]
    fn win_needs_every_conjunct() {
        assert!(can_win(true, true, 0));
        assert!(!can_win(false, true, 0));
        assert!(!can_win(true, false, 0));
        assert!(!can_win(true, true, 1));
    }
}
