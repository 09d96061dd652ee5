//! Enemy pursuit: BFS over the static grid.
//!
//! Each frontier entry carries the direction of the *first* step out of the
//! origin, fixed at depth 1 and inherited by every descendant. The answer is
//! read straight off the target's entry, so no parent map or path
//! reconstruction is needed.
//!
//! Neighbour order is `Direction::ALL` (Up, Down, Left, Right). With a FIFO
//! frontier this makes ties between equal-length paths deterministic: the
//! path whose first step comes earliest in that order wins.

use std::collections::VecDeque;

use super::entity::{Direction, GridPos};
use super::grid::Grid;

/// First step of a shortest path from `origin` to `target`.
///
/// Returns None when already there, or when `target` cannot be reached
/// (the enemy holds position that tick).
pub fn first_step(origin: GridPos, target: GridPos, grid: &Grid) -> Option<Direction> {
    if origin == target {
        return None;
    }
    if grid.is_blocked(origin) || grid.is_blocked(target) {
        return None;
    }

    let width = grid.width();
    let index = |p: GridPos| p.row as usize * width + p.col as usize;

    let mut visited = vec![false; width * grid.height()];
    visited[index(origin)] = true;

    let mut queue: VecDeque<(GridPos, Direction)> = VecDeque::with_capacity(64);

    for dir in Direction::ALL {
        let next = origin.offset(dir);
        if grid.is_blocked(next) || visited[index(next)] {
            continue;
        }
        visited[index(next)] = true;
        queue.push_back((next, dir));
    }

    while let Some((cell, first)) = queue.pop_front() {
        if cell == target {
            return Some(first);
        }
        for dir in Direction::ALL {
            let next = cell.offset(dir);
            if grid.is_blocked(next) || visited[index(next)] {
                continue;
            }
            visited[index(next)] = true;
            queue.push_back((next, first));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;

    /// '#' = wall, anything else floor.
    fn grid_from(rows: &[&str]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|r| r.chars().map(|c| if c == '#' { Tile::Wall } else { Tile::Floor }).collect())
                .collect(),
        )
    }

    fn open(w: usize, h: usize) -> Grid {
        Grid::from_rows(vec![vec![Tile::Floor; w]; h])
    }

    // ── Straight lines ──

    #[test]
    fn straight_line_reduces_distance_by_one() {
        let g = open(7, 7);
        let center = GridPos::new(3, 3);
        for col in 0..7 {
            for row in 0..7 {
                let target = GridPos::new(col, row);
                if target == center || (col != 3 && row != 3) {
                    continue;
                }
                let dir = first_step(center, target, &g).expect("reachable");
                let before = center.manhattan(target);
                let after = center.offset(dir).manhattan(target);
                assert_eq!(after + 1, before, "target {target}");
            }
        }
    }

    #[test]
    fn vertical_corridor_steps_toward_player() {
        // Enemy at (0,2), player at (0,0): row shrinks → Up
        let g = grid_from(&[" #", " #", " #"]);
        assert_eq!(first_step(GridPos::new(0, 2), GridPos::new(0, 0), &g), Some(Direction::Up));
        assert_eq!(first_step(GridPos::new(0, 0), GridPos::new(0, 2), &g), Some(Direction::Down));
    }

    #[test]
    fn adjacent_target() {
        let g = open(3, 1);
        assert_eq!(first_step(GridPos::new(1, 0), GridPos::new(2, 0), &g), Some(Direction::Right));
        assert_eq!(first_step(GridPos::new(1, 0), GridPos::new(0, 0), &g), Some(Direction::Left));
    }

    // ── Unreachable ──

    #[test]
    fn sealed_wall_returns_none() {
        let g = grid_from(&[
            "  #  ",
            "  #  ",
            "  #  ",
        ]);
        for row in 0..3 {
            assert_eq!(first_step(GridPos::new(0, row), GridPos::new(4, 2 - row), &g), None);
        }
    }

    #[test]
    fn enclosed_target_returns_none() {
        let g = grid_from(&[
            "     ",
            " ### ",
            " # # ",
            " ### ",
        ]);
        assert_eq!(first_step(GridPos::new(0, 0), GridPos::new(2, 2), &g), None);
    }

    #[test]
    fn same_cell_returns_none() {
        let g = open(2, 2);
        assert_eq!(first_step(GridPos::new(1, 1), GridPos::new(1, 1), &g), None);
    }

    #[test]
    fn out_of_bounds_target_returns_none() {
        let g = open(2, 2);
        assert_eq!(first_step(GridPos::new(0, 0), GridPos::new(5, 0), &g), None);
        assert_eq!(first_step(GridPos::new(0, 0), GridPos::new(0, -1), &g), None);
    }

    // ── Detours ──

    #[test]
    fn goes_around_wall() {
        let g = grid_from(&[
            "     ",
            " ### ",
            "  #  ",
        ]);
        // Only way out of (1,2) is Left, then around the top row
        assert_eq!(first_step(GridPos::new(1, 2), GridPos::new(3, 2), &g), Some(Direction::Left));
    }

    #[test]
    fn wall_forces_up_over_straight_line() {
        let g = grid_from(&[
            "   ",
            " # ",
        ]);
        // (0,1) → (2,1) blocked directly; must go Up first
        assert_eq!(first_step(GridPos::new(0, 1), GridPos::new(2, 1), &g), Some(Direction::Up));
    }

    // ── Tie-break determinism ──

    #[test]
    fn diagonal_ties_follow_neighbour_order() {
        let g = open(3, 3);
        let c = GridPos::new(1, 1);
        // Each diagonal target has two equal-length paths; the earlier
        // direction in Up, Down, Left, Right wins.
        assert_eq!(first_step(c, GridPos::new(0, 0), &g), Some(Direction::Up));
        assert_eq!(first_step(c, GridPos::new(2, 0), &g), Some(Direction::Up));
        assert_eq!(first_step(c, GridPos::new(0, 2), &g), Some(Direction::Down));
        assert_eq!(first_step(c, GridPos::new(2, 2), &g), Some(Direction::Down));
    }

    #[test]
    fn ties_exhaustive_on_open_grid() {
        let g = open(5, 5);
        for oc in 0..5 {
            for or in 0..5 {
                for tc in 0..5 {
                    for tr in 0..5 {
                        let o = GridPos::new(oc, or);
                        let t = GridPos::new(tc, tr);
                        let got = first_step(o, t, &g);
                        let expected = if o == t {
                            None
                        } else if tr < or {
                            Some(Direction::Up)
                        } else if tr > or {
                            Some(Direction::Down)
                        } else if tc < oc {
                            Some(Direction::Left)
                        } else {
                            Some(Direction::Right)
                        };
                        assert_eq!(got, expected, "{o} -> {t}");
                    }
                }
            }
        }
    }

    #[test]
    fn tie_between_two_corridors_picks_up() {
        let g = grid_from(&[
            "   ",
            " # ",
            "   ",
        ]);
        // (0,1) → (2,1): via top row (Up) or bottom row (Down), both length 4
        assert_eq!(first_step(GridPos::new(0, 1), GridPos::new(2, 1), &g), Some(Direction::Up));
    }
}
