//! Built-in self-test suite (`mazerunner test`).
//!
//! Replays the core gameplay guarantees against small hand-drawn maps and
//! reports one line per check. Independent of the level file and config.

use tracing::{debug, error};

use crate::config::ScoringConfig;
use crate::domain::entity::{Direction, GridPos};
use crate::domain::grid::{self, Grid};
use crate::domain::{pathfind, rules};
use crate::sim::event::GameEvent;
use crate::sim::step::{self, TickInput};
use crate::sim::world::{GameState, LossCause, Phase};

type Check = fn() -> Result<(), String>;

const CHECKS: &[(&str, Check)] = &[
    ("pursuit step shortens a straight line", straight_line),
    ("sealed wall leaves no path", sealed_wall),
    ("equal paths prefer Up, Down, Left, Right", tie_order),
    ("walls and map edges block moves", blocked_moves),
    ("cheese adds the bonus once", cheese_bonus),
    ("door needs key and every cheese", win_conjuncts),
    ("boxed player never moves", boxed_player),
    ("enemy walks up an open column", vertical_corridor),
    ("trap ends the level and keeps the score", cheese_then_trap),
    ("cat on the door cell catches before the door opens", caught_on_door),
];

/// Run every check. True when all pass.
pub fn run() -> bool {
    let mut failed = 0;
    for (name, check) in CHECKS {
        match check() {
            Ok(()) => {
                debug!("self-test passed: {name}");
                println!("ok    {name}");
            }
            Err(why) => {
                error!("self-test failed: {name}: {why}");
                println!("FAIL  {name}: {why}");
                failed += 1;
            }
        }
    }
    println!("{} passed, {} failed", CHECKS.len() - failed, failed);
    failed == 0
}

// ── Helpers ──

fn ensure(cond: bool, why: impl FnOnce() -> String) -> Result<(), String> {
    if cond { Ok(()) } else { Err(why()) }
}

fn state(rows: &[&str]) -> Result<GameState, String> {
    grid::parse(&rows.join("\n"))
        .map(GameState::from_level)
        .map_err(|e| format!("test map rejected: {e}"))
}

fn open_grid(rows: &[&str]) -> Result<Grid, String> {
    Ok(state(rows)?.grid)
}

fn moves(dirs: &[Direction]) -> TickInput {
    TickInput { moves: dirs.to_vec(), quit: false }
}

fn scoring() -> ScoringConfig {
    ScoringConfig { cheese_bonus: 10 }
}

// ── Checks ──

fn straight_line() -> Result<(), String> {
    let g = open_grid(&["P     "])?;
    let (from, to) = (GridPos::new(5, 0), GridPos::new(0, 0));
    let dir = pathfind::first_step(from, to, &g).ok_or("no step found")?;
    let next = from.offset(dir);
    ensure(next.manhattan(to) + 1 == from.manhattan(to), || format!("{from} → {next} did not get closer"))
}

fn sealed_wall() -> Result<(), String> {
    let g = open_grid(&["P W ", "  W ", "  W "])?;
    let step = pathfind::first_step(GridPos::new(0, 0), GridPos::new(3, 0), &g);
    ensure(step.is_none(), || format!("expected no path, got {step:?}"))
}

fn tie_order() -> Result<(), String> {
    // Target is one row up and one column right: Up and Right both shortest.
    let g = open_grid(&["P  ", "   "])?;
    let step = pathfind::first_step(GridPos::new(0, 1), GridPos::new(1, 0), &g);
    ensure(step == Some(Direction::Up), || format!("expected Up, got {step:?}"))
}

fn blocked_moves() -> Result<(), String> {
    let mut s = state(&["PW"])?;
    step::step(&mut s, &moves(&[Direction::Right, Direction::Up, Direction::Left]), false, &scoring());
    ensure(s.player.pos == GridPos::new(0, 0), || format!("player moved to {}", s.player.pos))?;
    let out = rules::validate_target(&s.grid, GridPos::new(-1, 0));
    ensure(out.is_err(), || "off-map target accepted".into())
}

fn cheese_bonus() -> Result<(), String> {
    let mut s = state(&["PCC"])?;
    let mut last = s.score;
    for expected_left in [1, 0] {
        step::step(&mut s, &moves(&[Direction::Right]), false, &scoring());
        ensure(s.score == last + 10, || format!("score {} after {}", s.score, last))?;
        ensure(s.cheese_left() == expected_left, || format!("{} cheese left", s.cheese_left()))?;
        last = s.score;
    }
    // Walking back over eaten cells changes nothing.
    step::step(&mut s, &moves(&[Direction::Left, Direction::Right]), false, &scoring());
    ensure(s.score == 20, || format!("score {} after revisiting", s.score))
}

fn win_conjuncts() -> Result<(), String> {
    for on_door in [false, true] {
        for has_key in [false, true] {
            for cheese_left in [0, 1] {
                let expected = on_door && has_key && cheese_left == 0;
                ensure(rules::can_win(on_door, has_key, cheese_left) == expected, || {
                    format!("can_win({on_door}, {has_key}, {cheese_left}) != {expected}")
                })?;
            }
        }
    }
    // Key but cheese left: the door stays shut.
    let mut s = state(&["PKDC"])?;
    step::step(&mut s, &moves(&[Direction::Right, Direction::Right]), false, &scoring());
    ensure(s.phase == Phase::Running, || format!("phase {:?} with cheese left", s.phase))
}

fn boxed_player() -> Result<(), String> {
    let mut s = state(&["WWW", "WPW", "WWW"])?;
    for dir in Direction::ALL {
        step::step(&mut s, &moves(&[dir]), false, &scoring());
    }
    ensure(s.player.pos == GridPos::new(1, 1), || format!("player escaped to {}", s.player.pos))
}

fn vertical_corridor() -> Result<(), String> {
    let mut s = state(&["PW", " W", "EW"])?;
    let events = step::step(&mut s, &TickInput::default(), true, &scoring());
    let enemy = s.enemy.as_ref().map(|e| e.pos);
    ensure(enemy == Some(GridPos::new(0, 1)), || format!("enemy at {enemy:?}"))?;
    ensure(
        events.contains(&GameEvent::EnemyMoved { dir: Direction::Up, to: GridPos::new(0, 1) }),
        || format!("events {events:?}"),
    )
}

fn cheese_then_trap() -> Result<(), String> {
    let mut s = state(&["PCT"])?;
    step::step(&mut s, &moves(&[Direction::Right]), false, &scoring());
    ensure(s.score == 10 && s.is_running(), || format!("score {} phase {:?}", s.score, s.phase))?;
    step::step(&mut s, &moves(&[Direction::Right]), false, &scoring());
    ensure(s.phase == Phase::Lost(LossCause::Trap), || format!("phase {:?}", s.phase))?;
    ensure(s.score == 10, || format!("score {} after trap", s.score))
}

fn caught_on_door() -> Result<(), String> {
    let mut s = state(&["PKDE"])?;
    if let Some(enemy) = s.enemy.as_mut() {
        enemy.pos = GridPos::new(2, 0);
    }
    step::step(&mut s, &moves(&[Direction::Right, Direction::Right]), false, &scoring());
    ensure(s.phase == Phase::Lost(LossCause::Caught), || format!("phase {:?}", s.phase))
}
