//! The step function: advances a level by one tick.
//!
//! Processing order:
//!   1. Quit (short-circuits the tick)
//!   2. Player steps, one cell per input event, in arrival order.
//!      After each step: cheese → trap → key → enemy contact → door.
//!   3. Enemy pursuit step (only when the driver's cadence says so)
//!   4. Enemy contact re-check
//!
//! Processing stops at the first terminal event. Every check compares grid
//! cells; nothing here depends on frame timing.

use tracing::{debug, info};

use crate::config::ScoringConfig;
use crate::domain::entity::{Direction, Movable, Placed};
use crate::domain::pathfind;
use crate::domain::rules;
use super::event::GameEvent;
use super::world::{GameState, LossCause, Phase};

/// Discrete input for one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    /// One cell per entry, applied in order.
    pub moves: Vec<Direction>,
    pub quit: bool,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(state: &mut GameState, input: &TickInput, pursue: bool, scoring: &ScoringConfig) -> Vec<GameEvent> {
    if !state.is_running() {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    state.tick += 1;
    state.tick_message();

    if input.quit {
        state.phase = Phase::Quit;
        events.push(GameEvent::Quit);
        info!("quit requested at tick {}", state.tick);
        return events;
    }

    for &dir in &input.moves {
        move_player(state, dir, scoring, &mut events);
        if !state.is_running() {
            return events;
        }
    }

    if pursue {
        pursue_player(state, &mut events);
        if !state.is_running() {
            return events;
        }
    }

    resolve_enemy_contact(state, &mut events);
    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// Try one player step. Rejected moves are silent no-ops.
pub fn move_player(state: &mut GameState, dir: Direction, scoring: &ScoringConfig, events: &mut Vec<GameEvent>) {
    if !state.is_running() {
        return;
    }

    match rules::validate_move(&state.grid, &state.player, dir) {
        Ok(to) => {
            state.player.set_position(to);
            state.visited.insert(to);
            events.push(GameEvent::PlayerMoved { to });
            resolve_interactions(state, scoring, events);
        }
        Err(blocked) => {
            debug!("player move {:?} from {} rejected: {:?}", dir, state.player.pos, blocked);
        }
    }
}

/// Pickups and hazards on the player's cell. A cat on the door cell catches
/// the player before the door can open.
pub fn resolve_interactions(state: &mut GameState, scoring: &ScoringConfig, events: &mut Vec<GameEvent>) {
    let at = state.player.pos;

    // Cheese: removed on contact, so it can never be counted twice
    let mut i = 0;
    while i < state.cheese.len() {
        if state.cheese[i].pos == at {
            let id = state.cheese.remove(i).id();
            state.score = add_bonus(state.score, scoring.cheese_bonus);
            info!("cheese {} eaten at {}, score {}", id, at, state.score);
            events.push(GameEvent::CheeseEaten { id, at, bonus: scoring.cheese_bonus });
        } else {
            i += 1;
        }
    }

    if let Some(trap) = state.traps.iter().find(|t| t.pos == at) {
        let id = trap.id();
        info!("trap {} sprung at {}, final score {}", id, at, state.score);
        events.push(GameEvent::TrapHit { id, at });
        state.phase = Phase::Lost(LossCause::Trap);
        return;
    }

    if state.key.as_ref().is_some_and(|k| k.pos == at) {
        if let Some(key) = state.key.take() {
            state.has_key = true;
            info!("key {} taken at {}", key.id, at);
            events.push(GameEvent::KeyTaken { id: key.id, at });
            state.set_message("Key found! Now find the door.", 120);
        }
    }

    resolve_enemy_contact(state, events);
    if !state.is_running() {
        return;
    }

    if state.door.as_ref().is_some_and(|d| d.pos == at) {
        if rules::can_win(true, state.has_key, state.cheese_left()) {
            info!("door opened at {}, score {}", at, state.score);
            events.push(GameEvent::Won { score: state.score });
            state.phase = Phase::Won;
        } else {
            debug!("door locked: has_key={} cheese_left={}", state.has_key, state.cheese_left());
            events.push(GameEvent::DoorLocked { has_key: state.has_key, cheese_left: state.cheese_left() });
            let msg = if state.has_key { "Eat all the cheese first!" } else { "The door is locked." };
            state.set_message(msg, 90);
        }
    }
}

fn add_bonus(score: u32, bonus: u32) -> u32 {
    score.saturating_add(bonus)
}

// ══════════════════════════════════════════════════════════════
// Enemy
// ══════════════════════════════════════════════════════════════

/// One pursuit step: BFS toward the player, then validated like any move.
pub fn pursue_player(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.is_running() {
        return;
    }
    let target = state.player.pos;
    let Some(enemy) = state.enemy.as_mut() else { return };

    let Some(dir) = pathfind::first_step(enemy.pos, target, &state.grid) else {
        debug!("enemy at {} has no path to {}", enemy.pos, target);
        return;
    };

    match rules::validate_move(&state.grid, &*enemy, dir) {
        Ok(to) => {
            enemy.set_position(to);
            debug!("enemy {} steps {:?} to {}", enemy.id(), dir, to);
            events.push(GameEvent::EnemyMoved { dir, to });
        }
        Err(blocked) => {
            debug!("enemy step {:?} rejected: {:?}", dir, blocked);
        }
    }

    resolve_enemy_contact(state, events);
}

/// Same cell = caught.
pub fn resolve_enemy_contact(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.is_running() {
        return;
    }
    let Some(enemy) = state.enemy.as_ref() else { return };
    if enemy.pos == state.player.pos {
        let at = enemy.pos;
        info!("caught by enemy at {}, final score {}", at, state.score);
        events.push(GameEvent::Caught { at });
        state.phase = Phase::Lost(LossCause::Caught);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::GridPos;
    use crate::domain::grid;

    fn state(rows: &[&str]) -> GameState {
        GameState::from_level(grid::parse(&rows.join("\n")).unwrap())
    }

    fn scoring() -> ScoringConfig {
        ScoringConfig { cheese_bonus: 10 }
    }

    fn moves(dirs: &[Direction]) -> TickInput {
        TickInput { moves: dirs.to_vec(), quit: false }
    }

    fn run(s: &mut GameState, dirs: &[Direction]) -> Vec<GameEvent> {
        step(s, &moves(dirs), false, &scoring())
    }

    // ── Movement ──

    #[test]
    fn boxed_in_player_never_moves() {
        let mut s = state(&["WWW", "WPW", "WWW"]);
        for dir in Direction::ALL {
            let events = run(&mut s, &[dir]);
            assert!(events.is_empty());
            assert_eq!(s.player.pos, GridPos::new(1, 1));
            assert_eq!(s.score, 0);
            assert!(s.is_running());
        }
        assert_eq!(s.visited.len(), 1);
    }

    #[test]
    fn map_edge_rejects_move() {
        let mut s = state(&["P "]);
        run(&mut s, &[Direction::Left, Direction::Up, Direction::Down]);
        assert_eq!(s.player.pos, GridPos::new(0, 0));
        run(&mut s, &[Direction::Right, Direction::Right]);
        assert_eq!(s.player.pos, GridPos::new(1, 0));
    }

    #[test]
    fn each_event_is_one_cell() {
        let mut s = state(&["P    "]);
        let events = run(&mut s, &[Direction::Right, Direction::Right, Direction::Right]);
        assert_eq!(s.player.pos, GridPos::new(3, 0));
        assert_eq!(events.len(), 3);
        assert_eq!(s.visited.len(), 4);
    }

    // ── Cheese ──

    #[test]
    fn cheese_scores_once_and_disappears() {
        let mut s = state(&["PC C"]);
        let events = run(&mut s, &[Direction::Right]);
        assert_eq!(s.score, 10);
        assert_eq!(s.cheese_left(), 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::CheeseEaten { bonus: 10, .. })));

        // Step off and back on: nothing left to eat
        run(&mut s, &[Direction::Left, Direction::Right]);
        assert_eq!(s.score, 10);
        assert_eq!(s.cheese_left(), 1);

        run(&mut s, &[Direction::Right, Direction::Right]);
        assert_eq!(s.score, 20);
        assert_eq!(s.cheese_left(), 0);
    }

    #[test]
    fn score_monotonic_over_walk() {
        let mut s = state(&["PCCCC"]);
        let mut last = 0;
        for n in 1..=4 {
            run(&mut s, &[Direction::Right]);
            assert!(s.score >= last);
            assert_eq!(s.score, 10 * n);
            assert_eq!(s.cheese_left(), 4 - n as usize);
            last = s.score;
        }
    }

    #[test]
    fn configured_bonus_applies() {
        let mut s = state(&["PC"]);
        step(&mut s, &moves(&[Direction::Right]), false, &ScoringConfig { cheese_bonus: 25 });
        assert_eq!(s.score, 25);
    }

    // ── Trap ──

    #[test]
    fn cheese_then_trap_keeps_score() {
        let mut s = state(&["PCT"]);
        run(&mut s, &[Direction::Right]);
        assert_eq!(s.score, 10);
        assert!(s.is_running());

        let events = run(&mut s, &[Direction::Right]);
        assert!(events.iter().any(|e| matches!(e, GameEvent::TrapHit { .. })));
        assert_eq!(s.phase, Phase::Lost(LossCause::Trap));
        assert_eq!(s.score, 10);
    }

    #[test]
    fn trap_stops_remaining_moves() {
        let mut s = state(&["PT  "]);
        run(&mut s, &[Direction::Right, Direction::Right, Direction::Right]);
        assert_eq!(s.player.pos, GridPos::new(1, 0));
        assert_eq!(s.phase, Phase::Lost(LossCause::Trap));
    }

    // ── Key & door ──

    #[test]
    fn key_is_one_shot_and_sticky() {
        let mut s = state(&["PK "]);
        let events = run(&mut s, &[Direction::Right]);
        assert!(s.has_key);
        assert!(s.key.is_none());
        assert!(events.iter().any(|e| matches!(e, GameEvent::KeyTaken { .. })));
        run(&mut s, &[Direction::Right, Direction::Left, Direction::Left]);
        assert!(s.has_key);
    }

    #[test]
    fn win_with_key_and_no_cheese() {
        let mut s = state(&["PCKD"]);
        let events = run(&mut s, &[Direction::Right, Direction::Right, Direction::Right]);
        assert_eq!(s.phase, Phase::Won);
        assert_eq!(events.last(), Some(&GameEvent::Won { score: 10 }));
    }

    #[test]
    fn door_without_key_is_not_a_win() {
        let mut s = state(&["PDK"]);
        let events = run(&mut s, &[Direction::Right]);
        assert!(s.is_running());
        assert!(events.iter().any(|e| matches!(e, GameEvent::DoorLocked { has_key: false, .. })));
        // Door never blocks
        run(&mut s, &[Direction::Right]);
        assert_eq!(s.player.pos, GridPos::new(2, 0));
        assert!(s.has_key);
        // Back onto the door with the key and no cheese → win
        run(&mut s, &[Direction::Left]);
        assert_eq!(s.phase, Phase::Won);
    }

    #[test]
    fn door_with_cheese_left_is_not_a_win() {
        let mut s = state(&["KPD C"]);
        run(&mut s, &[Direction::Left, Direction::Right, Direction::Right]);
        assert!(s.has_key);
        assert_eq!(s.player.pos, GridPos::new(2, 0));
        assert!(s.is_running());
        assert_eq!(s.cheese_left(), 1);
    }

    #[test]
    fn cat_on_the_door_catches_before_win() {
        let mut s = state(&["PKDE"]);
        s.enemy.as_mut().unwrap().pos = GridPos::new(2, 0);
        let events = run(&mut s, &[Direction::Right, Direction::Right]);
        assert_eq!(s.phase, Phase::Lost(LossCause::Caught));
        assert!(s.has_key);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Won { .. })));
        assert_eq!(events.last(), Some(&GameEvent::Caught { at: GridPos::new(2, 0) }));
    }

    #[test]
    fn not_on_door_is_not_a_win() {
        let mut s = state(&["PKD"]);
        run(&mut s, &[Direction::Right]);
        assert!(s.has_key);
        assert_eq!(s.cheese_left(), 0);
        assert!(s.is_running());
    }

    // ── Enemy ──

    #[test]
    fn pursuit_in_open_column() {
        let mut s = state(&["P", " ", "E"]);
        let events = step(&mut s, &TickInput::default(), true, &scoring());
        assert_eq!(s.enemy.as_ref().map(|e| e.pos), Some(GridPos::new(0, 1)));
        assert_eq!(events, vec![GameEvent::EnemyMoved { dir: Direction::Up, to: GridPos::new(0, 1) }]);
        assert!(s.is_running());

        step(&mut s, &TickInput::default(), true, &scoring());
        assert_eq!(s.phase, Phase::Lost(LossCause::Caught));
    }

    #[test]
    fn no_pursuit_without_cadence() {
        let mut s = state(&["P", " ", "E"]);
        step(&mut s, &TickInput::default(), false, &scoring());
        assert_eq!(s.enemy.as_ref().map(|e| e.pos), Some(GridPos::new(0, 2)));
    }

    #[test]
    fn enemy_holds_when_unreachable() {
        let mut s = state(&["P W E"]);
        let events = step(&mut s, &TickInput::default(), true, &scoring());
        assert!(events.is_empty());
        assert_eq!(s.enemy.as_ref().map(|e| e.pos), Some(GridPos::new(4, 0)));
    }

    #[test]
    fn walking_into_enemy_is_caught() {
        let mut s = state(&["PE "]);
        let events = run(&mut s, &[Direction::Right, Direction::Right]);
        assert_eq!(s.phase, Phase::Lost(LossCause::Caught));
        assert_eq!(s.player.pos, GridPos::new(1, 0));
        assert!(matches!(events.last(), Some(GameEvent::Caught { .. })));
    }

    #[test]
    fn level_without_enemy_never_caught() {
        let mut s = state(&["P  "]);
        step(&mut s, &moves(&[Direction::Right]), true, &scoring());
        assert!(s.is_running());
    }

    // ── Terminal phases ──

    #[test]
    fn quit_short_circuits() {
        let mut s = state(&["PC"]);
        let input = TickInput { moves: vec![Direction::Right], quit: true };
        let events = step(&mut s, &input, true, &scoring());
        assert_eq!(events, vec![GameEvent::Quit]);
        assert_eq!(s.phase, Phase::Quit);
        assert_eq!(s.score, 0);
    }

    #[test]
    fn terminal_state_is_frozen() {
        let mut s = state(&["PT C"]);
        run(&mut s, &[Direction::Right]);
        let tick = s.tick;
        let events = run(&mut s, &[Direction::Right, Direction::Right]);
        assert!(events.is_empty());
        assert_eq!(s.tick, tick);
        assert_eq!(s.player.pos, GridPos::new(1, 0));
        assert_eq!(s.phase, Phase::Lost(LossCause::Trap));
    }
}
