//! GameState: the complete state of a running level.
//!
//! Owned exclusively by the loop driver and handed to the resolver by
//! `&mut`. The grid never changes after construction; collectibles leave
//! their collections when consumed; player and enemy are mutated in place.

use std::collections::HashSet;

use crate::domain::entity::{Enemy, Entity, EntityFactory, EntityKind, GridPos, Player};
use crate::domain::grid::{Grid, Level};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LossCause {
    Caught,
    Trap,
}

/// Level state machine. Running is initial; every other phase is terminal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Running,
    Won,
    Lost(LossCause),
    Quit,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        self != Phase::Running
    }
}

pub struct GameState {
    pub grid: Grid,

    // ── Entities ──
    pub player: Player,
    pub enemy: Option<Enemy>,
    pub cheese: Vec<Entity>,
    pub traps: Vec<Entity>,
    pub key: Option<Entity>,
    pub door: Option<Entity>,

    // ── Progress ──
    pub score: u32,
    pub has_key: bool,
    pub cheese_total: usize,
    /// Cells the player has stood on. Telemetry only.
    pub visited: HashSet<GridPos>,
    pub phase: Phase,
    pub tick: u64,

    // ── HUD ──
    pub message: String,
    pub message_timer: u32,
}

impl GameState {
    /// Build a fresh level. Ids are minted here, once per level.
    pub fn from_level(level: Level) -> Self {
        let Level { grid, spawns } = level;
        let mut factory = EntityFactory::new();

        let player = factory.player(spawns.player);
        let player_pos = player.pos;
        let enemy = spawns.enemy.map(|pos| factory.enemy(pos));
        let cheese: Vec<Entity> = spawns
            .cheese
            .iter()
            .map(|&pos| factory.piece(EntityKind::Cheese, pos))
            .collect();
        let traps = spawns
            .traps
            .iter()
            .map(|&pos| factory.piece(EntityKind::Trap, pos))
            .collect();
        let key = spawns.key.map(|pos| factory.piece(EntityKind::Key, pos));
        let door = spawns.door.map(|pos| factory.piece(EntityKind::Door, pos));

        let mut visited = HashSet::new();
        visited.insert(player.pos);

        let mut state = GameState {
            grid,
            cheese_total: cheese.len(),
            player,
            enemy,
            cheese,
            traps,
            key,
            door,
            score: 0,
            has_key: false,
            visited,
            phase: Phase::Running,
            tick: 0,
            message: String::new(),
            message_timer: 0,
        };
        if spawns.player_fallback {
            state.set_message(&format!("No start marker, starting at {}", player_pos), 180);
        }
        state
    }

    pub fn cheese_left(&self) -> usize {
        self.cheese.len()
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the HUD message, clearing it when it expires.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }
}
