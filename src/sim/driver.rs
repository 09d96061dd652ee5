//! Game loop driver.
//!
//! Owns the `GameState` for the lifetime of a level and runs it against a
//! `Presentation`:
//!   poll input → session commands → step (moves, pursuit, contact)
//!   → draw → present → sleep out the frame
//!
//! Pursuit runs on wall-clock cadence, not on frame count, so the enemy's
//! speed does not depend on the frame rate.

use std::io;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::domain::entity::{EntityKind, Placed, Rect, WorldPos};
use crate::domain::grid;
use crate::ui::{KeyInput, Presentation, Rgb, SpriteHandle};
use super::event::GameEvent;
use super::level::LevelSource;
use super::save::{self, SaveRecord};
use super::step::{self, TickInput};
use super::world::{GameState, LossCause, Phase};

/// HUD message lifetimes, in ticks.
const SHORT_MESSAGE: u32 = 60;
const LONG_MESSAGE: u32 = 120;

/// What the player picked on the end screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EndChoice {
    NewGame,
    Exit,
}

/// Every sprite the frame needs, loaded once per run.
pub struct Sprites {
    wall: SpriteHandle,
    mouse: SpriteHandle,
    cat: SpriteHandle,
    cheese: SpriteHandle,
    key: SpriteHandle,
    door: SpriteHandle,
    trap: SpriteHandle,
}

impl Sprites {
    pub fn load<P: Presentation + ?Sized>(p: &mut P) -> Self {
        Sprites {
            wall: p.load_sprite("wall", Rgb::BLACK),
            mouse: p.load_sprite("mouse", Rgb::new(0, 0, 255)),
            cat: p.load_sprite("cat", Rgb::new(255, 0, 0)),
            cheese: p.load_sprite("cheese", Rgb::new(255, 255, 0)),
            key: p.load_sprite("key", Rgb::new(0, 255, 0)),
            door: p.load_sprite("exit", Rgb::new(100, 50, 0)),
            trap: p.load_sprite("trap", Rgb::new(128, 0, 128)),
        }
    }

    fn for_kind(&self, kind: EntityKind) -> &SpriteHandle {
        match kind {
            EntityKind::Player => &self.mouse,
            EntityKind::Enemy => &self.cat,
            EntityKind::Cheese => &self.cheese,
            EntityKind::Key => &self.key,
            EntityKind::Door => &self.door,
            EntityKind::Trap => &self.trap,
        }
    }
}

pub struct Driver {
    config: GameConfig,
    /// Kept for restarts; already known to parse.
    level_text: String,
    state: GameState,
    last_pursuit_ms: u64,
}

impl Driver {
    pub fn new(config: GameConfig, source: LevelSource, now_ms: u64) -> Self {
        let LevelSource { text, level } = source;
        Driver {
            config,
            level_text: text,
            state: GameState::from_level(level),
            last_pursuit_ms: now_ms,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn pursuit_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_pursuit_ms) >= self.config.timing.pursuit_interval_ms
    }

    // ══════════════════════════════════════════════════════════════
    // One tick
    // ══════════════════════════════════════════════════════════════

    /// Apply one batch of key presses. Quit wins over everything else in the
    /// batch; a restart discards the rest of the batch.
    pub fn tick(&mut self, keys: &[KeyInput], now_ms: u64) -> Vec<GameEvent> {
        if self.state.phase.is_terminal() {
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut input = TickInput::default();
        let mut restart = false;
        let mut commands = Vec::new();
        for &key in keys {
            match key {
                KeyInput::Move(dir) => input.moves.push(dir),
                KeyInput::Quit => input.quit = true,
                KeyInput::Restart => restart = true,
                KeyInput::Save | KeyInput::Load => commands.push(key),
            }
        }

        if !input.quit {
            if restart {
                self.restart(now_ms);
                return Vec::new();
            }
            for cmd in commands {
                if !self.state.is_running() {
                    break;
                }
                match cmd {
                    KeyInput::Save => self.save(),
                    KeyInput::Load => self.load(&mut events),
                    _ => {}
                }
            }
        }

        let pursue = self.pursuit_due(now_ms);
        if pursue {
            self.last_pursuit_ms = now_ms;
        }

        events.extend(step::step(&mut self.state, &input, pursue, &self.config.scoring));
        if !events.is_empty() {
            debug!("tick {}: {:?}", self.state.tick, events);
        }
        if let Some(end) = events.iter().find(|e| e.is_terminal()) {
            info!("level over at tick {}: {:?}", self.state.tick, end);
            if let GameEvent::Won { score } = *end {
                self.record_win(score);
            }
        }
        events
    }

    /// Rebuild the level from its text. Entity ids start over.
    pub fn restart(&mut self, now_ms: u64) {
        match grid::parse(&self.level_text) {
            Ok(level) => {
                self.state = GameState::from_level(level);
                self.last_pursuit_ms = now_ms;
                info!("level restarted");
            }
            Err(e) => warn!("restart failed, keeping current level: {e}"),
        }
    }

    fn save(&mut self) {
        let record = SaveRecord::capture(&self.state);
        match save::save_game(&self.config.paths.save_file, &record) {
            Ok(()) => self.state.set_message("Saved", SHORT_MESSAGE),
            Err(e) => {
                warn!("save failed: {e}");
                self.state.set_message("Save failed", LONG_MESSAGE);
            }
        }
    }

    /// Restore the saved position, then resolve whatever lies on that cell.
    fn load(&mut self, events: &mut Vec<GameEvent>) {
        let msg = match save::load_game(&self.config.paths.save_file) {
            Ok(Some(record)) if save::restore(&mut self.state, &record) => {
                info!("loaded save {:?}", record);
                step::resolve_interactions(&mut self.state, &self.config.scoring, events);
                "Loaded"
            }
            Ok(Some(_)) => "Save does not fit this map",
            Ok(None) => "No save found",
            Err(e) => {
                warn!("load failed: {e}");
                "Load failed"
            }
        };
        self.state.set_message(msg, SHORT_MESSAGE);
    }

    fn record_win(&mut self, score: u32) {
        match save::record_high_score(&self.config.paths.highscore_file, score) {
            Ok(true) => self.state.set_message("New high score!", LONG_MESSAGE),
            Ok(false) => {}
            Err(e) => warn!("could not record high score: {e}"),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Loop
    // ══════════════════════════════════════════════════════════════

    /// Play until the player quits. After a win or loss the end screen
    /// offers a new game. Returns the last terminal phase.
    pub fn run<P: Presentation + ?Sized>(&mut self, p: &mut P) -> io::Result<Phase> {
        let sprites = Sprites::load(p);
        let frame = self.config.timing.frame_duration();

        loop {
            let started = p.elapsed_time_ms();
            let keys = p.poll_input();
            self.tick(&keys, started);

            self.draw(p, &sprites);
            p.present_frame()?;

            match self.state.phase {
                Phase::Running => {}
                Phase::Quit => return Ok(Phase::Quit),
                phase => {
                    match self.end_screen(p, &sprites)? {
                        EndChoice::NewGame => {
                            self.restart(p.elapsed_time_ms());
                            continue;
                        }
                        EndChoice::Exit => return Ok(phase),
                    }
                }
            }

            let spent = Duration::from_millis(p.elapsed_time_ms().saturating_sub(started));
            p.wait(frame.saturating_sub(spent));
        }
    }

    /// Final frame with a banner; waits for R or Q/Esc.
    pub fn end_screen<P: Presentation + ?Sized>(&self, p: &mut P, sprites: &Sprites) -> io::Result<EndChoice> {
        let frame = self.config.timing.frame_duration();
        loop {
            self.draw(p, sprites);
            self.draw_banner(p);
            p.present_frame()?;
            for key in p.poll_input() {
                match key {
                    KeyInput::Restart => return Ok(EndChoice::NewGame),
                    KeyInput::Quit => return Ok(EndChoice::Exit),
                    _ => {}
                }
            }
            p.wait(frame);
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Drawing
    // ══════════════════════════════════════════════════════════════

    pub fn draw<P: Presentation + ?Sized>(&self, p: &mut P, sprites: &Sprites) {
        let cs = self.config.cell_size;
        let s = &self.state;

        for (pos, tile) in s.grid.cells() {
            if tile.is_wall() {
                p.draw(&sprites.wall, pos.to_world(cs));
            }
        }
        // Back to front: the cat is drawn over everything.
        let pieces: Vec<&dyn Placed> = s
            .door
            .iter()
            .chain(&s.traps)
            .chain(&s.key)
            .chain(&s.cheese)
            .map(|e| e as &dyn Placed)
            .chain(std::iter::once(&s.player as &dyn Placed))
            .chain(s.enemy.iter().map(|e| e as &dyn Placed))
            .collect();
        for piece in pieces {
            p.draw(sprites.for_kind(piece.kind()), piece.bounds(cs).origin());
        }

        self.draw_hud(p);
    }

    /// The whole map in world units.
    fn map_bounds(&self) -> Rect {
        let cs = self.config.cell_size;
        Rect {
            x: 0,
            y: 0,
            w: self.state.grid.width() as u32 * cs,
            h: self.state.grid.height() as u32 * cs,
        }
    }

    fn draw_hud<P: Presentation + ?Sized>(&self, p: &mut P) {
        let s = &self.state;
        let cs = self.config.cell_size as i32;
        let size = self.config.cell_size / 2;
        let map = self.map_bounds();
        let x = map.center().x;
        let top = map.h as i32;

        let status = format!("Score: {} | Key: {}", s.score, if s.has_key { "Yes" } else { "No" });
        p.draw_text(&status, size, WorldPos::new(x, top + cs / 2), Rgb::WHITE);

        let progress = format!(
            "Cheese: {}/{} | Visited: {}",
            s.cheese_total - s.cheese_left(),
            s.cheese_total,
            s.visited.len(),
        );
        p.draw_text(&progress, size, WorldPos::new(x, top + cs * 3 / 2), Rgb::new(180, 180, 180));

        if !s.message.is_empty() {
            p.draw_text(&s.message, size, WorldPos::new(x, top + cs * 5 / 2), Rgb::new(255, 255, 0));
        }
    }

    fn draw_banner<P: Presentation + ?Sized>(&self, p: &mut P) {
        let s = &self.state;
        let (headline, color) = match s.phase {
            Phase::Won => ("You escaped!", Rgb::new(0, 255, 0)),
            Phase::Lost(LossCause::Caught) => ("Caught by the cat!", Rgb::new(255, 0, 0)),
            Phase::Lost(LossCause::Trap) => ("Caught in a trap!", Rgb::new(255, 0, 0)),
            Phase::Running | Phase::Quit => return,
        };
        let cs = self.config.cell_size as i32;
        let center = self.map_bounds().center();
        p.draw_text(&format!("{headline} Score: {}", s.score), self.config.cell_size, center, color);
        p.draw_text(
            "R: new game   Q: quit",
            self.config.cell_size / 2,
            WorldPos::new(center.x, center.y + cs),
            Rgb::WHITE,
        );
    }
}
