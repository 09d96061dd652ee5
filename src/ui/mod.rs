//! Presentation boundary.
//!
//! The loop driver only talks to a `Presentation`: it loads sprites once,
//! draws the frame in world units, presents it, and drains discrete key
//! input. The terminal backend lives in `renderer` and `input`.

pub mod assets;
pub mod input;
pub mod renderer;

use std::io;
use std::time::Duration;

use crate::domain::entity::{Direction, WorldPos};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
}

/// A loaded sprite. Cheap to clone; owned by whoever asked for it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SpriteHandle {
    pub name: String,
    pub glyph: char,
    pub color: Rgb,
}

/// One discrete key press, already mapped to a game command.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyInput {
    Move(Direction),
    Save,
    Load,
    Restart,
    Quit,
}

pub trait Presentation {
    /// Never fails: a missing sprite comes back as a solid block in `fallback`.
    fn load_sprite(&mut self, name: &str, fallback: Rgb) -> SpriteHandle;

    fn draw(&mut self, sprite: &SpriteHandle, at: WorldPos);

    /// `size` is a hint; backends may ignore it.
    fn draw_text(&mut self, text: &str, size: u32, at: WorldPos, color: Rgb);

    fn present_frame(&mut self) -> io::Result<()>;

    /// Key presses since the last call, in arrival order.
    fn poll_input(&mut self) -> Vec<KeyInput>;

    /// Milliseconds since the presentation was created.
    fn elapsed_time_ms(&self) -> u64;

    /// Frame-cap sleep.
    fn wait(&mut self, budget: Duration) {
        std::thread::sleep(budget);
    }
}
