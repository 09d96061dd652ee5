//! Terminal presentation: double-buffered, diff-based renderer.
//!
//! How it works:
//!   1. The driver draws sprites and text into the `front` buffer
//!   2. `present_frame` compares each cell with `back` (previous frame)
//!   3. Only changed cells become terminal commands, batched with `queue!`
//!      and flushed once
//!   4. Swap front/back, clear the new front
//!
//! World units map to terminal cells as one grid cell = 2 columns × 1 row.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use tracing::debug;

use crate::config::GameConfig;
use crate::domain::entity::WorldPos;
use super::assets::{self, FALLBACK_GLYPH};
use super::input::InputState;
use super::{KeyInput, Presentation, Rgb, SpriteHandle};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every empty cell, so the gap between rows
    /// matches the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from any real cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

#[derive(Debug)]
struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// One char per column; clipped at the right edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell { ch, fg, bg: Cell::BASE_BG });
        }
    }
}

// ── Coordinate mapping ──

/// Terminal columns per grid cell.
const CELL_W: usize = 2;

/// Blank rows above the map.
const MAP_ROW: usize = 1;

fn to_color(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

/// Terminal (column, row) of the grid cell containing `at`. None above or
/// left of the map.
fn to_terminal(at: WorldPos, cell_size: u32) -> Option<(usize, usize)> {
    let cell = at.to_grid(cell_size);
    let col = usize::try_from(cell.col).ok()?;
    let row = usize::try_from(cell.row).ok()?;
    Some((col * CELL_W, row + MAP_ROW))
}

/// Left column for `text` centred on `at`.
fn centred_start(at: WorldPos, cell_size: u32, text: &str) -> Option<(usize, usize)> {
    let row = usize::try_from(at.to_grid(cell_size).row).ok()? + MAP_ROW;
    let center = usize::try_from(at.x).ok()? * CELL_W / cell_size.max(1) as usize;
    Some((center.saturating_sub(text.chars().count() / 2), row))
}

// ── Presenter ──

pub struct TerminalPresenter {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    cell_size: u32,
    assets_dir: PathBuf,
    input: InputState,
    started: Instant,
}

impl TerminalPresenter {
    pub fn new(config: &GameConfig) -> Self {
        TerminalPresenter {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            cell_size: config.cell_size,
            assets_dir: config.paths.assets_dir.clone(),
            input: InputState::new(),
            started: Instant::now(),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn check_resize(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            // Drawn content is lost on resize; the next frame fills it again.
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Not ResetColor: the terminal default may differ from BASE_BG.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

impl Presentation for TerminalPresenter {
    fn load_sprite(&mut self, name: &str, fallback: Rgb) -> SpriteHandle {
        let sprite = assets::load_sprite(&self.assets_dir, name, fallback);
        debug!("sprite {}: '{}' {:?}", sprite.name, sprite.glyph, sprite.color);
        sprite
    }

    fn draw(&mut self, sprite: &SpriteHandle, at: WorldPos) {
        let Some((x, y)) = to_terminal(at, self.cell_size) else { return };
        let fg = to_color(sprite.color);
        // Solid blocks fill both columns; letters get a trailing space.
        let right = if sprite.glyph == FALLBACK_GLYPH { sprite.glyph } else { ' ' };
        self.front.set(x, y, Cell { ch: sprite.glyph, fg, bg: Cell::BASE_BG });
        self.front.set(x + 1, y, Cell { ch: right, fg, bg: Cell::BASE_BG });
    }

    fn draw_text(&mut self, text: &str, _size: u32, at: WorldPos, color: Rgb) {
        if let Some((x, y)) = centred_start(at, self.cell_size, text) {
            self.front.put_str(x, y, text, to_color(color));
        }
    }

    fn present_frame(&mut self) -> io::Result<()> {
        self.check_resize()?;
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        self.front.clear();
        Ok(())
    }

    fn poll_input(&mut self) -> Vec<KeyInput> {
        self.input.drain_events()
    }

    fn elapsed_time_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_cells_are_two_columns_wide() {
        assert_eq!(to_terminal(WorldPos::new(0, 0), 40), Some((0, MAP_ROW)));
        assert_eq!(to_terminal(WorldPos::new(120, 80), 40), Some((6, 2 + MAP_ROW)));
        assert_eq!(to_terminal(WorldPos::new(-40, 0), 40), None);
    }

    #[test]
    fn text_is_centred() {
        // Map 20 cells wide → centre at column 20.
        assert_eq!(centred_start(WorldPos::new(400, 420), 40, "abcd"), Some((18, 10 + MAP_ROW)));
        assert_eq!(centred_start(WorldPos::new(0, 0), 40, "abcd"), Some((0, MAP_ROW)));
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.put_str(2, 0, "xyz", Color::White);
        assert_eq!(fb.get(2, 0).ch, 'x');
        assert_eq!(fb.get(3, 0).ch, 'y');
        assert_eq!(fb.get(4, 0), Cell::BLANK);
    }

    #[test]
    fn set_outside_is_ignored() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.set(5, 5, Cell::INVALID);
        assert!(fb.cells.iter().all(|c| *c == Cell::BLANK));
    }
}
