//! Terminal drawing for the puzzle screen.
//!
//! Tiles are drawn with upper-half blocks so each terminal cell carries two
//! picture pixels. Every frame is fully repainted over the previous one; the
//! screen is only cleared when the layout changes.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor, Stylize},
    terminal::{Clear, ClearType},
};

use crate::assets::{crop, Picture, Rgb};
use crate::game::PuzzleState;

const HEADER_ROWS: u16 = 3;
const FOOTER_ROWS: u16 = 4;
const MAX_TILE_ROWS: u16 = 8;
const MIN_TILE_COLS: u16 = 3;
const THUMB_COLS: u16 = 12;
const THUMB_ROWS: u16 = 6;
const THUMB_GAP: u16 = 3;

const GAP: Color = Color::Rgb { r: 25, g: 25, b: 30 };
const BLANK: Color = Color::Rgb { r: 70, g: 70, b: 75 };
const HALF_BLOCK: char = '▀';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub grid: usize,
    pub origin: (u16, u16),
    pub tile_cols: u16,
    pub tile_rows: u16,
    /// Top-left corner of the reference thumbnail, when it fits.
    pub thumb: Option<(u16, u16)>,
    pub footer_row: u16,
}

impl Layout {
    pub fn compute(cols: u16, rows: u16, grid: usize) -> Self {
        let g = grid.max(1) as u16;
        let tile_rows = (rows.saturating_sub(HEADER_ROWS + FOOTER_ROWS) / g).clamp(1, MAX_TILE_ROWS);
        let room = cols.saturating_sub(2);

        let mut tile_cols = (tile_rows * 2).max(MIN_TILE_COLS);
        if g * tile_cols > room {
            tile_cols = (room / g).max(MIN_TILE_COLS);
        }

        let origin = (1, HEADER_ROWS);
        let grid_right = origin.0 + g * tile_cols;
        let thumb = (grid_right + THUMB_GAP + THUMB_COLS <= cols).then_some((grid_right + THUMB_GAP, HEADER_ROWS + 1));

        Self {
            grid: g as usize,
            origin,
            tile_cols,
            tile_rows,
            thumb,
            footer_row: origin.1 + g * tile_rows + 1,
        }
    }

    pub fn tile_origin(&self, position: usize) -> (u16, u16) {
        let (row, col) = ((position / self.grid) as u16, (position % self.grid) as u16);
        (
            self.origin.0 + col * self.tile_cols,
            self.origin.1 + row * self.tile_rows,
        )
    }

    /// Grid position under a terminal cell.
    pub fn hit(&self, column: u16, row: u16) -> Option<usize> {
        if column < self.origin.0 || row < self.origin.1 {
            return None;
        }
        let col = ((column - self.origin.0) / self.tile_cols) as usize;
        let row = ((row - self.origin.1) / self.tile_rows) as usize;
        (col < self.grid && row < self.grid).then_some(row * self.grid + col)
    }
}

pub struct Frame<'a> {
    pub state: &'a PuzzleState,
    pub picture: &'a Picture,
    pub cursor: usize,
    pub layout: Layout,
    pub audio: &'a str,
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

pub fn draw<W: Write>(out: &mut W, frame: &Frame<'_>, clear: bool) -> io::Result<()> {
    if clear {
        queue!(out, ResetColor, Clear(ClearType::All))?;
    }

    draw_header(out, frame)?;
    for (position, &value) in frame.state.tiles().iter().enumerate() {
        draw_tile(out, frame, position, value)?;
    }
    if let Some(origin) = frame.layout.thumb {
        draw_thumbnail(out, frame.picture, origin)?;
    }
    draw_footer(out, frame)?;

    queue!(out, ResetColor)?;
    out.flush()
}

fn draw_header<W: Write>(out: &mut W, frame: &Frame<'_>) -> io::Result<()> {
    let state = frame.state;
    queue!(
        out,
        ResetColor,
        MoveTo(1, 0),
        Print(format!("Level {}", state.level()).bold()),
        Print(format!("  ·  {}", frame.picture.name)),
        Clear(ClearType::UntilNewLine),
        MoveTo(1, 1),
        Print(format!("⏱ Time: {}s", state.elapsed_seconds())),
        Clear(ClearType::UntilNewLine),
    )
}

fn draw_tile<W: Write>(out: &mut W, frame: &Frame<'_>, position: usize, value: usize) -> io::Result<()> {
    let layout = &frame.layout;
    let (x0, y0) = layout.tile_origin(position);
    let grid = frame.state.grid_size();
    let is_blank = value == frame.state.puzzle().blank();

    // The last column and the lower half of the last row are the gutter.
    let pixel_cols = (layout.tile_cols - 1).max(1) as f32;
    let pixel_rows = (layout.tile_rows * 2 - 1) as f32;

    for cy in 0..layout.tile_rows {
        queue!(out, MoveTo(x0, y0 + cy))?;
        for cx in 0..layout.tile_cols {
            if cx == layout.tile_cols - 1 {
                queue!(out, SetBackgroundColor(GAP), Print(' '))?;
                continue;
            }
            let last_row = cy == layout.tile_rows - 1;
            let (top, bottom) = if is_blank {
                (BLANK, if last_row { GAP } else { BLANK })
            } else {
                let fx = (cx as f32 + 0.5) / pixel_cols;
                let fy_top = (cy as f32 * 2.0 + 0.5) / pixel_rows;
                let fy_bottom = (cy as f32 * 2.0 + 1.5) / pixel_rows;
                let (u, v) = crop(grid, value, fx, fy_top);
                let top = color(frame.picture.sample(u, v));
                let bottom = if last_row {
                    GAP
                } else {
                    let (u, v) = crop(grid, value, fx, fy_bottom);
                    color(frame.picture.sample(u, v))
                };
                (top, bottom)
            };
            queue!(
                out,
                SetForegroundColor(top),
                SetBackgroundColor(bottom),
                Print(HALF_BLOCK)
            )?;
        }
    }

    let selected = position == frame.cursor;
    let label = match (is_blank, selected) {
        (true, true) => "▶".to_string(),
        (true, false) => return Ok(()),
        (false, true) => format!("▶{}", value + 1),
        (false, false) => format!("{}", value + 1),
    };
    let background = if selected { Color::Yellow } else { Color::White };
    queue!(
        out,
        MoveTo(x0, y0),
        SetForegroundColor(Color::Black),
        SetBackgroundColor(background),
        Print(label),
        ResetColor
    )
}

fn draw_thumbnail<W: Write>(out: &mut W, picture: &Picture, (x0, y0): (u16, u16)) -> io::Result<()> {
    queue!(out, ResetColor, MoveTo(x0, y0 - 1), Print("Reference:"))?;

    let pixel_rows = (THUMB_ROWS * 2) as f32;
    for cy in 0..THUMB_ROWS {
        queue!(out, MoveTo(x0, y0 + cy))?;
        for cx in 0..THUMB_COLS {
            let u = (cx as f32 + 0.5) / THUMB_COLS as f32;
            let top = picture.sample(u, (cy as f32 * 2.0 + 0.5) / pixel_rows);
            let bottom = picture.sample(u, (cy as f32 * 2.0 + 1.5) / pixel_rows);
            queue!(
                out,
                SetForegroundColor(color(top)),
                SetBackgroundColor(color(bottom)),
                Print(HALF_BLOCK)
            )?;
        }
    }
    queue!(out, ResetColor)
}

fn draw_footer<W: Write>(out: &mut W, frame: &Frame<'_>) -> io::Result<()> {
    let row = frame.layout.footer_row;
    let state = frame.state;

    queue!(out, ResetColor, MoveTo(1, row))?;
    if state.regenerate_pending() {
        queue!(out, Print("Dealing the next picture..."))?;
    } else if state.game_won() {
        queue!(
            out,
            Print(format!("🎉 Solved in {}s!", state.elapsed_seconds()).green().bold()),
            Print("  [n] Next Level"),
        )?;
    }
    queue!(
        out,
        Clear(ClearType::UntilNewLine),
        MoveTo(1, row + 1),
        Print("arrows/hjkl select · enter/space tap · wasd slide · [r] shuffle · [q] quit".dark_grey()),
        Clear(ClearType::UntilNewLine),
        MoveTo(1, row + 2),
        Print(format!("sound: {}", frame.audio).dark_grey()),
        Clear(ClearType::UntilNewLine),
    )
}
