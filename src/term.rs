use crate::{Coords, TermInt};
use crate::device::{Color, Font, InputEvent, InputSource, Key, Surface};
use crate::session::Field;
use std::{io::{self, Stdout, Write, stdout}, time::Duration};

use anyhow::{bail, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Attribute;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, read, poll};
use tracing::warn;

/// Terminal characters are roughly twice as tall as they are wide, so each
/// grid cell takes two columns and one row.
const COLS_PER_CELL: i32 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
    bold: bool,
}

const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Color::Black, bold: false };

/// Puts the terminal into raw mode on an alternate screen, and puts it back
/// when dropped.
pub struct RawScreen {
    stdout: Stdout,
}

impl RawScreen {
    pub fn enter() -> io::Result<Self> {
        let mut screen = RawScreen { stdout: stdout() };

        execute!(screen.stdout, EnterAlternateScreen, cursor::Hide, cursor::DisableBlinking)?;
        execute!(screen.stdout, terminal::Clear(ClearType::All))?;
        terminal::enable_raw_mode()?;

        Ok(screen)
    }

    fn leave(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }
}

impl Drop for RawScreen {
    fn drop(&mut self) {
        if let Err(err) = self.leave() {
            warn!(%err, "failed to restore the terminal");
        }
    }
}

/// Draws the logical pixel field onto a character grid. Drawing goes to a
/// back buffer, and `present` only sends the cells that changed.
pub struct TermSurface<W: Write = Stdout> {
    out: W,
    cell_size: i32,
    width: TermInt,
    height: TermInt,
    screen: Vec<Cell>,
    shown: Vec<Option<Cell>>,
}

impl TermSurface<Stdout> {
    pub fn new(field: Field) -> Result<Self> {
        let (cols, rows) = terminal::size()?;
        let surface = Self::with_writer(stdout(), field)?;
        let (width, height) = surface.size();

        if cols < width || rows < height {
            bail!("The terminal must be at least {}x{} characters, it is {}x{}", width, height, cols, rows);
        }

        Ok(surface)
    }
}

impl<W: Write> TermSurface<W> {
    pub fn with_writer(out: W, field: Field) -> Result<Self> {
        let cols = i64::from(field.width / field.cell_size) * i64::from(COLS_PER_CELL);
        let rows = field.height / field.cell_size;
        let (width, height) = match (TermInt::try_from(cols), TermInt::try_from(rows)) {
            (Ok(width), Ok(height)) => (width, height),
            _ => bail!("A {}x{} field needs {}x{} characters, more than a terminal has", field.width, field.height, cols, rows),
        };
        let len = width as usize * height as usize;

        Ok(TermSurface {
            out,
            cell_size: field.cell_size,
            width,
            height,
            screen: vec![BLANK; len],
            shown: vec![None; len],
        })
    }

    pub fn size(&self) -> (TermInt, TermInt) {
        (self.width, self.height)
    }

    ///////////////////////////////////////////////////////////////////////////

    // Cell maths runs in i64 so positions near the i32 limits cannot overflow.
    fn column(&self, x: i64) -> i64 {
        (x * i64::from(COLS_PER_CELL)).div_euclid(i64::from(self.cell_size))
    }

    fn row(&self, y: i64) -> i64 {
        y.div_euclid(i64::from(self.cell_size))
    }

    fn to_cell(&self, (x, y): Coords) -> (i64, i64) {
        (self.column(i64::from(x)), self.row(i64::from(y)))
    }

    fn cell_mut(&mut self, col: i64, row: i64) -> Option<&mut Cell> {
        if col < 0 || row < 0 || col >= i64::from(self.width) || row >= i64::from(self.height) {
            return None;
        }

        let idx = row as usize * self.width as usize + col as usize;
        self.screen.get_mut(idx)
    }

    // Text keeps whatever background is already under it.
    fn print_at(&mut self, (col, row): (i64, i64), text: &str, color: Color, font: Font) {
        for (i, ch) in text.chars().enumerate() {
            if let Some(cell) = self.cell_mut(col + i as i64, row) {
                cell.ch = ch;
                cell.fg = color;
                cell.bold = font == Font::Title;
            }
        }
    }

    #[cfg(test)]
    fn cell_at(&self, col: usize, row: usize) -> Cell {
        self.screen[row * self.width as usize + col]
    }
}

impl<W: Write> Surface for TermSurface<W> {
    fn clear(&mut self, color: Color) {
        self.screen.fill(Cell { bg: color, ..BLANK });
    }

    fn fill_rect(&mut self, pos: Coords, (w, h): Coords, color: Color) {
        let cell_size = i64::from(self.cell_size);
        let (left, top) = self.to_cell(pos);
        let right = ceil_div((i64::from(pos.0) + i64::from(w)) * i64::from(COLS_PER_CELL), cell_size);
        let bottom = ceil_div(i64::from(pos.1) + i64::from(h), cell_size);

        let (left, right) = (left.max(0), right.min(i64::from(self.width)));
        let (top, bottom) = (top.max(0), bottom.min(i64::from(self.height)));

        for row in top..bottom {
            for col in left..right {
                if let Some(cell) = self.cell_mut(col, row) {
                    *cell = Cell { bg: color, ..BLANK };
                }
            }
        }
    }

    fn text(&mut self, pos: Coords, text: &str, color: Color, font: Font) {
        let at = self.to_cell(pos);
        self.print_at(at, text, color, font);
    }

    fn text_centered(&mut self, center: Coords, text: &str, color: Color, font: Font) {
        let (col, row) = self.to_cell(center);
        let half = text.chars().count() as i64 / 2;
        self.print_at((col - half, row), text, color, font);
    }

    fn present(&mut self) -> io::Result<()> {
        let width = self.width as usize;

        for (idx, cell) in self.screen.iter().enumerate() {
            if self.shown[idx] == Some(*cell) {
                continue;
            }

            let weight = if cell.bold { Attribute::Bold } else { Attribute::NormalIntensity };
            queue!(
                self.out,
                cursor::MoveTo((idx % width) as TermInt, (idx / width) as TermInt),
                style::SetAttribute(weight),
                style::SetForegroundColor(term_color(cell.fg)),
                style::SetBackgroundColor(term_color(cell.bg)),
                style::Print(cell.ch)
            )?;
            self.shown[idx] = Some(*cell);
        }

        self.out.flush()
    }
}

/// Keyboard input from the terminal. Ctrl+C stands in for closing the window.
pub struct TermInput;

impl InputSource for TermInput {
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>> {
        let mut events = vec![];

        while poll(Duration::ZERO)? {
            if let Event::Key(ev) = read()? {
                events.extend(translate_key(&ev));
            }
        }

        Ok(events)
    }
}

fn translate_key(ev: &KeyEvent) -> Vec<InputEvent> {
    if ev.kind == KeyEventKind::Release {
        return vec![];
    }

    if is_ctrl_c(ev) {
        return vec![InputEvent::Quit];
    }

    let key = match ev.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Null | KeyCode::Modifier(_) | KeyCode::Media(_) => return vec![],
        _ => Key::Other,
    };

    match key {
        Key::Char(ch) if !ev.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            vec![InputEvent::KeyDown(key), InputEvent::Text(ch)]
        }
        _ => vec![InputEvent::KeyDown(key)],
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

fn term_color(color: Color) -> style::Color {
    match color {
        Color::Black => style::Color::Black,
        Color::White => style::Color::White,
        Color::Green => style::Color::Green,
        Color::Red => style::Color::Red,
        Color::LightBlue => style::Color::Cyan,
        Color::Yellow => style::Color::Yellow,
    }
}

fn ceil_div(a: i64, b: i64) -> i64 {
    (a + b - 1).div_euclid(b)
}
