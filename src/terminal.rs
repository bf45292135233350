// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};
use tracing::debug;

use crate::cell::Cell;
use crate::frame::Frame;

/// What the terminal currently shows, so unchanged cells can be skipped.
struct Shown {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

pub struct Terminal {
    stdout: Stdout,
    shown: Option<Shown>,
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    /// Presents `frame`, writing only runs of cells that differ from the last present.
    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        let same_size = self
            .shown
            .as_ref()
            .is_some_and(|s| s.width == frame.width && s.height == frame.height);
        if !same_size {
            debug!(width = frame.width, height = frame.height, "full redraw");
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.shown = None;
        }

        let width = frame.width as usize;
        let len = width * frame.height as usize;
        let mut pen = Pen::default();
        self.stdout.queue(SetForegroundColor(Color::Reset))?;
        self.stdout.queue(SetBackgroundColor(Color::Reset))?;
        self.stdout.queue(SetAttribute(Attribute::NormalIntensity))?;

        let mut i = 0usize;
        while i < len {
            let cell = frame.cell_at_index(i);
            if self.is_shown(i, cell) {
                i += 1;
                continue;
            }

            // Extend the run along the row while cells change and share a style.
            let row_end = (i / width + 1) * width;
            self.run_buf.clear();
            self.run_buf.push(cell.ch);
            let mut j = i + 1;
            while j < row_end {
                let next = frame.cell_at_index(j);
                if self.is_shown(j, next)
                    || next.fg != cell.fg
                    || next.bg != cell.bg
                    || next.bold != cell.bold
                {
                    break;
                }
                self.run_buf.push(next.ch);
                j += 1;
            }

            let x = (i % width) as u16;
            let y = (i / width) as u16;
            if pen.pos != Some((x, y)) {
                self.stdout.queue(cursor::MoveTo(x, y))?;
            }
            if pen.fg != cell.fg {
                self.stdout
                    .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
                pen.fg = cell.fg;
            }
            if pen.bg != cell.bg {
                self.stdout
                    .queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
                pen.bg = cell.bg;
            }
            if pen.bold != cell.bold {
                self.stdout.queue(SetAttribute(if cell.bold {
                    Attribute::Bold
                } else {
                    Attribute::NormalIntensity
                }))?;
                pen.bold = cell.bold;
            }
            self.stdout.queue(Print(self.run_buf.as_str()))?;

            let run = (j - i) as u16;
            let next_x = x.saturating_add(run);
            pen.pos = (next_x < frame.width).then_some((next_x, y));
            i = j;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;

        self.remember(frame);
        Ok(())
    }

    fn is_shown(&self, i: usize, cell: Cell) -> bool {
        self.shown
            .as_ref()
            .and_then(|s| s.cells.get(i))
            .is_some_and(|c| *c == cell)
    }

    fn remember(&mut self, frame: &Frame) {
        let len = frame.width as usize * frame.height as usize;
        let shown = self.shown.get_or_insert_with(|| Shown {
            width: frame.width,
            height: frame.height,
            cells: Vec::with_capacity(len),
        });
        shown.cells.clear();
        shown.cells.extend((0..len).map(|i| frame.cell_at_index(i)));
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.flush();
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
