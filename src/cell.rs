// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

/// Foreground styling resolved once per role by the palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bold: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Cell {
    pub fn blank_with_bg(bg: Option<Color>) -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg,
            bold: false,
        }
    }

    pub fn styled(ch: char, style: Style, bg: Option<Color>) -> Self {
        Self {
            ch,
            fg: style.fg,
            bg,
            bold: style.bold,
        }
    }
}

pub fn is_blank_glyph(ch: char) -> bool {
    ch == ' ' || ch == '\0'
}
