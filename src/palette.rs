// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Style;
use crate::runtime::{ColorMode, Role};

const GRAY: (u8, u8, u8) = (128, 128, 128);
const DARK_GRAY: (u8, u8, u8) = (88, 88, 88);
const WHITE: (u8, u8, u8) = (255, 255, 255);

/// Styles for every role, resolved once for the terminal's color capability.
#[derive(Clone, Debug)]
pub struct Palette {
    styles: [Style; Role::ALL.len()],
    pub bg: Option<Color>,
}

impl Palette {
    pub fn new(mode: ColorMode, grayscale: bool, default_background: bool) -> Self {
        let styles = Role::ALL.map(|role| {
            let rgb = if grayscale {
                gray_rgb(role)
            } else {
                role_rgb(role)
            };
            Style {
                fg: map_rgb(mode, rgb),
                bold: matches!(role, Role::BoltBright | Role::CloudLit),
            }
        });

        let bg = if default_background {
            None
        } else {
            Some(match mode {
                ColorMode::Mono | ColorMode::Color16 => Color::Black,
                ColorMode::Color256 => Color::AnsiValue(16),
                ColorMode::TrueColor => Color::Rgb { r: 0, g: 0, b: 0 },
            })
        };

        Self { styles, bg }
    }

    pub fn style(&self, role: Role) -> Style {
        self.styles[role as usize]
    }
}

fn role_rgb(role: Role) -> (u8, u8, u8) {
    match role {
        Role::Cloud => GRAY,
        Role::CloudDark => DARK_GRAY,
        Role::CloudLit => WHITE,
        Role::CloudLitMedium => (255, 255, 224),
        Role::Bolt => (255, 255, 0),
        Role::BoltBright => WHITE,
        Role::Glow => (0, 139, 139),
        Role::GlowMedium => (0, 0, 255),
    }
}

/// Brightness-preserving collapse: bolts stay white, colored accents go gray.
fn gray_rgb(role: Role) -> (u8, u8, u8) {
    match role {
        Role::CloudLit | Role::Bolt | Role::BoltBright => WHITE,
        Role::CloudDark => DARK_GRAY,
        Role::Cloud | Role::CloudLitMedium | Role::Glow | Role::GlowMedium => GRAY,
    }
}

fn map_rgb(mode: ColorMode, (r, g, b): (u8, u8, u8)) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
    }
}

fn dist2(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    dr * dr + dg * dg + db * db
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (level(r), level(g), level(b));
    let cube = (
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, (0, 0, 0)),
        239..=255 => (231, WHITE),
        _ => {
            let step = (avg - 8) / 10;
            let v = 8 + 10 * step;
            (232 + step, (v, v, v))
        }
    };

    if dist2((r, g, b), gray) < dist2((r, g, b), cube) {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2((r, g, b), *rgb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}
