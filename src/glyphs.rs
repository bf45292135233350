// Copyright (c) 2026 rezky_nightky

use crate::runtime::GlyphMode;

/// Direction of a bolt segment as seen on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    Vertical,
    RightSteep,
    LeftSteep,
    RightShallow,
    LeftShallow,
}

impl Heading {
    const VERTICAL_DX: f64 = 0.1;

    pub fn from_delta(dx: f64, dy: f64) -> Self {
        if dx.abs() < Self::VERTICAL_DX {
            return Heading::Vertical;
        }
        let steep = dy.abs() >= dx.abs();
        match (dx > 0.0, steep) {
            (true, true) => Heading::RightSteep,
            (false, true) => Heading::LeftSteep,
            (true, false) => Heading::RightShallow,
            (false, false) => Heading::LeftShallow,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Glyphs {
    pub cloud_dense: char,
    pub cloud_medium: char,
    pub cloud_light: char,
    pub glow_dense: char,
    pub glow_light: char,
    pub glow_blank: char,
    bolt: [char; 5],
}

impl Glyphs {
    pub fn new(mode: GlyphMode) -> Self {
        match mode {
            GlyphMode::Unicode => Self {
                cloud_dense: '█',
                cloud_medium: '▓',
                cloud_light: '▒',
                glow_dense: '·',
                glow_light: '.',
                glow_blank: ' ',
                bolt: ['|', '╲', '╱', '\\', '/'],
            },
            GlyphMode::Ascii => Self {
                cloud_dense: '#',
                cloud_medium: '%',
                cloud_light: ':',
                glow_dense: '+',
                glow_light: '.',
                glow_blank: ' ',
                bolt: ['|', '\\', '/', '\\', '/'],
            },
        }
    }

    pub fn bolt(&self, heading: Heading) -> char {
        let i = match heading {
            Heading::Vertical => 0,
            Heading::RightSteep => 1,
            Heading::LeftSteep => 2,
            Heading::RightShallow => 3,
            Heading::LeftShallow => 4,
        };
        self.bolt[i]
    }
}

pub fn glyph_mode_from_str(name: &str, default_to_ascii: bool) -> Result<GlyphMode, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(if default_to_ascii {
            GlyphMode::Ascii
        } else {
            GlyphMode::Unicode
        }),
        "unicode" | "utf8" | "utf-8" => Ok(GlyphMode::Unicode),
        "ascii" => Ok(GlyphMode::Ascii),
        _ => Err(format!("invalid charset: {} (allowed: auto, unicode, ascii)", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_cover_five_buckets() {
        assert_eq!(Heading::from_delta(0.05, 3.0), Heading::Vertical);
        assert_eq!(Heading::from_delta(1.0, 3.0), Heading::RightSteep);
        assert_eq!(Heading::from_delta(-1.0, 3.0), Heading::LeftSteep);
        assert_eq!(Heading::from_delta(4.0, 3.0), Heading::RightShallow);
        assert_eq!(Heading::from_delta(-4.0, 3.0), Heading::LeftShallow);
    }

    #[test]
    fn downward_segments_use_all_five_unicode_glyphs() {
        let g = Glyphs::new(GlyphMode::Unicode);
        let drawn: Vec<char> = [(0.0, 5.0), (2.0, 5.0), (-2.0, 5.0), (5.0, 2.0), (-5.0, 2.0)]
            .iter()
            .map(|&(dx, dy)| g.bolt(Heading::from_delta(dx, dy)))
            .collect();
        assert_eq!(drawn, vec!['|', '╲', '╱', '\\', '/']);
    }

    #[test]
    fn ascii_set_is_ascii() {
        let g = Glyphs::new(GlyphMode::Ascii);
        let all = [g.cloud_dense, g.cloud_medium, g.cloud_light, g.glow_dense, g.glow_light];
        assert!(all.iter().all(char::is_ascii));
        assert_eq!(g.bolt(Heading::Vertical), '|');
    }

    #[test]
    fn parses_charset_names() {
        assert_eq!(glyph_mode_from_str("auto", true), Ok(GlyphMode::Ascii));
        assert_eq!(glyph_mode_from_str("AUTO", false), Ok(GlyphMode::Unicode));
        assert_eq!(glyph_mode_from_str(" utf8 ", true), Ok(GlyphMode::Unicode));
        assert!(glyph_mode_from_str("katakana", false).is_err());
    }
}
