// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::bolt::Bolt;
use crate::cell::{is_blank_glyph, Cell};
use crate::cloud::{Cloud, CloudId};
use crate::frame::Frame;
use crate::geometry::{Branch, Point};
use crate::glyphs::{Glyphs, Heading};
use crate::palette::Palette;
use crate::runtime::Role;
use crate::storm::Storm;

const GLOW_RADIUS: i32 = 2;
const GLOW_SKIP_CHANCE: f64 = 0.6;
const FLICKER_CHANCE: f64 = 0.3;

const DENSE_CHANCE: f64 = 0.6;
const MEDIUM_CHANCE: f64 = 0.85;
const WISPY_EDGE: u16 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Texture {
    Dense,
    Medium,
    Light,
}

pub struct Renderer {
    palette: Palette,
    glyphs: Glyphs,
}

impl Renderer {
    pub fn new(palette: Palette, glyphs: Glyphs) -> Self {
        Self { palette, glyphs }
    }

    /// Paints one full frame: clouds, then the glow pass, then the core pass.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, storm: &Storm, frame: &mut Frame) {
        frame.clear();
        self.draw_clouds(rng, storm.clouds(), |id| storm.is_lit(id), frame);
        self.glow_pass(rng, storm.bolts(), frame);
        self.core_pass(rng, storm.bolts(), frame);
    }

    pub fn draw_clouds<R, F>(&self, rng: &mut R, clouds: &[Cloud], is_lit: F, frame: &mut Frame)
    where
        R: Rng + ?Sized,
        F: Fn(CloudId) -> bool,
    {
        let bg = frame.bg();
        for cloud in clouds.iter().filter(|c| c.active) {
            let lit = is_lit(cloud.id);
            let left = cloud.x.floor() as i32;
            let top = cloud.y.floor() as i32;

            for (row, layer) in cloud.layers.iter().enumerate() {
                let y = top + row as i32;
                if y < 0 || y >= frame.height as i32 {
                    continue;
                }
                let start = left + layer.offset as i32;
                for dx in 0..layer.width {
                    let x = start + dx as i32;
                    if x < 0 || x >= frame.width as i32 {
                        continue;
                    }

                    let roll = rng.random::<f64>();
                    let mut texture = if roll < DENSE_CHANCE {
                        Texture::Dense
                    } else if roll < MEDIUM_CHANCE {
                        Texture::Medium
                    } else {
                        Texture::Light
                    };
                    let edge = dx < WISPY_EDGE || dx + WISPY_EDGE >= layer.width;
                    if edge && rng.random_bool(0.5) {
                        texture = Texture::Light;
                    }

                    let (ch, role) = self.cloud_glyph(texture, lit);
                    frame.put(x, y, Cell::styled(ch, self.palette.style(role), bg));
                }
            }
        }
    }

    fn cloud_glyph(&self, texture: Texture, lit: bool) -> (char, Role) {
        match (texture, lit) {
            (Texture::Dense, false) => (self.glyphs.cloud_dense, Role::Cloud),
            (Texture::Dense, true) => (self.glyphs.cloud_dense, Role::CloudLit),
            (Texture::Medium, false) => (self.glyphs.cloud_medium, Role::Cloud),
            (Texture::Medium, true) => (self.glyphs.cloud_medium, Role::CloudLitMedium),
            (Texture::Light, false) => (self.glyphs.cloud_light, Role::CloudDark),
            (Texture::Light, true) => (self.glyphs.cloud_light, Role::CloudLitMedium),
        }
    }

    /// Soft halo around the revealed part of every branch. Only blank cells are touched.
    pub fn glow_pass<R: Rng + ?Sized>(&self, rng: &mut R, bolts: &[Bolt], frame: &mut Frame) {
        let bg = frame.bg();
        let branches = bolts
            .iter()
            .filter(|b| b.active)
            .flat_map(|b| b.branches.iter());

        for branch in branches {
            for p in revealed_points(branch) {
                let (cx, cy) = cell_of(p);
                for gy in -GLOW_RADIUS..=GLOW_RADIUS {
                    for gx in -GLOW_RADIUS..=GLOW_RADIUS {
                        let dist = ((gx * gx + gy * gy) as f64).sqrt();
                        if dist > GLOW_RADIUS as f64 {
                            continue;
                        }
                        let (x, y) = (cx + gx, cy + gy);
                        match frame.glyph_at(x, y) {
                            Some(ch) if is_blank_glyph(ch) => {}
                            _ => continue,
                        }
                        if rng.random::<f64>() < GLOW_SKIP_CHANCE {
                            continue;
                        }

                        let (ch, role) = if dist < 1.0 {
                            (self.glyphs.glow_dense, Role::GlowMedium)
                        } else if dist < 1.5 {
                            (self.glyphs.glow_light, Role::Glow)
                        } else {
                            (self.glyphs.glow_blank, Role::Glow)
                        };
                        frame.put(x, y, Cell::styled(ch, self.palette.style(role), bg));
                    }
                }
            }
        }
    }

    /// Solid bolt glyphs over the revealed part of every branch. Overwrites anything below.
    pub fn core_pass<R: Rng + ?Sized>(&self, rng: &mut R, bolts: &[Bolt], frame: &mut Frame) {
        let bg = frame.bg();
        let normal = self.palette.style(Role::Bolt);
        let bright = self.palette.style(Role::BoltBright);
        let branches = bolts
            .iter()
            .filter(|b| b.active)
            .flat_map(|b| b.branches.iter());

        for branch in branches {
            let (dx, dy) = branch.delta();
            let ch = self.glyphs.bolt(Heading::from_delta(dx, dy));
            for p in revealed_points(branch) {
                let (x, y) = cell_of(p);
                let style = if rng.random::<f64>() < FLICKER_CHANCE {
                    bright
                } else {
                    normal
                };
                frame.put(x, y, Cell::styled(ch, style, bg));
            }
        }
    }
}

fn cell_of(p: Point) -> (i32, i32) {
    (p.x.floor() as i32, p.y.floor() as i32)
}

/// `(steps, max_step)` for the revealed part of a branch, or `None` when nothing shows.
pub fn reveal_steps(branch: &Branch) -> Option<(usize, usize)> {
    let len = branch.length();
    if len <= 0.0 || branch.progress <= 0.0 {
        return None;
    }
    let steps = (len.round() as usize).max(1);
    let max_step = (steps as f64 * branch.progress.min(1.0)).floor() as usize;
    Some((steps, max_step))
}

pub fn revealed_points(branch: &Branch) -> impl Iterator<Item = Point> + '_ {
    let (dx, dy) = branch.delta();
    let start = branch.start;
    reveal_steps(branch)
        .into_iter()
        .flat_map(move |(steps, max_step)| {
            (0..=max_step).map(move |i| {
                let t = i as f64 / steps as f64;
                Point::new(start.x + dx * t, start.y + dy * t)
            })
        })
}
