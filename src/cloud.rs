// Copyright (c) 2026 rezky_nightky

use rand::Rng;

pub const MIN_LAYER_WIDTH: u16 = 5;

const MIN_WIDTH: u16 = 30;
const MAX_WIDTH: u16 = 70;
const MIN_LAYERS: usize = 4;
const MAX_LAYERS: usize = 8;
const MIN_SPEED: f64 = 0.2;
const MAX_SPEED: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CloudId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layer {
    pub width: u16,
    /// Columns from the cloud's left edge to the start of this layer.
    pub offset: u16,
}

#[derive(Clone, Debug)]
pub struct Cloud {
    pub id: CloudId,
    /// Left edge; may be negative while the cloud drifts in or out.
    pub x: f64,
    pub y: f64,
    pub width: u16,
    pub speed: f64,
    pub active: bool,
    pub layers: Vec<Layer>,
}

impl Cloud {
    pub fn new(id: CloudId, x: f64, y: f64, width: u16, layer_count: usize, speed: f64) -> Self {
        Self {
            id,
            x,
            y,
            width,
            speed,
            active: true,
            layers: build_layers(width, layer_count),
        }
    }

    /// Rolls a new cloud just outside the left or right screen edge, heading inward.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, id: CloudId, screen_w: u16, screen_h: u16) -> Self {
        let y = rng.random_range(0..(screen_h / 4).max(1)) as f64;
        let width = rng.random_range(MIN_WIDTH..MAX_WIDTH);
        let layer_count = rng.random_range(MIN_LAYERS..MAX_LAYERS);
        let speed = rng.random_range(MIN_SPEED..MAX_SPEED);

        if rng.random_bool(0.5) {
            Self::new(id, -(width as f64), y, width, layer_count, speed)
        } else {
            Self::new(id, screen_w as f64, y, width, layer_count, -speed)
        }
    }

    /// Row just below the bottom layer.
    pub fn base_row(&self) -> f64 {
        self.y + self.layers.len() as f64
    }

    pub fn drift(&mut self, screen_w: u16) {
        if !self.active {
            return;
        }
        self.x += self.speed;
        if self.x + (self.width as f64) < 0.0 || self.x > screen_w as f64 {
            self.active = false;
        }
    }

    pub fn fits(&self, screen_w: u16, screen_h: u16) -> bool {
        self.x + self.width as f64 >= 0.0 && self.x < screen_w as f64 && self.y < screen_h as f64
    }
}

/// Layers widen linearly from half the base width on top to the full width at the bottom.
fn build_layers(width: u16, count: usize) -> Vec<Layer> {
    (0..count)
        .map(|i| {
            let pct = if count <= 1 {
                1.0
            } else {
                0.5 + (i as f64 / (count - 1) as f64) * 0.5
            };
            let lw = ((width as f64 * pct) as u16).max(MIN_LAYER_WIDTH);
            Layer {
                width: lw,
                offset: width.saturating_sub(lw) / 2,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn layers_widen_downward() {
        for count in 1..10 {
            for width in [4u16, 9, 30, 47, 69] {
                let layers = build_layers(width, count);
                assert_eq!(layers.len(), count);
                for pair in layers.windows(2) {
                    assert!(pair[0].width <= pair[1].width);
                }
                assert!(layers.iter().all(|l| l.width >= MIN_LAYER_WIDTH));
            }
        }
        let layers = build_layers(40, 5);
        assert_eq!(layers[0], Layer { width: 20, offset: 10 });
        assert_eq!(layers[4], Layer { width: 40, offset: 0 });
    }

    #[test]
    fn spawn_starts_off_screen_and_moves_inward() {
        let mut rng = StdRng::seed_from_u64(3);
        let (mut left, mut right) = (0, 0);
        for i in 0..200 {
            let c = Cloud::spawn(&mut rng, CloudId(i), 120, 40);
            assert!((MIN_WIDTH..MAX_WIDTH).contains(&c.width));
            assert!((MIN_LAYERS..MAX_LAYERS).contains(&c.layers.len()));
            assert!(c.speed.abs() >= MIN_SPEED && c.speed.abs() < MAX_SPEED);
            assert!(c.y < 10.0);
            if c.speed > 0.0 {
                assert_eq!(c.x, -(c.width as f64));
                left += 1;
            } else {
                assert_eq!(c.x, 120.0);
                right += 1;
            }
        }
        assert!(left > 0 && right > 0);
    }

    #[test]
    fn drifts_across_and_retires() {
        let mut c = Cloud::new(CloudId(1), -40.0, 2.0, 40, 5, 0.3);
        let mut ticks = 0;
        while c.x < 0.0 {
            c.drift(100);
            ticks += 1;
        }
        assert_eq!(ticks, (40.0f64 / 0.3).ceil() as i32);
        assert_eq!(ticks, 134);
        assert!(c.active);

        while c.active {
            c.drift(100);
        }
        assert!(c.x > 100.0);
    }

    #[test]
    fn leftward_cloud_retires_past_left_edge() {
        let mut c = Cloud::new(CloudId(1), 10.0, 0.0, 30, 4, -0.5);
        while c.active {
            c.drift(80);
        }
        assert!(c.x + 30.0 < 0.0);
    }

    #[test]
    fn fits_checks_horizontal_overlap() {
        let c = Cloud::new(CloudId(1), 50.0, 0.0, 30, 4, 0.3);
        assert!(!c.fits(40, 20));
        assert!(c.fits(60, 20));
        let low = Cloud::new(CloudId(2), 0.0, 25.0, 30, 4, 0.3);
        assert!(!low.fits(80, 20));
    }
}
