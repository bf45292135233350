// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::cloud::CloudId;
use crate::geometry::{self, Branch, Point};

/// Distance a bolt's leading edge travels per tick, in cells.
pub const BOLT_SPEED: f64 = 15.0;
/// Parent progress a child branch waits for before it starts revealing.
pub const GATE_PROGRESS: f64 = 0.8;

const MIN_FLASH_TICKS: f64 = 2.0;
const MAX_FLASH_TICKS: f64 = 4.0;

pub struct Bolt {
    pub origin: Point,
    pub age: f64,
    pub active: bool,
    pub flash_ticks: f64,
    pub branches: Vec<Branch>,
    pub cloud: Option<CloudId>,
}

impl Bolt {
    pub fn strike<R: Rng + ?Sized>(
        rng: &mut R,
        origin: Point,
        cloud: Option<CloudId>,
        width: u16,
        height: u16,
    ) -> Self {
        let branches = geometry::generate(rng, origin, width, height);
        let flash_ticks = rng.random_range(MIN_FLASH_TICKS..MAX_FLASH_TICKS);
        Self::with_branches(origin, branches, cloud, flash_ticks)
    }

    pub fn with_branches(
        origin: Point,
        branches: Vec<Branch>,
        cloud: Option<CloudId>,
        flash_ticks: f64,
    ) -> Self {
        Self {
            origin,
            age: 0.0,
            active: true,
            flash_ticks,
            branches,
            cloud,
        }
    }

    /// Ages the bolt by one tick and reveals more of its branches.
    pub fn tick(&mut self) {
        if !self.active {
            return;
        }
        self.age += 1.0;
        advance_branches(&mut self.branches);
        if self.age > self.flash_ticks {
            self.active = false;
        }
    }

    pub fn is_fully_drawn(&self) -> bool {
        self.branches.iter().all(|b| b.progress >= 1.0)
    }
}

/// One step of the reveal. Branches are visited in order, so a child sees
/// its parent's progress from this same tick.
pub fn advance_branches(branches: &mut [Branch]) {
    for i in 0..branches.len() {
        let gated = match branches[i].parent {
            Some(p) if p != i => branches
                .get(p)
                .is_some_and(|parent| parent.progress < GATE_PROGRESS),
            _ => false,
        };

        let b = &mut branches[i];
        let len = b.length();
        if len <= 0.0 {
            b.progress = 1.0;
            continue;
        }
        if gated || b.progress >= 1.0 {
            continue;
        }
        b.progress = (b.progress + BOLT_SPEED / len).min(1.0);
    }
}
