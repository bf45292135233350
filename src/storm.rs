// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, trace};

use crate::bolt::Bolt;
use crate::cloud::{Cloud, CloudId};
use crate::geometry::Point;

const CLOUD_INTERVAL_MS: (u64, u64) = (2000, 5000);
const BOLT_INTERVAL_MS: (u64, u64) = (1500, 3500);

fn roll_interval<R: Rng + ?Sized>(rng: &mut R, (low, high): (u64, u64)) -> Duration {
    Duration::from_millis(rng.random_range(low..high))
}

/// Owns every cloud and bolt and advances them one tick at a time.
///
/// Spawn timers run on a simulation clock that only moves when [`Storm::tick`]
/// is called, so a paused storm does not build up a backlog of spawns.
pub struct Storm {
    pub width: u16,
    pub height: u16,
    max_clouds: usize,
    max_bolts: usize,

    clouds: Vec<Cloud>,
    bolts: Vec<Bolt>,
    next_cloud_id: u64,

    clock: Duration,
    next_cloud_at: Duration,
    next_bolt_at: Duration,
}

impl Storm {
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        width: u16,
        height: u16,
        max_clouds: usize,
        max_bolts: usize,
    ) -> Self {
        let mut storm = Self {
            width,
            height,
            max_clouds,
            max_bolts,
            clouds: Vec::new(),
            bolts: Vec::new(),
            next_cloud_id: 0,
            clock: Duration::ZERO,
            next_cloud_at: Duration::ZERO,
            next_bolt_at: Duration::ZERO,
        };
        storm.reset(rng);
        storm
    }

    /// Clears the sky. The first cloud arrives on the next tick.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.clouds.clear();
        self.bolts.clear();
        self.clock = Duration::ZERO;
        self.next_cloud_at = Duration::ZERO;
        self.next_bolt_at = roll_interval(rng, BOLT_INTERVAL_MS);
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn bolts(&self) -> &[Bolt] {
        &self.bolts
    }

    pub fn cloud(&self, id: CloudId) -> Option<&Cloud> {
        self.clouds.iter().find(|c| c.id == id)
    }

    /// A cloud is lit while it is the origin of an active bolt.
    pub fn is_lit(&self, id: CloudId) -> bool {
        self.cloud(id).is_some()
            && self
                .bolts
                .iter()
                .any(|b| b.active && b.cloud == Some(id))
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, dt: Duration) {
        self.clock += dt;

        self.spawn_cloud(rng);
        for cloud in &mut self.clouds {
            cloud.drift(self.width);
        }
        self.clouds.retain(|c| {
            if !c.active {
                debug!(id = c.id.0, x = c.x, "cloud left the screen");
            }
            c.active
        });

        self.spawn_bolt(rng);
        for bolt in &mut self.bolts {
            bolt.tick();
        }
        self.bolts.retain(|b| {
            if !b.active {
                trace!(age = b.age, complete = b.is_fully_drawn(), "bolt expired");
            }
            b.active
        });
    }

    /// Adopts a new grid size. Clouds that no longer overlap the screen are
    /// dropped and every bolt is discarded, since bolt geometry was laid out for
    /// the old size.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let before = self.clouds.len();
        self.clouds.retain(|c| c.fits(width, height));
        info!(
            width,
            height,
            dropped_clouds = before - self.clouds.len(),
            dropped_bolts = self.bolts.len(),
            "resized"
        );
        self.bolts.clear();
    }

    fn spawn_cloud<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.clouds.len() >= self.max_clouds || self.clock < self.next_cloud_at {
            return;
        }
        let id = CloudId(self.next_cloud_id);
        self.next_cloud_id += 1;

        let cloud = Cloud::spawn(rng, id, self.width, self.height);
        debug!(
            id = id.0,
            x = cloud.x,
            y = cloud.y,
            width = cloud.width,
            speed = cloud.speed,
            "cloud spawned"
        );
        self.clouds.push(cloud);
        self.next_cloud_at = self.clock + roll_interval(rng, CLOUD_INTERVAL_MS);
    }

    fn spawn_bolt<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.bolts.len() >= self.max_bolts
            || self.clock < self.next_bolt_at
            || self.clouds.is_empty()
        {
            return;
        }

        let cloud = &self.clouds[rng.random_range(0..self.clouds.len())];
        let origin = Point::new(
            cloud.x + rng.random_range(0..cloud.width.max(1)) as f64,
            cloud.base_row(),
        );
        let bolt = Bolt::strike(rng, origin, Some(cloud.id), self.width, self.height);
        debug!(
            cloud = cloud.id.0,
            x = bolt.origin.x,
            y = bolt.origin.y,
            branches = bolt.branches.len(),
            flash = bolt.flash_ticks,
            "bolt struck"
        );
        self.bolts.push(bolt);
        self.next_bolt_at = self.clock + roll_interval(rng, BOLT_INTERVAL_MS);
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::geometry::Branch;

    const TICK: Duration = Duration::from_millis(100);

    fn storm(seed: u64, width: u16, height: u16) -> (Storm, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let storm = Storm::new(&mut rng, width, height, 3, 2);
        (storm, rng)
    }

    #[test]
    fn first_cloud_arrives_on_first_tick_then_waits() {
        let (mut s, mut rng) = storm(1, 120, 40);
        s.tick(&mut rng, TICK);
        assert_eq!(s.clouds().len(), 1);

        let next = s.next_cloud_at;
        assert!(next >= Duration::from_millis(2100) && next < Duration::from_millis(5100));
        while s.clock + TICK < next {
            s.tick(&mut rng, TICK);
            assert_eq!(s.clouds().len(), 1);
        }
        s.tick(&mut rng, TICK);
        assert_eq!(s.clouds().len(), 2);
    }

    #[test]
    fn cloud_population_is_capped() {
        let (mut s, mut rng) = storm(2, 400, 60);
        for _ in 0..600 {
            s.tick(&mut rng, TICK);
            assert!(s.clouds().len() <= 3);
            assert!(s.bolts().len() <= 2);
        }
    }

    #[test]
    fn bolts_need_a_cloud() {
        let (mut s, mut rng) = storm(3, 120, 40);
        s.max_clouds = 0;
        for _ in 0..100 {
            s.tick(&mut rng, TICK);
        }
        assert!(s.bolts().is_empty());
    }

    #[test]
    fn bolts_strike_from_below_their_cloud() {
        let (mut s, mut rng) = storm(4, 200, 60);
        let mut struck = 0;
        for _ in 0..400 {
            s.tick(&mut rng, TICK);
            for b in s.bolts() {
                if let Some(c) = b.cloud.and_then(|id| s.cloud(id)) {
                    if b.age == 1.0 {
                        struck += 1;
                        assert_eq!(b.origin.y, c.base_row());
                        assert!(s.is_lit(c.id));
                    }
                }
            }
        }
        assert!(struck > 0);
    }

    #[test]
    fn cloud_crosses_in_134_ticks_and_is_removed_past_the_edge() {
        let (mut s, mut rng) = storm(5, 80, 30);
        s.max_clouds = 1;
        s.next_cloud_at = Duration::MAX;
        s.next_bolt_at = Duration::MAX;
        s.clouds.push(Cloud::new(CloudId(99), -40.0, 1.0, 40, 5, 0.3));

        for _ in 0..133 {
            s.tick(&mut rng, TICK);
        }
        assert!(s.clouds()[0].x < 0.0);
        s.tick(&mut rng, TICK);
        assert!(s.clouds()[0].x >= 0.0);

        loop {
            let x = s.clouds()[0].x;
            s.tick(&mut rng, TICK);
            if s.clouds().is_empty() {
                assert!(x + 0.3 > 80.0);
                break;
            }
            assert!(s.clouds()[0].x <= 80.0);
        }
    }

    #[test]
    fn resize_culls_clouds_and_drops_bolts() {
        let (mut s, mut rng) = storm(6, 100, 30);
        s.clouds.push(Cloud::new(CloudId(1), 50.0, 1.0, 30, 4, 0.3));
        s.clouds.push(Cloud::new(CloudId(2), 5.0, 1.0, 30, 4, 0.3));
        s.clouds.push(Cloud::new(CloudId(3), -29.0, 1.0, 30, 4, 0.3));
        s.bolts
            .push(Bolt::strike(&mut rng, Point::new(20.0, 5.0), Some(CloudId(2)), 100, 30));

        s.resize(40, 30);
        let ids: Vec<u64> = s.clouds().iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(s.bolts().is_empty());
        assert_eq!((s.width, s.height), (40, 30));
    }

    #[test]
    fn retired_cloud_is_not_lit() {
        let (mut s, _) = storm(7, 100, 30);
        let seg = Branch::new(Point::new(5.0, 5.0), Point::new(5.0, 20.0), None, 0);
        s.bolts.push(Bolt::with_branches(
            Point::new(5.0, 5.0),
            vec![seg],
            Some(CloudId(42)),
            3.0,
        ));
        assert!(!s.is_lit(CloudId(42)));

        s.clouds.push(Cloud::new(CloudId(42), 0.0, 0.0, 30, 4, 0.3));
        assert!(s.is_lit(CloudId(42)));
        assert!(!s.is_lit(CloudId(43)));
    }

    #[test]
    fn reset_clears_everything() {
        let (mut s, mut rng) = storm(8, 120, 40);
        for _ in 0..50 {
            s.tick(&mut rng, TICK);
        }
        s.reset(&mut rng);
        assert!(s.clouds().is_empty() && s.bolts().is_empty());
        s.tick(&mut rng, TICK);
        assert_eq!(s.clouds().len(), 1);
    }
}
