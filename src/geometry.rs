// Copyright (c) 2026 rezky_nightky

use rand::Rng;

pub const MAX_DEPTH: u8 = 3;
/// Deepest level that may still spawn a sub-bolt.
const RECURSE_BELOW_DEPTH: u8 = 2;

const MIN_TRUNK_SEGMENTS: u32 = 6;
const MAX_TRUNK_SEGMENTS: u32 = 12;
const TRUNK_JITTER: f64 = 4.0;

const SIDE_BRANCH_CHANCE: f64 = 0.6;
const SIDE_BRANCH_MIN_ROOM: f64 = 5.0;
const SIDE_ANGLE_SPREAD: f64 = 1.5;
const SIDE_MIN_LEN: f64 = 5.0;
const SIDE_MAX_LEN: f64 = 15.0;
const SIDE_DOWNWARD: f64 = 0.7;
const RECURSE_CHANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One straight segment of a bolt.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub start: Point,
    pub end: Point,
    pub progress: f64,
    /// Index of the branch this one grows out of. Always smaller than the
    /// branch's own index when it comes out of [`generate`].
    pub parent: Option<usize>,
    pub segment_order: u32,
    pub depth: u8,
}

impl Branch {
    pub fn new(start: Point, end: Point, parent: Option<usize>, segment_order: u32) -> Self {
        Self {
            start,
            end,
            progress: 0.0,
            parent,
            segment_order,
            depth: 0,
        }
    }

    pub fn delta(&self) -> (f64, f64) {
        (self.end.x - self.start.x, self.end.y - self.start.y)
    }

    pub fn length(&self) -> f64 {
        let (dx, dy) = self.delta();
        (dx * dx + dy * dy).sqrt()
    }
}

/// Builds a bolt's branch tree rooted at `origin`, flattened into one vector.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, origin: Point, width: u16, height: u16) -> Vec<Branch> {
    generate_at_depth(rng, origin, width, height, 0)
}

fn generate_at_depth<R: Rng + ?Sized>(
    rng: &mut R,
    origin: Point,
    width: u16,
    height: u16,
    depth: u8,
) -> Vec<Branch> {
    let mut branches = Vec::new();
    if depth > MAX_DEPTH {
        return branches;
    }

    let bottom = height as f64 - 1.0;
    let remaining = bottom - origin.y;
    if remaining <= 0.0 {
        return branches;
    }

    let max_x = width as f64 - 2.0;
    let segments = rng.random_range(MIN_TRUNK_SEGMENTS..MAX_TRUNK_SEGMENTS);
    let seg_len = (remaining / segments as f64).max(1.0);

    let mut prev = origin;
    for i in 0..segments {
        let jitter = (rng.random::<f64>() - 0.5) * TRUNK_JITTER;
        let mut cur = Point::new(prev.x + jitter, (prev.y + seg_len).min(bottom));
        if cur.x < 1.0 {
            cur.x = 1.0;
        }
        if cur.x > max_x {
            cur.x = max_x;
        }

        let parent = if i > 0 { Some(branches.len() - 1) } else { None };
        branches.push(Branch {
            depth,
            ..Branch::new(prev, cur, parent, i)
        });

        let has_room = cur.y < bottom - SIDE_BRANCH_MIN_ROOM;
        if i + 1 < segments && has_room && rng.random::<f64>() < SIDE_BRANCH_CHANCE {
            add_side_branch(rng, &mut branches, cur, i, width, height, depth);
        }

        prev = cur;
        if cur.y >= bottom {
            break;
        }
    }

    branches
}

fn add_side_branch<R: Rng + ?Sized>(
    rng: &mut R,
    branches: &mut Vec<Branch>,
    from: Point,
    order: u32,
    width: u16,
    height: u16,
    depth: u8,
) {
    let angle = (rng.random::<f64>() - 0.5) * SIDE_ANGLE_SPREAD;
    let len = rng.random_range(SIDE_MIN_LEN..SIDE_MAX_LEN);
    let end = Point::new(from.x + angle * len, from.y + len * SIDE_DOWNWARD);

    if end.x < 1.0 || end.x >= width as f64 - 1.0 || end.y >= height as f64 {
        return;
    }

    let trunk_idx = branches.len() - 1;
    branches.push(Branch {
        depth,
        ..Branch::new(from, end, Some(trunk_idx), order)
    });

    if depth < RECURSE_BELOW_DEPTH && rng.random::<f64>() < RECURSE_CHANCE {
        let side_idx = branches.len() - 1;
        let sub = generate_at_depth(rng, end, width, height, depth + 1);
        graft(branches, sub, side_idx);
    }
}

/// Appends a locally indexed sub-tree, re-pointing its roots at `attach`.
pub fn graft(branches: &mut Vec<Branch>, mut sub: Vec<Branch>, attach: usize) {
    let offset = branches.len();
    for b in &mut sub {
        b.parent = match b.parent {
            None => Some(attach),
            Some(p) => Some(p + offset),
        };
    }
    branches.extend(sub);
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn bolts(count: u64, width: u16, height: u16) -> Vec<Vec<Branch>> {
        (0..count)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let x = rng.random_range(2.0..(width as f64 - 2.0));
                generate(&mut rng, Point::new(x, 3.0), width, height)
            })
            .collect()
    }

    #[test]
    fn parents_always_point_backwards() {
        for bolt in bolts(500, 120, 60) {
            for (i, b) in bolt.iter().enumerate() {
                if let Some(p) = b.parent {
                    assert!(p < i, "branch {} has parent {}", i, p);
                }
            }
        }
    }

    #[test]
    fn recursion_is_bounded() {
        let mut saw_sub_bolt = false;
        for bolt in bolts(500, 160, 80) {
            for b in &bolt {
                assert!(b.depth <= MAX_DEPTH);
                assert!(b.depth <= RECURSE_BELOW_DEPTH);
                saw_sub_bolt |= b.depth > 0;
            }
        }
        assert!(saw_sub_bolt);
    }

    #[test]
    fn first_branch_is_the_only_root() {
        for bolt in bolts(200, 100, 50) {
            assert!(!bolt.is_empty());
            assert_eq!(bolt[0].parent, None);
            assert!(bolt.iter().skip(1).all(|b| b.parent.is_some()));
        }
    }

    #[test]
    fn trunk_reaches_bottom_and_stays_inside() {
        for bolt in bolts(200, 80, 40) {
            let last_trunk = bolt
                .iter()
                .filter(|b| b.depth == 0)
                .map(|b| b.end.y)
                .fold(0.0, f64::max);
            assert!(last_trunk >= 39.0 - 1e-9);
            for b in &bolt {
                assert!(b.end.x >= 1.0 && b.end.x < 79.0, "x out of range: {}", b.end.x);
                assert!(b.end.y < 40.0);
                assert!(b.end.y >= b.start.y);
            }
        }
    }

    #[test]
    fn origin_at_bottom_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(generate(&mut rng, Point::new(10.0, 19.0), 40, 20).is_empty());
        assert!(generate(&mut rng, Point::new(10.0, 25.0), 40, 20).is_empty());
    }

    #[test]
    fn too_deep_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(generate_at_depth(&mut rng, Point::new(10.0, 0.0), 40, 20, MAX_DEPTH + 1).is_empty());
    }

    #[test]
    fn graft_renumbers_roots_and_shifts_the_rest() {
        let p = Point::new(0.0, 0.0);
        let mut main = vec![
            Branch::new(p, p, None, 0),
            Branch::new(p, p, Some(0), 0),
            Branch::new(p, p, Some(0), 1),
        ];
        let sub = vec![
            Branch::new(p, p, None, 0),
            Branch::new(p, p, Some(0), 1),
            Branch::new(p, p, Some(1), 1),
        ];
        graft(&mut main, sub, 1);
        let parents: Vec<Option<usize>> = main.iter().map(|b| b.parent).collect();
        assert_eq!(parents, vec![None, Some(0), Some(0), Some(1), Some(3), Some(4)]);
    }
}
