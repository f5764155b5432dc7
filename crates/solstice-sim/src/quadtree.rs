//! Point quadtree for proximity queries.
//!
//! Rebuilt from scratch every tick over double the world bounds from the
//! currently-alive enemies; stale entries never persist across ticks.
//! Rebuild-per-tick is a deliberate tradeoff valid at the entity counts
//! this game reaches (low hundreds).

use glam::Vec2;
use hecs::{Entity, World};

use solstice_core::components::{Boss, Enemy};
use solstice_core::constants::{QUADTREE_CAPACITY, WORLD_HEIGHT, WORLD_WIDTH};
use solstice_core::types::{Position, Rect};

/// One quadtree node. Children are allocated lazily on first overflow.
#[derive(Debug)]
pub struct Quadtree {
    bounds: Rect,
    points: Vec<(Vec2, Entity)>,
    children: Option<Box<[Quadtree; 4]>>,
}

impl Quadtree {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            points: Vec::with_capacity(QUADTREE_CAPACITY),
            children: None,
        }
    }

    /// Empty tree covering double the world's bounding box.
    pub fn world_sized() -> Self {
        Self::new(Rect::new(
            -WORLD_WIDTH * 0.5,
            -WORLD_HEIGHT * 0.5,
            WORLD_WIDTH * 2.0,
            WORLD_HEIGHT * 2.0,
        ))
    }

    /// Rebuild over all non-dead enemies (the boss included).
    pub fn rebuild(world: &World) -> Self {
        let mut tree = Self::world_sized();
        for (entity, (pos, enemy)) in world.query::<(&Position, &Enemy)>().iter() {
            if !enemy.dead {
                tree.insert(pos.0, entity);
            }
        }
        // Bosses carry an Enemy component, so they are already included;
        // this is just the assertion of that invariant.
        debug_assert!(world.query::<(&Boss,)>().iter().count() <= 1);
        tree
    }

    /// Insert a point. Returns false (and stores nothing) if the point is
    /// outside this node's bounds.
    pub fn insert(&mut self, point: Vec2, entity: Entity) -> bool {
        if !self.bounds.contains(point) {
            return false;
        }
        if self.points.len() < QUADTREE_CAPACITY && self.children.is_none() {
            self.points.push((point, entity));
            return true;
        }
        if self.children.is_none() {
            self.subdivide();
        }
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                if child.insert(point, entity) {
                    return true;
                }
            }
        }
        false
    }

    /// Collect every stored point inside `range` into `out`.
    pub fn query(&self, range: &Rect, out: &mut Vec<(Vec2, Entity)>) {
        if !self.bounds.intersects(range) {
            return;
        }
        for &(p, e) in &self.points {
            if range.contains(p) {
                out.push((p, e));
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query(range, out);
            }
        }
    }

    /// Convenience wrapper returning a fresh Vec.
    pub fn query_collect(&self, range: &Rect) -> Vec<(Vec2, Entity)> {
        let mut out = Vec::new();
        self.query(range, &mut out);
        out
    }

    /// Nearest entity to `from` within `radius`, by squared distance over
    /// the bounded query result. Never a full unindexed scan.
    pub fn nearest(&self, from: Vec2, radius: f32) -> Option<(Entity, Vec2)> {
        let range = Rect::centered(from, radius, radius);
        let mut best: Option<(Entity, Vec2)> = None;
        let mut best_d = radius * radius;
        for (p, e) in self.query_collect(&range) {
            let d = from.distance_squared(p);
            if d < best_d {
                best_d = d;
                best = Some((e, p));
            }
        }
        best
    }

    fn subdivide(&mut self) {
        let Rect { x, y, w, h } = self.bounds;
        let hw = w * 0.5;
        let hh = h * 0.5;
        self.children = Some(Box::new([
            Quadtree::new(Rect::new(x, y, hw, hh)),
            Quadtree::new(Rect::new(x + hw, y, hw, hh)),
            Quadtree::new(Rect::new(x, y + hh, hw, hh)),
            Quadtree::new(Rect::new(x + hw, y + hh, hw, hh)),
        ]));
    }
}
