//! Object pools for high-churn transient entities.
//!
//! Arena of slots plus a free-list of indices: `acquire` pops a free index
//! (or grows the arena) and resets the slot before handing it out;
//! `release` resets again and pushes the index back. Double-release is
//! detected at the data-structure level and ignored, so misuse is a safe
//! no-op rather than state corruption.

use std::collections::VecDeque;

/// A poolable entity kind. `reset` must clear every transient field so a
/// reused slot carries no prior-owner state (velocity, damage, hit-sets).
pub trait Poolable: Default {
    fn reset(&mut self);
}

/// Unbounded arena/free-list pool.
#[derive(Debug, Default)]
pub struct Pool<T: Poolable> {
    slots: Vec<T>,
    active: Vec<bool>,
    free: Vec<usize>,
}

impl<T: Poolable> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            active: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Pool with `n` pre-constructed inactive slots.
    pub fn with_capacity(n: usize) -> Self {
        let mut pool = Self {
            slots: Vec::with_capacity(n),
            active: vec![false; n],
            free: (0..n).rev().collect(),
        };
        pool.slots.resize_with(n, T::default);
        pool
    }

    /// Acquire a slot: reuse a free one or grow the arena. The slot is
    /// fully reset before `init` runs.
    pub fn acquire(&mut self, init: impl FnOnce(&mut T)) -> usize {
        let idx = match self.free.pop() {
            Some(idx) => idx,
            None => {
                self.slots.push(T::default());
                self.active.push(false);
                self.slots.len() - 1
            }
        };
        self.slots[idx].reset();
        self.active[idx] = true;
        init(&mut self.slots[idx]);
        idx
    }

    /// Release a slot back to the free list. Releasing an inactive or
    /// out-of-range index is a no-op.
    pub fn release(&mut self, idx: usize) {
        if idx < self.slots.len() && self.active[idx] {
            self.active[idx] = false;
            self.slots[idx].reset();
            self.free.push(idx);
        }
    }

    pub fn is_active(&self, idx: usize) -> bool {
        idx < self.active.len() && self.active[idx]
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Total slots ever constructed (active + free).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.is_active(idx).then(|| &self.slots[idx])
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        if self.is_active(idx) {
            Some(&mut self.slots[idx])
        } else {
            None
        }
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, _)| self.active[*i])
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        let active = &self.active;
        self.slots
            .iter_mut()
            .enumerate()
            .filter(move |(i, _)| active[*i])
    }

    /// Release every active slot.
    pub fn clear(&mut self) {
        for idx in 0..self.slots.len() {
            self.release(idx);
        }
    }

    /// Indices of all active slots. Handy when a pass needs to release
    /// slots while walking them.
    pub fn active_indices(&self) -> Vec<usize> {
        (0..self.slots.len()).filter(|&i| self.active[i]).collect()
    }
}

/// Pool with a hard cap on concurrently active slots. When the cap is
/// reached, the oldest-inserted active slot is force-released before the
/// new acquire (insertion-order eviction, not time-since-touch).
#[derive(Debug, Default)]
pub struct BoundedPool<T: Poolable> {
    pool: Pool<T>,
    order: VecDeque<usize>,
    cap: usize,
}

impl<T: Poolable> BoundedPool<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            pool: Pool::with_capacity(cap),
            order: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn acquire(&mut self, init: impl FnOnce(&mut T)) -> usize {
        if self.pool.active_count() >= self.cap {
            if let Some(oldest) = self.order.pop_front() {
                self.pool.release(oldest);
            }
        }
        let idx = self.pool.acquire(init);
        self.order.push_back(idx);
        idx
    }

    pub fn release(&mut self, idx: usize) {
        if self.pool.is_active(idx) {
            self.pool.release(idx);
            self.order.retain(|&i| i != idx);
        }
    }

    pub fn is_active(&self, idx: usize) -> bool {
        self.pool.is_active(idx)
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.pool.get(idx)
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &T)> {
        self.pool.iter_active()
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.pool.iter_active_mut()
    }

    pub fn active_indices(&self) -> Vec<usize> {
        self.pool.active_indices()
    }

    pub fn clear(&mut self) {
        self.pool.clear();
        self.order.clear();
    }
}
