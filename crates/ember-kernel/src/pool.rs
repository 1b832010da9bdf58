//! Particle storage with slot recycling.
//!
//! Particles live in a single arena and never move. The alive list holds
//! slot indices in render order; the dead list is a free stack. Every slot
//! is in exactly one of the two lists.

use std::collections::VecDeque;

use crate::particle::Particle;

/// Arena of alive and recycled particles.
#[derive(Debug, Default, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    alive: VecDeque<usize>,
    dead: Vec<usize>,
}

impl ParticlePool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of alive particles.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Number of recycled particles waiting for reuse.
    #[must_use]
    pub fn dead_count(&self) -> usize {
        self.dead.len()
    }

    /// Alive plus dead.
    #[must_use]
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    /// Adds `count` fresh particles straight to the dead list.
    pub fn reserve(&mut self, count: usize) {
        self.slots.reserve(count);
        self.dead.reserve(count);
        for _ in 0..count {
            self.dead.push(self.slots.len());
            self.slots.push(Particle::default());
        }
    }

    /// Takes a slot from the dead list, or grows the arena. The slot joins
    /// the alive list at the back (drawn last) or the front.
    pub fn acquire(&mut self, on_top: bool) -> usize {
        let index = self.dead.pop().unwrap_or_else(|| {
            self.slots.push(Particle::default());
            self.slots.len() - 1
        });
        if on_top {
            self.alive.push_back(index);
        } else {
            self.alive.push_front(index);
        }
        index
    }

    /// Particle in a slot.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.slots.get(index)
    }

    /// Mutable particle in a slot.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.slots.get_mut(index)
    }

    /// Alive particles in render order.
    pub fn alive(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.alive.iter().map(move |&index| &self.slots[index])
    }

    /// Recycled particles.
    pub fn dead(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.dead.iter().map(move |&index| &self.slots[index])
    }

    /// Runs `f` on every alive particle in order and moves those for which
    /// it returns `true` to the dead list, preserving the order of the rest.
    /// `f` sees a particle's slot index alongside the particle.
    pub fn retain_alive<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, &mut Particle) -> bool,
    {
        let slots = &mut self.slots;
        let dead = &mut self.dead;
        self.alive.retain(|&index| {
            let died = f(index, &mut slots[index]);
            if died {
                dead.push(index);
            }
            !died
        });
    }

    /// Moves every alive particle to the dead list.
    pub fn kill_all(&mut self) {
        self.dead.extend(self.alive.drain(..));
    }

    /// Stable-sorts the alive list by `key`.
    pub fn sort_alive_by<K, F>(&mut self, mut key: F)
    where
        F: FnMut(&Particle) -> K,
        K: PartialOrd,
    {
        let slots = &self.slots;
        self.alive.make_contiguous().sort_by(|&a, &b| {
            key(&slots[a])
                .partial_cmp(&key(&slots[b]))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Drops every particle.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.alive.clear();
        self.dead.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_common::Vec2;
    use proptest::prelude::*;

    #[test]
    fn test_acquire_reuses_dead_slots() {
        let mut pool = ParticlePool::new();
        pool.reserve(2);
        assert_eq!(pool.dead_count(), 2);
        let a = pool.acquire(true);
        assert_eq!(pool.total(), 2);
        pool.acquire(true);
        pool.acquire(true);
        assert_eq!(pool.total(), 3);
        assert_eq!(pool.alive_count(), 3);
        pool.retain_alive(|index, _| index == a);
        assert_eq!(pool.alive_count(), 2);
        assert_eq!(pool.acquire(true), a);
    }

    #[test]
    fn test_insertion_order() {
        let mut pool = ParticlePool::new();
        for i in 0..3 {
            let index = pool.acquire(i != 2);
            pool.get_mut(index).unwrap().position.x = i as f32;
        }
        let order: Vec<f32> = pool.alive().map(|p| p.position.x).collect();
        assert_eq!(order, vec![2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_retain_preserves_order() {
        let mut pool = ParticlePool::new();
        for i in 0..6 {
            let index = pool.acquire(true);
            pool.get_mut(index).unwrap().position.x = i as f32;
        }
        pool.retain_alive(|_, p| p.position.x as i32 % 2 == 0);
        let order: Vec<f32> = pool.alive().map(|p| p.position.x).collect();
        assert_eq!(order, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut pool = ParticlePool::new();
        for (x, y) in [(0.0, 5.0), (1.0, 1.0), (2.0, 5.0), (3.0, 0.0)] {
            let index = pool.acquire(true);
            pool.get_mut(index).unwrap().position = Vec2::new(x, y);
        }
        pool.sort_alive_by(|p| p.position.y);
        let order: Vec<f32> = pool.alive().map(|p| p.position.x).collect();
        assert_eq!(order, vec![3.0, 1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_kill_all() {
        let mut pool = ParticlePool::new();
        pool.acquire(true);
        pool.acquire(false);
        pool.kill_all();
        assert_eq!(pool.alive_count(), 0);
        assert_eq!(pool.dead_count(), 2);
    }

    proptest! {
        #[test]
        fn test_slots_always_accounted_for(ops in prop::collection::vec(0u8..4, 1..200)) {
            let mut pool = ParticlePool::new();
            for (i, op) in ops.iter().enumerate() {
                match op {
                    0 => { pool.acquire(true); },
                    1 => { pool.acquire(false); },
                    2 => pool.retain_alive(|index, _| (index + i) % 3 == 0),
                    _ => pool.reserve(1),
                }
                prop_assert_eq!(pool.alive_count() + pool.dead_count(), pool.total());
            }
        }
    }
}
