//! Fixed-capacity slot pool with deferred insertion
//!
//! Additions made during a tick go to a pending list and are installed into
//! the first free slot by [`Pool::promote`] at the end of the tick, so slot
//! indices stay stable while a tick iterates the live slots.

/// Sparse pool of reusable slots. `None` is the empty slot.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Option<T>>,
    pending: Vec<T>,
    capacity: usize,
}

impl<T> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            pending: Vec::new(),
            capacity,
        }
    }

    /// Queue an item for installation at the end of the tick
    pub fn spawn(&mut self, item: T) {
        self.pending.push(item);
    }

    /// Number of items waiting for promotion
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self) -> &[T] {
        &self.pending
    }

    /// Most recently queued item
    pub fn pending_last_mut(&mut self) -> Option<&mut T> {
        self.pending.last_mut()
    }

    /// Install pending items into free slots, appending while under capacity.
    /// Returns the number of items dropped because the pool was full.
    pub fn promote(&mut self) -> usize {
        let mut dropped = 0;
        let mut cursor = 0;
        for item in self.pending.drain(..) {
            while cursor < self.slots.len() && self.slots[cursor].is_some() {
                cursor += 1;
            }
            if cursor < self.slots.len() {
                self.slots[cursor] = Some(item);
            } else if self.slots.len() < self.capacity {
                self.slots.push(Some(item));
            } else {
                dropped += 1;
                continue;
            }
            cursor += 1;
        }
        if dropped > 0 {
            log::debug!("pool full ({}), dropped {} items", self.capacity, dropped);
        }
        dropped
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Total slot count (occupied or not)
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(|s| s.as_mut())
    }

    /// Empty a slot, returning its item
    pub fn clear_slot(&mut self, index: usize) -> Option<T> {
        self.slots.get_mut(index).and_then(|s| s.take())
    }

    /// Empty every slot for which `remove` returns true
    pub fn clear_where(&mut self, mut remove: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(&mut remove) {
                *slot = None;
                removed += 1;
            }
        }
        removed
    }

    /// Empty every slot and the pending list
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.pending.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|s| s.as_mut())
    }

    /// Iterate occupied slots with their indices
    pub fn indexed(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|item| (i, item)))
    }

    /// Indices of occupied slots
    pub fn indices(&self) -> Vec<usize> {
        self.indexed().map(|(i, _)| i).collect()
    }

    /// Mutable access to two distinct slots
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut T, &mut T)> {
        if a == b || a >= self.slots.len() || b >= self.slots.len() {
            return None;
        }
        let (lo, hi, swapped) = if a < b { (a, b, false) } else { (b, a, true) };
        let (left, right) = self.slots.split_at_mut(hi);
        let first = left[lo].as_mut()?;
        let second = right[0].as_mut()?;
        Some(if swapped { (second, first) } else { (first, second) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_is_deferred() {
        let mut pool = Pool::with_capacity(4);
        pool.spawn(1);
        assert!(pool.is_empty());
        assert_eq!(pool.pending_len(), 1);
        pool.promote();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.pending_len(), 0);
    }

    #[test]
    fn test_promote_reuses_first_free_slot() {
        let mut pool = Pool::with_capacity(4);
        for i in 0..3 {
            pool.spawn(i);
        }
        pool.promote();
        pool.clear_slot(1);
        pool.spawn(10);
        pool.promote();
        assert_eq!(pool.get(1), Some(&10));
        assert_eq!(pool.slot_count(), 3);
    }

    #[test]
    fn test_promote_drops_over_capacity() {
        let mut pool = Pool::with_capacity(2);
        for i in 0..5 {
            pool.spawn(i);
        }
        assert_eq!(pool.promote(), 3);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_pair_mut_order() {
        let mut pool = Pool::with_capacity(4);
        pool.spawn('a');
        pool.spawn('b');
        pool.promote();
        let (x, y) = pool.pair_mut(1, 0).unwrap();
        assert_eq!((*x, *y), ('b', 'a'));
        assert!(pool.pair_mut(0, 0).is_none());
    }

    #[test]
    fn test_clear_where() {
        let mut pool = Pool::with_capacity(8);
        for i in 0..6 {
            pool.spawn(i);
        }
        pool.promote();
        assert_eq!(pool.clear_where(|v| v % 2 == 0), 3);
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    }
}
