//! Weighted random selection over a dynamic set.
//!
//! Entries live in a dense array that doubles as an implicit complete binary
//! tree (`left = 2i + 1`, `right = 2i + 2`). Every slot caches the summed
//! weight of its subtree, so selection, insertion, removal, and reweighting
//! all cost `O(log n)`.

use crate::{
    error::{GraphError, Result},
    random::RandomSource,
};

/// Stable handle to an entry of a [`SelectionTree`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TreeHandle(usize);

impl TreeHandle {
    /// Returns the raw handle value.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    item: T,
    handle: usize,
    weight: f64,
    accumulated: f64,
}

/// Weighted sampler whose entries may be inserted, removed, and reweighted.
///
/// # Examples
/// ```
/// use ldcr_core::{SeededRandom, SelectionTree};
///
/// let mut tree = SelectionTree::new();
/// let light = tree.insert('a', 0.0);
/// tree.insert('b', 2.0);
/// let mut random = SeededRandom::new(3);
/// assert_eq!(tree.select(&mut random)?, 'b');
/// tree.set_weight(light, 1.0)?;
/// assert!((tree.total_weight() - 3.0).abs() < 1e-12);
/// # Ok::<(), ldcr_core::GraphError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SelectionTree<T> {
    slots: Vec<Slot<T>>,
    positions: Vec<Option<usize>>,
    free_handles: Vec<usize>,
}

impl<T> Default for SelectionTree<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            positions: Vec::new(),
            free_handles: Vec::new(),
        }
    }
}

impl<T: Copy> SelectionTree<T> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when the tree holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the summed weight of every entry, or zero for an empty tree.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.accumulated(0)
    }

    /// Inserts `item` with `weight` and returns its handle.
    pub fn insert(&mut self, item: T, weight: f64) -> TreeHandle {
        let handle = self.free_handles.pop().unwrap_or(self.positions.len());
        let position = self.slots.len();
        self.slots.push(Slot {
            item,
            handle,
            weight,
            accumulated: weight,
        });
        if let Some(entry) = self.positions.get_mut(handle) {
            *entry = Some(position);
        } else {
            self.positions.push(Some(position));
        }
        self.update_path(position);
        TreeHandle(handle)
    }

    /// Removes the entry behind `handle`, returning its item.
    ///
    /// The last slot moves into the vacated position, after which the cached
    /// sums along both affected paths are recomputed.
    ///
    /// # Errors
    /// Returns [`GraphError::StaleHandle`] when `handle` is not live.
    pub fn remove(&mut self, handle: TreeHandle) -> Result<T> {
        let position = self.position(handle)?;
        let last = self.slots.len() - 1;
        let removed = self.slots.swap_remove(position);
        if let Some(entry) = self.positions.get_mut(handle.0) {
            *entry = None;
        }
        self.free_handles.push(handle.0);

        if position < self.slots.len() {
            if let Some(moved) = self.slots.get(position).map(|slot| slot.handle) {
                if let Some(entry) = self.positions.get_mut(moved) {
                    *entry = Some(position);
                }
            }
            self.update_path(position);
        }
        if last > 0 {
            self.update_path(parent(last));
        }
        Ok(removed.item)
    }

    /// Replaces the weight of the entry behind `handle`.
    ///
    /// # Errors
    /// Returns [`GraphError::StaleHandle`] when `handle` is not live.
    pub fn set_weight(&mut self, handle: TreeHandle, weight: f64) -> Result<()> {
        let position = self.position(handle)?;
        if let Some(slot) = self.slots.get_mut(position) {
            slot.weight = weight;
        }
        self.update_path(position);
        Ok(())
    }

    /// Returns the weight currently stored for `handle`.
    ///
    /// # Errors
    /// Returns [`GraphError::StaleHandle`] when `handle` is not live.
    pub fn weight(&self, handle: TreeHandle) -> Result<f64> {
        let position = self.position(handle)?;
        self.slots
            .get(position)
            .map(|slot| slot.weight)
            .ok_or(GraphError::StaleHandle { handle: handle.0 })
    }

    /// Returns the item stored for `handle`.
    ///
    /// # Errors
    /// Returns [`GraphError::StaleHandle`] when `handle` is not live.
    pub fn item(&self, handle: TreeHandle) -> Result<T> {
        let position = self.position(handle)?;
        self.slots
            .get(position)
            .map(|slot| slot.item)
            .ok_or(GraphError::StaleHandle { handle: handle.0 })
    }

    /// Draws an entry with probability proportional to its weight.
    ///
    /// # Errors
    /// Returns [`GraphError::EmptySelection`] when the tree is empty or its
    /// total weight is not positive.
    pub fn select(&self, random: &mut impl RandomSource) -> Result<T> {
        let total = self.total_weight();
        if self.slots.is_empty() || total.is_nan() || total <= 0.0 {
            return Err(GraphError::EmptySelection);
        }
        let mut delta = random.next_f64() * total;
        let mut position = 0;
        loop {
            let left = 2 * position + 1;
            if left >= self.slots.len() {
                break;
            }
            let left_sum = self.accumulated(left);
            if delta < left_sum {
                position = left;
                continue;
            }
            let own = self.slots.get(position).map_or(0.0, |slot| slot.weight);
            let right = left + 1;
            // Rounding can push delta past the final subtree; stay put then.
            if delta < left_sum + own || right >= self.slots.len() {
                break;
            }
            delta -= left_sum + own;
            position = right;
        }
        self.slots
            .get(position)
            .map(|slot| slot.item)
            .ok_or(GraphError::EmptySelection)
    }

    /// Iterates over `(handle, item, weight)` for every live entry.
    pub fn iter(&self) -> impl Iterator<Item = (TreeHandle, T, f64)> + '_ {
        self.slots
            .iter()
            .map(|slot| (TreeHandle(slot.handle), slot.item, slot.weight))
    }

    fn position(&self, handle: TreeHandle) -> Result<usize> {
        self.positions
            .get(handle.0)
            .copied()
            .flatten()
            .ok_or(GraphError::StaleHandle { handle: handle.0 })
    }

    fn accumulated(&self, position: usize) -> f64 {
        self.slots.get(position).map_or(0.0, |slot| slot.accumulated)
    }

    fn update_path(&mut self, mut position: usize) {
        loop {
            let children = self.accumulated(2 * position + 1) + self.accumulated(2 * position + 2);
            if let Some(slot) = self.slots.get_mut(position) {
                slot.accumulated = slot.weight + children;
            }
            if position == 0 {
                break;
            }
            position = parent(position);
        }
    }
}

const fn parent(position: usize) -> usize {
    (position - 1) / 2
}

#[cfg(test)]
mod tests;
