//! Incremental uniform sampler over an integer domain.
//!
//! [`DomainSampler`] partitions `{0, …, max − 1}` into a selected prefix and
//! an unselected suffix of a conceptual Fisher–Yates permutation without
//! materialising it. Only positions whose content differs from their own
//! index are stored, as disjoint transpositions that each straddle the
//! border, so memory stays proportional to the number of displaced elements.

use std::collections::HashMap;

use crate::{
    error::{GraphError, Result},
    random::RandomSource,
};

/// Uniform sampler of selected and unselected elements of `[0, max)`.
///
/// # Examples
/// ```
/// use ldcr_core::{DomainSampler, SeededRandom};
///
/// let mut sampler = DomainSampler::new(4);
/// sampler.select(2)?;
/// assert!(sampler.contains(2));
/// let mut random = SeededRandom::new(9);
/// let drawn = sampler.select_random(&mut random)?;
/// assert_ne!(drawn, 2);
/// assert_eq!(sampler.len(), 2);
/// # Ok::<(), ldcr_core::GraphError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct DomainSampler {
    border: u64,
    max: u64,
    swaps: HashMap<u64, u64>,
}

impl DomainSampler {
    /// Creates a sampler over `[0, max)` with nothing selected.
    #[must_use]
    pub fn new(max: u64) -> Self {
        Self {
            border: 0,
            max,
            swaps: HashMap::new(),
        }
    }

    /// Returns the number of selected elements.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.border
    }

    /// Returns the exclusive upper bound of the domain.
    #[must_use]
    pub const fn max(&self) -> u64 {
        self.max
    }

    /// Returns `true` when no element is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.border == 0
    }

    /// Returns `true` when every element is selected.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.border == self.max
    }

    /// Returns whether `element` is currently selected.
    #[must_use]
    pub fn contains(&self, element: u64) -> bool {
        if element >= self.max {
            return false;
        }
        let displaced = self.swaps.contains_key(&element);
        if element < self.border {
            !displaced
        } else {
            displaced
        }
    }

    /// Marks `element` as selected.
    ///
    /// # Errors
    /// Returns [`GraphError::ElementOutOfDomain`] when `element >= max` and
    /// [`GraphError::ElementAlreadySelected`] when it is already selected.
    pub fn select(&mut self, element: u64) -> Result<()> {
        self.ensure_in_domain(element)?;
        if self.contains(element) {
            return Err(GraphError::ElementAlreadySelected { element });
        }
        let position = self.position_of(element);
        self.select_at(position);
        Ok(())
    }

    /// Selects a uniformly drawn unselected element and returns it.
    ///
    /// # Errors
    /// Returns [`GraphError::SamplerFull`] when every element is selected.
    pub fn select_random(&mut self, random: &mut impl RandomSource) -> Result<u64> {
        if self.is_full() {
            return Err(GraphError::SamplerFull);
        }
        let position = self.border + random.next_u64_below(self.max - self.border);
        Ok(self.select_at(position))
    }

    /// Marks `element` as unselected.
    ///
    /// # Errors
    /// Returns [`GraphError::ElementNotSelected`] when `element` is not
    /// currently selected.
    pub fn delete(&mut self, element: u64) -> Result<()> {
        if !self.contains(element) {
            return Err(GraphError::ElementNotSelected { element });
        }
        let position = self.position_of(element);
        self.delete_at(position);
        Ok(())
    }

    /// Unselects a uniformly drawn selected element and returns it.
    ///
    /// # Errors
    /// Returns [`GraphError::SamplerEmpty`] when nothing is selected.
    pub fn delete_random(&mut self, random: &mut impl RandomSource) -> Result<u64> {
        if self.is_empty() {
            return Err(GraphError::SamplerEmpty);
        }
        let position = random.next_u64_below(self.border);
        Ok(self.delete_at(position))
    }

    /// Peeks at a uniformly drawn unselected element without selecting it.
    ///
    /// Returns `None` when every element is selected.
    pub fn propose_for_selection(&self, random: &mut impl RandomSource) -> Option<u64> {
        if self.is_full() {
            return None;
        }
        let position = self.border + random.next_u64_below(self.max - self.border);
        Some(self.element_at(position))
    }

    /// Peeks at a uniformly drawn selected element without unselecting it.
    ///
    /// Returns `None` when nothing is selected.
    pub fn propose_for_deletion(&self, random: &mut impl RandomSource) -> Option<u64> {
        if self.is_empty() {
            return None;
        }
        Some(self.element_at(random.next_u64_below(self.border)))
    }

    /// Changes the domain to `[0, size)`.
    ///
    /// Shrinking first unselects every selected element at or above `size`.
    ///
    /// # Errors
    /// Returns [`GraphError::ElementNotSelected`] or
    /// [`GraphError::InvariantViolation`] when the permutation and the
    /// selection border disagree, so that a displaced element cannot be
    /// unselected or the remaining selection does not fit the new domain.
    pub fn resize(&mut self, size: u64) -> Result<()> {
        for element in size..self.max {
            if self.contains(element) {
                self.delete(element)?;
            }
        }
        self.fast_resize(size)
    }

    /// Changes the domain to `[0, size)` without clearing displaced elements.
    ///
    /// The caller must already have unselected every element at or above
    /// `size`.
    ///
    /// # Errors
    /// Returns [`GraphError::InvariantViolation`] when more elements are
    /// selected than the new domain can hold.
    pub fn fast_resize(&mut self, size: u64) -> Result<()> {
        if size < self.border {
            return Err(GraphError::invariant(format!(
                "cannot shrink sampler to {size} with {} selected elements",
                self.border
            )));
        }
        self.max = size;
        Ok(())
    }

    /// Unselects every element while keeping the domain size.
    pub fn clear(&mut self) {
        self.swaps.clear();
        self.border = 0;
    }

    /// Returns the selected elements in permutation order.
    #[must_use]
    pub fn selected_elements(&self) -> Vec<u64> {
        (0..self.border).map(|position| self.element_at(position)).collect()
    }

    /// Returns the unselected elements in permutation order.
    #[must_use]
    pub fn unselected_elements(&self) -> Vec<u64> {
        (self.border..self.max)
            .map(|position| self.element_at(position))
            .collect()
    }

    fn ensure_in_domain(&self, element: u64) -> Result<()> {
        if element >= self.max {
            return Err(GraphError::ElementOutOfDomain {
                element,
                max: self.max,
            });
        }
        Ok(())
    }

    fn element_at(&self, position: u64) -> u64 {
        self.swaps.get(&position).copied().unwrap_or(position)
    }

    // Transpositions are involutions, so the same lookup also maps an element
    // to the position holding it.
    fn position_of(&self, element: u64) -> u64 {
        self.element_at(element)
    }

    fn link(&mut self, first: u64, second: u64) {
        self.swaps.insert(first, second);
        self.swaps.insert(second, first);
    }

    fn select_at(&mut self, position: u64) -> u64 {
        let border = self.border;
        let border_element = self.element_at(border);
        let drawn = self.element_at(position);
        if position == border {
            if border_element != border {
                self.swaps.remove(&border_element);
                self.swaps.remove(&border);
            }
        } else {
            self.link(position, border_element);
            if border_element != border {
                self.swaps.remove(&border);
            }
            if drawn != position {
                self.swaps.remove(&drawn);
            }
        }
        self.border += 1;
        drawn
    }

    fn delete_at(&mut self, position: u64) -> u64 {
        let last = self.border - 1;
        let last_element = self.element_at(last);
        let drawn = self.element_at(position);
        if position == last {
            if last_element != last {
                self.swaps.remove(&last_element);
                self.swaps.remove(&last);
            }
        } else {
            self.link(last_element, position);
            if last_element != last {
                self.swaps.remove(&last);
            }
            if drawn != position {
                self.swaps.remove(&drawn);
            }
        }
        self.border -= 1;
        drawn
    }
}

#[cfg(test)]
mod tests;
