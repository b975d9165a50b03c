//! # Sparse Set
//!
//! Entity set with O(1) insertion, membership test and removal.
//!
//! The set keeps two arrays:
//! - `sparse`: entity id -> position in `dense`, split into lazily allocated
//!   pages so an id space of a million entries costs nothing until used
//! - `dense`: the contained entities, packed for cache-friendly iteration
//!
//! Removal is swap-and-pop, so iteration order is not preserved.

use std::slice;

use super::entity::{BasicEntity, EntityRepr};

/// Number of sparse slots per page. Must be a power of two.
pub const PAGE_SIZE: usize = 4096;

/// Sparse slot value meaning "no entry".
const TOMBSTONE: usize = usize::MAX;

const _: () = assert!(PAGE_SIZE.is_power_of_two());

/// Paged sparse set of entities.
///
/// # Invariant
///
/// For every contained entity `e`: `dense[sparse[id(e)]] == e`.
///
/// # Example
///
/// ```rust
/// use tessera_core::{Entity, SparseSet};
///
/// let set = SparseSet::new();
/// let entity = Entity::new(7, 0);
/// assert!(!set.contains(entity));
/// ```
#[derive(Clone, Debug)]
pub struct SparseSet<R: EntityRepr = u32> {
    /// Pages of dense positions, indexed by `id / PAGE_SIZE`.
    sparse: Vec<Option<Box<[usize]>>>,
    /// Packed entities.
    dense: Vec<BasicEntity<R>>,
}

impl<R: EntityRepr> SparseSet<R> {
    /// Creates an empty set. No page is allocated.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
        }
    }

    /// Creates an empty set with room for `capacity` dense entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    fn page_of(entity: BasicEntity<R>) -> (usize, usize) {
        let index = entity.index();
        (index / PAGE_SIZE, index & (PAGE_SIZE - 1))
    }

    #[inline]
    fn slot(&self, entity: BasicEntity<R>) -> Option<usize> {
        let (page, offset) = Self::page_of(entity);
        match self.sparse.get(page) {
            Some(Some(slots)) if slots[offset] != TOMBSTONE => Some(slots[offset]),
            _ => None,
        }
    }

    fn slot_mut(&mut self, entity: BasicEntity<R>) -> &mut usize {
        let (page, offset) = Self::page_of(entity);
        if page >= self.sparse.len() {
            self.sparse.resize_with(page + 1, || None);
        }
        let slots = self.sparse[page].get_or_insert_with(|| vec![TOMBSTONE; PAGE_SIZE].into_boxed_slice());
        &mut slots[offset]
    }

    /// Checks if the set contains this exact entity (id and version).
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: BasicEntity<R>) -> bool {
        self.index(entity).is_some()
    }

    /// Returns the dense position of an entity, if contained.
    #[inline]
    #[must_use]
    pub fn index(&self, entity: BasicEntity<R>) -> Option<usize> {
        let position = self.slot(entity)?;
        (self.dense.get(position) == Some(&entity)).then_some(position)
    }

    /// Appends an entity and records its position.
    ///
    /// The caller must check that the entity is absent first.
    pub(crate) fn emplace(&mut self, entity: BasicEntity<R>) -> usize {
        debug_assert!(!self.contains(entity), "{entity:?} is already in the set");
        let position = self.dense.len();
        *self.slot_mut(entity) = position;
        self.dense.push(entity);
        position
    }

    /// Inserts an entity.
    ///
    /// An older version of the same id is replaced in place.
    ///
    /// # Returns
    ///
    /// `false` if this exact entity was already contained.
    pub fn insert(&mut self, entity: BasicEntity<R>) -> bool {
        if let Some(position) = self.slot(entity) {
            if let Some(current) = self.dense.get_mut(position) {
                if current.id() == entity.id() {
                    let inserted = *current != entity;
                    *current = entity;
                    return inserted;
                }
            }
        }
        self.emplace(entity);
        true
    }

    /// Removes an entity with swap-and-pop.
    ///
    /// Returns the position the entity occupied. The element that was last
    /// now sits at that position (unless the removed entity was the last).
    pub(crate) fn swap_and_pop(&mut self, entity: BasicEntity<R>) -> Option<usize> {
        let position = self.index(entity)?;
        self.dense.swap_remove(position);
        if let Some(&moved) = self.dense.get(position) {
            *self.slot_mut(moved) = position;
        }
        *self.slot_mut(entity) = TOMBSTONE;
        Some(position)
    }

    /// Removes an entity. Removing an absent entity does nothing.
    ///
    /// # Returns
    ///
    /// `true` if the entity was contained.
    pub fn remove(&mut self, entity: BasicEntity<R>) -> bool {
        self.swap_and_pop(entity).is_some()
    }

    /// Removes every entity and releases all sparse pages.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.sparse.clear();
    }

    /// Returns the number of contained entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Checks if the set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Returns the packed entities. Order is unspecified.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[BasicEntity<R>] {
        &self.dense
    }

    /// Iterates over the packed entities.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, BasicEntity<R>> {
        self.dense.iter()
    }

    /// Returns the number of allocated sparse pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.sparse.iter().filter(|page| page.is_some()).count()
    }
}

impl<R: EntityRepr> Default for SparseSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, R: EntityRepr> IntoIterator for &'a SparseSet<R> {
    type Item = &'a BasicEntity<R>;
    type IntoIter = slice::Iter<'a, BasicEntity<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
