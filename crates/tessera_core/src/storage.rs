//! # Component Storage
//!
//! Dense, typed component storage built on a [`SparseSet`].
//!
//! The storage uses a parallel array strategy:
//! - `set.dense[i]` is the entity owning `values[i]`
//! - Lookup is O(1) through the sparse set
//! - Iteration walks two contiguous arrays
//!
//! [`ErasedStorage`] is the non-generic face the registry keeps for every
//! storage, whatever its component type.

use std::any::{self, Any};
use std::iter::Zip;
use std::slice;

use super::entity::{BasicEntity, EntityRepr};
use super::sparse_set::SparseSet;

/// Marker trait for ECS components.
///
/// Any `'static` type is a component; there is nothing to register.
///
/// # Example
///
/// ```rust
/// use tessera_core::Registry;
///
/// struct Health(u32);
///
/// let mut registry = Registry::new();
/// let entity = registry.create_entity();
/// registry.add_component(entity, Health(10)).unwrap();
/// ```
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Storage for a single component type.
///
/// # Type Parameters
///
/// * `T` - The component type to store
/// * `R` - The entity representation
///
/// # Example
///
/// ```rust
/// use tessera_core::{Entity, Storage};
///
/// let mut storage: Storage<f32> = Storage::new();
/// let entity = Entity::new(0, 0);
/// storage.add(entity, 1.5);
/// storage.add(entity, 2.5); // overwrites
/// assert_eq!(storage.find(entity), Some(&2.5));
/// assert_eq!(storage.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Storage<T, R: EntityRepr = u32> {
    /// Owning entities, index-parallel with `values`.
    set: SparseSet<R>,
    /// The dense array of components.
    values: Vec<T>,
}

impl<T, R: EntityRepr> Storage<T, R> {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            set: SparseSet::new(),
            values: Vec::new(),
        }
    }

    /// Creates an empty storage with room for `capacity` components.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            set: SparseSet::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Attaches a component to an entity.
    ///
    /// If the entity already has one, it is **overwritten** in place; a
    /// storage never holds two components for the same entity.
    ///
    /// # Returns
    ///
    /// Mutable reference to the stored component.
    pub fn add(&mut self, entity: BasicEntity<R>, value: T) -> &mut T {
        self.add_with(entity, || value)
    }

    /// Attaches a component built by `make`. Same overwrite rule as [`Storage::add`].
    pub fn add_with<F>(&mut self, entity: BasicEntity<R>, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let position = match self.set.index(entity) {
            Some(position) => {
                self.values[position] = make();
                position
            }
            None => {
                let position = self.set.emplace(entity);
                self.values.push(make());
                position
            }
        };
        &mut self.values[position]
    }

    /// Returns the dense position of an entity's component.
    #[inline]
    #[must_use]
    pub fn position(&self, entity: BasicEntity<R>) -> Option<usize> {
        self.set.index(entity)
    }

    /// Gets the component of an entity.
    #[inline]
    #[must_use]
    pub fn find(&self, entity: BasicEntity<R>) -> Option<&T> {
        let position = self.set.index(entity)?;
        self.values.get(position)
    }

    /// Gets the component of an entity mutably.
    #[inline]
    pub fn find_mut(&mut self, entity: BasicEntity<R>) -> Option<&mut T> {
        let position = self.set.index(entity)?;
        self.values.get_mut(position)
    }

    /// Detaches and returns an entity's component.
    ///
    /// The last component moves into the vacated slot, mirroring the
    /// swap-and-pop of the entity set.
    pub fn remove(&mut self, entity: BasicEntity<R>) -> Option<T> {
        let position = self.set.swap_and_pop(entity)?;
        Some(self.values.swap_remove(position))
    }

    /// Checks if an entity has a component here.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: BasicEntity<R>) -> bool {
        self.set.contains(entity)
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks if the storage is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Removes every component.
    pub fn clear(&mut self) {
        self.set.clear();
        self.values.clear();
    }

    /// Returns the underlying entity set.
    #[inline]
    #[must_use]
    pub fn as_set(&self) -> &SparseSet<R> {
        &self.set
    }

    /// Returns the owning entities, in storage order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[BasicEntity<R>] {
        self.set.as_slice()
    }

    /// Returns the components, in storage order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Returns the components mutably, in storage order.
    ///
    /// Useful for batch processing.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Iterates over `(entity, component)` pairs.
    #[inline]
    pub fn iter(&self) -> Zip<slice::Iter<'_, BasicEntity<R>>, slice::Iter<'_, T>> {
        self.set.iter().zip(self.values.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs.
    #[inline]
    pub fn iter_mut(&mut self) -> Zip<slice::Iter<'_, BasicEntity<R>>, slice::IterMut<'_, T>> {
        self.set.iter().zip(self.values.iter_mut())
    }
}

impl<T, R: EntityRepr> Default for Storage<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased storage interface.
///
/// The registry holds every storage behind this trait and recovers the
/// concrete `Storage<T, R>` with a checked downcast keyed by `T`'s `TypeId`.
pub trait ErasedStorage<R: EntityRepr>: Any {
    /// Detaches whatever component the entity has here.
    ///
    /// Returns `true` if there was one.
    fn remove_entity(&mut self, entity: BasicEntity<R>) -> bool;

    /// Removes every component.
    fn clear(&mut self);

    /// Checks if an entity has a component here.
    fn contains(&self, entity: BasicEntity<R>) -> bool;

    /// Returns the number of stored components.
    fn len(&self) -> usize;

    /// Checks if the storage is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the component type name (for diagnostics).
    fn component_name(&self) -> &'static str;

    /// Upcasts for downcasting to the concrete storage.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts for downcasting to the concrete storage.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component, R: EntityRepr> ErasedStorage<R> for Storage<T, R> {
    fn remove_entity(&mut self, entity: BasicEntity<R>) -> bool {
        self.remove(entity).is_some()
    }

    fn clear(&mut self) {
        Storage::clear(self);
    }

    fn contains(&self, entity: BasicEntity<R>) -> bool {
        Storage::contains(self, entity)
    }

    fn len(&self) -> usize {
        Storage::len(self)
    }

    fn component_name(&self) -> &'static str {
        any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    #[derive(Clone, Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    fn e(id: u64) -> Entity {
        Entity::new(id, 0)
    }

    fn assert_parallel(storage: &Storage<u64>) {
        for (entity, value) in storage.iter() {
            assert_eq!(entity.id(), *value);
            assert_eq!(storage.find(*entity), Some(value));
        }
    }

    #[test]
    fn test_add_find() {
        let mut storage: Storage<Position> = Storage::new();
        let stored = storage.add(e(4), Position { x: 1.0, y: 2.0 });
        stored.x = 3.0;

        assert_eq!(storage.find(e(4)), Some(&Position { x: 3.0, y: 2.0 }));
        assert_eq!(storage.find(e(5)), None);
        assert_eq!(storage.position(e(4)), Some(0));
    }

    #[test]
    fn test_add_overwrites() {
        let mut storage: Storage<u32> = Storage::new();
        storage.add(e(1), 10);
        storage.add(e(1), 20);

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.find(e(1)), Some(&20));
    }

    #[test]
    fn test_add_with_is_lazy_on_insert_only() {
        let mut storage: Storage<String> = Storage::new();
        storage.add_with(e(0), || "first".to_owned());
        storage.add_with(e(0), || "second".to_owned());
        assert_eq!(storage.find(e(0)).map(String::as_str), Some("second"));
    }

    #[test]
    fn test_remove_keeps_arrays_parallel() {
        let mut storage: Storage<u64> = Storage::new();
        for id in 0..6 {
            storage.add(e(id), id);
        }

        assert_eq!(storage.remove(e(2)), Some(2));
        assert_eq!(storage.remove(e(0)), Some(0));
        assert_eq!(storage.remove(e(0)), None);

        assert_eq!(storage.len(), 4);
        assert_eq!(storage.entities().len(), storage.values().len());
        assert_parallel(&storage);
    }

    #[test]
    fn test_find_mut_and_values_mut() {
        let mut storage: Storage<u64> = Storage::new();
        storage.add(e(1), 1);
        storage.add(e(2), 2);

        if let Some(value) = storage.find_mut(e(2)) {
            *value = 20;
        }
        for value in storage.values_mut() {
            *value += 1;
        }
        assert_eq!(storage.values(), &[2, 21]);

        for (_, value) in storage.iter_mut() {
            *value = 0;
        }
        assert!(storage.values().iter().all(|v| *v == 0));
    }

    #[test]
    fn test_clear() {
        let mut storage: Storage<u8> = Storage::with_capacity(8);
        storage.add(e(1), 1);
        storage.clear();
        assert!(storage.is_empty());
        assert!(!storage.contains(e(1)));
        assert_eq!(storage.as_set().page_count(), 0);
    }

    #[test]
    fn test_erased_interface() {
        let mut storage: Storage<Position> = Storage::new();
        storage.add(e(3), Position { x: 0.0, y: 0.0 });

        let erased: &mut dyn ErasedStorage<u32> = &mut storage;
        assert_eq!(erased.len(), 1);
        assert!(erased.contains(e(3)));
        assert!(erased.component_name().ends_with("Position"));
        assert!(erased.as_any().downcast_ref::<Storage<Position>>().is_some());
        assert!(erased.as_any().downcast_ref::<Storage<u32>>().is_none());

        assert!(erased.remove_entity(e(3)));
        assert!(!erased.remove_entity(e(3)));
        assert!(erased.is_empty());
    }
}
