//! # Registry
//!
//! The central container for entities and their component storages.
//!
//! Entities live in a slot table. Destroying an entity bumps the version
//! stored in its slot and pushes the slot on a free list; the next
//! [`BasicRegistry::create_entity`] hands that slot back out with the new
//! version, so every handle to the destroyed entity is stale from then on.
//!
//! Storages are created lazily, one per component type, and kept behind
//! [`ErasedStorage`] in a map keyed by the component's `TypeId`.

use std::any::{self, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::config::RegistryConfig;
use crate::entity::{BasicEntity, EntityRepr};
use crate::error::{EcsError, EcsResult};
use crate::handle::ComponentHandle;
use crate::storage::{Component, ErasedStorage, Storage};
use crate::view::{Query, View};

/// Registry over 32-bit entities.
pub type Registry = BasicRegistry<u32>;

/// Registry over 64-bit entities.
pub type Registry64 = BasicRegistry<u64>;

/// Entity and component container.
///
/// # Example
///
/// ```rust
/// use tessera_core::Registry;
///
/// let mut registry = Registry::new();
/// let entity = registry.create_entity();
/// registry.add_component(entity, 1.5_f32).unwrap();
///
/// assert!(registry.has_component::<f32>(entity));
/// assert!(registry.destroy_entity(entity));
/// assert!(!registry.is_valid(entity));
/// ```
pub struct BasicRegistry<R: EntityRepr = u32> {
    /// Current identifier of every slot.
    entities: Vec<BasicEntity<R>>,
    /// Slot occupancy.
    alive: Vec<bool>,
    /// Freed slots, most recent last.
    free_list: Vec<usize>,
    /// One storage per component type.
    storages: HashMap<TypeId, Box<dyn ErasedStorage<R>>>,
    config: RegistryConfig,
}

impl<R: EntityRepr> BasicRegistry<R> {
    /// Creates an empty registry with default capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    /// Creates an empty registry that reserves memory per `config`.
    #[must_use]
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            entities: Vec::with_capacity(config.entity_capacity),
            alive: Vec::with_capacity(config.entity_capacity),
            free_list: Vec::new(),
            storages: HashMap::new(),
            config: config.clone(),
        }
    }

    /// Returns the configuration the registry was built with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates a new entity.
    ///
    /// Reuses the most recently freed slot if there is one.
    ///
    /// # Returns
    ///
    /// The new entity, or [`BasicEntity::NULL`] if the id space is exhausted.
    pub fn create_entity(&mut self) -> BasicEntity<R> {
        if let Some(index) = self.free_list.pop() {
            self.alive[index] = true;
            let entity = self.entities[index];
            tracing::trace!("recycled entity {entity}");
            return entity;
        }

        let id = self.entities.len() as u64;
        if id >= R::ID_MASK {
            tracing::warn!("entity id space exhausted ({} slots)", R::ID_MASK);
            return BasicEntity::NULL;
        }

        let entity = BasicEntity::new(id, 0);
        self.entities.push(entity);
        self.alive.push(true);
        tracing::trace!("created entity {entity}");
        entity
    }

    /// Destroys an entity and every component attached to it.
    ///
    /// # Returns
    ///
    /// `true` if the entity was valid and is now destroyed.
    pub fn destroy_entity(&mut self, entity: BasicEntity<R>) -> bool {
        if !self.is_valid(entity) {
            tracing::warn!("destroy_entity called with invalid entity {entity}");
            return false;
        }

        let mut removed = 0_usize;
        for storage in self.storages.values_mut() {
            if storage.remove_entity(entity) {
                removed += 1;
            }
        }

        let index = entity.index();
        self.entities[index] = entity.next();
        self.alive[index] = false;
        self.free_list.push(index);

        tracing::debug!("destroyed entity {entity} ({removed} components)");
        true
    }

    /// Checks if an entity handle refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, entity: BasicEntity<R>) -> bool {
        let index = entity.index();
        self.alive.get(index).copied().unwrap_or(false) && self.entities[index] == entity
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.entities.len() - self.free_list.len()
    }

    /// Returns the number of entity slots ever allocated.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entities.len()
    }

    /// Iterates over the live entities in slot order.
    pub fn entities(&self) -> impl Iterator<Item = BasicEntity<R>> + '_ {
        self.entities
            .iter()
            .zip(&self.alive)
            .filter_map(|(&entity, &alive)| alive.then_some(entity))
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches a component to an entity.
    ///
    /// An existing component of the same type is **overwritten**.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] if the entity is not valid.
    pub fn add_component<T: Component>(
        &mut self,
        entity: BasicEntity<R>,
        value: T,
    ) -> EcsResult<&mut T> {
        if !self.is_valid(entity) {
            return Err(EcsError::invalid_entity(entity));
        }
        Ok(self.storage_mut::<T>()?.add(entity, value))
    }

    /// Gets a component that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] for an invalid entity and
    /// [`EcsError::ComponentNotPresent`] if the component is missing.
    pub fn get_component<T: Component>(&self, entity: BasicEntity<R>) -> EcsResult<&T> {
        if !self.is_valid(entity) {
            return Err(EcsError::invalid_entity(entity));
        }
        self.storage::<T>()
            .and_then(|storage| storage.find(entity))
            .ok_or_else(|| EcsError::component_not_present(entity, any::type_name::<T>()))
    }

    /// Gets a component that must be present, mutably.
    ///
    /// # Errors
    ///
    /// Same as [`BasicRegistry::get_component`].
    pub fn get_component_mut<T: Component>(&mut self, entity: BasicEntity<R>) -> EcsResult<&mut T> {
        if !self.is_valid(entity) {
            return Err(EcsError::invalid_entity(entity));
        }
        self.existing_storage_mut::<T>()
            .and_then(|storage| storage.find_mut(entity))
            .ok_or_else(|| EcsError::component_not_present(entity, any::type_name::<T>()))
    }

    /// Gets a component if the entity is valid and has one.
    #[must_use]
    pub fn try_get_component<T: Component>(&self, entity: BasicEntity<R>) -> Option<&T> {
        if !self.is_valid(entity) {
            return None;
        }
        self.storage::<T>()?.find(entity)
    }

    /// Gets a handle to a component; the handle is null if there is none.
    pub fn try_get_component_mut<T: Component>(
        &mut self,
        entity: BasicEntity<R>,
    ) -> ComponentHandle<'_, T> {
        if !self.is_valid(entity) {
            return ComponentHandle::null();
        }
        self.existing_storage_mut::<T>()
            .and_then(|storage| storage.find_mut(entity))
            .into()
    }

    /// Checks if a valid entity has a component.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: BasicEntity<R>) -> bool {
        self.is_valid(entity) && self.storage::<T>().is_some_and(|storage| storage.contains(entity))
    }

    /// Detaches and returns a component. Does nothing if it is absent.
    pub fn remove_component<T: Component>(&mut self, entity: BasicEntity<R>) -> Option<T> {
        if !self.is_valid(entity) {
            return None;
        }
        self.existing_storage_mut::<T>()?.remove(entity)
    }

    // =========================================================================
    // Storages
    // =========================================================================

    /// Returns the storage for `T`, if one was created.
    #[must_use]
    pub fn storage<T: Component>(&self) -> Option<&Storage<T, R>> {
        self.storages
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<Storage<T, R>>()
    }

    /// Returns the storage for `T`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StorageTypeMismatch`] if the map holds a storage of
    /// another type under `T`'s type id.
    pub(crate) fn storage_mut<T: Component>(&mut self) -> EcsResult<&mut Storage<T, R>> {
        let capacity = self.config.storage_capacity;
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                tracing::debug!("created storage for {}", any::type_name::<T>());
                Box::new(Storage::<T, R>::with_capacity(capacity))
            })
            .as_any_mut()
            .downcast_mut::<Storage<T, R>>()
            .ok_or(EcsError::StorageTypeMismatch {
                component: any::type_name::<T>(),
            })
    }

    fn existing_storage_mut<T: Component>(&mut self) -> Option<&mut Storage<T, R>> {
        self.storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<Storage<T, R>>()
    }

    /// Returns the number of component storages created so far.
    #[inline]
    #[must_use]
    pub fn storage_count(&self) -> usize {
        self.storages.len()
    }

    /// Creates a view over every entity that has all components in `Q`.
    ///
    /// Missing storages are created empty, so a view over a type nobody has
    /// used yet is simply empty.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::AliasedComponent`] if `Q` names a type twice.
    pub fn create_view<Q: Query<R>>(&mut self) -> EcsResult<View<'_, Q, R>> {
        let type_ids = Q::type_ids();
        let names = Q::type_names();
        if let Some(repeated) = (1..type_ids.len()).find(|&i| type_ids[..i].contains(&type_ids[i])) {
            return Err(EcsError::AliasedComponent {
                component: names[repeated],
            });
        }

        Q::assure_storages(self)?;

        let mut slots: Vec<Option<&mut Box<dyn ErasedStorage<R>>>> =
            type_ids.iter().map(|_| None).collect();
        for (type_id, storage) in &mut self.storages {
            if let Some(which) = type_ids.iter().position(|id| id == type_id) {
                slots[which] = Some(storage);
            }
        }

        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .and_then(Q::from_erased)
            .map(View::<Q, R>::new)
            .ok_or(EcsError::StorageTypeMismatch {
                component: any::type_name::<Q>(),
            })
    }

    /// Destroys every entity and empties every storage.
    ///
    /// Slots are kept and their versions bumped, so handles issued before the
    /// clear stay invalid.
    pub fn clear(&mut self) {
        for storage in self.storages.values_mut() {
            storage.clear();
        }

        let mut destroyed = 0_usize;
        for (index, alive) in self.alive.iter_mut().enumerate() {
            if *alive {
                *alive = false;
                self.entities[index] = self.entities[index].next();
                self.free_list.push(index);
                destroyed += 1;
            }
        }

        tracing::debug!(
            "cleared registry ({destroyed} entities, {} storages)",
            self.storages.len()
        );
    }
}

impl<R: EntityRepr> Default for BasicRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: EntityRepr> fmt::Debug for BasicRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut storages: Vec<(&'static str, usize)> = self
            .storages
            .values()
            .map(|storage| (storage.component_name(), storage.len()))
            .collect();
        storages.sort_unstable();

        f.debug_struct("BasicRegistry")
            .field("alive", &self.alive_count())
            .field("capacity", &self.capacity())
            .field("storages", &storages)
            .finish()
    }
}
