//! # Views
//!
//! Joint iteration over several component storages.
//!
//! A view borrows one storage per queried component type. At construction it
//! picks the smallest storage as the *driver*; iteration walks the driver's
//! dense entity array and skips every entity that some other storage lacks.
//! With a single component type there is nothing to intersect and iteration
//! is a straight pass over the one storage.
//!
//! ## Invalidation
//!
//! A view holds a mutable borrow of the registry. Creating or destroying
//! entities, or adding and removing components, is therefore impossible while
//! a view is alive; the compiler rejects it instead of the view observing a
//! half-moved storage.

use std::any::{self, TypeId};
use std::iter::{Enumerate, FusedIterator};
use std::slice;

use crate::entity::{BasicEntity, EntityRepr};
use crate::error::EcsResult;
use crate::registry::BasicRegistry;
use crate::sparse_set::SparseSet;
use crate::storage::{Component, ErasedStorage, Storage};

/// A tuple of component types a view can iterate.
///
/// Implemented for tuples of one to eight [`Component`] types: `(A,)`,
/// `(A, B)`, ... The methods are the plumbing [`View`] is built on; user code
/// only names the tuple.
pub trait Query<R: EntityRepr>: 'static {
    /// The borrowed storages, `(&mut Storage<A>, &mut Storage<B>, ..)`.
    type Storages<'a>
    where
        Self: 'a;

    /// Shared reborrow of the storages, `(&Storage<A>, &Storage<B>, ..)`.
    type Refs<'v>: Copy
    where
        Self: 'v;

    /// Shared components of one entity, `(&A, &B, ..)`.
    type Item<'v>
    where
        Self: 'v;

    /// Mutable components of one entity, `(&mut A, &mut B, ..)`.
    type ItemMut<'v>
    where
        Self: 'v;

    /// Number of component types in the tuple.
    const LEN: usize;

    /// Type ids of the component types, in tuple order.
    fn type_ids() -> Vec<TypeId>;

    /// Type names of the component types, in tuple order.
    fn type_names() -> Vec<&'static str>;

    /// Creates any storage the registry does not have yet.
    ///
    /// # Errors
    ///
    /// Propagates a storage type mismatch from the registry.
    #[doc(hidden)]
    fn assure_storages(registry: &mut BasicRegistry<R>) -> EcsResult<()>;

    /// Downcasts erased storages (given in tuple order) to their concrete types.
    #[doc(hidden)]
    fn from_erased<'a>(slots: Vec<&'a mut Box<dyn ErasedStorage<R>>>) -> Option<Self::Storages<'a>>;

    /// Reborrows the storages as shared references.
    #[doc(hidden)]
    fn refs<'v, 'a: 'v>(storages: &'v Self::Storages<'a>) -> Self::Refs<'v>;

    /// Entity set of the `which`-th storage.
    #[doc(hidden)]
    fn set<'v>(refs: Self::Refs<'v>, which: usize) -> Option<&'v SparseSet<R>>;

    /// Checks membership in every storage except the `skip`-th.
    #[doc(hidden)]
    fn contains_all(refs: Self::Refs<'_>, entity: BasicEntity<R>, skip: usize) -> bool;

    /// Fetches the components of `entity`; the driver storage is read at
    /// `position` directly instead of through its sparse array.
    #[doc(hidden)]
    fn fetch_at<'v>(
        refs: Self::Refs<'v>,
        driver: usize,
        position: usize,
        entity: BasicEntity<R>,
    ) -> Option<Self::Item<'v>>;

    /// Fetches the components of `entity` mutably.
    #[doc(hidden)]
    fn fetch_mut<'v, 'a: 'v>(
        storages: &'v mut Self::Storages<'a>,
        entity: BasicEntity<R>,
    ) -> Option<Self::ItemMut<'v>>;

    /// The `which`-th storage, type-erased.
    #[doc(hidden)]
    fn erased<'v>(refs: Self::Refs<'v>, which: usize) -> Option<&'v dyn ErasedStorage<R>>;

    /// The `which`-th storage, type-erased and mutable.
    #[doc(hidden)]
    fn erased_mut<'v, 'a: 'v>(
        storages: &'v mut Self::Storages<'a>,
        which: usize,
    ) -> Option<&'v mut dyn ErasedStorage<R>>;
}

macro_rules! impl_query {
    ($($index:tt $name:ident),+) => {
        #[allow(non_snake_case)]
        impl<R: EntityRepr, $($name: Component),+> Query<R> for ($($name,)+) {
            type Storages<'a> = ($(&'a mut Storage<$name, R>,)+) where Self: 'a;
            type Refs<'v> = ($(&'v Storage<$name, R>,)+) where Self: 'v;
            type Item<'v> = ($(&'v $name,)+) where Self: 'v;
            type ItemMut<'v> = ($(&'v mut $name,)+) where Self: 'v;

            const LEN: usize = [$(stringify!($name)),+].len();

            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$name>()),+]
            }

            fn type_names() -> Vec<&'static str> {
                vec![$(any::type_name::<$name>()),+]
            }

            fn assure_storages(registry: &mut BasicRegistry<R>) -> EcsResult<()> {
                $(registry.storage_mut::<$name>()?;)+
                Ok(())
            }

            fn from_erased<'a>(
                slots: Vec<&'a mut Box<dyn ErasedStorage<R>>>,
            ) -> Option<Self::Storages<'a>> {
                let mut slots = slots.into_iter();
                Some(($(
                    slots.next()?.as_any_mut().downcast_mut::<Storage<$name, R>>()?,
                )+))
            }

            fn refs<'v, 'a: 'v>(storages: &'v Self::Storages<'a>) -> Self::Refs<'v> {
                let ($($name,)+) = storages;
                ($(&**$name,)+)
            }

            fn set<'v>(refs: Self::Refs<'v>, which: usize) -> Option<&'v SparseSet<R>> {
                let ($($name,)+) = refs;
                [$($name.as_set()),+].get(which).copied()
            }

            fn contains_all(refs: Self::Refs<'_>, entity: BasicEntity<R>, skip: usize) -> bool {
                let ($($name,)+) = refs;
                [$($name.as_set()),+]
                    .iter()
                    .enumerate()
                    .all(|(which, set)| which == skip || set.contains(entity))
            }

            fn fetch_at<'v>(
                refs: Self::Refs<'v>,
                driver: usize,
                position: usize,
                entity: BasicEntity<R>,
            ) -> Option<Self::Item<'v>> {
                let ($($name,)+) = refs;
                Some(($(
                    if driver == $index {
                        $name.values().get(position)?
                    } else {
                        $name.find(entity)?
                    },
                )+))
            }

            fn fetch_mut<'v, 'a: 'v>(
                storages: &'v mut Self::Storages<'a>,
                entity: BasicEntity<R>,
            ) -> Option<Self::ItemMut<'v>> {
                let ($($name,)+) = storages;
                Some(($($name.find_mut(entity)?,)+))
            }

            fn erased<'v>(refs: Self::Refs<'v>, which: usize) -> Option<&'v dyn ErasedStorage<R>> {
                let ($($name,)+) = refs;
                [$($name as &'v dyn ErasedStorage<R>),+].get(which).copied()
            }

            fn erased_mut<'v, 'a: 'v>(
                storages: &'v mut Self::Storages<'a>,
                which: usize,
            ) -> Option<&'v mut dyn ErasedStorage<R>> {
                let ($($name,)+) = storages;
                [$(&mut **$name as &'v mut dyn ErasedStorage<R>),+]
                    .into_iter()
                    .nth(which)
            }
        }
    };
}

impl_query!(0 A);
impl_query!(0 A, 1 B);
impl_query!(0 A, 1 B, 2 C);
impl_query!(0 A, 1 B, 2 C, 3 D);
impl_query!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_query!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
impl_query!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
impl_query!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);

/// Iteration over the entities that have every component in `Q`.
///
/// Created with [`BasicRegistry::create_view`].
///
/// # Example
///
/// ```rust
/// use tessera_core::Registry;
///
/// struct Position(f32);
/// struct Velocity(f32);
///
/// let mut registry = Registry::new();
/// for i in 0..4 {
///     let entity = registry.create_entity();
///     registry.add_component(entity, Position(0.0)).unwrap();
///     if i % 2 == 0 {
///         registry.add_component(entity, Velocity(1.0)).unwrap();
///     }
/// }
///
/// let mut view = registry.create_view::<(Position, Velocity)>().unwrap();
/// view.each_mut(|_, (position, velocity): (&mut Position, &mut Velocity)| {
///     position.0 += velocity.0;
/// });
/// assert_eq!(view.len(), 2);
/// ```
pub struct View<'a, Q, R = u32>
where
    Q: Query<R>,
    R: EntityRepr,
{
    storages: Q::Storages<'a>,
    driver: usize,
}

impl<'a, Q, R> View<'a, Q, R>
where
    Q: Query<R>,
    R: EntityRepr,
{
    /// Wraps borrowed storages and picks the smallest as the driver.
    pub(crate) fn new(storages: Q::Storages<'a>) -> Self {
        let refs = Q::refs(&storages);
        let driver = (0..Q::LEN)
            .min_by_key(|&which| Q::set(refs, which).map_or(usize::MAX, SparseSet::len))
            .unwrap_or(0);
        Self { storages, driver }
    }

    /// Index (in tuple order) of the storage driving iteration.
    #[inline]
    #[must_use]
    pub fn driver(&self) -> usize {
        self.driver
    }

    /// Number of entities in the driving storage.
    ///
    /// An upper bound on the number of entities the view yields.
    #[must_use]
    pub fn driver_len(&self) -> usize {
        Q::set(Q::refs(&self.storages), self.driver).map_or(0, SparseSet::len)
    }

    /// Counts the entities the view yields.
    ///
    /// This walks the view; use [`View::driver_len`] for an O(1) bound.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Checks if the view yields nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Iterates over `(entity, (&A, &B, ..))`.
    #[must_use]
    pub fn iter(&self) -> ViewIter<'_, Q, R> {
        let refs = Q::refs(&self.storages);
        let candidates = Q::set(refs, self.driver).map_or(&[][..], SparseSet::as_slice);
        ViewIter {
            refs,
            candidates: candidates.iter().enumerate(),
            driver: self.driver,
            filter: Q::LEN > 1,
        }
    }

    /// Iterates over the qualifying entities only.
    pub fn entities(&self) -> impl Iterator<Item = BasicEntity<R>> + '_ {
        self.iter().map(|(entity, _)| entity)
    }

    /// Calls `f` with every qualifying entity and its components.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(BasicEntity<R>, Q::Item<'_>),
    {
        for (entity, item) in self.iter() {
            f(entity, item);
        }
    }

    /// Calls `f` with every qualifying entity and mutable access to its
    /// components.
    pub fn each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(BasicEntity<R>, Q::ItemMut<'_>),
    {
        let mut position = 0;
        loop {
            let refs = Q::refs(&self.storages);
            let Some(&entity) = Q::set(refs, self.driver).and_then(|set| set.as_slice().get(position))
            else {
                break;
            };
            position += 1;

            if Q::LEN > 1 && !Q::contains_all(refs, entity, self.driver) {
                continue;
            }
            if let Some(item) = Q::fetch_mut(&mut self.storages, entity) {
                f(entity, item);
            }
        }
    }

    /// Checks if an entity has every component of the view.
    #[must_use]
    pub fn contains(&self, entity: BasicEntity<R>) -> bool {
        Q::contains_all(Q::refs(&self.storages), entity, usize::MAX)
    }

    /// Gets one component of an entity.
    ///
    /// Returns `None` if the entity lacks it or `T` is not part of the view.
    #[must_use]
    pub fn get<T: Component>(&self, entity: BasicEntity<R>) -> Option<&T> {
        let refs = Q::refs(&self.storages);
        (0..Q::LEN)
            .find_map(|which| Q::erased(refs, which)?.as_any().downcast_ref::<Storage<T, R>>())
            .and_then(|storage| storage.find(entity))
    }

    /// Gets one component of an entity mutably.
    ///
    /// Returns `None` if the entity lacks it or `T` is not part of the view.
    pub fn get_mut<T: Component>(&mut self, entity: BasicEntity<R>) -> Option<&mut T> {
        let which = (0..Q::LEN).find(|&which| {
            Q::erased(Q::refs(&self.storages), which)
                .is_some_and(|storage| storage.as_any().is::<Storage<T, R>>())
        })?;
        Q::erased_mut(&mut self.storages, which)?
            .as_any_mut()
            .downcast_mut::<Storage<T, R>>()?
            .find_mut(entity)
    }
}

impl<'v, 'a, Q, R> IntoIterator for &'v View<'a, Q, R>
where
    Q: Query<R>,
    R: EntityRepr,
{
    type Item = (BasicEntity<R>, Q::Item<'v>);
    type IntoIter = ViewIter<'v, Q, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`View`].
pub struct ViewIter<'v, Q, R = u32>
where
    Q: Query<R>,
    R: EntityRepr,
{
    refs: Q::Refs<'v>,
    candidates: Enumerate<slice::Iter<'v, BasicEntity<R>>>,
    driver: usize,
    filter: bool,
}

impl<'v, Q, R> Iterator for ViewIter<'v, Q, R>
where
    Q: Query<R>,
    R: EntityRepr,
{
    type Item = (BasicEntity<R>, Q::Item<'v>);

    fn next(&mut self) -> Option<Self::Item> {
        for (position, &entity) in self.candidates.by_ref() {
            if self.filter && !Q::contains_all(self.refs, entity, self.driver) {
                continue;
            }
            if let Some(item) = Q::fetch_at(self.refs, self.driver, position, entity) {
                return Some((entity, item));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.candidates.len();
        if self.filter {
            (0, Some(remaining))
        } else {
            (remaining, Some(remaining))
        }
    }
}

impl<Q, R> FusedIterator for ViewIter<'_, Q, R>
where
    Q: Query<R>,
    R: EntityRepr,
{
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::entity::Entity;
    use crate::error::EcsError;
    use crate::registry::Registry;

    #[derive(Debug, PartialEq)]
    struct A(u32);
    #[derive(Debug, PartialEq)]
    struct B(u32);
    #[derive(Debug, PartialEq)]
    struct C(u32);

    /// Entities 0..6; A on {1,2,3}, B on {2,3,4}, C on {3}.
    fn fixture() -> (Registry, Vec<Entity>) {
        let mut registry = Registry::new();
        let entities: Vec<Entity> = (0..6).map(|_| registry.create_entity()).collect();
        for &i in &[1, 2, 3] {
            registry.add_component(entities[i], A(i as u32)).unwrap();
        }
        for &i in &[2, 3, 4] {
            registry.add_component(entities[i], B(i as u32 * 10)).unwrap();
        }
        registry.add_component(entities[3], C(300)).unwrap();
        (registry, entities)
    }

    fn ids(entities: impl Iterator<Item = Entity>) -> BTreeSet<u64> {
        entities.map(Entity::id).collect()
    }

    #[test]
    fn test_two_way_intersection() {
        let (mut registry, _) = fixture();
        let view = registry.create_view::<(A, B)>().unwrap();
        assert_eq!(ids(view.entities()), BTreeSet::from([2, 3]));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_intersection_independent_of_order() {
        let (mut registry, _) = fixture();
        let forward = ids(registry.create_view::<(A, B)>().unwrap().entities());
        let backward = ids(registry.create_view::<(B, A)>().unwrap().entities());
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_each_entity_yielded_once() {
        let (mut registry, _) = fixture();
        let view = registry.create_view::<(A, B)>().unwrap();
        let yielded: Vec<u64> = view.entities().map(Entity::id).collect();
        let unique: BTreeSet<u64> = yielded.iter().copied().collect();
        assert_eq!(yielded.len(), unique.len());
    }

    #[test]
    fn test_items_match_entities() {
        let (mut registry, _) = fixture();
        let view = registry.create_view::<(A, B)>().unwrap();
        for (entity, (a, b)) in &view {
            assert_eq!(u64::from(a.0), entity.id());
            assert_eq!(u64::from(b.0), entity.id() * 10);
        }
    }

    #[test]
    fn test_smallest_storage_drives() {
        let (mut registry, _) = fixture();
        let view = registry.create_view::<(A, B, C)>().unwrap();
        assert_eq!(view.driver(), 2);
        assert_eq!(view.driver_len(), 1);
        assert_eq!(ids(view.entities()), BTreeSet::from([3]));
    }

    #[test]
    fn test_single_storage_passthrough() {
        let (mut registry, _) = fixture();
        let view = registry.create_view::<(B,)>().unwrap();
        assert_eq!(view.iter().size_hint(), (3, Some(3)));
        let values: BTreeSet<u32> = view.iter().map(|(_, (b,))| b.0).collect();
        assert_eq!(values, BTreeSet::from([20, 30, 40]));
    }

    #[test]
    fn test_each_mut_updates_components() {
        let (mut registry, entities) = fixture();
        {
            let mut view = registry.create_view::<(A, B)>().unwrap();
            view.each_mut(|_, (a, b): (&mut A, &mut B)| {
                a.0 += b.0;
            });
        }
        assert_eq!(registry.get_component::<A>(entities[1]).unwrap(), &A(1));
        assert_eq!(registry.get_component::<A>(entities[2]).unwrap(), &A(22));
        assert_eq!(registry.get_component::<A>(entities[3]).unwrap(), &A(33));
    }

    #[test]
    fn test_each_visits_qualifying() {
        let (mut registry, _) = fixture();
        let view = registry.create_view::<(A, C)>().unwrap();
        let mut seen = Vec::new();
        view.each(|entity, (a, c): (&A, &C)| seen.push((entity.id(), a.0, c.0)));
        assert_eq!(seen, vec![(3, 3, 300)]);
    }

    #[test]
    fn test_view_get_random_access() {
        let (mut registry, entities) = fixture();
        let mut view = registry.create_view::<(A, B)>().unwrap();
        assert_eq!(view.get::<A>(entities[1]), Some(&A(1)));
        assert_eq!(view.get::<B>(entities[1]), None);
        assert_eq!(view.get::<C>(entities[3]), None);

        if let Some(b) = view.get_mut::<B>(entities[4]) {
            b.0 = 7;
        }
        assert_eq!(view.get::<B>(entities[4]), Some(&B(7)));
        assert!(view.contains(entities[2]));
        assert!(!view.contains(entities[4]));
    }

    #[test]
    fn test_view_over_missing_type_is_empty() {
        struct Unused;
        let (mut registry, _) = fixture();
        let view = registry.create_view::<(A, Unused)>().unwrap();
        assert!(view.is_empty());
        assert_eq!(view.driver_len(), 0);
    }

    #[test]
    fn test_aliased_view_rejected() {
        let (mut registry, _) = fixture();
        let error = registry.create_view::<(A, B, A)>().err();
        assert!(matches!(error, Some(EcsError::AliasedComponent { .. })));
    }

    #[test]
    fn test_view_after_removal() {
        let (mut registry, entities) = fixture();
        registry.remove_component::<B>(entities[2]);
        registry.destroy_entity(entities[3]);
        let view = registry.create_view::<(A, B)>().unwrap();
        assert!(view.is_empty());
    }
}
