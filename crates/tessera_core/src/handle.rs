//! # Component Handles
//!
//! A non-owning, possibly null reference to a component.

/// Borrowed access to a component that may not exist.
///
/// The handle never keeps the component alive: it borrows the registry, so
/// the component cannot be removed or moved while the handle exists.
///
/// # Example
///
/// ```rust
/// use tessera_core::Registry;
///
/// let mut registry = Registry::new();
/// let entity = registry.create_entity();
/// registry.add_component(entity, 5_u32).unwrap();
///
/// let mut handle = registry.try_get_component_mut::<u32>(entity);
/// if let Some(value) = handle.get_mut() {
///     *value += 1;
/// }
/// assert_eq!(registry.try_get_component::<u32>(entity), Some(&6));
/// assert!(registry.try_get_component_mut::<i8>(entity).is_null());
/// ```
#[derive(Debug)]
pub struct ComponentHandle<'a, T> {
    target: Option<&'a mut T>,
}

impl<'a, T> ComponentHandle<'a, T> {
    /// Creates a handle pointing at `target`.
    #[inline]
    #[must_use]
    pub fn new(target: &'a mut T) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// Creates a null handle.
    #[inline]
    #[must_use]
    pub fn null() -> Self {
        Self { target: None }
    }

    /// Checks if the component exists.
    #[inline]
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.target.is_some()
    }

    /// Checks if the handle is null.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.target.is_none()
    }

    /// Gets the component.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.target.as_deref()
    }

    /// Gets the component mutably.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.target.as_deref_mut()
    }

    /// Converts the handle into the underlying reference.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Option<&'a mut T> {
        self.target
    }

    /// Projects the handle onto a part of the component.
    #[inline]
    #[must_use]
    pub fn map<U, F>(self, project: F) -> ComponentHandle<'a, U>
    where
        F: FnOnce(&'a mut T) -> &'a mut U,
    {
        ComponentHandle {
            target: self.target.map(project),
        }
    }
}

impl<T> Default for ComponentHandle<'_, T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<'a, T> From<Option<&'a mut T>> for ComponentHandle<'a, T> {
    fn from(target: Option<&'a mut T>) -> Self {
        Self { target }
    }
}

impl<'a, T> From<&'a mut T> for ComponentHandle<'a, T> {
    fn from(target: &'a mut T) -> Self {
        Self::new(target)
    }
}
