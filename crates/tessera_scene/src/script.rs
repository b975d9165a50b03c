//! # Scripts
//!
//! Behaviour attached to a scene node.
//!
//! A script implements only the hooks it cares about; the rest default to
//! doing nothing. Each hook receives a [`ScriptContext`] for the node the
//! script is attached to.

use tessera_core::{Component, ComponentHandle, Entity, Registry};

use crate::error::{SceneError, SceneResult};
use crate::scene::Node;

/// Per-node behaviour.
///
/// # Example
///
/// ```rust
/// use tessera_scene::{Script, ScriptContext, Vector3};
///
/// struct Drift(Vector3);
///
/// impl Script for Drift {
///     fn on_update(&mut self, ctx: &mut ScriptContext<'_>, delta_time: f32) {
///         if let Some(position) = ctx.component::<Vector3>().get_mut() {
///             *position += self.0 * delta_time;
///         }
///     }
/// }
/// ```
pub trait Script: 'static {
    /// Called once when the scene is initialized, or when the script is
    /// attached to an already initialized scene.
    fn on_create(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Called on every scene update.
    fn on_update(&mut self, _ctx: &mut ScriptContext<'_>, _delta_time: f32) {}

    /// Called when the scene terminates or the node is destroyed.
    fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) {}
}

/// What a script hook can reach: its node and that node's components.
pub struct ScriptContext<'a> {
    node: Node,
    registry: &'a mut Registry,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(node: Node, registry: &'a mut Registry) -> Self {
        Self { node, registry }
    }

    /// The node the script is attached to.
    #[inline]
    #[must_use]
    pub fn node(&self) -> Node {
        self.node
    }

    /// The node's entity.
    #[inline]
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.node.entity()
    }

    /// Gets a handle to one of the node's components.
    pub fn component<T: Component>(&mut self) -> ComponentHandle<'_, T> {
        self.registry.try_get_component_mut::<T>(self.node.entity())
    }

    /// Attaches a component to the node, overwriting any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Ecs`] if the node's entity is no longer valid.
    pub fn add_component<T: Component>(&mut self, value: T) -> SceneResult<&mut T> {
        self.registry
            .add_component(self.node.entity(), value)
            .map_err(SceneError::from)
    }

    /// Checks if the node has a component.
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.registry.has_component::<T>(self.node.entity())
    }

    /// Read access to the whole registry, for looking at other nodes.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        self.registry
    }
}

/// Storage slot for a node's script.
///
/// The box is taken out while a hook runs, so the hook can borrow the
/// registry mutably.
pub(crate) struct ScriptSlot(pub(crate) Option<Box<dyn Script>>);
