//! # Scene
//!
//! A registry whose entities are nodes: every node has a [`Vector3`]
//! position and may carry one [`Script`].
//!
//! Lifecycle:
//! 1. [`Scene::initialize`] runs `on_create` for every script
//! 2. [`Scene::update`] runs `on_update` once per frame
//! 3. [`Scene::terminate`] runs `on_destroy`

use std::fmt;

use tessera_core::{Component, ComponentHandle, Entity, Registry, RegistryConfig};

use crate::error::{SceneError, SceneResult};
use crate::script::{Script, ScriptContext, ScriptSlot};
use crate::vector3::Vector3;

/// Handle to a scene node.
///
/// Like an entity, a node handle goes stale when the node is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Node {
    entity: Entity,
}

impl Node {
    /// The node's entity in the scene registry.
    #[inline]
    #[must_use]
    pub fn entity(self) -> Entity {
        self.entity
    }
}

#[derive(Clone, Copy, Debug)]
enum Hook {
    Create,
    Update(f32),
    Destroy,
}

/// Owns the nodes and drives their scripts.
///
/// # Example
///
/// ```rust
/// use tessera_scene::{Scene, Script, ScriptContext, Vector3};
///
/// struct Rise;
///
/// impl Script for Rise {
///     fn on_update(&mut self, ctx: &mut ScriptContext<'_>, delta_time: f32) {
///         if let Some(position) = ctx.component::<Vector3>().get_mut() {
///             position.y += delta_time;
///         }
///     }
/// }
///
/// let mut scene = Scene::new();
/// let node = scene.create_node(Vector3::ZERO).unwrap();
/// scene.add_script(node, Rise).unwrap();
///
/// scene.initialize();
/// scene.update(0.5);
/// scene.terminate();
///
/// assert_eq!(scene.position(node), Some(Vector3::new(0.0, 0.5, 0.0)));
/// ```
pub struct Scene {
    registry: Registry,
    initialized: bool,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    /// Creates an empty scene whose registry reserves memory per `config`.
    #[must_use]
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            registry: Registry::with_config(config),
            initialized: false,
        }
    }

    /// Creates a node at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Exhausted`] if no entity id is left.
    pub fn create_node(&mut self, position: Vector3) -> SceneResult<Node> {
        let entity = self.registry.create_entity();
        if entity.is_null() {
            return Err(SceneError::Exhausted);
        }
        self.registry.add_component(entity, position)?;
        Ok(Node { entity })
    }

    /// Destroys a node and all of its components.
    ///
    /// If the scene is initialized, the node's script gets `on_destroy` first.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidNode`] if the node is already gone.
    pub fn destroy_node(&mut self, node: Node) -> SceneResult<()> {
        self.check(node)?;
        if self.initialized {
            self.run(node.entity, Hook::Destroy);
        }
        self.registry.destroy_entity(node.entity);
        Ok(())
    }

    /// Checks if a node handle is still live.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, node: Node) -> bool {
        self.registry.is_valid(node.entity)
    }

    /// Returns the number of live nodes.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.registry.alive_count()
    }

    /// Attaches a script to a node, replacing any previous script.
    ///
    /// On an initialized scene the script's `on_create` runs immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidNode`] if the node is gone.
    pub fn add_script<S: Script>(&mut self, node: Node, script: S) -> SceneResult<()> {
        self.check(node)?;
        self.registry
            .add_component(node.entity, ScriptSlot(Some(Box::new(script))))?;
        if self.initialized {
            self.run(node.entity, Hook::Create);
        }
        Ok(())
    }

    /// Checks if a node has a script.
    #[must_use]
    pub fn has_script(&self, node: Node) -> bool {
        self.registry.has_component::<ScriptSlot>(node.entity)
    }

    /// Gets a node's component.
    #[must_use]
    pub fn component<T: Component>(&self, node: Node) -> Option<&T> {
        self.registry.try_get_component::<T>(node.entity)
    }

    /// Gets a handle to a node's component.
    pub fn component_mut<T: Component>(&mut self, node: Node) -> ComponentHandle<'_, T> {
        self.registry.try_get_component_mut::<T>(node.entity)
    }

    /// Returns a node's position.
    #[must_use]
    pub fn position(&self, node: Node) -> Option<Vector3> {
        self.component::<Vector3>(node).copied()
    }

    /// Runs `on_create` for every script.
    pub fn initialize(&mut self) {
        tracing::debug!("initializing scene ({} nodes)", self.node_count());
        self.dispatch(Hook::Create);
        self.initialized = true;
    }

    /// Runs `on_update` for every script.
    pub fn update(&mut self, delta_time: f32) {
        self.dispatch(Hook::Update(delta_time));
    }

    /// Runs `on_destroy` for every script.
    ///
    /// The nodes themselves stay in the scene.
    pub fn terminate(&mut self) {
        tracing::debug!("terminating scene ({} nodes)", self.node_count());
        self.dispatch(Hook::Destroy);
        self.initialized = false;
    }

    /// Checks if [`Scene::initialize`] ran without a later [`Scene::terminate`].
    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The underlying registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The underlying registry, mutably.
    #[inline]
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    fn check(&self, node: Node) -> SceneResult<()> {
        if self.is_alive(node) {
            Ok(())
        } else {
            Err(SceneError::invalid_node(node.entity))
        }
    }

    fn dispatch(&mut self, hook: Hook) {
        let scripted: Vec<Entity> = match self.registry.create_view::<(ScriptSlot,)>() {
            Ok(view) => view.entities().collect(),
            Err(error) => {
                tracing::warn!("cannot dispatch {hook:?}: {error}");
                return;
            }
        };
        tracing::trace!("dispatching {hook:?} to {} scripts", scripted.len());

        for entity in scripted {
            self.run(entity, hook);
        }
    }

    fn run(&mut self, entity: Entity, hook: Hook) {
        let Some(mut script) = self
            .registry
            .try_get_component_mut::<ScriptSlot>(entity)
            .into_inner()
            .and_then(|slot| slot.0.take())
        else {
            return;
        };

        let mut ctx = ScriptContext::new(Node { entity }, &mut self.registry);
        match hook {
            Hook::Create => script.on_create(&mut ctx),
            Hook::Update(delta_time) => script.on_update(&mut ctx, delta_time),
            Hook::Destroy => script.on_destroy(&mut ctx),
        }

        if let Some(slot) = self
            .registry
            .try_get_component_mut::<ScriptSlot>(entity)
            .into_inner()
        {
            if slot.0.is_none() {
                slot.0 = Some(script);
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.node_count())
            .field("initialized", &self.initialized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Script for Recorder {
        fn on_create(&mut self, ctx: &mut ScriptContext<'_>) {
            self.log.borrow_mut().push(format!("{}:create:{}", self.name, ctx.entity()));
        }

        fn on_update(&mut self, _ctx: &mut ScriptContext<'_>, delta_time: f32) {
            self.log.borrow_mut().push(format!("{}:update:{delta_time}", self.name));
        }

        fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) {
            self.log.borrow_mut().push(format!("{}:destroy", self.name));
        }
    }

    struct Mover {
        velocity: Vector3,
    }

    impl Script for Mover {
        fn on_create(&mut self, ctx: &mut ScriptContext<'_>) {
            let _ = ctx.add_component(0_u32);
        }

        fn on_update(&mut self, ctx: &mut ScriptContext<'_>, delta_time: f32) {
            if let Some(position) = ctx.component::<Vector3>().get_mut() {
                *position += self.velocity * delta_time;
            }
            if let Some(ticks) = ctx.component::<u32>().get_mut() {
                *ticks += 1;
            }
        }
    }

    struct Silent;

    impl Script for Silent {}

    fn recorder(name: &'static str, log: &Log) -> Recorder {
        Recorder {
            name,
            log: Rc::clone(log),
        }
    }

    #[test]
    fn test_create_node_has_position() {
        let mut scene = Scene::new();
        let node = scene.create_node(Vector3::new(1.0, 2.0, 3.0)).unwrap();
        assert!(scene.is_alive(node));
        assert_eq!(scene.position(node), Some(Vector3::new(1.0, 2.0, 3.0)));
        assert!(!scene.has_script(node));
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_hooks_run_in_order() {
        let log = Log::default();
        let mut scene = Scene::new();
        let node = scene.create_node(Vector3::ZERO).unwrap();
        scene.add_script(node, recorder("a", &log)).unwrap();

        scene.initialize();
        scene.update(0.5);
        scene.update(0.25);
        scene.terminate();

        assert_eq!(
            *log.borrow(),
            vec!["a:create:0v0", "a:update:0.5", "a:update:0.25", "a:destroy"]
        );
        assert!(!scene.is_initialized());
    }

    #[test]
    fn test_script_moves_its_node() {
        let mut scene = Scene::new();
        let node = scene.create_node(Vector3::new(0.0, 1.0, 0.0)).unwrap();
        scene
            .add_script(node, Mover { velocity: Vector3::new(2.0, 0.0, 0.0) })
            .unwrap();

        scene.initialize();
        scene.update(0.5);
        scene.update(0.5);

        assert_eq!(scene.position(node), Some(Vector3::new(2.0, 1.0, 0.0)));
        assert_eq!(scene.component::<u32>(node), Some(&2));
    }

    #[test]
    fn test_default_hooks_do_nothing() {
        let mut scene = Scene::new();
        let node = scene.create_node(Vector3::ZERO).unwrap();
        scene.add_script(node, Silent).unwrap();
        scene.initialize();
        scene.update(1.0);
        scene.terminate();
        assert_eq!(scene.position(node), Some(Vector3::ZERO));
        assert!(scene.has_script(node));
    }

    #[test]
    fn test_script_added_after_initialize_is_created() {
        let log = Log::default();
        let mut scene = Scene::new();
        scene.initialize();

        let node = scene.create_node(Vector3::ZERO).unwrap();
        scene.add_script(node, recorder("late", &log)).unwrap();
        assert_eq!(*log.borrow(), vec!["late:create:0v0"]);
    }

    #[test]
    fn test_destroy_node_runs_on_destroy() {
        let log = Log::default();
        let mut scene = Scene::new();
        let keep = scene.create_node(Vector3::ZERO).unwrap();
        let doomed = scene.create_node(Vector3::ZERO).unwrap();
        scene.add_script(keep, recorder("keep", &log)).unwrap();
        scene.add_script(doomed, recorder("doomed", &log)).unwrap();
        scene.initialize();
        log.borrow_mut().clear();

        scene.destroy_node(doomed).unwrap();
        assert_eq!(*log.borrow(), vec!["doomed:destroy"]);
        assert!(!scene.is_alive(doomed));
        assert_eq!(scene.position(doomed), None);

        scene.update(1.0);
        assert_eq!(log.borrow().last().map(String::as_str), Some("keep:update:1"));
    }

    #[test]
    fn test_stale_node_rejected() {
        let mut scene = Scene::new();
        let node = scene.create_node(Vector3::ZERO).unwrap();
        scene.destroy_node(node).unwrap();

        assert_eq!(
            scene.destroy_node(node),
            Err(SceneError::InvalidNode { id: 0, version: 0 })
        );
        assert!(matches!(scene.add_script(node, Silent), Err(SceneError::InvalidNode { .. })));
        assert!(scene.component_mut::<Vector3>(node).is_null());
    }

    #[test]
    fn test_replacing_script() {
        let log = Log::default();
        let mut scene = Scene::new();
        let node = scene.create_node(Vector3::ZERO).unwrap();
        scene.add_script(node, recorder("old", &log)).unwrap();
        scene.add_script(node, recorder("new", &log)).unwrap();

        scene.update(0.0);
        assert_eq!(*log.borrow(), vec!["new:update:0"]);
    }
}
