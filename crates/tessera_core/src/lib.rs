//! # TESSERA Core
//!
//! Sparse-set Entity Component System:
//! - Generational entity identifiers, 32 or 64 bits wide
//! - One densely packed storage per component type
//! - Views that iterate the intersection of several storages
//!
//! ## Architecture Rules
//!
//! 1. **Dense storage** - components live in contiguous arrays, indexed
//!    through a paged sparse array
//! 2. **O(1) everything** - add, remove, lookup and membership never scan
//! 3. **Stale handles are detectable** - a destroyed entity's slot is reused
//!    with a new version
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::Registry;
//!
//! #[derive(Debug, PartialEq)]
//! struct Position(f32, f32);
//! struct Velocity(f32, f32);
//!
//! let mut registry = Registry::new();
//! let entity = registry.create_entity();
//! registry.add_component(entity, Position(0.0, 0.0)).unwrap();
//! registry.add_component(entity, Velocity(1.0, 2.0)).unwrap();
//!
//! let mut view = registry.create_view::<(Position, Velocity)>().unwrap();
//! view.each_mut(|_, (position, velocity): (&mut Position, &mut Velocity)| {
//!     position.0 += velocity.0;
//!     position.1 += velocity.1;
//! });
//!
//! assert_eq!(registry.get_component::<Position>(entity), Ok(&Position(1.0, 2.0)));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod entity;
pub mod error;
pub mod handle;
pub mod registry;
pub mod sparse_set;
pub mod storage;
pub mod view;

pub use config::RegistryConfig;
pub use entity::{BasicEntity, Entity, Entity64, EntityRepr};
pub use error::{ConfigError, EcsError, EcsResult};
pub use handle::ComponentHandle;
pub use registry::{BasicRegistry, Registry, Registry64};
pub use sparse_set::{SparseSet, PAGE_SIZE};
pub use storage::{Component, ErasedStorage, Storage};
pub use view::{Query, View, ViewIter};
