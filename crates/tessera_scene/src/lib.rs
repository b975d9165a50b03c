//! # TESSERA Scene
//!
//! Nodes with positions and scripts, built on `tessera_core`.
//!
//! A [`Scene`] owns a registry. Every node it creates is an entity carrying
//! a [`Vector3`]; a node may also carry one [`Script`], whose hooks the scene
//! calls on initialize, update and terminate.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod scene;
pub mod script;
pub mod vector3;

pub use error::{SceneError, SceneResult};
pub use scene::{Node, Scene};
pub use script::{Script, ScriptContext};
pub use vector3::Vector3;
