//! # TESSERA
//!
//! Sparse-set Entity Component System with a scripted scene layer.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 tessera_scene                 │
//! │   Scene ── Node ── Script (create/update/..)  │
//! └───────────────────────┬───────────────────────┘
//!                         │ owns
//! ┌───────────────────────▼───────────────────────┐
//! │                 tessera_core                  │
//! │   Registry ── Storage<T> ── SparseSet         │
//! │       └── View<(A, B, ..)>                    │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `demo`: shared setup for the demo binaries

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod demo;

// Re-export the layers
pub use tessera_core as core;
pub use tessera_scene as scene;
