#![deny(missing_docs)]
//! Verified tool executor.
//!
//! Wraps every filesystem (and shell) operation with a path allow-list
//! check, an atomic write where applicable, and a post-condition
//! verification — a tool reporting success is never trusted on its own.
//!
//! [`ToolRegistry`] holds the full set of tools with per-tool enable
//! flags; [`ops`] implements each one; [`guard::PathGuard`] is the
//! allow-list; [`atomic::atomic_write`] and [`verify`] are the shared
//! primitives every mutating tool is built from.

pub mod atomic;
pub mod guard;
pub mod ops;
pub mod registry;
pub mod verify;

pub use guard::PathGuard;
pub use registry::{ToolDyn, ToolRegistry};
