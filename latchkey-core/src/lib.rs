//! # latchkey-core — shared types for the latchkey agent orchestration loop
//!
//! This crate defines the data model and storage trait shared by every
//! stage of one turn through a local-first filesystem assistant:
//!
//! | Stage | Types | What it does |
//! |-------|-------|---------------|
//! | Storage | [`StateStore`], [`Scope`] | How data persists across turns |
//! | Entities | [`Entity`], [`EntityKind`], [`Provenance`] | Tracked files/folders/selections |
//! | Conversation | [`ConversationState`] | Last-active pointers, turn counter |
//! | Confirmation | [`PendingAction`] | The one outstanding yes/no slot |
//! | Resolution | [`ResolvedReference`], [`Confidence`] | "it" → an entity, graded |
//! | Execution | [`ToolResult`], [`Outcome`], [`Verification`] | Tool post-conditions |
//! | Routing | [`RoutingDecision`], [`Capability`] | Which worker model ran |
//!
//! ## Design Principle
//!
//! Every type here is a plain data record, not a mechanism. The entity
//! store, resolver, planner, executor, and formatter that operate on
//! these types live in their own crates so that each can be swapped or
//! tested in isolation — this crate only fixes the shapes they agree on.
//!
//! ## Dependency Notes
//!
//! `serde_json::Value` appears in a few fields (tool params, system-info
//! snapshots) as the universal interchange format for free-form data.
//! The alternative (generic `T: Serialize`) would complicate the object
//! safety of [`StateStore`] without practical benefit.

#![deny(missing_docs)]

pub mod entity;
pub mod error;
pub mod id;
pub mod pending;
pub mod resolve;
pub mod routing;
pub mod state;
pub mod tool_result;

// Re-exports for convenience
pub use entity::{ConversationState, Entity, EntityKind, EntityMetadata, Provenance, VerifiedExists};
pub use error::{DomainError, StateError};
pub use id::{ConversationId, EntityId};
pub use pending::PendingAction;
pub use resolve::{Confidence, ResolvedReference};
pub use routing::{Capability, RoutingDecision};
pub use state::{Scope, StateStore};
pub use tool_result::{ListItem, Outcome, Status, ToolAction, ToolResult, Verification};
