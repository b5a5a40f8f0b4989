#![deny(missing_docs)]
//! Turns a [`latchkey_core::tool_result::ToolResult`] into the sentence a
//! user sees, and stops the model from narrating work that never
//! happened.
//!
//! [`formatter::ResponseFormatter`] renders tool outcomes, disambiguation
//! prompts, and confirmation requests. [`action_guard`] scans a
//! free-text reply for hallucinated completion claims and substitutes a
//! fixed clarification when no tool call backs them up.

pub mod action_guard;
pub mod formatter;

pub use action_guard::{contains_hallucination, validate_model_response, CLARIFICATION_PROMPT};
pub use formatter::ResponseFormatter;
