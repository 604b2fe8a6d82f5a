//! Domain model for the social graph.
//!
//! # Responsibility
//! - Define the node shapes (accounts, posts) shared by repositories,
//!   services and the API surface.
//! - Keep the public account shape free of credential material.
//!
//! # Invariants
//! - Every node is identified by a stable random UUID.
//! - `Role` is assigned at creation and never transitions.

pub mod account;
pub mod post;
