//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the credential store, social graph,
//!   content and feed use-cases.
//! - Validate input and translate persistence errors into the domain
//!   taxonomy (`ServiceError`).
//!
//! # Invariants
//! - Services never bypass repository transaction boundaries.
//! - Services remain storage-agnostic; they see only repository traits.

pub mod account_service;
pub mod content_service;
pub mod error;
pub mod feed_service;
pub mod graph_service;
pub mod validation;
