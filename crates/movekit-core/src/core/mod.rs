//! # Core Module
//!
//! The shared vocabulary of every protocol: what a structure is, what it means to transform
//! one, how a transformation reports its outcome, and how a condition is checked.
//!
//! ## Architecture
//!
//! - **Structures** ([`pose`]) - The opaque, checkpointable subject of a protocol
//! - **Outcomes** ([`status`]) - Mover status values consulted by control flow
//! - **Transformations** ([`mover`]) - The `Mover` capability and its bookkeeping
//! - **Conditions** ([`filter`]) - The `Filter` capability and the built-in filters
//! - **Configuration** ([`tag`]) - Typed key/value elements movers and filters are built from

pub mod filter;
pub mod mover;
pub mod pose;
pub mod status;
pub mod tag;
