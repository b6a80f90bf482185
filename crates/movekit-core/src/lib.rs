//! # MoveKit Core Library
//!
//! Composable movers, filters and retry loops for structure-modeling protocols.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture so that the vocabulary, the control flow
//! and the user-facing entry points can evolve independently.
//!
//! - **[`core`]: The Vocabulary.** The [`Mover`](core::mover::Mover) and
//!   [`Filter`](core::filter::Filter) capabilities, the [`MoverStatus`](core::status::MoverStatus)
//!   outcome type, and the [`Tag`](core::tag::Tag) configuration element. Structures themselves
//!   are opaque: anything implementing [`Pose`](core::pose::Pose) can be transformed.
//!
//! - **[`engine`]: The Control Flow.** Mover containers that dispatch to their members in
//!   sequence, by weighted random draw, cyclically, or by name, and the `LoopOver` retry
//!   loop that repeats a mover until a filter passes. The explicit mover and filter factories
//!   that turn tags into live objects also live here.
//!
//! - **[`workflows`]: The Public API.** Loading protocol scripts and running a protocol over
//!   many independent trials.

pub mod core;
pub mod engine;
pub mod workflows;
