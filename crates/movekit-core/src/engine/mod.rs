//! # Engine Module
//!
//! The control-flow layer of MoveKit: everything that decides which mover runs, how often,
//! and what its outcome means for the caller.
//!
//! ## Architecture
//!
//! - **Containers** ([`container`]) - Ordered, weighted collections of deep-cloned movers
//! - **Dispatchers** ([`sequence`], [`random`], [`cycle`], [`switch`]) - The policies that
//!   pick which members of a container run on each `apply`
//! - **Retry Loop** ([`loop_over`]) - Repeats a mover until a filter passes or a budget runs out
//! - **Factories** ([`factory`]) - Explicit keyname-to-creator tables and the `DataMap` of
//!   named movers and filters built from tags
//! - **Progress Monitoring** ([`progress`]) - Callbacks for long multi-trial runs
//! - **Error Handling** ([`error`]) - Configuration errors that halt a run
//!
//! Inside one mover instance execution is strictly sequential. Independent deep clones can
//! be driven from separate threads.

pub mod container;
pub mod cycle;
pub mod error;
pub mod factory;
pub mod loop_over;
pub mod progress;
pub mod random;
pub mod sequence;
pub mod switch;

#[cfg(test)]
pub(crate) mod testing;
