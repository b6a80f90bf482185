//! # Workflows Module
//!
//! High-level entry points that turn a protocol script into a running protocol.
//!
//! ## Overview
//!
//! A protocol is described in a TOML script as named filters, named movers built from one
//! another, and a top-level list of movers to run in order. Workflows load and validate such a
//! script, build the mover tree through the explicit factories, and drive it over many
//! independent trials.
//!
//! ## Architecture
//!
//! - **Script Loading** ([`script`]) - Parsing, overriding and building protocol scripts
//! - **Protocol Execution** ([`protocol`]) - The built protocol and the parallel trial runner

pub mod protocol;
pub mod script;
