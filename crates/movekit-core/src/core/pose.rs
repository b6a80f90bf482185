use std::fmt::Debug;

/// The mutable subject a protocol works on.
///
/// Movers treat a pose as opaque: they only need to mutate it in place and, for
/// checkpointing, copy it by value. Any `Clone + Debug` type that can cross threads
/// qualifies through the blanket implementation.
pub trait Pose: Clone + Debug + Send + Sync + 'static {}

impl<T> Pose for T where T: Clone + Debug + Send + Sync + 'static {}
