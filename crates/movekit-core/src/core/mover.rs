use super::pose::Pose;
use super::status::MoverStatus;
use super::tag::Tag;
use crate::engine::error::EngineError;
use crate::engine::factory::DataMap;
use std::fmt;
use std::sync::Arc;

/// Diagnostic records a mover collects while it runs.
///
/// Containers and loops copy the records of their members into their own, so whoever
/// drives the outermost mover sees a single flattened trace.
pub type MoverInfo = Vec<String>;

/// Deep-copy support for boxed movers.
///
/// Implemented automatically for every `Mover` that is also `Clone`.
pub trait MoverClone<P: Pose> {
    fn box_clone(&self) -> Box<dyn Mover<P>>;
}

impl<P, M> MoverClone<P> for M
where
    P: Pose,
    M: Mover<P> + Clone + 'static,
{
    fn box_clone(&self) -> Box<dyn Mover<P>> {
        Box::new(self.clone())
    }
}

/// A unit of work that transforms a pose in place and reports how it went.
///
/// Configuration problems (an empty container, an unresolvable selection) are returned as
/// `Err` and halt the enclosing run. Everything else, including an unsuccessful move, is
/// reported through the returned [`MoverStatus`].
pub trait Mover<P: Pose>: MoverClone<P> + fmt::Debug + Send {
    /// The instance name used for lookups, selection and logging.
    fn name(&self) -> &str;

    fn apply(&mut self, pose: &mut P) -> Result<MoverStatus, EngineError>;

    /// Status reported by the most recent `apply`.
    fn last_status(&self) -> MoverStatus;

    fn info(&self) -> &[String] {
        &[]
    }

    fn clear_info(&mut self) {}

    /// Whether this mover may emit more than one output pose per `apply`.
    fn has_additional_output(&self) -> bool {
        false
    }

    /// Ratio of forward to reverse proposal densities of the last move, for Metropolis
    /// acceptance bookkeeping.
    fn last_proposal_density_ratio(&self) -> f64 {
        1.0
    }

    fn set_current_tag(&mut self, _tag: &str) {}

    fn set_native_pose(&mut self, _pose: Option<Arc<P>>) {}
}

impl<P: Pose> Clone for Box<dyn Mover<P>> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Bookkeeping shared by the movers in this crate: instance name, last status, the
/// diagnostic trace and the current job tag.
#[derive(Debug, Clone, Default)]
pub struct MoverBase {
    name: String,
    last_status: MoverStatus,
    info: MoverInfo,
    current_tag: String,
}

impl MoverBase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn last_status(&self) -> MoverStatus {
        self.last_status
    }

    pub fn set_last_status(&mut self, status: MoverStatus) {
        self.last_status = status;
    }

    pub fn info(&self) -> &[String] {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut MoverInfo {
        &mut self.info
    }

    pub fn clear_info(&mut self) {
        self.info.clear();
    }

    pub fn current_tag(&self) -> &str {
        &self.current_tag
    }

    pub fn set_current_tag(&mut self, tag: &str) {
        self.current_tag = tag.to_string();
    }
}

pub const NULL_MOVER_NAME: &str = "NullMover";

/// A mover that leaves the pose untouched and always succeeds.
#[derive(Debug, Clone)]
pub struct NullMover {
    base: MoverBase,
}

impl NullMover {
    pub fn new() -> Self {
        Self {
            base: MoverBase::new(NULL_MOVER_NAME),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            base: MoverBase::new(name),
        }
    }

    pub fn parse_tag<P: Pose>(
        tag: &Tag,
        _data: &DataMap<P>,
    ) -> Result<Box<dyn Mover<P>>, EngineError> {
        Ok(Box::new(Self::named(tag.name())))
    }
}

impl Default for NullMover {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pose> Mover<P> for NullMover {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn apply(&mut self, _pose: &mut P) -> Result<MoverStatus, EngineError> {
        self.base.set_last_status(MoverStatus::Success);
        Ok(MoverStatus::Success)
    }

    fn last_status(&self) -> MoverStatus {
        self.base.last_status()
    }

    fn set_current_tag(&mut self, tag: &str) {
        self.base.set_current_tag(tag);
    }
}
