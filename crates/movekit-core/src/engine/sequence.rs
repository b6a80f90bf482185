use super::container::{ContainerMover, MoverContainer, parse_members};
use super::error::EngineError;
use super::factory::DataMap;
use crate::core::mover::{Mover, MoverBase};
use crate::core::pose::Pose;
use crate::core::status::MoverStatus;
use crate::core::tag::Tag;
use std::sync::Arc;
use tracing::trace;

pub const MOVER_NAME: &str = "SequenceMover";

/// Applies every member once, in insertion order, to the same pose.
///
/// With `use_mover_status` enabled the sequence stops at the first member that does not
/// report [`MoverStatus::Success`] and takes on that status. Otherwise all members run and
/// the sequence reports success.
#[derive(Debug, Clone)]
pub struct SequenceMover<P: Pose> {
    base: MoverBase,
    container: MoverContainer<P>,
    use_mover_status: bool,
}

impl<P: Pose> Default for SequenceMover<P> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<P: Pose> SequenceMover<P> {
    pub fn new(use_mover_status: bool) -> Self {
        Self {
            base: MoverBase::new(MOVER_NAME),
            container: MoverContainer::new(),
            use_mover_status,
        }
    }

    /// Builds a sequence from an initial list of movers, each deep-cloned.
    pub fn new_with(movers: &[&dyn Mover<P>]) -> Self {
        let mut sequence = Self::new(false);
        for mover in movers {
            sequence.add_mover(*mover);
        }
        sequence
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.base.set_name(name);
        self
    }

    pub fn use_mover_status(&self) -> bool {
        self.use_mover_status
    }

    pub fn set_use_mover_status(&mut self, flag: bool) {
        self.use_mover_status = flag;
    }

    pub fn parse_tag(tag: &Tag, data: &DataMap<P>) -> Result<Box<dyn Mover<P>>, EngineError> {
        let mut sequence = Self::new(tag.get_bool("use_mover_status", false)?).named(tag.name());
        for member in parse_members(tag, data)? {
            sequence.container.push_owned(member, 1.0);
        }
        Ok(Box::new(sequence))
    }
}

impl<P: Pose> Mover<P> for SequenceMover<P> {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn apply(&mut self, pose: &mut P) -> Result<MoverStatus, EngineError> {
        self.base.clear_info();
        self.base.set_last_status(MoverStatus::Success);

        for index in 0..self.container.size() {
            let status = self
                .container
                .apply_member(index, pose, self.base.info_mut())?;
            trace!(
                sequence = self.base.name(),
                member = index,
                %status,
                "Sequence member applied."
            );
            if self.use_mover_status && !status.is_success() {
                self.base.set_last_status(status);
                return Ok(status);
            }
        }
        Ok(MoverStatus::Success)
    }

    fn last_status(&self) -> MoverStatus {
        self.base.last_status()
    }

    fn info(&self) -> &[String] {
        self.base.info()
    }

    fn clear_info(&mut self) {
        self.base.clear_info();
    }

    fn set_current_tag(&mut self, tag: &str) {
        self.base.set_current_tag(tag);
        self.container.set_current_tag(tag);
    }

    fn set_native_pose(&mut self, pose: Option<Arc<P>>) {
        self.container.set_native_pose(pose);
    }
}

impl<P: Pose> ContainerMover<P> for SequenceMover<P> {
    fn container(&self) -> &MoverContainer<P> {
        &self.container
    }

    fn container_mut(&mut self) -> &mut MoverContainer<P> {
        &mut self.container
    }
}
