use super::container::{ContainerMover, MoverContainer, parse_members};
use super::error::EngineError;
use super::factory::DataMap;
use crate::core::mover::{Mover, MoverBase};
use crate::core::pose::Pose;
use crate::core::status::MoverStatus;
use crate::core::tag::Tag;
use std::sync::Arc;
use tracing::trace;

pub const MOVER_NAME: &str = "CycleMover";

/// Applies exactly one member per call, visiting members round-robin.
///
/// The `k`-th call applies member `k mod n`. The cursor is taken modulo the current size
/// before each use, so adding or removing members between calls never indexes out of range.
#[derive(Debug, Clone)]
pub struct CycleMover<P: Pose> {
    base: MoverBase,
    container: MoverContainer<P>,
    next_index: usize,
}

impl<P: Pose> Default for CycleMover<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pose> CycleMover<P> {
    pub fn new() -> Self {
        Self {
            base: MoverBase::new(MOVER_NAME),
            container: MoverContainer::new(),
            next_index: 0,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.base.set_name(name);
        self
    }

    /// Rewinds the cycle so the next call applies the first member.
    pub fn reset_cycle_index(&mut self) {
        self.next_index = 0;
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn parse_tag(tag: &Tag, data: &DataMap<P>) -> Result<Box<dyn Mover<P>>, EngineError> {
        let mut cycle = Self::new().named(tag.name());
        for member in parse_members(tag, data)? {
            cycle.container.push_owned(member, 1.0);
        }
        Ok(Box::new(cycle))
    }
}

impl<P: Pose> Mover<P> for CycleMover<P> {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn apply(&mut self, pose: &mut P) -> Result<MoverStatus, EngineError> {
        let size = self.container.size();
        if size == 0 {
            return Err(EngineError::EmptyContainer {
                container: self.base.name().to_string(),
            });
        }
        self.base.clear_info();

        let index = self.next_index % size;
        let status = self
            .container
            .apply_member(index, pose, self.base.info_mut())?;
        self.next_index = index + 1;
        trace!(cycle = self.base.name(), member = index, %status, "Cycle member applied.");

        self.base.set_last_status(status);
        Ok(status)
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

impl<P: Pose> ContainerMover<P> for CycleMover<P> {
    fn container(&self) -> &MoverContainer<P> {
        &self.container
    }

    fn container_mut(&mut self) -> &mut MoverContainer<P> {
        &mut self.container
    }
}
