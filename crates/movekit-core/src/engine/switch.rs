use super::container::{ContainerMover, MoverContainer, parse_members};
use super::error::EngineError;
use super::factory::DataMap;
use crate::core::mover::{Mover, MoverBase};
use crate::core::pose::Pose;
use crate::core::status::MoverStatus;
use crate::core::tag::Tag;
use std::sync::Arc;
use tracing::debug;

pub const MOVER_NAME: &str = "SwitchMover";

#[derive(Debug, Clone, PartialEq)]
struct Resolution {
    index: usize,
    names: Vec<String>,
}

/// Applies only the member whose name matches the current selection.
///
/// The selection is resolved lazily: the first apply after [`select`](Self::select) or after
/// any change to the member names looks the name up again, the first matching member in
/// insertion order wins.
#[derive(Debug, Clone)]
pub struct SwitchMover<P: Pose> {
    base: MoverBase,
    container: MoverContainer<P>,
    selected: String,
    resolved: Option<Resolution>,
}

impl<P: Pose> Default for SwitchMover<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pose> SwitchMover<P> {
    pub fn new() -> Self {
        Self {
            base: MoverBase::new(MOVER_NAME),
            container: MoverContainer::new(),
            selected: String::new(),
            resolved: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.base.set_name(name);
        self
    }

    pub fn select(&mut self, name: impl Into<String>) {
        self.selected = name.into();
        self.resolved = None;
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// The member that the current selection resolves to, if any.
    pub fn selected_mover(&self) -> Option<&dyn Mover<P>> {
        if self.selected.is_empty() {
            return None;
        }
        self.container
            .movers()
            .iter()
            .find(|m| m.name() == self.selected)
            .map(|m| m.as_ref())
    }

    fn resolve(&mut self) -> Result<usize, EngineError> {
        let names = self.container.mover_names();
        if let Some(resolution) = &self.resolved {
            if resolution.names == names {
                return Ok(resolution.index);
            }
        }

        let unresolved = || EngineError::UnresolvedSelection {
            switch: self.base.name().to_string(),
            selected: self.selected.clone(),
        };
        if self.selected.is_empty() {
            return Err(unresolved());
        }
        let index = names
            .iter()
            .position(|name| *name == self.selected)
            .ok_or_else(unresolved)?;

        debug!(
            switch = self.base.name(),
            selected = %self.selected,
            member = index,
            "Resolved switch selection."
        );
        self.resolved = Some(Resolution { index, names });
        Ok(index)
    }

    pub fn parse_tag(tag: &Tag, data: &DataMap<P>) -> Result<Box<dyn Mover<P>>, EngineError> {
        let mut switch = Self::new().named(tag.name());
        for member in parse_members(tag, data)? {
            switch.container.push_owned(member, 1.0);
        }
        switch.select(tag.require_string("selected")?);
        switch.resolve()?;
        Ok(Box::new(switch))
    }
}

impl<P: Pose> Mover<P> for SwitchMover<P> {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn apply(&mut self, pose: &mut P) -> Result<MoverStatus, EngineError> {
        let index = self.resolve()?;
        self.base.clear_info();
        let record = format!("SwitchMover {} selected {}", self.base.name(), self.selected);
        self.base.info_mut().push(record);

        let status = self
            .container
            .apply_member(index, pose, self.base.info_mut())?;
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

impl<P: Pose> ContainerMover<P> for SwitchMover<P> {
    fn container(&self) -> &MoverContainer<P> {
        &self.container
    }

    fn container_mut(&mut self) -> &mut MoverContainer<P> {
        &mut self.container
    }
}
