use super::error::EngineError;
use super::factory::DataMap;
use crate::core::mover::{Mover, MoverInfo};
use crate::core::pose::Pose;
use crate::core::status::MoverStatus;
use crate::core::tag::Tag;
use itertools::Itertools;
use std::fmt;
use std::sync::Arc;

/// An ordered collection of movers, each paired with a relative weight.
///
/// Members are deep clones owned by the container: adding a mover never aliases the
/// caller's instance, and cloning a container clones every member. Weights only matter to
/// [`RandomMover`](super::random::RandomMover); the other dispatchers ignore them.
#[derive(Debug, Clone)]
pub struct MoverContainer<P: Pose> {
    movers: Vec<Box<dyn Mover<P>>>,
    weights: Vec<f64>,
}

impl<P: Pose> Default for MoverContainer<P> {
    fn default() -> Self {
        Self {
            movers: Vec::new(),
            weights: Vec::new(),
        }
    }
}

impl<P: Pose> MoverContainer<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a deep clone of `mover` with `weight`.
    pub fn add_mover(&mut self, mover: &dyn Mover<P>, weight: f64) {
        self.push_owned(mover.box_clone(), weight);
    }

    pub(crate) fn push_owned(&mut self, mover: Box<dyn Mover<P>>, weight: f64) {
        self.movers.push(mover);
        self.weights.push(weight);
    }

    pub fn size(&self) -> usize {
        self.movers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movers.is_empty()
    }

    pub fn clear(&mut self) {
        self.movers.clear();
        self.weights.clear();
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn movers(&self) -> &[Box<dyn Mover<P>>] {
        &self.movers
    }

    pub fn front(&self) -> Option<&dyn Mover<P>> {
        self.movers.first().map(|m| m.as_ref())
    }

    pub fn mover_name(&self, index: usize) -> Option<&str> {
        self.movers.get(index).map(|m| m.name())
    }

    pub fn mover_names(&self) -> Vec<String> {
        self.movers.iter().map(|m| m.name().to_string()).collect()
    }

    /// Applies member `index` and appends its diagnostic records to `info`.
    pub(crate) fn apply_member(
        &mut self,
        index: usize,
        pose: &mut P,
        info: &mut MoverInfo,
    ) -> Result<MoverStatus, EngineError> {
        let mover = &mut self.movers[index];
        mover.clear_info();
        let status = mover.apply(pose)?;
        info.extend_from_slice(mover.info());
        Ok(status)
    }

    pub fn set_current_tag(&mut self, tag: &str) {
        for mover in &mut self.movers {
            mover.set_current_tag(tag);
        }
    }

    pub fn set_native_pose(&mut self, pose: Option<Arc<P>>) {
        for mover in &mut self.movers {
            mover.set_native_pose(pose.clone());
        }
    }
}

impl<P: Pose> fmt::Display for MoverContainer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = self
            .movers
            .iter()
            .zip(&self.weights)
            .map(|(mover, weight)| format!("{} (weight {})", mover.name(), weight))
            .join(", ");
        write!(f, "[{}]", members)
    }
}

/// A mover whose behavior is defined by a policy over a [`MoverContainer`].
pub trait ContainerMover<P: Pose>: Mover<P> {
    fn container(&self) -> &MoverContainer<P>;

    fn container_mut(&mut self) -> &mut MoverContainer<P>;

    fn add_mover(&mut self, mover: &dyn Mover<P>) {
        self.container_mut().add_mover(mover, 1.0);
    }

    fn add_mover_with_weight(&mut self, mover: &dyn Mover<P>, weight: f64) {
        self.container_mut().add_mover(mover, weight);
    }

    fn size(&self) -> usize {
        self.container().size()
    }

    fn clear(&mut self) {
        self.container_mut().clear();
    }
}

/// Resolves the `movers` option of a container tag against the already-defined movers.
pub(crate) fn parse_members<P: Pose>(
    tag: &Tag,
    data: &DataMap<P>,
) -> Result<Vec<Box<dyn Mover<P>>>, EngineError> {
    let names = tag.require_list("movers")?;
    if names.is_empty() {
        return Err(EngineError::InvalidConfiguration {
            tag: tag.name().to_string(),
            reason: "the 'movers' list is empty".to_string(),
        });
    }
    names.iter().map(|name| data.mover(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{TraceMover, TracePose};

    #[test]
    fn add_mover_stores_member_and_default_weight_in_order() {
        let mut container = MoverContainer::<TracePose>::new();
        container.add_mover(&TraceMover::new("a"), 1.0);
        container.add_mover(&TraceMover::new("b"), 2.5);

        assert_eq!(container.size(), 2);
        assert_eq!(container.weights(), &[1.0, 2.5]);
        assert_eq!(container.mover_name(0), Some("a"));
        assert_eq!(container.mover_name(1), Some("b"));
        assert_eq!(container.mover_name(2), None);
        assert_eq!(container.front().map(|m| m.name()), Some("a"));
    }

    #[test]
    fn added_movers_are_independent_of_the_original() {
        let mut original = TraceMover::new("a");
        let mut container = MoverContainer::<TracePose>::new();
        container.add_mover(&original, 1.0);

        let mut pose = Vec::new();
        Mover::apply(&mut original, &mut pose).unwrap();
        assert_eq!(original.applications(), 1);
        assert_eq!(container.movers()[0].info().len(), 0);
    }

    #[test]
    fn clear_removes_members_and_weights() {
        let mut container = MoverContainer::<TracePose>::new();
        container.add_mover(&TraceMover::new("a"), 1.0);
        container.clear();
        assert!(container.is_empty());
        assert!(container.weights().is_empty());
    }

    #[test]
    fn cloned_containers_do_not_share_membership() {
        let mut first = MoverContainer::<TracePose>::new();
        first.add_mover(&TraceMover::new("a"), 1.0);
        let mut second = first.clone();
        second.add_mover(&TraceMover::new("b"), 1.0);
        first.clear();

        assert_eq!(first.size(), 0);
        assert_eq!(second.mover_names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn apply_member_mutates_pose_and_collects_info() {
        let mut container = MoverContainer::<TracePose>::new();
        container.add_mover(&TraceMover::new("a"), 1.0);
        let mut pose = Vec::new();
        let mut info = MoverInfo::new();

        let status = container.apply_member(0, &mut pose, &mut info).unwrap();

        assert_eq!(status, MoverStatus::Success);
        assert_eq!(pose, vec!["a".to_string()]);
        assert_eq!(info, vec!["a applied".to_string()]);
    }

    #[test]
    fn current_tag_is_forwarded_to_every_member() {
        let mut container = MoverContainer::<TracePose>::new();
        container.add_mover(&TraceMover::new("a"), 1.0);
        container.add_mover(&TraceMover::new("b"), 1.0);
        container.set_current_tag("job_0007");

        let mut pose = Vec::new();
        let mut info = MoverInfo::new();
        container.apply_member(1, &mut pose, &mut info).unwrap();
        assert_eq!(info, vec!["b applied".to_string(), "b tag job_0007".to_string()]);
    }

    #[test]
    fn display_lists_members_with_weights() {
        let mut container = MoverContainer::<TracePose>::new();
        container.add_mover(&TraceMover::new("a"), 1.0);
        container.add_mover(&TraceMover::new("b"), 3.0);
        assert_eq!(container.to_string(), "[a (weight 1), b (weight 3)]");
    }
}
