use super::container::{ContainerMover, MoverContainer, parse_members};
use super::error::EngineError;
use super::factory::DataMap;
use crate::core::mover::{Mover, MoverBase};
use crate::core::pose::Pose;
use crate::core::status::MoverStatus;
use crate::core::tag::Tag;
use rand::distributions::{Distribution, WeightedIndex};
use rand::thread_rng;
use std::sync::Arc;
use tracing::trace;

pub const MOVER_NAME: &str = "RandomMover";

/// Picks members at random, proportionally to their weights, and applies them.
///
/// Each `apply` performs `nmoves` independent draws with replacement. When repeats are set,
/// member `i` is drawn with weight `weight[i] * repeats[i]`; the effective weights are
/// recomputed on every draw. A member with zero effective weight is never drawn.
#[derive(Debug, Clone)]
pub struct RandomMover<P: Pose> {
    base: MoverBase,
    container: MoverContainer<P>,
    nmoves: usize,
    repeats: Vec<usize>,
    last_proposal_density_ratio: f64,
    index_of_last_mover_used: Option<usize>,
}

impl<P: Pose> Default for RandomMover<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pose> RandomMover<P> {
    pub fn new() -> Self {
        Self {
            base: MoverBase::new(MOVER_NAME),
            container: MoverContainer::new(),
            nmoves: 1,
            repeats: Vec::new(),
            last_proposal_density_ratio: 1.0,
            index_of_last_mover_used: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.base.set_name(name);
        self
    }

    pub fn nmoves(&self) -> usize {
        self.nmoves
    }

    pub fn set_nmoves(&mut self, nmoves: usize) {
        self.nmoves = nmoves;
    }

    /// Sets one repeat multiplier per member, in the order members were added.
    pub fn set_repeats(&mut self, repeats: &[usize]) {
        self.repeats = repeats.to_vec();
    }

    pub fn repeats(&self) -> &[usize] {
        &self.repeats
    }

    /// Index of the member drawn most recently, or `None` if this mover has never run.
    pub fn index_of_last_mover_used(&self) -> Option<usize> {
        self.index_of_last_mover_used
    }

    pub fn mover_name(&self, index: usize) -> Option<&str> {
        self.container.mover_name(index)
    }

    fn effective_weights(&self) -> Result<Vec<f64>, EngineError> {
        let weights = self.container.weights();
        if self.repeats.is_empty() {
            return Ok(weights.to_vec());
        }
        if self.repeats.len() != weights.len() {
            return Err(EngineError::InvalidConfiguration {
                tag: self.base.name().to_string(),
                reason: format!(
                    "{} repeat multipliers given for {} movers",
                    self.repeats.len(),
                    weights.len()
                ),
            });
        }
        Ok(weights
            .iter()
            .zip(&self.repeats)
            .map(|(weight, &repeat)| weight * repeat as f64)
            .collect())
    }

    pub fn parse_tag(tag: &Tag, data: &DataMap<P>) -> Result<Box<dyn Mover<P>>, EngineError> {
        let members = parse_members(tag, data)?;
        let weights = tag
            .get_real_list("weights")?
            .unwrap_or_else(|| vec![1.0; members.len()]);
        if weights.len() != members.len() {
            return Err(EngineError::InvalidConfiguration {
                tag: tag.name().to_string(),
                reason: format!(
                    "{} weights given for {} movers",
                    weights.len(),
                    members.len()
                ),
            });
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(EngineError::InvalidConfiguration {
                tag: tag.name().to_string(),
                reason: format!("weights must be non-negative, got {}", bad),
            });
        }

        let mut random = Self::new().named(tag.name());
        random.set_nmoves(tag.get_usize("nmoves", 1)?);
        for (member, weight) in members.into_iter().zip(weights) {
            random.container.push_owned(member, weight);
        }
        if let Some(repeats) = tag.get_usize_list("repeats")? {
            random.set_repeats(&repeats);
            random.effective_weights()?;
        }
        Ok(Box::new(random))
    }
}

impl<P: Pose> Mover<P> for RandomMover<P> {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn apply(&mut self, pose: &mut P) -> Result<MoverStatus, EngineError> {
        if self.container.is_empty() {
            return Err(EngineError::EmptyContainer {
                container: self.base.name().to_string(),
            });
        }
        self.base.clear_info();

        let mut rng = thread_rng();
        let mut status = MoverStatus::Success;
        for _ in 0..self.nmoves {
            let weights = self.effective_weights()?;
            let dist = WeightedIndex::new(&weights).map_err(|source| EngineError::Sampling {
                mover: self.base.name().to_string(),
                source,
            })?;
            let index = dist.sample(&mut rng);

            status = self
                .container
                .apply_member(index, pose, self.base.info_mut())?;
            self.last_proposal_density_ratio =
                self.container.movers()[index].last_proposal_density_ratio();
            self.index_of_last_mover_used = Some(index);
            trace!(random = self.base.name(), member = index, %status, "Random member applied.");
        }

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

    fn last_proposal_density_ratio(&self) -> f64 {
        self.last_proposal_density_ratio
    }

    fn set_current_tag(&mut self, tag: &str) {
        self.base.set_current_tag(tag);
        self.container.set_current_tag(tag);
    }

    fn set_native_pose(&mut self, pose: Option<Arc<P>>) {
        self.container.set_native_pose(pose);
    }
}

impl<P: Pose> ContainerMover<P> for RandomMover<P> {
    fn container(&self) -> &MoverContainer<P> {
        &self.container
    }

    fn container_mut(&mut self) -> &mut MoverContainer<P> {
        &mut self.container
    }
}
