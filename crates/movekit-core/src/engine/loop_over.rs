use super::error::EngineError;
use super::factory::DataMap;
use crate::core::filter::{FALSE_FILTER_NAME, Filter};
use crate::core::mover::{Mover, MoverBase};
use crate::core::pose::Pose;
use crate::core::status::MoverStatus;
use crate::core::tag::Tag;
use std::sync::Arc;
use tracing::{debug, info};

pub const MOVER_NAME: &str = "LoopOver";

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Repeats a mover until a filter accepts the pose or the iteration budget is spent.
///
/// The filter is consulted only after an iteration whose mover reported
/// [`MoverStatus::Success`]. With `drift` enabled each iteration starts from the pose the
/// previous one produced; without it every iteration starts from the pose as it was on entry,
/// and a loop that never passes hands that entry pose back unchanged. An exhausted loop reports
/// `ms_whenfail`.
#[derive(Debug, Clone)]
pub struct LoopOver<P: Pose> {
    base: MoverBase,
    mover: Box<dyn Mover<P>>,
    filter: Box<dyn Filter<P>>,
    max_iterations: usize,
    ms_whenfail: MoverStatus,
    drift: bool,
}

impl<P: Pose> LoopOver<P> {
    /// Builds a loop over deep clones of `mover` and `filter` with the default settings.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MultipleOutputUnsupported`] if `mover` produces more than one
    /// output pose.
    pub fn new(mover: &dyn Mover<P>, filter: &dyn Filter<P>) -> Result<Self, EngineError> {
        Self::from_parts(mover.box_clone(), filter.box_clone())
    }

    fn from_parts(
        mover: Box<dyn Mover<P>>,
        filter: Box<dyn Filter<P>>,
    ) -> Result<Self, EngineError> {
        check_single_output(mover.as_ref())?;
        Ok(Self {
            base: MoverBase::new(MOVER_NAME),
            mover,
            filter,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            ms_whenfail: MoverStatus::Success,
            drift: true,
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.base.set_name(name);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_ms_whenfail(mut self, status: MoverStatus) -> Self {
        self.ms_whenfail = status;
        self
    }

    pub fn with_drift(mut self, drift: bool) -> Self {
        self.drift = drift;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn ms_whenfail(&self) -> MoverStatus {
        self.ms_whenfail
    }

    pub fn drift(&self) -> bool {
        self.drift
    }

    pub fn mover(&self) -> &dyn Mover<P> {
        self.mover.as_ref()
    }

    pub fn filter(&self) -> &dyn Filter<P> {
        self.filter.as_ref()
    }

    pub fn parse_tag(tag: &Tag, data: &DataMap<P>) -> Result<Box<dyn Mover<P>>, EngineError> {
        let mover = data.mover(&tag.require_string("mover_name")?)?;
        let filter = data.filter(&tag.get_string("filter_name", FALSE_FILTER_NAME)?)?;
        let max_iterations = tag.get_usize("iterations", DEFAULT_MAX_ITERATIONS)?;
        let drift = tag.get_bool("drift", true)?;
        let ms_whenfail: MoverStatus = tag.get_string("ms_whenfail", "MS_SUCCESS")?.parse()?;

        let looped = Self::from_parts(mover, filter)?
            .named(tag.name())
            .with_max_iterations(max_iterations)
            .with_drift(drift)
            .with_ms_whenfail(ms_whenfail);
        info!(
            name = tag.name(),
            mover = looped.mover.name(),
            filter = looped.filter.name(),
            max_iterations,
            drift,
            %ms_whenfail,
            "Configured LoopOver."
        );
        Ok(Box::new(looped))
    }
}

fn check_single_output<P: Pose>(mover: &dyn Mover<P>) -> Result<(), EngineError> {
    if mover.has_additional_output() {
        return Err(EngineError::MultipleOutputUnsupported {
            mover: mover.name().to_string(),
        });
    }
    Ok(())
}

impl<P: Pose> Mover<P> for LoopOver<P> {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn apply(&mut self, pose: &mut P) -> Result<MoverStatus, EngineError> {
        check_single_output(self.mover.as_ref())?;
        self.base.clear_info();

        let checkpoint = pose.clone();
        let mut passed = false;
        let mut count = 0;
        while !passed && count < self.max_iterations {
            if !self.drift {
                *pose = checkpoint.clone();
            }
            self.mover.clear_info();
            let status = match self.mover.apply(pose) {
                Ok(status) => status,
                Err(e) => {
                    if !self.drift {
                        *pose = checkpoint;
                    }
                    return Err(e);
                }
            };
            self.base.info_mut().extend_from_slice(self.mover.info());
            if status.is_success() {
                passed = self.filter.apply(pose);
            }
            count += 1;
            debug!(
                loop_over = self.base.name(),
                iteration = count,
                %status,
                passed,
                "Loop iteration."
            );
        }

        let status = if passed {
            MoverStatus::Success
        } else {
            if !self.drift {
                *pose = checkpoint;
            }
            self.ms_whenfail
        };
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
        self.mover.set_current_tag(tag);
    }

    fn set_native_pose(&mut self, pose: Option<Arc<P>>) {
        self.mover.set_native_pose(pose);
    }
}
