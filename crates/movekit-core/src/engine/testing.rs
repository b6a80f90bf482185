use super::error::EngineError;
use crate::core::filter::Filter;
use crate::core::mover::{Mover, MoverBase};
use crate::core::status::MoverStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) type TracePose = Vec<String>;

/// Appends its label to the pose on every apply and reports a fixed status.
///
/// Its trace records the current tag and native pose it was handed, if any.
#[derive(Debug, Clone)]
pub(crate) struct TraceMover {
    base: MoverBase,
    status: MoverStatus,
    additional_output: bool,
    density_ratio: f64,
    applications: usize,
    native_pose: Option<Arc<TracePose>>,
}

impl TraceMover {
    pub(crate) fn new(label: &str) -> Self {
        Self {
            base: MoverBase::new(label),
            status: MoverStatus::Success,
            additional_output: false,
            density_ratio: 1.0,
            applications: 0,
            native_pose: None,
        }
    }

    pub(crate) fn with_status(mut self, status: MoverStatus) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn with_additional_output(mut self) -> Self {
        self.additional_output = true;
        self
    }

    pub(crate) fn with_density_ratio(mut self, ratio: f64) -> Self {
        self.density_ratio = ratio;
        self
    }

    pub(crate) fn applications(&self) -> usize {
        self.applications
    }
}

impl Mover<TracePose> for TraceMover {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn apply(&mut self, pose: &mut TracePose) -> Result<MoverStatus, EngineError> {
        let label = self.base.name().to_string();
        pose.push(label.clone());
        self.applications += 1;
        self.base.info_mut().push(format!("{} applied", label));
        if !self.base.current_tag().is_empty() {
            let record = format!("{} tag {}", label, self.base.current_tag());
            self.base.info_mut().push(record);
        }
        if let Some(native) = &self.native_pose {
            let record = format!("{} native {:?}", label, native);
            self.base.info_mut().push(record);
        }
        self.base.set_last_status(self.status);
        Ok(self.status)
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

    fn has_additional_output(&self) -> bool {
        self.additional_output
    }

    fn last_proposal_density_ratio(&self) -> f64 {
        self.density_ratio
    }

    fn set_current_tag(&mut self, tag: &str) {
        self.base.set_current_tag(tag);
    }

    fn set_native_pose(&mut self, pose: Option<Arc<TracePose>>) {
        self.native_pose = pose;
    }
}

/// Fails its first `pass_after` evaluations and passes from then on.
///
/// The evaluation counter is shared between clones so tests can observe evaluations made
/// by the copy a loop owns.
#[derive(Debug, Clone)]
pub(crate) struct ThresholdFilter {
    pass_after: usize,
    evaluations: Arc<AtomicUsize>,
}

impl ThresholdFilter {
    pub(crate) fn new(pass_after: usize) -> Self {
        Self {
            pass_after,
            evaluations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn never() -> Self {
        Self::new(usize::MAX)
    }

    pub(crate) fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

impl Filter<TracePose> for ThresholdFilter {
    fn name(&self) -> &str {
        "threshold"
    }

    fn apply(&self, _pose: &TracePose) -> bool {
        let seen = self.evaluations.fetch_add(1, Ordering::SeqCst);
        seen >= self.pass_after
    }
}
