use crate::core::mover::Mover;
use crate::core::pose::Pose;
use crate::core::status::MoverStatus;
use crate::engine::container::ContainerMover;
use crate::engine::error::EngineError;
use crate::engine::factory::DataMap;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::sequence::SequenceMover;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// A built protocol: the top-level sequence plus every named mover and filter it was built from.
#[derive(Debug, Clone)]
pub struct Protocol<P: Pose> {
    root: SequenceMover<P>,
    data: DataMap<P>,
}

impl<P: Pose> Protocol<P> {
    pub fn new(root: SequenceMover<P>, data: DataMap<P>) -> Self {
        Self { root, data }
    }

    pub fn root(&self) -> &SequenceMover<P> {
        &self.root
    }

    pub fn data(&self) -> &DataMap<P> {
        &self.data
    }

    pub fn steps(&self) -> Vec<String> {
        self.root.container().mover_names()
    }

    pub fn apply(&mut self, pose: &mut P) -> Result<MoverStatus, EngineError> {
        self.root.apply(pose)
    }
}

impl<P: Pose> fmt::Display for Protocol<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root.name(), self.root.container())?;
        if self.root.use_mover_status() {
            write!(f, " (stops on first failure)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TrialOutcome<P: Pose> {
    pub tag: String,
    pub status: MoverStatus,
    pub info: Vec<String>,
    pub pose: P,
}

#[derive(Debug, Clone)]
pub struct TrialSummary<P: Pose> {
    pub trials: Vec<TrialOutcome<P>>,
}

impl<P: Pose> TrialSummary<P> {
    /// Number of trials per final status. Statuses that never occurred are omitted.
    pub fn status_counts(&self) -> BTreeMap<MoverStatus, usize> {
        let mut counts = BTreeMap::new();
        for trial in &self.trials {
            *counts.entry(trial.status).or_insert(0) += 1;
        }
        counts
    }

    pub fn successes(&self) -> usize {
        self.trials.iter().filter(|t| t.status.is_success()).count()
    }

    pub fn success_rate(&self) -> f64 {
        if self.trials.is_empty() {
            return 0.0;
        }
        self.successes() as f64 / self.trials.len() as f64
    }
}

pub fn trial_tag(index: usize) -> String {
    format!("trial_{:04}", index + 1)
}

/// Runs `trials` independent copies of `protocol`, each on its own copy of `pose`.
///
/// Every trial gets a deep clone of the whole mover tree, so trials share no cursor, cache
/// or diagnostic state and can run on separate threads. The input pose is handed to every
/// trial as its native (reference) pose. Outcomes are returned in trial order.
///
/// # Errors
///
/// The first configuration error raised by any trial aborts the run. Every trial that hits one
/// reports it as a [`Progress::Message`] before the run unwinds.
#[instrument(skip_all, name = "trials_workflow", fields(trials = trials))]
pub fn run_trials<P: Pose>(
    protocol: &Protocol<P>,
    pose: &P,
    trials: usize,
    reporter: &ProgressReporter,
) -> Result<TrialSummary<P>, EngineError> {
    reporter.report(Progress::RunStart {
        total_trials: trials as u64,
    });
    info!(steps = ?protocol.steps(), "Starting protocol trials.");

    let native = Arc::new(pose.clone());
    let jobs: Vec<(String, SequenceMover<P>, P)> = (0..trials)
        .map(|index| (trial_tag(index), protocol.root.clone(), pose.clone()))
        .collect();

    let trials = jobs
        .into_par_iter()
        .map(|(tag, mut mover, mut pose)| {
            mover.set_current_tag(&tag);
            mover.set_native_pose(Some(Arc::clone(&native)));
            let status = mover.apply(&mut pose).inspect_err(|e| {
                reporter.report(Progress::Message(format!("{} aborted: {}", tag, e)));
            })?;
            reporter.report(Progress::TrialFinished { status });
            Ok(TrialOutcome {
                tag,
                status,
                info: mover.info().to_vec(),
                pose,
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    reporter.report(Progress::RunFinish);
    let summary = TrialSummary { trials };
    info!(
        "Protocol trials complete. {}/{} succeeded.",
        summary.successes(),
        summary.trials.len()
    );
    Ok(summary)
}
