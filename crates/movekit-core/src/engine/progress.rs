use crate::core::status::MoverStatus;

#[derive(Debug, Clone)]
pub enum Progress {
    RunStart { total_trials: u64 },
    TrialFinished { status: MoverStatus },
    RunFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::RunStart { total_trials: 3 });
        reporter.report(Progress::RunFinish);
    }

    #[test]
    fn reporter_forwards_events_to_callback() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            seen.lock().unwrap().push(format!("{:?}", event));
        }));

        reporter.report(Progress::RunStart { total_trials: 2 });
        reporter.report(Progress::TrialFinished {
            status: MoverStatus::FailRetry,
        });
        reporter.report(Progress::Message("halfway".to_string()));
        reporter.report(Progress::RunFinish);
        drop(reporter);

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], "RunStart { total_trials: 2 }");
        assert_eq!(seen[1], "TrialFinished { status: FailRetry }");
        assert_eq!(seen[3], "RunFinish");
    }
}
