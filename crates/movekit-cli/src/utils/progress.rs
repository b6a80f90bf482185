use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use movekit::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
    failures: Arc<Mutex<u64>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new(0).with_message("Initializing...");
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
            failures: Arc::new(Mutex::new(0)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();
        let failures_clone = self.failures.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::RunStart { total_trials } => {
                    if let Ok(mut failures) = failures_clone.lock() {
                        *failures = 0;
                    }
                    pb_guard.reset();
                    pb_guard.set_length(total_trials);
                    pb_guard.set_position(0);
                    pb_guard.set_style(Self::bar_style());
                    pb_guard.set_message("Running trials");
                }
                Progress::TrialFinished { status } => {
                    if !status.is_success() {
                        if let Ok(mut failures) = failures_clone.lock() {
                            *failures += 1;
                            pb_guard.set_message(format!("Running trials ({} failed)", *failures));
                        }
                    }
                    pb_guard.inc(1);
                }
                Progress::RunFinish => {
                    let total = pb_guard.length().unwrap_or(0);
                    if pb_guard.position() < total {
                        pb_guard.set_position(total);
                    }
                    pb_guard.finish_with_message("✓ Trials complete");
                }
                Progress::Message(msg) => {
                    if !pb_guard.is_finished() {
                        pb_guard.println(format!("  {}", msg));
                    } else {
                        pb_guard.set_message(msg);
                    }
                }
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<28} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movekit::core::status::MoverStatus;
    use std::thread;

    fn hidden_handler() -> CliProgressHandler {
        CliProgressHandler::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = hidden_handler();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_tracks_trials_and_failures() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::RunStart { total_trials: 4 });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(4));
            assert_eq!(pb.position(), 0);
            assert!(!pb.is_finished());
        }

        callback(Progress::TrialFinished {
            status: MoverStatus::Success,
        });
        callback(Progress::TrialFinished {
            status: MoverStatus::FailRetry,
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.position(), 2);
            assert_eq!(pb.message(), "Running trials (1 failed)");
        }

        callback(Progress::RunFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.position(), 4);
            assert_eq!(pb.message(), "✓ Trials complete");
        }
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::RunStart { total_trials: 2 });
            callback(Progress::TrialFinished {
                status: MoverStatus::Success,
            });
            callback(Progress::RunFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(*handler.failures.lock().unwrap(), 0);
    }
}
