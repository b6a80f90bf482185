use crate::cli::RunArgs;
use crate::config::load_script;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use movekit::core::status::MoverStatus;
use movekit::engine::progress::ProgressReporter;
use movekit::workflows::protocol::{TrialSummary, run_trials};
use std::fmt::Write;
use tracing::{info, warn};

pub fn run(args: RunArgs) -> Result<()> {
    if args.trials == 0 {
        return Err(CliError::Argument("--trials must be at least 1".to_string()));
    }

    let script = load_script(&args.script)?;
    let protocol = script.build::<()>()?;
    info!("Built protocol: {}", protocol);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Running {} trial(s)...", args.trials);
    let summary = run_trials(&protocol, &(), args.trials, &reporter)?;

    if summary.successes() == 0 {
        warn!("No trial finished with MS_SUCCESS.");
    }
    if args.show_trace {
        print!("{}", render_traces(&summary));
    }
    print!("{}", render_histogram(&summary));
    Ok(())
}

/// One line per status, in status order, with the count and share of trials.
pub fn render_histogram(summary: &TrialSummary<()>) -> String {
    let total = summary.trials.len();
    let counts = summary.status_counts();
    let mut out = String::new();
    let _ = writeln!(out, "Final status of {} trial(s):", total);
    for status in MoverStatus::ALL {
        let count = counts.get(&status).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        let share = 100.0 * count as f64 / total as f64;
        let _ = writeln!(out, "  {:<18} {:>6} ({:>5.1}%)", status, count, share);
    }
    out
}

pub fn render_traces(summary: &TrialSummary<()>) -> String {
    let mut out = String::new();
    for trial in &summary.trials {
        let _ = writeln!(out, "{} -> {}", trial.tag, trial.status);
        for record in &trial.info {
            let _ = writeln!(out, "    {}", record);
        }
    }
    out
}
