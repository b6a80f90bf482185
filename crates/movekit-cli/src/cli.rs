use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "MoveKit Developers",
    version,
    about = "MoveKit CLI - Check and dry-run protocol scripts built from movers, filters and retry loops.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to run trials in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a protocol script, build every mover and filter, and print the protocol.
    Check(CheckArgs),
    /// Run a protocol script over many independent trials and report the final statuses.
    Run(RunArgs),
}

/// Arguments shared by every command that loads a script.
#[derive(Args, Debug, Clone)]
pub struct ScriptArgs {
    /// Path to the protocol script in TOML format.
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Override an option of a named tag in the script.
    /// Can be used multiple times. Example: -S retry.iterations=25
    #[arg(short = 'S', long = "set", value_name = "TAG.OPTION=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub script: ScriptArgs,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub script: ScriptArgs,

    /// Number of independent trials to run.
    #[arg(short = 'n', long, default_value_t = 10, value_name = "INT")]
    pub trials: usize,

    /// Print the diagnostic trace recorded by every trial.
    #[arg(long)]
    pub show_trace: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_command_parses_trials_and_overrides() {
        let cli = Cli::try_parse_from([
            "movekit",
            "run",
            "protocol.toml",
            "-n",
            "25",
            "-S",
            "retry.iterations=3",
            "-S",
            "coin.confidence=0.5",
            "-j",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.threads, Some(2));
        let Commands::Run(args) = cli.command else {
            panic!("expected the run command");
        };
        assert_eq!(args.trials, 25);
        assert_eq!(args.script.script, PathBuf::from("protocol.toml"));
        assert_eq!(
            args.script.set_values,
            vec!["retry.iterations=3", "coin.confidence=0.5"]
        );
        assert!(!args.show_trace);
    }

    #[test]
    fn run_command_defaults_to_ten_trials() {
        let cli = Cli::try_parse_from(["movekit", "run", "p.toml"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected the run command");
        };
        assert_eq!(args.trials, 10);
    }

    #[test]
    fn global_flags_apply_to_check() {
        let cli = Cli::try_parse_from(["movekit", "check", "p.toml", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["movekit", "-q", "-v", "check", "p.toml"]);
        assert!(result.is_err());
    }
}
