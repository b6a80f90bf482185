use crate::cli::CheckArgs;
use crate::config::load_script;
use crate::error::Result;
use movekit::workflows::protocol::Protocol;
use movekit::workflows::script::Script;
use std::fmt::Write;
use tracing::info;

pub fn run(args: CheckArgs) -> Result<()> {
    let script = load_script(&args.script)?;

    info!("Building protocol to validate every tag...");
    let protocol = script.build::<()>()?;

    print!("{}", describe(&script, &protocol));
    println!("✓ Script is valid.");
    Ok(())
}

/// Renders the tags of a script and the protocol built from it.
pub fn describe(script: &Script, protocol: &Protocol<()>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Filters ({}):", script.filters.len());
    for tag in &script.filters {
        let _ = writeln!(out, "  {} [{}]", tag.name(), tag.type_name());
    }
    let _ = writeln!(out, "Movers ({}):", script.movers.len());
    for tag in &script.movers {
        let _ = writeln!(out, "  {} [{}]", tag.name(), tag.type_name());
    }
    let _ = writeln!(out, "Protocol: {}", protocol);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ScriptArgs;
    use crate::error::CliError;
    use movekit::engine::error::EngineError;
    use movekit::workflows::script::ScriptError;
    use std::fs;

    fn check_args(path: std::path::PathBuf) -> CheckArgs {
        CheckArgs {
            script: ScriptArgs {
                script: path,
                set_values: Vec::new(),
            },
        }
    }

    #[test]
    fn describe_lists_tags_and_protocol_steps() {
        let script = Script::from_toml(
            r#"
[[filters]]
type = "StochasticFilter"
name = "coin"

[[movers]]
type = "NullMover"
name = "noop"

[protocol]
movers = ["noop", "noop"]
use_mover_status = true
"#,
        )
        .unwrap();
        let protocol = script.build::<()>().unwrap();

        let text = describe(&script, &protocol);

        assert!(text.contains("Filters (1):\n  coin [StochasticFilter]\n"));
        assert!(text.contains("Movers (1):\n  noop [NullMover]\n"));
        assert!(text.contains(
            "Protocol: protocol [noop (weight 1), noop (weight 1)] (stops on first failure)"
        ));
    }

    #[test]
    fn run_reports_build_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(
            &path,
            "[[movers]]\ntype = \"WarpMover\"\nname = \"w\"\n[protocol]\nmovers = [\"w\"]\n",
        )
        .unwrap();

        let result = run(check_args(path));
        assert!(matches!(
            result,
            Err(CliError::Script(ScriptError::Engine(EngineError::UnknownMoverType(_))))
        ));
    }

    #[test]
    fn run_accepts_a_valid_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.toml");
        fs::write(
            &path,
            "[[movers]]\ntype = \"NullMover\"\nname = \"n\"\n[protocol]\nmovers = [\"n\"]\n",
        )
        .unwrap();

        assert!(run(check_args(path)).is_ok());
    }
}
