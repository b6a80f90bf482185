use crate::cli::ScriptArgs;
use crate::error::{CliError, Result};
use movekit::core::tag::TagValue;
use movekit::workflows::script::Script;
use tracing::{debug, info};

const PROTOCOL_TARGET: &str = "protocol";

/// A single `-S TAG.OPTION=VALUE` override.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptOverride {
    pub target: String,
    pub key: String,
    pub value: TagValue,
}

pub fn parse_set_value(kv_pair: &str) -> Result<ScriptOverride> {
    let Some((path, value_str)) = kv_pair.split_once('=') else {
        return Err(CliError::Config(format!(
            "Invalid --set format: '{}'. Expected TAG.OPTION=VALUE.",
            kv_pair
        )));
    };
    let Some((target, key)) = path.trim().split_once('.') else {
        return Err(CliError::Config(format!(
            "Invalid --set key: '{}'. Expected TAG.OPTION.",
            path
        )));
    };
    if target.is_empty() || key.is_empty() {
        return Err(CliError::Config(format!(
            "Invalid --set key: '{}'. Neither the tag nor the option may be empty.",
            path
        )));
    }
    Ok(ScriptOverride {
        target: target.to_string(),
        key: key.to_string(),
        value: TagValue::parse_loose(value_str),
    })
}

fn apply_override(script: &mut Script, over: ScriptOverride) -> Result<()> {
    if over.target != PROTOCOL_TARGET {
        script.set_option(&over.target, &over.key, over.value)?;
        return Ok(());
    }
    match (over.key.as_str(), over.value) {
        ("use_mover_status", value) => match value.as_bool() {
            Some(flag) => {
                script.protocol.use_mover_status = flag;
                Ok(())
            }
            None => Err(CliError::Config(format!(
                "Invalid value '{}' for protocol option 'use_mover_status'.",
                value
            ))),
        },
        ("movers", value) => {
            script.protocol.movers = value
                .to_string()
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
            Ok(())
        }
        (key, value) => Err(CliError::Config(format!(
            "Invalid value '{}' for protocol option '{}'.",
            value, key
        ))),
    }
}

/// Loads the script named on the command line and applies every `-S` override in order.
pub fn load_script(args: &ScriptArgs) -> Result<Script> {
    info!("Loading protocol script from {:?}", &args.script);
    let mut script = Script::from_file(&args.script)?;
    for kv_pair in &args.set_values {
        let over = parse_set_value(kv_pair)?;
        debug!(tag = %over.target, key = %over.key, value = %over.value, "Applying override.");
        apply_override(&mut script, over)?;
    }
    Ok(script)
}
