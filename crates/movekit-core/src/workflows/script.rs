use super::protocol::Protocol;
use crate::core::pose::Pose;
use crate::core::tag::{Tag, TagValue};
use crate::engine::container::ContainerMover;
use crate::engine::error::EngineError;
use crate::engine::factory::{DataMap, FilterFactory, MoverFactory};
use crate::engine::sequence::SequenceMover;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

pub const PROTOCOL_NAME: &str = "protocol";

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("No filter or mover named '{0}' is defined in the script")]
    UnknownTag(String),
    #[error("The protocol section does not list any movers")]
    EmptyProtocol,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// The top-level `[protocol]` table: movers run in order on every trial.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtocolSpec {
    pub movers: Vec<String>,
    #[serde(default)]
    pub use_mover_status: bool,
}

/// A parsed protocol script.
///
/// Tags are kept in declaration order: a tag may only refer to filters and movers declared
/// above it, and all filters are built before any mover.
///
/// ```toml
/// [[filters]]
/// type = "StochasticFilter"
/// name = "coin"
/// confidence = 0.3
///
/// [[movers]]
/// type = "NullMover"
/// name = "noop"
///
/// [[movers]]
/// type = "LoopOver"
/// name = "retry"
/// mover_name = "noop"
/// filter_name = "coin"
///
/// [protocol]
/// movers = ["retry"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub filters: Vec<Tag>,
    #[serde(default)]
    pub movers: Vec<Tag>,
    pub protocol: ProtocolSpec,
}

impl Script {
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScriptError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let script: Script = toml::from_str(&content).map_err(|e| ScriptError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        debug!(
            path = %path.display(),
            filters = script.filters.len(),
            movers = script.movers.len(),
            "Loaded protocol script."
        );
        Ok(script)
    }

    pub fn from_toml(content: &str) -> Result<Self, ScriptError> {
        toml::from_str(content).map_err(|e| ScriptError::Toml {
            path: "<inline>".to_string(),
            source: e,
        })
    }

    /// Looks up a filter or mover tag by its instance name.
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.filters
            .iter()
            .chain(&self.movers)
            .find(|tag| tag.name() == name)
    }

    fn tag_mut(&mut self, name: &str) -> Option<&mut Tag> {
        self.filters
            .iter_mut()
            .chain(self.movers.iter_mut())
            .find(|tag| tag.name() == name)
    }

    /// Replaces (or adds) option `key` on the tag named `name`.
    pub fn set_option(
        &mut self,
        name: &str,
        key: &str,
        value: impl Into<TagValue>,
    ) -> Result<(), ScriptError> {
        let tag = self
            .tag_mut(name)
            .ok_or_else(|| ScriptError::UnknownTag(name.to_string()))?;
        tag.set_option(key, value);
        Ok(())
    }

    /// Builds the protocol with the standard mover and filter types.
    pub fn build<P: Pose>(&self) -> Result<Protocol<P>, ScriptError> {
        self.build_with(&MoverFactory::with_builtins(), &FilterFactory::with_builtins())
    }

    /// Builds the protocol, resolving tag types through the given factories.
    pub fn build_with<P: Pose>(
        &self,
        movers: &MoverFactory<P>,
        filters: &FilterFactory<P>,
    ) -> Result<Protocol<P>, ScriptError> {
        if self.protocol.movers.is_empty() {
            return Err(ScriptError::EmptyProtocol);
        }

        let mut data = DataMap::new();
        for tag in &self.filters {
            let filter = filters.create(tag, &data)?;
            data.add_filter(tag.name(), filter)?;
        }
        for tag in &self.movers {
            let mover = movers.create(tag, &data)?;
            data.add_mover(tag.name(), mover)?;
        }

        let mut root = SequenceMover::new(self.protocol.use_mover_status).named(PROTOCOL_NAME);
        for name in &self.protocol.movers {
            root.container_mut().push_owned(data.mover(name)?, 1.0);
        }
        info!(
            filters = self.filters.len(),
            movers = self.movers.len(),
            steps = root.size(),
            "Built protocol from script."
        );
        Ok(Protocol::new(root, data))
    }
}

impl FromStr for Script {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_toml(s)
    }
}
