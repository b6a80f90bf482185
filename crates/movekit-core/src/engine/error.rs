use crate::core::status::StatusParseError;
use crate::core::tag::TagError;
use rand::distributions::WeightedError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Cannot apply '{container}': it holds no movers")]
    EmptyContainer { container: String },

    #[error("SwitchMover '{switch}' could not resolve selected mover '{selected}'")]
    UnresolvedSelection { switch: String, selected: String },

    #[error("Movers returning multiple poses are unsupported by LoopOver (mover '{mover}')")]
    MultipleOutputUnsupported { mover: String },

    #[error("Weighted draw failed in '{mover}': {source}")]
    Sampling {
        mover: String,
        #[source]
        source: WeightedError,
    },

    #[error("No mover type registered under keyname '{0}'")]
    UnknownMoverType(String),

    #[error("No filter type registered under keyname '{0}'")]
    UnknownFilterType(String),

    #[error("Mover '{0}' has not been defined")]
    MoverNotFound(String),

    #[error("Filter '{0}' has not been defined")]
    FilterNotFound(String),

    #[error("The name '{0}' is already defined")]
    DuplicateName(String),

    #[error("Invalid configuration for '{tag}': {reason}")]
    InvalidConfiguration { tag: String, reason: String },

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    Status(#[from] StatusParseError),
}
