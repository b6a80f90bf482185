use super::error::EngineError;
use super::{cycle, loop_over, random, sequence, switch};
use crate::core::filter::{
    FALSE_FILTER_KEYNAME, FALSE_FILTER_NAME, FalseFilter, Filter, STOCHASTIC_FILTER_KEYNAME,
    StochasticFilter, TRUE_FILTER_KEYNAME, TRUE_FILTER_NAME, TrueFilter,
};
use crate::core::mover::{Mover, NULL_MOVER_NAME, NullMover};
use crate::core::pose::Pose;
use crate::core::tag::Tag;
use std::collections::HashMap;
use tracing::debug;

pub type MoverCreator<P> = fn(&Tag, &DataMap<P>) -> Result<Box<dyn Mover<P>>, EngineError>;
pub type FilterCreator<P> = fn(&Tag, &DataMap<P>) -> Result<Box<dyn Filter<P>>, EngineError>;

/// The named movers and filters defined so far while reading a script.
///
/// Every lookup hands out a deep clone, so a mover referenced by several tags is never shared.
/// A fresh map already holds the `true_filter` and `false_filter` instances.
#[derive(Debug, Clone)]
pub struct DataMap<P: Pose> {
    movers: HashMap<String, Box<dyn Mover<P>>>,
    filters: HashMap<String, Box<dyn Filter<P>>>,
    order: Vec<String>,
}

impl<P: Pose> Default for DataMap<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pose> DataMap<P> {
    pub fn new() -> Self {
        let mut filters: HashMap<String, Box<dyn Filter<P>>> = HashMap::new();
        filters.insert(
            TRUE_FILTER_NAME.to_string(),
            Box::new(TrueFilter::named(TRUE_FILTER_NAME)),
        );
        filters.insert(
            FALSE_FILTER_NAME.to_string(),
            Box::new(FalseFilter::named(FALSE_FILTER_NAME)),
        );
        Self {
            movers: HashMap::new(),
            filters,
            order: Vec::new(),
        }
    }

    pub fn add_mover(
        &mut self,
        name: impl Into<String>,
        mover: Box<dyn Mover<P>>,
    ) -> Result<(), EngineError> {
        let name = name.into();
        if self.movers.contains_key(&name) {
            return Err(EngineError::DuplicateName(name));
        }
        self.order.push(name.clone());
        self.movers.insert(name, mover);
        Ok(())
    }

    pub fn add_filter(
        &mut self,
        name: impl Into<String>,
        filter: Box<dyn Filter<P>>,
    ) -> Result<(), EngineError> {
        let name = name.into();
        if self.filters.contains_key(&name) {
            return Err(EngineError::DuplicateName(name));
        }
        self.filters.insert(name, filter);
        Ok(())
    }

    pub fn mover(&self, name: &str) -> Result<Box<dyn Mover<P>>, EngineError> {
        self.movers
            .get(name)
            .map(|m| m.box_clone())
            .ok_or_else(|| EngineError::MoverNotFound(name.to_string()))
    }

    pub fn filter(&self, name: &str) -> Result<Box<dyn Filter<P>>, EngineError> {
        self.filters
            .get(name)
            .map(|f| f.box_clone())
            .ok_or_else(|| EngineError::FilterNotFound(name.to_string()))
    }

    pub fn has_mover(&self, name: &str) -> bool {
        self.movers.contains_key(name)
    }

    pub fn has_filter(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Mover names in the order they were defined.
    pub fn mover_names(&self) -> &[String] {
        &self.order
    }
}

/// Maps mover keynames (the `type` of a tag) to their creators.
#[derive(Debug, Clone)]
pub struct MoverFactory<P: Pose> {
    creators: HashMap<String, MoverCreator<P>>,
}

impl<P: Pose> Default for MoverFactory<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pose> MoverFactory<P> {
    /// An empty factory. Use [`with_builtins`](Self::with_builtins) for the standard movers.
    pub fn new() -> Self {
        Self {
            creators: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register(NULL_MOVER_NAME, NullMover::parse_tag::<P>);
        factory.register(sequence::MOVER_NAME, sequence::SequenceMover::parse_tag);
        factory.register(random::MOVER_NAME, random::RandomMover::parse_tag);
        factory.register(cycle::MOVER_NAME, cycle::CycleMover::parse_tag);
        factory.register(switch::MOVER_NAME, switch::SwitchMover::parse_tag);
        factory.register(loop_over::MOVER_NAME, loop_over::LoopOver::parse_tag);
        factory
    }

    /// Registers `creator` under `keyname`, replacing any earlier registration.
    pub fn register(&mut self, keyname: impl Into<String>, creator: MoverCreator<P>) {
        self.creators.insert(keyname.into(), creator);
    }

    pub fn create(&self, tag: &Tag, data: &DataMap<P>) -> Result<Box<dyn Mover<P>>, EngineError> {
        let creator = self
            .creators
            .get(tag.type_name())
            .ok_or_else(|| EngineError::UnknownMoverType(tag.type_name().to_string()))?;
        debug!(keyname = tag.type_name(), name = tag.name(), "Creating mover.");
        creator(tag, data)
    }

    pub fn keynames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.creators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Maps filter keynames to their creators.
#[derive(Debug, Clone)]
pub struct FilterFactory<P: Pose> {
    creators: HashMap<String, FilterCreator<P>>,
}

impl<P: Pose> Default for FilterFactory<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pose> FilterFactory<P> {
    pub fn new() -> Self {
        Self {
            creators: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register(TRUE_FILTER_KEYNAME, TrueFilter::parse_tag::<P>);
        factory.register(FALSE_FILTER_KEYNAME, FalseFilter::parse_tag::<P>);
        factory.register(STOCHASTIC_FILTER_KEYNAME, StochasticFilter::parse_tag::<P>);
        factory
    }

    pub fn register(&mut self, keyname: impl Into<String>, creator: FilterCreator<P>) {
        self.creators.insert(keyname.into(), creator);
    }

    pub fn create(&self, tag: &Tag, data: &DataMap<P>) -> Result<Box<dyn Filter<P>>, EngineError> {
        let creator = self
            .creators
            .get(tag.type_name())
            .ok_or_else(|| EngineError::UnknownFilterType(tag.type_name().to_string()))?;
        debug!(keyname = tag.type_name(), name = tag.name(), "Creating filter.");
        creator(tag, data)
    }

    pub fn keynames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.creators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
