use super::pose::Pose;
use super::tag::Tag;
use crate::engine::error::EngineError;
use crate::engine::factory::DataMap;
use rand::{Rng, thread_rng};
use std::fmt;
use std::sync::Arc;

pub const TRUE_FILTER_NAME: &str = "true_filter";
pub const FALSE_FILTER_NAME: &str = "false_filter";

pub const TRUE_FILTER_KEYNAME: &str = "TrueFilter";
pub const FALSE_FILTER_KEYNAME: &str = "FalseFilter";
pub const STOCHASTIC_FILTER_KEYNAME: &str = "StochasticFilter";

/// Deep-copy support for boxed filters.
pub trait FilterClone<P: Pose> {
    fn box_clone(&self) -> Box<dyn Filter<P>>;
}

impl<P, F> FilterClone<P> for F
where
    P: Pose,
    F: Filter<P> + Clone + 'static,
{
    fn box_clone(&self) -> Box<dyn Filter<P>> {
        Box::new(self.clone())
    }
}

/// A read-only pass/fail predicate over a pose.
pub trait Filter<P: Pose>: FilterClone<P> + fmt::Debug + Send {
    fn name(&self) -> &str;

    fn apply(&self, pose: &P) -> bool;
}

impl<P: Pose> Clone for Box<dyn Filter<P>> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Always passes.
#[derive(Debug, Clone)]
pub struct TrueFilter {
    name: String,
}

impl TrueFilter {
    pub fn new() -> Self {
        Self::named(TRUE_FILTER_NAME)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn parse_tag<P: Pose>(
        tag: &Tag,
        _data: &DataMap<P>,
    ) -> Result<Box<dyn Filter<P>>, EngineError> {
        Ok(Box::new(Self::named(tag.name())))
    }
}

impl Default for TrueFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pose> Filter<P> for TrueFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, _pose: &P) -> bool {
        true
    }
}

/// Never passes. The default condition of `LoopOver`, which then runs for its full budget.
#[derive(Debug, Clone)]
pub struct FalseFilter {
    name: String,
}

impl FalseFilter {
    pub fn new() -> Self {
        Self::named(FALSE_FILTER_NAME)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn parse_tag<P: Pose>(
        tag: &Tag,
        _data: &DataMap<P>,
    ) -> Result<Box<dyn Filter<P>>, EngineError> {
        Ok(Box::new(Self::named(tag.name())))
    }
}

impl Default for FalseFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pose> Filter<P> for FalseFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, _pose: &P) -> bool {
        false
    }
}

/// Passes with probability `confidence`, independently on every evaluation.
#[derive(Debug, Clone)]
pub struct StochasticFilter {
    name: String,
    confidence: f64,
}

impl StochasticFilter {
    pub fn new(name: impl Into<String>, confidence: f64) -> Result<Self, EngineError> {
        let name = name.into();
        if !(0.0..=1.0).contains(&confidence) {
            return Err(EngineError::InvalidConfiguration {
                tag: name,
                reason: format!("confidence must lie in [0, 1], got {}", confidence),
            });
        }
        Ok(Self { name, confidence })
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn parse_tag<P: Pose>(
        tag: &Tag,
        _data: &DataMap<P>,
    ) -> Result<Box<dyn Filter<P>>, EngineError> {
        let confidence = tag.get_real("confidence", 1.0)?;
        Ok(Box::new(Self::new(tag.name(), confidence)?))
    }
}

impl<P: Pose> Filter<P> for StochasticFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, _pose: &P) -> bool {
        if self.confidence >= 1.0 {
            return true;
        }
        thread_rng().gen_bool(self.confidence)
    }
}

pub type Predicate<P> = Arc<dyn Fn(&P) -> bool + Send + Sync>;

/// A filter backed by a closure, for conditions defined in code rather than in a script.
#[derive(Clone)]
pub struct PredicateFilter<P: Pose> {
    name: String,
    predicate: Predicate<P>,
}

impl<P: Pose> PredicateFilter<P> {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl<P: Pose> fmt::Debug for PredicateFilter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateFilter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<P: Pose> Filter<P> for PredicateFilter<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, pose: &P) -> bool {
        (self.predicate)(pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_filters_ignore_the_pose() {
        let pose = 42_i32;
        assert!(Filter::<i32>::apply(&TrueFilter::new(), &pose));
        assert!(!Filter::<i32>::apply(&FalseFilter::new(), &pose));
    }

    #[test]
    fn constant_filters_use_their_registered_names_by_default() {
        assert_eq!(Filter::<i32>::name(&TrueFilter::new()), TRUE_FILTER_NAME);
        assert_eq!(Filter::<i32>::name(&FalseFilter::new()), FALSE_FILTER_NAME);
    }

    #[test]
    fn stochastic_filter_rejects_out_of_range_confidence() {
        assert!(StochasticFilter::new("coin", 1.5).is_err());
        assert!(StochasticFilter::new("coin", -0.1).is_err());
        assert!(StochasticFilter::new("coin", 0.5).is_ok());
    }

    #[test]
    fn stochastic_filter_extremes_are_deterministic() {
        let always = StochasticFilter::new("always", 1.0).unwrap();
        let never = StochasticFilter::new("never", 0.0).unwrap();
        for _ in 0..100 {
            assert!(Filter::<()>::apply(&always, &()));
            assert!(!Filter::<()>::apply(&never, &()));
        }
    }

    #[test]
    fn stochastic_filter_pass_rate_tracks_confidence() {
        let filter = StochasticFilter::new("coin", 0.3).unwrap();
        let passes = (0..10_000)
            .filter(|_| Filter::<()>::apply(&filter, &()))
            .count();
        let rate = passes as f64 / 10_000.0;
        assert!((rate - 0.3).abs() < 0.03, "pass rate was {}", rate);
    }

    #[test]
    fn predicate_filter_evaluates_closure_against_pose() {
        let filter = PredicateFilter::new("short", |pose: &Vec<u8>| pose.len() < 3);
        assert!(filter.apply(&vec![1, 2]));
        assert!(!filter.apply(&vec![1, 2, 3]));
    }

    #[test]
    fn boxed_filters_clone_with_their_names() {
        let filter: Box<dyn Filter<Vec<u8>>> =
            Box::new(PredicateFilter::new("nonempty", |pose: &Vec<u8>| !pose.is_empty()));
        let copy = filter.clone();
        assert_eq!(copy.name(), "nonempty");
        assert!(copy.apply(&vec![0]));
    }
}
