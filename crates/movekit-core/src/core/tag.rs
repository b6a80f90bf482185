use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single option value attached to a tag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<TagValue>),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Bool(b) => write!(f, "{}", b),
            TagValue::Integer(i) => write!(f, "{}", i),
            TagValue::Float(x) => write!(f, "{}", x),
            TagValue::String(s) => f.write_str(s),
            TagValue::List(items) => {
                let joined: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Bool(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Integer(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Float(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::String(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::String(value)
    }
}

impl<T: Into<TagValue>> From<Vec<T>> for TagValue {
    fn from(values: Vec<T>) -> Self {
        TagValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl TagValue {
    /// Interprets a raw command-line string: booleans and numbers first, text otherwise.
    pub fn parse_loose(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(b) = raw.parse::<bool>() {
            TagValue::Bool(b)
        } else if let Ok(i) = raw.parse::<i64>() {
            TagValue::Integer(i)
        } else if let Ok(x) = raw.parse::<f64>() {
            TagValue::Float(x)
        } else {
            TagValue::String(raw.to_string())
        }
    }

    /// Boolean reading shared by tag options and command-line overrides: `true`/`false`,
    /// `1`/`0` and `yes`/`no`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TagValue::Bool(b) => Some(*b),
            TagValue::Integer(0) => Some(false),
            TagValue::Integer(1) => Some(true),
            TagValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TagError {
    #[error("Tag '{tag}' is missing required option '{key}'")]
    MissingOption { tag: String, key: String },

    #[error("Option '{key}' of tag '{tag}' must be {expected}, got '{value}'")]
    InvalidOption {
        tag: String,
        key: String,
        expected: &'static str,
        value: String,
    },
}

/// A configuration element describing one mover or filter.
///
/// `type` selects the factory creator, `name` is the instance name other tags refer to, and
/// every other key is an option the creator reads through the typed accessors below.
///
/// ```toml
/// [[movers]]
/// type = "LoopOver"
/// name = "retry"
/// mover_name = "perturb"
/// iterations = 20
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tag {
    #[serde(rename = "type")]
    type_name: String,
    name: String,
    #[serde(flatten)]
    options: BTreeMap<String, TagValue>,
}

impl Tag {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<TagValue>) {
        self.options.insert(key.into(), value.into());
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_option(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn invalid(&self, key: &str, expected: &'static str, value: &TagValue) -> TagError {
        TagError::InvalidOption {
            tag: self.name.clone(),
            key: key.to_string(),
            expected,
            value: value.to_string(),
        }
    }

    fn missing(&self, key: &str) -> TagError {
        TagError::MissingOption {
            tag: self.name.clone(),
            key: key.to_string(),
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, TagError> {
        let Some(value) = self.options.get(key) else {
            return Ok(default);
        };
        value
            .as_bool()
            .ok_or_else(|| self.invalid(key, "a boolean", value))
    }

    pub fn get_usize(&self, key: &str, default: usize) -> Result<usize, TagError> {
        let Some(value) = self.options.get(key) else {
            return Ok(default);
        };
        self.scalar_as(key, value, "a non-negative integer")
    }

    pub fn get_real(&self, key: &str, default: f64) -> Result<f64, TagError> {
        let Some(value) = self.options.get(key) else {
            return Ok(default);
        };
        match value {
            TagValue::Float(x) => Ok(*x),
            TagValue::Integer(i) => Ok(*i as f64),
            _ => self.scalar_as(key, value, "a real number"),
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> Result<String, TagError> {
        match self.options.get(key) {
            None => Ok(default.to_string()),
            Some(TagValue::List(_)) => Err(self.invalid(key, "a string", &self.options[key])),
            Some(value) => Ok(value.to_string()),
        }
    }

    pub fn require_string(&self, key: &str) -> Result<String, TagError> {
        if !self.has_option(key) {
            return Err(self.missing(key));
        }
        self.get_string(key, "")
    }

    /// Reads a list option, given either as an array or as a comma-separated string.
    pub fn get_list(&self, key: &str) -> Result<Option<Vec<String>>, TagError> {
        let Some(value) = self.options.get(key) else {
            return Ok(None);
        };
        let items = match value {
            TagValue::List(items) => items
                .iter()
                .map(|item| match item {
                    TagValue::List(_) => Err(self.invalid(key, "a flat list", value)),
                    scalar => Ok(scalar.to_string().trim().to_string()),
                })
                .collect::<Result<Vec<_>, _>>()?,
            TagValue::String(s) => s.split(',').map(|item| item.trim().to_string()).collect(),
            scalar => vec![scalar.to_string()],
        };
        Ok(Some(items.into_iter().filter(|item| !item.is_empty()).collect()))
    }

    pub fn require_list(&self, key: &str) -> Result<Vec<String>, TagError> {
        self.get_list(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn get_real_list(&self, key: &str) -> Result<Option<Vec<f64>>, TagError> {
        self.parsed_list(key, "a list of real numbers")
    }

    pub fn get_usize_list(&self, key: &str) -> Result<Option<Vec<usize>>, TagError> {
        self.parsed_list(key, "a list of non-negative integers")
    }

    fn parsed_list<T: FromStr>(
        &self,
        key: &str,
        expected: &'static str,
    ) -> Result<Option<Vec<T>>, TagError> {
        let Some(items) = self.get_list(key)? else {
            return Ok(None);
        };
        items
            .iter()
            .map(|item| {
                item.parse::<T>()
                    .map_err(|_| self.invalid(key, expected, &self.options[key]))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn scalar_as<T: FromStr>(
        &self,
        key: &str,
        value: &TagValue,
        expected: &'static str,
    ) -> Result<T, TagError> {
        match value {
            TagValue::List(_) | TagValue::Bool(_) => Err(self.invalid(key, expected, value)),
            scalar => scalar
                .to_string()
                .trim()
                .parse::<T>()
                .map_err(|_| self.invalid(key, expected, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loop_tag() -> Tag {
        Tag::new("LoopOver", "retry")
            .with_option("mover_name", "perturb")
            .with_option("iterations", 20_i64)
            .with_option("drift", false)
    }

    #[test]
    fn missing_options_fall_back_to_defaults() {
        let tag = Tag::new("LoopOver", "retry");
        assert_eq!(tag.get_usize("iterations", 10), Ok(10));
        assert_eq!(tag.get_bool("drift", true), Ok(true));
        assert_eq!(tag.get_real("confidence", 0.5), Ok(0.5));
        assert_eq!(
            tag.get_string("filter_name", "false_filter"),
            Ok("false_filter".to_string())
        );
        assert_eq!(tag.get_list("movers"), Ok(None));
    }

    #[test]
    fn typed_accessors_read_present_options() {
        let tag = loop_tag();
        assert_eq!(tag.type_name(), "LoopOver");
        assert_eq!(tag.name(), "retry");
        assert_eq!(tag.get_usize("iterations", 10), Ok(20));
        assert_eq!(tag.get_bool("drift", true), Ok(false));
        assert_eq!(tag.require_string("mover_name"), Ok("perturb".to_string()));
    }

    #[test]
    fn require_string_reports_missing_option() {
        let tag = Tag::new("LoopOver", "retry");
        assert_eq!(
            tag.require_string("mover_name"),
            Err(TagError::MissingOption {
                tag: "retry".to_string(),
                key: "mover_name".to_string(),
            })
        );
    }

    #[test]
    fn negative_integer_is_rejected_as_count() {
        let tag = Tag::new("LoopOver", "retry").with_option("iterations", -3_i64);
        assert!(matches!(
            tag.get_usize("iterations", 10),
            Err(TagError::InvalidOption { .. })
        ));
    }

    #[test]
    fn booleans_accept_textual_and_numeric_forms() {
        let tag = Tag::new("SequenceMover", "seq")
            .with_option("a", "1")
            .with_option("b", "False")
            .with_option("c", 0_i64)
            .with_option("d", "maybe");
        assert_eq!(tag.get_bool("a", false), Ok(true));
        assert_eq!(tag.get_bool("b", true), Ok(false));
        assert_eq!(tag.get_bool("c", true), Ok(false));
        assert!(tag.get_bool("d", true).is_err());
    }

    #[test]
    fn lists_accept_arrays_and_comma_separated_strings() {
        let tag = Tag::new("RandomMover", "pick")
            .with_option("movers", "a, b ,c")
            .with_option("weights", vec![1.0, 3.0])
            .with_option("repeats", vec![2_i64, 1]);
        assert_eq!(
            tag.get_list("movers"),
            Ok(Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]))
        );
        assert_eq!(tag.get_real_list("weights"), Ok(Some(vec![1.0, 3.0])));
        assert_eq!(tag.get_usize_list("repeats"), Ok(Some(vec![2, 1])));
    }

    #[test]
    fn malformed_list_entries_are_reported() {
        let tag = Tag::new("RandomMover", "pick").with_option("weights", "1.0,heavy");
        assert!(matches!(
            tag.get_real_list("weights"),
            Err(TagError::InvalidOption { .. })
        ));
    }

    #[test]
    fn integer_options_read_as_reals() {
        let tag = Tag::new("StochasticFilter", "coin").with_option("confidence", 1_i64);
        assert_eq!(tag.get_real("confidence", 0.5), Ok(1.0));
    }

    #[test]
    fn tags_deserialize_from_toml_with_flattened_options() {
        let tag: Tag = toml::from_str(
            r#"
            type = "RandomMover"
            name = "pick"
            movers = ["a", "b"]
            weights = "1,3"
            nmoves = 2
            "#,
        )
        .unwrap();
        assert_eq!(tag.type_name(), "RandomMover");
        assert_eq!(tag.name(), "pick");
        assert_eq!(tag.get_usize("nmoves", 1), Ok(2));
        assert_eq!(tag.get_real_list("weights"), Ok(Some(vec![1.0, 3.0])));
        assert_eq!(
            tag.require_list("movers"),
            Ok(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn parse_loose_prefers_typed_values() {
        assert_eq!(TagValue::parse_loose("true"), TagValue::Bool(true));
        assert_eq!(TagValue::parse_loose("12"), TagValue::Integer(12));
        assert_eq!(TagValue::parse_loose("0.25"), TagValue::Float(0.25));
        assert_eq!(
            TagValue::parse_loose("FAIL_RETRY"),
            TagValue::String("FAIL_RETRY".to_string())
        );
    }
}
