//! Aligner configuration.
//!
//! Settings can be built programmatically, deserialized from JSON (unset
//! keys keep their defaults), or read from the environment. Callbacks live in
//! [`RunHooks`] since they cannot be serialized.

use core::{fmt, slice};
use std::env;

use anyhow::{Context as _, Result};
use log::warn;
use serde::Deserialize;

/// Class name tracked when none is configured.
pub const DEFAULT_TARGET_CLASS: &str = "item";

/// Default adjustment threshold: any difference smaller than the larger box.
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Class name filter(s) selecting tracked descendants.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TargetClass {
    Single(String),
    /// Applied in order; matches are concatenated without deduplication.
    List(Vec<String>),
}

impl TargetClass {
    /// Class names in the order they are applied.
    pub fn names(&self) -> &[String] {
        match self {
            Self::Single(name) => slice::from_ref(name),
            Self::List(names) => names,
        }
    }
}

impl Default for TargetClass {
    fn default() -> Self {
        Self::Single(DEFAULT_TARGET_CLASS.to_owned())
    }
}

impl From<&str> for TargetClass {
    fn from(name: &str) -> Self {
        Self::Single(name.to_owned())
    }
}

impl From<Vec<String>> for TargetClass {
    fn from(names: Vec<String>) -> Self {
        Self::List(names)
    }
}

impl<const LEN: usize> From<[&str; LEN]> for TargetClass {
    fn from(names: [&str; LEN]) -> Self {
        Self::List(names.iter().map(|name| (*name).to_owned()).collect())
    }
}

/// Serializable aligner settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlignConfig {
    pub target_class: TargetClass,
    /// Fraction of the larger box a difference must stay below to be corrected.
    pub threshold: f64,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            target_class: TargetClass::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl AlignConfig {
    /// Replace the class filter(s).
    ///
    /// # Arguments
    ///
    /// * `target_class` - A class name, or an ordered list of class names
    ///
    /// # Returns
    ///
    /// The updated configuration
    #[inline]
    #[must_use]
    pub fn with_target_class(mut self, target_class: impl Into<TargetClass>) -> Self {
        self.target_class = target_class.into();
        self
    }

    /// Replace the adjustment threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Fraction of the larger box a difference must stay below
    ///
    /// # Returns
    ///
    /// The updated configuration
    #[inline]
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Parse settings from a JSON object such as
    /// `{"targetClass": ["card", "tile"], "threshold": 0.5}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid JSON for these settings.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("invalid equal_align configuration")
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `EQUAL_ALIGN_TARGET_CLASS`: comma-separated class names (default: `item`)
    /// - `EQUAL_ALIGN_THRESHOLD`: adjustment threshold fraction (default: 1)
    ///
    /// # Returns
    ///
    /// A new `AlignConfig` populated from environment variables
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let target_class = env::var("EQUAL_ALIGN_TARGET_CLASS").ok();
        let threshold = env::var("EQUAL_ALIGN_THRESHOLD").ok();
        Self::from_env_values(target_class.as_deref(), threshold.as_deref())
    }

    /// Build a configuration from raw environment values.
    ///
    /// A single class name becomes [`TargetClass::Single`], several become
    /// [`TargetClass::List`]. Empty or unparsable values keep the default and
    /// log a warning.
    ///
    /// # Arguments
    ///
    /// * `target_class` - Raw `EQUAL_ALIGN_TARGET_CLASS`, if set
    /// * `threshold` - Raw `EQUAL_ALIGN_THRESHOLD`, if set
    ///
    /// # Returns
    ///
    /// The default configuration with every usable value applied
    #[must_use]
    pub fn from_env_values(target_class: Option<&str>, threshold: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = target_class {
            let mut names: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect();
            match names.len() {
                0 => warn!("equal_align: EQUAL_ALIGN_TARGET_CLASS is empty, keeping default"),
                1 => config.target_class = TargetClass::Single(names.remove(0)),
                _ => config.target_class = TargetClass::List(names),
            }
        }
        if let Some(raw) = threshold {
            match raw.trim().parse::<f64>() {
                Ok(parsed) => config.threshold = parsed,
                Err(err) => warn!("equal_align: ignoring EQUAL_ALIGN_THRESHOLD={raw:?}: {err}"),
            }
        }
        config
    }
}

type Hook = Box<dyn FnMut()>;

/// Callbacks invoked once around the first pass.
#[derive(Default)]
pub struct RunHooks {
    before_run: Option<Hook>,
    after_run: Option<Hook>,
}

impl RunHooks {
    /// Set the callback invoked right before the first pass.
    #[must_use]
    pub fn before_run(mut self, hook: impl FnMut() + 'static) -> Self {
        self.before_run = Some(Box::new(hook));
        self
    }

    /// Set the callback invoked right after the first pass.
    #[must_use]
    pub fn after_run(mut self, hook: impl FnMut() + 'static) -> Self {
        self.after_run = Some(Box::new(hook));
        self
    }

    pub(crate) fn fire_before(&mut self) {
        if let Some(hook) = self.before_run.as_mut() {
            hook();
        }
    }

    pub(crate) fn fire_after(&mut self) {
        if let Some(hook) = self.after_run.as_mut() {
            hook();
        }
    }
}

impl fmt::Debug for RunHooks {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RunHooks")
            .field("before_run", &self.before_run.is_some())
            .field("after_run", &self.after_run.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test assertions")]

    use super::*;

    #[test]
    fn defaults_track_item_with_full_threshold() {
        let config = AlignConfig::default();
        assert_eq!(config.target_class.names(), &["item".to_owned()]);
        assert!((config.threshold - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn json_keeps_defaults_for_unset_keys() {
        let config = AlignConfig::from_json(r#"{"threshold": 0.25}"#).unwrap();
        assert_eq!(config.target_class, TargetClass::default());
        assert!((config.threshold - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn json_accepts_single_or_list_target_class() {
        let single = AlignConfig::from_json(r#"{"targetClass": "card"}"#).unwrap();
        assert_eq!(single.target_class, TargetClass::from("card"));

        let list = AlignConfig::from_json(r#"{"targetClass": ["card", "tile"]}"#).unwrap();
        assert_eq!(list.target_class.names(), &["card".to_owned(), "tile".to_owned()]);
    }

    #[test]
    fn json_rejects_wrong_types() {
        let err = AlignConfig::from_json(r#"{"threshold": "high"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid equal_align configuration"));
    }

    #[test]
    fn builder_overrides_fields() {
        let config = AlignConfig::default()
            .with_target_class(["col", "side"])
            .with_threshold(0.5);
        assert_eq!(config.target_class.names().len(), 2);
        assert!((config.threshold - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn env_values_split_class_names() {
        let single = AlignConfig::from_env_values(Some(" card "), None);
        assert_eq!(single.target_class, TargetClass::Single("card".to_owned()));

        let list = AlignConfig::from_env_values(Some("card, tile,,"), None);
        assert_eq!(
            list.target_class,
            TargetClass::List(vec!["card".to_owned(), "tile".to_owned()])
        );
    }

    #[test]
    fn empty_env_values_keep_defaults() {
        let config = AlignConfig::from_env_values(Some(" , "), Some("high"));
        assert_eq!(config, AlignConfig::default());

        let unset = AlignConfig::from_env_values(None, None);
        assert_eq!(unset, AlignConfig::default());
    }

    #[test]
    fn env_threshold_is_parsed() {
        let config = AlignConfig::from_env_values(None, Some(" 0.3 "));
        assert!((config.threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.target_class, TargetClass::default());
    }

    #[test]
    fn hooks_fire_only_when_set() {
        use std::cell::Cell;
        use std::rc::Rc;

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut hooks = RunHooks::default().after_run(move || counter.set(counter.get() + 1));
        hooks.fire_before();
        hooks.fire_after();
        assert_eq!(calls.get(), 1);
    }
}
