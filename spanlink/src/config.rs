//! Settings for engine-backed processors.
//!
//! Settings are plain `serde` structs, loadable from TOML:
//!
//! ```toml
//! probability_threshold = 0.4
//!
//! [type_mapping]
//! PERSON = "entity/person"
//! CITY = "entity/location"
//!
//! [properties]
//! "ner.applyFineGrained" = "true"
//! ```
//!
//! Raw `properties` are forwarded verbatim to the engine factory; the
//! stage's `annotators` key is set on top of them.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::Stage;
use crate::error::{Error, Result};
use crate::vocab::TypeVocabulary;

/// Raw engine properties (string key → string value).
pub type EngineProperties = BTreeMap<String, String>;

/// Property key naming the engine pipeline stages to run.
pub const ANNOTATORS_KEY: &str = "annotators";

// =============================================================================
// Engine settings
// =============================================================================

/// Settings shared by every engine-backed processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Raw properties forwarded to the engine factory
    pub properties: EngineProperties,
}

impl EngineSettings {
    /// Builder-style property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Properties for `stage`: the raw properties plus the stage's annotators.
    ///
    /// A user-supplied `annotators` value is overridden.
    #[must_use]
    pub fn for_stage(&self, stage: Stage) -> EngineProperties {
        stage_properties(&self.properties, stage)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load settings from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

fn stage_properties(base: &EngineProperties, stage: Stage) -> EngineProperties {
    let mut props = base.clone();
    if let Some(previous) = props.insert(ANNOTATORS_KEY.to_string(), stage.annotators().to_string())
    {
        if previous != stage.annotators() {
            log::debug!(
                "[config] overriding annotators '{}' with '{}' for {:?}",
                previous,
                stage.annotators(),
                stage
            );
        }
    }
    props
}

// =============================================================================
// NER settings
// =============================================================================

/// Settings for named-entity back-projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NerSettings {
    /// Engine label → local type
    pub type_mapping: HashMap<String, String>,
    /// Mentions whose confidence is below this are dropped (0.0 to 1.0)
    pub probability_threshold: f64,
    /// Raw properties forwarded to the engine factory
    pub properties: EngineProperties,
}

impl Default for NerSettings {
    fn default() -> Self {
        Self {
            type_mapping: TypeVocabulary::standard().external_to_local().clone(),
            probability_threshold: 0.0,
            properties: EngineProperties::new(),
        }
    }
}

impl NerSettings {
    /// Set the probability threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.probability_threshold = threshold;
        self
    }

    /// Replace the type mapping.
    #[must_use]
    pub fn with_type_mapping(mut self, type_mapping: HashMap<String, String>) -> Self {
        self.type_mapping = type_mapping;
        self
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// `Error::Config` if the type mapping is empty or the threshold is
    /// outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.type_mapping.is_empty() {
            return Err(Error::config("type_mapping must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.probability_threshold) {
            return Err(Error::config(format!(
                "probability_threshold must be within [0, 1], got {}",
                self.probability_threshold
            )));
        }
        Ok(())
    }

    /// Engine properties for the NER stage.
    #[must_use]
    pub fn for_stage(&self, stage: Stage) -> EngineProperties {
        stage_properties(&self.properties, stage)
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}
