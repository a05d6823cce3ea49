//! Source annotations: typed, independently created spans in the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conventions::keys;
use crate::span::Span;

/// Opaque identity of an annotation within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnotationId(pub u64);

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Free-form key/value properties attached to annotations and groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, Value>);

impl Properties {
    /// Create an empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite a property.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value for `key`, if present and a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Numeric value for `key`, if present and a number.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Check if `key` is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An existing unit in the annotation store.
///
/// Annotations are immutable values: augmenting one (say, with a
/// part-of-speech tag) produces a new version with the same [`AnnotationId`]
/// via [`SourceAnnotation::with_property`], which the store then swaps in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAnnotation {
    /// Identity within the store
    pub id: AnnotationId,
    /// Character bounds; `None` for annotations bounded some other way
    pub span: Option<Span>,
    /// Type string (see [`crate::conventions::types`])
    pub annotation_type: String,
    /// Properties (subtype, probability, partOfSpeech, ...)
    pub properties: Properties,
}

impl SourceAnnotation {
    /// Create an annotation value.
    #[must_use]
    pub fn new(
        id: AnnotationId,
        span: Option<Span>,
        annotation_type: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            span,
            annotation_type: annotation_type.into(),
            properties,
        }
    }

    /// A copy of this annotation with one more property set.
    #[must_use]
    pub fn with_property(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.properties.insert(key, value);
        next
    }

    /// The `subtype` property.
    #[must_use]
    pub fn subtype(&self) -> Option<&str> {
        self.properties.get_str(keys::SUBTYPE)
    }

    /// The `probability` property.
    #[must_use]
    pub fn probability(&self) -> Option<f64> {
        self.properties.get_f64(keys::PROBABILITY)
    }

    /// The `partOfSpeech` property.
    #[must_use]
    pub fn part_of_speech(&self) -> Option<&str> {
        self.properties.get_str(keys::PART_OF_SPEECH)
    }

    /// The `lemma` property.
    #[must_use]
    pub fn lemma(&self) -> Option<&str> {
        self.properties.get_str(keys::LEMMA)
    }

    /// Check the annotation type.
    #[must_use]
    pub fn is_type(&self, annotation_type: &str) -> bool {
        self.annotation_type == annotation_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conventions::types;

    #[test]
    fn test_typed_accessors() {
        let props = Properties::new()
            .with(keys::SUBTYPE, "CITY")
            .with(keys::PROBABILITY, 0.75);
        let a = SourceAnnotation::new(
            AnnotationId(3),
            Some(Span::new(16, 22).unwrap()),
            types::LOCATION,
            props,
        );

        assert_eq!(a.subtype(), Some("CITY"));
        assert_eq!(a.probability(), Some(0.75));
        assert_eq!(a.part_of_speech(), None);
        assert!(a.is_type(types::LOCATION));
    }

    #[test]
    fn test_with_property_keeps_identity() {
        let token = SourceAnnotation::new(
            AnnotationId(7),
            Some(Span::new(0, 4).unwrap()),
            types::WORD_TOKEN,
            Properties::new(),
        );
        let tagged = token.with_property(keys::PART_OF_SPEECH, "NNP");

        assert_eq!(tagged.id, token.id);
        assert_eq!(tagged.part_of_speech(), Some("NNP"));
        assert_eq!(token.part_of_speech(), None);
    }

    #[test]
    fn test_wrong_value_kind_is_absent() {
        let props = Properties::new().with(keys::PROBABILITY, "high");
        assert_eq!(props.get_f64(keys::PROBABILITY), None);
        assert_eq!(props.get_str(keys::PROBABILITY), Some("high"));
    }
}
