//! Type vocabulary: the bridge between engine labels and local annotation types.
//!
//! # Two taxonomies
//!
//! The engine labels entities with its own tag set (`PERSON`, `CITY`,
//! `DATE`, ...); the annotation store uses local type strings
//! (`entity/person`, `entity/location`, `entity/temporal`, ...). The two
//! evolved independently and are not inverses:
//!
//! ```text
//! ┌───────────────────────┬───────────────────────┬─────────────────────┐
//! │ Engine label          │ Local type            │ Back to engine      │
//! ├───────────────────────┼───────────────────────┼─────────────────────┤
//! │ LOCATION              │ entity/location       │ LOCATION            │
//! │ CITY, COUNTRY, ...    │ entity/location       │ (LOCATION)          │
//! │ DATE, TIME, DURATION  │ entity/temporal       │ none                │
//! │ TITLE, CRIMINAL_CHARGE│ entity                │ none                │
//! └───────────────────────┴───────────────────────┴─────────────────────┘
//! ```
//!
//! Several engine labels collapse onto one local type, so the reverse map is
//! only a default. Fine-grained engine labels survive the round trip through
//! the annotation's `subtype` property instead: an `entity/location` with
//! subtype `CITY` is presented to the engine as `CITY`.
//!
//! Labels are matched exactly (no case folding): both sides are fixed
//! vocabularies.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use spanlink_core::conventions::types;
use spanlink_core::SourceAnnotation;

use crate::error::{Error, Result};

/// Local type used during back-projection when an engine label has no mapping.
///
/// Nothing in the store carries this type, so a lookup with it matches nothing.
pub const UNMAPPED: &str = "_";

static STANDARD: Lazy<TypeVocabulary> = Lazy::new(TypeVocabulary::build_standard);

/// Bidirectional lookup between engine labels and local types.
///
/// Immutable once built. The standard table is constructed once per process
/// and shared by reference; custom tables are usually wrapped in an `Arc`.
///
/// # Example
///
/// ```rust
/// use spanlink::TypeVocabulary;
///
/// let vocab = TypeVocabulary::standard();
/// assert_eq!(vocab.local_type("CITY"), Some("entity/location"));
/// assert_eq!(vocab.local_type("DATE"), Some("entity/temporal"));
/// assert_eq!(vocab.external_label("entity/temporal"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeVocabulary {
    to_local: HashMap<String, String>,
    to_external: HashMap<String, String>,
}

impl TypeVocabulary {
    /// Build a vocabulary from explicit tables.
    ///
    /// Fails if the engine→local table is empty.
    pub fn new(
        to_local: HashMap<String, String>,
        to_external: HashMap<String, String>,
    ) -> Result<Self> {
        if to_local.is_empty() {
            return Err(Error::config("type mapping must not be empty"));
        }
        Ok(Self {
            to_local,
            to_external,
        })
    }

    /// The process-wide default table.
    #[must_use]
    pub fn standard() -> &'static TypeVocabulary {
        &STANDARD
    }

    fn build_standard() -> Self {
        let mut vocab = Self {
            to_local: HashMap::new(),
            to_external: HashMap::new(),
        };

        // Standard labels (MISC and SET have no local counterpart)
        vocab.add_both("PERSON", types::PERSON);
        vocab.add_both("LOCATION", types::LOCATION);
        vocab.add_both("ORGANIZATION", types::ORGANISATION);
        vocab.add_both("MONEY", types::MONEY);
        vocab.add_both("NUMBER", types::NUMBER);
        vocab.add_both("ORDINAL", types::ORDINAL);
        vocab.add_both("PERCENT", types::PERCENT);

        // Temporal fusion: one-way, the sub-distinction is lost
        vocab.add_one_way("DATE", types::TEMPORAL);
        vocab.add_one_way("TIME", types::TEMPORAL);
        vocab.add_one_way("DURATION", types::TEMPORAL);

        // Fine-grained labels
        vocab.add_one_way("CITY", types::LOCATION);
        vocab.add_one_way("COUNTRY", types::LOCATION);
        vocab.add_one_way("STATE_OR_PROVINCE", types::LOCATION);
        vocab.add_both("EMAIL", types::EMAIL);
        vocab.add_both("URL", types::URL);
        vocab.add_both("NATIONALITY", types::NATIONALITY);
        vocab.add_both("RELIGION", types::RELIGION);
        vocab.add_both("IDEOLOGY", types::IDEOLOGY);

        // No local equivalent; absorbed rather than dropped
        vocab.add_one_way("TITLE", types::UNDEFINED_ENTITY);
        vocab.add_one_way("CAUSE_OF_DEATH", types::UNDEFINED_ENTITY);
        vocab.add_one_way("CRIMINAL_CHARGE", types::UNDEFINED_ENTITY);

        vocab
    }

    fn add_both(&mut self, external: &str, local: &str) {
        self.add_one_way(external, local);
        self.to_external.insert(local.to_string(), external.to_string());
    }

    fn add_one_way(&mut self, external: &str, local: &str) {
        self.to_local.insert(external.to_string(), local.to_string());
    }

    /// Label to present to the engine for `annotation`.
    ///
    /// A subtype the engine understands wins (fine-grained labels such as
    /// `CITY`); otherwise the primary type's default label; otherwise `""`.
    #[must_use]
    pub fn engine_label<'a>(&'a self, annotation: &'a SourceAnnotation) -> &'a str {
        if let Some(subtype) = annotation.subtype() {
            if self.to_local.contains_key(subtype) {
                return subtype;
            }
        }
        self.to_external
            .get(&annotation.annotation_type)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether `annotation` may be surfaced to the engine as entity evidence.
    #[must_use]
    pub fn is_eligible_entity(&self, annotation: &SourceAnnotation) -> bool {
        self.to_external.contains_key(&annotation.annotation_type)
            || annotation
                .subtype()
                .is_some_and(|subtype| self.to_local.contains_key(subtype))
    }

    /// Local type for an engine label.
    #[must_use]
    pub fn local_type(&self, label: &str) -> Option<&str> {
        self.to_local.get(label).map(String::as_str)
    }

    /// Local type for an engine label, or `default` when unmapped.
    #[must_use]
    pub fn local_type_or<'a>(&'a self, label: &str, default: &'a str) -> &'a str {
        self.local_type(label).unwrap_or(default)
    }

    /// Default engine label for a local type.
    #[must_use]
    pub fn external_label(&self, local_type: &str) -> Option<&str> {
        self.to_external.get(local_type).map(String::as_str)
    }

    /// The engine→local table.
    #[must_use]
    pub fn external_to_local(&self) -> &HashMap<String, String> {
        &self.to_local
    }

    /// Local types this vocabulary can resolve to.
    pub fn local_types(&self) -> impl Iterator<Item = &str> {
        let mut seen: Vec<&str> = self.to_local.values().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.into_iter()
    }
}
