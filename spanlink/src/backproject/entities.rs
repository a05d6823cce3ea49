//! Named-entity back-projection.

use std::collections::HashMap;

use spanlink_core::conventions::{keys, types};
use spanlink_core::Properties;

use super::BackProjection;
use crate::config::NerSettings;
use crate::document::NlpDocument;
use crate::error::Result;

/// Turns engine entity mentions into new entity annotations.
///
/// Each mention becomes an annotation typed through the configured mapping
/// (`"entity"` for labels it does not know), carrying the engine label as
/// `subtype` and the mention's best tag probability as `probability`.
/// Mentions whose probability falls below the threshold are dropped; a
/// mention with no probabilities at all always passes.
#[derive(Debug, Clone)]
pub struct EntityBackProjector {
    type_mapping: HashMap<String, String>,
    threshold: f64,
}

impl EntityBackProjector {
    /// Create a back-projector from validated settings.
    ///
    /// # Errors
    ///
    /// `Error::Config` if the settings fail validation.
    pub fn new(settings: &NerSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            type_mapping: settings.type_mapping.clone(),
            threshold: settings.probability_threshold,
        })
    }

    /// Plan one annotation per accepted mention.
    #[must_use]
    pub fn back_project(&self, doc: &NlpDocument) -> BackProjection {
        let mut plan = BackProjection::new();
        let mut rejected = 0;

        for mention in &doc.mentions {
            let local_type = self
                .type_mapping
                .get(&mention.tag)
                .map(String::as_str)
                .unwrap_or(types::UNDEFINED_ENTITY);

            let confidence = mention.confidence();
            if confidence.is_some_and(|p| p < self.threshold) {
                rejected += 1;
                continue;
            }

            let mut properties = Properties::new().with(keys::SUBTYPE, mention.tag.as_str());
            if let Some(p) = confidence {
                properties.insert(keys::PROBABILITY, p);
            }
            plan.add_annotation(mention.span, local_type, properties);
        }

        if rejected > 0 {
            log::debug!(
                "[ner] dropped {} mentions below probability {}",
                rejected,
                self.threshold
            );
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EntityMention;
    use spanlink_core::Span;

    fn doc_with(mentions: Vec<EntityMention>) -> NlpDocument {
        let mut doc = NlpDocument::from_text("Rachel lives in London on Tuesday.");
        doc.mentions = mentions;
        doc
    }

    fn mention(b: usize, e: usize, tag: &str) -> EntityMention {
        EntityMention::new(0, Span::new(b, e).unwrap(), "", tag)
    }

    #[test]
    fn test_types_and_properties() {
        let doc = doc_with(vec![
            mention(0, 6, "PERSON").with_prob("PERSON", 0.9),
            mention(16, 22, "CITY"),
            mention(26, 33, "DATE").with_prob("DATE", 0.6),
        ]);
        let plan = EntityBackProjector::new(&NerSettings::default())
            .unwrap()
            .back_project(&doc);

        assert_eq!(plan.annotations.len(), 3);
        let person = &plan.annotations[0];
        assert_eq!(person.annotation_type, types::PERSON);
        assert_eq!(person.properties.get_f64(keys::PROBABILITY), Some(0.9));
        assert_eq!(person.properties.get_str(keys::SUBTYPE), Some("PERSON"));

        let city = &plan.annotations[1];
        assert_eq!(city.annotation_type, types::LOCATION);
        assert!(!city.properties.contains(keys::PROBABILITY));
        assert_eq!(city.properties.get_str(keys::SUBTYPE), Some("CITY"));

        assert_eq!(plan.annotations[2].annotation_type, types::TEMPORAL);
    }

    #[test]
    fn test_unmapped_label_is_undefined_entity() {
        let doc = doc_with(vec![mention(0, 6, "MISC")]);
        let plan = EntityBackProjector::new(&NerSettings::default())
            .unwrap()
            .back_project(&doc);
        assert_eq!(plan.annotations[0].annotation_type, types::UNDEFINED_ENTITY);
        assert_eq!(plan.annotations[0].properties.get_str(keys::SUBTYPE), Some("MISC"));
    }

    #[test]
    fn test_threshold_uses_best_probability() {
        // 0.4 is the best of the two, so 0.5 rejects and 0.3 accepts
        let doc = doc_with(vec![mention(0, 6, "PERSON")
            .with_prob("PERSON", 0.4)
            .with_prob("ORGANIZATION", 0.1)]);

        let strict = NerSettings::default().with_threshold(0.5);
        let plan = EntityBackProjector::new(&strict).unwrap().back_project(&doc);
        assert!(plan.annotations.is_empty());

        let lax = NerSettings::default().with_threshold(0.3);
        let plan = EntityBackProjector::new(&lax).unwrap().back_project(&doc);
        assert_eq!(plan.annotations.len(), 1);
        assert_eq!(plan.annotations[0].properties.get_f64(keys::PROBABILITY), Some(0.4));
    }

    #[test]
    fn test_no_probability_always_passes() {
        let doc = doc_with(vec![mention(0, 6, "PERSON")]);
        let settings = NerSettings::default().with_threshold(1.0);
        let plan = EntityBackProjector::new(&settings).unwrap().back_project(&doc);
        assert_eq!(plan.annotations.len(), 1);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(EntityBackProjector::new(&NerSettings::default().with_threshold(1.2)).is_err());
    }
}
