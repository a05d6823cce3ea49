//! Token-level back-projection: tagging existing tokens, creating new ones.

use std::collections::HashMap;

use spanlink_core::conventions::{keys, types};
use spanlink_core::{AnnotationStore, Properties, SourceAnnotation};

use super::BackProjection;
use crate::document::{NlpDocument, Token};

/// A per-token engine output copied onto store tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenProperty {
    /// Part-of-speech tag, stored as `partOfSpeech`
    PartOfSpeech,
    /// Lemma, stored as `lemma`
    Lemma,
}

impl TokenProperty {
    /// Property key written on the store token.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::PartOfSpeech => keys::PART_OF_SPEECH,
            Self::Lemma => keys::LEMMA,
        }
    }

    fn value<'t>(&self, token: &'t Token) -> Option<&'t str> {
        match self {
            Self::PartOfSpeech => token.pos.as_deref(),
            Self::Lemma => token.lemma.as_deref(),
        }
    }
}

/// Plan augmented versions of store tokens carrying `property`.
///
/// Engine tokens are matched to store `grammar/wordToken` annotations by
/// begin offset. Each match is replaced by a copy with the same id and the
/// property set, so the store's token count does not change.
#[must_use]
pub fn back_project_token_property<S>(
    doc: &NlpDocument,
    store: &S,
    property: TokenProperty,
) -> BackProjection
where
    S: AnnotationStore + ?Sized,
{
    let by_begin: HashMap<usize, &SourceAnnotation> = store
        .by_type(types::WORD_TOKEN)
        .into_iter()
        .filter_map(|a| a.span.map(|span| (span.begin(), a)))
        .collect();

    let mut plan = BackProjection::new();
    for token in &doc.tokens {
        let Some(original) = by_begin.get(&token.span.begin()) else {
            log::warn!(
                "[tokens] no store token starts at {} for engine token '{}'",
                token.span.begin(),
                token.text
            );
            continue;
        };
        let Some(value) = property.value(token) else {
            log::debug!(
                "[tokens] engine left {} unset on '{}'",
                property.key(),
                token.text
            );
            continue;
        };
        plan.replace(original.with_property(property.key(), value));
    }
    plan
}

/// Plan new sentence and token annotations from an engine-tokenized document.
///
/// Each sentence is followed by its tokens, in document order. Tokens the
/// engine did not place in any sentence are not created.
#[must_use]
pub fn back_project_tokenization(doc: &NlpDocument) -> BackProjection {
    let mut plan = BackProjection::new();
    let mut placed = 0;

    for sentence in &doc.sentences {
        plan.add_annotation(sentence.span, types::SENTENCE, Properties::new());
        for token in sentence.tokens.iter().filter_map(|&idx| doc.tokens.get(idx)) {
            plan.add_annotation(token.span, types::WORD_TOKEN, Properties::new());
            placed += 1;
        }
    }

    if placed < doc.tokens.len() {
        log::debug!(
            "[tokens] {} tokens outside any sentence not created",
            doc.tokens.len() - placed
        );
    }
    plan
}
