//! Document projection: flat store annotations → engine document.
//!
//! The store holds independent spans; the engine wants a hierarchy. The
//! projector derives the hierarchy purely from character containment:
//!
//! ```text
//! text:      Rachel lives in London.
//! sentence:  [0 ...................... 23)
//! tokens:    [0,6) [7,12) [13,15) [16,22) [22,23)
//! entities:  [0,6) person           [16,22) location/CITY
//!
//! token 0  ner=PERSON probs={PERSON: 1.0}  sentence 0, index 1
//! token 3  ner=CITY   probs={CITY: 1.0}    sentence 0, index 4
//! ```
//!
//! Projection never writes to the store; projecting the same store twice
//! gives equal documents.

use std::cmp::Ordering;

use spanlink_core::conventions::types;
use spanlink_core::{AnnotationStore, SourceAnnotation, Span};

use crate::document::{EntityMention, NlpDocument, Sentence, TagProbabilities, Token};
use crate::error::{Error, Result};
use crate::vocab::TypeVocabulary;

/// Builds [`NlpDocument`]s from an annotation store.
#[derive(Debug, Clone, Copy)]
pub struct DocumentProjector<'v> {
    vocab: &'v TypeVocabulary,
}

impl<'v> DocumentProjector<'v> {
    /// Create a projector that labels entities through `vocab`.
    #[must_use]
    pub fn new(vocab: &'v TypeVocabulary) -> Self {
        Self { vocab }
    }

    /// Project `store` into an engine document.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` if two sentences, or two tokens, start at the
    /// same offset: the hierarchy would be ambiguous.
    pub fn project<S>(&self, store: &S) -> Result<NlpDocument>
    where
        S: AnnotationStore + ?Sized,
    {
        let sentence_annotations = spanned_sorted(store, types::SENTENCE)?;
        let token_annotations = spanned_sorted(store, types::WORD_TOKEN)?;

        let mut doc = NlpDocument::from_text(store.content());

        doc.tokens = token_annotations
            .iter()
            .map(|(span, a)| {
                let mut token = Token::new(*span, store.text(a).unwrap_or_default());
                token.pos = a.part_of_speech().map(str::to_string);
                token.lemma = a.lemma().map(str::to_string);
                token
            })
            .collect();

        self.project_entities(store, &mut doc);
        project_sentences(store, &sentence_annotations, &mut doc);

        log::debug!(
            "[projector] {} sentences, {} tokens, {} entity mentions",
            doc.sentences.len(),
            doc.tokens.len(),
            doc.mentions.len()
        );
        Ok(doc)
    }

    fn project_entities<S>(&self, store: &S, doc: &mut NlpDocument)
    where
        S: AnnotationStore + ?Sized,
    {
        let mut entities: Vec<(Span, &SourceAnnotation)> = store
            .with_spans()
            .into_iter()
            .filter(|a| self.vocab.is_eligible_entity(a))
            .filter_map(|a| a.span.map(|span| (span, a)))
            .collect();
        entities.sort_by(|(a, _), (b, _)| by_position(a, b));

        for (span, annotation) in entities {
            let label = self.vocab.engine_label(annotation);
            let prob = annotation.probability().unwrap_or(1.0);

            let index = doc.mentions.len();
            let mut mention = EntityMention::new(
                index,
                span,
                store.text(annotation).unwrap_or_default(),
                label,
            )
            .with_prob(label, prob);

            mention.tokens = contained_tokens(&doc.tokens, span);
            for &token_idx in &mention.tokens {
                let token = &mut doc.tokens[token_idx];
                token.ner = label.to_string();
                token.ner_probs = TagProbabilities::from([(label.to_string(), prob)]);
            }
            // A gap in the contained tokens still yields one range
            mention.token_range = match (mention.tokens.first(), mention.tokens.last()) {
                (Some(&first), Some(&last)) => Some(first..last + 1),
                _ => None,
            };

            doc.mentions.push(mention);
        }
    }
}

fn project_sentences<S>(
    store: &S,
    sentence_annotations: &[(Span, &SourceAnnotation)],
    doc: &mut NlpDocument,
) where
    S: AnnotationStore + ?Sized,
{
    for (index, (span, annotation)) in sentence_annotations.iter().enumerate() {
        let mut sentence = Sentence::new(index, *span, store.text(annotation).unwrap_or_default());

        sentence.tokens = contained_tokens(&doc.tokens, *span);
        for (position, &token_idx) in sentence.tokens.iter().enumerate() {
            let token = &mut doc.tokens[token_idx];
            token.sentence_index = Some(index);
            token.index = Some(position + 1);
        }
        sentence.token_range = match (sentence.tokens.first(), sentence.tokens.last()) {
            (Some(&first), Some(&last)) => Some(first..last + 1),
            _ => None,
        };

        for mention in doc.mentions.iter_mut().filter(|m| span.contains(&m.span)) {
            mention.sentence_index = Some(index);
            sentence.mentions.push(mention.index);
        }

        doc.sentences.push(sentence);
    }
}

/// Annotations of `annotation_type` with spans, sorted by (begin, end).
fn spanned_sorted<'s, S>(
    store: &'s S,
    annotation_type: &str,
) -> Result<Vec<(Span, &'s SourceAnnotation)>>
where
    S: AnnotationStore + ?Sized,
{
    let unbounded = store
        .annotations()
        .iter()
        .filter(|a| a.is_type(annotation_type) && a.span.is_none())
        .count();
    if unbounded > 0 {
        log::debug!(
            "[projector] skipping {} {} annotations without a span",
            unbounded,
            annotation_type
        );
    }

    let mut spanned: Vec<(Span, &SourceAnnotation)> = store
        .by_type(annotation_type)
        .into_iter()
        .filter_map(|a| a.span.map(|span| (span, a)))
        .collect();
    spanned.sort_by(|(a, _), (b, _)| by_position(a, b));

    if let Some(pair) = spanned
        .windows(2)
        .find(|pair| pair[0].0.begin() == pair[1].0.begin())
    {
        return Err(Error::invalid_input(format!(
            "{} annotations {} {} and {} {} start at the same offset",
            annotation_type, pair[0].1.id, pair[0].0, pair[1].1.id, pair[1].0
        )));
    }
    Ok(spanned)
}

fn by_position(a: &Span, b: &Span) -> Ordering {
    a.begin().cmp(&b.begin()).then(a.end().cmp(&b.end()))
}

/// Indices of tokens inside `span`. `tokens` must be sorted by begin.
fn contained_tokens(tokens: &[Token], span: Span) -> Vec<usize> {
    let start = tokens.partition_point(|t| t.span.begin() < span.begin());
    tokens[start..]
        .iter()
        .enumerate()
        .take_while(|(_, t)| t.span.begin() <= span.end())
        .filter(|(_, t)| span.contains(&t.span))
        .map(|(offset, _)| start + offset)
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use spanlink_core::{AnnotatedText, Properties};

    fn arb_store() -> impl Strategy<Value = AnnotatedText> {
        // Word lengths, and a flag per word marking it as a person
        prop::collection::vec((1usize..8, any::<bool>()), 1..20).prop_map(|words| {
            let text: String = words
                .iter()
                .map(|(len, _)| "x".repeat(*len))
                .collect::<Vec<_>>()
                .join(" ");
            let mut store = AnnotatedText::new("p", text.as_str());
            store.create_annotation(
                Span::new(0, text.len()).unwrap(),
                types::SENTENCE,
                Properties::new(),
            );
            let mut offset = 0;
            for (len, is_person) in words {
                let span = Span::new(offset, offset + len).unwrap();
                store.create_annotation(span, types::WORD_TOKEN, Properties::new());
                if is_person {
                    store.create_annotation(span, types::PERSON, Properties::new());
                }
                offset += len + 1;
            }
            store
        })
    }

    proptest! {
        #[test]
        fn projection_is_idempotent(store in arb_store()) {
            let projector = DocumentProjector::new(TypeVocabulary::standard());
            let before = store.annotations().to_vec();
            let first = projector.project(&store).unwrap();
            let second = projector.project(&store).unwrap();
            prop_assert_eq!(first, second);
            prop_assert_eq!(store.annotations(), before.as_slice());
        }

        #[test]
        fn every_token_numbered(store in arb_store()) {
            let doc = DocumentProjector::new(TypeVocabulary::standard())
                .project(&store)
                .unwrap();
            for (i, token) in doc.tokens.iter().enumerate() {
                prop_assert_eq!(token.sentence_index, Some(0));
                prop_assert_eq!(token.index, Some(i + 1));
            }
            for mention in &doc.mentions {
                prop_assert_eq!(mention.tokens.len(), 1);
                prop_assert_eq!(&doc.tokens[mention.tokens[0]].ner, "PERSON");
            }
        }
    }
}
