//! Coreference back-projection.

use spanlink_core::conventions::groups;
use spanlink_core::{AnnotationStore, Properties, Role, Span};

use super::{exact_matches, BackProjection};
use crate::document::{CorefMention, NlpDocument};
use crate::vocab::{TypeVocabulary, UNMAPPED};

/// Plan one `grammar/coreference` group per engine chain.
///
/// Each chain mention is turned back into a character span through its
/// sentence's token offset, and typed by the named-entity tag of its head
/// token. Every store annotation of that type with exactly that span joins
/// the group as a `Mention`. A chain that ends up with fewer than two
/// participants says nothing about the store and is dropped.
///
/// ```text
/// "Smith arrived. He sat."
///  sentence 2 starts at token 3; mention (2, 1, 2, head 1)
///  → tokens[3 + 1 - 1] .. tokens[3 + 2 - 2] → "He" [15, 17)
/// ```
#[must_use]
pub fn back_project_coreference<S>(
    doc: &NlpDocument,
    store: &S,
    vocab: &TypeVocabulary,
) -> BackProjection
where
    S: AnnotationStore + ?Sized,
{
    let mut plan = BackProjection::new();

    for chain in &doc.coref_chains {
        let mut participants = Vec::new();

        for mention in &chain.mentions {
            let Some((span, annotation_type)) = resolve_mention(doc, vocab, mention) else {
                log::warn!(
                    "[coref] chain {}: cannot resolve mention {:?}",
                    chain.id,
                    mention
                );
                continue;
            };

            for annotation in exact_matches(store, annotation_type, span) {
                if !participants.contains(&(Role::Mention, annotation.id)) {
                    participants.push((Role::Mention, annotation.id));
                }
            }
        }

        if participants.len() < 2 {
            log::debug!(
                "[coref] chain {}: {} store annotations matched, skipping",
                chain.id,
                participants.len()
            );
            continue;
        }
        plan.add_group(groups::COREFERENCE, Properties::new(), participants);
    }

    plan
}

/// Character span and local type of a chain mention.
fn resolve_mention<'v>(
    doc: &NlpDocument,
    vocab: &'v TypeVocabulary,
    mention: &CorefMention,
) -> Option<(Span, &'v str)> {
    let offset = doc.sentence_by_num(mention.sentence_num)?.token_offset()?;

    let first = doc.tokens.get((offset + mention.start_index).checked_sub(1)?)?;
    let last = doc.tokens.get((offset + mention.end_index).checked_sub(2)?)?;
    let span = Span::new(first.span.begin(), last.span.end()).ok()?;

    // Head index is sentence-relative, like start and end
    let head = doc.tokens.get((offset + mention.head_index).checked_sub(1)?)?;
    let annotation_type = vocab.local_type_or(&head.ner, UNMAPPED);

    Some((span, annotation_type))
}
