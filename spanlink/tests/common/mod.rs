//! Shared fixtures: a toy tokenizer and store builders.

#![allow(dead_code)]

use spanlink::conventions::{keys, types};
use spanlink::{AnnotatedText, AnnotationId, AnnotationStore, NlpDocument, Properties, Span};

pub fn span(begin: usize, end: usize) -> Span {
    Span::new(begin, end).unwrap()
}

/// Sentence spans and token spans of `text`.
///
/// Tokens are runs of alphanumeric characters plus single punctuation
/// characters. A sentence ends after a `.`, `!` or `?` token.
pub fn segment(text: &str) -> (Vec<Span>, Vec<Vec<Span>>) {
    let mut sentences = Vec::new();
    let mut tokens_per_sentence = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut word_begin = None;

    let chars: Vec<char> = text.chars().collect();
    for i in 0..=chars.len() {
        let ch = chars.get(i).copied().unwrap_or(' ');
        if ch.is_alphanumeric() {
            word_begin.get_or_insert(i);
            continue;
        }
        if let Some(b) = word_begin.take() {
            current.push(span(b, i));
        }
        if !ch.is_whitespace() {
            current.push(span(i, i + 1));
            if matches!(ch, '.' | '!' | '?') {
                sentences.push(Span::covering(current.iter().copied()).unwrap());
                tokens_per_sentence.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.is_empty() {
        sentences.push(Span::covering(current.iter().copied()).unwrap());
        tokens_per_sentence.push(current);
    }
    (sentences, tokens_per_sentence)
}

/// A store holding `text` with sentence and token annotations.
pub fn tokenized_store(text: &str) -> AnnotatedText {
    let mut store = AnnotatedText::new("test", text);
    let (sentences, tokens) = segment(text);
    for (sentence, sentence_tokens) in sentences.into_iter().zip(tokens) {
        store.create_annotation(sentence, types::SENTENCE, Properties::new());
        for token in sentence_tokens {
            store.create_annotation(token, types::WORD_TOKEN, Properties::new());
        }
    }
    store
}

/// Fill an engine document's tokens and sentences from its text.
pub fn engine_tokenize(doc: &mut NlpDocument) {
    let (_, tokens) = segment(&doc.text);
    for sentence_tokens in tokens {
        let first = doc.tokens.len();
        for token in sentence_tokens {
            doc.push_token(token);
        }
        doc.push_sentence(first..doc.tokens.len());
    }
}

/// Character span of the `nth` occurrence of `needle` in `text`.
pub fn find(text: &str, needle: &str, nth: usize) -> Span {
    let (byte_idx, _) = text.match_indices(needle).nth(nth).unwrap();
    let begin = text[..byte_idx].chars().count();
    span(begin, begin + needle.chars().count())
}

/// Annotate the first occurrence of `needle` as `annotation_type`.
pub fn annotate(
    store: &mut AnnotatedText,
    needle: &str,
    annotation_type: &str,
) -> AnnotationId {
    let span = find(store.content(), needle, 0);
    store.create_annotation(span, annotation_type, Properties::new())
}

/// Annotate the `nth` occurrence of `needle` with a subtype.
pub fn annotate_with_subtype(
    store: &mut AnnotatedText,
    needle: &str,
    nth: usize,
    annotation_type: &str,
    subtype: &str,
) -> AnnotationId {
    let span = find(store.content(), needle, nth);
    store.create_annotation(
        span,
        annotation_type,
        Properties::new().with(keys::SUBTYPE, subtype),
    )
}

/// Index of the engine token starting at `begin`.
pub fn token_at(doc: &NlpDocument, begin: usize) -> usize {
    doc.tokens
        .iter()
        .position(|t| t.span.begin() == begin)
        .unwrap()
}
