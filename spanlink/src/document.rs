//! The engine-side document model.
//!
//! The engine wants a strict hierarchy: a document holds sentences, a
//! sentence holds a contiguous run of tokens, an entity mention covers whole
//! tokens. The store holds none of that; [`crate::DocumentProjector`] builds
//! this model from it, the engine annotates it in place, and
//! [`crate::backproject`] reads the engine's output back.
//!
//! ```text
//! NlpDocument
//! ├── tokens:    [Rachel][lives][in][London][.]     (document order)
//! ├── sentences: S0 = tokens 0..5, mentions [0, 1]
//! ├── mentions:  M0 PERSON tokens 0..1, M1 CITY tokens 3..4
//! └── engine output
//!     ├── coref_chains
//!     └── per sentence: kbp_triples, openie_triples
//! ```
//!
//! All token references (ranges, triple arguments) are indices into
//! [`NlpDocument::tokens`]. Coreference mentions are the exception: they use
//! the engine's 1-based, sentence-relative numbering.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use spanlink_core::offset::slice_chars;
use spanlink_core::Span;

/// Named-entity tag meaning "no entity".
pub const NO_TAG: &str = "O";

/// Tag → probability.
pub type TagProbabilities = BTreeMap<String, f64>;

// =============================================================================
// Token
// =============================================================================

/// A word token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Character bounds
    pub span: Span,
    /// Surface form
    pub text: String,
    /// Part-of-speech tag
    pub pos: Option<String>,
    /// Lemma
    pub lemma: Option<String>,
    /// Named-entity tag ([`NO_TAG`] when none)
    pub ner: String,
    /// Named-entity tag probabilities
    pub ner_probs: TagProbabilities,
    /// Index of the containing sentence
    pub sentence_index: Option<usize>,
    /// 1-based position within the containing sentence
    pub index: Option<usize>,
}

impl Token {
    /// Create an untagged token.
    #[must_use]
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
            pos: None,
            lemma: None,
            ner: NO_TAG.to_string(),
            ner_probs: TagProbabilities::new(),
            sentence_index: None,
            index: None,
        }
    }

    /// Set the part-of-speech tag.
    #[must_use]
    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    /// Set the lemma.
    #[must_use]
    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    /// Check if the token carries a named-entity tag.
    #[must_use]
    pub fn is_tagged(&self) -> bool {
        self.ner != NO_TAG
    }
}

// =============================================================================
// Sentence
// =============================================================================

/// A sentence and the engine output scoped to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// Position in the document (0-based)
    pub index: usize,
    /// Character bounds
    pub span: Span,
    /// Surface form
    pub text: String,
    /// Contiguous range of document token indices
    pub token_range: Option<Range<usize>>,
    /// Indices of contained tokens
    pub tokens: Vec<usize>,
    /// Indices of contained entity mentions
    pub mentions: Vec<usize>,
    /// KBP relation triples (engine output)
    pub kbp_triples: Vec<RelationTriple>,
    /// Open information extraction triples (engine output)
    pub openie_triples: Vec<RelationTriple>,
}

impl Sentence {
    /// Create an empty sentence.
    #[must_use]
    pub fn new(index: usize, span: Span, text: impl Into<String>) -> Self {
        Self {
            index,
            span,
            text: text.into(),
            token_range: None,
            tokens: Vec::new(),
            mentions: Vec::new(),
            kbp_triples: Vec::new(),
            openie_triples: Vec::new(),
        }
    }

    /// First document token index of this sentence.
    #[must_use]
    pub fn token_offset(&self) -> Option<usize> {
        self.token_range.as_ref().map(|r| r.start)
    }
}

// =============================================================================
// Entity mention
// =============================================================================

/// An entity mention presented to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Position in the document's mention list
    pub index: usize,
    /// Character bounds
    pub span: Span,
    /// Surface form
    pub text: String,
    /// Engine label
    pub tag: String,
    /// Engine label probabilities
    pub tag_probs: TagProbabilities,
    /// `[first, last + 1)` over contained token indices
    pub token_range: Option<Range<usize>>,
    /// Indices of contained tokens
    pub tokens: Vec<usize>,
    /// Index of the containing sentence
    pub sentence_index: Option<usize>,
}

impl EntityMention {
    /// Create a mention with no token alignment yet.
    #[must_use]
    pub fn new(index: usize, span: Span, text: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            index,
            span,
            text: text.into(),
            tag: tag.into(),
            tag_probs: TagProbabilities::new(),
            token_range: None,
            tokens: Vec::new(),
            sentence_index: None,
        }
    }

    /// Set one tag probability.
    #[must_use]
    pub fn with_prob(mut self, tag: impl Into<String>, prob: f64) -> Self {
        self.tag_probs.insert(tag.into(), prob);
        self
    }

    /// Highest tag probability, `None` when the engine reported none.
    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        self.tag_probs.values().copied().reduce(f64::max)
    }
}

// =============================================================================
// Engine output
// =============================================================================

/// One coreference mention, in the engine's sentence-relative numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefMention {
    /// Sentence number (1-based)
    pub sentence_num: usize,
    /// First token (1-based, within the sentence)
    pub start_index: usize,
    /// One past the last token (1-based, within the sentence)
    pub end_index: usize,
    /// Head token (1-based, within the sentence)
    pub head_index: usize,
}

impl CorefMention {
    /// Create a mention.
    #[must_use]
    pub const fn new(
        sentence_num: usize,
        start_index: usize,
        end_index: usize,
        head_index: usize,
    ) -> Self {
        Self {
            sentence_num,
            start_index,
            end_index,
            head_index,
        }
    }
}

/// A coreference chain: mentions the engine believes refer to one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefChain {
    /// Engine chain id
    pub id: u64,
    /// Mentions in engine order
    pub mentions: Vec<CorefMention>,
}

impl CorefChain {
    /// Create a chain.
    #[must_use]
    pub fn new(id: u64, mentions: Vec<CorefMention>) -> Self {
        Self { id, mentions }
    }
}

/// A subject / relation / object triple over document token indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationTriple {
    /// Subject tokens
    pub subject: Vec<usize>,
    /// Relation predicate (`per:spouse`, `lives in`, ...)
    pub relation: String,
    /// Lemmatized relation gloss (`live in`)
    pub relation_lemma: String,
    /// Object tokens
    pub object: Vec<usize>,
    /// Confidence
    pub confidence: f64,
}

impl RelationTriple {
    /// Create a triple with confidence 1.0 and the predicate as its own lemma.
    #[must_use]
    pub fn new(subject: Vec<usize>, relation: impl Into<String>, object: Vec<usize>) -> Self {
        let relation = relation.into();
        Self {
            subject,
            relation_lemma: relation.clone(),
            relation,
            object,
            confidence: 1.0,
        }
    }

    /// Set the relation lemma.
    #[must_use]
    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.relation_lemma = lemma.into();
        self
    }

    /// Set the confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}

// =============================================================================
// Document
// =============================================================================

/// A document in the engine's hierarchical model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NlpDocument {
    /// Full text
    pub text: String,
    /// Tokens in document order
    pub tokens: Vec<Token>,
    /// Sentences in document order
    pub sentences: Vec<Sentence>,
    /// Entity mentions in document order
    pub mentions: Vec<EntityMention>,
    /// Coreference chains (engine output)
    pub coref_chains: Vec<CorefChain>,
}

impl NlpDocument {
    /// A document with text only, for engines that tokenize themselves.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Append a token covering `span` and return its index.
    ///
    /// The token's text is sliced from the document text (empty when the
    /// span runs past it).
    pub fn push_token(&mut self, span: Span) -> usize {
        let text = slice_chars(&self.text, span).unwrap_or_default();
        self.tokens.push(Token::new(span, text));
        self.tokens.len() - 1
    }

    /// Append a sentence over the tokens in `tokens` and return its index.
    ///
    /// The sentence span runs from the first token's begin to the last
    /// token's end; the tokens are stamped with the sentence index and
    /// their 1-based position. Returns `None` for an empty or out-of-range
    /// token range.
    pub fn push_sentence(&mut self, tokens: Range<usize>) -> Option<usize> {
        if tokens.is_empty() || tokens.end > self.tokens.len() {
            return None;
        }
        let span = Span::covering(self.tokens[tokens.clone()].iter().map(|t| t.span))?;
        let index = self.sentences.len();
        let text = slice_chars(&self.text, span).unwrap_or_default();

        let mut sentence = Sentence::new(index, span, text);
        for (position, token_idx) in tokens.clone().enumerate() {
            let token = &mut self.tokens[token_idx];
            token.sentence_index = Some(index);
            token.index = Some(position + 1);
            sentence.tokens.push(token_idx);
        }
        sentence.token_range = Some(tokens);
        self.sentences.push(sentence);
        Some(index)
    }

    /// Sentence by the engine's 1-based sentence number.
    #[must_use]
    pub fn sentence_by_num(&self, sentence_num: usize) -> Option<&Sentence> {
        sentence_num
            .checked_sub(1)
            .and_then(|idx| self.sentences.get(idx))
    }

    /// Bounding span of the given document tokens.
    ///
    /// `None` if the set is empty or any index is out of range.
    #[must_use]
    pub fn span_of_tokens(&self, token_indices: &[usize]) -> Option<Span> {
        let spans: Option<Vec<Span>> = token_indices
            .iter()
            .map(|&idx| self.tokens.get(idx).map(|t| t.span))
            .collect();
        Span::covering(spans?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(b: usize, e: usize) -> Span {
        Span::new(b, e).unwrap()
    }

    fn rachel() -> NlpDocument {
        let mut doc = NlpDocument::from_text("Rachel lives in London.");
        for (b, e) in [(0, 6), (7, 12), (13, 15), (16, 22), (22, 23)] {
            doc.push_token(span(b, e));
        }
        doc
    }

    #[test]
    fn test_push_sentence_stamps_tokens() {
        let mut doc = rachel();
        let idx = doc.push_sentence(0..5).unwrap();

        let sentence = &doc.sentences[idx];
        assert_eq!(sentence.span, span(0, 23));
        assert_eq!(sentence.text, "Rachel lives in London.");
        assert_eq!(sentence.token_offset(), Some(0));
        assert_eq!(doc.tokens[3].text, "London");
        assert_eq!(doc.tokens[3].index, Some(4));
        assert_eq!(doc.tokens[3].sentence_index, Some(0));
    }

    #[test]
    fn test_push_sentence_rejects_bad_ranges() {
        let mut doc = rachel();
        assert_eq!(doc.push_sentence(3..3), None);
        assert_eq!(doc.push_sentence(2..9), None);
        assert!(doc.sentences.is_empty());
    }

    #[test]
    fn test_sentence_by_num_is_one_based() {
        let mut doc = rachel();
        doc.push_sentence(0..5);
        assert!(doc.sentence_by_num(0).is_none());
        assert_eq!(doc.sentence_by_num(1).map(|s| s.index), Some(0));
        assert!(doc.sentence_by_num(2).is_none());
    }

    #[test]
    fn test_span_of_tokens() {
        let doc = rachel();
        assert_eq!(doc.span_of_tokens(&[3, 2]), Some(span(13, 22)));
        assert_eq!(doc.span_of_tokens(&[]), None);
        assert_eq!(doc.span_of_tokens(&[1, 40]), None);
    }

    #[test]
    fn test_mention_confidence() {
        let m = EntityMention::new(0, span(0, 6), "Rachel", "PERSON");
        assert_eq!(m.confidence(), None);

        let m = m.with_prob("PERSON", 0.7).with_prob("ORGANIZATION", 0.2);
        assert_eq!(m.confidence(), Some(0.7));
    }

    #[test]
    fn test_token_defaults_untagged() {
        let t = Token::new(span(0, 2), "he").with_pos("PRP");
        assert!(!t.is_tagged());
        assert_eq!(t.ner, NO_TAG);
        assert_eq!(t.pos.as_deref(), Some("PRP"));
    }
}
