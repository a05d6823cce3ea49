//! Shared naming conventions for annotation types, property keys and groups.
//!
//! Every component reads and writes the store through these names, so a
//! relation processor can find the entities a NER processor created.

/// Annotation type strings.
pub mod types {
    /// Prefix for all entity types.
    pub const ENTITY_PREFIX: &str = "entity/";
    /// Prefix for grammatical units.
    pub const GRAMMAR_PREFIX: &str = "grammar/";

    /// A sentence.
    pub const SENTENCE: &str = "grammar/sentence";
    /// A word token.
    pub const WORD_TOKEN: &str = "grammar/wordToken";

    /// Catch-all entity type for labels with no finer local equivalent.
    pub const UNDEFINED_ENTITY: &str = "entity";

    pub const PERSON: &str = "entity/person";
    pub const LOCATION: &str = "entity/location";
    pub const ORGANISATION: &str = "entity/organisation";
    pub const MONEY: &str = "entity/money";
    pub const NUMBER: &str = "entity/number";
    pub const ORDINAL: &str = "entity/ordinal";
    pub const PERCENT: &str = "entity/percent";
    pub const TEMPORAL: &str = "entity/temporal";
    pub const EMAIL: &str = "entity/email";
    pub const URL: &str = "entity/url";
    pub const NATIONALITY: &str = "entity/nationality";
    pub const RELIGION: &str = "entity/religion";
    pub const IDEOLOGY: &str = "entity/ideology";
}

/// Property keys.
pub mod keys {
    /// Confidence in [0, 1].
    pub const PROBABILITY: &str = "probability";
    /// Finer-grained label under the primary type.
    pub const SUBTYPE: &str = "subtype";
    /// Part-of-speech tag.
    pub const PART_OF_SPEECH: &str = "partOfSpeech";
    /// Lemma.
    pub const LEMMA: &str = "lemma";
}

/// Group type strings.
pub mod groups {
    /// Coreference chain.
    pub const COREFERENCE: &str = "grammar/coreference";
    /// Prefix for relation groups (`relation/spouse`, ...).
    pub const RELATION_PREFIX: &str = "relation/";
}
