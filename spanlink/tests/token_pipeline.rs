//! End-to-end runs: tokenize a bare store, then tag and extract from it.

mod common;

use common::{engine_tokenize, find};
use spanlink::conventions::{keys, types};
use spanlink::{
    AnnotatedText, AnnotationId, AnnotationStore, EngineSettings, EntityMention, KbpRelation,
    Lemma, MockEngine, MockEngineFactory, Ner, NerSettings, PartOfSpeech, Processor,
    RelationTriple, Role, Tokenize,
};

const TEXT: &str = "Rachel lives in London. She likes it.";

fn tokenize(store: &mut AnnotatedText) {
    let engine = MockEngine::new("tokenizer").with_annotator(|doc| {
        engine_tokenize(doc);
        Ok(())
    });
    Tokenize::new(&MockEngineFactory::new(engine), &EngineSettings::default())
        .unwrap()
        .process(store)
        .unwrap();
}

fn token_ids(store: &AnnotatedText) -> Vec<AnnotationId> {
    store.by_type(types::WORD_TOKEN).iter().map(|a| a.id).collect()
}

fn toy_pos(word: &str) -> &'static str {
    match word {
        "." => ".",
        "in" => "IN",
        "lives" | "likes" => "VBZ",
        "She" | "it" => "PRP",
        _ => "NNP",
    }
}

#[test]
fn tokenize_creates_sentences_then_tokens() {
    let mut store = AnnotatedText::new("doc", TEXT);
    tokenize(&mut store);

    let sentences = store.by_type(types::SENTENCE);
    assert_eq!(sentences.len(), 2);
    assert_eq!(store.text(sentences[1]), Some("She likes it."));
    assert_eq!(token_ids(&store).len(), 9);

    // Sentence first, then its tokens
    let order: Vec<&str> = store
        .annotations()
        .iter()
        .take(3)
        .map(|a| a.annotation_type.as_str())
        .collect();
    assert_eq!(order, vec![types::SENTENCE, types::WORD_TOKEN, types::WORD_TOKEN]);
}

#[test]
fn pos_then_lemma_augment_tokens_in_place() {
    let mut store = AnnotatedText::new("doc", TEXT);
    tokenize(&mut store);
    let ids_before = token_ids(&store);

    let tagger = MockEngine::new("tagger").with_annotator(|doc| {
        for token in &mut doc.tokens {
            token.pos = Some(toy_pos(&token.text).to_string());
        }
        Ok(())
    });
    let report = PartOfSpeech::new(&MockEngineFactory::new(tagger), &EngineSettings::default())
        .unwrap()
        .process(&mut store)
        .unwrap();
    assert_eq!(report.replaced, 9);
    assert_eq!(report.created, 0);

    let lemmatizer = MockEngine::new("lemmatizer").with_annotator(|doc| {
        for token in &mut doc.tokens {
            // Tags from the previous stage are visible
            assert!(token.pos.is_some(), "'{}' lost its tag", token.text);
            let lemma = match token.text.as_str() {
                "lives" => "live".to_string(),
                "likes" => "like".to_string(),
                "She" => "she".to_string(),
                other => other.to_string(),
            };
            token.lemma = Some(lemma);
        }
        Ok(())
    });
    Lemma::new(&MockEngineFactory::new(lemmatizer), &EngineSettings::default())
        .unwrap()
        .process(&mut store)
        .unwrap();

    assert_eq!(token_ids(&store), ids_before);
    let lives = store
        .by_type(types::WORD_TOKEN)
        .into_iter()
        .find(|a| a.span == Some(find(TEXT, "lives", 0)))
        .unwrap();
    assert_eq!(lives.part_of_speech(), Some("VBZ"));
    assert_eq!(lives.lemma(), Some("live"));

    // Augmented tokens serialize with both properties
    let json = serde_json::to_value(lives).unwrap();
    assert_eq!(json["properties"][keys::PART_OF_SPEECH], "VBZ");
    assert_eq!(json["properties"][keys::LEMMA], "live");
}

#[test]
fn entities_then_relations() {
    let mut store = AnnotatedText::new("doc", TEXT);
    tokenize(&mut store);

    let recognizer = MockEngine::new("recognizer").with_annotator(|doc| {
        doc.mentions = vec![
            EntityMention::new(0, find(&doc.text, "Rachel", 0), "Rachel", "PERSON")
                .with_prob("PERSON", 0.98),
            EntityMention::new(1, find(&doc.text, "London", 0), "London", "CITY")
                .with_prob("CITY", 0.91),
        ];
        Ok(())
    });
    let report = Ner::new(&MockEngineFactory::new(recognizer), &NerSettings::default())
        .unwrap()
        .process(&mut store)
        .unwrap();
    assert_eq!(report.created, 2);

    let rachel = store.by_type(types::PERSON)[0].id;
    let london = store.by_type(types::LOCATION)[0];
    assert_eq!(london.subtype(), Some("CITY"));
    let london = london.id;

    let extractor = MockEngine::new("kbp").with_annotator(|doc| {
        // The entities created above come back as mentions in the first sentence
        assert_eq!(doc.sentences[0].mentions.len(), 2);
        assert!(doc.sentences[1].mentions.is_empty());
        doc.sentences[0]
            .kbp_triples
            .push(RelationTriple::new(vec![0], "per:cities_of_residence", vec![3]));
        Ok(())
    });
    KbpRelation::new(&MockEngineFactory::new(extractor), &EngineSettings::default())
        .unwrap()
        .process(&mut store)
        .unwrap();

    let residence = store.groups_of_type("relation/locationOfResidence");
    assert_eq!(residence.len(), 1);
    assert_eq!(
        residence[0].participants,
        vec![(Role::Source, rachel), (Role::Target, london)]
    );
}
