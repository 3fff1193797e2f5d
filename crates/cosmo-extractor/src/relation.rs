//! Relation Extraction (RE) module
//!
//! Derives two kinds of knowledge from parsed sentences:
//! - Co-occurrence pairs between named entities of the same sentence
//! - One (subject, predicate, object) triple per sentence, read off the
//!   dependency tree around the root verb
//!
//! Author: hephaex@gmail.com

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{LanguageParser, ParsedSentence, RuleBasedParser};
use cosmo_core::{EntityPair, Result, Triple};

// ============================================================================
// Extraction Result
// ============================================================================

/// Pairs and triples in first-encounter order, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub pairs: IndexSet<EntityPair>,
    pub triples: IndexSet<Triple>,
}

impl Extraction {
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn triple_count(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.triples.is_empty()
    }

    /// Distinct subjects and objects of the triples
    pub fn unique_entities(&self) -> IndexSet<&str> {
        self.triples
            .iter()
            .flat_map(|t| [t.subject.as_str(), t.object.as_str()])
            .collect()
    }

    /// The first `n` triples
    pub fn top_relations(&self, n: usize) -> Vec<Triple> {
        self.triples.iter().take(n).cloned().collect()
    }
}

// ============================================================================
// Extractor
// ============================================================================

/// Entity/relation extractor over a pluggable language parser
pub struct Extractor {
    parser: Box<dyn LanguageParser>,
}

impl Extractor {
    /// Create an extractor backed by the rule-based parser
    pub fn new() -> Self {
        Self {
            parser: Box::new(RuleBasedParser::new()),
        }
    }

    /// Use a different language parser
    pub fn with_parser(parser: impl LanguageParser + 'static) -> Self {
        Self {
            parser: Box::new(parser),
        }
    }

    /// Extract pairs and triples from cleaned text
    pub fn extract(&self, text: &str) -> Result<Extraction> {
        let document = self.parser.parse(text)?;
        let mut extraction = Extraction::default();

        for sentence in &document.sentences {
            extraction.pairs.extend(sentence_pairs(sentence));
            if let Some(triple) = sentence_triple(sentence) {
                extraction.triples.insert(triple);
            }
        }

        info!(
            sentences = document.sentences.len(),
            pairs = extraction.pair_count(),
            triples = extraction.triple_count(),
            "Knowledge extracted"
        );

        Ok(extraction)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered combinations of the sentence's relational entities
pub fn sentence_pairs(sentence: &ParsedSentence) -> Vec<EntityPair> {
    let entities: Vec<&str> = sentence
        .entities
        .iter()
        .filter(|e| e.label.is_relational())
        .map(|e| e.text.trim())
        .collect();

    let mut pairs = Vec::new();
    for (i, first) in entities.iter().enumerate() {
        for second in &entities[i + 1..] {
            if first != second {
                pairs.push(EntityPair::new(*first, *second));
            }
        }
    }
    pairs
}

/// Subject/root-lemma/object triple, when the root has both
pub fn sentence_triple(sentence: &ParsedSentence) -> Option<Triple> {
    let root = sentence.root?;
    let predicate = &sentence.tokens.get(root)?.lemma;

    let subject = sentence.lefts(root).find(|t| t.dep.is_subject())?;
    let object = sentence.rights(root).find(|t| t.dep.is_object())?;

    Some(Triple::new(
        subject.text.clone(),
        predicate.clone(),
        object.text.clone(),
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DepLabel, EntityLabel, NamedEntity, ParsedDocument, PosTag, Token};

    fn pair(a: &str, b: &str) -> EntityPair {
        EntityPair::new(a, b)
    }

    #[test]
    fn test_pairs_for_three_entities() {
        let extraction = Extractor::new()
            .extract("ISRO of India studies the Bay of Bengal.")
            .unwrap();

        let pairs: Vec<EntityPair> = extraction.pairs.iter().cloned().collect();
        assert_eq!(
            pairs,
            vec![
                pair("ISRO", "India"),
                pair("ISRO", "Bay of Bengal"),
                pair("India", "Bay of Bengal"),
            ]
        );
    }

    #[test]
    fn test_triple_from_simple_clause() {
        let extraction = Extractor::new()
            .extract("INSAT monitors the Arabian Sea.")
            .unwrap();

        let triples: Vec<&Triple> = extraction.triples.iter().collect();
        assert_eq!(triples, vec![&Triple::new("INSAT", "monitor", "Sea")]);
    }

    #[test]
    fn test_triple_takes_first_of_listed_subjects() {
        let extraction = Extractor::new()
            .extract("ISRO, NASA and ESA signed an agreement in Paris.")
            .unwrap();

        let triples: Vec<&Triple> = extraction.triples.iter().collect();
        assert_eq!(triples, vec![&Triple::new("ISRO", "sign", "agreement")]);
    }

    #[test]
    fn test_triple_object_stops_before_time_phrase() {
        let extraction = Extractor::new()
            .extract("ISRO will launch Oceansat-3 next year.")
            .unwrap();

        let triples: Vec<&Triple> = extraction.triples.iter().collect();
        assert_eq!(triples, vec![&Triple::new("ISRO", "launch", "Oceansat-3")]);
    }

    #[test]
    fn test_copula_triple() {
        let extraction = Extractor::new().extract("MOSDAC is a data centre.").unwrap();
        assert!(extraction
            .triples
            .contains(&Triple::new("MOSDAC", "be", "centre")));
    }

    #[test]
    fn test_no_self_pairs() {
        let extraction = Extractor::new()
            .extract("India and India are listed.")
            .unwrap();
        assert!(extraction.pairs.is_empty());
    }

    #[test]
    fn test_duplicates_collapse_in_order() {
        let extraction = Extractor::new()
            .extract("ISRO launched Oceansat. NASA launched Landsat. ISRO launched Oceansat.")
            .unwrap();

        assert_eq!(extraction.pair_count(), 2);
        assert_eq!(extraction.triple_count(), 2);
        assert_eq!(
            extraction.triples.first(),
            Some(&Triple::new("ISRO", "launch", "Oceansat"))
        );
        assert_eq!(
            extraction.unique_entities().into_iter().collect::<Vec<_>>(),
            vec!["ISRO", "Oceansat", "NASA", "Landsat"]
        );
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let text = "INSAT-3D observes cyclones over the Bay of Bengal. \
                    The Arabian Sea warms in May. ISRO and IMD share weather data.";
        let extractor = Extractor::new();

        let first = extractor.extract(text).unwrap();
        let second = extractor.extract(text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_text() {
        let extraction = Extractor::new().extract("").unwrap();
        assert!(extraction.is_empty());
        assert!(extraction.unique_entities().is_empty());
    }

    /// Hand-built parse with a passive subject and a pobj object
    struct FixedParser;

    impl LanguageParser for FixedParser {
        fn parse(&self, _text: &str) -> Result<ParsedDocument> {
            let token = |text: &str, lemma: &str, dep: DepLabel, head: usize| Token {
                text: text.to_string(),
                lemma: lemma.to_string(),
                pos: PosTag::Noun,
                dep,
                head,
                start: 0,
                end: 0,
            };

            Ok(ParsedDocument {
                sentences: vec![ParsedSentence {
                    text: String::new(),
                    offset: 0,
                    tokens: vec![
                        token("Kalpana", "Kalpana", DepLabel::Nsubjpass, 1),
                        token("retired", "retire", DepLabel::Root, 1),
                        token("Ahmedabad", "Ahmedabad", DepLabel::Pobj, 1),
                    ],
                    entities: vec![
                        NamedEntity {
                            text: " Kalpana ".to_string(),
                            label: EntityLabel::Product,
                            start: 0,
                            end: 0,
                            confidence: 1.0,
                        },
                        NamedEntity {
                            text: "2017".to_string(),
                            label: EntityLabel::Date,
                            start: 0,
                            end: 0,
                            confidence: 1.0,
                        },
                    ],
                    root: Some(1),
                }],
            })
        }
    }

    #[test]
    fn test_custom_parser_rules() {
        let extraction = Extractor::with_parser(FixedParser).extract("ignored").unwrap();

        // Only one relational entity: no pair
        assert!(extraction.pairs.is_empty());
        assert_eq!(
            extraction.triples.first(),
            Some(&Triple::new("Kalpana", "retire", "Ahmedabad"))
        );
    }

    proptest::proptest! {
        #[test]
        fn prop_pairs_never_self_and_extraction_is_stable(
            sentences in proptest::collection::vec(
                proptest::sample::select(vec![
                    "ISRO of India studies the Bay of Bengal.",
                    "INSAT monitors the Arabian Sea.",
                    "Kalpana observes clouds over Ahmedabad.",
                    "The ocean is warm.",
                    "MOSDAC distributes INSAT data to India and Sri Lanka.",
                ]),
                0..6,
            )
        ) {
            let text = sentences.join(" ");
            let extractor = Extractor::new();
            let first = extractor.extract(&text).unwrap();
            let second = extractor.extract(&text).unwrap();

            proptest::prop_assert!(first.pairs.iter().all(|p| p.source != p.target));
            proptest::prop_assert_eq!(first, second);
        }
    }
}
