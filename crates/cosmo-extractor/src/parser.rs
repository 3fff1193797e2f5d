//! Rule-based English parser
//!
//! Sentence segmentation, tagging, NER and dependency parsing in one pass.
//! Deterministic: the same text always yields the same analysis.

use tracing::debug;

use crate::dependency::DependencyParser;
use crate::lexicon::Lexicon;
use crate::ner::RuleBasedNer;
use crate::segment;
use crate::{EntityExtractor, LanguageParser, ParsedDocument, ParsedSentence};
use cosmo_core::Result;

/// Deterministic English parser built from lexicons and rules
pub struct RuleBasedParser {
    lexicon: Lexicon,
    ner: Box<dyn EntityExtractor>,
}

impl RuleBasedParser {
    pub fn new() -> Self {
        Self {
            lexicon: Lexicon::new(),
            ner: Box::new(RuleBasedNer::new()),
        }
    }

    /// Replace the entity recognizer
    pub fn with_ner(mut self, ner: impl EntityExtractor + 'static) -> Self {
        self.ner = Box::new(ner);
        self
    }

    fn parse_sentence(&self, offset: usize, text: &str) -> Result<ParsedSentence> {
        let mut tokens = segment::tokenize(text);
        self.lexicon.tag(&mut tokens);
        let root = DependencyParser::new(&self.lexicon).parse(&mut tokens);
        let entities = self.ner.extract(text)?;

        Ok(ParsedSentence {
            text: text.to_string(),
            offset,
            tokens,
            entities,
            root,
        })
    }
}

impl Default for RuleBasedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for RuleBasedParser {
    fn parse(&self, text: &str) -> Result<ParsedDocument> {
        let sentences = segment::sentences(text)
            .into_iter()
            .map(|(offset, sentence)| self.parse_sentence(offset, sentence))
            .collect::<Result<Vec<_>>>()?;

        let document = ParsedDocument { sentences };
        debug!(
            sentences = document.sentences.len(),
            tokens = document.token_count(),
            entities = document.entity_count(),
            "Parsed document"
        );

        Ok(document)
    }
}
