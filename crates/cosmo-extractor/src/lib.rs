//! Cosmo Extractor - Knowledge extraction pipeline
//!
//! Turns cleaned text into knowledge:
//! - Sentence segmentation and tokenization
//! - Part-of-speech tagging and lemmatization
//! - Named Entity Recognition (gazetteer + patterns)
//! - Shallow dependency parsing
//! - Co-occurrence pairs and (subject, predicate, object) triples

use cosmo_core::Result;
use serde::{Deserialize, Serialize};

pub mod dependency;
pub mod lexicon;
pub mod ner;
pub mod parser;
pub mod relation;
pub mod segment;

pub use ner::RuleBasedNer;
pub use parser::RuleBasedParser;
pub use relation::{Extraction, Extractor};

// ============================================================================
// Entity Types
// ============================================================================

/// Named entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLabel {
    Organization,
    Person,
    Gpe,
    Location,
    Product,
    Event,
    Date,
    Cardinal,
    Other,
}

impl EntityLabel {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organization => "ORG",
            Self::Person => "PERSON",
            Self::Gpe => "GPE",
            Self::Location => "LOC",
            Self::Product => "PRODUCT",
            Self::Event => "EVENT",
            Self::Date => "DATE",
            Self::Cardinal => "CARDINAL",
            Self::Other => "MISC",
        }
    }

    /// Categories that take part in co-occurrence pairs
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Self::Organization
                | Self::Person
                | Self::Gpe
                | Self::Location
                | Self::Product
                | Self::Event
        )
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entity span recognized in a sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub text: String,
    pub label: EntityLabel,
    /// Byte offsets within the sentence text
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
}

// ============================================================================
// Token Types
// ============================================================================

/// Coarse part-of-speech tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    Noun,
    ProperNoun,
    Verb,
    Aux,
    Adjective,
    Adverb,
    Determiner,
    Preposition,
    Pronoun,
    Conjunction,
    Particle,
    Number,
    Punct,
}

impl PosTag {
    /// Tags that can head a noun chunk
    pub fn is_nominal(&self) -> bool {
        matches!(
            self,
            Self::Noun | Self::ProperNoun | Self::Pronoun | Self::Number
        )
    }
}

/// Dependency relation of a token to its head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepLabel {
    Root,
    Nsubj,
    Nsubjpass,
    Dobj,
    Attr,
    Acomp,
    Prep,
    Pobj,
    Agent,
    Aux,
    Auxpass,
    Neg,
    Det,
    Amod,
    Compound,
    Nummod,
    Advmod,
    Cc,
    Conj,
    Xcomp,
    Relcl,
    Punct,
    Dep,
}

impl DepLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "ROOT",
            Self::Nsubj => "nsubj",
            Self::Nsubjpass => "nsubjpass",
            Self::Dobj => "dobj",
            Self::Attr => "attr",
            Self::Acomp => "acomp",
            Self::Prep => "prep",
            Self::Pobj => "pobj",
            Self::Agent => "agent",
            Self::Aux => "aux",
            Self::Auxpass => "auxpass",
            Self::Neg => "neg",
            Self::Det => "det",
            Self::Amod => "amod",
            Self::Compound => "compound",
            Self::Nummod => "nummod",
            Self::Advmod => "advmod",
            Self::Cc => "cc",
            Self::Conj => "conj",
            Self::Xcomp => "xcomp",
            Self::Relcl => "relcl",
            Self::Punct => "punct",
            Self::Dep => "dep",
        }
    }

    /// Subject relations
    pub fn is_subject(&self) -> bool {
        matches!(self, Self::Nsubj | Self::Nsubjpass)
    }

    /// Relations accepted as the object of a triple
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Dobj | Self::Pobj | Self::Attr)
    }
}

impl std::fmt::Display for DepLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A word or punctuation mark with its analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: PosTag,
    pub dep: DepLabel,
    /// Index of the head token in the sentence; the root points at itself
    pub head: usize,
    /// Byte offsets within the sentence text
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        let text = text.into();
        Self {
            lemma: text.to_lowercase(),
            text,
            pos: PosTag::Noun,
            dep: DepLabel::Dep,
            head: 0,
            start,
            end,
        }
    }
}

// ============================================================================
// Parsed Document
// ============================================================================

/// One analyzed sentence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedSentence {
    pub text: String,
    /// Byte offset of the sentence within the document
    pub offset: usize,
    pub tokens: Vec<Token>,
    pub entities: Vec<NamedEntity>,
    /// Index of the root token, if the sentence has one
    pub root: Option<usize>,
}

impl ParsedSentence {
    /// The root token
    pub fn root_token(&self) -> Option<&Token> {
        self.root.and_then(|i| self.tokens.get(i))
    }

    /// Syntactic children of `index` to its left, in order
    pub fn lefts(&self, index: usize) -> impl Iterator<Item = &Token> + '_ {
        self.tokens[..index.min(self.tokens.len())]
            .iter()
            .filter(move |t| t.head == index)
    }

    /// Syntactic children of `index` to its right, in order
    pub fn rights(&self, index: usize) -> impl Iterator<Item = &Token> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .skip(index + 1)
            .filter(move |(_, t)| t.head == index)
            .map(|(_, t)| t)
    }
}

/// Result of running a language parser over a text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub sentences: Vec<ParsedSentence>,
}

impl ParsedDocument {
    pub fn entity_count(&self) -> usize {
        self.sentences.iter().map(|s| s.entities.len()).sum()
    }

    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for entity recognizers working on one sentence
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<Vec<NamedEntity>>;
}

/// Trait for full linguistic parsers (segmentation, tagging, NER, dependencies)
pub trait LanguageParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<ParsedDocument>;
}
