//! Named Entity Recognition (NER) module
//!
//! Rule-based recognition for space and earth-observation text:
//! - Gazetteer: agencies, satellites, seas, regions and places
//! - Patterns: model designations, acronyms, dates, numbers, titled names
//! - Capitalized runs classified by their keywords ("Bay", "Centre", ...)

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::{EntityExtractor, EntityLabel, NamedEntity};
use cosmo_core::Result;

// ============================================================================
// Keyword Tables
// ============================================================================

const ORGANIZATION_KEYWORDS: &[&str] = &[
    "agency", "organisation", "organization", "centre", "center", "institute", "university",
    "department", "ministry", "corporation", "company", "board", "council", "laboratory",
    "society", "commission", "administration", "authority", "survey", "services", "office",
    "bureau", "academy", "foundation",
];

const EVENT_KEYWORDS: &[&str] = &[
    "summit", "conference", "cyclone", "storm", "war", "games", "olympics", "festival",
    "expo", "symposium", "workshop",
];

const LOCATION_KEYWORDS: &[&str] = &[
    "sea", "ocean", "bay", "gulf", "river", "coast", "peninsula", "island", "islands", "lake",
    "strait", "basin", "desert", "mountains", "hills", "plateau", "valley", "ghats", "delta",
];

const GPE_KEYWORDS: &[&str] = &[
    "states", "republic", "kingdom", "pradesh", "nadu", "union", "emirates", "city",
];

/// Endings of single-word place names
const PLACE_SUFFIXES: &[&str] = &["pur", "bad", "nagar", "garh", "pura", "stan", "land"];

/// Capitalized words that never start an entity
const LEADING_STOPWORDS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "in", "on", "at", "for", "from", "by",
    "with", "to", "of", "our", "its", "their", "it", "we", "they", "during", "since", "about",
];

/// Uppercase words that are not acronyms of anything
const ACRONYM_STOPWORDS: &[&str] = &[
    "THE", "AND", "OF", "TO", "IN", "FOR", "ON", "AT", "BY", "WITH", "FROM", "IS", "ARE",
    "OR", "IT", "WE", "NEW", "WELCOME", "ABOUT", "HOME", "CONTACT", "LOGIN", "FAQ", "MORE", "NEWS",
];

// ============================================================================
// Rule-based NER
// ============================================================================

/// Dictionary entry for entity matching
#[derive(Debug, Clone)]
pub struct DictionaryEntry {
    pub term: String,
    pub label: EntityLabel,
    pub aliases: Vec<String>,
}

/// Rule-based NER using regex patterns and dictionaries
pub struct RuleBasedNer {
    /// Pattern rules (regex -> label)
    patterns: Vec<(Regex, EntityLabel, f32)>,
    /// Dictionary of known terms
    dictionary: HashMap<String, DictionaryEntry>,
    /// Capitalized word runs ("Space Applications Centre")
    phrase: Option<Regex>,
    /// Single capitalized words
    word: Option<Regex>,
    acronym_stopwords: HashSet<&'static str>,
}

impl RuleBasedNer {
    /// Create a recognizer with the default earth-observation rules
    pub fn new() -> Self {
        let mut ner = Self {
            patterns: Vec::new(),
            dictionary: HashMap::new(),
            phrase: Regex::new(r"\b[A-Z][a-z]+(?:(?:\s+(?:of|the|for))*\s+[A-Z][a-z]+)+\b").ok(),
            word: Regex::new(r"\b[A-Z][a-z]{2,}\b").ok(),
            acronym_stopwords: ACRONYM_STOPWORDS.iter().copied().collect(),
        };

        ner.init_patterns();
        ner.init_dictionary();
        ner
    }

    /// Initialize regex patterns
    fn init_patterns(&mut self) {
        // Model designations: INSAT-3D, Oceansat-2, Aditya-L1
        self.add_pattern(
            r"\b[A-Z][A-Za-z]*-[A-Z]?\d[A-Za-z0-9]*\b",
            EntityLabel::Product,
            0.9,
        );

        // Titled names
        self.add_pattern(
            r"\b(?:Dr|Mr|Mrs|Ms|Prof|Shri|Smt)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*",
            EntityLabel::Person,
            0.85,
        );

        // Dates
        self.add_pattern(
            r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)(?:\s+\d{1,2})?(?:,?\s+\d{4})?\b",
            EntityLabel::Date,
            0.9,
        );
        self.add_pattern(r"\b(?:19|20)\d{2}\b", EntityLabel::Date, 0.85);

        // Acronyms: ISRO, NOAA
        self.add_pattern(r"\b[A-Z]{2,}[0-9]*\b", EntityLabel::Organization, 0.6);

        // Bare numbers
        self.add_pattern(r"\b\d+(?:\.\d+)?\b", EntityLabel::Cardinal, 0.5);
    }

    /// Initialize the gazetteer
    fn init_dictionary(&mut self) {
        // Agencies
        self.add_term(
            "ISRO",
            EntityLabel::Organization,
            vec!["Indian Space Research Organisation", "Indian Space Research Organization"],
        );
        self.add_term("MOSDAC", EntityLabel::Organization, vec![]);
        self.add_term(
            "NASA",
            EntityLabel::Organization,
            vec!["National Aeronautics and Space Administration"],
        );
        self.add_term("NOAA", EntityLabel::Organization, vec![]);
        self.add_term("ESA", EntityLabel::Organization, vec!["European Space Agency"]);
        self.add_term("EUMETSAT", EntityLabel::Organization, vec![]);
        self.add_term("JAXA", EntityLabel::Organization, vec![]);
        self.add_term("CNES", EntityLabel::Organization, vec![]);
        self.add_term("SAC", EntityLabel::Organization, vec!["Space Applications Centre"]);
        self.add_term("IMD", EntityLabel::Organization, vec!["India Meteorological Department"]);
        self.add_term("NRSC", EntityLabel::Organization, vec!["National Remote Sensing Centre"]);
        self.add_term(
            "INCOIS",
            EntityLabel::Organization,
            vec!["Indian National Centre for Ocean Information Services"],
        );

        // Satellites and launch vehicles
        self.add_term("INSAT", EntityLabel::Product, vec!["INSAT-3D", "INSAT-3DR", "INSAT-3DS"]);
        self.add_term("Kalpana-1", EntityLabel::Product, vec!["Kalpana"]);
        self.add_term("Oceansat", EntityLabel::Product, vec!["Oceansat-2", "Oceansat-3"]);
        self.add_term("Scatsat", EntityLabel::Product, vec!["SCATSAT-1"]);
        self.add_term("Megha-Tropiques", EntityLabel::Product, vec![]);
        self.add_term("SARAL", EntityLabel::Product, vec!["SARAL-AltiKa"]);
        self.add_term("Cartosat", EntityLabel::Product, vec![]);
        self.add_term("Resourcesat", EntityLabel::Product, vec![]);
        self.add_term("Chandrayaan", EntityLabel::Product, vec![]);
        self.add_term("Mangalyaan", EntityLabel::Product, vec![]);
        self.add_term("GSAT", EntityLabel::Product, vec![]);
        self.add_term("PSLV", EntityLabel::Product, vec![]);
        self.add_term("GSLV", EntityLabel::Product, vec![]);
        self.add_term("Landsat", EntityLabel::Product, vec![]);
        self.add_term("MODIS", EntityLabel::Product, vec![]);

        // Countries, states and cities
        self.add_term("India", EntityLabel::Gpe, vec!["Bharat"]);
        self.add_term("Gujarat", EntityLabel::Gpe, vec![]);
        self.add_term("Ahmedabad", EntityLabel::Gpe, vec![]);
        self.add_term("Bengaluru", EntityLabel::Gpe, vec!["Bangalore"]);
        self.add_term("Chennai", EntityLabel::Gpe, vec![]);
        self.add_term("Mumbai", EntityLabel::Gpe, vec![]);
        self.add_term("Kolkata", EntityLabel::Gpe, vec![]);
        self.add_term("Delhi", EntityLabel::Gpe, vec!["New Delhi"]);
        self.add_term("Kerala", EntityLabel::Gpe, vec![]);
        self.add_term("Odisha", EntityLabel::Gpe, vec![]);
        self.add_term("Andhra Pradesh", EntityLabel::Gpe, vec![]);
        self.add_term("Tamil Nadu", EntityLabel::Gpe, vec![]);
        self.add_term("Sri Lanka", EntityLabel::Gpe, vec![]);
        self.add_term("Bangladesh", EntityLabel::Gpe, vec![]);
        self.add_term("Pakistan", EntityLabel::Gpe, vec![]);
        self.add_term("China", EntityLabel::Gpe, vec![]);
        self.add_term("Japan", EntityLabel::Gpe, vec![]);
        self.add_term("France", EntityLabel::Gpe, vec![]);
        self.add_term("United States", EntityLabel::Gpe, vec!["USA"]);

        // Seas and regions
        self.add_term("Bay of Bengal", EntityLabel::Location, vec![]);
        self.add_term("Arabian Sea", EntityLabel::Location, vec![]);
        self.add_term("Indian Ocean", EntityLabel::Location, vec![]);
        self.add_term("Andaman Sea", EntityLabel::Location, vec![]);
        self.add_term("Pacific Ocean", EntityLabel::Location, vec![]);
        self.add_term("Atlantic Ocean", EntityLabel::Location, vec![]);
        self.add_term("Himalayas", EntityLabel::Location, vec![]);
        self.add_term("Western Ghats", EntityLabel::Location, vec![]);
        self.add_term("Eastern Ghats", EntityLabel::Location, vec![]);
        self.add_term("Thar Desert", EntityLabel::Location, vec![]);
        self.add_term("Asia", EntityLabel::Location, vec!["South Asia"]);
        self.add_term("Europe", EntityLabel::Location, vec![]);

        // People
        self.add_term("Vikram Sarabhai", EntityLabel::Person, vec![]);
        self.add_term("Kalpana Chawla", EntityLabel::Person, vec![]);
        self.add_term("Abdul Kalam", EntityLabel::Person, vec!["APJ Abdul Kalam"]);
    }

    /// Add a regex pattern
    fn add_pattern(&mut self, pattern: &str, label: EntityLabel, confidence: f32) {
        if let Ok(regex) = Regex::new(pattern) {
            self.patterns.push((regex, label, confidence));
        }
    }

    /// Add a dictionary term
    fn add_term(&mut self, term: &str, label: EntityLabel, aliases: Vec<&str>) {
        let entry = DictionaryEntry {
            term: term.to_string(),
            label,
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
        };
        self.dictionary.insert(term.to_string(), entry);
    }

    /// Extract entities using pattern matching
    fn extract_by_patterns(&self, text: &str) -> Vec<NamedEntity> {
        let mut entities = Vec::new();

        for (regex, label, confidence) in &self.patterns {
            for mat in regex.find_iter(text) {
                if *label == EntityLabel::Organization
                    && self.acronym_stopwords.contains(mat.as_str())
                {
                    continue;
                }
                entities.push(NamedEntity {
                    text: mat.as_str().to_string(),
                    label: *label,
                    start: mat.start(),
                    end: mat.end(),
                    confidence: *confidence,
                });
            }
        }

        entities
    }

    /// Extract entities using dictionary lookup
    fn extract_by_dictionary(&self, text: &str) -> Vec<NamedEntity> {
        let mut entities = Vec::new();
        let text_lower = text.to_lowercase();

        for entry in self.dictionary.values() {
            let terms = std::iter::once((&entry.term, 0.95_f32))
                .chain(entry.aliases.iter().map(|alias| (alias, 0.9_f32)));

            for (term, confidence) in terms {
                let needle = term.to_lowercase();
                for (start, _) in text_lower.match_indices(&needle) {
                    let end = start + needle.len();
                    if !is_delimited(&text_lower, start, end) {
                        continue;
                    }
                    let Some(surface) = text.get(start..end) else {
                        continue;
                    };
                    entities.push(NamedEntity {
                        text: surface.to_string(),
                        label: entry.label,
                        start,
                        end,
                        confidence,
                    });
                }
            }
        }

        entities
    }

    /// Extract capitalized runs and classify them by keyword
    fn extract_by_capitalization(&self, text: &str) -> Vec<NamedEntity> {
        let mut entities = Vec::new();

        if let Some(phrase) = &self.phrase {
            for mat in phrase.find_iter(text) {
                let Some((start, surface)) = trim_leading_stopwords(mat.start(), mat.as_str())
                else {
                    continue;
                };
                let words: Vec<String> = surface.split_whitespace().map(str::to_lowercase).collect();
                let (label, confidence) = match classify_words(&words) {
                    Some(label) => (label, 0.75),
                    None if words.len() == 2 => (EntityLabel::Person, 0.55),
                    None if words.len() > 2 => (EntityLabel::Organization, 0.5),
                    None => continue,
                };
                entities.push(NamedEntity {
                    text: surface.to_string(),
                    label,
                    start,
                    end: start + surface.len(),
                    confidence,
                });
            }
        }

        if let Some(word) = &self.word {
            for mat in word.find_iter(text) {
                // Sentence-initial capitals carry no signal
                if text[..mat.start()].trim().is_empty() {
                    continue;
                }
                let lower = mat.as_str().to_lowercase();
                if LEADING_STOPWORDS.contains(&lower.as_str()) {
                    continue;
                }
                let label = if PLACE_SUFFIXES.iter().any(|s| lower.ends_with(s))
                    || (lower.len() > 4 && lower.ends_with("ia"))
                {
                    EntityLabel::Gpe
                } else {
                    EntityLabel::Other
                };
                entities.push(NamedEntity {
                    text: mat.as_str().to_string(),
                    label,
                    start: mat.start(),
                    end: mat.end(),
                    confidence: 0.3,
                });
            }
        }

        entities
    }

    /// Remove overlapping entities, keeping the longest (then most confident)
    fn deduplicate(&self, mut entities: Vec<NamedEntity>) -> Vec<NamedEntity> {
        entities.sort_by(|a, b| {
            (b.end - b.start)
                .cmp(&(a.end - a.start))
                .then(b.confidence.total_cmp(&a.confidence))
                .then(a.start.cmp(&b.start))
                .then(a.label.as_str().cmp(b.label.as_str()))
        });

        let mut result: Vec<NamedEntity> = Vec::new();
        let mut covered: HashSet<usize> = HashSet::new();

        for entity in entities {
            let overlaps = (entity.start..entity.end).any(|i| covered.contains(&i));

            if !overlaps {
                covered.extend(entity.start..entity.end);
                result.push(entity);
            }
        }

        // Sort by position
        result.sort_by_key(|e| e.start);
        result
    }
}

impl Default for RuleBasedNer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor for RuleBasedNer {
    fn extract(&self, text: &str) -> Result<Vec<NamedEntity>> {
        let mut entities = Vec::new();

        entities.extend(self.extract_by_patterns(text));
        entities.extend(self.extract_by_dictionary(text));
        entities.extend(self.extract_by_capitalization(text));

        Ok(self.deduplicate(entities))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Match must not continue into a neighbouring word or hyphenated name
fn is_delimited(text: &str, start: usize, end: usize) -> bool {
    let joins = |c: char| c.is_alphanumeric() || c == '-';
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(joins) && !after.is_some_and(joins)
}

/// Drop leading determiners/prepositions; `None` when nothing useful remains
fn trim_leading_stopwords(start: usize, phrase: &str) -> Option<(usize, &str)> {
    let mut offset = 0;
    for word in phrase.split_whitespace() {
        if !LEADING_STOPWORDS.contains(&word.to_lowercase().as_str()) {
            break;
        }
        let word_at = phrase[offset..].find(word)? + offset;
        offset = word_at + word.len();
        offset += phrase[offset..].len() - phrase[offset..].trim_start().len();
    }

    let rest = &phrase[offset..];
    (rest.split_whitespace().count() >= 2).then_some((start + offset, rest))
}

/// Label a capitalized run by the keywords it contains
fn classify_words(words: &[String]) -> Option<EntityLabel> {
    let has = |table: &[&str]| words.iter().any(|w| table.contains(&w.as_str()));

    if has(ORGANIZATION_KEYWORDS) {
        Some(EntityLabel::Organization)
    } else if has(EVENT_KEYWORDS) {
        Some(EntityLabel::Event)
    } else if has(LOCATION_KEYWORDS) {
        Some(EntityLabel::Location)
    } else if has(GPE_KEYWORDS) {
        Some(EntityLabel::Gpe)
    } else {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================
