//! Part-of-speech lexicon and lemmatizer
//!
//! Closed word classes are listed exhaustively. Open classes rely on a
//! verb lexicon, irregular forms and suffix rules, with a left-to-right
//! context pass to separate verbs from homographic nouns
//! ("ISRO maps the coast" vs "the maps show").

use std::collections::{HashMap, HashSet};

use crate::{PosTag, Token};

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "its", "their", "his", "her", "our",
    "my", "your", "each", "every", "some", "any", "no", "all", "both", "either", "neither",
    "another", "such", "several", "many", "few", "most", "other",
];

const PREPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "from", "to", "into", "over", "under",
    "about", "across", "through", "during", "between", "among", "along", "near", "off", "via",
    "since", "per", "within", "without", "onto", "upon", "toward", "towards", "around",
    "beyond", "against", "after", "before", "above", "below", "behind", "beneath", "like",
    "until", "till", "throughout", "amid", "inside", "outside",
];

const PRONOUNS: &[&str] = &[
    "it", "they", "he", "she", "we", "i", "you", "them", "him", "us", "me", "which", "who",
    "whom", "whose", "what", "itself", "themselves", "one",
];

/// Pronouns that open a relative clause
pub const RELATIVE_PRONOUNS: &[&str] = &["which", "who", "whom", "that"];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "yet", "while", "whereas", "although", "though", "because",
    "if", "when", "where", "whether", "unless", "as", "than",
];

const AUXILIARIES: &[(&str, &str)] = &[
    ("be", "be"),
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("am", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("have", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("do", "do"),
    ("did", "do"),
    ("can", "can"),
    ("could", "could"),
    ("will", "will"),
    ("would", "would"),
    ("shall", "shall"),
    ("should", "should"),
    ("may", "may"),
    ("might", "might"),
    ("must", "must"),
];

const ADVERBS: &[&str] = &[
    "not", "also", "now", "then", "very", "often", "currently", "recently", "already",
    "still", "just", "only", "mainly", "primarily", "regularly", "widely", "well", "soon",
    "again", "here", "there", "always", "never", "sometimes", "however", "further", "too",
    "almost", "nearly", "together", "even", "once", "later", "today", "daily", "hourly",
];

/// Words ending in -ly that are not adverbs
const LY_EXCEPTIONS: &[&str] = &[
    "family", "assembly", "supply", "apply", "reply", "italy", "july", "anomaly",
    "monopoly", "butterfly", "rely", "fly", "ally", "rally", "holy", "ugly", "only", "early",
    "friendly", "lonely",
];

const ADJECTIVES: &[&str] = &[
    "new", "old", "large", "small", "high", "low", "long", "short", "big", "major", "minor",
    "warm", "cold", "hot", "cool", "heavy", "light", "strong", "weak", "deep", "shallow",
    "first", "second", "third", "last", "next", "early", "late", "real", "near", "far",
    "good", "best", "better", "important", "key", "main", "various", "different", "same",
    "current", "recent", "global", "local", "daily", "weekly", "monthly", "annual", "severe",
    "extreme", "accurate", "wide", "rapid", "free", "open", "available", "indian", "arabian",
    "eastern", "western", "northern", "southern",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "al", "ic", "ous", "ive", "ful", "less", "able", "ible", "ary", "ish",
];

/// Nouns that carry an adjective suffix
const SUFFIX_NOUNS: &[&str] = &[
    "signal", "portal", "terminal", "journal", "proposal", "approval", "arrival", "animal",
    "capital", "material", "interval", "rainfall", "music", "topic", "traffic", "graphic",
    "initiative", "summary", "library", "boundary", "dictionary", "secretary", "archive",
];

/// Base forms of open-class verbs
const VERBS: &[&str] = &[
    "launch", "monitor", "provide", "observe", "measure", "track", "operate", "develop",
    "build", "study", "collect", "capture", "record", "forecast", "predict", "map", "cover",
    "include", "support", "use", "deliver", "produce", "host", "manage", "lead", "send",
    "release", "detect", "analyze", "analyse", "process", "generate", "help", "carry",
    "orbit", "report", "show", "indicate", "affect", "cause", "bring", "hit", "reach",
    "receive", "make", "take", "give", "announce", "publish", "own", "run", "fund", "found",
    "design", "test", "deploy", "serve", "offer", "contain", "share", "border", "flow",
    "form", "issue", "warn", "improve", "enable", "allow", "estimate", "assess", "visit",
    "meet", "sign", "join", "acquire", "control", "govern", "plan", "create", "write",
    "locate", "situate", "name", "call", "know", "see", "become", "remain", "seem", "get",
    "archive", "disseminate", "retrieve", "calibrate", "validate", "scan", "sense",
    "simulate", "assimilate", "download", "visualize", "visualise", "access", "display",
    "span", "strike", "intensify", "weaken", "move", "cross", "flood", "rise", "fall",
    "increase", "decrease", "drop", "vary", "range", "exceed", "derive", "compute",
    "calculate", "alert", "establish", "set", "head", "require", "need", "utilize",
    "utilise", "employ", "comprise", "consist", "feature", "equip", "identify", "investigate",
    "explore", "examine", "survey", "gather", "transmit", "distribute", "broadcast",
    "surround", "lie", "mean", "appear", "find", "keep", "hold", "begin", "start", "end",
    "complete", "finish", "continue", "partner", "collaborate", "cooperate", "achieve",
    "mark", "celebrate", "aim", "intend", "expect", "hope", "want", "enhance", "boost",
    "strengthen", "protect", "save", "prevent", "reduce", "mitigate", "respond", "evaluate",
    "review", "verify", "confirm", "update", "upgrade", "replace", "retire", "succeed",
    "precede", "follow", "accompany", "lift", "place", "inject", "position", "maintain",
    "say", "tell", "think", "go", "come", "grow", "fly", "heat", "blow", "freeze",
    "melt", "describe", "explain", "discuss", "present", "represent", "reveal", "suggest",
    "image", "link", "connect", "integrate", "combine", "compare", "list", "add",
    "impact", "threaten", "damage", "destroy", "kill", "evacuate", "rescue",
];

/// Irregular inflections: form -> lemma
const IRREGULAR_VERBS: &[(&str, &str)] = &[
    ("went", "go"),
    ("gone", "go"),
    ("goes", "go"),
    ("made", "make"),
    ("built", "build"),
    ("sent", "send"),
    ("took", "take"),
    ("taken", "take"),
    ("gave", "give"),
    ("given", "give"),
    ("led", "lead"),
    ("ran", "run"),
    ("began", "begin"),
    ("begun", "begin"),
    ("became", "become"),
    ("brought", "bring"),
    ("held", "hold"),
    ("found", "find"),
    ("kept", "keep"),
    ("met", "meet"),
    ("said", "say"),
    ("saw", "see"),
    ("seen", "see"),
    ("shown", "show"),
    ("told", "tell"),
    ("thought", "think"),
    ("wrote", "write"),
    ("written", "write"),
    ("knew", "know"),
    ("known", "know"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("flew", "fly"),
    ("flown", "fly"),
    ("rose", "rise"),
    ("risen", "rise"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("struck", "strike"),
    ("blew", "blow"),
    ("blown", "blow"),
    ("froze", "freeze"),
    ("frozen", "freeze"),
    ("got", "get"),
    ("gotten", "get"),
    ("came", "come"),
    ("meant", "mean"),
    ("lay", "lie"),
    ("lain", "lie"),
];

/// Irregular past participles that are identical to other forms
const BARE_PARTICIPLES: &[&str] = &["set", "hit", "put", "found", "run", "come", "become"];

/// Stems that take a final "e" back after -ed/-ing removal
const E_RESTORING_ENDINGS: &[&str] = &[
    "at", "iz", "is", "uc", "iv", "ov", "ur", "rv", "rg", "dg", "nc", "ps", "ut", "ys", "as",
];

/// Word lists for tagging and lemmatization
pub struct Lexicon {
    determiners: HashSet<&'static str>,
    prepositions: HashSet<&'static str>,
    pronouns: HashSet<&'static str>,
    conjunctions: HashSet<&'static str>,
    auxiliaries: HashMap<&'static str, &'static str>,
    adverbs: HashSet<&'static str>,
    adjectives: HashSet<&'static str>,
    verbs: HashSet<&'static str>,
    irregular: HashMap<&'static str, &'static str>,
}

/// Lexical reading of a token before context is considered
#[derive(Debug, Clone, PartialEq)]
enum Reading {
    Fixed(PosTag, String),
    /// Could be a verb; context decides
    VerbCandidate(String),
}

impl Lexicon {
    pub fn new() -> Self {
        Self {
            determiners: DETERMINERS.iter().copied().collect(),
            prepositions: PREPOSITIONS.iter().copied().collect(),
            pronouns: PRONOUNS.iter().copied().collect(),
            conjunctions: CONJUNCTIONS.iter().copied().collect(),
            auxiliaries: AUXILIARIES.iter().copied().collect(),
            adverbs: ADVERBS.iter().copied().collect(),
            adjectives: ADJECTIVES.iter().copied().collect(),
            verbs: VERBS.iter().copied().collect(),
            irregular: IRREGULAR_VERBS.iter().copied().collect(),
        }
    }

    /// Assign part-of-speech tags and lemmas to a tokenized sentence
    pub fn tag(&self, tokens: &mut [Token]) {
        let readings: Vec<Reading> = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| self.reading(&token.text, i == 0))
            .collect();

        for i in 0..tokens.len() {
            let (pos, lemma) = match &readings[i] {
                Reading::Fixed(pos, lemma) => (*pos, lemma.clone()),
                Reading::VerbCandidate(lemma) => {
                    let next = readings.get(i + 1);
                    self.resolve_candidate(tokens, i, lemma, next)
                }
            };
            tokens[i].pos = pos;
            tokens[i].lemma = lemma;
        }
    }

    /// Base form of a known verb form
    pub fn verb_lemma(&self, word: &str) -> Option<String> {
        if let Some(lemma) = self.irregular.get(word) {
            return Some(lemma.to_string());
        }
        if self.verbs.contains(word) {
            return Some(word.to_string());
        }

        inflection_candidates(word)
            .into_iter()
            .find(|candidate| self.verbs.contains(candidate.as_str()))
    }

    /// Whether a verb form is a past participle
    pub fn is_past_participle(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        word.ends_with("ed")
            || word.ends_with("en")
            || BARE_PARTICIPLES.contains(&word.as_str())
            || self.irregular.contains_key(word.as_str())
    }

    /// Lemma of a noun: plural suffixes removed
    pub fn noun_lemma(&self, word: &str) -> String {
        if word.len() > 4 && word.ends_with("ies") {
            format!("{}y", &word[..word.len() - 3])
        } else if word.len() > 4
            && ["sses", "xes", "ches", "shes"]
                .iter()
                .any(|suffix| word.ends_with(suffix))
        {
            word[..word.len() - 2].to_string()
        } else if word.len() > 3
            && word.ends_with('s')
            && !["ss", "us", "is", "as"].iter().any(|s| word.ends_with(s))
        {
            word[..word.len() - 1].to_string()
        } else {
            word.to_string()
        }
    }

    fn reading(&self, text: &str, sentence_initial: bool) -> Reading {
        if !text.chars().any(char::is_alphanumeric) {
            return Reading::Fixed(PosTag::Punct, text.to_string());
        }
        if is_number(text) {
            return Reading::Fixed(PosTag::Number, text.to_string());
        }

        if is_acronym(text) {
            return Reading::Fixed(PosTag::ProperNoun, text.to_string());
        }

        let lower = text.to_lowercase();
        let capitalized = text.chars().next().is_some_and(char::is_uppercase);

        // Mid-sentence capitals are names ("May", "Will") unless they are
        // function words of a title
        if capitalized && !sentence_initial {
            return match self.closed_class(&lower) {
                Some(pos @ (PosTag::Determiner | PosTag::Preposition | PosTag::Conjunction)) => {
                    Reading::Fixed(pos, lower)
                }
                _ => Reading::Fixed(PosTag::ProperNoun, text.to_string()),
            };
        }

        if let Some(pos) = self.closed_class(&lower) {
            let lemma = match pos {
                PosTag::Aux => self
                    .auxiliaries
                    .get(lower.as_str())
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| lower.clone()),
                _ => lower,
            };
            return Reading::Fixed(pos, lemma);
        }

        if capitalized {
            // Sentence-initial capitals are only informative for open words
            if self.is_adverb(&lower) {
                return Reading::Fixed(PosTag::Adverb, lower);
            }
            if self.verb_lemma(&lower).is_some() {
                return Reading::Fixed(PosTag::Noun, self.noun_lemma(&lower));
            }
            return Reading::Fixed(PosTag::ProperNoun, text.to_string());
        }

        if let Some(lemma) = self.verb_lemma(&lower) {
            return Reading::VerbCandidate(lemma);
        }
        if self.is_adverb(&lower) {
            return Reading::Fixed(PosTag::Adverb, lower);
        }
        if self.is_adjective(&lower) {
            return Reading::Fixed(PosTag::Adjective, lower);
        }
        if lower.len() > 4 && lower.ends_with("ed") {
            return Reading::VerbCandidate(guess_verb_lemma(&lower));
        }

        Reading::Fixed(PosTag::Noun, self.noun_lemma(&lower))
    }

    fn resolve_candidate(
        &self,
        tokens: &mut [Token],
        i: usize,
        lemma: &str,
        next: Option<&Reading>,
    ) -> (PosTag, String) {
        let lower = tokens[i].text.to_lowercase();
        let previous = i.checked_sub(1).map(|p| (tokens[p].pos, tokens[p].lemma.clone()));
        let verb = (PosTag::Verb, lemma.to_string());
        let noun = (PosTag::Noun, self.noun_lemma(&lower));

        // Infinitive marker
        if let Some((PosTag::Preposition, prev_lemma)) = &previous {
            if prev_lemma == "to" && lower == lemma {
                tokens[i - 1].pos = PosTag::Particle;
                return verb;
            }
        }

        // "the satellite that monitors ..."
        if let Some((_, prev_lemma)) = &previous {
            if RELATIVE_PRONOUNS.contains(&prev_lemma.as_str()) {
                return verb;
            }
        }

        let after_aux = self.preceded_by_aux(tokens, i);
        if lower.ends_with("ing") {
            return if after_aux { verb } else { noun };
        }
        if after_aux {
            return verb;
        }

        match previous.map(|(pos, _)| pos) {
            Some(PosTag::Determiner | PosTag::Adjective | PosTag::Preposition | PosTag::Number) => {
                if lower.ends_with("ed") {
                    (PosTag::Adjective, lower)
                } else {
                    noun
                }
            }
            Some(PosTag::Noun | PosTag::ProperNoun)
                if matches!(next, Some(Reading::VerbCandidate(_)))
                    || matches!(next, Some(Reading::Fixed(PosTag::Aux, _))) =>
            {
                // Noun compound head followed by the real verb
                noun
            }
            _ => verb,
        }
    }

    /// Whether token `i` follows an auxiliary, skipping adverbs
    fn preceded_by_aux(&self, tokens: &[Token], i: usize) -> bool {
        tokens[..i]
            .iter()
            .rev()
            .find(|t| t.pos != PosTag::Adverb)
            .is_some_and(|t| t.pos == PosTag::Aux)
    }

    fn closed_class(&self, lower: &str) -> Option<PosTag> {
        if self.auxiliaries.contains_key(lower) {
            Some(PosTag::Aux)
        } else if self.determiners.contains(lower) {
            Some(PosTag::Determiner)
        } else if self.pronouns.contains(lower) {
            Some(PosTag::Pronoun)
        } else if self.prepositions.contains(lower) {
            Some(PosTag::Preposition)
        } else if self.conjunctions.contains(lower) {
            Some(PosTag::Conjunction)
        } else {
            None
        }
    }

    fn is_adverb(&self, lower: &str) -> bool {
        self.adverbs.contains(lower)
            || (lower.len() > 4 && lower.ends_with("ly") && !LY_EXCEPTIONS.contains(&lower))
    }

    fn is_adjective(&self, lower: &str) -> bool {
        self.adjectives.contains(lower)
            || (lower.len() > 5
                && !SUFFIX_NOUNS.contains(&lower)
                && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)))
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

/// Possible base forms of an inflected verb, most likely first
fn inflection_candidates(word: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    let strip = |n: usize| word[..word.len() - n].to_string();

    if word.len() > 3 && word.ends_with("ies") {
        candidates.push(format!("{}y", strip(3)));
    }
    if word.len() > 3 && word.ends_with("es") {
        candidates.push(strip(2));
    }
    if word.len() > 2 && word.ends_with('s') && !word.ends_with("ss") {
        candidates.push(strip(1));
    }
    if word.len() > 3 && word.ends_with("ied") {
        candidates.push(format!("{}y", strip(3)));
    }
    if word.len() > 3 && word.ends_with("ed") {
        let stem = strip(2);
        candidates.push(strip(1));
        candidates.push(stem.clone());
        candidates.extend(undouble(&stem));
    }
    if word.len() > 4 && word.ends_with("ing") {
        let stem = strip(3);
        candidates.push(format!("{stem}e"));
        candidates.push(stem.clone());
        candidates.extend(undouble(&stem));
    }

    candidates
}

/// "plann" -> "plan"; keeps ll/ss/zz
fn undouble(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    (n > 2 && bytes[n - 1] == bytes[n - 2] && !matches!(bytes[n - 1], b'l' | b's' | b'z'))
        .then(|| stem[..n - 1].to_string())
}

/// Lemma for an unknown -ed word
fn guess_verb_lemma(word: &str) -> String {
    let stem = &word[..word.len() - 2];
    if let Some(undoubled) = undouble(stem) {
        return undoubled;
    }
    if stem.ends_with('i') {
        return format!("{}y", &stem[..stem.len() - 1]);
    }
    if E_RESTORING_ENDINGS.iter().any(|e| stem.ends_with(e)) {
        return format!("{stem}e");
    }
    stem.to_string()
}

fn is_number(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

fn is_acronym(text: &str) -> bool {
    text.chars().filter(|c| c.is_alphabetic()).count() >= 2
        && text
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
}
