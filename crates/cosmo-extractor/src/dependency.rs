//! Shallow dependency parsing
//!
//! Works on a tagged sentence:
//! 1. Group determiners, adjectives and nouns into noun chunks
//! 2. Pick the root: first finite main verb outside relative and
//!    infinitive clauses, or a copula when no verb follows it
//! 3. Attach subject, object/attribute, prepositions and the remaining
//!    tokens to the root
//!
//! Labels follow the ClearNLP scheme (`nsubj`, `dobj`, `pobj`, ...).

use crate::lexicon::{Lexicon, RELATIVE_PRONOUNS};
use crate::{DepLabel, PosTag, Token};

/// Contiguous noun phrase `[start, end)` with its head token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NounChunk {
    pub start: usize,
    pub end: usize,
    pub head: usize,
}

/// Root verb with its auxiliary chain
#[derive(Debug, Clone, Copy)]
struct Clause {
    root: usize,
    /// First token of the auxiliary/adverb chain before the root
    chain_start: usize,
    passive: bool,
}

/// Rule-based dependency parser
pub struct DependencyParser<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> DependencyParser<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Assign heads and labels in place; returns the root index
    pub fn parse(&self, tokens: &mut [Token]) -> Option<usize> {
        if tokens.is_empty() {
            return None;
        }

        let chunks = noun_chunks(tokens);
        let mut arcs = Arcs::new(tokens.len());
        for chunk in &chunks {
            for i in (chunk.start..chunk.end).filter(|&i| i != chunk.head) {
                let dep = match tokens[i].pos {
                    PosTag::Determiner => DepLabel::Det,
                    PosTag::Adjective => DepLabel::Amod,
                    PosTag::Number => DepLabel::Nummod,
                    _ => DepLabel::Compound,
                };
                arcs.attach(tokens, i, dep, chunk.head);
            }
        }

        let Some(clause) = self.find_root(tokens) else {
            // Verbless fragment: tokens stay unattached
            for (i, token) in tokens.iter_mut().enumerate() {
                if !arcs.is_set(i) {
                    token.head = i;
                    token.dep = DepLabel::Dep;
                }
            }
            return None;
        };

        let root = clause.root;
        arcs.attach(tokens, root, DepLabel::Root, root);
        self.attach_chain(tokens, &mut arcs, clause.chain_start, root, clause.passive);

        if let Some(subject) = find_subject(tokens, &chunks, clause.chain_start) {
            let first = coordinated_start(tokens, &chunks, subject);
            let label = if clause.passive {
                DepLabel::Nsubjpass
            } else {
                DepLabel::Nsubj
            };
            arcs.attach(tokens, chunks[first].head, label, root);
            attach_conjuncts(tokens, &mut arcs, &chunks, first, subject);
        }

        self.attach_complement(tokens, &mut arcs, &chunks, &clause);
        attach_prepositions(tokens, &mut arcs, &chunks, &clause);
        self.attach_secondary_verbs(tokens, &mut arcs, &chunks, root);

        // Whatever is left hangs off the root
        for i in 0..tokens.len() {
            if arcs.is_set(i) {
                continue;
            }
            let dep = match tokens[i].pos {
                PosTag::Punct => DepLabel::Punct,
                PosTag::Conjunction => DepLabel::Cc,
                PosTag::Adverb => DepLabel::Advmod,
                _ => DepLabel::Dep,
            };
            arcs.attach(tokens, i, dep, root);
        }

        Some(root)
    }

    fn find_root(&self, tokens: &[Token]) -> Option<Clause> {
        let mut i = 0;

        while i < tokens.len() {
            let mut candidate = i;
            match tokens[i].pos {
                PosTag::Verb => {}
                PosTag::Aux => {
                    let mut j = i + 1;
                    while j < tokens.len() && matches!(tokens[j].pos, PosTag::Aux | PosTag::Adverb)
                    {
                        j += 1;
                    }
                    if j < tokens.len() && tokens[j].pos == PosTag::Verb {
                        // The auxiliary belongs to the verb at `j`
                        i = j;
                        continue;
                    }
                    // Copula or main "have": the last auxiliary of the run is the root
                    candidate = (i..j)
                        .rev()
                        .find(|&k| tokens[k].pos == PosTag::Aux)
                        .unwrap_or(i);
                    i = j - 1;
                }
                _ => {
                    i += 1;
                    continue;
                }
            }

            let chain_start = chain_start(tokens, candidate);
            if is_subordinate(tokens, chain_start) {
                i += 1;
                continue;
            }

            let passive = tokens[candidate].pos == PosTag::Verb
                && self.lexicon.is_past_participle(&tokens[candidate].text)
                && tokens[chain_start..candidate]
                    .iter()
                    .any(|t| t.pos == PosTag::Aux && t.lemma == "be");

            return Some(Clause {
                root: candidate,
                chain_start,
                passive,
            });
        }

        None
    }

    /// Auxiliaries and adverbs between `start` and `verb`
    fn attach_chain(
        &self,
        tokens: &mut [Token],
        arcs: &mut Arcs,
        start: usize,
        verb: usize,
        passive: bool,
    ) {
        let last_be = (start..verb)
            .rev()
            .find(|&k| tokens[k].pos == PosTag::Aux && tokens[k].lemma == "be");

        for k in start..verb {
            let dep = match tokens[k].pos {
                PosTag::Aux if passive && Some(k) == last_be => DepLabel::Auxpass,
                PosTag::Aux => DepLabel::Aux,
                _ if is_negation(&tokens[k]) => DepLabel::Neg,
                _ => DepLabel::Advmod,
            };
            arcs.attach(tokens, k, dep, verb);
        }
    }

    /// Object or attribute right of the root
    fn attach_complement(
        &self,
        tokens: &mut [Token],
        arcs: &mut Arcs,
        chunks: &[NounChunk],
        clause: &Clause,
    ) {
        let root = clause.root;
        let mut j = root + 1;
        while j < tokens.len() && tokens[j].pos == PosTag::Adverb {
            let dep = if is_negation(&tokens[j]) {
                DepLabel::Neg
            } else {
                DepLabel::Advmod
            };
            arcs.attach(tokens, j, dep, root);
            j += 1;
        }

        let copula = tokens[root].pos == PosTag::Aux && tokens[root].lemma == "be";

        if let Some(index) = chunks.iter().position(|c| c.start == j) {
            if clause.passive {
                return;
            }
            let label = if copula { DepLabel::Attr } else { DepLabel::Dobj };
            arcs.attach(tokens, chunks[index].head, label, root);
            let last = coordinated_end(tokens, chunks, index);
            attach_conjuncts(tokens, arcs, chunks, index, last);
        } else if copula && j < tokens.len() && tokens[j].pos == PosTag::Adjective {
            arcs.attach(tokens, j, DepLabel::Acomp, root);
        }
    }

    /// Verbs other than the root: relative clauses, infinitives, conjuncts
    fn attach_secondary_verbs(
        &self,
        tokens: &mut [Token],
        arcs: &mut Arcs,
        chunks: &[NounChunk],
        root: usize,
    ) {
        for v in 0..tokens.len() {
            if arcs.is_set(v) || tokens[v].pos != PosTag::Verb {
                continue;
            }

            let start = chain_start(tokens, v);
            let before = start.checked_sub(1);

            let (dep, head) = match before {
                Some(p) if tokens[p].pos == PosTag::Particle => {
                    arcs.attach(tokens, p, DepLabel::Aux, v);
                    (DepLabel::Xcomp, root)
                }
                Some(p) if is_relative(&tokens[p]) => {
                    let antecedent = antecedent(tokens, chunks, p).unwrap_or(root);
                    arcs.attach(tokens, p, DepLabel::Nsubj, v);
                    (DepLabel::Relcl, antecedent)
                }
                Some(p) if is_coordinator(&tokens[p]) => (DepLabel::Conj, root),
                _ => (DepLabel::Dep, root),
            };
            arcs.attach(tokens, v, dep, head);
            self.attach_chain(tokens, arcs, start, v, false);

            if let Some(object) = chunks
                .iter()
                .find(|c| c.start == v + 1 && !arcs.is_set(c.head))
            {
                arcs.attach(tokens, object.head, DepLabel::Dobj, v);
            }
        }
    }
}

// ============================================================================
// Noun Chunks
// ============================================================================

/// Group determiners, adjectives, numbers and nouns into noun chunks.
///
/// A determiner always opens a new chunk, as does an adjective or number
/// right after a noun ("Oceansat-3 next year"); pronouns form chunks on their
/// own. A run without a nominal is only a chunk when it starts with a
/// determiner, in which case its last word is retagged as the noun head.
pub fn noun_chunks(tokens: &mut [Token]) -> Vec<NounChunk> {
    let in_chunk = |pos: PosTag| {
        matches!(
            pos,
            PosTag::Determiner | PosTag::Adjective | PosTag::Noun | PosTag::ProperNoun | PosTag::Number
        )
    };

    let mut chunks = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i].pos == PosTag::Pronoun {
            chunks.push(NounChunk {
                start: i,
                end: i + 1,
                head: i,
            });
            i += 1;
            continue;
        }
        if !in_chunk(tokens[i].pos) {
            i += 1;
            continue;
        }

        let start = i;
        i += 1;
        while i < tokens.len() && in_chunk(tokens[i].pos) && !opens_chunk(tokens, i) {
            i += 1;
        }
        let end = i;

        let head = (start..end)
            .rev()
            .find(|&j| tokens[j].pos.is_nominal())
            .or_else(|| {
                (end - start > 1 && tokens[start].pos == PosTag::Determiner).then_some(end - 1)
            });

        if let Some(head) = head {
            if !tokens[head].pos.is_nominal() {
                tokens[head].pos = PosTag::Noun;
            }
            chunks.push(NounChunk { start, end, head });
        }
    }

    chunks
}

// ============================================================================
// Helpers
// ============================================================================

/// Whether token `i` starts a new chunk instead of extending the current one
fn opens_chunk(tokens: &[Token], i: usize) -> bool {
    match tokens[i].pos {
        PosTag::Determiner => true,
        PosTag::Adjective | PosTag::Number => tokens[i - 1].pos.is_nominal(),
        _ => false,
    }
}

/// Which tokens already have a head
struct Arcs {
    set: Vec<bool>,
}

impl Arcs {
    fn new(len: usize) -> Self {
        Self {
            set: vec![false; len],
        }
    }

    fn is_set(&self, i: usize) -> bool {
        self.set[i]
    }

    fn attach(&mut self, tokens: &mut [Token], i: usize, dep: DepLabel, head: usize) {
        tokens[i].dep = dep;
        tokens[i].head = head;
        self.set[i] = true;
    }
}

/// Walk left over auxiliaries and adverbs
fn chain_start(tokens: &[Token], verb: usize) -> usize {
    let mut k = verb;
    while k > 0 && matches!(tokens[k - 1].pos, PosTag::Aux | PosTag::Adverb) {
        k -= 1;
    }
    k
}

/// Verb group introduced by a relative pronoun or infinitive marker
fn is_subordinate(tokens: &[Token], chain_start: usize) -> bool {
    chain_start
        .checked_sub(1)
        .map(|p| &tokens[p])
        .is_some_and(|t| t.pos == PosTag::Particle || is_relative(t))
}

fn is_relative(token: &Token) -> bool {
    matches!(token.pos, PosTag::Pronoun | PosTag::Determiner)
        && RELATIVE_PRONOUNS.contains(&token.lemma.as_str())
}

fn is_coordinator(token: &Token) -> bool {
    token.pos == PosTag::Conjunction && matches!(token.lemma.as_str(), "and" | "or")
}

fn is_negation(token: &Token) -> bool {
    matches!(token.lemma.as_str(), "not" | "never")
}

/// Nearest chunk left of the root that is not governed by a preposition or verb
fn find_subject(tokens: &[Token], chunks: &[NounChunk], limit: usize) -> Option<usize> {
    chunks
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, chunk)| chunk.end <= limit)
        .find(|(_, chunk)| {
            let governed = chunk.start.checked_sub(1).is_some_and(|b| {
                matches!(
                    tokens[b].pos,
                    PosTag::Preposition | PosTag::Verb | PosTag::Particle
                )
            });
            !governed && !is_relative(&tokens[chunk.head])
        })
        .map(|(index, _)| index)
}

fn is_comma(token: &Token) -> bool {
    token.pos == PosTag::Punct && token.text == ","
}

/// Chunks `index - 1` and `index` are separated by exactly one token
fn adjacent(chunks: &[NounChunk], index: usize) -> bool {
    index > 0 && index < chunks.len() && chunks[index].start == chunks[index - 1].end + 1
}

/// Whether chunk `index` is joined to chunk `index - 1` by and/or, or by a
/// comma inside a list that closes with and/or ("ISRO, NASA and ESA")
fn joined_to_previous(tokens: &[Token], chunks: &[NounChunk], index: usize) -> bool {
    if !adjacent(chunks, index) {
        return false;
    }
    let separator = &tokens[chunks[index - 1].end];
    if is_coordinator(separator) {
        return true;
    }
    if !is_comma(separator) {
        return false;
    }

    let mut k = index;
    while adjacent(chunks, k + 1) {
        let next = &tokens[chunks[k].end];
        if is_coordinator(next) {
            return true;
        }
        if !is_comma(next) {
            return false;
        }
        k += 1;
    }
    false
}

/// First chunk of a coordination ending at `index`
fn coordinated_start(tokens: &[Token], chunks: &[NounChunk], index: usize) -> usize {
    let mut first = index;
    while joined_to_previous(tokens, chunks, first) {
        let governed = chunks[first - 1]
            .start
            .checked_sub(1)
            .is_some_and(|b| tokens[b].pos == PosTag::Preposition);
        if governed {
            break;
        }
        first -= 1;
    }
    first
}

/// Last chunk of a coordination starting at `index`
fn coordinated_end(tokens: &[Token], chunks: &[NounChunk], index: usize) -> usize {
    let mut last = index;
    while last + 1 < chunks.len() && joined_to_previous(tokens, chunks, last + 1) {
        last += 1;
    }
    last
}

/// Chunks `first+1..=last` become conjuncts of chunk `first`
fn attach_conjuncts(
    tokens: &mut [Token],
    arcs: &mut Arcs,
    chunks: &[NounChunk],
    first: usize,
    last: usize,
) {
    let head = chunks[first].head;
    for index in first + 1..=last {
        let separator = chunks[index].start - 1;
        let dep = if is_comma(&tokens[separator]) {
            DepLabel::Punct
        } else {
            DepLabel::Cc
        };
        arcs.attach(tokens, separator, dep, head);
        arcs.attach(tokens, chunks[index].head, DepLabel::Conj, head);
    }
}

/// Prepositions attach to the root; their noun chunk is `pobj`
fn attach_prepositions(
    tokens: &mut [Token],
    arcs: &mut Arcs,
    chunks: &[NounChunk],
    clause: &Clause,
) {
    for p in 0..tokens.len() {
        if arcs.is_set(p) || tokens[p].pos != PosTag::Preposition {
            continue;
        }

        let dep = if clause.passive && p > clause.root && tokens[p].lemma == "by" {
            DepLabel::Agent
        } else {
            DepLabel::Prep
        };
        arcs.attach(tokens, p, dep, clause.root);

        if let Some(object) = chunks.iter().find(|c| c.start == p + 1) {
            if !arcs.is_set(object.head) {
                arcs.attach(tokens, object.head, DepLabel::Pobj, p);
            }
        }
    }
}

/// Head of the chunk a relative pronoun refers back to
fn antecedent(tokens: &[Token], chunks: &[NounChunk], pronoun: usize) -> Option<usize> {
    let mut end = pronoun;
    if end > 0 && tokens[end - 1].pos == PosTag::Punct {
        end -= 1;
    }
    chunks.iter().find(|c| c.end == end).map(|c| c.head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::tokenize;

    fn parse(sentence: &str) -> (Vec<Token>, Option<usize>) {
        let lexicon = Lexicon::new();
        let mut tokens = tokenize(sentence);
        lexicon.tag(&mut tokens);
        let root = DependencyParser::new(&lexicon).parse(&mut tokens);
        (tokens, root)
    }

    fn find<'t>(tokens: &'t [Token], text: &str) -> &'t Token {
        tokens
            .iter()
            .find(|t| t.text == text)
            .unwrap_or_else(|| panic!("token {text} missing"))
    }

    #[test]
    fn test_transitive_clause() {
        let (tokens, root) = parse("INSAT monitors the Arabian Sea.");
        let root = root.unwrap();

        assert_eq!(tokens[root].text, "monitors");
        assert_eq!(find(&tokens, "INSAT").dep, DepLabel::Nsubj);
        assert_eq!(find(&tokens, "Sea").dep, DepLabel::Dobj);
        assert_eq!(find(&tokens, "Sea").head, root);
        assert_eq!(find(&tokens, "Arabian").dep, DepLabel::Compound);
        assert_eq!(find(&tokens, "the").dep, DepLabel::Det);
        assert_eq!(find(&tokens, ".").dep, DepLabel::Punct);
    }

    #[test]
    fn test_copula_attr() {
        let (tokens, root) = parse("ISRO is a space agency.");
        let root = root.unwrap();

        assert_eq!(tokens[root].lemma, "be");
        assert_eq!(find(&tokens, "ISRO").dep, DepLabel::Nsubj);
        assert_eq!(find(&tokens, "agency").dep, DepLabel::Attr);
    }

    #[test]
    fn test_passive_voice() {
        let (tokens, root) = parse("Oceansat was launched by ISRO.");
        let root = root.unwrap();

        assert_eq!(tokens[root].text, "launched");
        assert_eq!(find(&tokens, "Oceansat").dep, DepLabel::Nsubjpass);
        assert_eq!(find(&tokens, "was").dep, DepLabel::Auxpass);
        assert_eq!(find(&tokens, "by").dep, DepLabel::Agent);
        assert_eq!(find(&tokens, "ISRO").dep, DepLabel::Pobj);
    }

    #[test]
    fn test_fronted_prepositional_phrase() {
        let (tokens, root) = parse("In 2016, ISRO launched Scatsat.");
        let root = root.unwrap();

        assert_eq!(find(&tokens, "ISRO").dep, DepLabel::Nsubj);
        assert_eq!(find(&tokens, "2016").dep, DepLabel::Pobj);
        assert_eq!(find(&tokens, "In").head, root);
        assert_eq!(find(&tokens, "Scatsat").dep, DepLabel::Dobj);
    }

    #[test]
    fn test_relative_clause_is_not_root() {
        let (tokens, root) = parse("ISRO, which launched INSAT, monitors the sea.");
        let root = root.unwrap();

        assert_eq!(tokens[root].text, "monitors");
        assert_eq!(find(&tokens, "ISRO").dep, DepLabel::Nsubj);
        assert_eq!(find(&tokens, "launched").dep, DepLabel::Relcl);
        assert_eq!(find(&tokens, "INSAT").dep, DepLabel::Dobj);
        assert_ne!(find(&tokens, "INSAT").head, root);
        assert_eq!(find(&tokens, "sea").dep, DepLabel::Dobj);
    }

    #[test]
    fn test_coordinated_subjects() {
        let (tokens, _) = parse("ISRO and NASA share data.");

        assert_eq!(find(&tokens, "ISRO").dep, DepLabel::Nsubj);
        assert_eq!(find(&tokens, "NASA").dep, DepLabel::Conj);
        assert_eq!(find(&tokens, "and").dep, DepLabel::Cc);
        assert_eq!(find(&tokens, "data").dep, DepLabel::Dobj);
    }

    #[test]
    fn test_comma_separated_subjects() {
        let (tokens, root) = parse("ISRO, NASA and ESA signed an agreement in Paris.");
        let root = root.unwrap();
        let isro = tokens.iter().position(|t| t.text == "ISRO").unwrap();

        assert_eq!(tokens[root].text, "signed");
        assert_eq!(find(&tokens, "ISRO").dep, DepLabel::Nsubj);
        assert_eq!(find(&tokens, "ISRO").head, root);
        assert_eq!(find(&tokens, "NASA").dep, DepLabel::Conj);
        assert_eq!(find(&tokens, "NASA").head, isro);
        assert_eq!(find(&tokens, "ESA").dep, DepLabel::Conj);
        assert_eq!(find(&tokens, "ESA").head, isro);
        assert_eq!(find(&tokens, ",").dep, DepLabel::Punct);
        assert_eq!(find(&tokens, "and").dep, DepLabel::Cc);
        assert_eq!(find(&tokens, "agreement").dep, DepLabel::Dobj);
    }

    #[test]
    fn test_comma_without_coordinator_is_not_a_list() {
        let (tokens, _) = parse("In Paris, ISRO signed an agreement.");

        assert_eq!(find(&tokens, "ISRO").dep, DepLabel::Nsubj);
        assert_eq!(find(&tokens, "Paris").dep, DepLabel::Pobj);
    }

    #[test]
    fn test_modifier_after_noun_opens_new_chunk() {
        let (tokens, root) = parse("ISRO will launch Oceansat-3 next year.");
        let root = root.unwrap();

        assert_eq!(tokens[root].text, "launch");
        assert_eq!(find(&tokens, "ISRO").dep, DepLabel::Nsubj);
        assert_eq!(find(&tokens, "Oceansat-3").dep, DepLabel::Dobj);
        assert_ne!(find(&tokens, "year").dep, DepLabel::Dobj);
    }

    #[test]
    fn test_intransitive_with_preposition() {
        let (tokens, root) = parse("The satellite orbits over India.");
        let root = root.unwrap();

        assert_eq!(find(&tokens, "satellite").dep, DepLabel::Nsubj);
        assert_eq!(find(&tokens, "over").head, root);
        assert_eq!(find(&tokens, "India").dep, DepLabel::Pobj);
        assert!(!tokens.iter().any(|t| t.dep == DepLabel::Dobj));
    }

    #[test]
    fn test_verbless_fragment_has_no_root() {
        let (tokens, root) = parse("Ocean data services");
        assert!(root.is_none());
        assert!(!tokens.iter().any(|t| t.dep == DepLabel::Root));
    }

    #[test]
    fn test_noun_chunks() {
        let lexicon = Lexicon::new();
        let mut tokens = tokenize("the warm Arabian Sea and it");
        lexicon.tag(&mut tokens);
        let chunks = noun_chunks(&mut tokens);

        assert_eq!(
            chunks,
            vec![
                NounChunk { start: 0, end: 4, head: 3 },
                NounChunk { start: 5, end: 6, head: 5 },
            ]
        );
    }
}
