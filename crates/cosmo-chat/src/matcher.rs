//! Knowledge base query matching
//!
//! A triple matches when its subject, predicate or object occurs inside the
//! query, compared case-insensitively.

use cosmo_core::Triple;

use crate::session::ExtractionCache;

/// Matches shown in one reply
pub const MAX_SHOWN_MATCHES: usize = 5;

pub const NO_KNOWLEDGE_REPLY: &str =
    "Please first explore some data (upload a file or fetch a URL) before asking questions!";

pub const NO_MATCHES_REPLY: &str = "No direct matches found in the current knowledge base. \
Try exploring different sources or rephrasing your query.";

/// Result of matching a query against the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Nothing has been extracted yet
    NoKnowledge,
    NoMatches,
    /// Matching triples in cache order
    Matches(Vec<Triple>),
}

impl QueryOutcome {
    /// Assistant reply text
    pub fn to_reply(&self) -> String {
        match self {
            Self::NoKnowledge => NO_KNOWLEDGE_REPLY.to_string(),
            Self::NoMatches => NO_MATCHES_REPLY.to_string(),
            Self::Matches(triples) => {
                let shown = triples
                    .iter()
                    .take(MAX_SHOWN_MATCHES)
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join("\n");

                let mut reply = format!("Found {} connections:\n\n{shown}", triples.len());
                if triples.len() > MAX_SHOWN_MATCHES {
                    reply.push_str(&format!(
                        "\n\n...and {} more connections",
                        triples.len() - MAX_SHOWN_MATCHES
                    ));
                }
                reply
            }
        }
    }
}

pub fn match_query(query: &str, cache: &ExtractionCache) -> QueryOutcome {
    if cache.is_empty() {
        return QueryOutcome::NoKnowledge;
    }

    let matches: Vec<Triple> = cache
        .triples()
        .iter()
        .filter(|t| t.mentioned_in(query))
        .cloned()
        .collect();

    if matches.is_empty() {
        QueryOutcome::NoMatches
    } else {
        QueryOutcome::Matches(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;

    fn cache(triples: &[Triple]) -> ExtractionCache {
        let mut cache = ExtractionCache::default();
        cache.replace(triples.iter().cloned().collect::<IndexSet<_>>());
        cache
    }

    #[test]
    fn test_matches_subject_in_query() {
        let cache = cache(&[
            Triple::new("ISRO", "launched", "Oceansat"),
            Triple::new("NASA", "monitors", "climate"),
        ]);

        assert_eq!(
            match_query("Tell me about ISRO", &cache),
            QueryOutcome::Matches(vec![Triple::new("ISRO", "launched", "Oceansat")])
        );
    }

    #[test]
    fn test_field_must_be_inside_query() {
        let cache = cache(&[Triple::new("Bay of Bengal", "border", "region")]);
        // The query is shorter than the subject: no match
        assert_eq!(match_query("bengal", &cache), QueryOutcome::NoMatches);
    }

    #[test]
    fn test_empty_cache() {
        let outcome = match_query("anything", &ExtractionCache::default());
        assert_eq!(outcome, QueryOutcome::NoKnowledge);
        assert_eq!(outcome.to_reply(), NO_KNOWLEDGE_REPLY);
    }

    #[test]
    fn test_reply_format() {
        let outcome = QueryOutcome::Matches(vec![Triple::new("ISRO", "launch", "Oceansat")]);
        assert_eq!(outcome.to_reply(), "Found 1 connections:\n\nISRO — launch → Oceansat");
    }

    #[test]
    fn test_reply_caps_at_five() {
        let triples: Vec<Triple> = (0..7)
            .map(|i| Triple::new("ISRO", "launch", format!("Satellite {i}")))
            .collect();
        let reply = match_query("isro", &cache(&triples)).to_reply();

        assert!(reply.starts_with("Found 7 connections:"));
        assert!(reply.contains("Satellite 4"));
        assert!(!reply.contains("Satellite 5"));
        assert!(reply.ends_with("...and 2 more connections"));
    }
}
