//! Sentence and word segmentation
//!
//! Boundaries follow Unicode Standard Annex #29. Hyphenated designations
//! such as `INSAT-3D` are kept as a single token.

use unicode_segmentation::UnicodeSegmentation;

use crate::Token;

/// Split text into trimmed, non-empty sentences with their byte offsets
pub fn sentences(text: &str) -> Vec<(usize, &str)> {
    text.split_sentence_bound_indices()
        .filter_map(|(offset, raw)| {
            let leading = raw.len() - raw.trim_start().len();
            let sentence = raw.trim();
            (!sentence.is_empty()).then_some((offset + leading, sentence))
        })
        .collect()
}

/// Split one sentence into word and punctuation tokens
pub fn tokenize(sentence: &str) -> Vec<Token> {
    let pieces: Vec<(usize, &str)> = sentence
        .split_word_bound_indices()
        .filter(|(_, piece)| !piece.trim().is_empty())
        .collect();

    let mut tokens = Vec::with_capacity(pieces.len());
    let mut i = 0;

    while i < pieces.len() {
        let (start, piece) = pieces[i];
        let mut end = start + piece.len();
        i += 1;

        if is_word(piece) {
            // Absorb "-word" continuations that touch the previous piece
            while i + 1 < pieces.len() {
                let (hyphen_at, hyphen) = pieces[i];
                let (next_at, next) = pieces[i + 1];
                let joined = hyphen == "-"
                    && hyphen_at == end
                    && next_at == hyphen_at + 1
                    && is_word(next);
                if !joined {
                    break;
                }
                end = next_at + next.len();
                i += 2;
            }
        }

        tokens.push(Token::new(&sentence[start..end], start, end));
    }

    tokens
}

fn is_word(piece: &str) -> bool {
    piece.chars().next().is_some_and(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sentence: &str) -> Vec<String> {
        tokenize(sentence).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_sentence_split() {
        let text = "ISRO launched Oceansat. INSAT monitors the Arabian Sea.";
        let found = sentences(text);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0], (0, "ISRO launched Oceansat."));
        assert_eq!(found[1].1, "INSAT monitors the Arabian Sea.");
        assert_eq!(&text[found[1].0..], found[1].1);
    }

    #[test]
    fn test_empty_text_has_no_sentences() {
        assert!(sentences("").is_empty());
        assert!(sentences("   ").is_empty());
    }

    #[test]
    fn test_tokenize_words_and_punctuation() {
        assert_eq!(
            texts("INSAT monitors the Arabian Sea."),
            vec!["INSAT", "monitors", "the", "Arabian", "Sea", "."]
        );
    }

    #[test]
    fn test_hyphenated_names_stay_whole() {
        assert_eq!(
            texts("INSAT-3D and Megha-Tropiques-1 orbit"),
            vec!["INSAT-3D", "and", "Megha-Tropiques-1", "orbit"]
        );
        // A free-standing dash is punctuation
        assert_eq!(texts("Ocean - data"), vec!["Ocean", "-", "data"]);
    }

    #[test]
    fn test_token_offsets() {
        let sentence = "SST is 28.5 degrees";
        for token in tokenize(sentence) {
            assert_eq!(&sentence[token.start..token.end], token.text);
        }
        assert!(texts(sentence).contains(&"28.5".to_string()));
    }
}
