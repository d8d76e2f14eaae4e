//! Recursive character text splitter.
//!
//! Tries separators from coarse to fine (paragraph, line, word, character),
//! recursing only into pieces that are still too long, then greedily merges
//! neighbours back into chunks of at most `chunk_size` characters with up to
//! `overlap` characters of trailing context carried into the next chunk.

use std::collections::VecDeque;

use crate::errors::MedRagError;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Clone, Debug)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, MedRagError> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(MedRagError::InvalidConfig(format!(
                "chunk_overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
            ..Self::default()
        })
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        // First separator present in the text; "" always matches.
        let (idx, sep) = separators
            .iter()
            .enumerate()
            .find(|(_, s)| s.is_empty() || text.contains(s.as_str()))
            .map(|(i, s)| (i, s.as_str()))
            .unwrap_or((separators.len(), ""));
        let finer = separators.get(idx + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if sep.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(sep).filter(|p| !p.is_empty()).collect()
        };

        let mut out = Vec::new();
        let mut short: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                short.push(piece);
                continue;
            }
            if !short.is_empty() {
                out.extend(self.merge(&short, sep));
                short.clear();
            }
            if finer.is_empty() {
                out.push(piece.to_string());
            } else {
                out.extend(self.split_with(piece, finer));
            }
        }
        if !short.is_empty() {
            out.extend(self.merge(&short, sep));
        }
        out
    }

    fn merge(&self, pieces: &[&str], sep: &str) -> Vec<String> {
        let sep_len = char_len(sep);
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if current.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.chunk_size && !current.is_empty() {
                push_joined(&mut docs, &current, sep);
                // Drop from the front until only the overlap remains and the next piece fits.
                while let Some(&front) = current.front() {
                    if total <= self.overlap && total + len + sep_len <= self.chunk_size {
                        break;
                    }
                    let front_joiner = if current.len() > 1 { sep_len } else { 0 };
                    total -= char_len(front) + front_joiner;
                    current.pop_front();
                }
            }

            let joiner = if current.is_empty() { 0 } else { sep_len };
            current.push_back(piece);
            total += len + joiner;
        }
        push_joined(&mut docs, &current, sep);
        docs
    }
}

fn push_joined(docs: &mut Vec<String>, parts: &VecDeque<&str>, sep: &str) {
    let joined = parts.iter().copied().collect::<Vec<_>>().join(sep);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let s = RecursiveSplitter::default();
        assert_eq!(s.split("  Fever and cough.  "), vec!["Fever and cough."]);
    }

    #[test]
    fn words_merge_up_to_chunk_size() {
        let s = RecursiveSplitter::new(10, 0).unwrap();
        assert_eq!(s.split("aaaa bbbb cccc"), vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn overlap_repeats_trailing_piece() {
        let s = RecursiveSplitter::new(10, 5).unwrap();
        assert_eq!(s.split("aaaa bbbb cccc"), vec!["aaaa bbbb", "bbbb cccc"]);
    }

    #[test]
    fn paragraphs_split_before_words() {
        let s = RecursiveSplitter::new(12, 0).unwrap();
        let chunks = s.split("first para\n\nsecond one");
        assert_eq!(chunks, vec!["first para", "second one"]);
    }

    #[test]
    fn unbreakable_word_falls_back_to_characters() {
        let s = RecursiveSplitter::new(4, 0).unwrap();
        assert_eq!(s.split("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn chunks_never_exceed_size() {
        let s = RecursiveSplitter::new(50, 10).unwrap();
        let text = "Anemia is a decrease in red blood cells. ".repeat(20);
        let chunks = s.split(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 50));
    }

    #[test]
    fn invalid_overlap_is_rejected() {
        assert!(RecursiveSplitter::new(10, 10).is_err());
        assert!(RecursiveSplitter::new(0, 0).is_err());
    }
}
