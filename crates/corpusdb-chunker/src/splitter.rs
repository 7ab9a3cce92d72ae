//! Recursive token-aware text splitting with overlap.
//!
//! The splitter walks a fixed separator hierarchy from coarsest to finest:
//! paragraph breaks, then line breaks, then spaces, then individual
//! characters. At each level pieces are greedily merged up to the token
//! budget; a merged candidate that still exceeds the budget descends to the
//! finer separators. Consecutive chunks share a trailing window of whole
//! pieces bounded by the overlap budget.

use corpusdb_core::{ChunkError, ChunkParams, TextSplitter, TokenCounter};
use std::sync::Arc;

/// Separators tried in order, coarsest first. The empty string means
/// character-level splitting and always matches.
const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Recursive splitter with greedy merge and backward overlap.
///
/// Pure and stateless across calls: output depends only on the input text,
/// the parameters, and the injected [`TokenCounter`]. Safe to share across
/// tasks.
pub struct RecursiveSplitter {
    counter: Arc<dyn TokenCounter>,
}

impl RecursiveSplitter {
    /// Create a splitter using the given token counter.
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        Self { counter }
    }

    fn count(&self, text: &str) -> usize {
        self.counter.count(text)
    }

    /// Split one span at the current separator level, appending chunks to
    /// `out` in document order.
    fn split_level(
        &self,
        text: &str,
        separators: &[&str],
        params: &ChunkParams,
        out: &mut Vec<String>,
    ) {
        // Base case: the whole span already fits in one chunk.
        if self.count(text) <= params.max_tokens {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
            return;
        }

        // Pick the first separator that occurs in this span. The empty
        // string always matches and leaves nothing finer to fall back to.
        let mut separator = *separators.last().unwrap_or(&"");
        let mut remaining: &[&str] = &[];
        for (i, &sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = sep;
                remaining = &[];
                break;
            }
            if text.contains(sep) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).collect()
        };

        let sep_cost = self.count(separator);

        let mut group: Vec<&str> = Vec::new();
        let mut group_len = 0usize;

        for piece in pieces {
            let piece_len = self.count(piece);
            let sep_len = if group.is_empty() { 0 } else { sep_cost };

            if !group.is_empty() && group_len + sep_len + piece_len > params.max_tokens {
                self.flush(&group, separator, remaining, params, out);

                // Reseed the next group with the trailing overlap window of
                // the group just flushed.
                let (tail, tail_len) = self.overlap_tail(&group, params.overlap_tokens);
                group = tail;
                group_len = tail_len;
            }

            let joined_sep = if group_len > 0 { sep_len } else { 0 };
            group.push(piece);
            group_len += joined_sep + piece_len;
        }

        if !group.is_empty() {
            self.flush(&group, separator, remaining, params, out);
        }
    }

    /// Join a finished group and either emit it or, when finer separators
    /// remain and it still exceeds the budget, descend into them.
    fn flush(
        &self,
        group: &[&str],
        separator: &str,
        remaining: &[&str],
        params: &ChunkParams,
        out: &mut Vec<String>,
    ) {
        let merged = group.join(separator);
        if !remaining.is_empty() && self.count(&merged) > params.max_tokens {
            self.split_level(&merged, remaining, params, out);
        } else {
            let trimmed = merged.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
    }

    /// Trailing pieces of `group` whose cumulative token count stays within
    /// the overlap budget, in original order.
    ///
    /// Whole pieces only: the window never reaches inside a piece, so a
    /// final piece that alone exceeds the budget leaves the window empty.
    fn overlap_tail<'p>(&self, group: &[&'p str], overlap_tokens: usize) -> (Vec<&'p str>, usize) {
        let mut tail: Vec<&'p str> = Vec::new();
        let mut total = 0usize;
        for &piece in group.iter().rev() {
            let piece_len = self.count(piece);
            if total + piece_len > overlap_tokens {
                break;
            }
            tail.insert(0, piece);
            total += piece_len;
        }
        (tail, total)
    }
}

impl TextSplitter for RecursiveSplitter {
    fn name(&self) -> &str {
        "recursive"
    }

    fn split(&self, text: &str, params: &ChunkParams) -> Result<Vec<String>, ChunkError> {
        params.validate()?;
        let mut chunks = Vec::new();
        self.split_level(text, SEPARATORS, params, &mut chunks);
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BpeTokenCounter;

    /// One token per character. Makes the accounting exactly predictable.
    struct CharCounter;

    impl TokenCounter for CharCounter {
        fn count(&self, text: &str) -> usize {
            text.chars().count()
        }
    }

    /// One token per byte. Multi-byte characters become oversized atomic
    /// units under small budgets.
    struct ByteCounter;

    impl TokenCounter for ByteCounter {
        fn count(&self, text: &str) -> usize {
            text.len()
        }
    }

    fn char_splitter() -> RecursiveSplitter {
        RecursiveSplitter::new(Arc::new(CharCounter))
    }

    fn bpe_splitter() -> RecursiveSplitter {
        RecursiveSplitter::new(BpeTokenCounter::shared())
    }

    /// Multiset of non-whitespace characters.
    fn char_counts(text: &str) -> std::collections::HashMap<char, usize> {
        let mut counts = std::collections::HashMap::new();
        for c in text.chars().filter(|c| !c.is_whitespace()) {
            *counts.entry(c).or_insert(0) += 1;
        }
        counts
    }

    // ==================== Base case and degenerate inputs ====================

    #[test]
    fn test_short_text_single_chunk() {
        let splitter = bpe_splitter();
        let chunks = splitter
            .split("Hello world", &ChunkParams::new(100, 10))
            .unwrap();
        assert_eq!(chunks, vec!["Hello world".to_string()]);
    }

    #[test]
    fn test_single_chunk_is_trimmed() {
        let splitter = bpe_splitter();
        let chunks = splitter
            .split("  Hello world \n", &ChunkParams::new(100, 10))
            .unwrap();
        assert_eq!(chunks, vec!["Hello world".to_string()]);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let splitter = bpe_splitter();
        let chunks = splitter.split("", &ChunkParams::new(100, 10)).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_whitespace_only_yields_no_chunks() {
        let splitter = bpe_splitter();
        let chunks = splitter
            .split("   \n\n  ", &ChunkParams::new(100, 10))
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_whitespace_only_beyond_budget_yields_no_chunks() {
        // Forces descent through the space and character levels; every
        // candidate trims to nothing.
        let splitter = char_splitter();
        let chunks = splitter.split("     ", &ChunkParams::new(2, 0)).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_zero_max_tokens_rejected() {
        let splitter = char_splitter();
        let err = splitter.split("text", &ChunkParams::new(0, 0)).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidConfig(_)));
    }

    // ==================== Greedy merge at one level ====================

    #[test]
    fn test_merge_at_space_level() {
        let splitter = char_splitter();
        let chunks = splitter
            .split("aaa bbb ccc ddd", &ChunkParams::new(7, 0))
            .unwrap();
        assert_eq!(chunks, vec!["aaa bbb".to_string(), "ccc ddd".to_string()]);
    }

    #[test]
    fn test_separator_cost_counted_between_pieces() {
        // "aaa bbb" is exactly 7 chars; budget 6 cannot hold both pieces
        // plus the joining space.
        let splitter = char_splitter();
        let chunks = splitter
            .split("aaa bbb", &ChunkParams::new(6, 0))
            .unwrap();
        assert_eq!(chunks, vec!["aaa".to_string(), "bbb".to_string()]);
    }

    #[test]
    fn test_paragraph_separator_preferred() {
        let splitter = char_splitter();
        let chunks = splitter
            .split("aaaa\n\nbbbb", &ChunkParams::new(6, 0))
            .unwrap();
        assert_eq!(chunks, vec!["aaaa".to_string(), "bbbb".to_string()]);
    }

    #[test]
    fn test_line_separator_when_no_paragraphs() {
        let splitter = char_splitter();
        let chunks = splitter
            .split("aaaa\nbbbb\ncccc", &ChunkParams::new(9, 0))
            .unwrap();
        assert_eq!(chunks, vec!["aaaa\nbbbb".to_string(), "cccc".to_string()]);
    }

    // ==================== Overlap ====================

    #[test]
    fn test_overlap_reseeds_next_chunk() {
        let splitter = char_splitter();
        let chunks = splitter
            .split("aaa bbb ccc ddd", &ChunkParams::new(7, 3))
            .unwrap();
        assert_eq!(
            chunks,
            vec![
                "aaa bbb".to_string(),
                "bbb ccc".to_string(),
                "ccc ddd".to_string()
            ]
        );
    }

    #[test]
    fn test_zero_overlap_no_shared_content() {
        let splitter = char_splitter();
        let chunks = splitter
            .split("aaa bbb ccc ddd", &ChunkParams::new(7, 0))
            .unwrap();
        assert_eq!(chunks, vec!["aaa bbb".to_string(), "ccc ddd".to_string()]);
    }

    #[test]
    fn test_overlap_window_takes_whole_pieces_only() {
        // Overlap budget 4 fits "bbb" (3) but not "aaa bbb"; the window
        // never takes part of a piece.
        let splitter = char_splitter();
        let chunks = splitter
            .split("aaa bbb ccc", &ChunkParams::new(7, 4))
            .unwrap();
        assert_eq!(chunks, vec!["aaa bbb".to_string(), "bbb ccc".to_string()]);
    }

    #[test]
    fn test_overlap_window_empty_when_piece_exceeds_budget() {
        // Every piece is 5 tokens; an overlap budget of 4 cannot take any
        // whole piece, so boundaries degrade to zero overlap.
        let splitter = char_splitter();
        let chunks = splitter
            .split("aaaaa bbbbb ccccc", &ChunkParams::new(11, 4))
            .unwrap();
        assert_eq!(chunks, vec!["aaaaa bbbbb".to_string(), "ccccc".to_string()]);
    }

    #[test]
    fn test_overlap_larger_than_max_tokens_tolerated() {
        // The reseeded group may immediately exceed the budget; chunks then
        // flush quickly and carry mostly-overlap content. No panic, no error.
        let splitter = char_splitter();
        let chunks = splitter
            .split("aaa bbb ccc ddd eee", &ChunkParams::new(7, 100))
            .unwrap();
        assert!(chunks.len() >= 2);
        for window in chunks.windows(2) {
            let first_words: Vec<&str> = window[0].split(' ').collect();
            let second_words: Vec<&str> = window[1].split(' ').collect();
            assert!(
                first_words.iter().any(|w| second_words.contains(w)),
                "expected shared content between {:?} and {:?}",
                window[0],
                window[1]
            );
        }
    }

    // ==================== Recursive descent ====================

    #[test]
    fn test_oversized_piece_descends_to_finer_separator() {
        // The first line cannot fit, so it descends from line to space
        // level; the second line stays whole.
        let splitter = char_splitter();
        let chunks = splitter
            .split("aaa bbb ccc\nddd", &ChunkParams::new(7, 0))
            .unwrap();
        assert_eq!(
            chunks,
            vec!["aaa bbb".to_string(), "ccc".to_string(), "ddd".to_string()]
        );
    }

    #[test]
    fn test_unbroken_run_descends_to_characters() {
        let splitter = char_splitter();
        let chunks = splitter
            .split("aaaaaaaaaa bbb", &ChunkParams::new(7, 0))
            .unwrap();
        assert_eq!(
            chunks,
            vec!["aaaaaaa".to_string(), "aaa".to_string(), "bbb".to_string()]
        );
    }

    #[test]
    fn test_character_level_split_without_any_separator() {
        let splitter = char_splitter();
        let chunks = splitter.split("abcdefghij", &ChunkParams::new(4, 0)).unwrap();
        assert_eq!(
            chunks,
            vec!["abcd".to_string(), "efgh".to_string(), "ij".to_string()]
        );
    }

    #[test]
    fn test_character_level_respects_utf8_boundaries() {
        let splitter = char_splitter();
        let chunks = splitter.split("日本語テキスト", &ChunkParams::new(3, 0)).unwrap();
        assert_eq!(
            chunks,
            vec!["日本語".to_string(), "テキス".to_string(), "ト".to_string()]
        );
    }

    #[test]
    fn test_oversized_atomic_unit_emitted_not_errored() {
        // Under a byte counter each 4-byte character exceeds the 3-token
        // budget on its own; indivisible units are still emitted.
        let splitter = RecursiveSplitter::new(Arc::new(ByteCounter));
        let chunks = splitter.split("🌍🌍", &ChunkParams::new(3, 0)).unwrap();
        assert_eq!(chunks, vec!["🌍".to_string(), "🌍".to_string()]);
    }

    // ==================== Properties ====================

    #[test]
    fn test_no_data_loss_across_levels() {
        let splitter = char_splitter();
        let text = "alpha beta gamma\ndelta epsilon\n\nzeta eta theta iota kappa";
        let chunks = splitter.split(text, &ChunkParams::new(12, 0)).unwrap();

        let original = char_counts(text);
        let emitted = char_counts(&chunks.join(" "));
        for (c, n) in original {
            assert!(
                emitted.get(&c).copied().unwrap_or(0) >= n,
                "character {c:?} lost"
            );
        }
    }

    #[test]
    fn test_overlap_only_adds_duplication() {
        let splitter = char_splitter();
        let text = "aaa bbb ccc ddd eee fff";
        let plain = splitter.split(text, &ChunkParams::new(7, 0)).unwrap();
        let overlapped = splitter.split(text, &ChunkParams::new(7, 3)).unwrap();

        let base = char_counts(&plain.join(" "));
        let extra = char_counts(&overlapped.join(" "));
        for (c, n) in base {
            assert!(extra.get(&c).copied().unwrap_or(0) >= n);
        }
    }

    #[test]
    fn test_chunks_preserve_document_order() {
        let splitter = char_splitter();
        let text = "one two three four five six seven eight";
        let chunks = splitter.split(text, &ChunkParams::new(10, 0)).unwrap();
        assert!(chunks.len() >= 2);

        let mut cursor = 0;
        for chunk in &chunks {
            let pos = text[cursor..]
                .find(chunk.as_str())
                .expect("chunk should appear after the previous one");
            cursor += pos;
        }
    }

    #[test]
    fn test_idempotent_when_text_fits() {
        let splitter = bpe_splitter();
        let text = "A short paragraph that fits comfortably.";
        for overlap in [0, 10, 1000] {
            let chunks = splitter.split(text, &ChunkParams::new(100, overlap)).unwrap();
            assert_eq!(chunks, vec![text.to_string()]);
        }
    }

    // ==================== Real-vocabulary scenarios ====================

    #[test]
    fn test_long_text_splits_within_budget() {
        let splitter = bpe_splitter();
        let counter = BpeTokenCounter::shared();
        let text = "word ".repeat(2000);
        let params = ChunkParams::new(200, 0);
        let chunks = splitter.split(&text, &params).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                counter.count(chunk) <= params.max_tokens,
                "chunk exceeded token budget"
            );
        }
    }

    #[test]
    fn test_paragraphs_overlap_shares_content() {
        let splitter = bpe_splitter();
        let paragraphs: Vec<String> = (0..10)
            .map(|i| format!("Paragraph {i} {}", "filler ".repeat(80)))
            .collect();
        let text = paragraphs.join("\n\n");
        let chunks = splitter.split(&text, &ChunkParams::new(200, 50)).unwrap();

        assert!(chunks.len() >= 2);
        let shared = chunks.windows(2).any(|pair| {
            let a: std::collections::HashSet<&str> = pair[0].split_whitespace().collect();
            pair[1].split_whitespace().any(|w| a.contains(w))
        });
        assert!(shared, "expected overlapping content between consecutive chunks");
    }

    #[test]
    fn test_single_line_falls_back_through_hierarchy() {
        let splitter = bpe_splitter();
        let counter = BpeTokenCounter::shared();
        let words: Vec<String> = (0..50).map(|i| format!("item{i}")).collect();
        let text = words.join(" ");
        assert!(counter.count(&text) > 10);

        let params = ChunkParams::new(10, 0);
        let chunks = splitter.split(&text, &params).unwrap();

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(counter.count(chunk) <= params.max_tokens);
        }

        // With zero overlap, concatenating the chunks reproduces every word.
        let rebuilt: Vec<&str> = chunks.iter().flat_map(|c| c.split_whitespace()).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_paragraph_boundaries_preferred_over_midsplit() {
        let splitter = bpe_splitter();
        let para = "word ".repeat(150);
        let text = format!("{para}\n\n{para}\n\n{para}");
        let chunks = splitter.split(&text, &ChunkParams::new(200, 0)).unwrap();
        assert!(chunks.len() >= 2);
    }

    #[test]
    fn test_lines_used_when_paragraphs_too_long() {
        let splitter = bpe_splitter();
        let line = "word ".repeat(150);
        let text = format!("{line}\n{line}\n{line}");
        let chunks = splitter.split(&text, &ChunkParams::new(200, 0)).unwrap();
        assert!(chunks.len() >= 2);
    }

    #[test]
    fn test_splitter_name() {
        assert_eq!(char_splitter().name(), "recursive");
    }
}
