//! Splitting long replies into Discord-sized messages.

/// Discord's per-message character limit.
pub const HARD_LIMIT: usize = 2000;

/// Target chunk size, leaving room for continuation markers.
pub const SOFT_LIMIT: usize = 1900;

const SENTENCE_BREAK: &str = ". ";
const CONTINUATION: &str = "...";

/// Split `text` using the default Discord limits.
#[must_use]
pub fn split_message(text: &str) -> Vec<String> {
    split_with_limits(text, HARD_LIMIT, SOFT_LIMIT)
}

/// Split `text` into chunks of at most `hard_limit` characters.
///
/// Chunks break after `". "` where possible. A sentence longer than
/// `soft_limit` is cut and marked with `...` on both sides of the cut.
#[must_use]
pub fn split_with_limits(text: &str, hard_limit: usize, soft_limit: usize) -> Vec<String> {
    if char_len(text) <= hard_limit {
        return vec![text.to_string()];
    }

    // Each forced cut must make progress past the re-added marker.
    let min_soft = CONTINUATION.len() + 1;
    let soft_limit = soft_limit.clamp(min_soft, hard_limit.max(min_soft));
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for segment in sentences(text) {
        let segment_len = char_len(segment);
        if current_len + segment_len <= soft_limit {
            current.push_str(segment);
            current_len += segment_len;
            continue;
        }

        flush(&mut chunks, &mut current);

        let mut rest = segment.to_string();
        while char_len(&rest) > soft_limit {
            let (head, tail) = split_at_char(&rest, soft_limit);
            chunks.push(format!("{head}{CONTINUATION}"));
            rest = format!("{CONTINUATION}{tail}");
        }
        current_len = char_len(&rest);
        current = rest;
    }
    flush(&mut chunks, &mut current);

    enforce_hard_limit(chunks, hard_limit)
}

/// Segments ending with the `". "` they were split on; the last keeps none.
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(SENTENCE_BREAK)
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim_end();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

/// Re-cut anything still longer than `hard_limit`.
fn enforce_hard_limit(chunks: Vec<String>, hard_limit: usize) -> Vec<String> {
    let hard_limit = hard_limit.max(1);
    let mut out = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let mut rest = chunk.as_str();
        while char_len(rest) > hard_limit {
            let (head, tail) = split_at_char(rest, hard_limit);
            out.push(head.to_string());
            rest = tail;
        }
        if !rest.is_empty() {
            out.push(rest.to_string());
        }
    }
    out
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_at_char(s: &str, n: usize) -> (&str, &str) {
    let idx = s.char_indices().nth(n).map_or(s.len(), |(i, _)| i);
    s.split_at(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_within(chunks: &[String], limit: usize) {
        for chunk in chunks {
            assert!(
                char_len(chunk) <= limit,
                "chunk of {} characters exceeds {limit}",
                char_len(chunk)
            );
        }
    }

    #[test]
    fn short_text_is_untouched() {
        let text = "Hello, human. Bring me cookies. ";
        assert_eq!(split_message(text), vec![text.to_string()]);

        let exact = "x".repeat(HARD_LIMIT);
        assert_eq!(split_message(&exact), vec![exact.clone()]);
    }

    #[test]
    fn unbroken_text_is_force_split_with_markers() {
        let text = "a".repeat(2500);
        let chunks = split_message(&text);

        assert_eq!(chunks.len(), 2);
        assert_within(&chunks, HARD_LIMIT);
        assert!(chunks[0].ends_with("..."));
        assert!(chunks[1].starts_with("..."));
        assert_eq!(chunks[0], format!("{}...", "a".repeat(SOFT_LIMIT)));
        assert_eq!(chunks[1], format!("...{}", "a".repeat(600)));
    }

    #[test]
    fn very_long_sentence_is_cut_repeatedly() {
        let text = "b".repeat(6000);
        let chunks = split_message(&text);

        assert_within(&chunks, HARD_LIMIT);
        assert_eq!(chunks.len(), 4);
        let restored: String = chunks
            .iter()
            .map(|c| c.trim_start_matches("...").trim_end_matches("..."))
            .collect();
        assert_eq!(restored, text);
    }

    #[test]
    fn prefers_sentence_boundaries() {
        let sentence = format!("{}. ", "s".repeat(98));
        let text = sentence.repeat(30);
        let chunks = split_message(&text);

        assert_eq!(chunks.len(), 2);
        assert_within(&chunks, SOFT_LIMIT);
        for chunk in &chunks {
            assert!(chunk.ends_with('.'));
            assert!(!chunk.contains("..."));
        }
        assert_eq!(chunks.concat().replace(". ", "."), text.replace(". ", "."));
    }

    #[test]
    fn last_segment_gets_no_synthetic_period() {
        let text = format!("{}. tail without period", "w".repeat(2100));
        let chunks = split_message(&text);

        assert_within(&chunks, HARD_LIMIT);
        let last = chunks.last().unwrap();
        assert!(last.ends_with("tail without period"));
    }

    #[test]
    fn long_sentence_after_short_one_stays_within_limit() {
        let text = format!("Short intro. {}", "c".repeat(3000));
        let chunks = split_message(&text);

        assert_within(&chunks, HARD_LIMIT);
        assert_eq!(chunks[0], "Short intro.");
        assert!(chunks[1].ends_with("..."));
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let text = "ฅ^•ﻌ•^ฅ".repeat(400);
        let chunks = split_message(&text);

        assert_within(&chunks, HARD_LIMIT);
        assert!(chunks.len() >= 2);
    }

    #[test]
    fn tight_soft_limit_still_respects_hard_limit() {
        let text = "z".repeat(50);
        let chunks = split_with_limits(&text, 10, 9);

        assert_within(&chunks, 10);
        assert!(chunks.len() > 5);
    }
}
