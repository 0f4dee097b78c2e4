//! Greedy text layout with hard character-level fallback
//!
//! Produces the lines to burn into a fixed-size freetext box. Unlike naive
//! word wrap, no breakable line ever exceeds the width budget: a word too
//! wide to fit whole is broken one character at a time, because the output
//! box has no overflow clipping.
//!
//! Lines are produced lazily through a by-value iterator and consumed once
//! per export.

/// Wrap `text` against `max_width`, measuring candidates with `measure`.
///
/// Explicit newlines split the input into paragraphs that wrap
/// independently; an empty paragraph yields one empty line so blank-line
/// spacing survives. Empty input or a non-positive budget yields nothing.
pub fn wrap<M>(text: &str, measure: M, max_width: f64) -> Lines<'_, M>
where
    M: FnMut(&str) -> f64,
{
    let paragraphs = if text.is_empty() || max_width <= 0.0 {
        None
    } else {
        Some(text.split('\n'))
    };
    Lines {
        measure,
        max_width,
        paragraphs,
        words: None,
        chars: None,
        pending_word: None,
        line: String::new(),
        emitted_in_paragraph: false,
    }
}

/// Lazy, finite line sequence. Every emitted line satisfies
/// `measure(line) <= max_width` unless it is a single character that alone
/// exceeds the budget.
pub struct Lines<'a, M> {
    measure: M,
    max_width: f64,
    paragraphs: Option<std::str::Split<'a, char>>,
    words: Option<std::str::SplitWhitespace<'a>>,
    /// Remaining characters of a word too wide to fit whole.
    chars: Option<std::str::Chars<'a>>,
    /// A word that overflowed the just-flushed line; retried first.
    pending_word: Option<&'a str>,
    line: String,
    emitted_in_paragraph: bool,
}

impl<M> Iterator for Lines<'_, M>
where
    M: FnMut(&str) -> f64,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        'outer: loop {
            // Character-level fallback: grow a run one char at a time,
            // emitting a full line whenever growth would overflow. The
            // final partial run carries forward and may combine with the
            // next word.
            if let Some(chars) = self.chars.as_mut() {
                for ch in chars.by_ref() {
                    let mut candidate = self.line.clone();
                    candidate.push(ch);
                    if (self.measure)(&candidate) <= self.max_width {
                        self.line = candidate;
                    } else if self.line.is_empty() {
                        // A single char wider than the budget still has to
                        // make progress: it becomes its own line.
                        self.emitted_in_paragraph = true;
                        return Some(ch.to_string());
                    } else {
                        let full = std::mem::replace(&mut self.line, ch.to_string());
                        self.emitted_in_paragraph = true;
                        return Some(full);
                    }
                }
                self.chars = None;
            }

            if let Some(words) = self.words.as_mut() {
                while let Some(word) = self.pending_word.take().or_else(|| words.next()) {
                    let candidate = if self.line.is_empty() {
                        word.to_string()
                    } else {
                        format!("{} {}", self.line, word)
                    };
                    if (self.measure)(&candidate) <= self.max_width {
                        self.line = candidate;
                        continue;
                    }
                    if !self.line.is_empty() {
                        // Flush and retry this word against an empty line.
                        self.pending_word = Some(word);
                        self.emitted_in_paragraph = true;
                        return Some(std::mem::take(&mut self.line));
                    }
                    // Unbreakable at word granularity.
                    self.chars = Some(word.chars());
                    continue 'outer;
                }
                self.words = None;
                if !self.line.is_empty() {
                    self.emitted_in_paragraph = true;
                    return Some(std::mem::take(&mut self.line));
                }
                if !self.emitted_in_paragraph {
                    self.emitted_in_paragraph = true;
                    return Some(String::new());
                }
                continue;
            }

            match self.paragraphs.as_mut()?.next() {
                Some(paragraph) => {
                    self.words = Some(paragraph.split_whitespace());
                    self.emitted_in_paragraph = false;
                }
                None => {
                    self.paragraphs = None;
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// One unit per char keeps the expected break points obvious.
    fn by_chars(s: &str) -> f64 {
        s.chars().count() as f64
    }

    fn collect(text: &str, max_width: f64) -> Vec<String> {
        wrap(text, by_chars, max_width).collect()
    }

    #[test]
    fn test_prefit_text_is_one_line() {
        assert_eq!(collect("hello world", 11.0), vec!["hello world"]);
    }

    #[test]
    fn test_greedy_break_between_words() {
        // Budget fits "hello" exactly but not "hello world".
        assert_eq!(collect("hello world", 5.0), vec!["hello", "world"]);
    }

    #[test]
    fn test_word_exactly_at_budget_stays_whole() {
        assert_eq!(collect("abcde", 5.0), vec!["abcde"]);
    }

    #[test]
    fn test_explicit_newlines_are_never_merged() {
        assert_eq!(collect("one\ntwo three", 20.0), vec!["one", "two three"]);
    }

    #[test]
    fn test_empty_paragraph_becomes_empty_line() {
        assert_eq!(collect("a\n\nb", 10.0), vec!["a", "", "b"]);
    }

    #[test]
    fn test_whitespace_only_paragraph_becomes_empty_line() {
        assert_eq!(collect("a\n   \nb", 10.0), vec!["a", "", "b"]);
    }

    #[test]
    fn test_unbreakable_word_falls_back_to_chars() {
        assert_eq!(collect("abcdefgh", 3.0), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_char_fallback_carry_joins_next_word() {
        // "abcdefg" breaks into "abc", "def"; the carry "g" then combines
        // with "hi" as "g hi" (4 units) under a 4-unit budget.
        assert_eq!(collect("abcdefg hi", 4.0), vec!["abcd", "efg", "hi"]);
        assert_eq!(collect("abcdefg hi", 5.0), vec!["abcde", "fg hi"]);
    }

    #[test]
    fn test_single_char_over_budget_still_emits() {
        let wide = |s: &str| s.chars().count() as f64 * 10.0;
        let lines: Vec<String> = wrap("ab", wide, 5.0).collect();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert_eq!(collect("", 10.0), Vec::<String>::new());
    }

    #[test]
    fn test_non_positive_budget_yields_nothing() {
        assert_eq!(collect("hello", 0.0), Vec::<String>::new());
        assert_eq!(collect("hello", -1.0), Vec::<String>::new());
    }

    #[test]
    fn test_sequence_is_finite() {
        let lines: Vec<String> = wrap("words repeat here often", by_chars, 1.0).collect();
        let total: usize = lines.iter().map(|l| l.chars().count()).sum();
        assert_eq!(total, "wordsrepeathereoften".len());
    }
}
