//! Whole-word, case-insensitive multi-term matching over extracted text.

use anyhow::{Context, Result};
use regex::{Regex, RegexSet};
use std::collections::HashSet;

use crate::terms::TermSet;

/// Terms and matched lines found in one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Distinct terms in order of first discovery.
    pub terms: Vec<String>,
    /// Matching lines, trimmed, in text order (duplicates kept).
    pub lines: Vec<String>,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        !self.lines.is_empty()
    }
}

fn whole_word(escaped: &str) -> String {
    format!(r"(?i)\b(?:{escaped})\b")
}

/// Compiled form of a [`TermSet`]: one alternation for line selection, plus a per-term set
/// to attribute each matching line to the terms it contains. Build once per run.
#[derive(Clone, Debug)]
pub struct SearchPattern {
    /// `None` for an empty term set: nothing matches.
    alternation: Option<Regex>,
    per_term: RegexSet,
    /// Same patterns as `per_term`, for match positions.
    term_patterns: Vec<Regex>,
    terms: Vec<String>,
}

impl SearchPattern {
    pub fn compile(terms: &TermSet) -> Result<Self> {
        let terms: Vec<String> = terms.iter().map(str::to_string).collect();
        let escaped: Vec<String> = terms.iter().map(|t| regex::escape(t)).collect();
        let alternation = if escaped.is_empty() {
            None
        } else {
            Some(Regex::new(&whole_word(&escaped.join("|"))).context("compile term alternation")?)
        };
        let per_term = RegexSet::new(escaped.iter().map(|e| whole_word(e)))
            .context("compile per-term patterns")?;
        let term_patterns = per_term
            .patterns()
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()
            .context("compile per-term patterns")?;
        Ok(Self {
            alternation,
            per_term,
            term_patterns,
            terms,
        })
    }

    /// The alternation source, or `None` when there are no terms.
    pub fn as_str(&self) -> Option<&str> {
        self.alternation.as_ref().map(Regex::as_str)
    }

    pub fn is_line_match(&self, line: &str) -> bool {
        self.alternation.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// Indices of the terms present in `line`, ordered by where each first matches.
    fn terms_by_position(&self, line: &str) -> Vec<usize> {
        let mut hits: Vec<(usize, usize)> = self
            .per_term
            .matches(line)
            .iter()
            .filter_map(|idx| self.term_patterns[idx].find(line).map(|m| (m.start(), idx)))
            .collect();
        hits.sort_unstable();
        hits.into_iter().map(|(_, idx)| idx).collect()
    }

    /// Scan `text` line by line.
    pub fn scan(&self, text: &str) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();
        let mut seen: HashSet<usize> = HashSet::new();
        for line in split_lines(text) {
            if !self.is_line_match(line) {
                continue;
            }
            let trimmed = line.trim();
            for idx in self.terms_by_position(trimmed) {
                if seen.insert(idx) {
                    outcome.terms.push(self.terms[idx].clone());
                }
            }
            outcome.lines.push(trimmed.to_string());
        }
        outcome
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{1C}' | '\u{1D}' | '\u{1E}' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}

/// Split on any common line break (`\r\n` counts once). No trailing empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        let mut end = i + c.len_utf8();
        if c == '\r'
            && let Some(&(j, '\n')) = chars.peek()
        {
            chars.next();
            end = j + 1;
        }
        start = end;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
