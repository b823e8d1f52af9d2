// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

pub const SEARCH_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    buffer: String,
    deadline: Instant,
}

impl SearchState {
    pub fn new(now: Instant) -> Self {
        Self {
            buffer: String::new(),
            deadline: now + SEARCH_IDLE_TIMEOUT,
        }
    }

    pub fn query(&self) -> &str {
        &self.buffer
    }

    pub fn prompt(&self) -> String {
        format!("/{}", self.buffer)
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn push(&mut self, ch: char, now: Instant) -> bool {
        if ch.is_control() {
            return false;
        }
        self.buffer.push(ch);
        self.touch(now);
        true
    }

    pub fn pop(&mut self, now: Instant) -> bool {
        if self.buffer.pop().is_none() {
            return false;
        }
        self.touch(now);
        true
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    fn touch(&mut self, now: Instant) {
        self.deadline = now + SEARCH_IDLE_TIMEOUT;
    }
}

pub fn match_score(text: &str, needle: &str) -> u8 {
    if text.starts_with(needle) {
        3
    } else if text.contains(needle) {
        2
    } else if fuzzy_contains(text, needle) {
        1
    } else {
        0
    }
}

pub fn fuzzy_contains(text: &str, needle: &str) -> bool {
    let mut remaining = needle.chars().peekable();
    for ch in text.chars() {
        if remaining.peek() == Some(&ch) {
            remaining.next();
        }
    }
    remaining.peek().is_none()
}

/// Scans every row once, starting at `cursor` and wrapping. A prefix hit
/// wins immediately; otherwise the best score found wins, earliest first.
pub fn find_match_index<F>(query: &str, cursor: usize, total: usize, label: F) -> Option<usize>
where
    F: Fn(usize) -> String,
{
    if total == 0 {
        return None;
    }
    let cursor = if cursor < total { cursor } else { 0 };
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Some(cursor);
    }

    let mut best: Option<(usize, u8)> = None;
    for offset in 0..total {
        let index = (cursor + offset) % total;
        let text = label(index).trim().to_lowercase();
        if text.is_empty() {
            continue;
        }
        match match_score(&text, &needle) {
            0 => {}
            3 => return Some(index),
            score => {
                if best.is_none_or(|(_, top)| score > top) {
                    best = Some((index, score));
                }
            }
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{SEARCH_IDLE_TIMEOUT, SearchState, find_match_index, fuzzy_contains, match_score};

    fn labels(values: &'static [&'static str]) -> impl Fn(usize) -> String {
        move |index| values[index].to_owned()
    }

    #[test]
    fn prefix_beats_substring() {
        let found = find_match_index("ab", 0, 3, labels(&["xab", "abc", "zzz"]));
        assert_eq!(found, Some(1));
        let found = find_match_index("ab", 0, 3, labels(&["abc", "xab", "zzz"]));
        assert_eq!(found, Some(0));
    }

    #[test]
    fn scan_starts_at_cursor_and_wraps() {
        let rows = labels(&["alpha", "beta", "alpine"]);
        assert_eq!(find_match_index("al", 1, 3, &rows), Some(2));
        assert_eq!(find_match_index("AL", 0, 3, &rows), Some(0));
    }

    #[test]
    fn substring_and_fuzzy_scores() {
        assert_eq!(match_score("payments", "ment"), 2);
        assert_eq!(match_score("payments", "pmt"), 1);
        assert_eq!(match_score("payments", "zz"), 0);
        assert!(fuzzy_contains("control plane", "cpl"));
        assert!(!fuzzy_contains("abc", "cb"));
        let found = find_match_index("pmt", 0, 2, labels(&["xyz", "payments"]));
        assert_eq!(found, Some(1));
    }

    #[test]
    fn no_match_and_empty_inputs() {
        assert_eq!(find_match_index("q", 0, 2, labels(&["a", "b"])), None);
        assert_eq!(find_match_index("", 1, 2, labels(&["a", "b"])), Some(1));
        assert_eq!(find_match_index("a", 0, 0, labels(&[])), None);
    }

    #[test]
    fn idle_deadline_moves_with_keystrokes() {
        let start = Instant::now();
        let mut search = SearchState::new(start);
        assert!(!search.is_expired(start + Duration::from_secs(9)));
        assert!(search.is_expired(start + SEARCH_IDLE_TIMEOUT));

        let later = start + Duration::from_secs(5);
        assert!(search.push('a', later));
        assert!(!search.push('\u{7}', later));
        assert_eq!(search.prompt(), "/a");
        assert!(!search.is_expired(start + SEARCH_IDLE_TIMEOUT));
        assert_eq!(search.deadline(), later + SEARCH_IDLE_TIMEOUT);

        assert!(search.pop(later));
        assert!(!search.pop(later));
        assert_eq!(search.query(), "");
    }
}
