// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Duration;

pub const ELLIPSIS: char = '…';
pub const STATUS_VALUE_LIMIT: usize = 60;

const ID_KEYS: [&str; 4] = ["id", "uuid", "uid", "identifier"];

/// Turns a field identifier into a display header: `APIProductID` becomes
/// `API PRODUCT ID`, `created_at` becomes `CREATED AT`.
pub fn tokenize_header(field: &str) -> String {
    if field.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = field.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (index, &ch) in chars.iter().enumerate() {
        if ch == '_' {
            push_word(&mut words, &mut current);
            continue;
        }
        if index > 0 {
            let prev = chars[index - 1];
            let next = chars.get(index + 1).copied();
            if breaks_before(prev, ch, next) {
                push_word(&mut words, &mut current);
            }
        }
        current.push(ch);
    }
    push_word(&mut words, &mut current);

    words
        .iter()
        .map(|word| word.to_uppercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn breaks_before(prev: char, current: char, next: Option<char>) -> bool {
    if current.is_numeric() && !prev.is_numeric() {
        return true;
    }
    if !current.is_uppercase() {
        return false;
    }
    if !prev.is_uppercase() {
        return true;
    }
    next.is_some_and(char::is_lowercase)
}

fn push_word(words: &mut Vec<String>, current: &mut String) {
    let word = current.trim();
    if !word.is_empty() {
        words.push(word.to_owned());
    }
    current.clear();
}

pub fn normalize_header_key(header: &str) -> String {
    header
        .trim()
        .replace(['_', '-'], " ")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn compact_key(label: &str) -> String {
    normalize_header_key(label).replace(' ', "")
}

pub fn is_uuid_like(value: &str) -> bool {
    let trimmed = value.trim();
    match trimmed.len() {
        36 => trimmed.char_indices().all(|(index, ch)| match index {
            8 | 13 | 18 | 23 => ch == '-',
            _ => ch.is_ascii_hexdigit(),
        }),
        32 => trimmed.chars().all(|ch| ch.is_ascii_hexdigit()),
        _ => false,
    }
}

pub fn is_id_header_key(key: &str) -> bool {
    let key = key.trim();
    if key.is_empty() {
        return false;
    }
    ID_KEYS.iter().any(|id| {
        key == *id
            || key
                .strip_suffix(id)
                .is_some_and(|rest| rest.ends_with(' '))
    })
}

pub fn abbreviate_id(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || !is_uuid_like(trimmed) {
        return value.to_owned();
    }
    truncate_with_ellipsis(trimmed, 5)
}

pub fn abbreviate_matrix_ids(headers: &[String], rows: &[Vec<String>]) -> Vec<Vec<String>> {
    let id_columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| is_id_header_key(&normalize_header_key(header)))
        .map(|(index, _)| index)
        .collect();

    rows.iter()
        .map(|row| {
            let mut copy = row.clone();
            for &index in &id_columns {
                if let Some(cell) = copy.get_mut(index) {
                    *cell = abbreviate_id(cell);
                }
            }
            copy
        })
        .collect()
}

pub fn truncate_with_ellipsis(value: &str, max_len: usize) -> String {
    if max_len == 0 || value.chars().count() <= max_len {
        return value.to_owned();
    }
    if max_len == 1 {
        return ELLIPSIS.to_string();
    }
    let mut out: String = value.chars().take(max_len - 1).collect();
    out.push(ELLIPSIS);
    out
}

pub fn abbreviate_value(value: &str, limit: usize) -> String {
    let value = value.trim();
    if limit == 0 || value.chars().count() <= limit {
        return value.to_owned();
    }
    if is_uuid_like(value) && limit >= 5 {
        return truncate_with_ellipsis(value, 5);
    }
    if limit == 1 {
        return value.chars().take(1).collect();
    }
    truncate_with_ellipsis(value, limit)
}

pub fn title_from_label(label: &str) -> String {
    label
        .trim()
        .split(|ch: char| ch == '_' || ch == '-' || ch.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = (elapsed.as_millis() + 500) / 1000;
    if seconds < 1 {
        let tenths = (elapsed.as_millis() + 50) / 100;
        return format!("{:.1}s", tenths as f64 / 10.0);
    }
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    match seconds % 60 {
        0 => format!("{minutes}min"),
        remainder => format!("{minutes}min {remainder}s"),
    }
}

pub fn format_status_value(value: &str) -> String {
    let clean = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.is_empty() {
        return "(empty)".to_owned();
    }
    abbreviate_value(&clean, STATUS_VALUE_LIMIT)
}

pub fn quote_breadcrumb_segment(segment: &str) -> String {
    let trimmed = segment.trim();
    if trimmed.contains([' ', '>']) {
        format!("{trimmed:?}")
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{
        abbreviate_matrix_ids, abbreviate_value, format_elapsed, format_status_value,
        is_id_header_key, is_uuid_like, normalize_header_key, quote_breadcrumb_segment,
        title_from_label, tokenize_header, truncate_with_ellipsis,
    };

    #[test]
    fn headers_split_on_case_and_digits() {
        assert_eq!(tokenize_header("APIProductID"), "API PRODUCT ID");
        assert_eq!(tokenize_header("createdAt"), "CREATED AT");
        assert_eq!(tokenize_header("created_at"), "CREATED AT");
        assert_eq!(tokenize_header("Port8080"), "PORT 8080");
        assert_eq!(tokenize_header("ID"), "ID");
        assert_eq!(tokenize_header(""), "");
    }

    #[test]
    fn header_keys_normalize_separators() {
        assert_eq!(normalize_header_key("Display-Name"), "display name");
        assert_eq!(normalize_header_key("display_name"), "display name");
        assert_eq!(normalize_header_key("  CONTROL   PLANE  "), "control plane");
    }

    #[test]
    fn uuid_detection() {
        assert!(is_uuid_like("94db15db-4d02-46c2-a007-765e7a1d64c7"));
        assert!(is_uuid_like("94DB15DB4D0246C2A007765E7A1D64C7"));
        assert!(!is_uuid_like("94db15db_4d02_46c2_a007_765e7a1d64c7"));
        assert!(!is_uuid_like("not-a-uuid"));
    }

    #[test]
    fn id_header_keys() {
        assert!(is_id_header_key("id"));
        assert!(is_id_header_key("control plane id"));
        assert!(is_id_header_key("uuid"));
        assert!(!is_id_header_key("valid"));
        assert!(!is_id_header_key("name"));
    }

    #[test]
    fn matrix_abbreviation_leaves_input_alone() {
        let headers = vec!["ID".to_owned(), "Name".to_owned()];
        let rows = vec![
            vec![
                "94db15db-4d02-46c2-a007-765e7a1d64c7".to_owned(),
                "example".to_owned(),
            ],
            vec![
                "12345678-1234-1234-1234-1234567890ab".to_owned(),
                "other".to_owned(),
            ],
        ];

        let abbreviated = abbreviate_matrix_ids(&headers, &rows);
        assert_eq!(abbreviated[0][0], "94db…");
        assert_eq!(abbreviated[1][0], "1234…");
        assert_eq!(abbreviated[0][1], "example");
        assert_eq!(rows[0][0], "94db15db-4d02-46c2-a007-765e7a1d64c7");
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_with_ellipsis("abcdef", 4), "abc…");
        assert_eq!(truncate_with_ellipsis("abc", 4), "abc");
        assert_eq!(truncate_with_ellipsis("abc", 1), "…");
        assert_eq!(truncate_with_ellipsis("abc", 0), "abc");
        assert_eq!(
            abbreviate_value("94db15db-4d02-46c2-a007-765e7a1d64c7", 12),
            "94db…"
        );
        assert_eq!(abbreviate_value("abcdef", 1), "a");
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(Duration::from_millis(340)), "0.3s");
        assert_eq!(format_elapsed(Duration::from_secs(12)), "12s");
        assert_eq!(format_elapsed(Duration::from_secs(120)), "2min");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2min 5s");
    }

    #[test]
    fn status_and_titles() {
        assert_eq!(format_status_value("  "), "(empty)");
        assert_eq!(format_status_value("a\n  b"), "a b");
        assert_eq!(title_from_label("data_plane-nodes"), "Data Plane Nodes");
        assert_eq!(quote_breadcrumb_segment("my service"), "\"my service\"");
        assert_eq!(quote_breadcrumb_segment("routes"), "routes");
    }
}
