// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::format::{abbreviate_value, normalize_header_key};

const ROOT_PRIORITY: [&str; 4] = ["name", "title", "display name", "slug"];
const CHILD_PRIORITY: [&str; 5] = ["name", "title", "display name", "slug", "version"];
const ID_CANDIDATES: [&str; 4] = ["id", "uuid", "uid", "identifier"];
const ID_LABEL_LIMIT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelScope {
    Root,
    Child,
}

impl LabelScope {
    fn priority(self) -> &'static [&'static str] {
        match self {
            Self::Root => &ROOT_PRIORITY,
            Self::Child => &CHILD_PRIORITY,
        }
    }
}

fn cell<'a>(headers: &[String], row: &'a [String], key: &str) -> Option<&'a str> {
    headers
        .iter()
        .position(|header| normalize_header_key(header) == key)
        .and_then(|index| row.get(index))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

pub fn preferred_column_value(
    headers: &[String],
    row: &[String],
    scope: LabelScope,
) -> Option<String> {
    for key in scope.priority() {
        if let Some(value) = cell(headers, row, key) {
            return Some(value.to_owned());
        }
    }

    let named = headers
        .iter()
        .zip(row)
        .filter(|(header, _)| normalize_header_key(header).contains("name"))
        .map(|(_, value)| value.trim())
        .find(|value| !value.is_empty());
    if let Some(value) = named {
        return Some(value.to_owned());
    }

    ID_CANDIDATES
        .iter()
        .find_map(|key| cell(headers, row, key))
        .map(|value| abbreviate_value(value, ID_LABEL_LIMIT))
}

pub fn row_label(
    headers: &[String],
    row: Option<&[String]>,
    index: usize,
    scope: LabelScope,
) -> String {
    let Some(row) = row.filter(|row| !row.is_empty()) else {
        return fallback_label(index);
    };
    if let Some(value) = preferred_column_value(headers, row, scope) {
        return value;
    }
    row.iter()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map_or_else(|| fallback_label(index), str::to_owned)
}

pub fn fallback_label(index: usize) -> String {
    format!("Item {}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::{LabelScope, row_label};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn name_columns_win() {
        let headers = strings(&["ID", "DISPLAY NAME", "SLUG"]);
        let row = strings(&["abc", "Billing API", "billing"]);
        assert_eq!(row_label(&headers, Some(&row), 0, LabelScope::Root), "Billing API");

        let headers = strings(&["ID", "OWNER NAME"]);
        let row = strings(&["abc", "ops"]);
        assert_eq!(row_label(&headers, Some(&row), 0, LabelScope::Root), "ops");
    }

    #[test]
    fn version_only_counts_for_children() {
        let headers = strings(&["STATUS", "VERSION"]);
        let row = strings(&["active", "3.4"]);
        assert_eq!(row_label(&headers, Some(&row), 0, LabelScope::Child), "3.4");
        assert_eq!(row_label(&headers, Some(&row), 0, LabelScope::Root), "active");
    }

    #[test]
    fn ids_are_abbreviated() {
        let headers = strings(&["ID", "PORT"]);
        let row = strings(&["94db15db-4d02-46c2-a007-765e7a1d64c7", "80"]);
        assert_eq!(row_label(&headers, Some(&row), 0, LabelScope::Root), "94db…");

        let row = strings(&["consumer-group-0001", "80"]);
        assert_eq!(
            row_label(&headers, Some(&row), 0, LabelScope::Root),
            "consumer-gr…"
        );
    }

    #[test]
    fn blank_rows_fall_back_to_position() {
        let headers = strings(&["A"]);
        let row = strings(&["  "]);
        assert_eq!(row_label(&headers, Some(&row), 4, LabelScope::Root), "Item 5");
        assert_eq!(row_label(&headers, None, 0, LabelScope::Child), "Item 1");
    }
}
