// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use std::sync::Arc;

use crate::child::{ChildLoader, ChildView, LoadContext};
use crate::format::normalize_header_key;
use crate::node::{Node, ValueClass};
use crate::registry::Registry;

pub const CHILD_PLACEHOLDER: &str = "[...]";
pub const EXPANDABLE_PLACEHOLDER: &str = "[...]";
pub const STRUCT_PLACEHOLDER: &str = "{...}";
pub const NIL_PLACEHOLDER: &str = "[nil]";
pub const EMPTY_PLACEHOLDER: &str = "[]";

const INDENT_MARKER: &str = "...";

#[derive(Clone, Default)]
pub struct DetailItem {
    pub label: String,
    pub value: String,
    pub loader: Option<ChildLoader>,
}

impl fmt::Debug for DetailItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetailItem")
            .field("label", &self.label)
            .field("value", &self.value)
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

impl DetailItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            loader: None,
        }
    }

    pub fn is_expandable(&self) -> bool {
        self.loader.is_some()
    }
}

pub fn is_placeholder(value: &str) -> bool {
    matches!(
        value,
        CHILD_PLACEHOLDER | STRUCT_PLACEHOLDER | NIL_PLACEHOLDER | EMPTY_PLACEHOLDER
    )
}

/// Splits raw detail text into items. A top-level `label: value` line starts
/// an item; other top-level lines continue the previous value. An indented
/// line only marks an empty previous value with `...`.
pub fn parse_detail(content: &str) -> Vec<DetailItem> {
    let mut items: Vec<DetailItem> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let indented = line.starts_with([' ', '\t']);
        if !indented {
            if let Some((label, value)) = split_field(trimmed) {
                items.push(DetailItem::new(label, value));
                continue;
            }
        }

        let Some(prev) = items.last_mut() else {
            continue;
        };
        if indented {
            if prev.value.is_empty() {
                prev.value = INDENT_MARKER.to_owned();
            }
        } else if prev.value.is_empty() {
            prev.value = trimmed.to_owned();
        } else {
            prev.value.push('\n');
            prev.value.push_str(trimmed);
        }
    }

    items
}

fn split_field(line: &str) -> Option<(&str, &str)> {
    let index = line.find(':')?;
    let rest = &line[index + 1..];
    if rest.is_empty() || rest.starts_with(' ') {
        Some((line[..index].trim(), rest.trim()))
    } else {
        None
    }
}

pub fn render_detail_items(items: &[DetailItem]) -> String {
    let mut out = String::new();
    for item in items {
        let label = item.label.trim();
        if label.is_empty() {
            continue;
        }
        if item.value.trim().is_empty() {
            out.push_str(label);
            out.push_str(":\n");
            continue;
        }
        let lines: Vec<&str> = item.value.split('\n').collect();
        if let [line] = lines.as_slice() {
            out.push_str(&format!("{label}: {}\n", line.trim()));
            continue;
        }
        out.push_str(&format!("{label}:\n"));
        for line in lines {
            let line = line.trim_end();
            if !line.trim().is_empty() {
                out.push_str("  ");
                out.push_str(line);
            }
            out.push('\n');
        }
    }
    out.trim_end_matches('\n').to_owned()
}

pub fn enrich(
    mut items: Vec<DetailItem>,
    registry: &Registry,
    parent_type: &str,
    parent: Option<&Node>,
) -> Vec<DetailItem> {
    let mut registered = vec![false; items.len()];

    if !parent_type.trim().is_empty() {
        for (item, flag) in items.iter_mut().zip(registered.iter_mut()) {
            if let Some(loader) = registry.lookup(parent_type, &item.label) {
                item.value = CHILD_PLACEHOLDER.to_owned();
                item.loader = Some(loader);
                *flag = true;
            }
        }

        for field in registry.fields_for(parent_type) {
            let key = normalize_header_key(&field.label);
            if items
                .iter()
                .any(|item| normalize_header_key(&item.label) == key)
            {
                continue;
            }
            items.push(DetailItem {
                label: field.label,
                value: CHILD_PLACEHOLDER.to_owned(),
                loader: Some(field.loader),
            });
            registered.push(true);
        }
    }

    let Some(parent) = parent else {
        return items;
    };
    for (item, registered) in items.iter_mut().zip(registered) {
        if registered {
            continue;
        }
        if let Some(value) = parent.field(&item.label) {
            classify_item(item, value);
        }
    }
    items
}

fn classify_item(item: &mut DetailItem, value: &Node) {
    let label = item.label.clone();
    match value.classify() {
        ValueClass::Scalar => {}
        ValueClass::Nil => {
            item.value = NIL_PLACEHOLDER.to_owned();
        }
        ValueClass::EmptyCollection => {
            item.value = EMPTY_PLACEHOLDER.to_owned();
            item.loader = Some(collection_loader(label, value.clone()));
        }
        ValueClass::NonEmptyMap => {
            item.value = STRUCT_PLACEHOLDER.to_owned();
            item.loader = Some(collection_loader(label, value.clone()));
        }
        ValueClass::NonEmptySlice { .. } => {
            item.value = EXPANDABLE_PLACEHOLDER.to_owned();
            item.loader = Some(collection_loader(label, value.clone()));
        }
        ValueClass::NestedStruct => {
            item.value = STRUCT_PLACEHOLDER.to_owned();
            let captured = value.clone();
            item.loader = Some(Arc::new(move |_: &LoadContext, parent: Option<&Node>| {
                let fresh = parent
                    .and_then(|parent| parent.field(&label))
                    .filter(|node| node.is_record());
                ChildView::for_record(&label, fresh.unwrap_or(&captured))
            }));
        }
    }
}

fn collection_loader(label: String, value: Node) -> ChildLoader {
    Arc::new(move |_: &LoadContext, _: Option<&Node>| match &value {
        Node::Seq(items) => ChildView::for_seq(&label, items),
        other => Ok(ChildView::for_map(&label, other)),
    })
}

pub fn reorder(items: Vec<DetailItem>) -> Vec<DetailItem> {
    let mut ids = Vec::new();
    let mut names = Vec::new();
    let mut others = Vec::new();
    for item in items {
        match normalize_header_key(&item.label).as_str() {
            "id" => ids.push(item),
            "name" => names.push(item),
            _ => others.push(item),
        }
    }
    others.sort_by(|a, b| {
        normalize_header_key(&a.label)
            .cmp(&normalize_header_key(&b.label))
            .then_with(|| a.label.cmp(&b.label))
    });
    ids.extend(names);
    ids.extend(others);
    ids
}

pub fn build_detail_items(
    raw: &str,
    registry: &Registry,
    parent_type: &str,
    parent: Option<&Node>,
) -> Vec<DetailItem> {
    reorder(enrich(parse_detail(raw), registry, parent_type, parent))
}

pub fn filter_preview(items: Vec<DetailItem>) -> Vec<DetailItem> {
    items
        .into_iter()
        .filter(|item| {
            !item.label.trim().is_empty()
                && item.loader.is_none()
                && !is_placeholder(item.value.trim())
        })
        .collect()
}

pub fn sanitize_preview(
    raw: &str,
    registry: &Registry,
    parent_type: &str,
    parent: Option<&Node>,
) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let items = parse_detail(raw);
    if items.is_empty() {
        return raw.to_owned();
    }
    let filtered = filter_preview(enrich(items, registry, parent_type, parent));
    if filtered.is_empty() {
        return raw.to_owned();
    }
    render_detail_items(&filtered)
}
