// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use anyhow::{Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::format::{normalize_header_key, title_from_label};
use crate::node::{Node, to_node};
use crate::projection::TableData;

pub const NO_DATA: &str = "(no data)";

pub type DetailRenderer = Arc<dyn Fn(usize) -> String + Send + Sync>;
pub type DetailContext = Arc<dyn Fn(usize) -> Option<Node> + Send + Sync>;
pub type RowLoader = Arc<dyn Fn(&LoadContext, usize) -> Result<ChildView> + Send + Sync>;
pub type ChildLoader = Arc<dyn Fn(&LoadContext, Option<&Node>) -> Result<ChildView> + Send + Sync>;

/// Capabilities handed to loaders. The session never looks inside; loaders
/// downcast to whatever client type their collaborator registered.
#[derive(Clone, Default)]
pub struct LoadContext {
    capabilities: Option<Arc<dyn Any + Send + Sync>>,
}

impl LoadContext {
    pub fn new(capabilities: Option<Arc<dyn Any + Send + Sync>>) -> Self {
        Self { capabilities }
    }

    pub fn capability<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.capabilities.as_deref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadContext")
            .field("capabilities", &self.capabilities.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildViewMode {
    #[default]
    Collection,
    Detail,
}

#[derive(Clone, Default)]
pub struct ChildView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub detail_renderer: Option<DetailRenderer>,
    pub detail_context: Option<DetailContext>,
    pub title: String,
    pub parent_type: String,
    pub mode: ChildViewMode,
}

impl fmt::Debug for ChildView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildView")
            .field("headers", &self.headers)
            .field("rows", &self.rows.len())
            .field("detail_renderer", &self.detail_renderer.is_some())
            .field("detail_context", &self.detail_context.is_some())
            .field("title", &self.title)
            .field("parent_type", &self.parent_type)
            .field("mode", &self.mode)
            .finish()
    }
}

impl ChildView {
    pub fn collection(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        detail_renderer: Option<DetailRenderer>,
        title: impl Into<String>,
    ) -> Self {
        let table = TableData::new(headers, rows);
        Self {
            headers: table.headers,
            rows: table.rows,
            detail_renderer,
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn from_records<T>(
        title: impl Into<String>,
        parent_type: impl Into<String>,
        records: &[T],
    ) -> Result<Self>
    where
        T: Serialize + DeserializeOwned,
    {
        let table = TableData::from_records(records)?;
        let nodes = records.iter().map(to_node).collect::<Result<Vec<_>, _>>()?;
        let (detail_renderer, detail_context) = if nodes.is_empty() {
            (None, None)
        } else {
            let nodes = Arc::new(nodes);
            let source = Arc::clone(&nodes);
            let renderer: DetailRenderer = Arc::new(move |index: usize| {
                source.get(index).map(Node::record_detail).unwrap_or_default()
            });
            let context: DetailContext = Arc::new(move |index: usize| nodes.get(index).cloned());
            (Some(renderer), Some(context))
        };

        Ok(Self {
            headers: table.headers,
            rows: table.rows,
            detail_renderer,
            detail_context,
            title: title.into(),
            parent_type: parent_type.into(),
            mode: ChildViewMode::Collection,
        })
    }

    pub fn with_parent_type(mut self, parent_type: impl Into<String>) -> Self {
        self.parent_type = parent_type.into();
        self
    }

    pub fn with_detail_context(mut self, context: DetailContext) -> Self {
        self.detail_context = Some(context);
        self
    }

    pub fn table(&self) -> TableData {
        TableData::new(self.headers.clone(), self.rows.clone())
    }

    pub fn render_detail(&self, index: usize) -> Option<String> {
        self.detail_renderer.as_ref().map(|render| render(index))
    }

    pub fn context(&self, index: usize) -> Option<Node> {
        self.detail_context.as_ref().and_then(|context| context(index))
    }

    pub fn for_map(label: &str, map: &Node) -> Self {
        let mut entries = match map {
            Node::Map(entries) => entries.clone(),
            _ => Vec::new(),
        };
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let lines: Vec<String> = entries
            .iter()
            .map(|(key, value)| {
                let text = value.inline_text();
                let text = if text.is_empty() { "(empty)".to_owned() } else { text };
                format!("{key}: {text}")
            })
            .collect();
        let rendered = if lines.is_empty() {
            NO_DATA.to_owned()
        } else {
            lines.join("\n")
        };
        let context = map.clone();

        Self {
            detail_renderer: Some(Arc::new(move |_: usize| rendered.clone())),
            detail_context: Some(Arc::new(move |_: usize| Some(context.clone()))),
            title: title_from_label(label),
            parent_type: normalize_header_key(label),
            mode: ChildViewMode::Detail,
            ..Self::default()
        }
    }

    pub fn for_seq(label: &str, items: &[Node]) -> Result<Self> {
        let title = title_from_label(label);
        let parent_type = normalize_header_key(label);

        if items.is_empty() {
            return Ok(Self {
                headers: vec!["VALUE".to_owned()],
                detail_renderer: Some(Arc::new(|_: usize| NO_DATA.to_owned())),
                title,
                parent_type,
                ..Self::default()
            });
        }

        let records = items.iter().any(Node::is_record);
        let items: Arc<Vec<Node>> = Arc::new(if records {
            items.iter().filter(|item| !item.is_null()).cloned().collect()
        } else {
            items.to_vec()
        });

        let (table, renderer): (TableData, DetailRenderer) = if records {
            let table = TableData::from_node(&Node::Seq(items.as_ref().clone()))?;
            let source = Arc::clone(&items);
            let renderer: DetailRenderer = Arc::new(move |index: usize| {
                source.get(index).map(Node::record_detail).unwrap_or_default()
            });
            (table, renderer)
        } else {
            let rows = items
                .iter()
                .enumerate()
                .map(|(index, item)| vec![(index + 1).to_string(), item.summary()])
                .collect();
            let table = TableData::new(vec!["#".to_owned(), "VALUE".to_owned()], rows);
            let source = Arc::clone(&items);
            let renderer: DetailRenderer = Arc::new(move |index: usize| {
                source
                    .get(index)
                    .map(|item| format!("value: {}", item.detail_text()))
                    .unwrap_or_default()
            });
            (table, renderer)
        };

        let source = Arc::clone(&items);
        Ok(Self {
            headers: table.headers,
            rows: table.rows,
            detail_renderer: Some(renderer),
            detail_context: Some(Arc::new(move |index: usize| source.get(index).cloned())),
            title,
            parent_type,
            mode: ChildViewMode::Collection,
        })
    }

    pub fn for_record(label: &str, record: &Node) -> Result<Self> {
        if !record.is_record() {
            bail!(
                "expected a struct value for {label}, found {}",
                record.kind()
            );
        }
        let rendered = record.record_detail();
        let rendered = if rendered.trim().is_empty() {
            NO_DATA.to_owned()
        } else {
            rendered
        };
        let context = record.clone();

        Ok(Self {
            detail_renderer: Some(Arc::new(move |_: usize| rendered.clone())),
            detail_context: Some(Arc::new(move |_: usize| Some(context.clone()))),
            title: title_from_label(label),
            parent_type: normalize_header_key(label),
            mode: ChildViewMode::Detail,
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ChildView, ChildViewMode, LoadContext, NO_DATA};
    use crate::node::{Node, to_node};

    #[test]
    fn map_view_sorts_entries() -> anyhow::Result<()> {
        let node = to_node(&json!({"zone": "b", "env": "prod"}))?;
        let view = ChildView::for_map("labels", &node);
        assert_eq!(view.mode, ChildViewMode::Detail);
        assert_eq!(view.title, "Labels");
        assert_eq!(view.render_detail(0).as_deref(), Some("env: prod\nzone: b"));
        assert_eq!(view.context(0), Some(node));
        Ok(())
    }

    #[test]
    fn scalar_seq_lists_index_and_value() -> anyhow::Result<()> {
        let node = to_node(&json!(["a", "b"]))?;
        let Node::Seq(items) = node else {
            panic!("expected sequence");
        };
        let view = ChildView::for_seq("tags", &items)?;
        assert_eq!(view.headers, vec!["#", "VALUE"]);
        assert_eq!(view.rows, vec![vec!["1", "a"], vec!["2", "b"]]);
        assert_eq!(view.render_detail(1).as_deref(), Some("value: b"));
        Ok(())
    }

    #[test]
    fn empty_seq_has_no_rows() -> anyhow::Result<()> {
        let view = ChildView::for_seq("routes", &[])?;
        assert_eq!(view.headers, vec!["VALUE"]);
        assert!(view.rows.is_empty());
        assert_eq!(view.render_detail(0).as_deref(), Some(NO_DATA));
        Ok(())
    }

    #[test]
    fn record_view_requires_struct() {
        assert!(ChildView::for_record("upstream", &Node::Text("x".to_owned())).is_err());
    }

    #[test]
    fn collection_pads_rows() {
        let view = ChildView::collection(
            vec!["A".to_owned(), "B".to_owned()],
            vec![vec!["1".to_owned()]],
            None,
            "Things",
        );
        assert_eq!(view.rows, vec![vec!["1", ""]]);
        assert_eq!(view.mode, ChildViewMode::Collection);
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Route {
        name: String,
        paths: Vec<String>,
    }

    #[test]
    fn typed_records_keep_headers_when_empty() -> anyhow::Result<()> {
        let view = ChildView::from_records::<Route>("Routes", "route", &[])?;
        assert_eq!(view.headers, vec!["NAME", "PATHS"]);
        assert!(view.rows.is_empty());
        assert!(view.detail_renderer.is_none());

        let routes = vec![Route {
            name: "api".to_owned(),
            paths: vec!["/v1".to_owned()],
        }];
        let view = ChildView::from_records("Routes", "route", &routes)?;
        assert_eq!(view.rows, vec![vec!["api", "[/v1]"]]);
        assert_eq!(
            view.render_detail(0).as_deref(),
            Some("name: api\npaths: [/v1]")
        );
        assert!(view.context(0).is_some_and(|node| node.is_record()));
        Ok(())
    }

    #[test]
    fn capabilities_downcast() {
        let context = LoadContext::new(Some(std::sync::Arc::new(42_u32)));
        assert_eq!(context.capability::<u32>(), Some(&42));
        assert_eq!(context.capability::<String>(), None);
        assert_eq!(LoadContext::default().capability::<u32>(), None);
    }
}
