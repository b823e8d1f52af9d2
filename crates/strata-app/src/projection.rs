// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::format::{abbreviate_matrix_ids, normalize_header_key, tokenize_header};
use crate::node::{Node, NodeError, declared_fields, to_node};

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("nil data provided")]
    NilInput,
    #[error("unsupported kind {0}: only structs can be shown as rows")]
    UnsupportedKind(&'static str),
    #[error("capture data: {0}")]
    Capture(#[from] NodeError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn from_value<T: Serialize + ?Sized>(value: &T) -> Result<Self, ProjectionError> {
        Self::from_node(&to_node(value)?)
    }

    pub fn from_records<E>(records: &[E]) -> Result<Self, ProjectionError>
    where
        E: Serialize + DeserializeOwned,
    {
        project(&to_node(records)?, &declared_fields::<E>())
    }

    pub fn from_node(node: &Node) -> Result<Self, ProjectionError> {
        project(node, &[])
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn with_abbreviated_ids(&self) -> Self {
        Self {
            headers: self.headers.clone(),
            rows: abbreviate_matrix_ids(&self.headers, &self.rows),
        }
    }

    pub fn column(&self, header: &str) -> Option<usize> {
        let key = normalize_header_key(header);
        if key.is_empty() {
            return None;
        }
        self.headers
            .iter()
            .position(|candidate| normalize_header_key(candidate) == key)
    }

    pub fn value(&self, row: usize, header: &str) -> Option<&str> {
        let column = self.column(header)?;
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }
}

fn project(node: &Node, declared: &[&'static str]) -> Result<TableData, ProjectionError> {
    let records: Vec<&[(&'static str, Node)]> = match node {
        Node::Null => return Err(ProjectionError::NilInput),
        Node::Record { fields, .. } => vec![fields.as_slice()],
        Node::Seq(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                Node::Record { fields, .. } => Ok(fields.as_slice()),
                other => Err(ProjectionError::UnsupportedKind(other.kind())),
            })
            .collect::<Result<_, _>>()?,
        other => return Err(ProjectionError::UnsupportedKind(other.kind())),
    };

    let mut names: Vec<&'static str> = declared.to_vec();
    for fields in &records {
        for (name, _) in fields.iter() {
            if !names.contains(name) {
                names.push(*name);
            }
        }
    }

    let headers = names.iter().map(|name| tokenize_header(name)).collect();
    let rows = records
        .iter()
        .map(|fields| {
            names
                .iter()
                .map(|name| {
                    fields
                        .iter()
                        .find(|(field, _)| field == name)
                        .map(|(_, value)| value.cell_text())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Ok(TableData::new(headers, rows))
}
