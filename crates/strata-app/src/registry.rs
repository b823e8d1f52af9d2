// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::child::{ChildLoader, ChildView, LoadContext};
use crate::format::normalize_header_key;
use crate::node::Node;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FieldKey {
    parent_type: String,
    field: String,
}

impl FieldKey {
    fn new(parent_type: &str, field: &str) -> Self {
        Self {
            parent_type: parent_type.trim().to_lowercase(),
            field: normalize_header_key(field),
        }
    }
}

#[derive(Clone)]
pub struct RegisteredField {
    pub label: String,
    pub loader: ChildLoader,
}

impl fmt::Debug for RegisteredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredField")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<FieldKey, RegisteredField>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last registration for a key wins.
    pub fn register<F>(&mut self, parent_type: &str, field_label: &str, loader: F)
    where
        F: Fn(&LoadContext, Option<&Node>) -> Result<ChildView> + Send + Sync + 'static,
    {
        self.register_loader(parent_type, field_label, Arc::new(loader));
    }

    pub fn register_loader(&mut self, parent_type: &str, field_label: &str, loader: ChildLoader) {
        self.entries.insert(
            FieldKey::new(parent_type, field_label),
            RegisteredField {
                label: field_label.trim().to_owned(),
                loader,
            },
        );
    }

    pub fn lookup(&self, parent_type: &str, field_label: &str) -> Option<ChildLoader> {
        self.entries
            .get(&FieldKey::new(parent_type, field_label))
            .map(|entry| Arc::clone(&entry.loader))
    }

    pub fn fields_for(&self, parent_type: &str) -> Vec<RegisteredField> {
        let parent_type = parent_type.trim().to_lowercase();
        if parent_type.is_empty() {
            return Vec::new();
        }
        let mut fields: Vec<RegisteredField> = self
            .entries
            .iter()
            .filter(|(key, _)| key.parent_type == parent_type)
            .map(|(_, entry)| entry.clone())
            .collect();
        fields.sort_by(|a, b| a.label.cmp(&b.label));
        fields
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
