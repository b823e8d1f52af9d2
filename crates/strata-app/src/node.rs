// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt::{self, Display};
use std::time::Duration;

use serde::de::{self, DeserializeOwned, Visitor};
use serde::ser::{self, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;
use time::format_description::well_known::Rfc3339;

use crate::format::{abbreviate_value, compact_key, normalize_header_key, tokenize_header};

const SUMMARY_LIMIT: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Seq(Vec<Node>),
    Map(Vec<(String, Node)>),
    Record {
        name: &'static str,
        fields: Vec<(&'static str, Node)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    Nil,
    EmptyCollection,
    NonEmptyMap,
    NonEmptySlice { records: bool },
    NestedStruct,
    Scalar,
}

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("{0}")]
    Custom(String),
    #[error("map key must be a scalar value")]
    KeyNotScalar,
    #[error("map value serialized before its key")]
    MissingKey,
    #[error("field listing finished")]
    FieldsListed,
}

impl ser::Error for NodeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

impl de::Error for NodeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

pub fn to_node<T: Serialize + ?Sized>(value: &T) -> Result<Node, NodeError> {
    value.serialize(NodeSerializer)
}

/// Declared field names of a struct type, in declaration order. Types that
/// do not deserialize as a struct report no fields.
pub fn declared_fields<T: DeserializeOwned>() -> Vec<&'static str> {
    let mut fields = None;
    let _ = T::deserialize(FieldLister {
        fields: &mut fields,
    });
    fields.map(<[&str]>::to_vec).unwrap_or_default()
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "map",
            Self::Record { .. } => "struct",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    pub fn field(&self, label: &str) -> Option<&Node> {
        let target = normalize_header_key(label);
        match self {
            Self::Record { fields, .. } => {
                let target_compact = target.replace(' ', "");
                fields.iter().find_map(|(name, value)| {
                    let key = normalize_header_key(&tokenize_header(name));
                    (key == target || compact_key(&key) == target_compact).then_some(value)
                })
            }
            Self::Map(entries) => entries
                .iter()
                .find_map(|(key, value)| (normalize_header_key(key) == target).then_some(value)),
            _ => None,
        }
    }

    pub fn classify(&self) -> ValueClass {
        match self {
            Self::Null => ValueClass::Nil,
            Self::Map(entries) if entries.is_empty() => ValueClass::EmptyCollection,
            Self::Map(_) => ValueClass::NonEmptyMap,
            Self::Seq(items) if items.is_empty() => ValueClass::EmptyCollection,
            Self::Seq(items) => ValueClass::NonEmptySlice {
                records: items.iter().any(Node::is_record),
            },
            Self::Record { .. } => ValueClass::NestedStruct,
            _ => ValueClass::Scalar,
        }
    }

    pub fn cell_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Int(value) => value.to_string(),
            Self::UInt(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.clone(),
            Self::Seq(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(Node::cell_text)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Map(entries) => braced(entries.iter().map(|(key, value)| (key.as_str(), value))),
            Self::Record { fields, .. } => braced(fields.iter().map(|(key, value)| (*key, value))),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Null => "nil".to_owned(),
            _ => abbreviate_value(&self.cell_text(), SUMMARY_LIMIT),
        }
    }

    pub fn detail_text(&self) -> String {
        match self {
            Self::Null => "nil".to_owned(),
            Self::Seq(items) if items.is_empty() => "[]".to_owned(),
            Self::Seq(items) => items
                .iter()
                .map(|item| format!("- {}", item.cell_text()))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Map(entries) if entries.is_empty() => "{}".to_owned(),
            Self::Map(entries) => {
                let mut sorted: Vec<_> = entries.iter().collect();
                sorted.sort_by(|a, b| a.0.cmp(&b.0));
                sorted
                    .into_iter()
                    .map(|(key, value)| format!("{key}: {}", value.cell_text()))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Self::Record { .. } => self.record_detail(),
            _ => self.cell_text(),
        }
    }

    pub fn inline_text(&self) -> String {
        match self {
            Self::Null => "nil".to_owned(),
            other => other.cell_text(),
        }
    }

    /// Field-by-field `snake_label: value` lines for a struct record. Every
    /// field stays on one line so nested map entries never read as fields.
    pub fn record_detail(&self) -> String {
        let Self::Record { fields, .. } = self else {
            return String::new();
        };
        fields
            .iter()
            .map(|(name, value)| {
                let label = tokenize_header(name).replace(' ', "_").to_lowercase();
                format!("{label}: {}", value.inline_text())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cell_text())
    }
}

fn braced<'a>(entries: impl Iterator<Item = (&'a str, &'a Node)>) -> String {
    let body = entries
        .map(|(key, value)| format!("{key}: {}", value.cell_text()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{body}}}")
}

pub struct NodeSerializer;

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = NodeError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = RecordBuilder;
    type SerializeStructVariant = RecordBuilder;

    fn serialize_bool(self, v: bool) -> Result<Node, NodeError> {
        Ok(Node::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Node, NodeError> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<Node, NodeError> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<Node, NodeError> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<Node, NodeError> {
        Ok(Node::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Node, NodeError> {
        Ok(i64::try_from(v).map_or_else(|_| Node::Text(v.to_string()), Node::Int))
    }

    fn serialize_u8(self, v: u8) -> Result<Node, NodeError> {
        Ok(Node::UInt(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Node, NodeError> {
        Ok(Node::UInt(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Node, NodeError> {
        Ok(Node::UInt(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Node, NodeError> {
        Ok(Node::UInt(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Node, NodeError> {
        Ok(u64::try_from(v).map_or_else(|_| Node::Text(v.to_string()), Node::UInt))
    }

    fn serialize_f32(self, v: f32) -> Result<Node, NodeError> {
        Ok(Node::Float(v.into()))
    }

    fn serialize_f64(self, v: f64) -> Result<Node, NodeError> {
        Ok(Node::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Node, NodeError> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Node, NodeError> {
        Ok(Node::Text(timestamp_text(v).unwrap_or_else(|| v.to_owned())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node, NodeError> {
        Ok(Node::Text(String::from_utf8_lossy(v).into_owned()))
    }

    fn serialize_none(self) -> Result<Node, NodeError> {
        Ok(Node::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Node, NodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node, NodeError> {
        Ok(Node::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node, NodeError> {
        Ok(Node::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Node, NodeError> {
        Ok(Node::Text(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Node, NodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node, NodeError> {
        Ok(Node::Map(vec![(variant.to_owned(), to_node(value)?)]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, NodeError> {
        Ok(SeqBuilder::new(None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, NodeError> {
        Ok(SeqBuilder::new(None, len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, NodeError> {
        Ok(SeqBuilder::new(None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, NodeError> {
        Ok(SeqBuilder::new(Some(variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, NodeError> {
        Ok(MapBuilder {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<RecordBuilder, NodeError> {
        Ok(RecordBuilder {
            name,
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<RecordBuilder, NodeError> {
        Ok(RecordBuilder {
            name: variant,
            fields: Vec::with_capacity(len),
        })
    }
}

pub struct SeqBuilder {
    variant: Option<&'static str>,
    items: Vec<Node>,
}

impl SeqBuilder {
    fn new(variant: Option<&'static str>, capacity: usize) -> Self {
        Self {
            variant,
            items: Vec::with_capacity(capacity),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NodeError> {
        self.items.push(to_node(value)?);
        Ok(())
    }

    fn finish(self) -> Node {
        match self.variant {
            Some(variant) => Node::Map(vec![(variant.to_owned(), Node::Seq(self.items))]),
            None => Node::Seq(self.items),
        }
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NodeError> {
        self.push(value)
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NodeError> {
        self.push(value)
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NodeError> {
        self.push(value)
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NodeError> {
        self.push(value)
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(self.finish())
    }
}

pub struct MapBuilder {
    entries: Vec<(String, Node)>,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), NodeError> {
        let key = match to_node(key)? {
            Node::Text(text) => text,
            node @ (Node::Bool(_) | Node::Int(_) | Node::UInt(_) | Node::Float(_)) => {
                node.cell_text()
            }
            _ => return Err(NodeError::KeyNotScalar),
        };
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NodeError> {
        let key = self.pending_key.take().ok_or(NodeError::MissingKey)?;
        self.entries.push((key, to_node(value)?));
        Ok(())
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(Node::Map(self.entries))
    }
}

pub struct RecordBuilder {
    name: &'static str,
    fields: Vec<(&'static str, Node)>,
}

impl RecordBuilder {
    fn unsigned(&self, field: &str) -> Option<u64> {
        self.fields.iter().find_map(|(name, value)| match value {
            Node::UInt(number) if *name == field => Some(*number),
            _ => None,
        })
    }

    fn finish(self) -> Node {
        let secs_nanos =
            |secs: &str, nanos: &str| Some((self.unsigned(secs)?, self.unsigned(nanos)?));
        let text = match self.name {
            "SystemTime" => secs_nanos("secs_since_epoch", "nanos_since_epoch")
                .and_then(|(secs, nanos)| format_system_time(secs, nanos)),
            "Duration" => secs_nanos("secs", "nanos").and_then(|(secs, nanos)| {
                let nanos = u32::try_from(nanos).ok()?;
                Some(format!("{:?}", Duration::new(secs, nanos)))
            }),
            _ => None,
        };
        match text {
            Some(text) => Node::Text(text),
            None => Node::Record {
                name: self.name,
                fields: self.fields,
            },
        }
    }
}

fn format_system_time(secs: u64, nanos: u64) -> Option<String> {
    let stamp = i128::from(secs) * 1_000_000_000 + i128::from(nanos);
    OffsetDateTime::from_unix_timestamp_nanos(stamp)
        .ok()?
        .format(&Rfc3339)
        .ok()
}

/// `time` writes offset date-times as `1970-01-01 00:00:00.0 +00:00:00`;
/// those cells read as RFC 3339 like every other timestamp.
fn timestamp_text(text: &str) -> Option<String> {
    if text.len() < 25 || text.as_bytes().get(10) != Some(&b' ') {
        return None;
    }
    let layout = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] \
         [offset_hour sign:mandatory]:[offset_minute]:[offset_second]"
    );
    OffsetDateTime::parse(text, layout).ok()?.format(&Rfc3339).ok()
}

impl ser::SerializeStruct for RecordBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), NodeError> {
        self.fields.push((key, to_node(value)?));
        Ok(())
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for RecordBuilder {
    type Ok = Node;
    type Error = NodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), NodeError> {
        self.fields.push((key, to_node(value)?));
        Ok(())
    }

    fn end(self) -> Result<Node, NodeError> {
        Ok(self.finish())
    }
}

/// Deserializer that records the field list a struct asks for and then
/// bails out. Nothing is ever deserialized.
struct FieldLister<'a> {
    fields: &'a mut Option<&'static [&'static str]>,
}

impl<'de> de::Deserializer<'de> for FieldLister<'_> {
    type Error = NodeError;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, NodeError> {
        Err(NodeError::FieldsListed)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, NodeError> {
        *self.fields = Some(fields);
        Err(NodeError::FieldsListed)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::{Duration, UNIX_EPOCH};

    use serde::{Deserialize, Serialize};

    use super::{Node, ValueClass, declared_fields, to_node};

    #[derive(Serialize, Deserialize)]
    struct Service {
        id: String,
        display_name: String,
        port: u16,
        tags: Vec<String>,
        labels: BTreeMap<String, String>,
        upstream: Option<Upstream>,
    }

    #[derive(Serialize, Deserialize)]
    struct Upstream {
        host: String,
    }

    fn service() -> Service {
        Service {
            id: "svc-1".to_owned(),
            display_name: "billing".to_owned(),
            port: 8080,
            tags: vec!["a".to_owned(), "b".to_owned()],
            labels: BTreeMap::from([("env".to_owned(), "prod".to_owned())]),
            upstream: None,
        }
    }

    #[test]
    fn records_keep_field_order() -> anyhow::Result<()> {
        let node = to_node(&service())?;
        let Node::Record { name, fields } = &node else {
            panic!("expected record, got {node:?}");
        };
        assert_eq!(*name, "Service");
        let names: Vec<_> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["id", "display_name", "port", "tags", "labels", "upstream"]
        );
        Ok(())
    }

    #[test]
    fn field_lookup_matches_labels() -> anyhow::Result<()> {
        let node = to_node(&service())?;
        assert_eq!(
            node.field("Display Name"),
            Some(&Node::Text("billing".to_owned()))
        );
        assert_eq!(
            node.field("displayName"),
            Some(&Node::Text("billing".to_owned()))
        );
        assert_eq!(node.field("PORT"), Some(&Node::UInt(8080)));
        assert_eq!(node.field("missing"), None);
        Ok(())
    }

    #[test]
    fn classification() -> anyhow::Result<()> {
        let node = to_node(&service())?;
        let class = |label: &str| node.field(label).map(Node::classify);
        assert_eq!(class("tags"), Some(ValueClass::NonEmptySlice { records: false }));
        assert_eq!(class("labels"), Some(ValueClass::NonEmptyMap));
        assert_eq!(class("upstream"), Some(ValueClass::Nil));
        assert_eq!(class("port"), Some(ValueClass::Scalar));
        assert_eq!(
            to_node(&Vec::<Upstream>::new())?.classify(),
            ValueClass::EmptyCollection
        );
        assert_eq!(
            to_node(&Upstream {
                host: "a".to_owned()
            })?
            .classify(),
            ValueClass::NestedStruct
        );
        Ok(())
    }

    #[test]
    fn std_time_values_become_text() -> anyhow::Result<()> {
        let stamp = UNIX_EPOCH + Duration::from_secs(86_400);
        assert_eq!(
            to_node(&stamp)?,
            Node::Text("1970-01-02T00:00:00Z".to_owned())
        );
        assert_eq!(
            to_node(&Duration::from_millis(1500))?,
            Node::Text("1.5s".to_owned())
        );
        Ok(())
    }

    #[derive(Serialize)]
    struct Cluster {
        name: String,
        created_at: time::OffsetDateTime,
        window_start: time::Date,
    }

    #[test]
    fn time_crate_values_stay_scalar() -> anyhow::Result<()> {
        let node = to_node(&Cluster {
            name: "edge".to_owned(),
            created_at: time::OffsetDateTime::UNIX_EPOCH,
            window_start: time::macros::date!(2025 - 01 - 01),
        })?;
        assert_eq!(
            node.field("Created At").map(Node::classify),
            Some(ValueClass::Scalar)
        );
        assert_eq!(
            node.field("Created At").map(Node::cell_text).as_deref(),
            Some("1970-01-01T00:00:00Z")
        );
        assert_eq!(
            node.field("Window Start"),
            Some(&Node::Text("2025-01-01".to_owned()))
        );
        assert_eq!(
            to_node("1970-01-01 00:00:00.0 nonsense")?,
            Node::Text("1970-01-01 00:00:00.0 nonsense".to_owned())
        );
        Ok(())
    }

    #[test]
    fn declared_fields_without_instances() {
        assert_eq!(declared_fields::<Upstream>(), vec!["host"]);
        assert!(declared_fields::<String>().is_empty());
    }

    #[test]
    fn detail_text_forms() -> anyhow::Result<()> {
        let node = to_node(&service())?;
        assert_eq!(
            node.field("tags").map(Node::detail_text),
            Some("- a\n- b".to_owned())
        );
        assert_eq!(
            node.field("labels").map(Node::detail_text),
            Some("env: prod".to_owned())
        );
        assert_eq!(Node::Null.detail_text(), "nil");
        assert_eq!(Node::Null.cell_text(), "");
        Ok(())
    }
}
