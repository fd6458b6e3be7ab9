//! Per-document metadata records: `namespace → field → value`

use crate::registry::FieldPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The fields of one namespace.
pub type Namespace = serde_json::Map<String, Value>;

/// A nested metadata record, as produced by extraction or a source connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Namespace>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a JSON object of objects.
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(ns, fields)| (ns.clone(), Value::Object(fields.clone())))
                .collect(),
        )
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        self.0.get(&path.namespace)?.get(&path.field)
    }

    /// A present, non-null value.
    pub fn get_present(&self, path: &FieldPath) -> Option<&Value> {
        self.get(path).filter(|v| !v.is_null())
    }

    pub fn insert(&mut self, path: &FieldPath, value: Value) -> Option<Value> {
        self.0
            .entry(path.namespace.clone())
            .or_default()
            .insert(path.field.clone(), value)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, namespace: &str, field: &str, value: impl Into<Value>) -> Self {
        self.insert(&FieldPath::new(namespace, field), value.into());
        self
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.0.get(name)
    }

    /// Every `(path, value)` pair, in namespace then field order.
    pub fn entries(&self) -> impl Iterator<Item = (FieldPath, &Value)> {
        self.0.iter().flat_map(|(ns, fields)| {
            fields
                .iter()
                .map(move |(field, value)| (FieldPath::new(ns, field), value))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|fields| fields.is_empty())
    }
}
