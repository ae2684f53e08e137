//! In-memory object graph
//!
//! Objects live in an arena and refer to each other through [`ObjectId`]
//! handles. A handle is the object's identity: sharing a sub-object means
//! storing its handle twice, and a cycle is a container that (directly or
//! not) stores its own handle.
//!
//! ```text
//! let mut graph = ObjectGraph::new();
//! let list = graph.list("list", vec![]);
//! graph.push_element(list, list)?;   // the list now contains itself
//! ```

use crate::error::TransformError;
use crate::types::TypeName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Handle of an object inside an [`ObjectGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn new(index: usize) -> Self {
        ObjectId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Ordered collection
    List(Vec<ObjectId>),
    /// Unordered collection; insertion order is its natural order
    Set(Vec<ObjectId>),
    /// Key/value entries in insertion order
    Map(Vec<(ObjectId, ObjectId)>),
    /// Named fields in insertion order
    Record(Vec<(String, ObjectId)>),
}

impl Value {
    /// String form of a scalar value, `None` for composites
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Text(text) => Some(text.clone()),
            Value::Integer(value) => Some(value.to_string()),
            Value::Float(value) => Some(value.to_string()),
            Value::Boolean(value) => Some(value.to_string()),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Text(_) | Value::Integer(_) | Value::Float(_) | Value::Boolean(_)
        )
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Value::List(_) | Value::Set(_))
    }
}

/// An object: its runtime type and its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    #[serde(rename = "type")]
    pub type_name: TypeName,
    pub value: Value,
}

/// Arena of objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectGraph {
    objects: Vec<Object>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return its handle
    pub fn insert(&mut self, type_name: impl Into<TypeName>, value: Value) -> ObjectId {
        self.objects.push(Object {
            type_name: type_name.into(),
            value,
        });
        ObjectId(self.objects.len() - 1)
    }

    /// Add a `string` object
    pub fn text(&mut self, text: impl Into<String>) -> ObjectId {
        self.insert(TypeName::STRING, Value::Text(text.into()))
    }

    /// Add a list object holding the given elements
    pub fn list(&mut self, type_name: impl Into<TypeName>, elements: Vec<ObjectId>) -> ObjectId {
        self.insert(type_name, Value::List(elements))
    }

    /// Add a map object holding the given entries
    pub fn map(
        &mut self,
        type_name: impl Into<TypeName>,
        entries: Vec<(ObjectId, ObjectId)>,
    ) -> ObjectId {
        self.insert(type_name, Value::Map(entries))
    }

    /// Add a record object holding the given fields
    pub fn record(
        &mut self,
        type_name: impl Into<TypeName>,
        fields: Vec<(String, ObjectId)>,
    ) -> ObjectId {
        self.insert(type_name, Value::Record(fields))
    }

    pub fn get(&self, id: ObjectId) -> Result<&Object, TransformError> {
        self.objects
            .get(id.0)
            .ok_or_else(|| TransformError::Malformed(format!("object {} is not in the graph", id)))
    }

    fn get_mut(&mut self, id: ObjectId) -> Result<&mut Object, TransformError> {
        self.objects
            .get_mut(id.0)
            .ok_or_else(|| TransformError::Malformed(format!("object {} is not in the graph", id)))
    }

    /// Append an element to a list or set
    pub fn push_element(
        &mut self,
        container: ObjectId,
        element: ObjectId,
    ) -> Result<(), TransformError> {
        match &mut self.get_mut(container)?.value {
            Value::List(elements) | Value::Set(elements) => {
                elements.push(element);
                Ok(())
            }
            _ => Err(TransformError::Malformed(format!(
                "object {} is not a collection",
                container
            ))),
        }
    }

    /// Append an entry to a map
    pub fn insert_entry(
        &mut self,
        map: ObjectId,
        key: ObjectId,
        value: ObjectId,
    ) -> Result<(), TransformError> {
        match &mut self.get_mut(map)?.value {
            Value::Map(entries) => {
                entries.push((key, value));
                Ok(())
            }
            _ => Err(TransformError::Malformed(format!("object {} is not a map", map))),
        }
    }

    /// Set a field of a record, replacing an existing field of the same name
    pub fn set_field(
        &mut self,
        record: ObjectId,
        name: impl Into<String>,
        value: ObjectId,
    ) -> Result<(), TransformError> {
        let name = name.into();
        match &mut self.get_mut(record)?.value {
            Value::Record(fields) => {
                match fields.iter().position(|(existing, _)| *existing == name) {
                    Some(index) => fields[index].1 = value,
                    None => fields.push((name, value)),
                }
                Ok(())
            }
            _ => Err(TransformError::Malformed(format!(
                "object {} is not a record",
                record
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Check that every handle stored in a container points into the graph
    pub fn validate(&self) -> Result<(), TransformError> {
        for (index, object) in self.objects.iter().enumerate() {
            let handles: Vec<ObjectId> = match &object.value {
                Value::List(elements) | Value::Set(elements) => elements.clone(),
                Value::Map(entries) => entries.iter().flat_map(|(k, v)| [*k, *v]).collect(),
                Value::Record(fields) => fields.iter().map(|(_, v)| *v).collect(),
                _ => continue,
            };
            if let Some(dangling) = handles.iter().find(|h| h.0 >= self.objects.len()) {
                return Err(TransformError::Malformed(format!(
                    "object #{} refers to missing object {}",
                    index, dangling
                )));
            }
        }
        Ok(())
    }
}

/// An object of a shared graph, as seen by object rules
#[derive(Debug, Clone)]
pub struct GraphObject {
    graph: Arc<ObjectGraph>,
    id: ObjectId,
}

impl GraphObject {
    pub fn new(graph: Arc<ObjectGraph>, id: ObjectId) -> Self {
        Self { graph, id }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn graph(&self) -> &Arc<ObjectGraph> {
        &self.graph
    }

    pub fn object(&self) -> Result<&Object, TransformError> {
        self.graph.get(self.id)
    }

    /// Another object of the same graph
    pub fn sibling(&self, id: ObjectId) -> GraphObject {
        GraphObject {
            graph: Arc::clone(&self.graph),
            id,
        }
    }
}
