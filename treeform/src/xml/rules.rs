//! Object to XML rules
//!
//! Every rule follows the same protocol: a subject already visited under its
//! declared type short-circuits to its existing ID without recursing, which
//! is what keeps shared and cyclic graphs finite. Otherwise the declared
//! structure is resolved first, so a configuration error surfaces before an
//! ID is allocated or a node is emitted.

use super::{
    attach, open_object, visited, CollectionHandler, MapHandler, ObjectParams, XmlEngine,
};
use crate::cache::Id;
use crate::document::Element;
use crate::error::TransformError;
use crate::graph::{GraphObject, Value};
use crate::prerequisites::{PrerequisiteKey, ELEMENT_TYPE, KEY_TYPE, TYPE_REGISTRY, VALUE_TYPE};
use crate::rule::Rule;
use crate::types::{TypeName, TypeRegistry};

/// Scalars: text, integers, floats, booleans
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveRule;

impl Rule<GraphObject, Id> for PrimitiveRule {
    fn name(&self) -> &'static str {
        "primitive"
    }

    fn is_applicable(&self, params: &ObjectParams) -> bool {
        matches!(params.subject().object(), Ok(object) if object.value.is_scalar())
    }

    fn transform(&self, _engine: &XmlEngine, params: &ObjectParams) -> Result<Id, TransformError> {
        if let Some(id) = visited(params)? {
            return Ok(id);
        }

        let text = params
            .subject()
            .object()?
            .value
            .scalar_text()
            .ok_or_else(|| not_a(params, "scalar"))?;
        let (id, element) = open_object(params)?;
        attach(params, element.with_attribute("value", text))?;
        Ok(id)
    }
}

/// Lists and sets
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionRule;

impl Rule<GraphObject, Id> for CollectionRule {
    fn name(&self) -> &'static str {
        "collection"
    }

    fn is_applicable(&self, params: &ObjectParams) -> bool {
        matches!(params.subject().object(), Ok(object) if object.value.is_collection())
    }

    fn transform(&self, engine: &XmlEngine, params: &ObjectParams) -> Result<Id, TransformError> {
        if let Some(id) = visited(params)? {
            return Ok(id);
        }

        let elements = match &params.subject().object()?.value {
            Value::List(elements) | Value::Set(elements) => elements,
            _ => return Err(not_a(params, "collection")),
        };
        let element_type = declared_or_described(params, ELEMENT_TYPE, "element", |types, name| {
            types.element_type_of(name).cloned()
        })?;

        let (id, mut element) = open_object(params)?;
        element.set_attribute("declaredElementType", &element_type);
        CollectionHandler.populate(engine, params, &mut element, elements, &element_type)?;
        attach(params, element)?;
        Ok(id)
    }
}

/// Key/value maps
#[derive(Debug, Clone, Copy, Default)]
pub struct MapRule;

impl Rule<GraphObject, Id> for MapRule {
    fn name(&self) -> &'static str {
        "map"
    }

    fn is_applicable(&self, params: &ObjectParams) -> bool {
        matches!(params.subject().object(), Ok(object) if matches!(object.value, Value::Map(_)))
    }

    fn transform(&self, engine: &XmlEngine, params: &ObjectParams) -> Result<Id, TransformError> {
        if let Some(id) = visited(params)? {
            return Ok(id);
        }

        let entries = match &params.subject().object()?.value {
            Value::Map(entries) => entries,
            _ => return Err(not_a(params, "map")),
        };
        let key_type = declared_or_described(params, KEY_TYPE, "key", |types, name| {
            types.map_types_of(name).0.cloned()
        })?;
        let value_type = declared_or_described(params, VALUE_TYPE, "value", |types, name| {
            types.map_types_of(name).1.cloned()
        })?;

        let (id, mut element) = open_object(params)?;
        element.set_attribute("declaredKeyType", &key_type);
        element.set_attribute("declaredValueType", &value_type);
        MapHandler.populate(engine, params, &mut element, entries, &key_type, &value_type)?;
        attach(params, element)?;
        Ok(id)
    }
}

/// User-defined types with named fields
///
/// Fields are emitted in declaration order. Each field value is transformed
/// under the field's declared type, and the field's own element, key and
/// value annotations are handed to the child as prerequisites.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordRule;

impl Rule<GraphObject, Id> for RecordRule {
    fn name(&self) -> &'static str {
        "record"
    }

    fn is_applicable(&self, params: &ObjectParams) -> bool {
        matches!(params.subject().object(), Ok(object) if matches!(object.value, Value::Record(_)))
    }

    fn transform(&self, engine: &XmlEngine, params: &ObjectParams) -> Result<Id, TransformError> {
        if let Some(id) = visited(params)? {
            return Ok(id);
        }

        let values = match &params.subject().object()?.value {
            Value::Record(values) => values,
            _ => return Err(not_a(params, "record")),
        };
        let types = params.prerequisite(TYPE_REGISTRY)?;
        let fields = types
            .fields_of(params.real_type().as_str())
            .ok_or_else(|| TransformError::UnresolvedType {
                type_name: params.real_type().clone(),
                role: "record",
            })?;
        if let Some((undeclared, _)) = values
            .iter()
            .find(|(name, _)| !fields.iter().any(|field| field.name == *name))
        {
            return Err(TransformError::UndeclaredField {
                type_name: params.real_type().clone(),
                field: undeclared.clone(),
            });
        }

        let (id, mut element) = open_object(params)?;
        for field in fields {
            let Some(&(_, value)) = values.iter().find(|(name, _)| *name == field.name) else {
                continue;
            };
            let mut child =
                params.derive(params.subject().sibling(value), field.declared_type.clone())?;
            if let Some(element_type) = &field.element_type {
                child.prerequisites.insert(ELEMENT_TYPE, element_type.clone());
            }
            if let Some(key_type) = &field.key_type {
                child.prerequisites.insert(KEY_TYPE, key_type.clone());
            }
            if let Some(value_type) = &field.value_type {
                child.prerequisites.insert(VALUE_TYPE, value_type.clone());
            }
            let field_id = engine.transform(&child)?;
            element.append(
                Element::new("field")
                    .with_attribute("name", &field.name)
                    .with_attribute("ref", field_id),
            );
        }
        attach(params, element)?;
        Ok(id)
    }
}

/// Resolve a declared type from an explicit prerequisite, falling back to the
/// type registry's description of the subject's real type
fn declared_or_described<F>(
    params: &ObjectParams,
    key: PrerequisiteKey<TypeName>,
    role: &'static str,
    describe: F,
) -> Result<TypeName, TransformError>
where
    F: Fn(&TypeRegistry, &str) -> Option<TypeName>,
{
    if let Some(declared) = params.optional_prerequisite(key)? {
        return Ok(declared.clone());
    }
    let types = params.prerequisite(TYPE_REGISTRY)?;
    describe(types.as_ref(), params.real_type().as_str()).ok_or_else(|| {
        TransformError::UnresolvedType {
            type_name: params.real_type().clone(),
            role,
        }
    })
}

fn not_a(params: &ObjectParams, expected: &str) -> TransformError {
    TransformError::Malformed(format!(
        "object {} of type '{}' is not a {}",
        params.subject().id(),
        params.real_type(),
        expected
    ))
}
