//! Container handlers
//!
//! A handler walks the elements of a composite value in their natural order,
//! sends each one back through the engine with a context derived for it, and
//! records the returned ID as a reference child of the container's element.
//! Whether the engine emitted a new node or found a back-reference makes no
//! difference here: either way the child is a `ref`.

use super::{reference, ObjectParams, XmlEngine};
use crate::document::Element;
use crate::error::TransformError;
use crate::graph::ObjectId;
use crate::types::TypeName;

/// Populates list and set elements
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionHandler;

impl CollectionHandler {
    /// Append one `<element ref/>` per element, in order
    pub fn populate(
        &self,
        engine: &XmlEngine,
        params: &ObjectParams,
        parent: &mut Element,
        elements: &[ObjectId],
        element_type: &TypeName,
    ) -> Result<(), TransformError> {
        for &element in elements {
            let child = params.derive(params.subject().sibling(element), element_type.clone())?;
            let id = engine.transform(&child)?;
            parent.append(reference("element", id));
        }
        Ok(())
    }
}

/// Populates map elements, one `<entry>` per key/value pair
#[derive(Debug, Clone, Copy, Default)]
pub struct MapHandler;

impl MapHandler {
    /// Append `<entry><key ref/><value ref/></entry>` per entry, in order
    ///
    /// The key is transformed before the value.
    pub fn populate(
        &self,
        engine: &XmlEngine,
        params: &ObjectParams,
        parent: &mut Element,
        entries: &[(ObjectId, ObjectId)],
        key_type: &TypeName,
        value_type: &TypeName,
    ) -> Result<(), TransformError> {
        for &(key, value) in entries {
            let key_params = params.derive(params.subject().sibling(key), key_type.clone())?;
            let key_id = engine.transform(&key_params)?;

            let value_params = params.derive(params.subject().sibling(value), value_type.clone())?;
            let value_id = engine.transform(&value_params)?;

            parent.append(
                Element::new("entry")
                    .with_child(reference("key", key_id))
                    .with_child(reference("value", value_id)),
            );
        }
        Ok(())
    }
}
