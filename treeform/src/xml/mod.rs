//! Object graph to XML
//!
//! Rules on the [`OBJECT_TO_XML`](crate::path::OBJECT_TO_XML) path turn every
//! reachable object into one `<object>` element directly under the document
//! root and return the ID they assigned. Containers do not nest their
//! elements; they list `ref` children pointing at the IDs their elements
//! received, so an object reachable twice is emitted once.
//!
//! | Value | Element |
//! |---|---|
//! | scalar | `<object id type value/>` |
//! | list, set | `<object id type declaredElementType>` + `<element ref/>`* |
//! | map | `<object id type declaredKeyType declaredValueType>` + `<entry><key ref/><value ref/></entry>`* |
//! | record | `<object id type>` + `<field name ref/>`* |
//!
//! Every rule expects the run-scoped prerequisites `DOCUMENT_ROOT` and
//! `OBJECT_CACHE`; collection, map and record rules also consult
//! `TYPE_REGISTRY` when the declared structure is not given explicitly.

pub mod handlers;
pub mod rules;

pub use handlers::{CollectionHandler, MapHandler};
pub use rules::{CollectionRule, MapRule, PrimitiveRule, RecordRule};

use crate::cache::Id;
use crate::document::Element;
use crate::engine::Engine;
use crate::error::TransformError;
use crate::graph::GraphObject;
use crate::parameters::{Subject, TransformationParameters};
use crate::prerequisites::{DOCUMENT_ROOT, OBJECT_CACHE};
use crate::types::TypeName;

/// Engine over the object graph
pub type XmlEngine = Engine<GraphObject, Id>;

/// Parameters of one object transformation step
pub type ObjectParams = TransformationParameters<GraphObject>;

impl Subject for GraphObject {
    fn real_type(&self) -> Result<TypeName, TransformError> {
        Ok(self.object()?.type_name.clone())
    }
}

/// ID already assigned to the subject under its declared type in this run
pub(crate) fn visited(params: &ObjectParams) -> Result<Option<Id>, TransformError> {
    let cache = params.prerequisite(OBJECT_CACHE)?;
    let id = cache
        .borrow()
        .get_id(params.subject().id(), params.declared_type());
    Ok(id)
}

/// Assign the subject a fresh ID and start its `<object>` element
pub(crate) fn open_object(params: &ObjectParams) -> Result<(Id, Element), TransformError> {
    let cache = params.prerequisite(OBJECT_CACHE)?;
    let id = cache
        .borrow_mut()
        .add_object(params.subject().id(), params.declared_type());
    let element = Element::new("object")
        .with_attribute("id", id)
        .with_attribute("type", params.real_type());
    Ok((id, element))
}

/// Append a finished element under the document root
pub(crate) fn attach(params: &ObjectParams, element: Element) -> Result<(), TransformError> {
    params.prerequisite(DOCUMENT_ROOT)?.borrow_mut().append(element);
    Ok(())
}

/// A reference child such as `<element ref="3"/>`
pub(crate) fn reference(tag: &str, id: Id) -> Element {
    Element::new(tag).with_attribute("ref", id)
}
