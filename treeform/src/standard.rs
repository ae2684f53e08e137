//! Standard registries and one-call converters
//!
//! The registry builders wire the rules of this crate onto their paths with
//! fixed priorities. The converters own an engine and set up the run-scoped
//! prerequisites (document, cache, variable list) afresh for every call, so
//! one converter can be reused across runs and shared across threads.

use crate::cache::Id;
use crate::document::{is_valid_name, Document, XmlOptions};
use crate::engine::Engine;
use crate::error::TransformError;
use crate::formula::{
    BinaryOperatorRule, CallRule, Component, FormulaEngine, GroupRule, OperandRule, TokenNode,
    TokenParams, VariableRule,
};
use crate::graph::{GraphObject, ObjectGraph, ObjectId};
use crate::path::{OBJECT_TO_XML, TOKEN_TO_COMPONENT};
use crate::prerequisites::{
    SharedCache, SharedDocument, SharedVariables, DOCUMENT_ROOT, OBJECT_CACHE, TYPE_REGISTRY,
    VARIABLES,
};
use crate::registry::RuleRegistry;
use crate::rule::UnsupportedRule;
use crate::types::{TypeName, TypeRegistry};
use crate::xml::{CollectionRule, MapRule, ObjectParams, PrimitiveRule, RecordRule, XmlEngine};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

/// Priorities of the standard rules
pub mod priority {
    pub const PRIMITIVE: i32 = 400;
    pub const MAP: i32 = 300;
    pub const COLLECTION: i32 = 200;
    pub const RECORD: i32 = 100;

    pub const GROUP: i32 = 400;
    pub const BINARY_OPERATOR: i32 = 300;
    pub const CALL: i32 = 200;
    pub const VARIABLE: i32 = 100;
    pub const OPERAND: i32 = 100;

    pub const FALLBACK: i32 = i32::MIN;
}

/// Rules turning an object graph into XML
pub fn object_xml_registry(include_fallback: bool) -> RuleRegistry<GraphObject, Id> {
    let mut registry = RuleRegistry::new();
    registry.register(OBJECT_TO_XML, priority::PRIMITIVE, PrimitiveRule);
    registry.register(OBJECT_TO_XML, priority::MAP, MapRule);
    registry.register(OBJECT_TO_XML, priority::COLLECTION, CollectionRule);
    registry.register(OBJECT_TO_XML, priority::RECORD, RecordRule);
    if include_fallback {
        registry.register(OBJECT_TO_XML, priority::FALLBACK, UnsupportedRule);
    }
    registry
}

/// Rules turning a token tree into a component tree
pub fn formula_registry(include_fallback: bool) -> RuleRegistry<Arc<TokenNode>, Component> {
    let mut registry = RuleRegistry::new();
    registry.register(TOKEN_TO_COMPONENT, priority::GROUP, GroupRule);
    registry.register(TOKEN_TO_COMPONENT, priority::BINARY_OPERATOR, BinaryOperatorRule);
    registry.register(TOKEN_TO_COMPONENT, priority::CALL, CallRule);
    registry.register(TOKEN_TO_COMPONENT, priority::VARIABLE, VariableRule);
    registry.register(TOKEN_TO_COMPONENT, priority::OPERAND, OperandRule);
    if include_fallback {
        registry.register(TOKEN_TO_COMPONENT, priority::FALLBACK, UnsupportedRule);
    }
    registry
}

/// Result of one object graph conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    /// ID assigned to the root object
    pub root_id: Id,
    pub document: Document,
}

/// Converts object graphs to XML documents
#[derive(Clone)]
pub struct ObjectXmlConverter {
    engine: XmlEngine,
    types: Arc<TypeRegistry>,
    options: XmlOptions,
    root_tag: String,
}

impl ObjectXmlConverter {
    pub fn new(engine: XmlEngine, types: Arc<TypeRegistry>, options: XmlOptions) -> Self {
        Self {
            engine,
            types,
            options,
            root_tag: Document::DEFAULT_ROOT_TAG.to_string(),
        }
    }

    /// A converter over the standard registry, with the fallback rule
    pub fn standard(types: TypeRegistry) -> Self {
        Self::new(
            Engine::new(object_xml_registry(true)),
            Arc::new(types),
            XmlOptions::default(),
        )
    }

    /// Tag of the document root element; must be a valid XML name
    pub fn with_root_tag(mut self, root_tag: impl Into<String>) -> Result<Self, TransformError> {
        let root_tag = root_tag.into();
        if !is_valid_name(&root_tag) {
            return Err(TransformError::InvalidName(root_tag));
        }
        self.root_tag = root_tag;
        Ok(self)
    }

    pub fn options(&self) -> &XmlOptions {
        &self.options
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Transform the object graph reachable from `root`
    ///
    /// Each call starts from an empty cache and document; on failure the
    /// partial document is dropped.
    pub fn convert(
        &self,
        graph: &Arc<ObjectGraph>,
        root: ObjectId,
        declared_type: impl Into<TypeName>,
    ) -> Result<Conversion, TransformError> {
        graph.validate()?;
        let document: SharedDocument =
            Rc::new(RefCell::new(Document::new(self.root_tag.as_str())));
        let cache = SharedCache::default();
        let params = ObjectParams::new(
            OBJECT_TO_XML,
            GraphObject::new(Arc::clone(graph), root),
            declared_type,
        )?
        .with_prerequisite(DOCUMENT_ROOT, Rc::clone(&document))
        .with_prerequisite(OBJECT_CACHE, Rc::clone(&cache))
        .with_prerequisite(TYPE_REGISTRY, Arc::clone(&self.types));

        debug!(
            root = %root,
            declared_type = %params.declared_type(),
            objects = graph.len(),
            "object conversion started"
        );
        let root_id = self.engine.transform(&params)?;
        debug!(root_id = %root_id, emitted = cache.borrow().len(), "object conversion finished");

        Ok(Conversion {
            root_id,
            document: document.take(),
        })
    }

    /// Convert and render with the converter's XML options
    pub fn convert_to_xml(
        &self,
        graph: &Arc<ObjectGraph>,
        root: ObjectId,
        declared_type: impl Into<TypeName>,
    ) -> Result<String, TransformError> {
        let conversion = self.convert(graph, root, declared_type)?;
        Ok(conversion.document.to_xml(&self.options))
    }
}

/// Result of one token tree rewrite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Formula {
    pub component: Component,
    /// Referenced variable names, in order of first appearance
    pub variables: Vec<String>,
}

/// Rewrites token trees into component trees
#[derive(Clone)]
pub struct FormulaConverter {
    engine: FormulaEngine,
}

impl FormulaConverter {
    pub fn new(engine: FormulaEngine) -> Self {
        Self { engine }
    }

    /// A converter over the standard registry, with the fallback rule
    pub fn standard() -> Self {
        Self::new(Engine::new(formula_registry(true)))
    }

    pub fn convert(&self, tree: &Arc<TokenNode>) -> Result<Formula, TransformError> {
        let variables = SharedVariables::default();
        let params =
            TokenParams::new(TOKEN_TO_COMPONENT, Arc::clone(tree), TokenNode::DECLARED_TYPE)?
                .with_prerequisite(VARIABLES, Rc::clone(&variables));

        debug!(token = tree.token.kind(), "formula conversion started");
        let component = self.engine.transform(&params)?;
        debug!(variables = variables.borrow().len(), "formula conversion finished");

        Ok(Formula {
            component,
            variables: variables.take(),
        })
    }
}
