//! Rule-based tree transformation
//!
//!     This crate turns one tree-shaped (or graph-shaped) representation into another by
//!     dispatching every node to the highest-priority rule that accepts it. Two rule families
//!     ship with it: object graphs to a flat, reference-linked XML document, and formula token
//!     trees to evaluation component trees.
//!
//! Architecture
//!
//!     - Rule trait: stateless units with a name, an applicability predicate and a transform
//!     - RuleRegistry: rules per transformation path, sorted by descending priority
//!     - Engine: the single recursion point; resolves a rule and invokes it
//!     - TransformationParameters: per-step context carrying typed prerequisites
//!     - ObjectGraphCache: run-scoped identity map that makes shared and cyclic graphs finite
//!
//!     This is a pure lib: nothing here prints, reads files or looks at the environment. The
//!     treeform-cli crate is the shell around it.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # TransformError and its ErrorKind taxonomy
//!     ├── path.rs                 # TransformationPath
//!     ├── prerequisites.rs        # typed prerequisite keys and storage
//!     ├── parameters.rs           # TransformationParameters and the Subject trait
//!     ├── rule.rs                 # Rule trait, FnRule, UnsupportedRule
//!     ├── registry.rs             # RuleRegistry
//!     ├── engine.rs               # Engine
//!     ├── cache.rs                # ObjectGraphCache
//!     ├── graph.rs                # arena object graph
//!     ├── types.rs                # type-descriptor registry
//!     ├── document.rs             # output elements and XML rendering
//!     ├── xml                     # object -> xml rules and container handlers
//!     ├── formula                 # token -> component rules
//!     ├── standard.rs             # standard registries and converters
//!     ├── lib.rs
//!
//! Adding rules
//!
//!     Dispatch never switches on concrete types. A new kind of value is supported by
//!     implementing Rule for the path's subject and output types and registering it with a
//!     priority; nothing else changes. Rules that recurse do so through the engine they are
//!     handed, after deriving a child context with TransformationParameters::derive.
//!
//! Runs
//!
//!     A run is one top-level transform call together with everything it reaches. Its document,
//!     identity cache and variable list are Rc<RefCell<_>> prerequisites created by the caller
//!     (or by a converter in standard.rs) and shared by every context derived in the run.
//!     Registries and engines are Send + Sync and can serve any number of runs.
//!
//! Testing
//!     tests
//!     ├── object_xml.rs
//!     └── formula.rs
//!
pub mod cache;
pub mod document;
pub mod engine;
pub mod error;
pub mod formula;
pub mod graph;
pub mod parameters;
pub mod path;
pub mod prerequisites;
pub mod registry;
pub mod rule;
pub mod standard;
pub mod types;
pub mod xml;

pub use cache::{Id, ObjectGraphCache};
pub use document::{Document, Element, XmlOptions};
pub use engine::Engine;
pub use error::{ErrorKind, TransformError};
pub use graph::{GraphObject, Object, ObjectGraph, ObjectId, Value};
pub use parameters::{Subject, TransformationParameters};
pub use path::TransformationPath;
pub use registry::RuleRegistry;
pub use rule::{FnRule, Rule, UnsupportedRule};
pub use standard::{Conversion, Formula, FormulaConverter, ObjectXmlConverter};
pub use types::{FieldDescriptor, TypeDescriptor, TypeName, TypeRegistry};
