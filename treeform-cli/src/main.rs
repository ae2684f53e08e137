//! Command-line interface for treeform
//! This binary reads object graphs and formula token trees from JSON files and prints what the
//! standard rules turn them into.
//!
//! Usage:
//!   treeform xml `<graph.json>` [--format xml|json] [--config `<file>`]   - Object graph to XML
//!   treeform formula `<tokens.json>` [--format text|json] [--config `<file>`] - Token tree to components
//!   treeform rules [--config `<file>`]                                    - List registered rules
//!
//! Logging goes to stderr and is controlled by RUST_LOG (default: warn).

use clap::{Arg, ArgMatches, Command};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use treeform::formula::TokenNode;
use treeform::standard::{formula_registry, object_xml_registry};
use treeform::{
    Engine, FormulaConverter, ObjectGraph, ObjectId, ObjectXmlConverter, RuleRegistry,
    TransformationPath, TypeDescriptor, TypeName, TypeRegistry,
};
use treeform_config::{Loader, TreeformConfig};

/// Input of the `xml` command
#[derive(Debug, Deserialize)]
struct GraphFile {
    /// Types beyond the built-in scalars and containers
    #[serde(default)]
    types: HashMap<TypeName, TypeDescriptor>,
    objects: ObjectGraph,
    root: ObjectId,
    root_type: TypeName,
}

fn main() {
    init_logging();

    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .help("TOML file layered over the built-in defaults");

    let matches = Command::new("treeform")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rule-based transformation of object graphs and formula token trees")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("xml")
                .about("Convert a JSON object graph to XML")
                .arg(Arg::new("path").help("Path to the graph file").required(true).index(1))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["xml", "json"])
                        .default_value("xml"),
                )
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("formula")
                .about("Rewrite a JSON token tree into a component tree")
                .arg(Arg::new("path").help("Path to the token tree file").required(true).index(1))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("rules")
                .about("List the registered rules of every path in resolution order")
                .arg(config_arg),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("xml", sub)) => handle_xml_command(sub),
        Some(("formula", sub)) => handle_formula_command(sub),
        Some(("rules", sub)) => handle_rules_command(sub),
        _ => fail("Unknown command; run `treeform --help` for usage"),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Print an error and exit with status 1
fn fail(message: impl Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

fn load_config(matches: &ArgMatches) -> TreeformConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    loader
        .build()
        .unwrap_or_else(|e| fail(format!("Configuration error: {}", e)))
}

fn read_json<T: for<'de> Deserialize<'de>>(matches: &ArgMatches) -> T {
    let path = matches
        .get_one::<String>("path")
        .unwrap_or_else(|| fail("Missing input path"));
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("Error reading {}: {}", path, e)));
    serde_json::from_str(&text).unwrap_or_else(|e| fail(format!("Error parsing {}: {}", path, e)))
}

fn configured<S, O>(engine: Engine<S, O>, config: &TreeformConfig) -> Engine<S, O> {
    match config.engine.depth_limit() {
        Some(limit) => engine.with_max_depth(limit),
        None => engine,
    }
}

/// Handle the xml command
fn handle_xml_command(matches: &ArgMatches) {
    let config = load_config(matches);
    let input: GraphFile = read_json(matches);
    debug!(objects = input.objects.len(), types = input.types.len(), "graph file loaded");

    let mut types = TypeRegistry::with_builtins();
    types.extend(input.types);
    let engine = configured(
        Engine::new(object_xml_registry(config.engine.fallback)),
        &config,
    );
    let converter = ObjectXmlConverter::new(engine, Arc::new(types), config.xml.options())
        .with_root_tag(config.xml.root_tag.as_str())
        .unwrap_or_else(|e| fail(format!("Configuration error: {}", e)));

    let conversion = converter
        .convert(&Arc::new(input.objects), input.root, input.root_type)
        .unwrap_or_else(|e| fail(format!("Transformation error: {}", e)));

    let formatted = match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => serde_json::to_string_pretty(&conversion)
            .unwrap_or_else(|e| fail(format!("Error formatting document: {}", e))),
        _ => conversion.document.to_xml(converter.options()),
    };
    print!("{}", formatted);
}

/// Handle the formula command
fn handle_formula_command(matches: &ArgMatches) {
    let config = load_config(matches);
    let tree: TokenNode = read_json(matches);

    let engine = configured(
        Engine::new(formula_registry(config.engine.fallback)),
        &config,
    );
    let formula = FormulaConverter::new(engine)
        .convert(&Arc::new(tree))
        .unwrap_or_else(|e| fail(format!("Transformation error: {}", e)));

    match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => println!(
            "{}",
            serde_json::to_string_pretty(&formula)
                .unwrap_or_else(|e| fail(format!("Error formatting formula: {}", e)))
        ),
        _ => {
            println!("{}", formula.component);
            println!("variables: {}", formula.variables.join(", "));
        }
    }
}

/// Handle the rules command
fn handle_rules_command(matches: &ArgMatches) {
    let config = load_config(matches);
    let fallback = config.engine.fallback;

    print_rules(&object_xml_registry(fallback));
    print_rules(&formula_registry(fallback));
}

fn print_rules<S, O>(registry: &RuleRegistry<S, O>) {
    for path in registry.paths() {
        print_path(registry, path);
    }
}

fn print_path<S, O>(registry: &RuleRegistry<S, O>, path: TransformationPath) {
    println!("{}", path);
    for (priority, name) in registry.rules(path) {
        println!("  {:>11}  {}", priority, name);
    }
    println!();
}
