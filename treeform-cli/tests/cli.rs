use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write fixture");
    file
}

const NAMES_GRAPH: &str = r#"{
    "types": {
        "Names": {"kind": "collection", "element": "string"}
    },
    "objects": [
        {"type": "string", "value": {"text": "a"}},
        {"type": "Names", "value": {"list": [0, 0]}}
    ],
    "root": 1,
    "root_type": "Names"
}"#;

#[test]
fn xml_command_prints_document() {
    let graph = write_temp(".json", NAMES_GRAPH);
    let mut cmd = cargo_bin_cmd!("treeform");
    cmd.arg("xml").arg(graph.path());

    let output_pred = predicate::str::starts_with("<objects>")
        .and(predicate::str::contains(
            r#"<object id="1" type="Names" declaredElementType="string">"#,
        ))
        .and(predicate::str::contains(r#"<object id="2" type="string" value="a"/>"#))
        .and(predicate::str::contains(r#"<element ref="2"/>"#).count(2));

    cmd.assert().success().stdout(output_pred);
}

#[test]
fn xml_command_honors_config_file() {
    let graph = write_temp(".json", NAMES_GRAPH);
    let config = write_temp(".toml", "[xml]\nroot_tag = \"graph\"\ndeclaration = true\n");
    let mut cmd = cargo_bin_cmd!("treeform");
    cmd.arg("xml")
        .arg(graph.path())
        .arg("--config")
        .arg(config.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("<?xml").and(predicate::str::contains("<graph>")));
}

#[test]
fn xml_command_json_format() {
    let graph = write_temp(".json", NAMES_GRAPH);
    let mut cmd = cargo_bin_cmd!("treeform");
    cmd.arg("xml").arg(graph.path()).arg("--format").arg("json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""root_id": 1"#));
}

#[test]
fn xml_command_reports_unresolved_type() {
    let graph = write_temp(
        ".json",
        r#"{
            "objects": [{"type": "list", "value": {"list": []}}],
            "root": 0,
            "root_type": "list"
        }"#,
    );
    let mut cmd = cargo_bin_cmd!("treeform");
    cmd.arg("xml").arg(graph.path());

    cmd.assert().failure().code(1).stderr(predicate::str::contains(
        "cannot resolve the declared element type of 'list'",
    ));
}

#[test]
fn xml_command_reports_missing_file() {
    let mut cmd = cargo_bin_cmd!("treeform");
    cmd.arg("xml").arg("/nonexistent/graph.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error reading"));
}

#[test]
fn formula_command_prints_infix_and_variables() {
    let tokens = write_temp(
        ".json",
        r#"{
            "token": {"function": "MAX"},
            "children": [
                {"token": {"operator": "+"}, "children": [
                    {"token": {"variable": "b"}},
                    {"token": {"number": 1}}
                ]},
                {"token": {"variable": "a"}},
                {"token": {"variable": "b"}}
            ]
        }"#,
    );
    let mut cmd = cargo_bin_cmd!("treeform");
    cmd.arg("formula").arg(tokens.path());

    cmd.assert()
        .success()
        .stdout("MAX(b + 1, a, b)\nvariables: b, a\n");
}

#[test]
fn formula_command_reports_arity() {
    let tokens = write_temp(
        ".json",
        r#"{"token": {"operator": "-"}, "children": [{"token": {"number": 1}}]}"#,
    );
    let mut cmd = cargo_bin_cmd!("treeform");
    cmd.arg("formula").arg(tokens.path());

    cmd.assert().failure().stderr(predicate::str::contains(
        "rule 'binary-operator' expects 2 children, found 1",
    ));
}

#[test]
fn rules_command_lists_paths_in_resolution_order() {
    let mut cmd = cargo_bin_cmd!("treeform");
    cmd.arg("rules");

    let in_order =
        predicate::str::is_match(r"(?s)primitive.*map.*collection.*record.*unsupported").unwrap();
    let output_pred = predicate::str::contains("object->xml")
        .and(predicate::str::contains("token->component"))
        .and(in_order);

    cmd.assert().success().stdout(output_pred);
}

#[test]
fn rules_command_without_fallback() {
    let config = write_temp(".toml", "[engine]\nfallback = false\n");
    let mut cmd = cargo_bin_cmd!("treeform");
    cmd.arg("rules").arg("--config").arg(config.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("unsupported").not());
}

#[test]
fn xml_command_rejects_invalid_root_tag() {
    let graph = write_temp(".json", NAMES_GRAPH);
    let config = write_temp(".toml", "[xml]\nroot_tag = \"a b\"\n");
    let mut cmd = cargo_bin_cmd!("treeform");
    cmd.arg("xml")
        .arg(graph.path())
        .arg("--config")
        .arg(config.path());

    cmd.assert().failure().code(1).stderr(predicate::str::contains(
        "xml.root_tag 'a b' is not a valid XML name",
    ));
}
