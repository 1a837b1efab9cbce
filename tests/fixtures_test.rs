// Golden-file tests: schema fixtures rendered with a pinned provenance
use schema_externs::model::TypeDefKind;
use schema_externs::{compile, generate_externs, ExternsGenerator, Provenance};
use std::fs;
use std::path::PathBuf;

const COMMAND: &str = "tools/json_schema_compiler/compiler.py";

fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

fn read_fixture(filename: &str) -> String {
    let path = fixture_path(filename);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read fixture: {:?}", path))
}

fn generator() -> ExternsGenerator {
    ExternsGenerator::with_provenance(Provenance::new(2015, COMMAND))
}

fn assert_lines_eq(actual: &str, expected: &str) {
    for (i, (a, e)) in actual.lines().zip(expected.lines()).enumerate() {
        assert_eq!(a, e, "Line {} differs", i + 1);
    }
    assert_eq!(actual, expected);
}

#[test]
fn test_fake_api_externs() {
    let source = read_fixture("fake_api.json");
    let output = generate_externs(&source, "fake_api.json", &generator()).unwrap();
    assert_lines_eq(&output, &read_fixture("fake_api.externs.js"));
}

#[test]
fn test_fake_json_with_inline_objects() {
    let source = read_fixture("fake_json.json");
    let output = generate_externs(&source, "fake_api.json", &generator()).unwrap();
    assert_lines_eq(&output, &read_fixture("fake_json.externs.js"));
}

#[test]
fn test_output_is_deterministic() {
    let source = read_fixture("fake_api.json");
    let compiled = compile(&source, "fake_api.json").unwrap();
    let namespace = compiled.namespace("fakeApi").unwrap();
    let generator = generator();
    let first = generator.generate(namespace).unwrap();
    let second = generator.generate(namespace).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_header_names_namespace_and_command() {
    let source = read_fixture("fake_json.json");
    let output = generate_externs(&source, "fake_json.json", &generator()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines[0],
        "// Copyright 2015 The Chromium Authors. All rights reserved."
    );
    assert_eq!(lines[5], format!("//   {COMMAND}."));
    assert_eq!(lines[7], "//   'chrome.fakeJson.FooType'.");
    assert_eq!(
        lines[11],
        "/** @fileoverview Externs generated from namespace: fakeJson */"
    );
}

#[test]
fn test_windows_command_uses_forward_slashes() {
    let source = read_fixture("fake_json.json");
    let generator = ExternsGenerator::with_provenance(Provenance::new(
        2015,
        r"tools\json_schema_compiler\compiler.py",
    ));
    let output = generate_externs(&source, "fake_json.json", &generator).unwrap();
    assert!(output.contains(&format!("//   {COMMAND}.\n")));
}

#[test]
fn test_comment_lines_fit_the_width() {
    for fixture in ["fake_api.json", "fake_json.json"] {
        let output = generate_externs(&read_fixture(fixture), fixture, &generator()).unwrap();
        for line in output.lines().filter(|l| l.starts_with(" * ")) {
            // Annotations are never broken, so only prose lines are checked.
            if !line.contains('{') && !line.contains('}') && !line.contains("@see") {
                assert!(line.chars().count() <= 80, "Line too long: {line}");
            }
        }
    }
}

#[test]
fn test_every_declaration_is_documented() {
    let output = generate_externs(&read_fixture("fake_api.json"), "fake_api.json", &generator())
        .unwrap();
    let lines: Vec<&str> = output.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with("chrome.fakeApi") {
            assert_eq!(lines[i - 1], " */", "Undocumented declaration: {line}");
        }
    }
}

#[test]
fn test_fake_api_model() {
    let compiled = compile(&read_fixture("fake_api.json"), "fake_api.json").unwrap();
    let namespace = compiled.namespace("fakeApi").unwrap();
    assert_eq!(namespace.description.as_deref(), Some("A totally fake API."));

    let Some(TypeDefKind::Record(qux)) = namespace.find_type("Qux").map(|t| &t.kind) else {
        panic!("Expected Qux to be a record");
    };
    assert!(qux.is_constructor());
    let fields: Vec<&str> = qux.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(fields, ["notOptionalLong", "optionalLong", "dict"]);

    let Some(TypeDefKind::Enum { values }) = namespace.find_type("Greek").map(|t| &t.kind) else {
        panic!("Expected Greek to be an enum");
    };
    let names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["ALPHA", "BETA", "GAMMA", "DELTA"]);
    assert!(namespace.find_type("VoidCallback").is_none());
}
