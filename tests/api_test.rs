use schema_externs::error::{ExternsError, ModelError, SchemaError};
use schema_externs::model::{
    Function, Namespace, Property, PropertyType, Record, Type, TypeDef, TypeDefKind,
};
use schema_externs::{compile, compile_file, generate_externs, ExternsGenerator, Provenance};
use std::io::Write;
use tempfile::NamedTempFile;

fn generator() -> ExternsGenerator {
    ExternsGenerator::with_provenance(Provenance::new(2015, "compiler.py"))
}

#[test]
fn test_compile_file_reads_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"// A schema on disk.
[{{"namespace": "disk", "functions": [{{"name": "spin", "type": "function", "parameters": []}}]}}]"#
    )
    .unwrap();

    let compiled = compile_file(file.path()).unwrap();
    let namespace = compiled.namespace("disk").unwrap();
    assert_eq!(namespace.functions[0].name, "spin");
    assert_eq!(
        namespace.source_file,
        file.path().file_name().unwrap().to_string_lossy()
    );
}

#[test]
fn test_compile_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    match compile_file(&path) {
        Err(ExternsError::Io { path: reported, .. }) => {
            assert!(reported.ends_with("absent.json"));
        }
        other => panic!("Expected an IO error, got {other:?}"),
    }
}

#[test]
fn test_schema_errors_surface_through_api() {
    let result = compile("[{\"namespace\": \"broken\",]", "broken.json");
    assert!(matches!(
        result,
        Err(ExternsError::Schema(SchemaError::Syntax { .. }))
    ));

    let result = compile("[1, /* open", "open.json");
    assert!(matches!(
        result,
        Err(ExternsError::Schema(SchemaError::UnterminatedComment { .. }))
    ));
}

#[test]
fn test_model_errors_surface_through_api() {
    let source = r#"[{"namespace": "test", "types": [
        {"id": "Either", "choices": []}
    ]}]"#;
    let result = generate_externs(source, "test.json", &generator());
    match result {
        Err(ExternsError::Model(ModelError::EmptyChoice { namespace, entity })) => {
            assert_eq!(namespace, "test");
            assert_eq!(entity, "Either");
        }
        other => panic!("Expected an empty choice error, got {other:?}"),
    }
}

#[test]
fn test_malformed_reference_is_rejected() {
    let source = r#"[{"namespace": "test", "types": [
        {"id": "Holder", "type": "object", "properties": {"held": {"$ref": "tabs..Tab"}}}
    ]}]"#;
    let result = generate_externs(source, "test.json", &generator());
    assert!(matches!(
        result,
        Err(ExternsError::Model(ModelError::MalformedReference { .. }))
    ));
}

#[test]
fn test_errors_render_as_diagnostics() {
    let err = compile("[{\"namespace\": }]", "bad.json").unwrap_err();
    let report = miette::Report::new(err);
    assert!(report.to_string().starts_with("Invalid JSON"));
}

#[test]
fn test_bare_deprecated_flag() {
    let source = r#"[{"namespace": "test",
        "types": [{"id": "Old", "type": "string", "enum": ["a"], "deprecated": true}],
        "functions": [{"name": "keep", "type": "function", "deprecated": false, "parameters": []}],
        "events": [{"name": "onOld", "type": "function", "deprecated": true}]
    }]"#;
    let compiled = compile(source, "test.json").unwrap();
    let namespace = compiled.namespace("test").unwrap();
    assert_eq!(namespace.types[0].deprecated.as_deref(), Some(""));
    assert_eq!(namespace.functions[0].deprecated, None);

    let output = generator().generate(namespace).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    let see_type = lines
        .iter()
        .position(|l| l.ends_with("#type-Old"))
        .unwrap();
    assert_eq!(lines[see_type - 1], " * @deprecated");
    let see_event = lines
        .iter()
        .position(|l| l.ends_with("#event-onOld"))
        .unwrap();
    assert_eq!(lines[see_event - 1], " * @deprecated");
    assert_eq!(output.matches("@deprecated").count(), 2);
}

#[test]
fn test_nullable_and_optional_composition() {
    let mut namespace = Namespace::new("test", "test.json");
    namespace.types.push(TypeDef {
        name: "Mixed".to_string(),
        description: None,
        deprecated: None,
        kind: TypeDefKind::Record(Record {
            properties: vec![
                Property::new("required", Type::reference("Foo")),
                Property::new("nullable", Type::nullable(PropertyType::Ref("Foo".into()))),
                Property::new("count", PropertyType::Number.into()).optional(),
                Property::new("both", Type::nullable(PropertyType::Ref("Foo".into()))).optional(),
                Property::new("elsewhere", Type::reference("tabs.Tab")),
            ],
            functions: vec![],
        }),
    });

    let output = generator().generate(&namespace).unwrap();
    assert!(output.contains(
        " * @typedef {{\n\
         \x20*   required: !chrome.test.Foo,\n\
         \x20*   nullable: chrome.test.Foo,\n\
         \x20*   count: (number|undefined),\n\
         \x20*   both: (chrome.test.Foo|undefined),\n\
         \x20*   elsewhere: !chrome.tabs.Tab\n\
         \x20* }}\n"
    ));
}

#[test]
fn test_parameters_keep_declaration_order() {
    let mut namespace = Namespace::new("test", "test.json");
    namespace.functions.push(Function::new("order").with_params(vec![
        Property::new("zeta", PropertyType::String.into()).with_description("Last letter."),
        Property::new("alpha", PropertyType::Boolean.into()),
        Property::new("mid", Type::array_of(PropertyType::Integer.into())).optional(),
    ]));

    let output = generator().generate(&namespace).unwrap();
    assert!(output.contains(
        " * @param {string} zeta Last letter.\n \
         * @param {boolean} alpha\n \
         * @param {!Array<number>=} mid\n"
    ));
    assert!(output.ends_with("chrome.test.order = function(zeta, alpha, mid) {};\n"));
}

#[test]
fn test_generator_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ExternsGenerator>();

    let generator = generator();
    let handles: Vec<_> = ["one", "two"]
        .into_iter()
        .map(|name| {
            let generator = generator.clone();
            std::thread::spawn(move || {
                let mut namespace = Namespace::new(name, "test.json");
                namespace.functions.push(Function::new("go"));
                generator.generate(&namespace).unwrap()
            })
        })
        .collect();
    for (handle, name) in handles.into_iter().zip(["one", "two"]) {
        let output = handle.join().unwrap();
        assert!(output.contains(&format!("chrome.{name}.go = function() {{}};")));
    }
}
