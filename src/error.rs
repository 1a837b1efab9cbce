use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum ExternsError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error("Failed to read schema file `{path}`")]
    #[diagnostic(
        code(externs::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Problems in the schema document itself, found while building the model.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SchemaError {
    #[error("Invalid JSON: {message}")]
    #[diagnostic(
        code(schema::syntax),
        help("Schema files are JSON with optional `//` and `/* */` comments.")
    )]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
        message: String,
    },

    #[error("Unterminated block comment")]
    #[diagnostic(
        code(schema::unterminated_comment),
        help("Close the comment with `*/`.")
    )]
    UnterminatedComment {
        #[source_code]
        src: NamedSource<String>,
        #[label("Comment starts here")]
        span: SourceSpan,
    },

    #[error("Schema document `{file}` must be a JSON array of namespaces")]
    #[diagnostic(code(schema::not_an_array))]
    NotAnArray { file: String },

    #[error("Schema document `{file}` declares no namespaces")]
    #[diagnostic(code(schema::no_namespaces))]
    NoNamespaces { file: String },

    #[error("`{entity}` is missing required field `{field}`")]
    #[diagnostic(code(schema::missing_field))]
    MissingField { entity: String, field: &'static str },

    #[error("`{entity}` has unknown type `{type_name}`")]
    #[diagnostic(
        code(schema::unknown_type),
        help("Known types are string, integer, number, double, boolean, any, binary, object, array and function.")
    )]
    UnknownType { entity: String, type_name: String },

    #[error("`{entity}` is not a valid schema node: {message}")]
    #[diagnostic(code(schema::invalid_node))]
    InvalidNode { entity: String, message: String },
}

/// Contract violations in a `Namespace` handed to the generator.
///
/// These abort generation: partial externs would break downstream compilation.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ModelError {
    #[error("Enum `{namespace}.{entity}` has no values")]
    #[diagnostic(code(model::empty_enum))]
    EmptyEnum { namespace: String, entity: String },

    #[error("Choice type at `{namespace}.{entity}` has no alternatives")]
    #[diagnostic(code(model::empty_choice))]
    EmptyChoice { namespace: String, entity: String },

    #[error("Record `{namespace}.{entity}` has no properties or methods")]
    #[diagnostic(
        code(model::empty_record),
        help("Declare a shapeless object as an alias of `object` instead.")
    )]
    EmptyRecord { namespace: String, entity: String },

    #[error("Inline object at `{namespace}.{entity}` has no properties")]
    #[diagnostic(code(model::empty_object))]
    EmptyObject { namespace: String, entity: String },

    #[error("Malformed type reference `{reference}` at `{namespace}.{entity}`")]
    #[diagnostic(code(model::malformed_reference))]
    MalformedReference {
        namespace: String,
        entity: String,
        reference: String,
    },

    #[error("Namespace `{namespace}` declares `{name}` more than once")]
    #[diagnostic(
        code(model::duplicate_name),
        help("Types, functions and events share one namespace object.")
    )]
    DuplicateName { namespace: String, name: String },
}
