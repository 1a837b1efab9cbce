use crate::error::{ExternsError, SchemaError};
use crate::generator::ExternsGenerator;
use crate::model::Namespace;
use crate::schema::parse_schema;
use serde::{Serialize, Serializer};
use std::path::Path;

/// The result of compiling a schema document: every namespace it declares,
/// ready to be rendered as externs or inspected.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    pub file_name: String,
    pub namespaces: Vec<Namespace>,
}

/// One rendered externs file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternsFile {
    pub namespace: String,
    pub contents: String,
}

impl Serialize for CompiledSchema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.namespaces.serialize(serializer)
    }
}

impl CompiledSchema {
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|n| n.name == name)
    }

    /// Serializes the model into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Renders every namespace in declaration order.
    ///
    /// # Errors
    /// Returns the first `ModelError` raised by the generator.
    pub fn render_externs(
        &self,
        generator: &ExternsGenerator,
    ) -> Result<Vec<ExternsFile>, ExternsError> {
        self.namespaces
            .iter()
            .map(|namespace| {
                Ok(ExternsFile {
                    namespace: namespace.name.clone(),
                    contents: generator.generate(namespace)?,
                })
            })
            .collect()
    }
}

/// Compiles a JSON schema source string into its namespaces.
///
/// # Arguments
///
/// * `source` - The schema text. `//` and `/* */` comments are allowed.
/// * `file_name` - The name of the schema file, used for error reporting and
///   recorded as each namespace's source file.
///
/// # Errors
///
/// Returns an `ExternsError::Schema` if the document cannot be parsed into
/// the model.
pub fn compile(source: &str, file_name: &str) -> Result<CompiledSchema, ExternsError> {
    let namespaces = parse_schema(source, file_name)?;
    Ok(CompiledSchema {
        file_name: file_name.to_string(),
        namespaces,
    })
}

/// Reads and compiles a schema file.
///
/// # Errors
///
/// Returns `ExternsError::Io` if the file cannot be read, otherwise the same
/// errors as [`compile`].
pub fn compile_file(path: impl AsRef<Path>) -> Result<CompiledSchema, ExternsError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ExternsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
    compile(&source, &file_name)
}

/// Compiles `source` and renders its first namespace.
///
/// This is the one-call path used when a schema file holds a single API.
///
/// # Errors
///
/// Returns an `ExternsError` if compilation or generation fails.
pub fn generate_externs(
    source: &str,
    file_name: &str,
    generator: &ExternsGenerator,
) -> Result<String, ExternsError> {
    let compiled = compile(source, file_name)?;
    let namespace = compiled
        .namespaces
        .first()
        .ok_or_else(|| SchemaError::NoNamespaces {
            file: file_name.to_string(),
        })?;
    Ok(generator.generate(namespace)?)
}
