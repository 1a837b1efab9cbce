//! Renders a [`Namespace`] as a Closure Compiler externs file.

use crate::code::{escape_comment_end, Code};
use crate::config::{GeneratorConfig, Provenance};
use crate::error::ModelError;
use crate::model::{
    EnumValue, Event, Function, Namespace, Property, Record, TypeDef, TypeDefKind,
};
use crate::render::{Slot, TypeRenderer};
use log::{debug, trace};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"));
// ASCII classes: non-ASCII letters become underscores too.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));
static LEADING_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9])").expect("valid regex"));

/// The property name an enum value gets in the generated enum object.
///
/// `camelCaseEnum` becomes `CAMEL_CASE_ENUM`, `Non-Characters` becomes
/// `NON_CHARACTERS` and `5NumFirst` becomes `_5NUM_FIRST`.
pub fn enum_key(value: &str) -> String {
    let key = CASE_BOUNDARY.replace_all(value, "${1}_${2}");
    let key = NON_WORD.replace_all(&key, "_");
    let key = LEADING_DIGIT.replace(&key, "_${1}");
    key.to_uppercase()
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Generates externs for namespaces.
///
/// The generator holds no per-call state, so one instance can serve any
/// number of namespaces, from any number of threads.
#[derive(Debug, Clone)]
pub struct ExternsGenerator {
    config: GeneratorConfig,
    provenance: Provenance,
}

impl ExternsGenerator {
    pub fn new(config: GeneratorConfig, provenance: Provenance) -> Self {
        ExternsGenerator { config, provenance }
    }

    /// A generator with the default configuration.
    pub fn with_provenance(provenance: Provenance) -> Self {
        Self::new(GeneratorConfig::default(), provenance)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Renders `namespace` to the final externs text, newline-terminated.
    ///
    /// # Errors
    /// Returns a `ModelError` if the namespace breaks a model invariant; no
    /// partial output is produced.
    pub fn generate(&self, namespace: &Namespace) -> Result<String, ModelError> {
        let mut text = self.generate_code(namespace)?.render();
        text.push('\n');
        Ok(text)
    }

    /// Renders `namespace` into a [`Code`] buffer.
    ///
    /// # Errors
    /// See [`ExternsGenerator::generate`].
    pub fn generate_code(&self, namespace: &Namespace) -> Result<Code, ModelError> {
        debug!(
            "Generating externs for `{}` ({} types, {} functions, {} events)",
            namespace.name,
            namespace.types.len(),
            namespace.functions.len(),
            namespace.events.len()
        );
        check_unique_names(namespace)?;
        NamespaceEmitter::new(namespace, &self.config, &self.provenance).emit()
    }
}

fn check_unique_names(namespace: &Namespace) -> Result<(), ModelError> {
    let names = namespace
        .types
        .iter()
        .map(|t| t.name.as_str())
        .chain(namespace.functions.iter().map(|f| f.name.as_str()))
        .chain(namespace.events.iter().map(|e| e.name.as_str()));
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ModelError::DuplicateName {
                namespace: namespace.name.clone(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Per-call emission state. Lives for one `generate` call.
struct NamespaceEmitter<'a> {
    namespace: &'a Namespace,
    config: &'a GeneratorConfig,
    provenance: &'a Provenance,
    renderer: TypeRenderer<'a>,
}

impl<'a> NamespaceEmitter<'a> {
    fn new(
        namespace: &'a Namespace,
        config: &'a GeneratorConfig,
        provenance: &'a Provenance,
    ) -> Self {
        NamespaceEmitter {
            namespace,
            config,
            provenance,
            renderer: TypeRenderer::new(&config.root, &namespace.name),
        }
    }

    fn emit(&self) -> Result<Code, ModelError> {
        let mut c = Code::with_comment_width(self.config.comment_width);
        self.append_header(&mut c);
        self.append_namespace_object(&mut c);

        for type_def in &self.namespace.types {
            trace!("Emitting type `{}`", type_def.name);
            self.append_type(&mut c, type_def)?;
            c.blank();
        }
        for function in &self.namespace.functions {
            trace!("Emitting function `{}`", function.name);
            let target = self.renderer.qualified_name(&function.name);
            self.append_function(&mut c, function, &target, &function.name)?;
            c.blank();
        }
        for event in &self.namespace.events {
            trace!("Emitting event `{}`", event.name);
            self.append_event(&mut c, event)?;
            c.blank();
        }

        c.trim_trailing_blank_lines();
        Ok(c)
    }

    fn append_header(&self, c: &mut Code) {
        c.append(&format!(
            "// Copyright {} {}. All rights reserved.",
            self.provenance.year, self.config.copyright_holder
        ));
        c.append("// Use of this source code is governed by a BSD-style license that can be");
        c.append("// found in the LICENSE file.");
        c.blank();
        c.append("// This file was generated by:");
        c.append(&format!("//   {}.", self.provenance.display_command()));
        c.append("// NOTE: The format of types has changed. 'FooType' is now");
        c.append(&format!("//   '{}.FooType'.", self.renderer.namespace_path()));
        c.append("// Please run the closure compiler before committing changes.");
        c.append(
            "// See https://chromium.googlesource.com/chromium/src/+/master/docs/closure_compilation.md",
        );
        c.blank();
        c.append(&format!(
            "/** @fileoverview Externs generated from namespace: {} */",
            self.namespace.name
        ));
        c.blank();
    }

    fn append_namespace_object(&self, c: &mut Code) {
        c.append("/**");
        c.append(" * @const");
        c.append(" */");
        c.append(&format!("{} = {{}};", self.renderer.namespace_path()));
        c.blank();
    }

    fn see_link(&self, kind: &str, name: &str) -> String {
        format!(
            "@see {}/{}#{}-{}",
            self.config.doc_base_url, self.namespace.name, kind, name
        )
    }

    fn append_description(&self, c: &mut Code, description: Option<&str>) {
        for line in description.into_iter().flat_map(str::lines) {
            if !line.trim().is_empty() {
                c.comment(line.trim());
            }
        }
    }

    fn append_deprecated(&self, c: &mut Code, deprecated: Option<&str>) {
        match deprecated.map(str::trim) {
            Some("") => {
                c.append("@deprecated");
            }
            Some(message) => {
                c.append(&format!("@deprecated {}", escape_comment_end(message)));
            }
            None => {}
        }
    }

    // --- Types ---

    fn append_type(&self, c: &mut Code, type_def: &TypeDef) -> Result<(), ModelError> {
        match &type_def.kind {
            TypeDefKind::Enum { values } => self.append_enum(c, type_def, values),
            TypeDefKind::Record(record) if record.is_constructor() => {
                self.append_constructor(c, type_def, record)
            }
            TypeDefKind::Record(record) => {
                if record.properties.is_empty() {
                    return Err(ModelError::EmptyRecord {
                        namespace: self.namespace.name.clone(),
                        entity: type_def.name.clone(),
                    });
                }
                let body = self
                    .renderer
                    .object_definition(&record.properties, &type_def.name)?;
                self.append_typedef(c, type_def, &body)
            }
            TypeDefKind::Choice { choices } => {
                let body = self.renderer.union(choices, &type_def.name)?;
                self.append_typedef(c, type_def, &body)
            }
            TypeDefKind::Alias { target } => {
                let body = self.renderer.render(target, &type_def.name)?;
                self.append_typedef(c, type_def, &body)
            }
        }
    }

    fn append_enum(
        &self,
        c: &mut Code,
        type_def: &TypeDef,
        values: &[EnumValue],
    ) -> Result<(), ModelError> {
        if values.is_empty() {
            return Err(ModelError::EmptyEnum {
                namespace: self.namespace.name.clone(),
                entity: type_def.name.clone(),
            });
        }
        c.doc_comment::<ModelError>(|c| {
            self.append_description(c, type_def.description.as_deref());
            c.append("@enum {string}");
            self.append_deprecated(c, type_def.deprecated.as_deref());
            c.append(&self.see_link("type", &type_def.name));
            Ok(())
        })?;
        c.append(&format!(
            "{} = {{",
            self.renderer.qualified_name(&type_def.name)
        ));
        for value in values {
            c.append(&format!("  {}: {},", enum_key(&value.name), quote(&value.name)));
        }
        c.append("};");
        Ok(())
    }

    fn append_typedef(&self, c: &mut Code, type_def: &TypeDef, body: &Code) -> Result<(), ModelError> {
        c.doc_comment::<ModelError>(|c| {
            self.append_description(c, type_def.description.as_deref());
            c.append("@typedef {");
            c.concat(body, false).append_inline("}");
            self.append_deprecated(c, type_def.deprecated.as_deref());
            c.append(&self.see_link("type", &type_def.name));
            Ok(())
        })?;
        c.append(&format!(
            "{};",
            self.renderer.qualified_name(&type_def.name)
        ));
        Ok(())
    }

    /// Records with methods become a private constructor with one prototype
    /// member per property and method.
    fn append_constructor(
        &self,
        c: &mut Code,
        type_def: &TypeDef,
        record: &Record,
    ) -> Result<(), ModelError> {
        let class = self.renderer.qualified_name(&type_def.name);
        c.doc_comment::<ModelError>(|c| {
            self.append_description(c, type_def.description.as_deref());
            c.append("@constructor");
            c.append("@private");
            self.append_deprecated(c, type_def.deprecated.as_deref());
            c.append(&self.see_link("type", &type_def.name));
            Ok(())
        })?;
        c.append(&format!("{class} = function() {{}};"));
        c.blank();

        for property in &record.properties {
            self.append_prototype_property(c, &class, type_def, property)?;
            c.blank();
        }
        for method in &record.functions {
            let target = format!("{class}.prototype.{}", method.name);
            let entity = format!("{}.{}", type_def.name, method.name);
            self.append_function(c, method, &target, &entity)?;
            c.blank();
        }
        Ok(())
    }

    fn append_prototype_property(
        &self,
        c: &mut Code,
        class: &str,
        type_def: &TypeDef,
        property: &Property,
    ) -> Result<(), ModelError> {
        let entity = format!("{}.{}", type_def.name, property.name);
        c.doc_comment::<ModelError>(|c| {
            self.append_description(c, property.description.as_deref());
            match &property.jsexterns {
                Some(annotation) => {
                    for line in annotation.trim().lines() {
                        c.append(&escape_comment_end(line.trim()));
                    }
                }
                None => {
                    let rendered = self.renderer.render_slot(
                        &property.ty,
                        property.optional,
                        Slot::Field,
                        &entity,
                    )?;
                    c.append("@type {");
                    c.concat(&rendered, false).append_inline("}");
                }
            }
            c.append(&self.see_link("type", &property.name));
            Ok(())
        })?;
        c.append(&format!("{class}.prototype.{};", property.name));
        Ok(())
    }

    // --- Functions and events ---

    /// Emits the doc block and the no-op function assigned to `target`.
    fn append_function(
        &self,
        c: &mut Code,
        function: &Function,
        target: &str,
        entity: &str,
    ) -> Result<(), ModelError> {
        c.doc_comment::<ModelError>(|c| {
            self.append_description(c, function.description.as_deref());
            for param in &function.params {
                let rendered = self.renderer.render_slot(
                    &param.ty,
                    param.optional,
                    Slot::Parameter,
                    &format!("{entity}.{}", param.name),
                )?;
                append_tag(c, "param", &rendered, &param.name, param.description.as_deref());
            }
            if let Some(returns) = &function.returns {
                let rendered =
                    self.renderer
                        .render_slot(&returns.ty, false, Slot::Return, entity)?;
                append_tag(c, "return", &rendered, "", returns.description.as_deref());
            }
            self.append_deprecated(c, function.deprecated.as_deref());
            c.append(&self.see_link("method", &function.name));
            Ok(())
        })?;
        let params: Vec<&str> = function.params.iter().map(|p| p.name.as_str()).collect();
        c.append(&format!("{target} = function({}) {{}};", params.join(", ")));
        Ok(())
    }

    /// Events are properties of type `ChromeEvent`; their parameters are not
    /// part of the declaration.
    fn append_event(&self, c: &mut Code, event: &Event) -> Result<(), ModelError> {
        c.doc_comment::<ModelError>(|c| {
            self.append_description(c, event.description.as_deref());
            c.append("@type {!ChromeEvent}");
            self.append_deprecated(c, event.deprecated.as_deref());
            c.append(&self.see_link("event", &event.name));
            Ok(())
        })?;
        c.append(&format!("{};", self.renderer.qualified_name(&event.name)));
        Ok(())
    }
}

/// `@param {T} name description`, wrapping the description with a hanging indent.
fn append_tag(c: &mut Code, tag: &str, rendered: &Code, name: &str, description: Option<&str>) {
    c.append(&format!("@{tag} {{"));
    c.concat(rendered, false);
    if name.is_empty() {
        c.append_inline("}");
    } else {
        c.append_inline(&format!("}} {name}"));
    }
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        c.comment_inline(&format!(" {}", description.trim()), 4);
    }
}
