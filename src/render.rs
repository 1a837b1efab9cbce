//! Closure type annotations for model types.
//!
//! Every type use is rendered in two steps: the structural annotation of its
//! `PropertyType`, then the nullability marker for that kind. Optionality is
//! applied on top by [`TypeRenderer::render_slot`], which is the only place
//! that knows how each position spells "may be absent".

use crate::code::Code;
use crate::error::ModelError;
use crate::model::{Function, Property, PropertyType, Type};

/// Where a type use appears. Decides how optionality is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A field of a record or inline object: `(T|undefined)`.
    Field,
    /// A parameter inside a `function(...)` type: `T|undefined`.
    CallbackParam,
    /// A documented `@param`: Closure's optional-parameter suffix, `T=`.
    Parameter,
    /// A return value; never optional.
    Return,
}

/// How a kind makes its nullability explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nullability {
    /// Never marked (primitives, `*`, `ArrayBuffer`, `Object`).
    Implicit,
    /// Nullable unless prefixed with `!` (references and arrays).
    NonNullMarker,
    /// Non-null unless prefixed with `?` (unions, records, function types).
    NullableMarker,
}

fn nullability(kind: &PropertyType) -> Nullability {
    match kind {
        PropertyType::String
        | PropertyType::Integer
        | PropertyType::Number
        | PropertyType::Boolean
        | PropertyType::Any
        | PropertyType::Binary
        | PropertyType::Object => Nullability::Implicit,
        PropertyType::Array(_) | PropertyType::Ref(_) => Nullability::NonNullMarker,
        PropertyType::Choices(_) | PropertyType::InlineObject(_) | PropertyType::Function(_) => {
            Nullability::NullableMarker
        }
    }
}

fn marker(ty: &Type) -> &'static str {
    match (nullability(&ty.kind), ty.nullable) {
        (Nullability::NonNullMarker, false) => "!",
        (Nullability::NullableMarker, true) => "?",
        _ => "",
    }
}

/// Renders type uses for one namespace.
#[derive(Debug, Clone, Copy)]
pub struct TypeRenderer<'a> {
    root: &'a str,
    namespace: &'a str,
}

impl<'a> TypeRenderer<'a> {
    pub fn new(root: &'a str, namespace: &'a str) -> Self {
        TypeRenderer { root, namespace }
    }

    /// `chrome.fakeApi`
    pub fn namespace_path(&self) -> String {
        format!("{}.{}", self.root, self.namespace)
    }

    /// The dotted path of a named type. Names that already carry a namespace
    /// (`tabs.Tab`) are only prefixed with the root object.
    pub fn qualified_name(&self, name: &str) -> String {
        if name.contains('.') {
            format!("{}.{}", self.root, name)
        } else {
            format!("{}.{}.{}", self.root, self.namespace, name)
        }
    }

    /// Renders a type use with its nullability applied.
    ///
    /// `entity` is the dotted path of the declaration being rendered and is
    /// only used for error reporting.
    ///
    /// # Errors
    /// Returns a `ModelError` for empty unions, empty inline objects and
    /// malformed references anywhere inside `ty`.
    pub fn render(&self, ty: &Type, entity: &str) -> Result<Code, ModelError> {
        let base = self.render_structure(&ty.kind, entity)?;
        let mut code = Code::line(marker(ty));
        code.concat(&base, false);
        Ok(code)
    }

    /// Renders a type use in `slot`, adding the slot's optional spelling.
    ///
    /// # Errors
    /// See [`TypeRenderer::render`].
    pub fn render_slot(
        &self,
        ty: &Type,
        optional: bool,
        slot: Slot,
        entity: &str,
    ) -> Result<Code, ModelError> {
        let rendered = self.render(ty, entity)?;
        if !optional {
            return Ok(rendered);
        }
        let code = match slot {
            Slot::Field => {
                let mut code = Code::line("(");
                code.concat(&rendered, false).append_inline("|undefined)");
                code
            }
            Slot::CallbackParam => {
                let mut code = rendered;
                code.append_inline("|undefined");
                code
            }
            Slot::Parameter => {
                let mut code = rendered;
                code.append_inline("=");
                code
            }
            Slot::Return => rendered,
        };
        Ok(code)
    }

    fn render_structure(&self, kind: &PropertyType, entity: &str) -> Result<Code, ModelError> {
        let code = match kind {
            PropertyType::String => Code::line("string"),
            PropertyType::Integer | PropertyType::Number => Code::line("number"),
            PropertyType::Boolean => Code::line("boolean"),
            PropertyType::Any => Code::line("*"),
            PropertyType::Binary => Code::line("ArrayBuffer"),
            PropertyType::Object => Code::line("Object"),
            PropertyType::InlineObject(properties) => {
                self.object_definition(properties, entity)?
            }
            PropertyType::Array(item) => {
                let mut code = Code::line("Array<");
                code.concat(&self.render(item, entity)?, false)
                    .append_inline(">");
                code
            }
            PropertyType::Ref(name) => {
                self.check_reference(name, entity)?;
                Code::line(self.qualified_name(name))
            }
            PropertyType::Choices(choices) => self.union(choices, entity)?,
            PropertyType::Function(function) => self.function_type(function, entity)?,
        };
        Ok(code)
    }

    /// `(A|B|C)`, alternatives in declaration order.
    ///
    /// # Errors
    /// Returns `ModelError::EmptyChoice` if `choices` is empty.
    pub fn union(&self, choices: &[Type], entity: &str) -> Result<Code, ModelError> {
        if choices.is_empty() {
            return Err(ModelError::EmptyChoice {
                namespace: self.namespace.to_string(),
                entity: entity.to_string(),
            });
        }
        let mut code = Code::line("(");
        for (i, choice) in choices.iter().enumerate() {
            if i > 0 {
                code.append_inline("|");
            }
            code.concat(&self.render(choice, entity)?, false);
        }
        code.append_inline(")");
        Ok(code)
    }

    /// A multi-line record annotation, one field per line:
    ///
    /// ```text
    /// {
    ///   foo: (boolean|undefined),
    ///   bar: number
    /// }
    /// ```
    ///
    /// # Errors
    /// Returns `ModelError::EmptyObject` if `properties` is empty.
    pub fn object_definition(
        &self,
        properties: &[Property],
        entity: &str,
    ) -> Result<Code, ModelError> {
        if properties.is_empty() {
            return Err(ModelError::EmptyObject {
                namespace: self.namespace.to_string(),
                entity: entity.to_string(),
            });
        }
        let mut code = Code::new();
        code.braced::<ModelError>(|c| {
            for (i, property) in properties.iter().enumerate() {
                if i > 0 {
                    c.append_inline(",");
                }
                let path = format!("{entity}.{}", property.name);
                let field =
                    self.render_slot(&property.ty, property.optional, Slot::Field, &path)?;
                c.append(&format!("{}: ", property.name));
                c.concat(&field, false);
            }
            Ok(())
        })?;
        Ok(code)
    }

    /// `function(A, B):R`, with `void` when nothing is returned.
    ///
    /// # Errors
    /// Propagates errors from rendering the parameters and return type.
    pub fn function_type(&self, function: &Function, entity: &str) -> Result<Code, ModelError> {
        let path = format!("{entity}.{}", function.name);
        let mut code = Code::line("function(");
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                code.append_inline(", ");
            }
            let rendered = self.render_slot(
                &param.ty,
                param.optional,
                Slot::CallbackParam,
                &format!("{path}.{}", param.name),
            )?;
            code.concat(&rendered, false);
        }
        code.append_inline("):");
        match &function.returns {
            Some(returns) => {
                code.concat(&self.render(&returns.ty, &path)?, false);
            }
            None => {
                code.append_inline("void");
            }
        }
        Ok(code)
    }

    fn check_reference(&self, name: &str, entity: &str) -> Result<(), ModelError> {
        let well_formed = !name.is_empty()
            && name
                .split('.')
                .all(|segment| !segment.is_empty() && !segment.contains(char::is_whitespace));
        if well_formed {
            Ok(())
        } else {
            Err(ModelError::MalformedReference {
                namespace: self.namespace.to_string(),
                entity: entity.to_string(),
                reference: name.to_string(),
            })
        }
    }
}
