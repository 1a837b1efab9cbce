use serde::Serialize;

/// One API namespace, as produced by a schema front end.
///
/// The generator only ever reads this graph; it is built once per schema
/// document and handed over as an immutable snapshot.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Namespace {
    pub name: String,
    pub description: Option<String>,
    pub source_file: String,
    pub types: Vec<TypeDef>,
    pub functions: Vec<Function>,
    pub events: Vec<Event>,
}

impl Namespace {
    pub fn new(name: impl Into<String>, source_file: impl Into<String>) -> Self {
        Namespace {
            name: name.into(),
            description: None,
            source_file: source_file.into(),
            types: Vec::new(),
            functions: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn find_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }
}

// --- Top-level type definitions ---

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct TypeDef {
    pub name: String,
    pub description: Option<String>,
    pub deprecated: Option<String>,
    pub kind: TypeDefKind,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDefKind {
    Enum { values: Vec<EnumValue> },
    Record(Record),
    Choice { choices: Vec<Type> },
    /// A named alias for any other type use, e.g. a top-level array.
    Alias { target: Type },
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
}

impl EnumValue {
    pub fn new(name: impl Into<String>) -> Self {
        EnumValue {
            name: name.into(),
            description: None,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Record {
    pub properties: Vec<Property>,
    pub functions: Vec<Function>,
}

impl Record {
    /// Records that declare methods are emitted as constructors rather than typedefs.
    pub fn is_constructor(&self) -> bool {
        !self.functions.is_empty()
    }
}

// --- Type uses ---

/// A named slot holding a type: a record field or a function parameter.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub optional: bool,
    pub description: Option<String>,
    /// Literal annotation that replaces the generated `@type` line.
    pub jsexterns: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Property {
            name: name.into(),
            ty,
            optional: false,
            description: None,
            jsexterns: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A type use: a `PropertyType` plus its nullability.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Type {
    pub kind: PropertyType,
    pub nullable: bool,
}

impl Type {
    pub fn new(kind: PropertyType) -> Self {
        Type {
            kind,
            nullable: false,
        }
    }

    pub fn nullable(kind: PropertyType) -> Self {
        Type {
            kind,
            nullable: true,
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Type::new(PropertyType::Ref(name.into()))
    }

    pub fn array_of(item: Type) -> Self {
        Type::new(PropertyType::Array(Box::new(item)))
    }
}

impl From<PropertyType> for Type {
    fn from(kind: PropertyType) -> Self {
        Type::new(kind)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "type", content = "of", rename_all = "snake_case")]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
    Any,
    Binary,
    /// An object with no declared shape.
    Object,
    /// An anonymous object whose fields are rendered inline.
    InlineObject(Vec<Property>),
    Array(Box<Type>),
    /// A named type, either local (`Foo`) or namespace-qualified (`tabs.Tab`).
    Ref(String),
    Choices(Vec<Type>),
    Function(Box<Function>),
}

// --- Functions and events ---

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Property>,
    pub returns: Option<ReturnValue>,
    pub description: Option<String>,
    pub deprecated: Option<String>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Function {
            name: name.into(),
            params: Vec::new(),
            returns: None,
            description: None,
            deprecated: None,
        }
    }

    pub fn with_params(mut self, params: Vec<Property>) -> Self {
        self.params = params;
        self
    }

    pub fn with_returns(mut self, ty: Type) -> Self {
        self.returns = Some(ReturnValue {
            ty,
            description: None,
        });
        self
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ReturnValue {
    #[serde(rename = "type")]
    pub ty: Type,
    pub description: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Event {
    pub name: String,
    pub params: Vec<Property>,
    pub description: Option<String>,
    pub deprecated: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Event {
            name: name.into(),
            params: Vec::new(),
            description: None,
            deprecated: None,
        }
    }
}
