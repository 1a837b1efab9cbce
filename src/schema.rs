//! JSON schema front end.
//!
//! A schema document is a JSON array of namespace objects, optionally
//! annotated with comments. This module deserializes the document into plain
//! serde structs and lowers them into the [`crate::model`] graph.

use crate::comments::strip_comments;
use crate::error::SchemaError;
use crate::model::{
    EnumValue, Event, Function, Namespace, Property, PropertyType, Record, ReturnValue, Type,
    TypeDef, TypeDefKind,
};
use crate::utils::byte_offset;
use log::debug;
use miette::NamedSource;
use serde::de::{self, Deserializer, MapAccess, Unexpected, Visitor};
use serde::Deserialize;
use std::fmt;

// --- Raw document structs ---

#[derive(Debug, Deserialize)]
struct NamespaceSchema {
    namespace: Option<String>,
    description: Option<String>,
    #[serde(default)]
    types: Vec<SchemaNode>,
    #[serde(default)]
    functions: Vec<SchemaNode>,
    #[serde(default)]
    events: Vec<SchemaNode>,
}

/// Any node of the schema: a type definition, a property, a parameter, a
/// function or an event. Keys that the generator has no use for are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaNode {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    type_name: Option<String>,
    #[serde(rename = "$ref")]
    reference: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    optional: bool,
    #[serde(default, deserialize_with = "flag")]
    nullable: bool,
    #[serde(default, deserialize_with = "message")]
    deprecated: Option<String>,
    jsexterns: Option<String>,
    #[serde(rename = "enum")]
    enum_values: Option<Vec<EnumEntry>>,
    #[serde(default, deserialize_with = "ordered_properties")]
    properties: Option<Vec<(String, SchemaNode)>>,
    additional_properties: Option<serde_json::Value>,
    items: Option<Box<SchemaNode>>,
    choices: Option<Vec<SchemaNode>>,
    parameters: Option<Vec<SchemaNode>>,
    returns: Option<Box<SchemaNode>>,
    functions: Option<Vec<SchemaNode>>,
}

impl SchemaNode {
    fn is_object(&self) -> bool {
        match self.type_name.as_deref() {
            Some(type_name) => type_name == "object",
            None => {
                self.properties.is_some()
                    || self.additional_properties.is_some()
                    || self.functions.is_some()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnumEntry {
    Name(String),
    Described {
        name: String,
        description: Option<String>,
    },
}

/// Accepts `true`/`false` as well as the strings `"true"`/`"false"`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(de::Error::invalid_value(
                Unexpected::Str(other),
                &"a boolean",
            )),
        },
    }
}

/// A deprecation marker: either a message or a bare `true`.
fn message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Message {
        Text(String),
        Flag(bool),
    }

    Ok(match Option::<Message>::deserialize(deserializer)? {
        Some(Message::Text(text)) => Some(text),
        Some(Message::Flag(true)) => Some(String::new()),
        Some(Message::Flag(false)) | None => None,
    })
}

/// Deserializes an object into a list of entries in document order.
fn ordered_properties<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<(String, SchemaNode)>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PropertiesVisitor;

    impl<'de> Visitor<'de> for PropertiesVisitor {
        type Value = Vec<(String, SchemaNode)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object mapping property names to schemas")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut properties = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, node)) = map.next_entry::<String, SchemaNode>()? {
                properties.push((name, node));
            }
            Ok(properties)
        }
    }

    deserializer.deserialize_map(PropertiesVisitor).map(Some)
}

// --- Entry point ---

/// Parses a JSON schema document into its namespaces.
///
/// # Errors
/// Returns a `SchemaError` if the text is not valid commented JSON, is not
/// an array of namespaces, or uses a node the model cannot represent.
pub fn parse_schema(source: &str, file_name: &str) -> Result<Vec<Namespace>, SchemaError> {
    let stripped = strip_comments(source, file_name)?;
    if !stripped.trim_start().starts_with('[') {
        return Err(SchemaError::NotAnArray {
            file: file_name.to_string(),
        });
    }

    let documents: Vec<NamespaceSchema> =
        serde_json::from_str(&stripped).map_err(|err| SchemaError::Syntax {
            src: NamedSource::new(file_name, source.to_string()),
            span: (byte_offset(source, err.line(), err.column()), 0).into(),
            message: err.to_string(),
        })?;
    if documents.is_empty() {
        return Err(SchemaError::NoNamespaces {
            file: file_name.to_string(),
        });
    }

    let namespaces = documents
        .into_iter()
        .map(|document| lower_namespace(document, file_name))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        "Parsed {} namespace(s) from `{}`",
        namespaces.len(),
        file_name
    );
    Ok(namespaces)
}

// --- Lowering into the model ---

fn required<'n>(
    value: &'n Option<String>,
    entity: &str,
    field: &'static str,
) -> Result<&'n str, SchemaError> {
    value.as_deref().ok_or_else(|| SchemaError::MissingField {
        entity: entity.to_string(),
        field,
    })
}

fn lower_namespace(document: NamespaceSchema, file_name: &str) -> Result<Namespace, SchemaError> {
    let name = required(&document.namespace, file_name, "namespace")?.to_string();

    let types = document
        .types
        .iter()
        .map(|node| lower_type_def(node, &name))
        .collect::<Result<Vec<_>, _>>()?;
    let functions = document
        .functions
        .iter()
        .map(|node| {
            let function_name = required(&node.name, &format!("{name}.functions"), "name")?;
            lower_function(node, function_name, &name)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let events = document
        .events
        .iter()
        .map(|node| lower_event(node, &name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Namespace {
        name,
        description: document.description,
        source_file: file_name.to_string(),
        types,
        functions,
        events,
    })
}

fn lower_type_def(node: &SchemaNode, namespace: &str) -> Result<TypeDef, SchemaError> {
    let name = required(&node.id, &format!("{namespace}.types"), "id")?;
    let entity = format!("{namespace}.{name}");

    let kind = if let Some(entries) = &node.enum_values {
        if let Some(type_name) = node.type_name.as_deref().filter(|t| *t != "string") {
            return Err(SchemaError::InvalidNode {
                entity,
                message: format!("enum values require type `string`, found `{type_name}`"),
            });
        }
        TypeDefKind::Enum {
            values: entries.iter().map(lower_enum_entry).collect(),
        }
    } else if let Some(choices) = &node.choices {
        TypeDefKind::Choice {
            choices: lower_types(choices, &entity)?,
        }
    } else if node.reference.is_none() && node.is_object() {
        let record = Record {
            properties: lower_properties(node.properties.as_deref(), &entity)?,
            functions: lower_methods(node.functions.as_deref(), &entity)?,
        };
        if record.properties.is_empty() && record.functions.is_empty() {
            TypeDefKind::Alias {
                target: Type {
                    kind: PropertyType::Object,
                    nullable: node.nullable,
                },
            }
        } else {
            TypeDefKind::Record(record)
        }
    } else {
        TypeDefKind::Alias {
            target: lower_type(node, &entity)?,
        }
    };

    Ok(TypeDef {
        name: name.to_string(),
        description: node.description.clone(),
        deprecated: node.deprecated.clone(),
        kind,
    })
}

fn lower_enum_entry(entry: &EnumEntry) -> EnumValue {
    match entry {
        EnumEntry::Name(name) => EnumValue::new(name.as_str()),
        EnumEntry::Described { name, description } => EnumValue {
            name: name.clone(),
            description: description.clone(),
        },
    }
}

fn lower_types(nodes: &[SchemaNode], entity: &str) -> Result<Vec<Type>, SchemaError> {
    nodes.iter().map(|node| lower_type(node, entity)).collect()
}

fn lower_properties(
    properties: Option<&[(String, SchemaNode)]>,
    entity: &str,
) -> Result<Vec<Property>, SchemaError> {
    properties
        .unwrap_or_default()
        .iter()
        .map(|(name, node)| lower_property(name, node, entity))
        .collect()
}

fn lower_methods(functions: Option<&[SchemaNode]>, entity: &str) -> Result<Vec<Function>, SchemaError> {
    functions
        .unwrap_or_default()
        .iter()
        .map(|node| {
            let name = required(&node.name, &format!("{entity}.functions"), "name")?;
            lower_function(node, name, entity)
        })
        .collect()
}

fn lower_property(name: &str, node: &SchemaNode, parent: &str) -> Result<Property, SchemaError> {
    let entity = format!("{parent}.{name}");
    Ok(Property {
        name: name.to_string(),
        ty: lower_type(node, &entity)?,
        optional: node.optional,
        description: node.description.clone(),
        jsexterns: node.jsexterns.clone(),
    })
}

fn lower_parameters(nodes: Option<&[SchemaNode]>, entity: &str) -> Result<Vec<Property>, SchemaError> {
    nodes
        .unwrap_or_default()
        .iter()
        .map(|node| {
            let name = required(&node.name, &format!("{entity}.parameters"), "name")?;
            lower_property(name, node, entity)
        })
        .collect()
}

fn lower_function(node: &SchemaNode, name: &str, parent: &str) -> Result<Function, SchemaError> {
    let entity = format!("{parent}.{name}");
    let returns = match &node.returns {
        Some(returns) => Some(ReturnValue {
            ty: lower_type(returns, &format!("{entity}.returns"))?,
            description: returns.description.clone(),
        }),
        None => None,
    };
    Ok(Function {
        name: name.to_string(),
        params: lower_parameters(node.parameters.as_deref(), &entity)?,
        returns,
        description: node.description.clone(),
        deprecated: node.deprecated.clone(),
    })
}

fn lower_event(node: &SchemaNode, namespace: &str) -> Result<Event, SchemaError> {
    let name = required(&node.name, &format!("{namespace}.events"), "name")?;
    let entity = format!("{namespace}.{name}");
    Ok(Event {
        name: name.to_string(),
        params: lower_parameters(node.parameters.as_deref(), &entity)?,
        description: node.description.clone(),
        deprecated: node.deprecated.clone(),
    })
}

fn lower_type(node: &SchemaNode, entity: &str) -> Result<Type, SchemaError> {
    let kind = if let Some(reference) = &node.reference {
        PropertyType::Ref(reference.clone())
    } else if let Some(choices) = &node.choices {
        PropertyType::Choices(lower_types(choices, entity)?)
    } else {
        match node.type_name.as_deref() {
            // Inline string enums have no named type to refer to.
            Some("string") => PropertyType::String,
            Some("integer") => PropertyType::Integer,
            Some("number" | "double") => PropertyType::Number,
            Some("boolean") => PropertyType::Boolean,
            Some("any") => PropertyType::Any,
            Some("binary") => PropertyType::Binary,
            Some("array") => {
                let items = node.items.as_deref().ok_or_else(|| SchemaError::MissingField {
                    entity: entity.to_string(),
                    field: "items",
                })?;
                PropertyType::Array(Box::new(lower_type(items, &format!("{entity}[]"))?))
            }
            Some("function") => {
                let (parent, slot_name) = entity.rsplit_once('.').unwrap_or(("", entity));
                let name = node.name.as_deref().unwrap_or(slot_name);
                PropertyType::Function(Box::new(lower_function(node, name, parent)?))
            }
            Some("object") | None if node.is_object() => {
                let properties = lower_properties(node.properties.as_deref(), entity)?;
                if properties.is_empty() {
                    PropertyType::Object
                } else {
                    PropertyType::InlineObject(properties)
                }
            }
            Some(other) => {
                return Err(SchemaError::UnknownType {
                    entity: entity.to_string(),
                    type_name: other.to_string(),
                })
            }
            None => {
                return Err(SchemaError::MissingField {
                    entity: entity.to_string(),
                    field: "type",
                })
            }
        }
    };
    Ok(Type {
        kind,
        nullable: node.nullable,
    })
}
