//! # Element Mutations
//!
//! Targeted edits addressed by element identifier.
//!
//! ## Mutation Semantics
//!
//! ### UpdateText
//! - Replaces the element's entire children list with one text node
//! - Nested elements are discarded (and leave the index)
//! - A self-closing element becomes an open/close pair
//!
//! ### SetInlineStyle
//! - Upsert into the `style={{ ... }}` object literal, created when absent
//! - Property names are normalized to camelCase before matching, so
//!   `font-size` and `fontSize` address the same entry
//! - An existing entry is overwritten in place; a new entry is appended
//!
//! Mutations never touch the printed text directly. They replace tree nodes
//! with synthetic ones and leave the re-print to the owning document.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use visedit_common::{normalize_property_name, StyleMap};
use visedit_parser::ast::*;
use visedit_parser::serializer::is_identifier;
use visedit_parser::IDGenerator;

/// Semantic mutations on a single element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Replace the element's children with a text node
    UpdateText { uid: String, content: String },

    /// Set one inline style property
    SetInlineStyle {
        uid: String,
        property: String,
        value: String,
    },
}

impl Mutation {
    pub fn uid(&self) -> &str {
        match self {
            Mutation::UpdateText { uid, .. } | Mutation::SetInlineStyle { uid, .. } => uid,
        }
    }

    /// Check the mutation can be applied to `element` without changing anything
    pub fn validate(&self, element: &Element) -> Result<(), MutationError> {
        match self {
            Mutation::UpdateText { .. } => Ok(()),
            Mutation::SetInlineStyle { uid, .. } => match element.attribute("style") {
                None => Ok(()),
                Some(attr) if style_object(attr).is_some() => Ok(()),
                Some(_) => Err(MutationError::StyleNotObjectLiteral { uid: uid.clone() }),
            },
        }
    }

    /// Apply to `element`; span ids for new nodes come from `ids`
    pub fn apply(&self, element: &mut Element, ids: &mut IDGenerator) -> Result<(), MutationError> {
        self.validate(element)?;

        match self {
            Mutation::UpdateText { content, .. } => {
                apply_update_text(element, content, ids);
                Ok(())
            }
            Mutation::SetInlineStyle {
                uid,
                property,
                value,
            } => apply_set_style(element, uid, property, value, ids),
        }
    }
}

/// Partial update of one element: `{ text?, style? }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "StyleMap::is_empty")]
    pub style: StyleMap,
}

impl ElementUpdate {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            style: StyleMap::new(),
        }
    }

    pub fn style<K: AsRef<str>, V: Into<String>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            text: None,
            style: entries.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.style.is_empty()
    }

    /// Text replacement first, then one style upsert per property in order
    pub fn to_mutations(&self, uid: &str) -> Vec<Mutation> {
        let mut mutations = Vec::new();
        if let Some(content) = &self.text {
            mutations.push(Mutation::UpdateText {
                uid: uid.to_string(),
                content: content.clone(),
            });
        }
        for (property, value) in self.style.iter() {
            mutations.push(Mutation::SetInlineStyle {
                uid: uid.to_string(),
                property: property.to_string(),
                value: value.to_string(),
            });
        }
        mutations
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Element {uid} has a style attribute that is not an object literal")]
    StyleNotObjectLiteral { uid: String },
}

/// Outcome of applying an update to a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MutationResult {
    Applied { version: u64 },
    Noop { reason: String },
}

impl MutationResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationResult::Applied { .. })
    }
}

fn apply_update_text(element: &mut Element, content: &str, ids: &mut IDGenerator) {
    // JSX text cannot hold these; emit a string expression instead
    let child = if content.contains(['{', '}', '<', '>']) {
        Node::Expression(ExpressionContainer {
            expression: Expression::String(StringLiteral {
                value: content.to_string(),
                quote: '"',
                span: Span::synthetic(ids.new_id()),
            }),
            span: Span::synthetic(ids.new_id()),
        })
    } else {
        Node::Text(Text {
            value: content.to_string(),
            span: Span::synthetic(ids.new_id()),
        })
    };

    element.children = vec![child];
    element.self_closing = false;
}

fn apply_set_style(
    element: &mut Element,
    uid: &str,
    property: &str,
    value: &str,
    ids: &mut IDGenerator,
) -> Result<(), MutationError> {
    if element.attribute("style").is_none() {
        element.attributes.push(Attribute::Named(NamedAttribute {
            name: "style".to_string(),
            value: Some(AttributeValue::Expression(ExpressionContainer {
                expression: Expression::Object(ObjectLiteral {
                    properties: Vec::new(),
                    span: Span::synthetic(ids.new_id()),
                }),
                span: Span::synthetic(ids.new_id()),
            })),
            span: Span::synthetic(ids.new_id()),
        }));
    }

    let object = element
        .attribute_mut("style")
        .and_then(style_object_mut)
        .ok_or_else(|| MutationError::StyleNotObjectLiteral {
            uid: uid.to_string(),
        })?;

    let key = normalize_property_name(property);
    let quote = value_quote(object);

    let existing = object.properties.iter_mut().find_map(|p| match p {
        Property::KeyValue(kv) if normalize_property_name(&kv.key.name) == key => Some(kv),
        _ => None,
    });

    match existing {
        Some(kv) => {
            let quote = match &kv.value {
                // Same value already written: leave the source alone
                Expression::String(literal) if literal.value == value => return Ok(()),
                Expression::String(literal) => literal.quote,
                _ => quote,
            };
            kv.value = Expression::String(StringLiteral {
                value: value.to_string(),
                quote,
                span: Span::synthetic(ids.new_id()),
            });
        }
        None => {
            let key_quote = if is_identifier(&key) { None } else { Some('\'') };
            object.properties.push(Property::KeyValue(KeyValue {
                key: PropertyKey {
                    name: key,
                    quote: key_quote,
                    span: Span::synthetic(ids.new_id()),
                },
                value: Expression::String(StringLiteral {
                    value: value.to_string(),
                    quote,
                    span: Span::synthetic(ids.new_id()),
                }),
                span: Span::synthetic(ids.new_id()),
            }));
        }
    }

    Ok(())
}

fn style_object(attr: &NamedAttribute) -> Option<&ObjectLiteral> {
    match &attr.value {
        Some(AttributeValue::Expression(ExpressionContainer {
            expression: Expression::Object(object),
            ..
        })) => Some(object),
        _ => None,
    }
}

fn style_object_mut(attr: &mut NamedAttribute) -> Option<&mut ObjectLiteral> {
    match &mut attr.value {
        Some(AttributeValue::Expression(ExpressionContainer {
            expression: Expression::Object(object),
            ..
        })) => Some(object),
        _ => None,
    }
}

/// Quote used by the object's existing string values, double by default
fn value_quote(object: &ObjectLiteral) -> char {
    object
        .properties
        .iter()
        .find_map(|p| match p {
            Property::KeyValue(KeyValue {
                value: Expression::String(literal),
                ..
            }) => Some(literal.quote),
            _ => None,
        })
        .unwrap_or('"')
}

/// Inline style of an element as an ordered, normalized map.
///
/// `None` when the style attribute is not an object literal; entries whose
/// value is a nested object are skipped.
pub fn inline_style(element: &Element) -> Option<StyleMap> {
    let attr = match element.attribute("style") {
        Some(attr) => attr,
        None => return Some(StyleMap::new()),
    };

    let object = style_object(attr)?;
    let mut styles = StyleMap::new();
    for property in &object.properties {
        if let Property::KeyValue(kv) = property {
            if let Some(value) = kv.value.as_style_value() {
                styles.insert(&kv.key.name, value);
            }
        }
    }
    Some(styles)
}

/// Text content shown in property panels: the first child's text, or empty
pub fn text_content(element: &Element) -> String {
    match element.children.first() {
        Some(Node::Text(text)) => text.value.clone(),
        Some(Node::Expression(ExpressionContainer {
            expression: Expression::String(literal),
            ..
        })) => literal.value.clone(),
        _ => String::new(),
    }
}
