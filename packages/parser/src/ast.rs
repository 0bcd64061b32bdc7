use serde::{Deserialize, Serialize};

/// Span information for source location tracking
///
/// `synthetic` spans belong to nodes created after parsing; they have no
/// source text and are always re-serialized by the printer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub id: String,
    #[serde(default)]
    pub synthetic: bool,
}

impl Span {
    pub fn new(start: usize, end: usize, id: String) -> Self {
        Self {
            start,
            end,
            id,
            synthetic: false,
        }
    }

    pub fn synthetic(id: String) -> Self {
        Self {
            start: 0,
            end: 0,
            id,
            synthetic: true,
        }
    }
}

/// Root document node: top-level elements, separated by whitespace and comments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub elements: Vec<Element>,
    pub span: Span,
}

/// Child of an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Element(Element),
    Text(Text),
    Expression(ExpressionContainer),
}

/// Markup element (`<div ...>...</div>` or `<input ... />`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    pub self_closing: bool,
    pub span: Span,
    /// Offset just past the tag name in the opening tag
    pub name_end: usize,
    /// Offset just past the `>` / `/>` of the opening tag
    pub opening_end: usize,
    /// Offset of the `</` of the closing tag; `None` when written self-closing
    pub closing_start: Option<usize>,
}

/// Raw JSX text, whitespace included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
    pub span: Span,
}

/// `{ expression }`; the span includes the braces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionContainer {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Attribute {
    Named(NamedAttribute),
    /// `{...props}`, kept verbatim
    Spread(Opaque),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedAttribute {
    pub name: String,
    pub value: Option<AttributeValue>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttributeValue {
    Literal(StringLiteral),
    Expression(ExpressionContainer),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    Object(ObjectLiteral),
    String(StringLiteral),
    /// Any other expression; the engine never looks inside it
    Opaque(Opaque),
}

/// String literal; `value` is decoded, `quote` is the delimiter used in source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
    pub quote: char,
    pub span: Span,
}

/// Source kept as written. `elements` holds the markup embedded in it
/// (`{items.map(i => <li>{i}</li>)}`), in source order, with spans into the
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opaque {
    pub source: String,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<Element>,
}

/// `{ key: value, ... }`; the span includes the braces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectLiteral {
    pub properties: Vec<Property>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Property {
    KeyValue(KeyValue),
    /// Spread, shorthand, method or computed entries
    Opaque(Opaque),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: PropertyKey,
    pub value: Expression,
    pub span: Span,
}

/// Property key; `quote` is `Some` for string-literal keys like `'font-size'`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyKey {
    pub name: String,
    pub quote: Option<char>,
    pub span: Span,
}

impl Document {
    pub fn new(span: Span) -> Self {
        Self {
            elements: Vec::new(),
            span,
        }
    }

    /// Follow an element path: the first step indexes `elements`, the rest
    /// index [`Element::nested_elements`].
    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        let mut current = self.elements.get(*first)?;
        for step in rest {
            current = current.nested_elements().into_iter().nth(*step)?;
        }
        Some(current)
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let (first, rest) = path.split_first()?;
        let mut current = self.elements.get_mut(*first)?;
        for step in rest {
            current = current.nested_elements_mut().into_iter().nth(*step)?;
        }
        Some(current)
    }
}

impl Node {
    pub fn span(&self) -> &Span {
        match self {
            Node::Element(e) => &e.span,
            Node::Text(t) => &t.span,
            Node::Expression(c) => &c.span,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl Element {
    /// First named attribute called `name`
    pub fn attribute(&self, name: &str) -> Option<&NamedAttribute> {
        self.attributes.iter().find_map(|attr| match attr {
            Attribute::Named(named) if named.name == name => Some(named),
            _ => None,
        })
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut NamedAttribute> {
        self.attributes.iter_mut().find_map(|attr| match attr {
            Attribute::Named(named) if named.name == name => Some(named),
            _ => None,
        })
    }

    /// Elements one level down, in source order: markup embedded in attribute
    /// expressions, then child elements and markup embedded in child expressions.
    pub fn nested_elements(&self) -> Vec<&Element> {
        let mut nested = Vec::new();
        for attribute in &self.attributes {
            match attribute {
                Attribute::Named(NamedAttribute {
                    value: Some(AttributeValue::Expression(container)),
                    ..
                }) => container.expression.collect_elements(&mut nested),
                Attribute::Spread(spread) => nested.extend(spread.elements.iter()),
                Attribute::Named(_) => {}
            }
        }
        for child in &self.children {
            match child {
                Node::Element(element) => nested.push(element),
                Node::Expression(container) => container.expression.collect_elements(&mut nested),
                Node::Text(_) => {}
            }
        }
        nested
    }

    pub fn nested_elements_mut(&mut self) -> Vec<&mut Element> {
        let mut nested = Vec::new();
        for attribute in &mut self.attributes {
            match attribute {
                Attribute::Named(NamedAttribute {
                    value: Some(AttributeValue::Expression(container)),
                    ..
                }) => container.expression.collect_elements_mut(&mut nested),
                Attribute::Spread(spread) => nested.extend(spread.elements.iter_mut()),
                Attribute::Named(_) => {}
            }
        }
        for child in &mut self.children {
            match child {
                Node::Element(element) => nested.push(element),
                Node::Expression(container) => container.expression.collect_elements_mut(&mut nested),
                Node::Text(_) => {}
            }
        }
        nested
    }

    /// Whether the element was written as `<tag />` in the parsed source
    pub fn written_self_closing(&self) -> bool {
        !self.span.synthetic && self.closing_start.is_none()
    }
}

impl Attribute {
    pub fn span(&self) -> &Span {
        match self {
            Attribute::Named(named) => &named.span,
            Attribute::Spread(spread) => &spread.span,
        }
    }
}

impl NamedAttribute {
    /// Literal value of the attribute: `name="v"` or `name={"v"}`
    pub fn literal_value(&self) -> Option<&str> {
        match &self.value {
            Some(AttributeValue::Literal(lit)) => Some(&lit.value),
            Some(AttributeValue::Expression(container)) => match &container.expression {
                Expression::String(lit) => Some(&lit.value),
                _ => None,
            },
            None => None,
        }
    }
}

impl AttributeValue {
    pub fn span(&self) -> &Span {
        match self {
            AttributeValue::Literal(lit) => &lit.span,
            AttributeValue::Expression(container) => &container.span,
        }
    }
}

impl Expression {
    pub fn span(&self) -> &Span {
        match self {
            Expression::Object(obj) => &obj.span,
            Expression::String(lit) => &lit.span,
            Expression::Opaque(opaque) => &opaque.span,
        }
    }

    fn collect_elements<'a>(&'a self, out: &mut Vec<&'a Element>) {
        match self {
            Expression::Object(object) => {
                for property in &object.properties {
                    match property {
                        Property::KeyValue(kv) => kv.value.collect_elements(out),
                        Property::Opaque(opaque) => out.extend(opaque.elements.iter()),
                    }
                }
            }
            Expression::String(_) => {}
            Expression::Opaque(opaque) => out.extend(opaque.elements.iter()),
        }
    }

    fn collect_elements_mut<'a>(&'a mut self, out: &mut Vec<&'a mut Element>) {
        match self {
            Expression::Object(object) => {
                for property in &mut object.properties {
                    match property {
                        Property::KeyValue(kv) => kv.value.collect_elements_mut(out),
                        Property::Opaque(opaque) => out.extend(opaque.elements.iter_mut()),
                    }
                }
            }
            Expression::String(_) => {}
            Expression::Opaque(opaque) => out.extend(opaque.elements.iter_mut()),
        }
    }

    /// Value as a style would read it: decoded string literals, source text otherwise
    pub fn as_style_value(&self) -> Option<String> {
        match self {
            Expression::String(lit) => Some(lit.value.clone()),
            Expression::Opaque(opaque) => Some(opaque.source.clone()),
            Expression::Object(_) => None,
        }
    }
}

impl Property {
    pub fn span(&self) -> &Span {
        match self {
            Property::KeyValue(kv) => &kv.span,
            Property::Opaque(opaque) => &opaque.span,
        }
    }
}
