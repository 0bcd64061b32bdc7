use crate::ast::*;

/// Serializer converts AST back to markup source
///
/// Every node is printed from its fields alone, spans are ignored. The lossless
/// printer falls back to these functions for nodes created or replaced after
/// parsing; a whole document printed this way is normalized but re-parseable.
pub struct Serializer {
    output: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// Serialize a Document to source code
    pub fn serialize(mut self, doc: &Document) -> String {
        for (i, element) in doc.elements.iter().enumerate() {
            if i > 0 {
                self.output.push('\n');
            }
            write_element(element, &mut self.output);
        }
        self.output
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}

pub fn serialize_element(element: &Element) -> String {
    let mut output = String::new();
    write_element(element, &mut output);
    output
}

pub fn write_element(element: &Element, output: &mut String) {
    output.push('<');
    output.push_str(&element.name);
    for attribute in &element.attributes {
        output.push(' ');
        write_attribute(attribute, output);
    }

    if element.self_closing && element.children.is_empty() {
        output.push_str(" />");
        return;
    }

    output.push('>');
    for child in &element.children {
        write_node(child, output);
    }
    output.push_str("</");
    output.push_str(&element.name);
    output.push('>');
}

pub fn write_node(node: &Node, output: &mut String) {
    match node {
        Node::Element(element) => write_element(element, output),
        Node::Text(text) => output.push_str(&text.value),
        Node::Expression(container) => write_container(container, output),
    }
}

pub fn write_attribute(attribute: &Attribute, output: &mut String) {
    match attribute {
        Attribute::Named(named) => {
            output.push_str(&named.name);
            if let Some(value) = &named.value {
                output.push('=');
                write_attribute_value(value, output);
            }
        }
        Attribute::Spread(spread) => write_opaque(spread, output),
    }
}

/// JSX attribute strings have no escapes: switch quotes if needed, or fall
/// back to an expression container when the value holds both.
pub fn write_attribute_value(value: &AttributeValue, output: &mut String) {
    match value {
        AttributeValue::Literal(literal) => {
            let other = if literal.quote == '\'' { '"' } else { '\'' };
            let quote = if !literal.value.contains(literal.quote) {
                Some(literal.quote)
            } else if !literal.value.contains(other) {
                Some(other)
            } else {
                None
            };

            match quote {
                Some(quote) => {
                    output.push(quote);
                    output.push_str(&literal.value);
                    output.push(quote);
                }
                None => {
                    output.push('{');
                    write_js_string(&literal.value, '"', output);
                    output.push('}');
                }
            }
        }
        AttributeValue::Expression(container) => write_container(container, output),
    }
}

pub fn write_container(container: &ExpressionContainer, output: &mut String) {
    output.push('{');
    write_expression(&container.expression, output);
    output.push('}');
}

pub fn write_expression(expression: &Expression, output: &mut String) {
    match expression {
        Expression::Object(object) => write_object(object, output),
        Expression::String(literal) => write_js_string(&literal.value, literal.quote, output),
        Expression::Opaque(opaque) => write_opaque(opaque, output),
    }
}

/// Opaque source with the markup embedded in it printed from the tree
pub fn write_opaque(opaque: &Opaque, output: &mut String) {
    let base = opaque.span.start;
    let mut cursor = 0;
    for element in opaque.elements.iter().filter(|e| !e.span.synthetic) {
        let start = element.span.start.saturating_sub(base);
        if let Some(between) = opaque.source.get(cursor..start) {
            output.push_str(between);
            write_element(element, output);
            cursor = element.span.end.saturating_sub(base);
        }
    }
    output.push_str(opaque.source.get(cursor..).unwrap_or(""));
}

pub fn write_object(object: &ObjectLiteral, output: &mut String) {
    if object.properties.is_empty() {
        output.push_str("{}");
        return;
    }

    output.push_str("{ ");
    for (i, property) in object.properties.iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        write_property(property, output);
    }
    output.push_str(" }");
}

pub fn write_property(property: &Property, output: &mut String) {
    match property {
        Property::KeyValue(kv) => {
            match kv.key.quote {
                Some(quote) => write_js_string(&kv.key.name, quote, output),
                None => output.push_str(&kv.key.name),
            }
            output.push_str(": ");
            write_expression(&kv.value, output);
        }
        Property::Opaque(opaque) => write_opaque(opaque, output),
    }
}

/// JavaScript string literal with the given quote character
pub fn write_js_string(value: &str, quote: char, output: &mut String) {
    output.push(quote);
    for c in value.chars() {
        match c {
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c == quote => {
                output.push('\\');
                output.push(c);
            }
            c if c.is_control() => output.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => output.push(c),
        }
    }
    output.push(quote);
}

/// Whether `name` can be written as a bare object key
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
