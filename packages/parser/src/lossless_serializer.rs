use crate::ast::*;
use crate::serializer;

/// Lossless serializer that preserves original formatting using spans
///
/// Enables minimal-diff editing:
/// 1. Parse source → AST with spans
/// 2. Edit AST (replace values, append attributes or properties)
/// 3. Serialize → everything the edit did not touch is byte-identical
///
/// Strategy:
/// - Untouched nodes are copied from the original source verbatim
/// - Synthetic nodes (created after parsing) are re-serialized from their fields
/// - Untouched nodes with changed descendants are stitched together from the
///   original source between their parts plus their re-printed parts
/// - Opaque expressions are stitched around the markup embedded in them
pub struct LosslessSerializer<'a> {
    source: &'a str,
}

impl<'a> LosslessSerializer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Serialize document with span-based preservation
    pub fn serialize(&self, doc: &Document) -> String {
        let mut output = String::with_capacity(self.source.len());
        let mut last_end = 0;

        for element in &doc.elements {
            if element.span.synthetic {
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                serializer::write_element(element, &mut output);
                continue;
            }

            // Whitespace and comments between top-level elements
            output.push_str(self.slice(last_end, element.span.start));
            self.write_element(element, &mut output);
            last_end = element.span.end;
        }

        output.push_str(self.slice(last_end, self.source.len()));
        output
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or("")
    }

    fn is_fresh(&self, span: &Span) -> bool {
        span.synthetic
    }

    fn write_element(&self, element: &Element, output: &mut String) {
        if self.is_fresh(&element.span) {
            serializer::write_element(element, output);
            return;
        }
        if !self.element_changed(element) {
            output.push_str(self.slice(element.span.start, element.span.end));
            return;
        }

        // Opening tag: `<name`, attributes with their original gaps, then `>` / `/>`
        output.push_str(self.slice(element.span.start, element.name_end));
        let attributes_end = self.write_attributes(element, output);
        let tail = self.slice(attributes_end, element.opening_end);

        let gains_children = element.closing_start.is_none() && !element.children.is_empty();
        if gains_children {
            output.push_str(tail.trim_end().trim_end_matches("/>").trim_end());
            output.push('>');
        } else {
            output.push_str(tail);
        }

        if element.closing_start.is_none() && element.children.is_empty() {
            return;
        }

        // Children tile the content exactly (text nodes carry the whitespace)
        for child in &element.children {
            self.write_node(child, output);
        }

        match element.closing_start {
            Some(closing_start) => output.push_str(self.slice(closing_start, element.span.end)),
            None => {
                output.push_str("</");
                output.push_str(&element.name);
                output.push('>');
            }
        }
    }

    /// Returns the offset where the original attribute list ends
    fn write_attributes(&self, element: &Element, output: &mut String) -> usize {
        let separator = self
            .separator_before_last(element.name_end, element.attributes.iter().map(Attribute::span))
            .filter(|gap| !gap.is_empty())
            .unwrap_or(" ");

        let mut cursor = element.name_end;
        for attribute in &element.attributes {
            let span = attribute.span();
            if span.synthetic {
                output.push_str(separator);
                serializer::write_attribute(attribute, output);
            } else {
                output.push_str(self.slice(cursor, span.start));
                self.write_attribute(attribute, output);
                cursor = span.end;
            }
        }
        cursor
    }

    fn write_node(&self, node: &Node, output: &mut String) {
        match node {
            Node::Element(element) => self.write_element(element, output),
            Node::Text(text) => {
                if self.is_fresh(&text.span) {
                    output.push_str(&text.value);
                } else {
                    output.push_str(self.slice(text.span.start, text.span.end));
                }
            }
            Node::Expression(container) => self.write_container(container, output),
        }
    }

    fn write_attribute(&self, attribute: &Attribute, output: &mut String) {
        let named = match attribute {
            _ if self.is_fresh(attribute.span()) => {
                serializer::write_attribute(attribute, output);
                return;
            }
            Attribute::Spread(spread) => {
                self.write_opaque(spread, output);
                return;
            }
            Attribute::Named(named) if self.attribute_changed(attribute) => named,
            Attribute::Named(named) => {
                output.push_str(self.slice(named.span.start, named.span.end));
                return;
            }
        };

        let value = match &named.value {
            Some(value) => value,
            None => {
                output.push_str(self.slice(named.span.start, named.span.end));
                return;
            }
        };

        let value_span = value.span();
        if value_span.synthetic {
            // Keep `name=` (or `name =`) as written, replace whatever followed
            let written = self.slice(named.span.start, named.span.end);
            let name_len = named.name.len().min(written.len());
            match written[name_len..].find('=') {
                Some(eq) => {
                    let head = &written[..name_len + eq + 1];
                    let spacing = written[head.len()..].len() - written[head.len()..].trim_start().len();
                    output.push_str(&written[..head.len() + spacing]);
                }
                None => {
                    output.push_str(written);
                    output.push('=');
                }
            }
            serializer::write_attribute_value(value, output);
        } else {
            output.push_str(self.slice(named.span.start, value_span.start));
            match value {
                AttributeValue::Literal(literal) if self.is_fresh(&literal.span) => {
                    serializer::write_attribute_value(value, output);
                }
                AttributeValue::Literal(literal) => {
                    output.push_str(self.slice(literal.span.start, literal.span.end));
                }
                AttributeValue::Expression(container) => self.write_container(container, output),
            }
            output.push_str(self.slice(value_span.end, named.span.end));
        }
    }

    fn write_container(&self, container: &ExpressionContainer, output: &mut String) {
        if self.is_fresh(&container.span) {
            serializer::write_container(container, output);
            return;
        }
        if !self.container_changed(container) {
            output.push_str(self.slice(container.span.start, container.span.end));
            return;
        }

        let expression_span = container.expression.span();
        if expression_span.synthetic {
            output.push('{');
            serializer::write_expression(&container.expression, output);
            output.push('}');
        } else {
            output.push_str(self.slice(container.span.start, expression_span.start));
            self.write_expression(&container.expression, output);
            output.push_str(self.slice(expression_span.end, container.span.end));
        }
    }

    fn write_expression(&self, expression: &Expression, output: &mut String) {
        let span = expression.span();
        if self.is_fresh(span) {
            serializer::write_expression(expression, output);
            return;
        }

        match expression {
            Expression::Object(object) if self.expression_changed(expression) => {
                self.write_object(object, output)
            }
            Expression::Opaque(opaque) => self.write_opaque(opaque, output),
            _ => output.push_str(self.slice(span.start, span.end)),
        }
    }

    /// Original text between the embedded elements, each element printed in turn
    fn write_opaque(&self, opaque: &Opaque, output: &mut String) {
        if self.is_fresh(&opaque.span) {
            serializer::write_opaque(opaque, output);
            return;
        }

        let mut cursor = opaque.span.start;
        for element in opaque.elements.iter().filter(|e| !e.span.synthetic) {
            output.push_str(self.slice(cursor, element.span.start));
            self.write_element(element, output);
            cursor = element.span.end;
        }
        output.push_str(self.slice(cursor, opaque.span.end));
    }

    fn write_object(&self, object: &ObjectLiteral, output: &mut String) {
        let body_start = object.span.start + 1;
        let has_original = object.properties.iter().any(|p| !p.span().synthetic);
        let spacing = self
            .separator_before_last(body_start, object.properties.iter().map(Property::span))
            .map(|gap| gap.trim_start_matches(','))
            .filter(|gap| gap.chars().all(char::is_whitespace))
            .unwrap_or(" ");

        output.push('{');
        let mut cursor = body_start;
        for (i, property) in object.properties.iter().enumerate() {
            let span = property.span();
            if span.synthetic {
                if has_original {
                    output.push(',');
                    output.push_str(spacing);
                } else if i == 0 {
                    output.push(' ');
                } else {
                    output.push_str(", ");
                }
                serializer::write_property(property, output);
            } else {
                output.push_str(self.slice(cursor, span.start));
                self.write_property(property, output);
                cursor = span.end;
            }
        }

        let tail = self.slice(cursor, object.span.end);
        if !has_original && !object.properties.is_empty() && !tail.starts_with(char::is_whitespace) {
            output.push(' ');
        }
        output.push_str(tail);
    }

    fn write_property(&self, property: &Property, output: &mut String) {
        let span = property.span();
        let kv = match property {
            _ if self.is_fresh(span) => {
                serializer::write_property(property, output);
                return;
            }
            Property::Opaque(opaque) => {
                self.write_opaque(opaque, output);
                return;
            }
            Property::KeyValue(kv) if self.property_changed(property) => kv,
            Property::KeyValue(_) => {
                output.push_str(self.slice(span.start, span.end));
                return;
            }
        };

        let value_span = kv.value.span();
        if value_span.synthetic {
            // Keep `key:` and the spacing after the colon as written
            let written = self.slice(kv.key.span.end, kv.span.end);
            let head_len = match written.find(':') {
                Some(colon) => {
                    let after = &written[colon + 1..];
                    colon + 1 + (after.len() - after.trim_start().len())
                }
                None => 0,
            };
            output.push_str(self.slice(kv.span.start, kv.key.span.end + head_len));
            if head_len == 0 {
                output.push_str(": ");
            }
            serializer::write_expression(&kv.value, output);
        } else {
            output.push_str(self.slice(kv.span.start, value_span.start));
            self.write_expression(&kv.value, output);
            output.push_str(self.slice(value_span.end, kv.span.end));
        }
    }

    /// Gap in front of the last original item of a list, used to separate appended items
    fn separator_before_last<'s>(
        &self,
        list_start: usize,
        spans: impl Iterator<Item = &'s Span>,
    ) -> Option<&'a str> {
        let mut previous_end = list_start;
        let mut gap = None;
        for span in spans.filter(|s| !s.synthetic) {
            gap = Some(self.slice(previous_end, span.start));
            previous_end = span.end;
        }
        gap.filter(|g| g.trim_start_matches(',').chars().all(char::is_whitespace))
    }

    fn element_changed(&self, element: &Element) -> bool {
        self.is_fresh(&element.span)
            || element.attributes.iter().any(|a| self.attribute_changed(a))
            || element.children.iter().any(|c| self.node_changed(c))
            || !self.children_tile(element)
    }

    /// Original children must cover the content between the tags without gaps
    fn children_tile(&self, element: &Element) -> bool {
        let (start, end) = match element.closing_start {
            Some(closing_start) => (element.opening_end, closing_start),
            None => return element.children.is_empty(),
        };

        let mut cursor = start;
        for child in &element.children {
            let span = child.span();
            if span.synthetic || span.start != cursor {
                return false;
            }
            cursor = span.end;
        }
        cursor == end
    }

    fn node_changed(&self, node: &Node) -> bool {
        match node {
            Node::Element(element) => self.element_changed(element),
            Node::Text(text) => self.is_fresh(&text.span),
            Node::Expression(container) => self.container_changed(container),
        }
    }

    fn attribute_changed(&self, attribute: &Attribute) -> bool {
        match attribute {
            Attribute::Named(named) => {
                self.is_fresh(&named.span)
                    || match &named.value {
                        Some(AttributeValue::Literal(literal)) => self.is_fresh(&literal.span),
                        Some(AttributeValue::Expression(container)) => self.container_changed(container),
                        None => false,
                    }
            }
            Attribute::Spread(spread) => self.opaque_changed(spread),
        }
    }

    fn container_changed(&self, container: &ExpressionContainer) -> bool {
        self.is_fresh(&container.span) || self.expression_changed(&container.expression)
    }

    fn expression_changed(&self, expression: &Expression) -> bool {
        match expression {
            Expression::Object(object) => {
                self.is_fresh(&object.span)
                    || object.properties.iter().any(|p| self.property_changed(p))
            }
            Expression::String(literal) => self.is_fresh(&literal.span),
            Expression::Opaque(opaque) => self.opaque_changed(opaque),
        }
    }

    fn opaque_changed(&self, opaque: &Opaque) -> bool {
        self.is_fresh(&opaque.span) || opaque.elements.iter().any(|e| self.element_changed(e))
    }

    fn property_changed(&self, property: &Property) -> bool {
        match property {
            Property::KeyValue(kv) => {
                self.is_fresh(&kv.span) || self.is_fresh(&kv.key.span) || self.expression_changed(&kv.value)
            }
            Property::Opaque(opaque) => self.opaque_changed(opaque),
        }
    }
}

/// Print `doc` against the `source` it was parsed from
pub fn print(source: &str, doc: &Document) -> String {
    LosslessSerializer::new(source).serialize(doc)
}
