use visedit_parser::ast::*;

/// Visitor pattern for traversing AST nodes immutably
///
/// Default implementations walk the entire tree in document order.
/// Override specific visit_* methods to perform custom actions on nodes.
/// Markup embedded in opaque expressions (`{ok && <b>x</b>}`) is visited
/// where it appears, in the same order as [`Element::nested_elements`].
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    fn visit_element(&mut self, element: &Element) {
        walk_element(self, element);
    }

    fn visit_attribute(&mut self, attribute: &Attribute) {
        walk_attribute(self, attribute);
    }

    fn visit_text(&mut self, _text: &Text) {
        // Leaf node, no children to walk
    }

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }
}

/// Mutable visitor pattern for transforming AST nodes
///
/// Similar to Visitor, but provides mutable access to nodes.
pub trait VisitorMut: Sized {
    fn visit_document_mut(&mut self, doc: &mut Document) {
        walk_document_mut(self, doc);
    }

    fn visit_element_mut(&mut self, element: &mut Element) {
        walk_element_mut(self, element);
    }

    fn visit_attribute_mut(&mut self, attribute: &mut Attribute) {
        walk_attribute_mut(self, attribute);
    }

    fn visit_text_mut(&mut self, _text: &mut Text) {
        // Leaf node, no children to walk
    }

    fn visit_expression_mut(&mut self, expr: &mut Expression) {
        walk_expression_mut(self, expr);
    }
}

// Default walk implementations for immutable visitor

pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &Document) {
    for element in &doc.elements {
        visitor.visit_element(element);
    }
}

pub fn walk_element<V: Visitor>(visitor: &mut V, element: &Element) {
    for attribute in &element.attributes {
        visitor.visit_attribute(attribute);
    }
    for child in &element.children {
        match child {
            Node::Element(child) => visitor.visit_element(child),
            Node::Text(text) => visitor.visit_text(text),
            Node::Expression(container) => visitor.visit_expression(&container.expression),
        }
    }
}

pub fn walk_attribute<V: Visitor>(visitor: &mut V, attribute: &Attribute) {
    match attribute {
        Attribute::Named(NamedAttribute {
            value: Some(AttributeValue::Expression(container)),
            ..
        }) => visitor.visit_expression(&container.expression),
        Attribute::Named(_) => {}
        Attribute::Spread(spread) => walk_opaque(visitor, spread),
    }
}

pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::Object(object) => {
            for property in &object.properties {
                match property {
                    Property::KeyValue(kv) => visitor.visit_expression(&kv.value),
                    Property::Opaque(opaque) => walk_opaque(visitor, opaque),
                }
            }
        }
        Expression::Opaque(opaque) => walk_opaque(visitor, opaque),
        Expression::String(_) => {}
    }
}

pub fn walk_opaque<V: Visitor>(visitor: &mut V, opaque: &Opaque) {
    for element in &opaque.elements {
        visitor.visit_element(element);
    }
}

// Default walk implementations for mutable visitor

pub fn walk_document_mut<V: VisitorMut>(visitor: &mut V, doc: &mut Document) {
    for element in &mut doc.elements {
        visitor.visit_element_mut(element);
    }
}

pub fn walk_element_mut<V: VisitorMut>(visitor: &mut V, element: &mut Element) {
    for attribute in &mut element.attributes {
        visitor.visit_attribute_mut(attribute);
    }
    for child in &mut element.children {
        match child {
            Node::Element(child) => visitor.visit_element_mut(child),
            Node::Text(text) => visitor.visit_text_mut(text),
            Node::Expression(container) => visitor.visit_expression_mut(&mut container.expression),
        }
    }
}

pub fn walk_attribute_mut<V: VisitorMut>(visitor: &mut V, attribute: &mut Attribute) {
    match attribute {
        Attribute::Named(NamedAttribute {
            value: Some(AttributeValue::Expression(container)),
            ..
        }) => visitor.visit_expression_mut(&mut container.expression),
        Attribute::Named(_) => {}
        Attribute::Spread(spread) => walk_opaque_mut(visitor, spread),
    }
}

pub fn walk_expression_mut<V: VisitorMut>(visitor: &mut V, expr: &mut Expression) {
    match expr {
        Expression::Object(object) => {
            for property in &mut object.properties {
                match property {
                    Property::KeyValue(kv) => visitor.visit_expression_mut(&mut kv.value),
                    Property::Opaque(opaque) => walk_opaque_mut(visitor, opaque),
                }
            }
        }
        Expression::Opaque(opaque) => walk_opaque_mut(visitor, opaque),
        Expression::String(_) => {}
    }
}

pub fn walk_opaque_mut<V: VisitorMut>(visitor: &mut V, opaque: &mut Opaque) {
    for element in &mut opaque.elements {
        visitor.visit_element_mut(element);
    }
}

/// Collects element names in document order
pub struct ElementCollector {
    pub names: Vec<String>,
}

impl Visitor for ElementCollector {
    fn visit_element(&mut self, element: &Element) {
        self.names.push(element.name.clone());
        walk_element(self, element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visedit_parser::parse;

    #[test]
    fn test_visitor_walks_in_document_order() {
        let doc = parse("<main><h1>t</h1><section><p>x</p></section></main>\n<footer />").unwrap();

        let mut collector = ElementCollector { names: Vec::new() };
        collector.visit_document(&doc);

        assert_eq!(collector.names, vec!["main", "h1", "section", "p", "footer"]);
    }

    #[test]
    fn test_visitor_reaches_markup_in_expressions() {
        let doc = parse("<ul icon={<Bullet />}>{items.map(i => <li>{i}</li>)}{ok && <b>x</b>}</ul>").unwrap();

        let mut collector = ElementCollector { names: Vec::new() };
        collector.visit_document(&doc);

        assert_eq!(collector.names, vec!["ul", "Bullet", "li", "b"]);
    }

    struct StringCounter {
        strings: usize,
    }

    impl Visitor for StringCounter {
        fn visit_expression(&mut self, expr: &Expression) {
            if matches!(expr, Expression::String(_)) {
                self.strings += 1;
            }
            walk_expression(self, expr);
        }
    }

    #[test]
    fn test_visitor_reaches_style_values() {
        let doc = parse("<p style={{ color: 'red', margin: 0 }}>{'x'}</p>").unwrap();

        let mut counter = StringCounter { strings: 0 };
        counter.visit_document(&doc);

        assert_eq!(counter.strings, 2);
    }

    struct TextUppercaser;

    impl VisitorMut for TextUppercaser {
        fn visit_text_mut(&mut self, text: &mut Text) {
            text.value = text.value.to_uppercase();
        }
    }

    #[test]
    fn test_visitor_mut_rewrites_text() {
        let mut doc = parse("<p>hi <b>there</b></p>").unwrap();
        TextUppercaser.visit_document_mut(&mut doc);

        let p = &doc.elements[0];
        match (&p.children[0], &p.children[1]) {
            (Node::Text(text), Node::Element(b)) => {
                assert_eq!(text.value, "HI ");
                assert!(matches!(&b.children[0], Node::Text(t) if t.value == "THERE"));
            }
            other => panic!("Unexpected children {:?}", other),
        }
    }
}
