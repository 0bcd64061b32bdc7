/// Lossless printer behavior under the edits the editor performs
use crate::*;

fn sid(n: &str) -> Span {
    Span::synthetic(format!("test-{}", n))
}

fn literal(value: &str, quote: char) -> StringLiteral {
    StringLiteral {
        value: value.to_string(),
        quote,
        span: sid(value),
    }
}

fn attribute(name: &str, value: &str) -> Attribute {
    Attribute::Named(NamedAttribute {
        name: name.to_string(),
        value: Some(AttributeValue::Literal(literal(value, '"'))),
        span: sid(name),
    })
}

fn property(key: &str, value: &str) -> Property {
    Property::KeyValue(KeyValue {
        key: PropertyKey {
            name: key.to_string(),
            quote: None,
            span: sid(key),
        },
        value: Expression::String(literal(value, '\'')),
        span: sid(&format!("{}-kv", key)),
    })
}

fn style_object(element: &mut Element) -> &mut ObjectLiteral {
    match element.attribute_mut("style").and_then(|a| a.value.as_mut()) {
        Some(AttributeValue::Expression(ExpressionContainer {
            expression: Expression::Object(object),
            ..
        })) => object,
        other => panic!("Expected style object, got {:?}", other),
    }
}

#[test]
fn test_unmodified_documents_print_identically() {
    let sources = [
        "<div>hi</div>",
        "// header\n<div  className = 'a'   >\n  <span>{value}</span>\n</div>\n\n/* tail */\n",
        "<input\n  placeholder=\"Your work email\"\n  disabled\n/>",
        "<h1 style={{ fontSize: '28px',\n  'font-weight': 700, ...base }}>AcMem</h1>",
        "<ul>{items.map(i => <li key={i}>{`#${i}`}</li>)}</ul>",
    ];

    for source in sources {
        let doc = parse(source).unwrap();
        assert_eq!(print(source, &doc), source);
    }
}

#[test]
fn test_appended_attribute_uses_single_space() {
    let source = r#"<div className="a">hi</div>"#;
    let mut doc = parse(source).unwrap();
    doc.elements[0].attributes.push(attribute("data-uid", "el-0"));

    assert_eq!(
        print(source, &doc),
        r#"<div className="a" data-uid="el-0">hi</div>"#
    );
}

#[test]
fn test_appended_attribute_follows_multiline_layout() {
    let source = "<input\n  type=\"text\"\n  disabled\n/>";
    let mut doc = parse(source).unwrap();
    doc.elements[0].attributes.push(attribute("data-uid", "el-0"));

    assert_eq!(
        print(source, &doc),
        "<input\n  type=\"text\"\n  disabled\n  data-uid=\"el-0\"\n/>"
    );
}

#[test]
fn test_attribute_on_bare_tag() {
    let source = "<section>\n  <p>x</p>\n</section>";
    let mut doc = parse(source).unwrap();
    let p = doc.element_at_mut(&[0, 0]).unwrap();
    p.attributes.push(attribute("data-uid", "el-1"));

    assert_eq!(
        print(source, &doc),
        "<section>\n  <p data-uid=\"el-1\">x</p>\n</section>"
    );
}

#[test]
fn test_self_closing_element_gains_children() {
    let source = r#"<img src="a.png" />"#;
    let mut doc = parse(source).unwrap();
    doc.elements[0].children.push(Node::Text(Text {
        value: "caption".to_string(),
        span: sid("text"),
    }));

    assert_eq!(print(source, &doc), r#"<img src="a.png">caption</img>"#);
}

#[test]
fn test_replaced_children_keep_tags_verbatim() {
    let source = "<h1 style={{ color: 'red' }}  >Old <b>bold</b></h1>";
    let mut doc = parse(source).unwrap();
    doc.elements[0].children = vec![Node::Text(Text {
        value: "New".to_string(),
        span: sid("text"),
    })];

    assert_eq!(print(source, &doc), "<h1 style={{ color: 'red' }}  >New</h1>");
}

#[test]
fn test_appended_style_property() {
    let source = "<p style={{ color: 'red' }}>x</p>";
    let mut doc = parse(source).unwrap();
    style_object(&mut doc.elements[0]).properties.push(property("fontSize", "2px"));

    assert_eq!(
        print(source, &doc),
        "<p style={{ color: 'red', fontSize: '2px' }}>x</p>"
    );
}

#[test]
fn test_appended_style_property_multiline_with_trailing_comma() {
    let source = "<p\n  style={{\n    color: 'red',\n  }}\n>x</p>";
    let mut doc = parse(source).unwrap();
    style_object(&mut doc.elements[0]).properties.push(property("margin", "0"));

    assert_eq!(
        print(source, &doc),
        "<p\n  style={{\n    color: 'red',\n    margin: '0',\n  }}\n>x</p>"
    );
}

#[test]
fn test_property_added_to_empty_object() {
    let source = "<p style={{}}>x</p>";
    let mut doc = parse(source).unwrap();
    style_object(&mut doc.elements[0]).properties.push(property("color", "red"));

    assert_eq!(print(source, &doc), "<p style={{ color: 'red' }}>x</p>");
}

#[test]
fn test_overwritten_property_value_keeps_key_layout() {
    let source = "<p style={{ color:   'red', margin: 0 }}>x</p>";
    let mut doc = parse(source).unwrap();
    if let Property::KeyValue(kv) = &mut style_object(&mut doc.elements[0]).properties[0] {
        kv.value = Expression::String(literal("blue", '\''));
    }

    assert_eq!(
        print(source, &doc),
        "<p style={{ color:   'blue', margin: 0 }}>x</p>"
    );
}

#[test]
fn test_attribute_without_value_gains_value() {
    let source = "<div data-uid>x</div>";
    let mut doc = parse(source).unwrap();
    doc.elements[0].attribute_mut("data-uid").unwrap().value =
        Some(AttributeValue::Literal(literal("el-0", '"')));

    assert_eq!(print(source, &doc), r#"<div data-uid="el-0">x</div>"#);
}

#[test]
fn test_replaced_attribute_value() {
    let source = "<div data-uid={dup} id='a'>x</div>";
    let mut doc = parse(source).unwrap();
    doc.elements[0].attribute_mut("data-uid").unwrap().value =
        Some(AttributeValue::Literal(literal("el-3", '"')));

    assert_eq!(print(source, &doc), r#"<div data-uid="el-3" id='a'>x</div>"#);
}

#[test]
fn test_edit_leaves_siblings_and_comments_untouched() {
    let source = "<a  href='x'>one</a>\n/* keep */\n<b>two</b>\n";
    let mut doc = parse(source).unwrap();
    doc.elements[1].children = vec![Node::Text(Text {
        value: "three".to_string(),
        span: sid("text"),
    })];

    assert_eq!(
        print(source, &doc),
        "<a  href='x'>one</a>\n/* keep */\n<b>three</b>\n"
    );
}

#[test]
fn test_attribute_on_markup_inside_expression() {
    let source = "<ul>\n  {items.map(item => (\n    <li key={item}>{item}</li>\n  ))}\n</ul>";
    let mut doc = parse(source).unwrap();
    let li = doc.element_at_mut(&[0, 0]).unwrap();
    assert_eq!(li.name, "li");
    li.attributes.push(attribute("data-uid", "el-1"));

    assert_eq!(
        print(source, &doc),
        "<ul>\n  {items.map(item => (\n    <li key={item} data-uid=\"el-1\">{item}</li>\n  ))}\n</ul>"
    );
}

#[test]
fn test_markup_in_attribute_and_spread_expressions() {
    let source = "<Card icon={<Star />} {...{ footer: <b>x</b> }} />";
    let mut doc = parse(source).unwrap();
    let names: Vec<String> = doc.elements[0]
        .nested_elements()
        .iter()
        .map(|e| e.name.clone())
        .collect();
    assert_eq!(names, vec!["Star", "b"]);

    doc.element_at_mut(&[0, 1]).unwrap().attributes.push(attribute("data-uid", "el-2"));

    assert_eq!(
        print(source, &doc),
        "<Card icon={<Star />} {...{ footer: <b data-uid=\"el-2\">x</b> }} />"
    );
}

#[test]
fn test_fresh_serialize_keeps_embedded_markup_edits() {
    let source = "<p>{ok && <b>x</b>}</p>";
    let mut doc = parse(source).unwrap();
    doc.element_at_mut(&[0, 0]).unwrap().attributes.push(attribute("data-uid", "el-1"));

    assert_eq!(serialize(&doc), "<p>{ok && <b data-uid=\"el-1\">x</b>}</p>");
}

#[test]
fn test_fresh_serialize_reparses() {
    let source = "<div  a='1'>\n  <img\n    src=\"x\" />\n  {value}\n</div>";
    let doc = parse(source).unwrap();
    let fresh = serialize(&doc);

    assert_eq!(fresh, "<div a='1'>\n  <img src=\"x\" />\n  {value}\n</div>");
    let reparsed = parse(&fresh).unwrap();
    assert_eq!(reparsed.elements[0].children.len(), doc.elements[0].children.len());
}
