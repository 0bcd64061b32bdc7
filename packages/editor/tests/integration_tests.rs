//! End-to-end behavior of tagging, indexing and mutation

use visedit_editor::{Document, EditSession, ElementUpdate, MutationResult, StyleMap};
use visedit_parser::parse;

#[test]
fn test_tagging_simple_document() {
    let doc = Document::initialize("<div>hi</div>").unwrap();
    assert_eq!(doc.source(), r#"<div data-uid="el-0">hi</div>"#);
}

#[test]
fn test_text_update_scenario() {
    let mut doc = Document::initialize("<div>hi</div>").unwrap();
    doc.update("el-0", &ElementUpdate::text("bye")).unwrap();
    assert_eq!(doc.source(), r#"<div data-uid="el-0">bye</div>"#);
}

#[test]
fn test_hyphenated_then_camel_case_style_scenario() {
    let mut doc = Document::initialize("<div>hi</div>").unwrap();

    doc.update("el-0", &ElementUpdate::style([("font-size", "20px")])).unwrap();
    doc.update("el-0", &ElementUpdate::style([("fontSize", "24px")])).unwrap();

    assert_eq!(
        doc.source(),
        r#"<div data-uid="el-0" style={{ fontSize: "24px" }}>hi</div>"#
    );
    let style = doc.inline_style("el-0").unwrap();
    assert_eq!(style.len(), 1);
    assert_eq!(style.get("fontSize"), Some("24px"));
}

#[test]
fn test_unknown_identifier_scenario() {
    let mut doc = Document::initialize("<div>hi</div>").unwrap();
    let before = doc.source().to_string();

    let result = doc.update("el-42", &ElementUpdate::text("bye")).unwrap();

    assert!(matches!(result, MutationResult::Noop { .. }));
    assert_eq!(doc.source(), before);
}

#[test]
fn test_tagging_is_idempotent() {
    let source = "<main>\n  <h1 className=\"title\">Hello</h1>\n  <p>World</p>\n</main>\n";
    let first = Document::initialize(source).unwrap();
    let second = Document::initialize(first.source()).unwrap();

    assert_eq!(second.source(), first.source());
    assert_eq!(second.index().uids(), first.index().uids());
}

#[test]
fn test_round_trip_of_tagged_document_is_exact() {
    let source = concat!(
        "<section data-uid=\"el-0\" className='hero'>\n",
        "  <h1   data-uid=\"el-1\"\n",
        "        style={{ fontSize: '28px' , color:\"#111\" }}>AcMem</h1>\n",
        "</section>\n",
    );
    let doc = Document::initialize(source).unwrap();
    assert_eq!(doc.source(), source);
}

#[test]
fn test_identifiers_stable_across_reparse() {
    let mut doc = Document::initialize("<ul><li>one</li><li>two</li></ul>").unwrap();
    doc.update("el-2", &ElementUpdate::style([("color", "red")])).unwrap();

    let reparsed = Document::initialize(doc.source()).unwrap();
    let element = reparsed.element("el-2").unwrap();

    assert_eq!(element.name, "li");
    assert_eq!(reparsed.node_preview("el-2").unwrap().text, "two");
    assert_eq!(reparsed.inline_style("el-2").unwrap().get("color"), Some("red"));
}

#[test]
fn test_style_update_only_touches_opening_tag() {
    let source = concat!(
        "<main>\n",
        "  <header>  Top  </header>\n",
        "  <h1 style={{ color: 'red' }}>Title</h1>\n",
        "  <footer>\n",
        "    Bottom\n",
        "  </footer>\n",
        "</main>\n",
    );
    let mut doc = Document::initialize(source).unwrap();
    let before = doc.source().to_string();

    doc.update("el-2", &ElementUpdate::style([("margin", "0 auto")])).unwrap();
    let after = doc.source().to_string();

    let h1_start = before.find("<h1").unwrap();
    let h1_open_end = before[h1_start..].find('>').unwrap() + h1_start;
    let grown = after.len() - before.len();

    assert_eq!(&after[..h1_start], &before[..h1_start]);
    assert_eq!(&after[h1_open_end + grown..], &before[h1_open_end..]);
    assert!(after.contains("style={{ color: 'red', margin: '0 auto' }}"));
}

#[test]
fn test_style_upsert_keeps_position_and_appends() {
    let mut doc =
        Document::initialize("<p style={{ color: 'red', padding: '4px' }}>x</p>").unwrap();

    let update = ElementUpdate::style([("color", "blue"), ("line-height", "1.5")]);
    doc.update("el-0", &update).unwrap();
    let once = doc.source().to_string();
    doc.update("el-0", &update).unwrap();

    assert_eq!(
        once,
        r#"<p style={{ color: 'blue', padding: '4px', lineHeight: '1.5' }} data-uid="el-0">x</p>"#
    );
    assert_eq!(doc.source(), once);
    assert_eq!(
        doc.inline_style("el-0").unwrap().keys().collect::<Vec<_>>(),
        vec!["color", "padding", "lineHeight"]
    );
}

#[test]
fn test_text_and_style_in_one_update() {
    let mut doc = Document::initialize("<button />").unwrap();

    let update = ElementUpdate {
        text: Some("Join".to_string()),
        style: StyleMap::from_iter([("background", "#3366FF")]),
    };
    let result = doc.update("el-0", &update).unwrap();

    assert_eq!(result, MutationResult::Applied { version: 1 });
    assert_eq!(
        doc.source(),
        r##"<button data-uid="el-0" style={{ background: "#3366FF" }}>Join</button>"##
    );
    assert!(parse(doc.source()).is_ok());
}

#[test]
fn test_nested_elements_leave_index_on_text_update() {
    let mut doc = Document::initialize("<div><span>a</span><span>b</span></div>").unwrap();
    assert_eq!(doc.index().len(), 3);

    doc.update("el-0", &ElementUpdate::text("flat")).unwrap();

    assert_eq!(doc.index().uids(), vec!["el-0"]);
    let result = doc.update("el-1", &ElementUpdate::text("gone")).unwrap();
    assert!(!result.is_applied());
}

#[test]
fn test_landing_page_editing_session() {
    let source = r#"<div className="landing">
  <h1 style={{ fontSize: '28px', fontWeight: 700 }}>AcMem</h1>
  <p>Memory for teams.</p>
  <input type="email" placeholder="Your work email" />
  <button onClick={() => join()}>Join waitlist</button>
</div>
"#;
    let mut doc = Document::initialize(source).unwrap();
    assert_eq!(doc.index().uids(), vec!["el-0", "el-1", "el-2", "el-3", "el-4"]);

    doc.update("el-1", &ElementUpdate::text("AcMem beta")).unwrap();
    doc.update("el-4", &ElementUpdate::style([("border-radius", "8px")])).unwrap();

    let expected = r#"<div className="landing" data-uid="el-0">
  <h1 style={{ fontSize: '28px', fontWeight: 700 }} data-uid="el-1">AcMem beta</h1>
  <p data-uid="el-2">Memory for teams.</p>
  <input type="email" placeholder="Your work email" data-uid="el-3" />
  <button onClick={() => join()} data-uid="el-4" style={{ borderRadius: "8px" }}>Join waitlist</button>
</div>
"#;
    assert_eq!(doc.source(), expected);
    assert_eq!(doc.version(), 2);
}

#[test]
fn test_session_survives_bad_source() -> anyhow::Result<()> {
    let mut session = EditSession::new(Document::initialize("<div>hi</div>")?);
    session.select("el-0");

    assert!(session.set_source("<div>".to_string()).is_err());
    assert_eq!(session.source(), r#"<div data-uid="el-0">hi</div>"#);
    assert_eq!(session.selected(), Some("el-0"));
    assert!(session.last_error().is_some_and(|message| message.starts_with("1:6")));

    session.apply_update("el-0", &ElementUpdate::text("ok"))?;
    assert_eq!(session.source(), r#"<div data-uid="el-0">ok</div>"#);
    Ok(())
}

#[test]
fn test_markup_inside_expressions_is_editable() {
    let mut doc = Document::initialize("<ul>{items.map(i => <li>{i}</li>)}{ok && <b>x</b>}</ul>").unwrap();
    assert_eq!(doc.index().uids(), vec!["el-0", "el-1", "el-2"]);

    doc.update("el-2", &ElementUpdate::text("done")).unwrap();
    doc.update("el-1", &ElementUpdate::style([("color", "red")])).unwrap();

    assert_eq!(
        doc.source(),
        r#"<ul data-uid="el-0">{items.map(i => <li data-uid="el-1" style={{ color: "red" }}>{i}</li>)}{ok && <b data-uid="el-2">done</b>}</ul>"#
    );

    let reparsed = Document::initialize(doc.source()).unwrap();
    assert_eq!(reparsed.source(), doc.source());
}

#[test]
fn test_text_update_drops_markup_nested_in_expressions() {
    let mut doc = Document::initialize("<div>{open && <p>a</p>}<span>b</span></div>").unwrap();
    assert_eq!(doc.index().uids(), vec!["el-0", "el-1", "el-2"]);

    doc.update("el-0", &ElementUpdate::text("flat")).unwrap();

    assert_eq!(doc.index().uids(), vec!["el-0"]);
    assert_eq!(doc.source(), r#"<div data-uid="el-0">flat</div>"#);
}

#[test]
fn test_block_comments_and_backslash_attributes_are_accepted() {
    let doc = Document::initialize("/* header */\n<div title=\"C:\\\" /* note */>hi</div>\n/* end */\n").unwrap();

    assert_eq!(
        doc.source(),
        "/* header */\n<div title=\"C:\\\" data-uid=\"el-0\" /* note */>hi</div>\n/* end */\n"
    );
}
