use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::id_generator::IDGenerator;
use crate::tokenizer::{next_token, Token};
use std::ops::Range;

/// Parser for JSX-style markup documents
///
/// Tag interiors are lexed with logos one token at a time; text children and
/// opaque expressions are scanned byte-wise so every node keeps an exact
/// source span for the lossless printer.
pub struct Parser<'src> {
    source: &'src str,
    pos: usize,
    id_generator: IDGenerator,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, id_generator: IDGenerator) -> Self {
        Self {
            source,
            pos: 0,
            id_generator,
        }
    }

    /// Span-id generator state after parsing; mutations continue from here
    pub fn into_id_generator(self) -> IDGenerator {
        self.id_generator
    }

    /// Parse a complete document
    pub fn parse_document(&mut self) -> ParseResult<Document> {
        let mut doc = Document::new(Span::new(0, self.source.len(), self.id_generator.new_id()));

        loop {
            match self.peek_token()? {
                None => break,
                Some((Token::LAngle, range)) => {
                    self.pos = range.start;
                    doc.elements.push(self.parse_element()?);
                }
                Some((token, range)) => {
                    return Err(ParseError::unexpected_token(
                        range.start,
                        "'<' to start an element",
                        token.describe(),
                    ));
                }
            }
        }

        Ok(doc)
    }

    /// Parse an element starting at the current `<`
    fn parse_element(&mut self) -> ParseResult<Element> {
        let start = self.expect(Token::LAngle, "'<'")?.start;
        let id = self.id_generator.new_id();

        let name = match self.advance_token("tag name")? {
            (Token::Name(name), _) => name.to_string(),
            (Token::RAngle, range) => {
                return Err(ParseError::invalid_syntax(
                    range.start,
                    "Fragments (<>...</>) are not supported",
                ));
            }
            (token, range) => {
                return Err(ParseError::unexpected_token(range.start, "tag name", token.describe()));
            }
        };
        let name_end = self.pos;

        let mut attributes = Vec::new();
        let self_closing = loop {
            match self.peek_token()? {
                Some((Token::Name(_), _)) => {
                    attributes.push(Attribute::Named(self.parse_named_attribute()?));
                }
                Some((Token::LBrace, range)) => {
                    self.pos = range.start;
                    attributes.push(Attribute::Spread(self.parse_spread_attribute()?));
                }
                Some((Token::RAngle, range)) => {
                    self.pos = range.end;
                    break false;
                }
                Some((Token::SlashRAngle, range)) => {
                    self.pos = range.end;
                    break true;
                }
                Some((token, range)) => {
                    return Err(ParseError::unexpected_token(
                        range.start,
                        "attribute, '>' or '/>'",
                        token.describe(),
                    ));
                }
                None => {
                    return Err(ParseError::unexpected_eof(
                        self.source.len(),
                        format!("end of opening tag <{}>", name),
                    ));
                }
            }
        };
        let opening_end = self.pos;

        if self_closing {
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
                self_closing: true,
                span: Span::new(start, opening_end, id),
                name_end,
                opening_end,
                closing_start: None,
            });
        }

        let source = self.source;
        let bytes = source.as_bytes();
        let mut children = Vec::new();
        let closing_start = loop {
            match bytes.get(self.pos) {
                None => {
                    return Err(ParseError::unexpected_eof(
                        self.pos,
                        format!("closing tag </{}>", name),
                    ));
                }
                Some(b'<') => {
                    if bytes.get(self.pos + 1) == Some(&b'/') {
                        break self.pos;
                    }
                    children.push(Node::Element(self.parse_element()?));
                }
                Some(b'{') => {
                    children.push(Node::Expression(self.parse_expression_container()?));
                }
                Some(_) => children.push(Node::Text(self.parse_text())),
            }
        };

        self.expect(Token::LAngleSlash, "'</'")?;
        match self.advance_token(&format!("closing tag name '{}'", name))? {
            (Token::Name(closing), _) if closing == name => {}
            (Token::Name(closing), range) => {
                return Err(ParseError::invalid_syntax(
                    range.start,
                    format!("Expected closing tag </{}>, found </{}>", name, closing),
                ));
            }
            (token, range) => {
                return Err(ParseError::unexpected_token(
                    range.start,
                    format!("closing tag name '{}'", name),
                    token.describe(),
                ));
            }
        }
        self.expect(Token::RAngle, "'>'")?;

        Ok(Element {
            name,
            attributes,
            children,
            self_closing: false,
            span: Span::new(start, self.pos, id),
            name_end,
            opening_end,
            closing_start: Some(closing_start),
        })
    }

    /// JSX text runs until the next `<` or `{`
    fn parse_text(&mut self) -> Text {
        let source = self.source;
        let bytes = source.as_bytes();
        let start = self.pos;
        let mut end = start;
        while end < bytes.len() && bytes[end] != b'<' && bytes[end] != b'{' {
            end += 1;
        }
        self.pos = end;

        Text {
            value: source[start..end].to_string(),
            span: Span::new(start, end, self.id_generator.new_id()),
        }
    }

    fn parse_named_attribute(&mut self) -> ParseResult<NamedAttribute> {
        let (name, name_range) = match self.advance_token("attribute name")? {
            (Token::Name(name), range) => (name.to_string(), range),
            (token, range) => {
                return Err(ParseError::unexpected_token(range.start, "attribute name", token.describe()));
            }
        };
        let id = self.id_generator.new_id();

        let value = match self.peek_token()? {
            Some((Token::Equals, eq)) => {
                self.pos = eq.end;
                let value_start = self.skip_trivia(self.pos)?;
                if matches!(self.source.as_bytes().get(value_start), Some(b'"') | Some(b'\'')) {
                    Some(AttributeValue::Literal(self.attribute_string(value_start)?))
                } else {
                    match self.peek_token()? {
                        Some((Token::LBrace, range)) => {
                            self.pos = range.start;
                            Some(AttributeValue::Expression(self.parse_expression_container()?))
                        }
                        Some((token, range)) => {
                            return Err(ParseError::unexpected_token(
                                range.start,
                                format!("value for attribute '{}'", name),
                                token.describe(),
                            ));
                        }
                        None => {
                            return Err(ParseError::unexpected_eof(
                                self.source.len(),
                                format!("value for attribute '{}'", name),
                            ));
                        }
                    }
                }
            }
            _ => None,
        };

        let end = value.as_ref().map(|v| v.span().end).unwrap_or(name_range.end);
        Ok(NamedAttribute {
            name,
            value,
            span: Span::new(name_range.start, end, id),
        })
    }

    /// `{...props}`
    fn parse_spread_attribute(&mut self) -> ParseResult<Opaque> {
        let start = self.expect(Token::LBrace, "'{'")?.start;
        self.expect(Token::Ellipsis, "'...'")?;
        let mut elements = Vec::new();
        let end = self.scan_balanced(self.pos, b"}", &mut elements)?;
        self.pos = end + 1;

        Ok(Opaque {
            source: self.source[start..self.pos].to_string(),
            span: Span::new(start, self.pos, self.id_generator.new_id()),
            elements,
        })
    }

    /// `{ expression }` starting at the current `{`
    fn parse_expression_container(&mut self) -> ParseResult<ExpressionContainer> {
        let source = self.source;
        let start = self.pos;
        let id = self.id_generator.new_id();

        let inner_start = self.skip_trivia(start + 1)?;
        let expression = self.parse_expression(inner_start, b"}")?;
        let close = self.skip_trivia(expression.span().end)?;
        if source.as_bytes().get(close) != Some(&b'}') {
            return Err(self.unexpected_at(close, "'}' to close expression"));
        }
        self.pos = close + 1;

        Ok(ExpressionContainer {
            expression,
            span: Span::new(start, self.pos, id),
        })
    }

    /// Parse an expression at `start` that must be followed by one of `terminators`.
    ///
    /// Object and string literals are structured; anything else (or a literal
    /// that turns out to be part of a larger expression) is kept opaque.
    fn parse_expression(&mut self, start: usize, terminators: &[u8]) -> ParseResult<Expression> {
        let source = self.source;

        match source.as_bytes().get(start) {
            Some(b'{') => {
                let saved = self.pos;
                self.pos = start;
                let object = self.parse_object_literal();
                self.pos = saved;
                if let Ok(object) = object {
                    if self.followed_by(object.span.end, terminators)? {
                        return Ok(Expression::Object(object));
                    }
                }
            }
            Some(b'"') | Some(b'\'') => {
                if let Some(Ok((Token::Str(raw), range))) = next_token(source, start) {
                    let literal = self.string_literal(raw, range);
                    if self.followed_by(literal.span.end, terminators)? {
                        return Ok(Expression::String(literal));
                    }
                }
            }
            _ => {}
        }

        Ok(Expression::Opaque(self.scan_opaque(start, terminators)?))
    }

    /// Object literal starting at the current `{`; leaves `pos` after the `}`
    fn parse_object_literal(&mut self) -> ParseResult<ObjectLiteral> {
        let source = self.source;
        let bytes = source.as_bytes();
        let start = self.pos;
        let id = self.id_generator.new_id();

        let mut properties = Vec::new();
        let mut pos = start + 1;
        loop {
            pos = self.skip_trivia(pos)?;
            match bytes.get(pos) {
                None => return Err(ParseError::unexpected_eof(pos, "'}' to close object literal")),
                Some(b'}') => {
                    pos += 1;
                    break;
                }
                Some(_) => {}
            }

            let property = self.parse_property(pos)?;
            pos = self.skip_trivia(property.span().end)?;
            properties.push(property);

            match bytes.get(pos) {
                Some(b',') => pos += 1,
                Some(b'}') => {
                    pos += 1;
                    break;
                }
                Some(_) => return Err(self.unexpected_at(pos, "',' or '}'")),
                None => return Err(ParseError::unexpected_eof(pos, "'}' to close object literal")),
            }
        }

        self.pos = pos;
        Ok(ObjectLiteral {
            properties,
            span: Span::new(start, pos, id),
        })
    }

    /// `key: value` entry, or an opaque entry (spread, shorthand, method, computed key)
    fn parse_property(&mut self, pos: usize) -> ParseResult<Property> {
        let source = self.source;

        if let Some(Ok((token, range))) = next_token(source, pos) {
            // (name, quote, key end, offset after the colon if the key token swallowed it)
            let key = match token {
                // `padding:x` lexes as one namespaced name
                Token::Name(name) => match name.find(':') {
                    Some(idx) => Some((name[..idx].to_string(), None, range.start + idx, Some(range.start + idx + 1))),
                    None => Some((name.to_string(), None, range.end, None)),
                },
                Token::Str(raw) => Some((unescape(&raw[1..raw.len() - 1]), raw.chars().next(), range.end, None)),
                Token::Number(n) => Some((n.to_string(), None, range.end, None)),
                _ => None,
            };

            if let Some((name, quote, key_end, colon_end)) = key {
                let is_plain_key = !name.contains('.') && !name.contains('-') || quote.is_some();
                let colon_end = match colon_end {
                    Some(end) => Some(end),
                    None => match next_token(source, key_end) {
                        Some(Ok((Token::Colon, colon))) => Some(colon.end),
                        _ => None,
                    },
                };

                if let (true, Some(colon_end)) = (is_plain_key, colon_end) {
                    let id = self.id_generator.new_id();
                    let key = PropertyKey {
                        name,
                        quote,
                        span: Span::new(range.start, key_end, self.id_generator.new_id()),
                    };
                    let value_start = self.skip_trivia(colon_end)?;
                    let value = self.parse_expression(value_start, b",}")?;

                    return Ok(Property::KeyValue(KeyValue {
                        span: Span::new(range.start, value.span().end, id),
                        key,
                        value,
                    }));
                }
            }
        }

        Ok(Property::Opaque(self.scan_opaque(pos, b",}")?))
    }

    /// JavaScript string literal from a lexed `Str` token
    fn string_literal(&mut self, raw: &str, range: Range<usize>) -> StringLiteral {
        StringLiteral {
            value: unescape(&raw[1..raw.len() - 1]),
            quote: raw.chars().next().unwrap_or('"'),
            span: Span::new(range.start, range.end, self.id_generator.new_id()),
        }
    }

    /// JSX attribute string at `start`: runs to the matching quote, backslashes
    /// are plain characters. Leaves `pos` after the closing quote.
    fn attribute_string(&mut self, start: usize) -> ParseResult<StringLiteral> {
        let source = self.source;
        let quote = match source[start..].chars().next() {
            Some(quote) => quote,
            None => return Err(ParseError::unexpected_eof(start, "attribute string")),
        };
        let body_start = start + quote.len_utf8();
        let body_end = match source[body_start..].find(quote) {
            Some(len) => body_start + len,
            None => return Err(ParseError::unexpected_eof(source.len(), "end of attribute string")),
        };
        self.pos = body_end + quote.len_utf8();

        Ok(StringLiteral {
            value: source[body_start..body_end].to_string(),
            quote,
            span: Span::new(start, self.pos, self.id_generator.new_id()),
        })
    }

    /// Opaque source from `start` up to a top-level terminator, trailing whitespace trimmed
    fn scan_opaque(&mut self, start: usize, terminators: &[u8]) -> ParseResult<Opaque> {
        let source = self.source;
        let mut elements = Vec::new();
        let end = self.scan_balanced(start, terminators, &mut elements)?;
        let text = source[start..end].trim_end();

        Ok(Opaque {
            source: text.to_string(),
            span: Span::new(start, start + text.len(), self.id_generator.new_id()),
            elements,
        })
    }

    /// Find the first of `terminators` at bracket depth zero, skipping strings,
    /// template literals and comments. Markup met on the way is parsed into
    /// `embedded`.
    fn scan_balanced(
        &mut self,
        start: usize,
        terminators: &[u8],
        embedded: &mut Vec<Element>,
    ) -> ParseResult<usize> {
        let source = self.source;
        let bytes = source.as_bytes();
        let mut stack: Vec<u8> = Vec::new();
        let mut pos = start;

        while let Some(&byte) = bytes.get(pos) {
            if stack.is_empty() && terminators.contains(&byte) {
                return Ok(pos);
            }

            match byte {
                b'(' => {
                    stack.push(b')');
                    pos += 1;
                }
                b'[' => {
                    stack.push(b']');
                    pos += 1;
                }
                b'{' => {
                    stack.push(b'}');
                    pos += 1;
                }
                b')' | b']' | b'}' => match stack.pop() {
                    Some(expected) if expected == byte => pos += 1,
                    _ => {
                        return Err(ParseError::invalid_syntax(
                            pos,
                            format!("Unbalanced '{}' in expression", byte as char),
                        ));
                    }
                },
                b'"' | b'\'' => pos = self.skip_string(pos)?,
                b'`' => pos = self.skip_template(pos, embedded)?,
                b'/' if matches!(bytes.get(pos + 1), Some(b'/') | Some(b'*')) => {
                    pos = self.skip_trivia(pos)?;
                }
                b'<' if looks_like_markup(bytes, pos) => {
                    let (saved_pos, saved_ids) = (self.pos, self.id_generator.clone());
                    self.pos = pos;
                    match self.parse_element() {
                        Ok(element) => {
                            pos = self.pos;
                            embedded.push(element);
                        }
                        // A comparison rather than markup
                        Err(_) => {
                            self.id_generator = saved_ids;
                            pos += 1;
                        }
                    }
                    self.pos = saved_pos;
                }
                _ => pos += 1,
            }
        }

        let expected: Vec<String> = terminators.iter().map(|b| format!("'{}'", *b as char)).collect();
        Err(ParseError::unexpected_eof(pos, expected.join(" or ")))
    }

    fn skip_string(&self, start: usize) -> ParseResult<usize> {
        let bytes = self.source.as_bytes();
        let quote = bytes[start];
        let mut pos = start + 1;

        while let Some(&byte) = bytes.get(pos) {
            match byte {
                b'\\' => pos += 2,
                b'\n' => return Err(ParseError::invalid_syntax(start, "Unterminated string literal")),
                _ if byte == quote => return Ok(pos + 1),
                _ => pos += 1,
            }
        }

        Err(ParseError::unexpected_eof(pos, "end of string literal"))
    }

    fn skip_template(&mut self, start: usize, embedded: &mut Vec<Element>) -> ParseResult<usize> {
        let source = self.source;
        let bytes = source.as_bytes();
        let mut pos = start + 1;

        while let Some(&byte) = bytes.get(pos) {
            match byte {
                b'\\' => pos += 2,
                b'`' => return Ok(pos + 1),
                b'$' if bytes.get(pos + 1) == Some(&b'{') => {
                    pos = self.scan_balanced(pos + 2, b"}", embedded)? + 1;
                }
                _ => pos += 1,
            }
        }

        Err(ParseError::unexpected_eof(pos, "end of template literal"))
    }

    /// Skip whitespace and comments, returning the next significant offset
    fn skip_trivia(&self, start: usize) -> ParseResult<usize> {
        let bytes = self.source.as_bytes();
        let mut pos = start;

        loop {
            match bytes.get(pos) {
                Some(b) if b.is_ascii_whitespace() => pos += 1,
                Some(b'/') if bytes.get(pos + 1) == Some(&b'/') => {
                    while pos < bytes.len() && bytes[pos] != b'\n' {
                        pos += 1;
                    }
                }
                Some(b'/') if bytes.get(pos + 1) == Some(&b'*') => {
                    match self.source[pos + 2..].find("*/") {
                        Some(offset) => pos = pos + 2 + offset + 2,
                        None => return Err(ParseError::unexpected_eof(bytes.len(), "'*/' to close comment")),
                    }
                }
                _ => return Ok(pos),
            }
        }
    }

    fn followed_by(&self, pos: usize, terminators: &[u8]) -> ParseResult<bool> {
        let next = self.skip_trivia(pos)?;
        Ok(self
            .source
            .as_bytes()
            .get(next)
            .map(|b| terminators.contains(b))
            .unwrap_or(false))
    }

    fn peek_token(&self) -> ParseResult<Option<(Token<'src>, Range<usize>)>> {
        match next_token(self.source, self.pos) {
            None => Ok(None),
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(pos)) if self.source.get(pos..).map_or(false, |rest| rest.starts_with("/*")) => {
                Err(ParseError::unexpected_eof(self.source.len(), "'*/' to close comment"))
            }
            Some(Err(pos)) => Err(ParseError::lexer_error(pos)),
        }
    }

    fn advance_token(&mut self, expected: &str) -> ParseResult<(Token<'src>, Range<usize>)> {
        match self.peek_token()? {
            Some((token, range)) => {
                self.pos = range.end;
                Ok((token, range))
            }
            None => Err(ParseError::unexpected_eof(self.source.len(), expected)),
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> ParseResult<Range<usize>> {
        let (found, range) = self.advance_token(expected)?;
        if std::mem::discriminant(&found) == std::mem::discriminant(&token) {
            Ok(range)
        } else {
            Err(ParseError::unexpected_token(range.start, expected, found.describe()))
        }
    }

    fn unexpected_at(&self, pos: usize, expected: &str) -> ParseError {
        match self.source.get(pos..).and_then(|rest| rest.chars().next()) {
            Some(found) => ParseError::unexpected_token(pos, expected, format!("'{}'", found)),
            None => ParseError::unexpected_eof(pos, expected),
        }
    }
}

/// `<` starts nested markup when followed by a tag name and preceded by an
/// operator position (`(`, `,`, `?`, `&&`, `=>`, ...).
fn looks_like_markup(bytes: &[u8], pos: usize) -> bool {
    let next_is_name = bytes
        .get(pos + 1)
        .map(|b| b.is_ascii_alphabetic())
        .unwrap_or(false);
    if !next_is_name {
        return false;
    }

    let previous = bytes[..pos].iter().rev().find(|b| !b.is_ascii_whitespace());
    match previous {
        None => true,
        Some(b) => matches!(b, b'(' | b',' | b'?' | b':' | b'&' | b'|' | b'>' | b'=' | b'{' | b'[' | b'}'),
    }
}

/// Decode JavaScript string escapes
pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('v') => out.push('\u{000B}'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\x");
                        out.push_str(&hex);
                    }
                }
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

pub fn parse(source: &str) -> ParseResult<Document> {
    parse_with_path(source, "<anonymous>")
}

pub fn parse_with_path(source: &str, path: &str) -> ParseResult<Document> {
    let id_generator = IDGenerator::new(path);
    let mut parser = Parser::new(source, id_generator);
    parser.parse_document()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element(source: &str) -> Element {
        let doc = parse(source).unwrap();
        doc.elements.into_iter().next().unwrap()
    }

    #[test]
    fn test_parse_simple_element() {
        let el = first_element("<div>hi</div>");

        assert_eq!(el.name, "div");
        assert!(!el.self_closing);
        assert_eq!(el.name_end, 4);
        assert_eq!(el.opening_end, 5);
        assert_eq!(el.closing_start, Some(7));
        assert_eq!(el.span.end, 13);

        match &el.children[0] {
            Node::Text(text) => assert_eq!(text.value, "hi"),
            other => panic!("Expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_self_closing_with_attributes() {
        let el = first_element(r#"<input placeholder="Your work email" disabled />"#);

        assert!(el.self_closing);
        assert!(el.written_self_closing());
        assert_eq!(el.attributes.len(), 2);
        assert_eq!(
            el.attribute("placeholder").and_then(|a| a.literal_value()),
            Some("Your work email")
        );
        assert!(el.attribute("disabled").unwrap().value.is_none());
    }

    #[test]
    fn test_parse_style_object() {
        let el = first_element(
            "<h1 style={{ fontSize: '28px', 'font-weight': \"bold\", flex: 1 }}>AcMem</h1>",
        );
        let style = el.attribute("style").unwrap();

        let object = match &style.value {
            Some(AttributeValue::Expression(ExpressionContainer {
                expression: Expression::Object(object),
                ..
            })) => object,
            other => panic!("Expected object literal, got {:?}", other),
        };

        let entries: Vec<(String, Option<String>)> = object
            .properties
            .iter()
            .map(|p| match p {
                Property::KeyValue(kv) => (kv.key.name.clone(), kv.value.as_style_value()),
                Property::Opaque(o) => (o.source.clone(), None),
            })
            .collect();

        assert_eq!(
            entries,
            vec![
                ("fontSize".to_string(), Some("28px".to_string())),
                ("font-weight".to_string(), Some("bold".to_string())),
                ("flex".to_string(), Some("1".to_string())),
            ]
        );
    }

    #[test]
    fn test_parse_nested_children_and_expressions() {
        let el = first_element("<ul>\n  {items.map(i => <li key={i}>{i}</li>)}\n  <li>static</li>\n</ul>");

        // text, expression, text, element, text
        assert_eq!(el.children.len(), 5);
        match &el.children[1] {
            Node::Expression(container) => match &container.expression {
                Expression::Opaque(o) => {
                    assert_eq!(o.source, "items.map(i => <li key={i}>{i}</li>)");
                    assert_eq!(o.elements.len(), 1);
                    assert_eq!(o.elements[0].name, "li");
                    assert_eq!(o.elements[0].span.start, 23);
                }
                other => panic!("Expected opaque, got {:?}", other),
            },
            other => panic!("Expected expression, got {:?}", other),
        }
        assert_eq!(el.children[3].as_element().unwrap().name, "li");
    }

    #[test]
    fn test_parse_spread_and_opaque_properties() {
        let el = first_element("<div {...rest} style={{ ...base, color }} />");

        assert!(matches!(el.attributes[0], Attribute::Spread(_)));
        let style = el.attribute("style").unwrap();
        match &style.value {
            Some(AttributeValue::Expression(ExpressionContainer {
                expression: Expression::Object(object),
                ..
            })) => {
                assert_eq!(object.properties.len(), 2);
                assert!(object.properties.iter().all(|p| matches!(p, Property::Opaque(_))));
            }
            other => panic!("Expected object literal, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_style_is_opaque() {
        let el = first_element("<div style={styles.card}></div>");
        match &el.attribute("style").unwrap().value {
            Some(AttributeValue::Expression(container)) => {
                assert!(matches!(container.expression, Expression::Opaque(_)));
            }
            other => panic!("Expected expression, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_roots_with_comments() {
        let doc = parse("// header\n<a></a>\n/* between */\n<b />\n").unwrap();
        assert_eq!(doc.elements.len(), 2);
        assert_eq!(doc.elements[1].name, "b");
    }

    #[test]
    fn test_block_comments_around_and_inside_tags() {
        let doc = parse("/* header */\n<div\n  /* why */\n  id=\"a\">hi</div>\n<p /* c */ />\n/* end */\n").unwrap();

        assert_eq!(doc.elements.len(), 2);
        assert_eq!(doc.elements[0].attribute("id").and_then(|a| a.literal_value()), Some("a"));
        assert!(doc.elements[1].self_closing);
    }

    #[test]
    fn test_comment_with_slashes_and_stars() {
        let doc = parse("<a /* x/y ** z */ href=\"/\" />").unwrap();
        assert_eq!(doc.elements[0].attribute("href").and_then(|a| a.literal_value()), Some("/"));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = parse("<div /* open >hi</div>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
        assert!(err.to_string().contains("*/"));
    }

    #[test]
    fn test_attribute_strings_keep_backslashes() {
        let el = first_element(r#"<div title="C:\" data-x='a\nb'>x</div>"#);

        assert_eq!(el.attribute("title").and_then(|a| a.literal_value()), Some("C:\\"));
        assert_eq!(el.attribute("data-x").and_then(|a| a.literal_value()), Some("a\\nb"));
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn test_unterminated_attribute_string() {
        let err = parse("<div title=\"abc>x</div>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = parse("<div>hi</span>").unwrap_err();
        assert_eq!(err.pos(), 9);
        assert!(err.to_string().contains("</div>"));
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse("<div><p>hi</p>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_fragments_rejected() {
        let err = parse("<><div /></>").unwrap_err();
        assert!(err.to_string().contains("Fragments"));
    }

    #[test]
    fn test_top_level_text_rejected() {
        let err = parse("hello <div />").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { pos: 0, .. }));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"it\'s"), "it's");
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r"A\u{1F600}"), "A\u{1F600}");
        assert_eq!(unescape(r"\x41"), "A");
    }

    #[test]
    fn test_span_ids_are_unique() {
        let doc = parse(r#"<div a="1"><span b={{ c: 'd' }}>x</span></div>"#).unwrap();
        let outer = &doc.elements[0];
        let inner = outer.children[0].as_element().unwrap();
        assert_ne!(outer.span.id, inner.span.id);
        assert_ne!(outer.span.id, doc.span.id);
    }
}
