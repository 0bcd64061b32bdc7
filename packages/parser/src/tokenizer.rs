use logos::Logos;
use std::ops::Range;

/// Tokens that appear inside markup tags and object literals.
///
/// Text children and opaque expressions are not tokenized; the parser scans
/// those byte-wise so their source is kept exactly as written.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token<'src> {
    /// `/* ... */`; never returned by [`next_token`] or [`tokenize`]
    #[token("/*", block_comment)]
    BlockComment,

    #[token("</")]
    LAngleSlash,

    #[token("<")]
    LAngle,

    #[token("/>")]
    SlashRAngle,

    #[token(">")]
    RAngle,

    #[token("=")]
    Equals,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token("...")]
    Ellipsis,

    // Tag, attribute and property names (`div`, `data-uid`, `Foo.Bar`, `xlink:href`)
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*([-.:][A-Za-z_$][A-Za-z0-9_$]*)*", |lex| lex.slice())]
    Name(&'src str),

    // String literals, quotes included
    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\]|\\.)*'", |lex| lex.slice())]
    Str(&'src str),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),
}

/// Consume the rest of a block comment; an unterminated comment is a lexer error
fn block_comment<'src>(lex: &mut logos::Lexer<'src, Token<'src>>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

impl<'src> Token<'src> {
    /// Human readable form used in error messages
    pub fn describe(&self) -> String {
        match self {
            Token::BlockComment => "comment".to_string(),
            Token::LAngleSlash => "'</'".to_string(),
            Token::LAngle => "'<'".to_string(),
            Token::SlashRAngle => "'/>'".to_string(),
            Token::RAngle => "'>'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Ellipsis => "'...'".to_string(),
            Token::Name(name) => format!("name '{}'", name),
            Token::Str(s) => format!("string {}", s),
            Token::Number(n) => format!("number {}", n),
        }
    }
}

/// Tokenize a whole tag-level snippet (used by tests and diagnostics)
pub fn tokenize(source: &str) -> Vec<(Token<'_>, Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .filter_map(|(result, span)| match result {
            Ok(Token::BlockComment) | Err(_) => None,
            Ok(token) => Some((token, span)),
        })
        .collect()
}

/// Lex a single token starting at `offset`, skipping leading whitespace and comments.
///
/// Returns `None` at end of input and `Some(Err(pos))` for unrecognized input.
pub fn next_token(source: &str, offset: usize) -> Option<Result<(Token<'_>, Range<usize>), usize>> {
    let mut lexer = Token::lexer(&source[offset..]);
    loop {
        let result = lexer.next()?;
        let span = lexer.span();
        let range = (offset + span.start)..(offset + span.end);
        match result {
            Ok(Token::BlockComment) => continue,
            Ok(token) => return Some(Ok((token, range))),
            Err(()) => return Some(Err(range.start)),
        }
    }
}
