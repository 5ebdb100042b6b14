use logos::Logos;
use std::ops::Range;

/// Lexemes of bound text content.
///
/// Everything that is not a well-formed placeholder lexes as literal text,
/// so a stray or unterminated `{{` never produces an error.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    #[regex(r"\{\{[a-z0-9]+(\.[a-z0-9]+)*\}\}", |lex| {
        let slice = lex.slice();
        &slice[2..slice.len() - 2]
    })]
    Placeholder(&'src str),

    #[regex(r"[^{]+")]
    Text,

    #[token("{")]
    Brace,
}

/// Tokenize bound text content
pub fn tokenize(source: &str) -> Vec<(Token<'_>, Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .map(|(result, span)| (result.unwrap_or(Token::Text), span))
        .collect()
}
