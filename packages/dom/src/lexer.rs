use logos::{Lexer, Logos};
use std::ops::Range;

/// Lexemes of markup, flattened from the content and in-tag lexers
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    /// Character data between tags, entities still encoded
    Text(&'src str),
    /// Body of a `<!-- -->` comment
    Comment(&'src str),
    /// `<name`, starting an opening tag
    TagOpen(&'src str),
    /// `</name>`
    TagClose(&'src str),
    /// Attribute name or unquoted attribute value
    Name(&'src str),
    Equals,
    /// Quoted attribute value without its quotes
    Quoted(&'src str),
    /// `>`
    TagEnd,
    /// `/>`
    SelfClose,
    /// `<!--` with no matching `-->`
    UnclosedComment,
    /// Character that cannot appear inside a tag
    Invalid,
}

/// Lexemes outside of tags
#[derive(Logos, Debug, Clone, PartialEq)]
enum Content<'src> {
    #[token("<!--", comment_body)]
    Comment(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9_:\-]*[ \t\r\n\f]*>", |lex| {
        lex.slice()[2..lex.slice().len() - 1].trim_end()
    })]
    TagClose(&'src str),

    #[regex(r"<[a-zA-Z][a-zA-Z0-9_:\-]*", |lex| &lex.slice()[1..])]
    TagOpen(&'src str),

    #[regex(r"[^<]+")]
    Text,

    // A `<` that starts no tag or comment is literal text
    #[token("<")]
    Lt,
}

/// Lexemes between `<name` and the closing `>` or `/>`
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum InTag<'src> {
    #[token(">")]
    End,

    #[token("/>")]
    SelfClose,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    #[regex(r#"'[^']*'"#, |lex| unquote(lex.slice()))]
    Quoted(&'src str),

    #[regex(r#"[^ \t\r\n\f"'=<>/]+(/[^ \t\r\n\f"'=<>/]+)*"#, |lex| lex.slice())]
    Name(&'src str),
}

fn comment_body<'src>(lex: &mut Lexer<'src, Content<'src>>) -> Option<&'src str> {
    let end = lex.remainder().find("-->")?;
    let body = &lex.remainder()[..end];
    lex.bump(end + 3);
    Some(body)
}

fn unquote(slice: &str) -> &str {
    &slice[1..slice.len() - 1]
}

/// Tokenize markup, switching to the in-tag lexer after every `<name`
pub fn tokenize(source: &str) -> Vec<(Token<'_>, Range<usize>)> {
    let mut tokens = Vec::new();
    let mut content = Content::lexer(source);

    while let Some(result) = content.next() {
        let span = content.span();
        let token = match result {
            Ok(Content::TagOpen(name)) => {
                tokens.push((Token::TagOpen(name), span));
                let mut tag = content.morph::<InTag>();
                lex_tag(&mut tag, &mut tokens);
                content = tag.morph();
                continue;
            }
            Ok(Content::Comment(body)) => Token::Comment(body),
            Ok(Content::TagClose(name)) => Token::TagClose(name),
            Ok(Content::Text | Content::Lt) => Token::Text(content.slice()),
            Err(()) => Token::UnclosedComment,
        };
        tokens.push((token, span));
    }

    tokens
}

fn lex_tag<'src>(
    tag: &mut Lexer<'src, InTag<'src>>,
    tokens: &mut Vec<(Token<'src>, Range<usize>)>,
) {
    while let Some(result) = tag.next() {
        let token = match result {
            Ok(InTag::End) => Token::TagEnd,
            Ok(InTag::SelfClose) => Token::SelfClose,
            Ok(InTag::Equals) => Token::Equals,
            Ok(InTag::Quoted(value)) => Token::Quoted(value),
            Ok(InTag::Name(name)) => Token::Name(name),
            Err(()) => Token::Invalid,
        };
        let done = matches!(token, Token::TagEnd | Token::SelfClose | Token::Invalid);
        tokens.push((token, tag.span()));
        if done {
            return;
        }
    }
}
