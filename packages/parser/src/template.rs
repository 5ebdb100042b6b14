use crate::placeholder::PlaceholderToken;
use crate::tokenizer::{tokenize, Token};

/// Piece of a parsed template string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Index into [`Template::tokens`]
    Placeholder(usize),
}

/// Text or attribute content split into literal runs and placeholders.
///
/// `tokens` holds each distinct placeholder once, in order of first
/// occurrence; `segments` refers back to it for every occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    tokens: Vec<PlaceholderToken>,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let mut tokens: Vec<PlaceholderToken> = Vec::new();
        let mut segments = Vec::new();
        let mut literal = String::new();

        for (token, span) in tokenize(source) {
            match token {
                Token::Placeholder(body) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let parsed = PlaceholderToken::from_body(body);
                    let index = match tokens.iter().position(|t| *t == parsed) {
                        Some(index) => index,
                        None => {
                            tokens.push(parsed);
                            tokens.len() - 1
                        }
                    };
                    segments.push(Segment::Placeholder(index));
                }
                Token::Text | Token::Brace => literal.push_str(&source[span]),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            source: source.to_string(),
            tokens,
            segments,
        }
    }

    /// The unsubstituted text
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[PlaceholderToken] {
        &self.tokens
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_placeholders(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Substitute every placeholder occurrence with `value_of(token)`
    pub fn render<F>(&self, mut value_of: F) -> String
    where
        F: FnMut(&PlaceholderToken) -> String,
    {
        let values: Vec<String> = self.tokens.iter().map(&mut value_of).collect();
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(index) => out.push_str(&values[*index]),
            }
        }
        out
    }
}

/// Placeholders of `text`, once each, in order of first occurrence
pub fn scan(text: &str) -> Vec<PlaceholderToken> {
    Template::parse(text).tokens
}
