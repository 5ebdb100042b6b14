//! Reader and writer for the small HTML subset weft templates use.
//!
//! Supported: elements, double/single-quoted and bare attributes, boolean
//! attributes, self-closing tags, void elements, comments, and the
//! `&amp; &lt; &gt; &quot; &#39; &apos;` entities. Everything else is text.

use crate::document::{Document, NodeData, NodeId, ROOT_TAG};
use crate::error::{MarkupError, MarkupResult};
use crate::host::HostTree;
use crate::lexer::{tokenize, Token};
use std::ops::Range;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parse markup into a new document
pub fn parse(source: &str) -> MarkupResult<Document> {
    let mut reader = Reader {
        source,
        tokens: tokenize(source),
        pos: 0,
        doc: Document::new(),
        open: Vec::new(),
    };
    reader.run()?;
    let mut doc = reader.doc;
    doc.reset_stats();
    Ok(doc)
}

struct OpenElement {
    node: NodeId,
    tag: String,
    pos: usize,
}

/// Recursive descent over the markup token stream, keeping the stack of
/// elements still waiting for their closing tag
struct Reader<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    doc: Document,
    open: Vec<OpenElement>,
}

impl<'src> Reader<'src> {
    fn run(&mut self) -> MarkupResult<()> {
        while let Some((token, span)) = self.peek() {
            match token {
                Token::Text(_) => self.read_text()?,
                Token::Comment(content) => {
                    self.advance();
                    let node = self.doc.create_comment(content);
                    self.attach(node, span.start)?;
                }
                Token::TagOpen(name) => {
                    self.advance();
                    self.read_opening_tag(name, span.start)?;
                }
                Token::TagClose(name) => {
                    self.advance();
                    self.close_element(name, span.start)?;
                }
                Token::UnclosedComment => {
                    return Err(MarkupError::unexpected_eof(
                        self.source.len(),
                        "unterminated comment",
                    ));
                }
                other => {
                    return Err(MarkupError::invalid_syntax(
                        span.start,
                        format!("unexpected {:?} outside of a tag", other),
                    ));
                }
            }
        }

        if let Some(unclosed) = self.open.pop() {
            return Err(MarkupError::UnclosedElement {
                pos: unclosed.pos,
                tag: unclosed.tag,
            });
        }
        Ok(())
    }

    fn peek(&self) -> Option<(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos).cloned()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn current_parent(&self) -> NodeId {
        self.open
            .last()
            .map(|open| open.node)
            .unwrap_or_else(|| self.doc.root())
    }

    fn attach(&mut self, node: NodeId, pos: usize) -> MarkupResult<()> {
        let parent = self.current_parent();
        self.doc
            .append_child(parent, node)
            .map_err(|err| MarkupError::invalid_syntax(pos, err.to_string()))
    }

    /// Adjacent text tokens, stray `<` included, become one text node
    fn read_text(&mut self) -> MarkupResult<()> {
        let mut range: Option<Range<usize>> = None;
        while let Some((Token::Text(_), span)) = self.peek() {
            self.advance();
            range = Some(match range {
                Some(range) => range.start..span.end,
                None => span,
            });
        }
        let Some(range) = range else {
            return Ok(());
        };
        let node = self.doc.create_text(decode_entities(&self.source[range.clone()]));
        self.attach(node, range.start)
    }

    fn read_opening_tag(&mut self, name: &str, start: usize) -> MarkupResult<()> {
        let tag = name.to_ascii_lowercase();
        let mut attributes = Vec::new();

        let self_closing = loop {
            let Some((token, span)) = self.peek() else {
                return Err(MarkupError::unexpected_eof(
                    self.source.len(),
                    format!("unterminated <{}> tag", tag),
                ));
            };
            self.advance();
            match token {
                Token::TagEnd => break false,
                Token::SelfClose => break true,
                Token::Name(attribute) => {
                    let value = self.read_attribute_value()?;
                    attributes.push((attribute.to_ascii_lowercase(), value));
                }
                _ => {
                    return Err(MarkupError::invalid_syntax(
                        span.start,
                        format!("unexpected character in <{}> tag", tag),
                    ));
                }
            }
        };

        let node = self.doc.create_element(tag.clone());
        for (name, value) in attributes {
            self.doc
                .set_attribute(node, &name, &value)
                .map_err(|err| MarkupError::invalid_syntax(start, err.to_string()))?;
        }
        self.attach(node, start)?;

        if !self_closing && !is_void_element(&tag) {
            self.open.push(OpenElement {
                node,
                tag,
                pos: start,
            });
        }
        Ok(())
    }

    /// Value after an attribute name; a name without `=` is a boolean
    /// attribute with an empty value
    fn read_attribute_value(&mut self) -> MarkupResult<String> {
        if !matches!(self.peek(), Some((Token::Equals, _))) {
            return Ok(String::new());
        }
        self.advance();

        match self.peek() {
            Some((Token::Quoted(raw) | Token::Name(raw), _)) => {
                self.advance();
                Ok(decode_entities(raw))
            }
            Some((Token::Invalid, span)) => Err(MarkupError::invalid_syntax(
                span.start,
                "unterminated or malformed attribute value",
            )),
            _ => Ok(String::new()),
        }
    }

    fn close_element(&mut self, name: &str, start: usize) -> MarkupResult<()> {
        let tag = name.to_ascii_lowercase();
        match self.open.pop() {
            Some(open) if open.tag == tag => Ok(()),
            Some(open) => Err(MarkupError::MismatchedClosingTag {
                pos: start,
                expected: open.tag,
                found: tag,
            }),
            None => Err(MarkupError::UnexpectedClosingTag { pos: start, tag }),
        }
    }
}

pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Markup of `node` including its own tag
pub fn serialize(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

/// Markup of the children of `node`
pub fn serialize_children(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    for child in doc.child_nodes(node) {
        write_node(doc, *child, &mut out);
    }
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    match doc.get(node) {
        Some(NodeData::Text { content }) => out.push_str(&escape_text(content)),
        Some(NodeData::Comment { content }) => {
            out.push_str("<!--");
            out.push_str(content);
            out.push_str("-->");
        }
        Some(NodeData::Element { tag, .. }) if tag == ROOT_TAG => {
            out.push_str(&serialize_children(doc, node));
        }
        Some(NodeData::Element { tag, attributes }) => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }
            out.push('>');
            if is_void_element(tag) {
                return;
            }
            for child in doc.child_nodes(node) {
                write_node(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        None => {}
    }
}
