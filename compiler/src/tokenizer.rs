use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::GenaError;
use crate::utils::error;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Start {
        name:       String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    End {
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind:   TokenKind,
    pub line:   usize,
    pub column: usize,
}

/// Byte offset to 1-based line/column.
struct Positions {
    line_starts: Vec<usize>,
}

impl Positions {
    fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Positions { line_starts }
    }

    fn locate(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }
}

/// Turns protocol XML into start/text/end tokens. Self-closing elements
/// produce a `Start` immediately followed by an `End`. Comments, processing
/// instructions and the declaration are dropped.
pub fn tokenize_protocol(text: &str) -> Result<Vec<Token>, GenaError> {
    let positions = Positions::new(text);
    let mut reader = Reader::from_str(text);
    let mut tokens = Vec::new();

    loop {
        let offset = reader.buffer_position() as usize;
        let (line, column) = positions.locate(offset.min(text.len()));
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                let (line, column) =
                    positions.locate((reader.error_position() as usize).min(text.len()));
                return Err(error(&format!("Malformed XML: {}", e), line, column));
            }
        };

        match event {
            Event::Start(start) => {
                tokens.push(start_token(&start, line, column)?);
            }
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                tokens.push(start_token(&start, line, column)?);
                tokens.push(Token { kind: TokenKind::End { name }, line, column });
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                tokens.push(Token { kind: TokenKind::End { name }, line, column });
            }
            Event::Text(t) => {
                let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                tokens.push(Token { kind: TokenKind::Text(text), line, column });
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                tokens.push(Token { kind: TokenKind::Text(text), line, column });
            }
            Event::Eof => break,
            _ => continue,
        }
    }

    Ok(tokens)
}

fn start_token(start: &BytesStart, line: usize, column: usize) -> Result<Token, GenaError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    // Duplicate attributes are reported by the parser with the tag name.
    let mut attrs = start.attributes();
    attrs.with_checks(false);
    for attr in attrs {
        let attr = attr.map_err(|e| {
            error(&format!("Malformed attribute in <{}>: {}", name, e), line, column)
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| {
            error(
                &format!("Malformed value of attribute {} in <{}>: {}", key, name, e),
                line,
                column,
            )
        })?;
        attributes.push((key, value.into_owned()));
    }

    Ok(Token {
        kind: TokenKind::Start { name, attributes },
        line,
        column,
    })
}
