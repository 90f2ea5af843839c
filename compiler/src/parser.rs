use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::{
    error::GenaError,
    tokenizer::{Token, TokenKind},
    utils::{error, quote},
};
use wl_gena_schema::{Arg, ArgType, Entry, Enum, Interface, Message, MessageKind, Protocol};

lazy_static! {
    static ref DECIMAL: Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref HEX:     Regex = Regex::new(r"^0[xX]([0-9A-Fa-f]+)$").unwrap();
}

/// Recognized element names. Everything else is documentation and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Protocol,
    Interface,
    Request,
    Event,
    Enum,
    Entry,
    Arg,
}

impl Tag {
    fn parse(name: &str) -> Option<Tag> {
        match name {
            "protocol"  => Some(Tag::Protocol),
            "interface" => Some(Tag::Interface),
            "request"   => Some(Tag::Request),
            "event"     => Some(Tag::Event),
            "enum"      => Some(Tag::Enum),
            "entry"     => Some(Tag::Entry),
            "arg"       => Some(Tag::Arg),
            _ => None,
        }
    }
}

/// Node under construction.
#[derive(Debug)]
enum ParseTarget {
    Protocol(Protocol),
    Interface(Interface),
    Request(Message),
    Event(Message),
    Enum(Enum),
    Entry(Entry),
    Arg(Arg),
}

impl ParseTarget {
    fn tag(&self) -> Tag {
        match self {
            ParseTarget::Protocol(_)  => Tag::Protocol,
            ParseTarget::Interface(_) => Tag::Interface,
            ParseTarget::Request(_)   => Tag::Request,
            ParseTarget::Event(_)     => Tag::Event,
            ParseTarget::Enum(_)      => Tag::Enum,
            ParseTarget::Entry(_)     => Tag::Entry,
            ParseTarget::Arg(_)       => Tag::Arg,
        }
    }

    fn describe(&self) -> String {
        let (tag, name) = match self {
            ParseTarget::Protocol(p)  => ("protocol", &p.name),
            ParseTarget::Interface(i) => ("interface", &i.name),
            ParseTarget::Request(m)   => ("request", &m.name),
            ParseTarget::Event(m)     => ("event", &m.name),
            ParseTarget::Enum(e)      => ("enum", &e.name),
            ParseTarget::Entry(e)     => ("entry", &e.name),
            ParseTarget::Arg(a)       => ("arg", &a.name),
        };
        format!("<{} name=[{}]>", tag, name)
    }
}

/// Attributes of one start tag, keyed by name.
struct Attributes<'a> {
    tag:    &'a str,
    values: HashMap<&'a str, &'a str>,
    line:   usize,
    column: usize,
}

impl<'a> Attributes<'a> {
    fn new(
        tag: &'a str,
        attributes: &'a [(String, String)],
        line: usize,
        column: usize,
    ) -> Result<Self, GenaError> {
        let mut values = HashMap::new();
        for (key, value) in attributes {
            if values.insert(key.as_str(), value.as_str()).is_some() {
                return Err(error(
                    &format!("Duplicate attribute [{}=[{}]] in <{}>", key, value, tag),
                    line,
                    column,
                ));
            }
        }
        Ok(Attributes { tag, values, line, column })
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.values.get(key).copied()
    }

    fn required(&self, key: &str) -> Result<&'a str, GenaError> {
        self.get(key).ok_or_else(|| {
            self.error(&format!("Missing required attribute \"{}\" in <{}>", key, self.tag))
        })
    }

    fn required_number(&self, key: &str) -> Result<(u32, bool), GenaError> {
        let text = self.required(key)?;
        self.number(key, text)
    }

    fn optional_number(&self, key: &str) -> Result<Option<u32>, GenaError> {
        match self.get(key) {
            Some(text) => Ok(Some(self.number(key, text)?.0)),
            None => Ok(None),
        }
    }

    /// Decimal or `0x`-prefixed hexadecimal. The flag tells which.
    fn number(&self, key: &str, text: &str) -> Result<(u32, bool), GenaError> {
        let parsed = if let Some(caps) = HEX.captures(text) {
            u32::from_str_radix(&caps[1], 16).ok().map(|v| (v, true))
        } else if DECIMAL.is_match(text) {
            text.parse::<u32>().ok().map(|v| (v, false))
        } else {
            None
        };
        parsed.ok_or_else(|| {
            self.error(&format!(
                "Invalid integer {} for attribute \"{}\" in <{}>",
                quote(text),
                key,
                self.tag
            ))
        })
    }

    fn error(&self, msg: &str) -> GenaError {
        error(msg, self.line, self.column)
    }
}

/// Builds a `Protocol` from tokenizer events.
pub fn parse_protocol(tokens: &[Token]) -> Result<Protocol, GenaError> {
    let mut targets: Vec<ParseTarget> = Vec::new();
    let mut output: Option<Protocol> = None;

    for token in tokens {
        match &token.kind {
            TokenKind::Start { name, attributes } => {
                let Some(tag) = Tag::parse(name) else { continue };
                let attrs = Attributes::new(name, attributes, token.line, token.column)?;
                let target = start_target(tag, &attrs, targets.last())?;
                targets.push(target);
            }
            TokenKind::End { name } => {
                let Some(tag) = Tag::parse(name) else { continue };
                let child = match targets.pop() {
                    Some(child) if child.tag() == tag => child,
                    Some(child) => {
                        return Err(error(
                            &format!("Unexpected </{}> while parsing {}", name, child.describe()),
                            token.line,
                            token.column,
                        ))
                    }
                    None => {
                        return Err(error(
                            &format!("Unexpected </{}>", name),
                            token.line,
                            token.column,
                        ))
                    }
                };
                finish_target(child, &mut targets, &mut output)
                    .map_err(|msg| error(&msg, token.line, token.column))?;
            }
            TokenKind::Text(_) => continue,
        }
    }

    if let Some(open) = targets.last() {
        let (line, column) = tokens.last().map(|t| (t.line, t.column)).unwrap_or((0, 0));
        return Err(error(&format!("Unclosed {}", open.describe()), line, column));
    }

    let protocol = output.ok_or(GenaError::MissingProtocol)?;
    debug!(
        protocol = %protocol.name,
        interfaces = protocol.interfaces.len(),
        "parsed protocol"
    );
    Ok(protocol)
}

fn start_target(
    tag: Tag,
    attrs: &Attributes,
    parent: Option<&ParseTarget>,
) -> Result<ParseTarget, GenaError> {
    let target = match tag {
        Tag::Protocol => ParseTarget::Protocol(Protocol {
            name:       attrs.required("name")?.to_string(),
            interfaces: Vec::new(),
        }),
        Tag::Interface => ParseTarget::Interface(Interface {
            name:     attrs.required("name")?.to_string(),
            version:  attrs.required_number("version")?.0,
            requests: Vec::new(),
            events:   Vec::new(),
            enums:    Vec::new(),
        }),
        Tag::Request => {
            let kind = match attrs.get("type") {
                None => None,
                Some("destructor") => Some(MessageKind::Destructor),
                Some(other) => {
                    return Err(attrs.error(&format!("Unknown request type [{}]", other)))
                }
            };
            ParseTarget::Request(Message {
                name:  attrs.required("name")?.to_string(),
                kind,
                since: attrs.optional_number("since")?,
                args:  Vec::new(),
            })
        }
        Tag::Event => ParseTarget::Event(Message {
            name:  attrs.required("name")?.to_string(),
            kind:  None,
            since: attrs.optional_number("since")?,
            args:  Vec::new(),
        }),
        Tag::Enum => {
            let Some(name) = attrs.get("name") else {
                let msg = match parent {
                    Some(parent) => format!("Found unnamed enum tag in {}", parent.describe()),
                    None => "Found unnamed enum tag".to_string(),
                };
                return Err(attrs.error(&msg));
            };
            ParseTarget::Enum(Enum { name: name.to_string(), entries: Vec::new() })
        }
        Tag::Entry => {
            let name = attrs.required("name")?.to_string();
            let (value, is_hex) = attrs.required_number("value")?;
            ParseTarget::Entry(Entry { name, value, is_hex })
        }
        Tag::Arg => {
            let name = attrs.required("name")?.to_string();
            let ty = parse_arg_type(attrs)?;
            ParseTarget::Arg(Arg { name, ty })
        }
    };
    Ok(target)
}

fn parse_arg_type(attrs: &Attributes) -> Result<ArgType, GenaError> {
    let type_name = attrs.required("type")?;
    let interface = attrs.get("interface").map(str::to_string);

    let ty = match type_name {
        "int" => ArgType::Int,
        "uint" => match attrs.get("enum") {
            None => ArgType::UInt,
            Some(location) => match location.split_once('.') {
                Some((owner, enum_name)) => ArgType::UIntEnum {
                    enum_name: enum_name.to_string(),
                    interface: Some(owner.to_string()),
                },
                None => ArgType::UIntEnum {
                    enum_name: location.to_string(),
                    interface: None,
                },
            },
        },
        "fixed" => ArgType::Fixed,
        "string" => {
            if nullable(attrs)? {
                ArgType::NullableString
            } else {
                ArgType::String
            }
        }
        "object" => {
            if nullable(attrs)? {
                ArgType::NullableObject { interface }
            } else {
                ArgType::Object { interface }
            }
        }
        "new_id" => ArgType::NewId { interface },
        "array" => ArgType::Array,
        "fd" => ArgType::Fd,
        other => {
            return Err(attrs.error(&format!("[{}] is unknown type", other)));
        }
    };
    Ok(ty)
}

fn nullable(attrs: &Attributes) -> Result<bool, GenaError> {
    match attrs.get("allow-null") {
        None => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(attrs.error(&format!(
            "for tag <arg> \"allow-null\" attribute value must be set to \"true\", got [{}] instead",
            other
        ))),
    }
}

/// Attaches a finished node to the node below it on the stack.
fn finish_target(
    child: ParseTarget,
    targets: &mut [ParseTarget],
    output: &mut Option<Protocol>,
) -> Result<(), String> {
    let parent = targets.last_mut();
    match child {
        ParseTarget::Protocol(protocol) => attach_protocol(protocol, parent, output),
        ParseTarget::Interface(interface) => match parent {
            Some(ParseTarget::Protocol(p)) => {
                p.interfaces.push(interface);
                Ok(())
            }
            other => Err(misplaced(&ParseTarget::Interface(interface), other)),
        },
        ParseTarget::Request(request) => match parent {
            Some(ParseTarget::Interface(i)) => {
                i.requests.push(request);
                Ok(())
            }
            other => Err(misplaced(&ParseTarget::Request(request), other)),
        },
        ParseTarget::Event(event) => match parent {
            Some(ParseTarget::Interface(i)) => {
                i.events.push(event);
                Ok(())
            }
            other => Err(misplaced(&ParseTarget::Event(event), other)),
        },
        ParseTarget::Enum(e) => match parent {
            Some(ParseTarget::Interface(i)) => {
                i.enums.push(e);
                Ok(())
            }
            other => Err(misplaced(&ParseTarget::Enum(e), other)),
        },
        ParseTarget::Entry(entry) => match parent {
            Some(ParseTarget::Enum(e)) => {
                e.entries.push(entry);
                Ok(())
            }
            other => Err(misplaced(&ParseTarget::Entry(entry), other)),
        },
        ParseTarget::Arg(arg) => attach_arg(arg, parent),
    }
}

fn attach_protocol(
    protocol: Protocol,
    parent: Option<&mut ParseTarget>,
    output: &mut Option<Protocol>,
) -> Result<(), String> {
    if let Some(parent) = parent {
        return Err(misplaced(&ParseTarget::Protocol(protocol), Some(parent)));
    }
    if let Some(first) = output {
        return Err(format!(
            "Found multiple protocols ([{}] and [{}]), only one per document is supported",
            first.name, protocol.name
        ));
    }
    *output = Some(protocol);
    Ok(())
}

fn attach_arg(arg: Arg, parent: Option<&mut ParseTarget>) -> Result<(), String> {
    match parent {
        Some(ParseTarget::Request(m)) | Some(ParseTarget::Event(m)) => {
            m.args.push(arg);
            Ok(())
        }
        other => Err(misplaced(&ParseTarget::Arg(arg), other)),
    }
}

fn misplaced(child: &ParseTarget, parent: Option<&mut ParseTarget>) -> String {
    match parent {
        Some(parent) => format!("Attempt to add {} to {}", child.describe(), parent.describe()),
        None => format!("Found {} outside of <protocol>", child.describe()),
    }
}
