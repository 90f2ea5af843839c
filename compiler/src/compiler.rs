use crate::{
    error::GenaError,
    gen_cpp::{dependency_graph, generate_header},
    options::GenerateOptions,
    parser::parse_protocol,
    resolver::Namespaces,
    tokenizer::tokenize_protocol,
};
use wl_gena_schema::Protocol;

/// Parse protocol XML into a `Protocol`.
/// Returns `Err(GenaError)` if the XML is malformed or does not describe
/// exactly one protocol.
pub fn compile_protocol(text: &str) -> Result<Protocol, GenaError> {
    let tokens = tokenize_protocol(text)?;
    parse_protocol(&tokens)
}

/// Pretty-printed JSON dump of a parsed protocol.
pub fn protocol_to_json(protocol: &Protocol) -> Result<String, GenaError> {
    Ok(serde_json::to_string_pretty(protocol)?)
}

/// Parse protocol XML and render its C++ header.
pub fn compile_header(text: &str, options: &GenerateOptions) -> Result<String, GenaError> {
    let protocol = compile_protocol(text)?;
    generate_header(&protocol, options)
}

/// Graphviz rendering of the enum dependencies between `protocol` and
/// `context` interfaces.
pub fn dependency_dot(protocol: &Protocol, context: &[Protocol]) -> Result<String, GenaError> {
    let namespaces = Namespaces::new(protocol, context, None)?;
    Ok(dependency_graph(&namespaces)?.dump())
}
