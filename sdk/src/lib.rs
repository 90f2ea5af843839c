//! wl-gena
//!
//! Front door to the protocol compiler.
//!
//! - `compile_protocol` / `xml_to_json` for the parsed data model
//! - `generate_header_from_xml` for the C++ client bindings
//! - `load_protocols` for reading context documents from disk

use std::{fs, path::Path};

pub use wl_gena_compiler::error::GenaError;
pub use wl_gena_compiler::{
    compile_header, compile_protocol, dependency_dot, generate_header, protocol_to_json,
    GenerateOptions,
};
pub use wl_gena_schema::{Arg, ArgType, Entry, Enum, Interface, Message, MessageKind, Protocol};

/// Parse protocol XML into a pretty-printed JSON string.
pub fn xml_to_json(text: &str) -> Result<String, GenaError> {
    protocol_to_json(&compile_protocol(text)?)
}

/// Parse protocol XML and render its header, with `context` XML documents
/// available for cross-protocol references.
pub fn generate_header_from_xml(
    text: &str,
    context: &[&str],
    options: GenerateOptions,
) -> Result<String, GenaError> {
    let mut options = options;
    for doc in context {
        options.context.push(compile_protocol(doc)?);
    }
    compile_header(text, &options)
}

/// Read and parse every protocol file in `paths`.
pub fn load_protocols<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Protocol>, GenaError> {
    paths
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path)?;
            compile_protocol(&text)
        })
        .collect()
}

pub mod error {
    pub use wl_gena_compiler::error::GenaError;
}

pub mod schema {
    pub use wl_gena_schema::{Arg, ArgType, Entry, Enum, Interface, Message, MessageKind, Protocol};
}
