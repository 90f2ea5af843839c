//! wl-gena-compiler
//!
//! This crate implements:
//!  1) A tokenizer (over `quick-xml`) + stack parser for Wayland-style protocol XML,
//!  2) A directed graph engine and a name-keyed dependency graph on top of it,
//!  3) Interface namespace resolution across the primary and context documents,
//!  4) C++ client header generation with run-time type tables (`generate_header`),
//!  5) Error types (`GenaError`).

pub mod error;
pub mod utils;
pub mod graph;
pub mod dependency;
pub mod tokenizer;
pub mod parser;
pub mod resolver;
pub mod options;
pub mod gen_cpp;
pub mod compiler;

pub use compiler::{compile_header, compile_protocol, dependency_dot, protocol_to_json};
pub use error::GenaError;
pub use gen_cpp::{generate_header, order_interfaces, wire_signature};
pub use options::GenerateOptions;
