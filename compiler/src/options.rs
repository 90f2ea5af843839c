use wl_gena_schema::Protocol;

/// Knobs for header generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Preprocessor lines copied verbatim after `#pragma once`.
    pub includes:  Vec<String>,
    /// Documents whose interfaces may be referenced but are not emitted.
    pub context:   Vec<Protocol>,
    /// Namespace enclosing the per-protocol namespace.
    pub namespace: Option<String>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        GenerateOptions::default()
    }

    /// Adds an include for `path`: `/cstdint` becomes `#include <cstdint>`,
    /// anything else is included in quotes.
    pub fn include(mut self, path: &str) -> Self {
        self.includes.push(include_directive(path));
        self
    }

    pub fn context(mut self, protocol: Protocol) -> Self {
        self.context.push(protocol);
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

pub fn include_directive(path: &str) -> String {
    match path.strip_prefix('/') {
        Some(system) => format!("#include <{}>", system),
        None => format!("#include \"{}\"", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_directive() {
        assert_eq!(include_directive("/cstdint"), "#include <cstdint>");
        assert_eq!(include_directive("wayland.hh"), "#include \"wayland.hh\"");
    }

    #[test]
    fn test_builder() {
        let options = GenerateOptions::new()
            .include("/cstddef")
            .include("traits.hh")
            .namespace("wl");
        assert_eq!(options.includes, vec!["#include <cstddef>", "#include \"traits.hh\""]);
        assert_eq!(options.namespace.as_deref(), Some("wl"));
        assert!(options.context.is_empty());
    }
}
