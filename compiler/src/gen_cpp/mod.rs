//! C++ client header generation.
//!
//! The header holds, inside `namespace [top::]protocol`, one class template
//! per interface parameterized on a traits type that supplies the client
//! library (`client_library_t`, `wl_proxy_t`, `wl_interface_t`,
//! `wl_message_t`, `wl_display_t`), followed by the `rtti` descriptor
//! tables the library marshals against.

mod interface;
mod request;
mod rtti;
mod types;

pub use interface::{emit_enum, entry_name};
pub use rtti::{carries_types, wire_signature, TypeTable};
pub use types::cpp_type;

use tracing::debug;

use crate::{
    dependency::{DependencyCycle, DependencyGraph},
    error::GenaError,
    options::GenerateOptions,
    resolver::Namespaces,
    utils::{separated, Lines},
};
use wl_gena_schema::{Interface, Protocol};

/// Enum-ownership dependencies between every visible interface. An interface
/// referencing its own enums adds no edge.
pub fn dependency_graph(namespaces: &Namespaces) -> Result<DependencyGraph, GenaError> {
    let mut graph = DependencyGraph::new();
    // Reversed insertion keeps unrelated interfaces in document order once the
    // sorted list is flipped.
    for iface in namespaces.interfaces().iter().rev() {
        graph.add_node(&iface.name);
    }
    for iface in namespaces.interfaces() {
        for provider in iface.enum_providers() {
            if provider == iface.name {
                continue;
            }
            if !graph.contains(provider) {
                return Err(GenaError::UnknownInterface(provider.to_string()));
            }
            graph.add_dependency(provider, &iface.name);
        }
    }
    Ok(graph)
}

/// Interfaces of `protocol`, each after the interfaces whose enums it uses.
pub fn order_interfaces<'a>(
    protocol: &'a Protocol,
    namespaces: &Namespaces,
) -> Result<Vec<&'a Interface>, GenaError> {
    let graph = dependency_graph(namespaces)?;
    let mut names = graph
        .topo_sorted()
        .map_err(|DependencyCycle(names)| GenaError::Cycle(names))?;
    // topo_sorted lists dependents first.
    names.reverse();

    let ordered: Vec<&Interface> = names
        .iter()
        .filter_map(|name| protocol.interfaces.iter().find(|iface| &iface.name == name))
        .collect();
    debug!(
        order = ?ordered.iter().map(|iface| iface.name.as_str()).collect::<Vec<_>>(),
        "interface emission order"
    );
    Ok(ordered)
}

/// Renders the complete header for `protocol`.
pub fn generate_header(protocol: &Protocol, options: &GenerateOptions) -> Result<String, GenaError> {
    let namespaces = Namespaces::new(protocol, &options.context, options.namespace.clone())?;
    namespaces.verify(protocol)?;

    let ordered = order_interfaces(protocol, &namespaces)?;
    let table = TypeTable::new(&ordered, &namespaces)?;

    let mut o = Lines::new();
    o.push("#pragma once");
    o.blank();
    if !options.includes.is_empty() {
        for include in &options.includes {
            o.push(include.clone());
        }
        o.blank();
    }
    if let Some(top) = namespaces.top_namespace() {
        o.push(format!("namespace {} {{", top));
    }
    o.push(format!("namespace {} {{", protocol.name));
    o.blank();

    let mut forward = Lines::new();
    for iface in &ordered {
        forward.push(format!("template <typename {0}_traits> struct {0};", iface.name));
    }

    let mut interfaces = Vec::with_capacity(ordered.len());
    for iface in &ordered {
        interfaces.push(interface::emit_interface(iface, &namespaces)?);
    }

    o.append(separated(vec![
        forward,
        table.emit_declaration(),
        separated(interfaces),
        table.emit_definitions(),
    ]));
    o.blank();

    o.push(format!("}} // namespace {}", protocol.name));
    if let Some(top) = namespaces.top_namespace() {
        o.push(format!("}} // namespace {}", top));
    }

    debug!(
        protocol = %protocol.name,
        interfaces = ordered.len(),
        "generated header"
    );
    Ok(o.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wl_gena_schema::{Arg, ArgType, Message};

    fn uses_enum(name: &str, owner: &str) -> Interface {
        Interface {
            name:     name.into(),
            version:  1,
            requests: vec![Message {
                name:  "set".into(),
                kind:  None,
                since: None,
                args:  vec![Arg {
                    name: "v".into(),
                    ty:   ArgType::UIntEnum { enum_name: "e".into(), interface: Some(owner.into()) },
                }],
            }],
            events:   vec![],
            enums:    vec![],
        }
    }

    #[test]
    fn unknown_enum_owner_is_an_error() {
        let protocol = Protocol { name: "p".into(), interfaces: vec![uses_enum("a", "ghost")] };
        let ns = Namespaces::new(&protocol, &[], None).unwrap();
        match dependency_graph(&ns) {
            Err(GenaError::UnknownInterface(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected an unknown interface, got {:?}", other.map(|g| g.dump())),
        }
    }

    #[test]
    fn context_interfaces_join_the_graph() {
        let protocol = Protocol { name: "p".into(), interfaces: vec![uses_enum("a", "base")] };
        let context = vec![Protocol { name: "core".into(), interfaces: vec![uses_enum("base", "base")] }];
        let ns = Namespaces::new(&protocol, &context, None).unwrap();
        let graph = dependency_graph(&ns).unwrap();
        assert!(graph.contains("a"));
        assert!(graph.contains("base"));

        let ordered = order_interfaces(&protocol, &ns).unwrap();
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].name, "a");
    }
}
