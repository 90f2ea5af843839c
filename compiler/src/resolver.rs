use std::collections::HashMap;

use crate::error::GenaError;
use wl_gena_schema::{Interface, Protocol};

/// Interface name -> owning protocol, across the primary document and its
/// context documents.
#[derive(Debug)]
pub struct Namespaces<'a> {
    owners:        HashMap<&'a str, &'a str>,
    interfaces:    Vec<&'a Interface>,
    top_namespace: Option<String>,
}

impl<'a> Namespaces<'a> {
    pub fn new(
        primary: &'a Protocol,
        context: &'a [Protocol],
        top_namespace: Option<String>,
    ) -> Result<Self, GenaError> {
        let mut owners: HashMap<&'a str, &'a str> = HashMap::new();
        let mut interfaces = Vec::new();

        for protocol in std::iter::once(primary).chain(context.iter()) {
            for iface in &protocol.interfaces {
                if let Some(first) = owners.insert(&iface.name, &protocol.name) {
                    return Err(GenaError::DuplicateInterface {
                        interface: iface.name.clone(),
                        first:     first.to_string(),
                        second:    protocol.name.clone(),
                    });
                }
                interfaces.push(iface);
            }
        }

        Ok(Namespaces { owners, interfaces, top_namespace })
    }

    pub fn top_namespace(&self) -> Option<&str> {
        self.top_namespace.as_deref()
    }

    pub fn protocol_of(&self, interface: &str) -> Result<&'a str, GenaError> {
        self.owners
            .get(interface)
            .copied()
            .ok_or_else(|| GenaError::UnknownInterface(interface.to_string()))
    }

    /// Fully qualified C++ namespace holding `interface`.
    pub fn namespace_of(&self, interface: &str) -> Result<String, GenaError> {
        let protocol = self.protocol_of(interface)?;
        Ok(match &self.top_namespace {
            Some(top) => format!("::{}::{}", top, protocol),
            None => format!("::{}", protocol),
        })
    }

    /// Every visible interface, primary document first, in document order.
    pub fn interfaces(&self) -> &[&'a Interface] {
        &self.interfaces
    }

    /// Fails on the first owner interface referenced by `protocol` that no
    /// visible document defines.
    pub fn verify(&self, protocol: &Protocol) -> Result<(), GenaError> {
        for iface in &protocol.interfaces {
            for arg in iface.messages().flat_map(|m| m.args.iter()) {
                if let Some(owner) = arg.ty.interface() {
                    self.protocol_of(owner)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wl_gena_schema::{Arg, ArgType, Message};

    fn protocol(name: &str, interfaces: &[&str]) -> Protocol {
        Protocol {
            name:       name.into(),
            interfaces: interfaces
                .iter()
                .map(|n| Interface {
                    name:     n.to_string(),
                    version:  1,
                    requests: vec![],
                    events:   vec![],
                    enums:    vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn test_namespace_qualification() {
        let primary = protocol("xdg_shell", &["xdg_wm_base", "xdg_surface"]);
        let context = vec![protocol("wayland", &["wl_surface"])];

        let ns = Namespaces::new(&primary, &context, None).unwrap();
        assert_eq!(ns.namespace_of("xdg_surface").unwrap(), "::xdg_shell");
        assert_eq!(ns.namespace_of("wl_surface").unwrap(), "::wayland");

        let ns = Namespaces::new(&primary, &context, Some("wl".into())).unwrap();
        assert_eq!(ns.namespace_of("wl_surface").unwrap(), "::wl::wayland");
        assert_eq!(ns.top_namespace(), Some("wl"));

        let names: Vec<&str> = ns.interfaces().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["xdg_wm_base", "xdg_surface", "wl_surface"]);
    }

    #[test]
    fn test_duplicate_interface() {
        let primary = protocol("a", &["shared"]);
        let context = vec![protocol("b", &["other"]), protocol("c", &["shared"])];
        match Namespaces::new(&primary, &context, None).unwrap_err() {
            GenaError::DuplicateInterface { interface, first, second } => {
                assert_eq!(interface, "shared");
                assert_eq!(first, "a");
                assert_eq!(second, "c");
            }
            other => panic!("expected DuplicateInterface, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_interface() {
        let mut primary = protocol("p", &["box"]);
        let ns_err = {
            let ns = Namespaces::new(&primary, &[], None).unwrap();
            assert!(ns.verify(&primary).is_ok());
            ns.namespace_of("missing").unwrap_err()
        };
        assert_eq!(ns_err.to_string(), "Cannot resolve protocol for [missing] interface");

        primary.interfaces[0].requests.push(Message {
            name:  "attach".into(),
            kind:  None,
            since: None,
            args:  vec![Arg {
                name: "buffer".into(),
                ty:   ArgType::Object { interface: Some("wl_buffer".into()) },
            }],
        });
        let ns = Namespaces::new(&primary, &[], None).unwrap();
        assert!(matches!(
            ns.verify(&primary),
            Err(GenaError::UnknownInterface(name)) if name == "wl_buffer"
        ));
    }
}
