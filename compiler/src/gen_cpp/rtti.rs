//! Run-time type descriptors: one shared `types[]` table per document plus
//! an interface descriptor and request/event descriptor arrays per
//! interface.
//!
//! The table opens with a run of `nullptr` slots as long as the longest
//! argument list among messages that reference no object type. All such
//! messages point at offset 0. Every other message owns one slot per
//! argument.

use tracing::debug;

use crate::{
    error::GenaError,
    resolver::Namespaces,
    utils::{comma_separated, quote, separated, Lines},
};
use wl_gena_schema::{ArgType, Interface, Message};

/// Wire signature consumed by the transport: one code per argument, the
/// `since` version first when above 1.
pub fn wire_signature(message: &Message) -> String {
    let mut signature = String::new();
    if let Some(since) = message.since.filter(|&since| since > 1) {
        signature.push_str(&since.to_string());
    }
    for arg in &message.args {
        signature.push_str(match &arg.ty {
            ArgType::Int => "i",
            ArgType::UInt | ArgType::UIntEnum { .. } => "u",
            ArgType::Fixed => "f",
            ArgType::String => "s",
            ArgType::NullableString => "?s",
            ArgType::Object { .. } => "o",
            ArgType::NullableObject { .. } => "?o",
            ArgType::NewId { interface: Some(_) } => "i",
            ArgType::NewId { interface: None } => "sun",
            ArgType::Array => "a",
            ArgType::Fd => "h",
        });
    }
    signature
}

/// Whether `message` needs its own slots in the table.
pub fn carries_types(message: &Message) -> bool {
    message.args.iter().any(|arg| arg.ty.object_interface().is_some())
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    value: String,
    label: String,
}

/// Table offsets of one interface's messages; `None` points into the null run.
#[derive(Debug, Clone, Default)]
struct Offsets {
    requests: Vec<Option<usize>>,
    events:   Vec<Option<usize>>,
}

#[derive(Debug)]
pub struct TypeTable<'a> {
    interfaces: Vec<&'a Interface>,
    null_run:   usize,
    slots:      Vec<Slot>,
    offsets:    Vec<Offsets>,
}

impl<'a> TypeTable<'a> {
    pub fn new(interfaces: &[&'a Interface], namespaces: &Namespaces) -> Result<Self, GenaError> {
        let null_run = interfaces
            .iter()
            .flat_map(|iface| iface.messages())
            .filter(|message| !carries_types(message))
            .map(|message| message.args.len())
            .max()
            .unwrap_or(0);

        let mut slots = Vec::new();
        let mut offsets = Vec::with_capacity(interfaces.len());
        for iface in interfaces {
            let mut assign = |messages: &[Message]| -> Result<Vec<Option<usize>>, GenaError> {
                let mut out = Vec::with_capacity(messages.len());
                for message in messages {
                    if !carries_types(message) {
                        out.push(None);
                        continue;
                    }
                    out.push(Some(null_run + slots.len()));
                    for arg in &message.args {
                        let value = match arg.ty.object_interface() {
                            Some(owner) => format!(
                                "&{}::rtti<traits>::{}_interface",
                                namespaces.namespace_of(owner)?,
                                owner
                            ),
                            None => "nullptr".to_string(),
                        };
                        slots.push(Slot {
                            value,
                            label: format!("{}.{}.{}", iface.name, message.name, arg.name),
                        });
                    }
                }
                Ok(out)
            };
            let requests = assign(iface.requests.as_slice())?;
            let events = assign(iface.events.as_slice())?;
            offsets.push(Offsets { requests, events });
        }

        debug!(null_run, slots = slots.len(), "built type table");
        Ok(TypeTable {
            interfaces: interfaces.to_vec(),
            null_run,
            slots,
            offsets,
        })
    }

    pub fn null_run(&self) -> usize {
        self.null_run
    }

    /// Offset of the `index`-th request (or event) of the `position`-th
    /// interface.
    pub fn offset(&self, position: usize, event: bool, index: usize) -> usize {
        let offsets = &self.offsets[position];
        let list = if event { &offsets.events } else { &offsets.requests };
        list[index].unwrap_or(0)
    }

    /// `struct rtti` with the static member declarations.
    pub fn emit_declaration(&self) -> Lines {
        let mut o = Lines::new();
        o.push("template <typename traits>");
        o.push("struct rtti");
        o.push("{");

        let mut members = vec![Lines::from(vec![
            "static const typename traits::wl_interface_t *types[];".to_string(),
        ])];
        for iface in &self.interfaces {
            let mut m = Lines::new();
            m.push(format!(
                "static const typename traits::wl_interface_t {}_interface;",
                iface.name
            ));
            if !iface.requests.is_empty() {
                m.push(format!(
                    "static const typename traits::wl_message_t {}_requests[];",
                    iface.name
                ));
            }
            if !iface.events.is_empty() {
                m.push(format!(
                    "static const typename traits::wl_message_t {}_events[];",
                    iface.name
                ));
            }
            members.push(m);
        }
        o.append_indented(separated(members));
        o.push("};");
        o
    }

    /// Out-of-class definitions of every declared member.
    pub fn emit_definitions(&self) -> Lines {
        let mut blocks = vec![self.emit_types()];
        for (position, iface) in self.interfaces.iter().enumerate() {
            blocks.push(self.emit_interface(position, iface));
        }
        separated(blocks)
    }

    fn emit_types(&self) -> Lines {
        let mut entries: Vec<Slot> = (0..self.null_run)
            .map(|_| Slot { value: "nullptr".into(), label: "null_run_stub".into() })
            .collect();
        entries.extend(self.slots.iter().cloned());
        if entries.is_empty() {
            // A zero-length array is not valid C++.
            entries.push(Slot { value: "nullptr".into(), label: "null_run_stub".into() });
        }

        let index_width = (entries.len() - 1).to_string().len();
        let values = comma_separated(entries.iter().map(|e| e.value.clone()).collect());
        let value_width = values.iter().map(String::len).max().unwrap_or(0);

        let mut body = Lines::new();
        for (index, (value, entry)) in values.iter().zip(&entries).enumerate() {
            body.push(format!(
                "{:<vw$} /* [{:>iw$}][{}] */",
                value,
                index,
                entry.label,
                vw = value_width,
                iw = index_width
            ));
        }

        let mut o = Lines::new();
        o.push("template <typename traits>");
        o.push("const typename traits::wl_interface_t *rtti<traits>::types[] = {");
        o.append_indented(body);
        o.push("};");
        o
    }

    fn emit_interface(&self, position: usize, iface: &Interface) -> Lines {
        let name = &iface.name;
        let mut blocks = Vec::new();

        let mut descriptor = Lines::new();
        descriptor.push("template <typename traits>");
        descriptor.push(format!(
            "const typename traits::wl_interface_t rtti<traits>::{}_interface = {{",
            name
        ));
        let mut fields = Lines::new();
        fields.push(format!("{}, {},", quote(name), iface.version));
        fields.push(match iface.requests.len() {
            0 => "0, nullptr,".to_string(),
            n => format!("{}, rtti<traits>::{}_requests,", n, name),
        });
        fields.push(match iface.events.len() {
            0 => "0, nullptr".to_string(),
            n => format!("{}, rtti<traits>::{}_events", n, name),
        });
        descriptor.append_indented(fields);
        descriptor.push("};");
        blocks.push(descriptor);

        for (event, kind, messages) in [
            (false, "requests", &iface.requests),
            (true, "events", &iface.events),
        ] {
            if messages.is_empty() {
                continue;
            }
            let entries = messages
                .iter()
                .enumerate()
                .map(|(index, message)| {
                    let offset = if carries_types(message) {
                        format!(
                            "/* [{}.{}] */ {}",
                            name,
                            message.name,
                            self.offset(position, event, index)
                        )
                    } else {
                        "/* [null_run_stub] */ 0".to_string()
                    };
                    format!(
                        "{{{}, {}, rtti<traits>::types + {}}}",
                        quote(&message.name),
                        quote(&wire_signature(message)),
                        offset
                    )
                })
                .collect();

            let mut array = Lines::new();
            array.push("template <typename traits>");
            array.push(format!(
                "const typename traits::wl_message_t rtti<traits>::{}_{}[] = {{",
                name, kind
            ));
            array.append_indented(Lines::from(comma_separated(entries)));
            array.push("};");
            blocks.push(array);
        }

        separated(blocks)
    }
}
