use lazy_static::lazy_static;
use regex::Regex;

use super::{
    request::emit_request,
    types::{cpp_type, declaration},
};
use crate::{
    error::GenaError,
    resolver::Namespaces,
    utils::{comma_separated, separated, Lines},
};
use wl_gena_schema::{Entry, Enum, Interface};

lazy_static! {
    static ref LEADING_DIGIT: Regex = Regex::new(r"^[0-9]").unwrap();
}

/// `template <typename X_traits> struct X { ... };` for one interface.
pub fn emit_interface(iface: &Interface, namespaces: &Namespaces) -> Result<Lines, GenaError> {
    let traits = format!("{}_traits", iface.name);
    let mut o = Lines::new();

    let providers = iface.enum_providers();
    let providers: Vec<&str> = providers.into_iter().filter(|p| *p != iface.name).collect();
    if !providers.is_empty() {
        o.push("/*");
        o.push(" * Dependencies:");
        for provider in providers {
            o.push(format!(" * [{}]", provider));
        }
        o.push(" */");
    }

    o.push(format!("template <typename {}>", traits));
    o.push(format!("struct {}", iface.name));
    o.push("{");

    let mut blocks = vec![handle_definition(iface, &traits)];
    blocks.push(separated(iface.enums.iter().map(emit_enum).collect()));
    if !iface.events.is_empty() {
        blocks.push(listener(iface, &traits, namespaces)?);
    }
    blocks.push(constructor(iface, &traits));
    if !iface.events.is_empty() {
        blocks.push(add_listener(iface, &traits));
    }
    blocks.push(requests(iface, namespaces)?);
    blocks.push(Lines::from(vec![format!("typename {}::client_library_t &L;", traits)]));

    o.append_indented(separated(blocks));
    o.push("};");
    Ok(o)
}

fn handle_definition(iface: &Interface, traits: &str) -> Lines {
    let mut o = Lines::new();
    if iface.name == "wl_display" {
        o.push("// wl_display is owned by the client library");
        o.push(format!("using handle_t = typename {}::wl_display_t;", traits));
    } else {
        o.push("struct handle_t;");
    }
    o
}

/// C++ spelling of an enum entry name.
pub fn entry_name(name: &str) -> String {
    if LEADING_DIGIT.is_match(name) {
        format!("n{}", name)
    } else if name == "default" {
        format!("e{}", name)
    } else {
        name.to_string()
    }
}

fn entry_value(entry: &Entry) -> String {
    if entry.is_hex {
        format!("0x{:x}", entry.value)
    } else {
        entry.value.to_string()
    }
}

pub fn emit_enum(e: &Enum) -> Lines {
    let entries = e
        .entries
        .iter()
        .map(|entry| format!("{} = {}", entry_name(&entry.name), entry_value(entry)))
        .collect();

    let mut o = Lines::new();
    o.push(format!("enum class {}_e", e.name));
    o.push("{");
    o.append_indented(Lines::from(comma_separated(entries)));
    o.push("};");
    o
}

fn listener(iface: &Interface, traits: &str, namespaces: &Namespaces) -> Result<Lines, GenaError> {
    assert!(
        !iface.events.is_empty(),
        "cannot generate a listener for [{}] without events",
        iface.name
    );

    let mut slots = Vec::new();
    for event in &iface.events {
        let mut params = vec!["void *data".to_string(), "handle_t *object".to_string()];
        for arg in &event.args {
            let ty = cpp_type(&arg.ty, &iface.name, traits, namespaces)?;
            params.push(declaration(&ty, &arg.name));
        }

        let mut slot = Lines::new();
        slot.push(format!("using {}_FN = void(", event.name));
        slot.append_indented(Lines::from(comma_separated(params)));
        slot.push(");");
        slot.push(format!("{0}_FN *{0} = nullptr;", event.name));
        slots.push(slot);
    }

    let mut o = Lines::new();
    o.push("struct listener_t");
    o.push("{");
    o.append_indented(separated(slots));
    o.push("};");
    Ok(o)
}

fn constructor(iface: &Interface, traits: &str) -> Lines {
    let mut o = Lines::new();
    o.push(format!(
        "explicit {}(typename {}::client_library_t &lib) : L{{lib}}",
        iface.name, traits
    ));
    o.push("{");
    o.push("}");
    o
}

fn add_listener(iface: &Interface, traits: &str) -> Lines {
    let mut o = Lines::new();
    o.push(format!(
        "int add_listener(handle_t *{}_handle, const listener_t *listener, void *data)",
        iface.name
    ));
    o.push("{");
    o.push("    return L.wl_proxy_add_listener(");
    o.push(format!(
        "        reinterpret_cast<typename {}::wl_proxy_t *>({}_handle),",
        traits, iface.name
    ));
    o.push("        (void (**)(void))listener,");
    o.push("        data");
    o.push("    );");
    o.push("}");
    o
}

fn requests(iface: &Interface, namespaces: &Namespaces) -> Result<Lines, GenaError> {
    let mut blocks = Vec::with_capacity(iface.requests.len());
    for (index, request) in iface.requests.iter().enumerate() {
        let index_name = format!("request_index_{}", request.name);
        let mut block = Lines::new();
        block.push(format!("static constexpr size_t {} = {};", index_name, index));
        block.append(emit_request(iface, request, &index_name, namespaces)?);
        blocks.push(block);
    }
    Ok(separated(blocks))
}
