use tracing::warn;

use super::types::{cpp_type, declaration, handle_type};
use crate::{
    error::GenaError,
    resolver::Namespaces,
    utils::{comma_separated, Lines},
};
use wl_gena_schema::{ArgType, Interface, Message};

/// Name of the trailing interface-descriptor parameter of requests whose
/// `new_id` has no fixed interface.
const INTERFACE_PARAM: &str = "interface";

enum Param {
    Declared(String),
    /// Argument passed implicitly, noted in a comment.
    Skipped(String),
}

/// One request operation, or a comment when the request creates more than
/// one object.
pub fn emit_request(
    iface: &Interface,
    request: &Message,
    index_name: &str,
    namespaces: &Namespaces,
) -> Result<Lines, GenaError> {
    let new_ids = request.new_id_args();
    let mut o = Lines::new();

    if new_ids.len() > 1 {
        warn!(
            interface = %iface.name,
            request = %request.name,
            new_ids = new_ids.len(),
            "skipping request with multiple new_id arguments"
        );
        o.push("/*");
        o.push(format!(
            " * Multiple new_id args: Ignore [{}] request generation",
            request.name
        ));
        for (i, arg) in new_ids.iter().enumerate() {
            o.push(format!(" * new_id[{}] {}", i, arg.name));
        }
        o.push(" */");
        return Ok(o);
    }

    let traits = format!("{}_traits", iface.name);
    let new_id = new_ids.first().map(|arg| {
        let owner = match &arg.ty {
            ArgType::NewId { interface } => interface.as_deref(),
            _ => None,
        };
        (arg.name.as_str(), owner)
    });

    let return_type = match new_id {
        None => "void".to_string(),
        Some((_, None)) => "void *".to_string(),
        Some((_, Some(owner))) => format!("{} *", handle_type(owner, &traits, namespaces)?),
    };

    o.push(format!("{} {}(", return_type, request.name));
    o.append_indented(signature(iface, request, &traits, namespaces)?);
    o.push(")");
    o.push("{");
    o.append_indented(body(iface, request, index_name, &traits, new_id, namespaces)?);
    o.push("}");
    Ok(o)
}

fn signature(
    iface: &Interface,
    request: &Message,
    traits: &str,
    namespaces: &Namespaces,
) -> Result<Lines, GenaError> {
    let mut params = vec![Param::Declared(format!("handle_t *{}_ptr", iface.name))];
    for arg in &request.args {
        match &arg.ty {
            ArgType::NewId { interface: None } => {
                params.push(Param::Declared(format!(
                    "const typename {}::wl_interface_t *{}",
                    traits, INTERFACE_PARAM
                )));
                params.push(Param::Declared("uint32_t version".to_string()));
            }
            ArgType::NewId { interface: Some(owner) } => {
                params.push(Param::Skipped(format!(
                    "(name=[{}] type=[new_id] interface=[{}])",
                    arg.name, owner
                )));
            }
            ty => {
                let ty = cpp_type(ty, &iface.name, traits, namespaces)?;
                params.push(Param::Declared(declaration(&ty, &arg.name)));
            }
        }
    }

    // Commas go on every declared parameter but the last one.
    let declared: Vec<String> = params
        .iter()
        .filter_map(|p| match p {
            Param::Declared(d) => Some(d.clone()),
            Param::Skipped(_) => None,
        })
        .collect();
    let mut declared = comma_separated(declared).into_iter();

    let mut o = Lines::new();
    for param in params {
        match param {
            Param::Declared(_) => {
                if let Some(text) = declared.next() {
                    o.push(text);
                }
            }
            Param::Skipped(note) => o.push(format!("// [[nogen]]: {}", note)),
        }
    }
    Ok(o)
}

fn body(
    iface: &Interface,
    request: &Message,
    index_name: &str,
    traits: &str,
    new_id: Option<(&str, Option<&str>)>,
    namespaces: &Namespaces,
) -> Result<Lines, GenaError> {
    let proxy_type = format!("typename {}::wl_proxy_t", traits);
    let proxy = format!("{}_ptr_as_proxy", iface.name);

    let mut o = Lines::new();
    o.push(format!(
        "{} *{} = reinterpret_cast<{} *>({}_ptr);",
        proxy_type, proxy, proxy_type, iface.name
    ));

    let out = new_id.map(|(name, _)| format!("out_{}", name));
    match &out {
        Some(out) => {
            o.push(format!("{} *{} = nullptr;", proxy_type, out));
            o.push(format!("{} = L.wl_proxy_marshal_flags(", out));
        }
        None => o.push("L.wl_proxy_marshal_flags("),
    }

    let mut args = vec![proxy.clone(), index_name.to_string()];
    args.push(match new_id {
        None => "nullptr".to_string(),
        Some((_, None)) => INTERFACE_PARAM.to_string(),
        Some((_, Some(owner))) => format!(
            "&{}::rtti<{}>::{}_interface",
            namespaces.namespace_of(owner)?,
            traits,
            owner
        ),
    });
    args.push(match new_id {
        Some((_, None)) => "version".to_string(),
        _ => format!("L.wl_proxy_get_version({})", proxy),
    });
    args.push(if request.is_destructor() {
        "/* WL_MARSHAL_FLAG_DESTROY */ (1 << 0)".to_string()
    } else {
        "0".to_string()
    });
    for arg in &request.args {
        match &arg.ty {
            ArgType::NewId { interface: None } => {
                args.push(format!("{}->name", INTERFACE_PARAM));
                args.push("version".to_string());
                args.push("nullptr".to_string());
            }
            ArgType::NewId { interface: Some(_) } => args.push("nullptr".to_string()),
            _ => args.push(arg.name.clone()),
        }
    }
    o.append_indented(Lines::from(comma_separated(args)));
    o.push(");");

    match (new_id, &out) {
        (Some((_, None)), Some(out)) => {
            o.push(format!("return reinterpret_cast<void *>({});", out));
        }
        (Some((_, Some(owner))), Some(out)) => {
            o.push(format!(
                "return reinterpret_cast<{} *>({});",
                handle_type(owner, traits, namespaces)?,
                out
            ));
        }
        _ => {}
    }
    Ok(o)
}
