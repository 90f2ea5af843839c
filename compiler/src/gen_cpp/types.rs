use crate::{error::GenaError, resolver::Namespaces};
use wl_gena_schema::ArgType;

/// `typename ::ns::owner<traits>::handle_t`
pub fn handle_type(owner: &str, traits: &str, namespaces: &Namespaces) -> Result<String, GenaError> {
    Ok(format!(
        "typename {}::{}<{}>::handle_t",
        namespaces.namespace_of(owner)?,
        owner,
        traits
    ))
}

fn object_type(
    owner: Option<&str>,
    comment: &str,
    traits: &str,
    namespaces: &Namespaces,
) -> Result<String, GenaError> {
    Ok(match owner {
        Some(owner) => format!("/* {} */ {} *", comment, handle_type(owner, traits, namespaces)?),
        None => format!("/* {} */ void *", comment),
    })
}

/// C++ parameter type for an argument of `interface`, whose traits parameter
/// is named `traits`.
pub fn cpp_type(
    ty: &ArgType,
    interface: &str,
    traits: &str,
    namespaces: &Namespaces,
) -> Result<String, GenaError> {
    let text = match ty {
        ArgType::Int => "int32_t".to_string(),
        ArgType::UInt => "uint32_t".to_string(),
        ArgType::UIntEnum { enum_name, interface: owner } => match owner {
            Some(owner) if owner != interface => format!(
                "typename {}::{}<{}>::{}_e",
                namespaces.namespace_of(owner)?,
                owner,
                traits,
                enum_name
            ),
            _ => format!("{}_e", enum_name),
        },
        ArgType::Fixed => "/* wl_fixed_t */ int32_t".to_string(),
        ArgType::String => "const char *".to_string(),
        ArgType::NullableString => "/* nullptr */ const char *".to_string(),
        ArgType::Object { interface: owner } => {
            object_type(owner.as_deref(), "object", traits, namespaces)?
        }
        ArgType::NullableObject { interface: owner } => {
            object_type(owner.as_deref(), "nullptr<object>", traits, namespaces)?
        }
        ArgType::NewId { interface: owner } => match owner {
            Some(owner) => format!("/* new_id {} */ uint32_t", owner),
            None => "/* new_id */ uint32_t".to_string(),
        },
        ArgType::Array => "struct wl_array *".to_string(),
        ArgType::Fd => "/* fd */ int32_t".to_string(),
    };
    Ok(text)
}

/// `{type} {name}`, without the double space after pointer types.
pub fn declaration(ty: &str, name: &str) -> String {
    if ty.ends_with('*') {
        format!("{}{}", ty, name)
    } else {
        format!("{} {}", ty, name)
    }
}
