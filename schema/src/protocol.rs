use serde::{ser::SerializeMap, Serialize, Serializer};

/// One parsed protocol document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Protocol {
    pub name:       String,
    pub interfaces: Vec<Interface>,
}

/// A named, versioned bundle of requests, events and enums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interface {
    pub name:     String,
    pub version:  u32,
    pub requests: Vec<Message>,
    pub events:   Vec<Message>,
    pub enums:    Vec<Enum>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageKind {
    #[serde(rename = "DESTRUCTOR")]
    Destructor,
}

/// Shape shared by requests and events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub name:  String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind:  Option<MessageKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<u32>,
    pub args:  Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arg {
    pub name: String,
    #[serde(rename = "type")]
    pub ty:   ArgType,
}

/// Closed set of argument kinds understood by the wire format.
///
/// `interface` names the owning interface of the referenced object, enum or
/// newly created object. A `NewId` without an interface is bound at the call
/// site through an interface descriptor and a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgType {
    Int,
    UInt,
    UIntEnum {
        enum_name: String,
        interface: Option<String>,
    },
    Fixed,
    String,
    NullableString,
    Object { interface: Option<String> },
    NullableObject { interface: Option<String> },
    NewId { interface: Option<String> },
    Array,
    Fd,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enum {
    pub name:    String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name:   String,
    pub value:  u32,
    /// The value was written as `0x...` and is re-emitted that way.
    pub is_hex: bool,
}

/// `name` without a leading `wl_`.
fn strip_wl(name: &str) -> String {
    name.strip_prefix("wl_").unwrap_or(name).to_string()
}

impl Protocol {
    /// Copy with the leading `wl_` removed from the protocol name, the
    /// interface names and every argument's owning interface. Message, enum
    /// and argument names are kept.
    pub fn strip_wl_prefix(&self) -> Protocol {
        let mut out = self.clone();
        out.name = strip_wl(&out.name);
        for iface in &mut out.interfaces {
            iface.name = strip_wl(&iface.name);
            let args = iface
                .requests
                .iter_mut()
                .chain(iface.events.iter_mut())
                .flat_map(|m| m.args.iter_mut());
            for arg in args {
                match &mut arg.ty {
                    ArgType::UIntEnum { interface, .. }
                    | ArgType::Object { interface }
                    | ArgType::NullableObject { interface }
                    | ArgType::NewId { interface } => {
                        if let Some(owner) = interface {
                            *owner = strip_wl(owner);
                        }
                    }
                    _ => {}
                }
            }
        }
        out
    }
}

impl Message {
    pub fn is_destructor(&self) -> bool {
        self.kind == Some(MessageKind::Destructor)
    }

    /// Arguments of kind `new_id`, in argument order.
    pub fn new_id_args(&self) -> Vec<&Arg> {
        self.args
            .iter()
            .filter(|arg| matches!(arg.ty, ArgType::NewId { .. }))
            .collect()
    }
}

impl Interface {
    /// Requests followed by events.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.requests.iter().chain(self.events.iter())
    }

    /// Interfaces owning the enums referenced by this interface's messages,
    /// deduplicated, in first-use order.
    pub fn enum_providers(&self) -> Vec<&str> {
        let mut providers: Vec<&str> = Vec::new();
        for arg in self.messages().flat_map(|m| m.args.iter()) {
            if let ArgType::UIntEnum { interface: Some(owner), .. } = &arg.ty {
                if !providers.contains(&owner.as_str()) {
                    providers.push(owner);
                }
            }
        }
        providers
    }
}

impl ArgType {
    /// Name used for this kind in the JSON dump.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ArgType::Int                  => "int",
            ArgType::UInt                 => "uint",
            ArgType::UIntEnum { .. }      => "enum",
            ArgType::Fixed                => "fixed",
            ArgType::String               => "string",
            ArgType::NullableString       => "?str",
            ArgType::Object { .. }        => "obj",
            ArgType::NullableObject { .. } => "?obj",
            ArgType::NewId { .. }         => "id",
            ArgType::Array                => "arr",
            ArgType::Fd                   => "fd",
        }
    }

    /// The interface this argument refers to, if it names one.
    pub fn interface(&self) -> Option<&str> {
        match self {
            ArgType::UIntEnum { interface, .. }
            | ArgType::Object { interface }
            | ArgType::NullableObject { interface }
            | ArgType::NewId { interface } => interface.as_deref(),
            ArgType::Int
            | ArgType::UInt
            | ArgType::Fixed
            | ArgType::String
            | ArgType::NullableString
            | ArgType::Array
            | ArgType::Fd => None,
        }
    }

    /// The interface whose descriptor the transport needs for this argument.
    /// Enum owners are not object types and never count.
    pub fn object_interface(&self) -> Option<&str> {
        match self {
            ArgType::Object { interface }
            | ArgType::NullableObject { interface }
            | ArgType::NewId { interface } => interface.as_deref(),
            _ => None,
        }
    }
}

impl Serialize for ArgType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", self.kind_name())?;
        if let Some(interface) = self.interface() {
            map.serialize_entry("interface", interface)?;
        }
        if let ArgType::UIntEnum { enum_name, .. } = self {
            map.serialize_entry("enum_name", enum_name)?;
        }
        map.end()
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("value", &self.value)?;
        if self.is_hex {
            map.serialize_entry("value_hex", &format!("{:x}", self.value))?;
        }
        map.end()
    }
}
