//! Protocol data model for wl-gena.
//!
//! A [`Protocol`] is the tree produced by parsing one XML protocol document:
//! interfaces with their requests, events and enums. The types serialize to
//! the JSON shape printed by `wl-gena json`.
//!
//! ```
//! use wl_gena_schema::*;
//!
//! let protocol = Protocol {
//!     name: "demo".to_owned(),
//!     interfaces: vec![Interface {
//!         name: "box".to_owned(),
//!         version: 1,
//!         requests: vec![],
//!         events: vec![],
//!         enums: vec![],
//!     }],
//! };
//! assert_eq!(protocol.interfaces[0].messages().count(), 0);
//! ```

pub mod protocol;

pub use protocol::*;
