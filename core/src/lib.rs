//! Virtual filesystem engine over a hierarchical Redfish-shaped HTTP
//! management API.
//!
//! Projects a tree of self-describing JSON documents — each with its own
//! URL and embedded navigation references — as a POSIX-style virtual
//! filesystem: directory-like navigation, property inspection, and
//! write-through actions. [`resolver::resolve_target`] resolves arbitrary
//! paths (mixing resource hops, object descent, array indexing, and link
//! following) against a [`cache::Cache`] that fetches on miss through a
//! [`transport::FetchClient`]. [`ops`] builds cancellable, steppable
//! crawl/search/export operations on top.
//!
//! References:
//! - DMTF Redfish Specification DSP0266 — `https://www.dmtf.org/standards/redfish`
//! - OASIS OData 4.01 Part 1: Protocol — `https://docs.oasis-open.org/odata/`

pub mod action;
pub mod cache;
pub mod error;
pub mod fs;
pub mod model;
pub mod ops;
pub mod parser;
pub mod path;
pub mod resolver;
pub mod timestamp;
pub mod transport;

pub use error::{Error, Result};
pub use fs::Fs;
pub use model::{Child, ChildKind, Entry, EntryKind, Property, PropertyKind, Resource, Target};
pub use transport::{ClientParams, FetchClient, ReqwestFetchClient};
