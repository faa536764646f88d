//! Schema introspection for remote tables
//!
//! The remote schema is discovered once, at table registration, by a
//! zero-row probe. The resulting `TableDescriptor` fixes column order and
//! host types for the table's lifetime.
//!
//! # Guarantees
//!
//! - Idempotent: probing an unchanged source yields identical columns
//! - All-or-nothing: a failed probe registers nothing

mod errors;
mod introspector;
mod types;

pub use errors::{IntrospectionError, IntrospectionErrorCode, IntrospectionResult};
pub use introspector::{DiscoveredTable, SchemaIntrospector};
pub use types::{
    quote_identifier, ColumnDescriptor, Combinator, HostType, RemoteSource, SourceKind,
    TableDescriptor,
};
