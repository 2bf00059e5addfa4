//! # entitykit
//!
//! A framework for schema-driven entity compilation.
//!
//! This crate provides the core abstractions for turning statically declared
//! resource definitions into normalized, validated payload mappings suitable
//! for submission to a remote management API.
//!
//! ## Core Concepts
//!
//! - **Schema**: an ordered field descriptor table plus an optional compile
//!   hook, registered once per entity kind
//! - **EntityDescriptor**: one declared resource, immutable once declared,
//!   composed from base descriptors with most-derived precedence
//! - **Validator**: a pure check/normalize step selected by a field's
//!   declared capability (scalar, reference, secret, quota)
//! - **Stamper**: assigns unique identifiers to nested list elements and
//!   threads name-based references through one stamping call
//! - **Envelope**: the `{spec, metadata}` wrapper handed to the transport
//!   collaborator
//!
//! ## Example
//!
//! ```
//! use entitykit::{EntityDescriptor, FieldDescriptor, FieldKind, Schema, SchemaRegistry};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register(
//!     Schema::new("Bucket")
//!         .field(FieldDescriptor::required("region", FieldKind::String))
//!         .field(FieldDescriptor::optional("versioned", FieldKind::Bool)),
//! );
//!
//! let bucket = EntityDescriptor::declare("Bucket", "logs")
//!     .field("region", "us-east-1")
//!     .field("versioned", true);
//!
//! let compiled = bucket.compile(&registry).unwrap();
//! assert_eq!(compiled["region"], "us-east-1");
//! ```
//!
//! Compilation is synchronous and pure: no I/O, no suspension points, no
//! global mutation. The process-wide registry installed through
//! [`registry::install`] is read-only after the one-time initialization, so
//! concurrent compiles need no locking.

pub mod entity;
pub mod error;
pub mod payload;
pub mod registry;
pub mod stamp;
pub mod types;
pub mod validate;

// Re-export main types at crate root
pub use entity::EntityDescriptor;
pub use error::{Error, Result};
pub use payload::{Envelope, Metadata, Spec, assemble, reference};
pub use registry::{CompileHook, FieldDescriptor, FieldKind, Schema, SchemaRegistry};
pub use stamp::{SECRET_TYPE, StampContext, mark_secret, mark_secrets, stamp_list};
pub use types::{FieldValue, JsonMap};
