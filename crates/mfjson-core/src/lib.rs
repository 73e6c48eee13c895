//! # mfjson-core
//!
//! Deterministic JSON codec for small runtimes without serde derive or
//! reflection.
//!
//! Parsing produces a [`Value`] tree. Serializing works on anything that
//! implements [`Serializable`]; structs describe their members once through a
//! [`Registry`] of [`TypeDescriptor`]s, and the writer emits them in that
//! order every time.
//!
//! ## Quick start
//!
//! ```rust
//! use mfjson_core::{getter, parse, serialize, MemberKind, Registry, TypeDescriptor};
//!
//! struct Person {
//!     first_name: String,
//!     last_name: String,
//! }
//! mfjson_core::impl_record!(Person);
//!
//! let registry = Registry::new()
//!     .with::<Person>(
//!         TypeDescriptor::new("Person")
//!             .member("FirstName", MemberKind::Primitive, getter!(Person, |p| &p.first_name))
//!             .member("LastName", MemberKind::Primitive, getter!(Person, |p| &p.last_name)),
//!     )
//!     .unwrap();
//!
//! let ada = Person { first_name: "Ada".into(), last_name: "Lovelace".into() };
//! let json = serialize(&ada, &registry).unwrap();
//! assert_eq!(json, r#"{"FirstName":"Ada","LastName":"Lovelace"}"#);
//!
//! let tree = parse(&json).unwrap();
//! assert_eq!(tree["LastName"].as_str(), Some("Lovelace"));
//! ```
//!
//! ## Modules
//!
//! - [`parser`] and [`lexer`]: JSON text to [`Value`]
//! - [`writer`]: [`Serializable`] values to JSON text
//! - [`shape`]: the [`Serializable`] trait and its impls for std types
//! - [`resolver`]: record member lists and the [`Registry`]
//! - [`datetime`]: ISO-8601 and Ajax date formats
//! - [`mapping`]: conversions to and from `serde_json` and serde types
//! - [`limits`]: depth and input-size limits
//! - [`error`]: error types

pub mod datetime;
pub mod error;
pub mod lexer;
pub mod limits;
pub mod mapping;
pub mod parser;
pub mod resolver;
pub mod shape;
pub mod value;
pub mod writer;

pub use datetime::{from_ajax, from_iso8601, to_ajax, to_iso8601, DateFormat};
pub use error::{
    AccessError, Error, FormatError, ParseError, ParseErrorKind, ResolveError, Result,
    SerializeError,
};
pub use limits::Limits;
pub use mapping::{from_value, to_value};
pub use parser::{parse, parse_with_limits};
pub use resolver::{
    downcast, Field, Getter, MemberDescriptor, MemberKind, Registry, ResolvedType,
    TypeDescriptor, TypeResolver,
};
pub use shape::{RecordRef, Serializable, Shape};
pub use value::Value;
pub use writer::{serialize, Writer};
