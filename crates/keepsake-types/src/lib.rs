//! Foundation types for Keepsake.
//!
//! Keepsake persists a mutable, evolving object graph as JSON in which every
//! typed value travels inside a type-tagged envelope. This crate holds the
//! vocabulary shared by every other Keepsake crate.
//!
//! # Key Types
//!
//! - [`Envelope`] — the wire form `{"ctor": <tag>, "data": <payload>}`
//! - [`Node`] — one value of a revived graph: plain JSON, container, or live instance
//! - [`SaveObject`] — object-safe trait implemented by every persistable type
//! - [`FromNode`] — conversion from a revived [`Node`] into a typed field
//! - [`SaveMap`] / [`SaveSet`] — ordered containers that travel as their own envelopes

pub mod containers;
pub mod convert;
pub mod envelope;
pub mod error;
pub mod node;
pub mod object;

pub use containers::{SaveMap, SaveSet, MAP_TAG, SET_TAG};
pub use convert::FromNode;
pub use envelope::{Envelope, CTOR_KEY, DATA_KEY};
pub use error::{TypeError, TypeResult};
pub use node::Node;
pub use object::SaveObject;
