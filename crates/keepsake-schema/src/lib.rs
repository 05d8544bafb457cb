//! Validation schemas for reconstructed Keepsake instances.
//!
//! Default reconstruction copies saved fields onto an instance without
//! checking them. Types that need stronger guarantees declare a [`Schema`];
//! the registry checks every freshly revived instance of that type against
//! it and aborts the load on any [`Violation`].
//!
//! A schema checks the instance's field view, the same JSON the instance
//! saves. Nested instances appear there as envelopes, so [`Shape::Instance`]
//! matches them by tag.

pub mod report;
pub mod schema;
pub mod shape;

pub use report::{ValidationReport, Violation, ViolationKind};
pub use schema::{FieldRule, Schema};
pub use shape::Shape;
