//! Serializers for the OSLC vocabulary.
//!
//! - **Turtle** ([`turtle`]): every resource type rendered as an
//!   `oslc:ResourceShape`, so the built-in constraints can be compared with a
//!   provider's published shapes.

pub mod turtle;
