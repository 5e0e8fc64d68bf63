//! Generator for per-type tensor copy dispatch tables.
//!
//! A registry of tensor types goes in; one C++ translation unit per
//! backend comes out, holding a copy-into and a copy-from function for
//! every type that backend owns.

pub mod api;
pub mod audit;
pub mod config;
pub mod diagnostic;
pub mod dispatch;
pub mod emit;
pub mod fingerprint;
pub mod registry;
pub mod report;
pub mod span;

pub use api::*;
