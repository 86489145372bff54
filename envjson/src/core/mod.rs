//! Deterministic, pure logic for environment specs.
//!
//! Core modules must be free of file and process side effects. They operate on
//! in-memory mappings and caller-supplied readers/writers.

pub mod env;
pub mod merge;
pub mod serialize;
pub mod validate;
pub mod value;
