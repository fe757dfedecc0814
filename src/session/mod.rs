//! Per-worker session state
//!
//! One test worker owns exactly one [`Session`]; the [`SessionRegistry`] is
//! the only shared mutable structure in the crate, keyed by worker identity
//! so concurrent workers never see each other's state.

pub mod registry;


pub use registry::{Session, SessionKey, SessionRegistry};
