//! Config merge: source ordering and precedence.

pub mod service;
