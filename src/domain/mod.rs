//! Framework-agnostic request and callback types.

pub mod callback;
pub mod order;
