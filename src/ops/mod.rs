//! Recursive node operations.
//!
//! Every operation receives the shift at which the caller expects the node
//! to sit; interior nodes compare it against their own level.

pub mod assign;
pub mod check;
pub mod delete;
pub mod get;
