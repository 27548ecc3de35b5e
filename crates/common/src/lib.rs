//! Shared types used across all websteer crates.

pub mod invocation;

pub use invocation::InvocationId;
