//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod generate;
pub mod moderator;
pub mod run_batch;
pub mod run_session;
pub(crate) mod shared;
pub mod speaker;

#[cfg(test)]
pub(crate) mod test_support;
