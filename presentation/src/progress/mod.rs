//! Progress display for batch runs.

pub mod reporter;
