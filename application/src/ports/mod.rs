//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod checkpoint;
pub mod conversation_logger;
pub mod dataset;
pub mod language_model;
pub mod progress;
pub mod retriever;
