//! Output contract between free-text generation and typed results.
//!
//! # Flow
//!
//! ```text
//! raw completion
//!     │
//!     ▼
//! presence gate ──(name absent)──▶ ExtractionFailure::MissingField
//!     │
//!     ▼
//! structured parse ─▶ fenced-block parse ─▶ line patterns (never fails)
//!     │
//!     ▼
//! FieldMap ──(schema::*::from_fields)──▶ typed result | SchemaError
//! ```
//!
//! Everything here is pure: no I/O and no retries. Retrying on a rejected
//! shape is the generation gateway's job.

pub mod extraction;
pub mod field;
pub mod schema;

pub use extraction::{
    Extraction, ExtractionFailure, ExtractionStrategy, extract, parse_fenced_block,
    parse_line_patterns, parse_structured, presence_gate,
};
pub use field::{FieldMap, normalize_field_name};
pub use schema::{
    Abstention, FactReport, RouteDecision, RouteLabel, SchemaError, SelectionResult, TopicPlan,
    TopicProposal, summary_from_fields,
};
