//! Core domain concepts shared across all subdomains.
//!
//! - [`query::Query`]: the information need of one session
//! - [`document::Document`]: an indexed, passage-split source document
//! - [`error::DomainError`]: domain-level errors

pub mod document;
pub mod error;
pub mod query;
pub mod string;
