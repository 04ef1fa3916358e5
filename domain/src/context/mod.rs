//! Prompt context: how much of a document fits, and how it is laid out.

pub mod rendering;
pub mod token_budget;

pub use rendering::{join_passages, render_documents};
pub use token_budget::{
    CharCountEstimator, DEFAULT_TOKEN_LIMIT, TokenBudget, TokenEstimator, estimate_tokens,
};
