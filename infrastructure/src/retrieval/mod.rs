//! Passage retrieval adapters.

mod lexical;

pub use lexical::{LexicalRetriever, LexicalRetrieverFactory, tokenize};
